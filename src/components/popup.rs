use std::collections::HashSet;

use yew::prelude::*;

use crate::identify::{DisplayValue, PopupModel, PropertyEntry};

/// Props for the identify popup
#[derive(Properties, PartialEq)]
pub struct PopupProps {
    /// Element handed to the map as the popup overlay
    pub node_ref: NodeRef,

    /// Content of the last identify answer, `None` while hidden
    #[prop_or_default]
    pub model: Option<PopupModel>,

    pub on_close: Callback<()>,
}

/// Feature attribute popup anchored to the clicked point.
#[function_component(Popup)]
pub fn popup(props: &PopupProps) -> Html {
    let show_all = use_state(|| false);
    let expanded = use_state(HashSet::<String>::new);

    // every new answer starts collapsed
    {
        let show_all = show_all.clone();
        let expanded = expanded.clone();
        use_effect_with(props.model.clone(), move |_| {
            show_all.set(false);
            expanded.set(HashSet::new());
            || ()
        });
    }

    let on_close = {
        let on_close = props.on_close.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            on_close.emit(());
        })
    };

    let content = match &props.model {
        Some(model) => {
            let value_cell = |entry: &PropertyEntry| -> Html {
                match &entry.value {
                    DisplayValue::Truncated { preview, full } if !expanded.contains(&entry.name) => {
                        let expanded = expanded.clone();
                        let name = entry.name.clone();
                        let onclick = Callback::from(move |e: MouseEvent| {
                            e.prevent_default();
                            let mut next = (*expanded).clone();
                            next.insert(name.clone());
                            expanded.set(next);
                        });
                        html! {
                            <span class="truncated-value" title={full.clone()}>
                                {format!("{preview}... ")}
                                <a href="#" class="show-more text-blue-600 hover:underline" {onclick}>{"show more"}</a>
                            </span>
                        }
                    }
                    value => html! { {value.full().to_string()} },
                }
            };

            let render_rows = |entries: &[PropertyEntry]| -> Html {
                model
                    .rows(entries)
                    .into_iter()
                    .map(|row| {
                        if model.compact {
                            html! {
                                <tr>
                                    { for row.iter().map(|entry| html! {
                                        <td class="px-2 py-1 align-top">
                                            <strong>{&entry.name}</strong>{": "}{value_cell(entry)}
                                        </td>
                                    }) }
                                    if row.len() == 1 { <td></td> }
                                </tr>
                            }
                        } else {
                            html! {
                                <>
                                    { for row.iter().map(|entry| html! {
                                        <tr>
                                            <th scope="row" class="px-2 py-1 text-left align-top font-medium">{&entry.name}</th>
                                            <td class="px-2 py-1 align-top">{value_cell(entry)}</td>
                                        </tr>
                                    }) }
                                </>
                            }
                        }
                    })
                    .collect()
            };

            let on_show_all = {
                let show_all = show_all.clone();
                Callback::from(move |_: MouseEvent| show_all.set(true))
            };

            html! {
                <div>
                    <h5 class="font-semibold mb-2">{&model.title}</h5>
                    <table class="w-full text-xs">
                        <tbody>
                            { render_rows(&model.initial) }
                            if *show_all { { render_rows(&model.remainder) } }
                        </tbody>
                    </table>
                    if model.has_more() && !*show_all {
                        <div class="text-center mt-2">
                            <button
                                type="button"
                                class="show-all-props px-2 py-1 text-xs border border-blue-500 text-blue-600 rounded hover:bg-blue-50"
                                onclick={on_show_all}
                            >
                                {model.show_more_label()}
                            </button>
                        </div>
                    }
                </div>
            }
        }
        None => html! {},
    };

    let style = if props.model.is_some() { "display: block;" } else { "display: none;" };

    html! {
        <div
            id="popup"
            ref={props.node_ref.clone()}
            class="ol-popup relative bg-white rounded-lg shadow-lg border border-gray-300 p-3 min-w-[240px] max-w-[420px] max-h-[360px] overflow-y-auto"
            {style}
        >
            <a href="#" id="popup-closer" class="ol-popup-closer float-right text-gray-500 hover:text-gray-800" onclick={on_close}>{"✕"}</a>
            <div id="popup-content">{content}</div>
        </div>
    }
}
