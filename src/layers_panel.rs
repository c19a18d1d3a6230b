use web_sys::HtmlSelectElement;
use yew::prelude::*;

use crate::controls::ControlPanel;
use crate::layers::{Basemap, LayerGroup, LayerRole};
use crate::utils::{checkbox_checked, select_value};

#[derive(Properties, PartialEq)]
pub struct LayersPanelProps {
    pub controls: ControlPanel,
    pub on_toggle: Callback<(LayerRole, bool)>,
    pub on_basemap: Callback<Basemap>,
}

#[function_component(LayersPanel)]
pub fn layers_panel(props: &LayersPanelProps) -> Html {
    let selector_ref = use_node_ref();

    // the `selected` attribute stops steering a select once the user picked
    // an option, so forced changes (logout) set the property directly
    {
        let selector_ref = selector_ref.clone();
        use_effect_with(props.controls.basemap(), move |basemap| {
            if let Some(select) = selector_ref.cast::<HtmlSelectElement>() {
                select.set_value(basemap.value());
            }
            || ()
        });
    }

    let on_basemap_change = {
        let on_basemap = props.on_basemap.clone();
        Callback::from(move |e: Event| {
            let Some(value) = select_value(&e) else {
                return;
            };
            match Basemap::from_value(&value) {
                Some(basemap) => on_basemap.emit(basemap),
                None => log::warn!("Unknown basemap option {value}"),
            }
        })
    };

    html! {
        <div class="w-64 flex-none bg-white border-r border-gray-300 p-4 overflow-y-auto">
            <h2 class="text-lg font-semibold pb-3 mb-4 border-b border-gray-200">{"Layers"}</h2>

            <div class="mb-4">
                <label for="basemap-selector" class="block text-sm font-medium text-gray-700 mb-1">
                    {"Basemap"}
                </label>
                <select
                    id="basemap-selector"
                    ref={selector_ref}
                    onchange={on_basemap_change}
                    class="w-full px-2 py-1 border border-gray-300 rounded text-sm"
                >
                    {
                        Basemap::ALL.into_iter().map(|basemap| {
                            let disabled = basemap == Basemap::Boundary
                                && props.controls.is_boundary_option_disabled();
                            html! {
                                <option
                                    key={basemap.value()}
                                    value={basemap.value()}
                                    selected={props.controls.basemap() == basemap}
                                    {disabled}
                                >
                                    {basemap.label()}
                                </option>
                            }
                        }).collect::<Html>()
                    }
                </select>
            </div>

            <div class="space-y-4">
                {
                    LayerGroup::CONTROLLED.into_iter().map(|group| {
                        let group_disabled = props.controls.is_group_disabled(group);
                        html! {
                            <div
                                key={group.title()}
                                class={classes!(
                                    "layer-group",
                                    group_disabled.then_some("disabled-layer-group opacity-50")
                                )}
                            >
                                <h3 class="text-sm font-semibold text-gray-700 mb-2">{group.title()}</h3>
                                { for LayerRole::roles_in(group).map(|role| layer_checkbox(props, role)) }
                            </div>
                        }
                    }).collect::<Html>()
                }
            </div>
        </div>
    }
}

fn layer_checkbox(props: &LayersPanelProps, role: LayerRole) -> Html {
    let (Some(id), Some(state)) = (role.checkbox_id(), props.controls.checkbox(role)) else {
        return html! {};
    };

    let onchange = {
        let on_toggle = props.on_toggle.clone();
        Callback::from(move |e: Event| {
            if let Some(checked) = checkbox_checked(&e) {
                on_toggle.emit((role, checked));
            }
        })
    };

    html! {
        <label key={id.clone()} for={id.clone()} class="flex items-center gap-2 py-1 text-sm cursor-pointer">
            <input
                type="checkbox"
                id={id}
                checked={state.checked}
                disabled={state.disabled}
                {onchange}
            />
            <span>{role.title()}</span>
        </label>
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;
    use web_sys::{EventInit, HtmlElement};

    use super::*;
    use crate::config::PortalConfig;
    use crate::layers::LayerSet;

    wasm_bindgen_test_configure!(run_in_browser);

    #[function_component(Host)]
    fn host() -> Html {
        let portal = use_mut_ref(|| {
            let mut layers = LayerSet::from_config(&PortalConfig::default());
            let mut controls = ControlPanel::new();
            controls.bind(&layers);
            controls.apply_access(true, &mut layers);
            (layers, controls)
        });
        let version = use_state(|| 0u32);

        let on_basemap = {
            let portal = portal.clone();
            let version = version.clone();
            Callback::from(move |basemap: Basemap| {
                {
                    let mut portal = portal.borrow_mut();
                    let (layers, controls) = &mut *portal;
                    controls.select_basemap(basemap, layers);
                }
                version.set(*version + 1);
            })
        };
        let on_logout = {
            let portal = portal.clone();
            let version = version.clone();
            Callback::from(move |_: MouseEvent| {
                {
                    let mut portal = portal.borrow_mut();
                    let (layers, controls) = &mut *portal;
                    controls.apply_access(false, layers);
                }
                version.set(*version + 1);
            })
        };

        let controls = portal.borrow().1.clone();
        html! {
            <>
                <LayersPanel {controls} on_toggle={Callback::from(|_: (LayerRole, bool)| ())} {on_basemap} />
                <button id="logout" onclick={on_logout}>{"Logout"}</button>
            </>
        }
    }

    async fn next_tick() {
        let promise = js_sys::Promise::new(&mut |resolve, _| {
            gloo_utils::window()
                .set_timeout_with_callback(&resolve)
                .unwrap();
        });
        wasm_bindgen_futures::JsFuture::from(promise).await.unwrap();
    }

    fn element<T: JsCast>(id: &str) -> T {
        gloo_utils::document()
            .get_element_by_id(id)
            .unwrap()
            .dyn_into::<T>()
            .unwrap()
    }

    #[wasm_bindgen_test]
    async fn test_selector_follows_forced_basemap_change() {
        let root = gloo_utils::document().create_element("div").unwrap();
        gloo_utils::body().append_child(&root).unwrap();
        yew::Renderer::<Host>::with_root(root).render();
        next_tick().await;

        let selector = element::<HtmlSelectElement>("basemap-selector");
        assert_eq!(selector.value(), "osm");

        selector.set_value("satellite");
        let init = EventInit::new();
        init.set_bubbles(true);
        let change = Event::new_with_event_init_dict("change", &init).unwrap();
        selector.dispatch_event(&change).unwrap();
        next_tick().await;
        assert_eq!(selector.value(), "satellite");

        element::<HtmlElement>("logout").click();
        next_tick().await;
        assert_eq!(selector.value(), "osm");
    }
}
