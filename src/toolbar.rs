use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ToolbarProps {
    pub identify_active: bool,
    pub measure_active: bool,
    /// Tools stay disabled until the map exists.
    pub map_ready: bool,
    pub on_identify: Callback<()>,
    pub on_measure: Callback<()>,
    pub on_screenshot: Callback<()>,
}

fn tool_button(id: &'static str, label: &'static str, active: bool, disabled: bool, onclick: Callback<()>) -> Html {
    html! {
        <button
            {id}
            type="button"
            {disabled}
            onclick={Callback::from(move |_: MouseEvent| onclick.emit(()))}
            class={classes!(
                "w-full",
                "px-3",
                "py-2",
                "rounded",
                "text-sm",
                "border",
                "transition-colors",
                if active { "active bg-blue-500 text-white border-blue-500" } else { "bg-white border-gray-300 hover:bg-gray-100" },
                disabled.then_some("opacity-50 cursor-not-allowed")
            )}
        >
            {label}
        </button>
    }
}

#[function_component(Toolbar)]
pub fn toolbar(props: &ToolbarProps) -> Html {
    let disabled = !props.map_ready;

    html! {
        <div class="p-4 border-t border-gray-200">
            <h2 class="text-lg font-semibold pb-3 mb-4 border-b border-gray-200">{"Tools"}</h2>
            <div class="space-y-2">
                { tool_button("tool-identify", "Identify", props.identify_active, disabled, props.on_identify.clone()) }
                { tool_button("tool-measure", "Measure distance", props.measure_active, disabled, props.on_measure.clone()) }
                { tool_button("tool-screenshot", "Map screenshot", false, disabled, props.on_screenshot.clone()) }
            </div>
        </div>
    }
}
