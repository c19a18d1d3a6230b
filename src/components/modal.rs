use yew::prelude::*;

use crate::utils::screenshot_file_name;

/// Props for a dialog window
#[derive(Properties, PartialEq)]
pub struct ModalProps {
    pub id: AttrValue,
    pub title: AttrValue,
    pub on_close: Callback<()>,
    #[prop_or_default]
    pub children: Html,
}

/// Centered dialog over a dimmed backdrop. Clicking the backdrop closes it.
#[function_component(Modal)]
pub fn modal(props: &ModalProps) -> Html {
    let on_backdrop = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };
    let on_close = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };
    // keep clicks inside the dialog from reaching the backdrop
    let stop = Callback::from(|e: MouseEvent| e.stop_propagation());

    html! {
        <div
            class="modal fixed inset-0 z-50 flex items-center justify-center bg-black/40"
            onclick={on_backdrop}
        >
            <div
                id={props.id.clone()}
                class="bg-white rounded-lg shadow-xl w-full max-w-lg max-h-[90vh] overflow-y-auto"
                onclick={stop}
            >
                <div class="flex items-center justify-between p-4 border-b border-gray-200">
                    <h2 class="text-lg font-semibold">{props.title.clone()}</h2>
                    <button
                        type="button"
                        class="text-gray-500 hover:text-gray-800 text-xl leading-none"
                        aria-label="Close"
                        onclick={on_close}
                    >
                        {"×"}
                    </button>
                </div>
                <div class="p-4">
                    { props.children.clone() }
                </div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct AboutModalProps {
    pub on_close: Callback<()>,
}

#[function_component(AboutModal)]
pub fn about_modal(props: &AboutModalProps) -> Html {
    html! {
        <Modal id="aboutModal" title="About the geoportal" on_close={props.on_close.clone()}>
            <div class="space-y-3 text-sm text-gray-700">
                <p>
                    {"An interactive map of the region's natural environment, industry and infrastructure, \
                      served by GeoServer over WMS."}
                </p>
                <p>
                    {"Basemaps are available to everyone. Thematic layers, the boundary basemap and \
                      attribute identification require an account."}
                </p>
                <p class="text-xs text-gray-500">{format!("Version {}", env!("CARGO_PKG_VERSION"))}</p>
            </div>
        </Modal>
    }
}

#[derive(Properties, PartialEq)]
pub struct ScreenshotModalProps {
    /// `data:image/png` URL of the captured map.
    pub image: AttrValue,
    pub on_close: Callback<()>,
}

#[function_component(ScreenshotModal)]
pub fn screenshot_modal(props: &ScreenshotModalProps) -> Html {
    let file_name = screenshot_file_name(js_sys::Date::now());

    html! {
        <Modal id="screenshotModal" title="Map screenshot" on_close={props.on_close.clone()}>
            <img id="screenshot-image" src={props.image.clone()} alt="Map screenshot" class="w-full border border-gray-200 rounded" />
            <a
                id="download-screenshot"
                href={props.image.clone()}
                download={file_name}
                class="mt-4 block w-full px-4 py-2 bg-blue-500 text-white text-center rounded-lg text-sm font-medium hover:bg-blue-600 transition-colors"
            >
                {"Download PNG"}
            </a>
        </Modal>
    }
}
