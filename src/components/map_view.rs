use yew::prelude::*;

use super::popup::Popup;
use crate::identify::PopupModel;

/// Where the map is in its startup sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum MapStatus {
    Checking,
    /// The probe failed; the map is never built.
    Unreachable(String),
    Loading,
    Ready,
}

/// Props for the map area
#[derive(Properties, PartialEq)]
pub struct MapViewProps {
    /// Container the map is created in
    pub map_ref: NodeRef,

    /// Element bound as the identify popup overlay
    pub popup_ref: NodeRef,

    pub status: MapStatus,

    /// "Scale: 1:N" footer text
    #[prop_or_default]
    pub scale: Option<String>,

    #[prop_or_default]
    pub popup: Option<PopupModel>,

    #[prop_or_default]
    pub on_popup_close: Callback<()>,
}

/// Map container with the startup banner, the popup element and the scale footer.
#[function_component(MapView)]
pub fn map_view(props: &MapViewProps) -> Html {
    let banner = match &props.status {
        MapStatus::Checking => Some(("text-gray-700", "Checking connection to GeoServer…".to_string())),
        MapStatus::Loading => Some(("text-gray-700", "Loading map…".to_string())),
        MapStatus::Unreachable(message) => Some(("text-red-600", message.clone())),
        MapStatus::Ready => None,
    };

    html! {
        <div class="relative flex-1">
            <div id="map" ref={props.map_ref.clone()} class="absolute inset-0" />

            if let Some((color, text)) = banner {
                <div
                    id="map-loading"
                    class="absolute inset-0 z-40 flex items-center justify-center bg-white/80"
                >
                    <div class={classes!("max-w-md", "p-4", "text-center", "text-sm", "font-medium", color)}>
                        {text}
                    </div>
                </div>
            }

            // the map moves the popup into its overlay layer; the wrapper keeps
            // the element's position among siblings stable
            <div>
                <Popup
                    node_ref={props.popup_ref.clone()}
                    model={props.popup.clone()}
                    on_close={props.on_popup_close.clone()}
                />
            </div>

            if let Some(scale) = &props.scale {
                <div
                    id="scale-value"
                    class="absolute bottom-2 right-2 z-30 px-2 py-1 bg-white/90 rounded text-xs text-gray-700"
                >
                    {scale.clone()}
                </div>
            }
        </div>
    }
}
