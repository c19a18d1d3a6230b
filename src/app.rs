use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;
use yew::prelude::*;

use crate::auth::{AuthClient, AuthSession, LocalStorageStore, SessionStore};
use crate::auth_panel::{AuthBanner, AuthHeader, AuthModal, AuthTab};
use crate::components::{AboutModal, MapStatus, MapView, ScreenshotModal};
use crate::config::PortalConfig;
use crate::controls::ControlPanel;
use crate::error::Result;
use crate::identify::{begin_identify, fetch_feature_info, finish_identify, IdentifyTool, PopupModel};
use crate::layers::{Basemap, LayerRole, LayerSet};
use crate::layers_panel::LayersPanel;
use crate::map::scale::{format_scale, map_scale};
use crate::map::{MapEngine, OlMap};
use crate::measure::MeasureTool;
use crate::server::{check_geoserver, unreachable_message};
use crate::toolbar::Toolbar;
use crate::types::MapClick;
use crate::utils::cast_node;

/// Layers and the controls bound to them. Mutated only through [`ControlPanel`].
struct Portal {
    layers: LayerSet,
    controls: ControlPanel,
}

impl Portal {
    fn new(config: &PortalConfig) -> Self {
        let layers = LayerSet::from_config(config);
        let mut controls = ControlPanel::new();
        controls.bind(&layers);
        Self { layers, controls }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum OpenModal {
    None,
    Auth(AuthTab),
    About,
    Screenshot(String),
}

type SharedMap = Rc<RefCell<Option<Rc<OlMap>>>>;

fn sync_map(map: &SharedMap, layers: &LayerSet) {
    if let Some(map) = map.borrow().as_ref() {
        for (role, visible) in layers.visibility() {
            map.set_layer_visible(role, visible);
        }
    }
}

fn scale_text(map: &OlMap, resolution: f64) -> String {
    let mpu = map.view_state().projection.meters_per_unit();
    format_scale(map_scale(resolution, mpu))
}

/// Build the map in its container and hook the status and scale updates.
fn create_map(
    config: &PortalConfig,
    layers: &LayerSet,
    map_ref: &NodeRef,
    popup_ref: &NodeRef,
    status: &UseStateHandle<MapStatus>,
    scale: &UseStateHandle<Option<String>>,
) -> Result<Rc<OlMap>> {
    let target = cast_node::<HtmlElement>(map_ref, "map")?;
    let created = Rc::new(OlMap::new(&target, config, layers)?);

    match cast_node::<HtmlElement>(popup_ref, "popup") {
        Ok(element) => created.bind_popup(&element),
        Err(e) => log::error!("{e}; identify popup is disabled"),
    }

    let rendered = status.clone();
    created.once_render_complete(move || {
        log::info!("Map rendered");
        rendered.set(MapStatus::Ready);
    });

    let weak = Rc::downgrade(&created);
    let footer = scale.clone();
    created.on_resolution_change(move |resolution| {
        if let Some(map) = weak.upgrade() {
            footer.set(Some(scale_text(&map, resolution)));
        }
    });
    scale.set(Some(scale_text(&created, created.view_state().resolution)));

    Ok(created)
}

/// Click handler of the identify tool: query one layer, fill the popup.
fn identify_handler(
    portal: Rc<RefCell<Portal>>,
    map: Weak<OlMap>,
    popup: UseStateHandle<Option<PopupModel>>,
) -> Box<dyn FnMut(MapClick)> {
    Box::new(move |click: MapClick| {
        let Some(engine) = map.upgrade() else {
            return;
        };
        let Some(query) = begin_identify(&portal.borrow().layers, &click, &*engine) else {
            popup.set(None);
            return;
        };

        let map = map.clone();
        let popup = popup.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let answer = fetch_feature_info(&query.url).await;
            if let Some(engine) = map.upgrade() {
                popup.set(finish_identify(&*engine, &query, &click, answer));
            }
        });
    })
}

#[function_component(App)]
pub fn app() -> Html {
    let config = use_memo((), |_| PortalConfig::load());
    let client = use_memo(config.clone(), |config| AuthClient::new(config.auth_api_url.clone()));

    let status = use_state(|| MapStatus::Checking);
    let session = use_state(|| LocalStorageStore.load());
    let modal = use_state(|| OpenModal::None);
    let popup = use_state(|| None::<PopupModel>);
    let scale = use_state(|| None::<String>);
    let identify_active = use_state(|| false);
    let measure_active = use_state(|| false);
    // bumped after every mutation of `portal`
    let render_version = use_state(|| 0u32);

    let portal = use_mut_ref(|| Portal::new(&config));
    let map: SharedMap = use_mut_ref(|| None);
    let identify = use_mut_ref(IdentifyTool::new);
    let measure = use_mut_ref(MeasureTool::new);

    let map_ref = use_node_ref();
    let popup_ref = use_node_ref();

    // Probe GeoServer before building anything
    {
        let config = config.clone();
        let status = status.clone();
        use_effect_with((), move |_| {
            log::info!(
                "Starting geoportal: server {}, workspace {}",
                config.geoserver_url,
                config.workspace
            );
            wasm_bindgen_futures::spawn_local(async move {
                match check_geoserver(&config).await {
                    Ok(()) => status.set(MapStatus::Loading),
                    Err(e) => status.set(MapStatus::Unreachable(unreachable_message(&config, &e))),
                }
            });
            || ()
        });
    }

    // Build the map once the server answered
    {
        let config = config.clone();
        let status = status.clone();
        let scale = scale.clone();
        let portal = portal.clone();
        let map = map.clone();
        let map_ref = map_ref.clone();
        let popup_ref = popup_ref.clone();
        let loading = *status == MapStatus::Loading;

        use_effect_with(loading, move |loading| {
            if *loading && map.borrow().is_none() {
                let portal = portal.borrow();
                let layers = &portal.layers;
                match create_map(&config, layers, &map_ref, &popup_ref, &status, &scale) {
                    Ok(created) => {
                        *map.borrow_mut() = Some(created);
                        sync_map(&map, layers);
                    }
                    Err(e) => {
                        log::error!("{e}; map is not created");
                        status.set(MapStatus::Unreachable(e.to_string()));
                    }
                }
            }
            || ()
        });
    }

    // Lock or unlock layers whenever the login state changes
    {
        let portal = portal.clone();
        let map = map.clone();
        let render_version = render_version.clone();
        let authorized = session.is_some();
        use_effect_with(authorized, move |authorized| {
            {
                let mut portal = portal.borrow_mut();
                let Portal { layers, controls } = &mut *portal;
                controls.apply_access(*authorized, layers);
                sync_map(&map, layers);
            }
            render_version.set(*render_version + 1);
            || ()
        });
    }

    // Escape closes any open dialog
    {
        let modal = modal.clone();
        use_effect_with((), move |_| {
            let listener = EventListener::new(&gloo_utils::document(), "keydown", move |event| {
                if let Some(keyboard_event) = event.dyn_ref::<web_sys::KeyboardEvent>() {
                    if keyboard_event.key() == "Escape" {
                        modal.set(OpenModal::None);
                    }
                }
            });

            move || drop(listener)
        });
    }

    let on_toggle = {
        let portal = portal.clone();
        let map = map.clone();
        let render_version = render_version.clone();
        Callback::from(move |(role, checked): (LayerRole, bool)| {
            {
                let mut portal = portal.borrow_mut();
                let Portal { layers, controls } = &mut *portal;
                controls.toggle(role, checked, layers);
                sync_map(&map, layers);
            }
            render_version.set(*render_version + 1);
        })
    };

    let on_basemap = {
        let portal = portal.clone();
        let map = map.clone();
        let render_version = render_version.clone();
        Callback::from(move |basemap: Basemap| {
            {
                let mut portal = portal.borrow_mut();
                let Portal { layers, controls } = &mut *portal;
                controls.select_basemap(basemap, layers);
                sync_map(&map, layers);
            }
            render_version.set(*render_version + 1);
        })
    };

    let on_identify = {
        let portal = portal.clone();
        let map = map.clone();
        let identify = identify.clone();
        let identify_active = identify_active.clone();
        let popup = popup.clone();
        Callback::from(move |_: ()| {
            let Some(engine) = map.borrow().clone() else {
                log::warn!("Map is not ready");
                return;
            };
            let handler = identify_handler(portal.clone(), Rc::downgrade(&engine), popup.clone());
            let active = identify.borrow_mut().toggle(&*engine, handler);
            if !active {
                popup.set(None);
            }
            identify_active.set(active);
        })
    };

    let on_measure = {
        let map = map.clone();
        let measure = measure.clone();
        let measure_active = measure_active.clone();
        Callback::from(move |_: ()| {
            let Some(engine) = map.borrow().clone() else {
                log::warn!("Map is not ready");
                return;
            };
            let engine: Rc<dyn MapEngine> = engine;
            let active = measure.borrow_mut().toggle(engine);
            measure_active.set(active);
        })
    };

    let on_screenshot = {
        let map = map.clone();
        let modal = modal.clone();
        Callback::from(move |_: ()| {
            let Some(engine) = map.borrow().clone() else {
                return;
            };
            if let Some(image) = engine.snapshot_png() {
                modal.set(OpenModal::Screenshot(image));
            }
        })
    };

    let on_popup_close = {
        let map = map.clone();
        let popup = popup.clone();
        Callback::from(move |_: ()| {
            if let Some(engine) = map.borrow().as_ref() {
                engine.set_popup_position(None);
            }
            popup.set(None);
        })
    };

    let open = |target: OpenModal| {
        let modal = modal.clone();
        Callback::from(move |_: ()| modal.set(target.clone()))
    };

    let on_logged_in = {
        let session = session.clone();
        let modal = modal.clone();
        Callback::from(move |logged_in: AuthSession| {
            session.set(Some(logged_in));
            modal.set(OpenModal::None);
        })
    };

    let on_logout = {
        let client = client.clone();
        let session = session.clone();
        Callback::from(move |_: ()| {
            client.logout(&LocalStorageStore);
            session.set(None);
        })
    };

    let controls = portal.borrow().controls.clone();
    let map_ready = map.borrow().is_some();

    html! {
        <div class="flex flex-col h-screen">
            <header class="flex items-center justify-between px-4 py-2 bg-slate-800 text-white">
                <h1 class="text-lg font-semibold">{"Geoportal"}</h1>
                <AuthHeader
                    session={(*session).clone()}
                    on_login={open(OpenModal::Auth(AuthTab::Login))}
                    on_logout={on_logout}
                    on_about={open(OpenModal::About)}
                />
            </header>

            <div class="flex flex-1 overflow-hidden">
                <aside class="sidebar flex flex-col w-64 flex-none bg-white border-r border-gray-300 overflow-y-auto">
                    if session.is_none() {
                        <AuthBanner on_login={open(OpenModal::Auth(AuthTab::Login))} />
                    }
                    <LayersPanel {controls} {on_toggle} {on_basemap} />
                    <Toolbar
                        identify_active={*identify_active}
                        measure_active={*measure_active}
                        {map_ready}
                        {on_identify}
                        {on_measure}
                        {on_screenshot}
                    />
                </aside>

                <MapView
                    map_ref={map_ref}
                    popup_ref={popup_ref}
                    status={(*status).clone()}
                    scale={(*scale).clone()}
                    popup={(*popup).clone()}
                    {on_popup_close}
                />
            </div>

            {
                match &*modal {
                    OpenModal::None => html! {},
                    OpenModal::Auth(tab) => html! {
                        <AuthModal
                            client={(*client).clone()}
                            initial_tab={*tab}
                            on_login={on_logged_in}
                            on_close={open(OpenModal::None)}
                        />
                    },
                    OpenModal::About => html! { <AboutModal on_close={open(OpenModal::None)} /> },
                    OpenModal::Screenshot(image) => html! {
                        <ScreenshotModal image={image.clone()} on_close={open(OpenModal::None)} />
                    },
                }
            }
        </div>
    }
}
