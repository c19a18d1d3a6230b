mod app;
mod auth_panel;
mod layers_panel;
mod toolbar;
mod utils;

pub mod components;

// Map and portal logic, independent of the UI
pub mod auth;
pub mod config;
pub mod controls;
pub mod error;
pub mod identify;
pub mod layers;
pub mod map;
pub mod measure;
pub mod server;
pub mod types;

use app::App;
use config::PortalConfig;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn run_app() {
    let level = PortalConfig::load().log_level();
    wasm_logger::init(wasm_logger::Config::new(level));
    yew::Renderer::<App>::new().render();
}
