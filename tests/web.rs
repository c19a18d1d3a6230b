//! Browser tests, run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use geoportal::auth::{is_authenticated, AuthSession, LocalStorageStore, SessionStore, UserProfile};
use geoportal::config::PortalConfig;
use geoportal::controls::ControlPanel;
use geoportal::layers::{Basemap, LayerRole, LayerSet};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_config_defaults_without_page_block() {
    assert_eq!(PortalConfig::load(), PortalConfig::default());
}

#[wasm_bindgen_test]
fn test_local_storage_session_roundtrip() {
    let store = LocalStorageStore;
    store.clear();
    assert!(store.load().is_none());

    let session = AuthSession {
        access_token: "token-123".to_string(),
        user: UserProfile {
            id: 7,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            is_active: true,
            ..UserProfile::default()
        },
    };
    store.save(&session).unwrap();
    assert!(is_authenticated(&store));
    assert_eq!(store.load(), Some(session));

    store.clear();
    assert!(!is_authenticated(&store));
}

#[wasm_bindgen_test]
fn test_anonymous_access_locks_layers() {
    let mut layers = LayerSet::from_config(&PortalConfig::default());
    let mut controls = ControlPanel::new();
    controls.bind(&layers);

    controls.apply_access(true, &mut layers);
    controls.toggle(LayerRole::Railway, true, &mut layers);
    assert!(layers.is_visible(LayerRole::Railway));

    controls.apply_access(false, &mut layers);
    assert!(!layers.is_visible(LayerRole::Railway));
    assert_eq!(controls.basemap(), Basemap::Osm);
}
