use serde::Deserialize;

use crate::error::{PortalError, Result};

/// Id of the `<script type="application/json">` block that may override defaults.
pub const CONFIG_ELEMENT_ID: &str = "portal-config";

/// Static settings of the geoportal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub debug: bool,
    /// WMS endpoint, usually proxied by nginx.
    pub geoserver_url: String,
    pub workspace: String,
    /// Longitude, latitude of the initial view.
    pub default_center: [f64; 2],
    pub default_zoom: f64,
    pub auth_api_url: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            debug: true,
            geoserver_url: "/geoserver/wms".to_string(),
            workspace: "geoportal".to_string(),
            default_center: [60.6122, 55.1544],
            default_zoom: 9.0,
            auth_api_url: "http://localhost:8000".to_string(),
        }
    }
}

impl PortalConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| PortalError::Config(e.to_string()))
    }

    /// Read the config block embedded in the host page, falling back to defaults.
    pub fn load() -> Self {
        let element = gloo_utils::document().get_element_by_id(CONFIG_ELEMENT_ID);
        let Some(raw) = element.and_then(|el| el.text_content()) else {
            return Self::default();
        };

        match Self::from_json(&raw) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{e}; using default configuration");
                Self::default()
            }
        }
    }

    pub fn log_level(&self) -> log::Level {
        if self.debug {
            log::Level::Debug
        } else {
            log::Level::Info
        }
    }

    /// Qualified WMS layer name, e.g. `geoportal:railway-line`.
    pub fn qualified_layer(&self, layer_name: &str) -> String {
        format!("{}:{}", self.workspace, layer_name)
    }
}
