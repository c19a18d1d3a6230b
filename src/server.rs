use gloo::net::http::Request;

use crate::config::PortalConfig;
use crate::error::{PortalError, Result};
use crate::layers::wms::capabilities_url;

/// Probe the WMS endpoint with a GetCapabilities request.
///
/// Any answer outside 2xx, or no answer at all, means the map cannot be built.
pub async fn check_geoserver(config: &PortalConfig) -> Result<()> {
    let url = capabilities_url(&config.geoserver_url);
    log::info!("Checking GeoServer at {}", config.geoserver_url);

    let unreachable = |reason: String| PortalError::ServerUnreachable {
        endpoint: config.geoserver_url.clone(),
        reason,
    };

    let failure = match Request::get(&url).send().await {
        Ok(response) if response.ok() => None,
        Ok(response) => Some(unreachable(format!("HTTP {}", response.status()))),
        Err(e) => Some(unreachable(e.to_string())),
    };
    if let Some(err) = failure {
        log::error!("{err}");
        return Err(err);
    }

    log::info!("GeoServer is available");
    Ok(())
}

/// Banner text shown when the probe fails.
pub fn unreachable_message(config: &PortalConfig, err: &PortalError) -> String {
    format!(
        "Failed to connect to GeoServer: {err}. Make sure GeoServer is running at {}",
        config.geoserver_url
    )
}
