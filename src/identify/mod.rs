mod feature_info;

pub use feature_info::*;

use gloo::net::http::Request;

use crate::error::{PortalError, Result};
use crate::layers::{FeatureInfoParams, LayerRole, LayerSet};
use crate::map::{ListenerKey, MapEngine};
use crate::types::MapClick;

/// A GetFeatureInfo request chosen for one click.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifyQuery {
    pub role: LayerRole,
    pub title: String,
    pub url: String,
}

/// Pick the single layer to query: the first visible WMS layer, in identify
/// order, whose source can build a request for the click.
pub fn plan_query(layers: &LayerSet, click: &MapClick, engine: &dyn MapEngine) -> Option<IdentifyQuery> {
    let params = FeatureInfoParams::default();
    layers.visible_queryable().into_iter().find_map(|layer| {
        let url = engine.feature_info_url(layer.role, click, &params)?;
        Some(IdentifyQuery {
            role: layer.role,
            title: layer.title.clone(),
            url,
        })
    })
}

/// Plan the request for a click. When no layer answers the popup is hidden
/// and nothing is sent.
pub fn begin_identify(layers: &LayerSet, click: &MapClick, engine: &dyn MapEngine) -> Option<IdentifyQuery> {
    let query = plan_query(layers, click, engine);
    match &query {
        Some(query) => log::debug!("GetFeatureInfo {}", query.url),
        None => {
            log::debug!("No visible layer can be identified at this point");
            engine.set_popup_position(None);
        }
    }
    query
}

/// Popup content for a feature-info answer. Failures are logged and, like
/// an empty answer, give no popup.
pub fn popup_for(query: &IdentifyQuery, answer: Result<FeatureCollection>) -> Option<PopupModel> {
    match answer {
        Ok(collection) => PopupModel::from_collection(&query.title, &collection),
        Err(e) => {
            log::error!("Failed to fetch feature info for {}: {e}", query.role.id());
            None
        }
    }
}

/// Anchor the popup at the click when the answer has content, hide it otherwise.
pub fn finish_identify(
    engine: &dyn MapEngine,
    query: &IdentifyQuery,
    click: &MapClick,
    answer: Result<FeatureCollection>,
) -> Option<PopupModel> {
    let model = popup_for(query, answer);
    engine.set_popup_position(model.as_ref().map(|_| click.coordinate));
    model
}

/// GET a feature-info URL and parse the GeoJSON answer.
pub async fn fetch_feature_info(url: &str) -> Result<FeatureCollection> {
    let response = Request::get(url).send().await?;
    if !response.ok() {
        return Err(PortalError::Http {
            status: response.status(),
            url: url.to_string(),
        });
    }
    Ok(response.json::<FeatureCollection>().await?)
}

/// Toolbar state of the identify button.
#[derive(Debug, Default)]
pub struct IdentifyTool {
    listener: Option<ListenerKey>,
}

impl IdentifyTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.listener.is_some()
    }

    /// Flip the tool. Activation registers `handler` as the one click
    /// listener; deactivation removes it and hides the popup.
    pub fn toggle(&mut self, engine: &dyn MapEngine, handler: Box<dyn FnMut(MapClick)>) -> bool {
        match self.listener.take() {
            Some(key) => {
                engine.unlisten(key);
                engine.set_popup_position(None);
                log::debug!("Identify tool deactivated");
                false
            }
            None => {
                self.listener = Some(engine.listen_single_click(handler));
                log::debug!("Identify tool activated");
                true
            }
        }
    }
}
