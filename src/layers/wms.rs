use serde::Serialize;

pub const WMS_VERSION: &str = "1.1.1";

/// Parameters of a tiled GeoServer WMS layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WmsSource {
    pub url: String,
    /// Qualified name, `workspace:layer`.
    pub layers: String,
    pub tiled: bool,
    pub version: String,
}

/// Extra parameters of a GetFeatureInfo request. The map library builds the
/// rest of the URL from the layer source and the view.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInfoParams {
    pub info_format: String,
    pub feature_count: u32,
}

impl Default for FeatureInfoParams {
    fn default() -> Self {
        Self {
            info_format: "application/json".to_string(),
            feature_count: 10,
        }
    }
}

/// `GET {endpoint}?SERVICE=WMS&REQUEST=GetCapabilities`
pub fn capabilities_url(endpoint: &str) -> String {
    append_params(endpoint, &[("SERVICE", "WMS"), ("REQUEST", "GetCapabilities")])
}

/// Append url-encoded query parameters to a possibly relative URL.
pub fn append_params(base: &str, params: &[(&str, &str)]) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish();
    if query.is_empty() {
        return base.to_string();
    }
    let separator = if !base.contains('?') {
        "?"
    } else if base.ends_with('?') || base.ends_with('&') {
        ""
    } else {
        "&"
    };
    format!("{base}{separator}{query}")
}

impl WmsSource {
    pub fn new(url: impl Into<String>, layers: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            layers: layers.into(),
            tiled: true,
            version: WMS_VERSION.to_string(),
        }
    }
}
