use serde::Serialize;

use super::role::{LayerGroup, LayerKind, LayerRole};
use super::wms::WmsSource;
use crate::config::PortalConfig;

const ARCGIS_IMAGERY: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}";
const ARCGIS_TOPO: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Topo_Map/MapServer/tile/{z}/{y}/{x}";

/// Where a layer gets its tiles from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LayerSource {
    Osm,
    Xyz { url: String, attribution: String },
    Wms(WmsSource),
}

/// A single map layer and its visibility flag.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerHandle {
    pub role: LayerRole,
    pub title: String,
    pub visible: bool,
    pub source: LayerSource,
}

impl LayerHandle {
    pub fn new(role: LayerRole, source: LayerSource, visible: bool) -> Self {
        Self {
            role,
            title: role.title().to_string(),
            visible,
            source,
        }
    }

    pub fn kind(&self) -> LayerKind {
        self.role.kind()
    }

    /// Only WMS layers can answer GetFeatureInfo.
    pub fn is_queryable(&self) -> bool {
        matches!(self.source, LayerSource::Wms(_))
    }

    pub fn wms(&self) -> Option<&WmsSource> {
        match &self.source {
            LayerSource::Wms(source) => Some(source),
            _ => None,
        }
    }
}

/// What the map bridge needs to build a layer.
#[derive(Debug, Serialize)]
pub struct LayerDescriptor<'a> {
    pub id: &'static str,
    pub title: &'a str,
    pub visible: bool,
    pub source: &'a LayerSource,
}

/// The fixed set of layers, kept in z-order (base maps first, boundary last).
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSet {
    layers: Vec<LayerHandle>,
}

impl LayerSet {
    /// Build every layer from configuration. No network access happens here;
    /// tiles are fetched lazily by the map.
    pub fn from_config(config: &PortalConfig) -> Self {
        let layers = LayerRole::ALL
            .into_iter()
            .map(|role| {
                let source = match role {
                    LayerRole::Osm => LayerSource::Osm,
                    LayerRole::Satellite => LayerSource::Xyz {
                        url: ARCGIS_IMAGERY.to_string(),
                        attribution: "Tiles © ArcGIS World Imagery".to_string(),
                    },
                    LayerRole::Topo => LayerSource::Xyz {
                        url: ARCGIS_TOPO.to_string(),
                        attribution: "Tiles © ArcGIS World Topo Map".to_string(),
                    },
                    wms_role => {
                        let name = wms_role.server_layer().unwrap_or_default();
                        LayerSource::Wms(WmsSource::new(
                            config.geoserver_url.clone(),
                            config.qualified_layer(name),
                        ))
                    }
                };
                LayerHandle::new(role, source, role == LayerRole::Osm)
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Layer set created: {} layers, {} WMS",
            layers.len(),
            layers.iter().filter(|l| l.is_queryable()).count()
        );

        Self { layers }
    }

    pub fn get(&self, role: LayerRole) -> Option<&LayerHandle> {
        self.layers.iter().find(|l| l.role == role)
    }

    pub fn is_visible(&self, role: LayerRole) -> bool {
        self.get(role).is_some_and(|l| l.visible)
    }

    /// Set a layer's visibility. Returns `true` if it changed.
    pub fn set_visible(&mut self, role: LayerRole, visible: bool) -> bool {
        match self.layers.iter_mut().find(|l| l.role == role) {
            Some(layer) if layer.visible != visible => {
                layer.visible = visible;
                true
            }
            _ => false,
        }
    }

    pub fn set_group_visible(&mut self, group: LayerGroup, visible: bool) {
        for role in LayerRole::roles_in(group) {
            self.set_visible(role, visible);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerHandle> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Queryable layers in the order the identify tool tries them.
    pub fn queryable_in_identify_order(&self) -> impl Iterator<Item = &LayerHandle> {
        LayerRole::IDENTIFY_ORDER
            .into_iter()
            .filter_map(|role| self.get(role))
            .filter(|l| l.is_queryable())
    }

    pub fn visible_queryable(&self) -> Vec<&LayerHandle> {
        self.queryable_in_identify_order()
            .filter(|l| l.visible)
            .collect()
    }

    /// `(role, visible)` pairs in z-order, used to mirror state into the map.
    pub fn visibility(&self) -> Vec<(LayerRole, bool)> {
        self.layers.iter().map(|l| (l.role, l.visible)).collect()
    }

    pub fn descriptors(&self) -> Vec<LayerDescriptor<'_>> {
        self.layers
            .iter()
            .map(|l| LayerDescriptor {
                id: l.role.id(),
                title: &l.title,
                visible: l.visible,
                source: &l.source,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer_set() -> LayerSet {
        LayerSet::from_config(&PortalConfig::default())
    }

    #[test]
    fn test_from_config_defaults() {
        let set = layer_set();
        assert_eq!(set.len(), LayerRole::ALL.len());
        assert!(set.is_visible(LayerRole::Osm));
        let visible: Vec<_> = set.iter().filter(|l| l.visible).map(|l| l.role).collect();
        assert_eq!(visible, vec![LayerRole::Osm]);
    }

    #[test]
    fn test_boundary_is_top_most() {
        let set = layer_set();
        assert_eq!(set.iter().last().map(|l| l.role), Some(LayerRole::Boundary));
        assert_eq!(set.iter().next().map(|l| l.role), Some(LayerRole::Osm));
    }

    #[test]
    fn test_wms_params_from_config() {
        let config = PortalConfig {
            geoserver_url: "https://maps.example.org/geoserver/wms".to_string(),
            workspace: "region".to_string(),
            ..PortalConfig::default()
        };
        let set = LayerSet::from_config(&config);
        let railway = set.get(LayerRole::Railway).and_then(|l| l.wms()).unwrap();
        assert_eq!(railway.layers, "region:railway-line");
        assert_eq!(railway.url, "https://maps.example.org/geoserver/wms");
        assert!(railway.tiled);
        assert_eq!(railway.version, "1.1.1");
        assert!(set.get(LayerRole::Satellite).unwrap().wms().is_none());
    }

    #[test]
    fn test_set_visible_reports_change() {
        let mut set = layer_set();
        assert!(set.set_visible(LayerRole::Mines, true));
        assert!(!set.set_visible(LayerRole::Mines, true));
        assert!(set.is_visible(LayerRole::Mines));
    }

    #[test]
    fn test_visible_queryable_keeps_identify_order() {
        let mut set = layer_set();
        set.set_visible(LayerRole::Boundary, true);
        set.set_visible(LayerRole::WaterLines, true);
        set.set_visible(LayerRole::Kilns, true);
        let roles: Vec<_> = set.visible_queryable().iter().map(|l| l.role).collect();
        assert_eq!(
            roles,
            vec![LayerRole::Kilns, LayerRole::WaterLines, LayerRole::Boundary]
        );
    }

    #[test]
    fn test_descriptors_serialize_source_kind() {
        let set = layer_set();
        let json = serde_json::to_value(set.descriptors()).unwrap();
        assert_eq!(json[0]["id"], "osm");
        assert_eq!(json[0]["source"]["kind"], "osm");
        assert_eq!(json[1]["source"]["kind"], "xyz");
        let boundary = &json[LayerRole::ALL.len() - 1];
        assert_eq!(boundary["source"]["kind"], "wms");
        assert_eq!(boundary["source"]["layers"], "geoportal:boundary-polygon");
    }
}
