/// Sidebar group a layer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerGroup {
    Base,
    Natural,
    Industry,
    Infrastructure,
    Boundary,
}

impl LayerGroup {
    /// Groups rendered as checkbox lists (everything except base maps).
    pub const CONTROLLED: [LayerGroup; 4] = [
        LayerGroup::Boundary,
        LayerGroup::Industry,
        LayerGroup::Infrastructure,
        LayerGroup::Natural,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            LayerGroup::Base => "Base maps",
            LayerGroup::Natural => "Natural features",
            LayerGroup::Industry => "Industry",
            LayerGroup::Infrastructure => "Infrastructure",
            LayerGroup::Boundary => "Boundaries",
        }
    }
}

/// How a layer participates in visibility rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// Mutually exclusive background map.
    Base,
    /// Independently toggled overlay.
    Thematic,
    /// Always-on-top boundary overlay.
    Boundary,
}

/// Every layer the portal knows about, in z-order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerRole {
    Osm,
    Satellite,
    Topo,
    Vegetation,
    WaterPolygons,
    WaterLines,
    IndustrialAreas,
    SteelMills,
    Mines,
    Quarries,
    Chimneys,
    Kilns,
    Railway,
    Boundary,
}

impl LayerRole {
    pub const ALL: [LayerRole; 14] = [
        LayerRole::Osm,
        LayerRole::Satellite,
        LayerRole::Topo,
        LayerRole::Vegetation,
        LayerRole::WaterPolygons,
        LayerRole::WaterLines,
        LayerRole::IndustrialAreas,
        LayerRole::SteelMills,
        LayerRole::Mines,
        LayerRole::Quarries,
        LayerRole::Chimneys,
        LayerRole::Kilns,
        LayerRole::Railway,
        LayerRole::Boundary,
    ];

    /// Order in which WMS layers are tried by the identify tool.
    pub const IDENTIFY_ORDER: [LayerRole; 11] = [
        LayerRole::IndustrialAreas,
        LayerRole::SteelMills,
        LayerRole::Mines,
        LayerRole::Quarries,
        LayerRole::Chimneys,
        LayerRole::Kilns,
        LayerRole::Railway,
        LayerRole::Vegetation,
        LayerRole::WaterPolygons,
        LayerRole::WaterLines,
        LayerRole::Boundary,
    ];

    /// Stable id shared with the map bridge.
    pub fn id(&self) -> &'static str {
        match self {
            LayerRole::Osm => "osm",
            LayerRole::Satellite => "satellite",
            LayerRole::Topo => "topo",
            LayerRole::Vegetation => "vegetation",
            LayerRole::WaterPolygons => "water-polygons",
            LayerRole::WaterLines => "water-lines",
            LayerRole::IndustrialAreas => "industrial-areas",
            LayerRole::SteelMills => "steel-mills",
            LayerRole::Mines => "mines",
            LayerRole::Quarries => "quarries",
            LayerRole::Chimneys => "chimneys",
            LayerRole::Kilns => "kilns",
            LayerRole::Railway => "railways",
            LayerRole::Boundary => "boundary",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.id() == id)
    }

    pub fn title(&self) -> &'static str {
        match self {
            LayerRole::Osm => "OpenStreetMap",
            LayerRole::Satellite => "Satellite",
            LayerRole::Topo => "Topographic",
            LayerRole::Vegetation => "Vegetation",
            LayerRole::WaterPolygons => "Water Polygons",
            LayerRole::WaterLines => "Water Lines",
            LayerRole::IndustrialAreas => "Industrial Areas",
            LayerRole::SteelMills => "Steel Mills",
            LayerRole::Mines => "Mines",
            LayerRole::Quarries => "Quarries",
            LayerRole::Chimneys => "Chimneys",
            LayerRole::Kilns => "Kilns",
            LayerRole::Railway => "Railways",
            LayerRole::Boundary => "Boundary",
        }
    }

    /// Layer name inside the GeoServer workspace, `None` for tile base maps.
    pub fn server_layer(&self) -> Option<&'static str> {
        match self {
            LayerRole::Osm | LayerRole::Satellite | LayerRole::Topo => None,
            LayerRole::Vegetation => Some("vegetation-polygon"),
            LayerRole::WaterPolygons => Some("water-polygon"),
            LayerRole::WaterLines => Some("water-line"),
            LayerRole::IndustrialAreas => Some("landuse_industrial"),
            LayerRole::SteelMills => Some("industrial_steel_mill"),
            LayerRole::Mines => Some("industrial_mine"),
            LayerRole::Quarries => Some("landuse_quarry"),
            LayerRole::Chimneys => Some("man_made_chimney"),
            LayerRole::Kilns => Some("man_made_kiln"),
            LayerRole::Railway => Some("railway-line"),
            LayerRole::Boundary => Some("boundary-polygon"),
        }
    }

    pub fn group(&self) -> LayerGroup {
        match self {
            LayerRole::Osm | LayerRole::Satellite | LayerRole::Topo => LayerGroup::Base,
            LayerRole::Vegetation | LayerRole::WaterPolygons | LayerRole::WaterLines => {
                LayerGroup::Natural
            }
            LayerRole::IndustrialAreas
            | LayerRole::SteelMills
            | LayerRole::Mines
            | LayerRole::Quarries
            | LayerRole::Chimneys
            | LayerRole::Kilns => LayerGroup::Industry,
            LayerRole::Railway => LayerGroup::Infrastructure,
            LayerRole::Boundary => LayerGroup::Boundary,
        }
    }

    pub fn kind(&self) -> LayerKind {
        match self.group() {
            LayerGroup::Base => LayerKind::Base,
            LayerGroup::Boundary => LayerKind::Boundary,
            _ => LayerKind::Thematic,
        }
    }

    /// DOM id of the sidebar checkbox; base maps use the selector instead.
    pub fn checkbox_id(&self) -> Option<String> {
        match self.kind() {
            LayerKind::Base => None,
            _ => Some(format!("layer-{}", self.id())),
        }
    }

    pub fn roles_in(group: LayerGroup) -> impl Iterator<Item = LayerRole> {
        Self::ALL.into_iter().filter(move |role| role.group() == group)
    }
}

/// Options of the basemap `<select>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Basemap {
    #[default]
    Osm,
    Satellite,
    Topo,
    /// Vector boundary map: no tile background, natural layers switched on.
    Boundary,
}

impl Basemap {
    pub const ALL: [Basemap; 4] = [
        Basemap::Osm,
        Basemap::Satellite,
        Basemap::Topo,
        Basemap::Boundary,
    ];

    pub fn value(&self) -> &'static str {
        match self {
            Basemap::Osm => "osm",
            Basemap::Satellite => "satellite",
            Basemap::Topo => "topo",
            Basemap::Boundary => "boundary",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.value() == value)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Basemap::Osm => "OpenStreetMap",
            Basemap::Satellite => "Satellite imagery",
            Basemap::Topo => "Topographic",
            Basemap::Boundary => "Vector boundary map",
        }
    }

    /// Tile layer backing this basemap, if any.
    pub fn layer(&self) -> Option<LayerRole> {
        match self {
            Basemap::Osm => Some(LayerRole::Osm),
            Basemap::Satellite => Some(LayerRole::Satellite),
            Basemap::Topo => Some(LayerRole::Topo),
            Basemap::Boundary => None,
        }
    }
}
