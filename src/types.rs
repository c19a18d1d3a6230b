use serde::{Deserialize, Serialize};

/// A point in map projection units, or `(lon, lat)` degrees where stated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

/// Map projections the portal knows how to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    WebMercator,
    Wgs84,
}

impl Projection {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "EPSG:3857" | "EPSG:900913" | "EPSG:102100" => Some(Projection::WebMercator),
            "EPSG:4326" | "CRS:84" => Some(Projection::Wgs84),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Projection::WebMercator => "EPSG:3857",
            Projection::Wgs84 => "EPSG:4326",
        }
    }

    pub fn meters_per_unit(&self) -> f64 {
        match self {
            Projection::WebMercator => 1.0,
            // metres per degree on the 6370997 m sphere
            Projection::Wgs84 => 2.0 * std::f64::consts::PI * 6_370_997.0 / 360.0,
        }
    }
}

/// Snapshot of the map view taken when the user clicks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub resolution: f64,
    pub projection: Projection,
}

/// A single map click as delivered by the map engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapClick {
    pub coordinate: Coordinate,
    pub view: ViewState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_codes() {
        assert_eq!(Projection::from_code("EPSG:3857"), Some(Projection::WebMercator));
        assert_eq!(Projection::from_code("EPSG:32641"), None);
        assert_eq!(Projection::WebMercator.code(), "EPSG:3857");
    }
}
