//! Lengths and areas of `(lon, lat)` geometries on the sphere.
//!
//! The map bridge hands sketches over in geographic coordinates, so nothing
//! here knows about the view projection.

use geo::{ChamberlainDuquetteArea, Coord, Distance, Haversine, LineString, Point, Polygon};

use crate::types::Coordinate;

/// Mean Earth radius (IUGG), metres.
pub const EARTH_RADIUS: f64 = 6_371_008.8;
/// Radius `geo` integrates Chamberlain-Duquette areas on.
const EQUATORIAL_RADIUS: f64 = 6_378_137.0;

fn coord(c: &Coordinate) -> Coord {
    Coord { x: c.x, y: c.y }
}

/// Length in metres of a line given in `(lon, lat)`.
pub fn line_length(lon_lat: &[Coordinate]) -> f64 {
    lon_lat
        .windows(2)
        .map(|pair| Haversine.distance(Point(coord(&pair[0])), Point(coord(&pair[1]))))
        .sum()
}

/// Area in square metres of a polygon given as `(lon, lat)` rings, outer ring
/// first and holes after it.
pub fn polygon_area(rings: &[Vec<Coordinate>]) -> f64 {
    let mut rings = rings.iter().map(|ring| LineString::from_iter(ring.iter().map(coord)));
    let Some(exterior) = rings.next() else {
        return 0.0;
    };
    let polygon = Polygon::new(exterior, rings.collect());
    let scale = EARTH_RADIUS / EQUATORIAL_RADIUS;
    polygon.chamberlain_duquette_unsigned_area() * scale * scale
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `"500 m"`, `"1.5 km"`.
pub fn format_length(meters: f64) -> String {
    if meters > 1000.0 {
        format!("{} km", round2(meters / 1000.0))
    } else {
        format!("{} m", round2(meters))
    }
}

/// `"250 m²"`, `"0.04 km²"`.
pub fn format_area(square_meters: f64) -> String {
    if square_meters > 10_000.0 {
        format!("{} km²", round2(square_meters / 1_000_000.0))
    } else {
        format!("{} m²", round2(square_meters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `(lon, lat)` line of `meters` going north along a meridian.
    fn northward(meters: f64) -> Vec<Coordinate> {
        let start = Coordinate::new(60.6122, 55.1544);
        let d_lat = (meters / EARTH_RADIUS).to_degrees();
        vec![start, Coordinate::new(start.x, start.y + d_lat)]
    }

    fn square(min: f64, max: f64) -> Vec<Coordinate> {
        vec![
            Coordinate::new(min, min),
            Coordinate::new(max, min),
            Coordinate::new(max, max),
            Coordinate::new(min, max),
            Coordinate::new(min, min),
        ]
    }

    #[test]
    fn test_line_of_500_m_stays_in_meters() {
        assert_eq!(format_length(line_length(&northward(500.0))), "500 m");
    }

    #[test]
    fn test_line_of_1500_m_switches_to_km() {
        assert_eq!(format_length(line_length(&northward(1500.0))), "1.5 km");
    }

    #[test]
    fn test_length_sums_segments() {
        let mut line = northward(500.0);
        line.push(Coordinate::new(line[1].x, line[0].y));
        let there_and_back = line_length(&line);
        assert!((there_and_back - 1000.0).abs() < 1e-3);
        assert_eq!(line_length(&line[..1]), 0.0);
    }

    #[test]
    fn test_length_boundary_is_exclusive() {
        assert_eq!(format_length(1000.0), "1000 m");
        assert_eq!(format_length(1000.004), "1 km");
        assert_eq!(format_length(12.346), "12.35 m");
    }

    #[test]
    fn test_area_formatting() {
        assert_eq!(format_area(250.0), "250 m²");
        assert_eq!(format_area(10_000.0), "10000 m²");
        assert_eq!(format_area(2_500_000.0), "2.5 km²");
    }

    #[test]
    fn test_polygon_area_one_degree_cell_at_equator() {
        let area = polygon_area(&[square(0.0, 1.0)]);
        // R² · Δλ · (sin φ2 − sin φ1)
        let expected = EARTH_RADIUS.powi(2) * 1f64.to_radians() * 1f64.to_radians().sin();
        assert!((area - expected).abs() / expected < 5e-3);
    }

    #[test]
    fn test_polygon_area_subtracts_holes() {
        let outer = polygon_area(&[square(0.0, 1.0)]);
        let hole = polygon_area(&[square(0.25, 0.75)]);
        let with_hole = polygon_area(&[square(0.0, 1.0), square(0.25, 0.75)]);
        assert!((with_hole - (outer - hole)).abs() / outer < 1e-6);
        assert_eq!(polygon_area(&[]), 0.0);
    }
}
