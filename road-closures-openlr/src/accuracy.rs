//! geodesic scoring of decoded references against their source geometry.
use geo::{Coord, Distance, HaversineMeasure, LineString, Point};
use uom::si::{f64::Length, length::meter};

/// mean Earth radius used for all reference accuracy scoring
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// great-circle distance between two WGS84 coordinates (x = longitude, y = latitude).
pub fn haversine_distance(p1: Coord<f64>, p2: Coord<f64>) -> Length {
    let meters =
        HaversineMeasure::new(EARTH_RADIUS_METERS).distance(Point::from(p1), Point::from(p2));
    Length::new::<meter>(meters)
}

pub fn haversine_distance_meters(p1: Coord<f64>, p2: Coord<f64>) -> f64 {
    haversine_distance(p1, p2).get::<meter>()
}

/// mean per-point distance between two coordinate sequences, paired by index.
///
/// points are compared in their original order, there is no nearest-point
/// matching. sequences of different length (or empty ones) cannot be compared
/// and score +∞.
pub fn geometry_accuracy(original: &LineString<f64>, decoded: &LineString<f64>) -> Length {
    let n = original.0.len();
    if n == 0 || n != decoded.0.len() {
        return Length::new::<meter>(f64::INFINITY);
    }
    let total: f64 = original
        .coords()
        .zip(decoded.coords())
        .map(|(a, b)| haversine_distance_meters(*a, *b))
        .sum();
    Length::new::<meter>(total / n as f64)
}

pub fn geometry_accuracy_meters(original: &LineString<f64>, decoded: &LineString<f64>) -> f64 {
    geometry_accuracy(original, decoded).get::<meter>()
}
