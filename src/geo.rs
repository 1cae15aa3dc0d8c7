//! Small-extent geodesy used by every engine.
//!
//! Distances between points use the haversine formula. Shapes (plume rings,
//! slick polygons, risk grids) are built in a local equirectangular frame
//! anchored at their centre: x east, y north, metres. The frame degenerates
//! toward the poles, so shapes are only anchored below [`MAX_FRAME_LAT_DEG`].
//! Shape areas come from their semi-axes, not from the drawn polygon.

use crate::types::GeoPoint;

/// Mean Earth radius (m).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Highest absolute latitude a local frame may be anchored at (degrees).
pub const MAX_FRAME_LAT_DEG: f64 = 85.0;

/// Great-circle distance between two points (m).
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Point displaced by local east/north offsets (m) from `origin`.
///
/// Latitude saturates at the poles.
pub fn offset_xy(origin: GeoPoint, east_m: f64, north_m: f64) -> GeoPoint {
    let dlat = (north_m / EARTH_RADIUS_M).to_degrees();
    let dlon = (east_m / (EARTH_RADIUS_M * origin.lat.to_radians().cos())).to_degrees();
    GeoPoint::new((origin.lat + dlat).clamp(-90.0, 90.0), origin.lon + dlon)
}

/// Point `distance_m` from `origin` along `bearing_deg` (0 = north, 90 = east).
pub fn offset_bearing(origin: GeoPoint, bearing_deg: f64, distance_m: f64) -> GeoPoint {
    let theta = bearing_deg.to_radians();
    offset_xy(origin, distance_m * theta.sin(), distance_m * theta.cos())
}

/// Local east/north coordinates (m) of `p` relative to `origin`.
pub fn project(origin: GeoPoint, p: GeoPoint) -> (f64, f64) {
    let x = (p.lon - origin.lon).to_radians() * EARTH_RADIUS_M * origin.lat.to_radians().cos();
    let y = (p.lat - origin.lat).to_radians() * EARTH_RADIUS_M;
    (x, y)
}

/// Decompose a local offset into (along, across) components relative to a bearing.
pub fn to_bearing_frame(east_m: f64, north_m: f64, bearing_deg: f64) -> (f64, f64) {
    let theta = bearing_deg.to_radians();
    let along = east_m * theta.sin() + north_m * theta.cos();
    let across = east_m * theta.cos() - north_m * theta.sin();
    (along, across)
}

/// Closed elliptical ring around `center`, semi-major axis along `bearing_deg`.
///
/// Returns `points + 1` vertices; the last repeats the first.
pub fn ellipse_ring(
    center: GeoPoint,
    semi_major_m: f64,
    semi_minor_m: f64,
    bearing_deg: f64,
    points: usize,
) -> Vec<GeoPoint> {
    let theta = bearing_deg.to_radians();
    let (sin_t, cos_t) = (theta.sin(), theta.cos());
    let mut ring: Vec<GeoPoint> = (0..points)
        .map(|i| {
            let t = std::f64::consts::TAU * i as f64 / points as f64;
            let along = semi_major_m * t.cos();
            let across = semi_minor_m * t.sin();
            // along-axis unit (sin θ, cos θ), across-axis unit (cos θ, -sin θ)
            let east = along * sin_t + across * cos_t;
            let north = along * cos_t - across * sin_t;
            offset_xy(center, east, north)
        })
        .collect();
    if let Some(&first) = ring.first() {
        ring.push(first);
    }
    ring
}

/// Area of an ellipse with the given semi-axes (m²).
pub fn ellipse_area_m2(semi_major_m: f64, semi_minor_m: f64) -> f64 {
    std::f64::consts::PI * semi_major_m.max(0.0) * semi_minor_m.max(0.0)
}

/// Smallest absolute angle between two bearings (degrees, 0-180).
pub fn angular_difference(a_deg: f64, b_deg: f64) -> f64 {
    let d = (a_deg - b_deg).rem_euclid(360.0);
    if d > 180.0 {
        360.0 - d
    } else {
        d
    }
}

/// Circular mean of bearings (degrees, 0-360). `None` when the bearings cancel out.
pub fn circular_mean_deg(bearings: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (mut s, mut c, mut n) = (0.0, 0.0, 0usize);
    for b in bearings {
        let r = b.to_radians();
        s += r.sin();
        c += r.cos();
        n += 1;
    }
    if n == 0 || (s.abs() < 1e-9 && c.abs() < 1e-9) {
        return None;
    }
    Some(s.atan2(c).to_degrees().rem_euclid(360.0))
}
