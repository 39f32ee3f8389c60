//! Great-circle distance between stores and the coordination hub.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Haversine distance in kilometers, rounded to one decimal place.
///
/// Symmetric, zero for identical points. One-decimal rounding matches
/// the precision the dashboards display and sort on.
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    let distance = EARTH_RADIUS_KM * 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    (distance * 10.0).round() / 10.0
}
