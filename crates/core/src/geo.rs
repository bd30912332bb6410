//! Great-circle geometry shared by the route, pricing, and scheduling engines.
//!
//! All distances are in statute miles. Callers gate on `Option<Coordinates>`
//! before calling in here; these functions assume valid numeric input and
//! have no error path.

use serde::{Deserialize, Serialize};

/// Earth radius used for Haversine distances, in miles.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// A WGS84 coordinate pair, in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are finite and within WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= 90.0
            && self.lng.abs() <= 180.0
    }
}

/// Haversine great-circle distance between two points, in miles.
pub fn distance_miles(from: Coordinates, to: Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_MILES * c
}

/// One of the eight compass sectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompassDirection {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CompassDirection {
    const SECTORS: [CompassDirection; 8] = [
        CompassDirection::N,
        CompassDirection::NE,
        CompassDirection::E,
        CompassDirection::SE,
        CompassDirection::S,
        CompassDirection::SW,
        CompassDirection::W,
        CompassDirection::NW,
    ];

    /// Discretize a bearing in degrees (0 = north, clockwise) into a sector.
    pub fn from_bearing(bearing_degrees: f64) -> Self {
        let normalized = bearing_degrees.rem_euclid(360.0);
        let sector = ((normalized / 45.0).round() as usize) % 8;
        Self::SECTORS[sector]
    }
}

/// Compass direction of travel from one point to another, from the
/// initial great-circle bearing.
pub fn direction(from: Coordinates, to: Coordinates) -> CompassDirection {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();
    let bearing = y.atan2(x).to_degrees();

    CompassDirection::from_bearing(bearing)
}
