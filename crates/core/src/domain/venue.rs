use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VenueId(pub String);

/// A performance venue. Coordinates, type label, and capacity are optional;
/// a record missing one of them is excluded from the computations that need
/// that field, never rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: VenueId,
    pub name: String,
    pub city: String,
    /// Region/state code, e.g. "WI".
    pub region: String,
    pub coordinates: Option<Coordinates>,
    /// Free-form category label, e.g. "Fair/Festival".
    pub venue_type: Option<String>,
    pub capacity: Option<u32>,
}

impl Venue {
    /// The venue's coordinates when present and numerically valid.
    /// Non-finite or out-of-range values count as "no location".
    pub fn location(&self) -> Option<Coordinates> {
        self.coordinates.filter(Coordinates::is_valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue(coordinates: Option<Coordinates>) -> Venue {
        Venue {
            id: VenueId("v-1".to_string()),
            name: "Bayfield Apple Fest".to_string(),
            city: "Bayfield".to_string(),
            region: "WI".to_string(),
            coordinates,
            venue_type: Some("Fair/Festival".to_string()),
            capacity: Some(1500),
        }
    }

    #[test]
    fn location_passes_through_valid_coordinates() {
        let v = venue(Some(Coordinates::new(46.81, -90.82)));
        assert_eq!(v.location(), Some(Coordinates::new(46.81, -90.82)));
    }

    #[test]
    fn location_is_none_when_absent() {
        assert_eq!(venue(None).location(), None);
    }

    #[test]
    fn location_rejects_non_finite_values() {
        let v = venue(Some(Coordinates::new(f64::NAN, -90.82)));
        assert_eq!(v.location(), None);
    }
}
