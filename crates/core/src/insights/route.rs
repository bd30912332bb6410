//! Greedy nearest-neighbor route planning over a season's booked venues.
//!
//! n is bounded by a single touring season (tens of stops), so the O(n²)
//! scan needs no spatial index. The input order doubles as the baseline the
//! savings figures are measured against.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::show::ShowId;
use crate::domain::venue::VenueId;
use crate::geo::{direction, distance_miles, CompassDirection, Coordinates};

/// One venue to visit, in the caller's original order, annotated with the
/// show it originates from for display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    pub venue_id: VenueId,
    pub venue_name: String,
    pub show_id: Option<ShowId>,
    pub date: Option<NaiveDate>,
    pub location: Option<Coordinates>,
}

/// A stop in the optimized visiting order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub stop: RouteStop,
    /// Distance from the immediate predecessor (home for the first leg of a
    /// round trip; 0 for the first leg of an open tour).
    pub miles_from_previous: f64,
    /// Compass direction of travel into this stop, when there is a
    /// predecessor position.
    pub heading: Option<CompassDirection>,
}

/// Result of a route optimization. An empty plan (no geolocated stops) is a
/// valid "nothing to optimize" outcome, not an error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct RoutePlan {
    pub legs: Vec<RouteLeg>,
    pub optimized_miles: f64,
    /// Miles walking the input order over the same stops.
    pub original_miles: f64,
    pub savings_miles: f64,
    /// round(100 * savings / original); 0 when the baseline is zero.
    pub savings_pct: i64,
    /// Return-home distance appended after the last stop, when routing from
    /// home.
    pub return_leg_miles: f64,
}

/// Nearest-neighbor tour builder anchored at the company's home coordinate.
#[derive(Clone, Debug)]
pub struct RouteOptimizer {
    home: Coordinates,
}

impl RouteOptimizer {
    pub fn new(home: Coordinates) -> Self {
        Self { home }
    }

    /// Build the optimized visiting order for `stops`.
    ///
    /// Stops without a usable location are dropped before optimization.
    /// With `round_trip_from_home` the tour starts and ends at home;
    /// otherwise it starts at the first geolocated stop and ends at the
    /// last one visited.
    pub fn optimize(&self, stops: &[RouteStop], round_trip_from_home: bool) -> RoutePlan {
        let located: Vec<&RouteStop> =
            stops.iter().filter(|s| s.location.is_some_and(|c| c.is_valid())).collect();
        debug!(total = stops.len(), located = located.len(), "optimizing route");

        if located.is_empty() {
            return RoutePlan::default();
        }

        let (legs, optimized_miles, return_leg_miles) =
            self.nearest_neighbor(&located, round_trip_from_home);
        let original_miles = self.input_order_miles(&located, round_trip_from_home);
        let savings_miles = original_miles - optimized_miles;
        let savings_pct = if original_miles > 0.0 {
            (100.0 * savings_miles / original_miles).round() as i64
        } else {
            0
        };

        RoutePlan {
            legs,
            optimized_miles,
            original_miles,
            savings_miles,
            savings_pct,
            return_leg_miles,
        }
    }

    /// Greedy construction: repeatedly move to the closest remaining stop.
    /// Ties keep the earliest stop in the remaining input order (strict `<`
    /// while scanning forward).
    fn nearest_neighbor(
        &self,
        located: &[&RouteStop],
        round_trip_from_home: bool,
    ) -> (Vec<RouteLeg>, f64, f64) {
        let mut remaining: Vec<&RouteStop> = located.to_vec();
        let mut legs = Vec::with_capacity(remaining.len());
        let mut total = 0.0;

        let mut position = if round_trip_from_home {
            self.home
        } else {
            // Open tour: the first stop is the departure point.
            let first = remaining.remove(0);
            let loc = first.location.unwrap_or(self.home);
            legs.push(RouteLeg {
                stop: first.clone(),
                miles_from_previous: 0.0,
                heading: None,
            });
            loc
        };

        while !remaining.is_empty() {
            let mut best_idx = 0;
            let mut best_miles = f64::INFINITY;
            for (idx, stop) in remaining.iter().enumerate() {
                let loc = stop.location.unwrap_or(self.home);
                let miles = distance_miles(position, loc);
                if miles < best_miles {
                    best_miles = miles;
                    best_idx = idx;
                }
            }

            let next = remaining.remove(best_idx);
            let loc = next.location.unwrap_or(self.home);
            legs.push(RouteLeg {
                stop: next.clone(),
                miles_from_previous: best_miles,
                heading: Some(direction(position, loc)),
            });
            total += best_miles;
            position = loc;
        }

        let return_leg_miles = if round_trip_from_home {
            let back = distance_miles(position, self.home);
            total += back;
            back
        } else {
            0.0
        };

        (legs, total, return_leg_miles)
    }

    /// Distance walking the stops exactly in input order, over the same
    /// endpoints as the optimized tour.
    fn input_order_miles(&self, located: &[&RouteStop], round_trip_from_home: bool) -> f64 {
        let mut total = 0.0;
        let mut position = if round_trip_from_home {
            self.home
        } else {
            located[0].location.unwrap_or(self.home)
        };
        let rest = if round_trip_from_home { located } else { &located[1..] };

        for stop in rest {
            let loc = stop.location.unwrap_or(self.home);
            total += distance_miles(position, loc);
            position = loc;
        }
        if round_trip_from_home {
            total += distance_miles(position, self.home);
        }
        total
    }
}
