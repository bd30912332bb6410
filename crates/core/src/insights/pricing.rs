//! Fee suggestions from a multiplicative factor model over venue attributes.
//!
//! The adjustment order is load-bearing: the venue-type average *replaces*
//! the overall baseline, the region average *blends* with it, and the
//! distance and capacity tiers *multiply* the running estimate. Factors are
//! explanatory records of what each step did, not re-applied amounts.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::show::Show;
use crate::domain::venue::{Venue, VenueId};
use crate::geo::{distance_miles, Coordinates};
use crate::insights::decimal_to_f64;
use crate::stats;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tier boundaries and multipliers for the pricing model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingTiers {
    /// No surcharge at or under this distance from home (default: 100 mi).
    pub near_miles: f64,
    /// +`mid_surcharge` at or under this distance (default: 250 mi).
    pub mid_miles: f64,
    /// +`far_surcharge` at or under this distance (default: 500 mi).
    pub far_miles: f64,
    pub mid_surcharge: f64,
    pub far_surcharge: f64,
    /// Surcharge beyond `far_miles` (default: 0.15).
    pub beyond_surcharge: f64,
    /// Capacity at or under this gets `small_multiplier` (default: 500).
    pub small_capacity: u32,
    /// Capacity at or under this is the unadjusted standard tier
    /// (default: 2000).
    pub standard_capacity: u32,
    /// Capacity at or under this gets `large_multiplier` (default: 5000).
    pub large_capacity: u32,
    pub small_multiplier: f64,
    pub large_multiplier: f64,
    /// Multiplier beyond `large_capacity` (default: 1.20).
    pub max_multiplier: f64,
    /// Suggested fees are rounded to the nearest multiple of this
    /// (default: 100).
    pub round_to: f64,
    /// Half-width of the suggested range around the estimate (default: 0.15).
    pub range_spread: f64,
    /// Maximum same-type venues in the comparison list (default: 5).
    pub max_comparisons: usize,
}

impl Default for PricingTiers {
    fn default() -> Self {
        Self {
            near_miles: 100.0,
            mid_miles: 250.0,
            far_miles: 500.0,
            mid_surcharge: 0.05,
            far_surcharge: 0.10,
            beyond_surcharge: 0.15,
            small_capacity: 500,
            standard_capacity: 2000,
            large_capacity: 5000,
            small_multiplier: 0.90,
            large_multiplier: 1.10,
            max_multiplier: 1.20,
            round_to: 100.0,
            range_spread: 0.15,
            max_comparisons: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Which adjustment step produced a factor record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    VenueType,
    Region,
    Distance,
    Capacity,
}

/// One explanatory step of the suggestion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceFactor {
    pub kind: FactorKind,
    pub detail: String,
    /// Percentage change this step applied to the running estimate.
    pub adjustment_pct: f64,
}

/// A same-type venue for manual cross-checking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VenueComparison {
    pub venue_id: VenueId,
    pub venue_name: String,
    pub average_fee: f64,
    pub show_count: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// Suggested fee with its range, explanation, and comparison set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct PriceSuggestion {
    /// Rounded to the nearest `round_to` multiple.
    pub suggested_fee: f64,
    pub range: PriceRange,
    pub factors: Vec<PriceFactor>,
    pub comparisons: Vec<VenueComparison>,
    /// Positive historical fees the baseline was computed from.
    pub sample_count: usize,
}

// ---------------------------------------------------------------------------
// Recommender
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct PricingRecommender {
    home: Coordinates,
    tiers: PricingTiers,
}

impl PricingRecommender {
    pub fn new(home: Coordinates, tiers: PricingTiers) -> Self {
        Self { home, tiers }
    }

    /// Suggest a fee for booking `target`, from the show history.
    ///
    /// With no positive historical fees the suggestion is zero with no
    /// factors; a venue without a location simply skips the distance step.
    pub fn suggest(&self, shows: &[Show], venues: &[Venue], target: &Venue) -> PriceSuggestion {
        let by_id: HashMap<&VenueId, &Venue> = venues.iter().map(|v| (&v.id, v)).collect();

        let all_fees: Vec<f64> = positive_fees(shows.iter());
        let baseline = stats::mean(&all_fees);
        let mut estimate = baseline;
        let mut factors = Vec::new();

        // Step 1: the venue-type average replaces the baseline.
        if let Some(label) = target.venue_type.as_deref() {
            let type_fees: Vec<f64> = positive_fees(shows.iter().filter(|s| {
                by_id
                    .get(&s.venue_id)
                    .and_then(|v| v.venue_type.as_deref())
                    .is_some_and(|t| t == label)
            }));
            if !type_fees.is_empty() {
                let type_avg = stats::mean(&type_fees);
                let adjustment_pct =
                    if baseline > 0.0 { (type_avg - baseline) / baseline * 100.0 } else { 0.0 };
                factors.push(PriceFactor {
                    kind: FactorKind::VenueType,
                    detail: format!(
                        "{label} venues average ${type_avg:.0} over {} shows",
                        type_fees.len()
                    ),
                    adjustment_pct,
                });
                estimate = type_avg;
            }
        }

        // Step 2: blend with the region average.
        let region_fees: Vec<f64> = positive_fees(
            shows
                .iter()
                .filter(|s| by_id.get(&s.venue_id).is_some_and(|v| v.region == target.region)),
        );
        if !region_fees.is_empty() {
            let region_avg = stats::mean(&region_fees);
            let blended = (estimate + region_avg) / 2.0;
            let adjustment_pct =
                if estimate > 0.0 { (blended - estimate) / estimate * 100.0 } else { 0.0 };
            factors.push(PriceFactor {
                kind: FactorKind::Region,
                detail: format!(
                    "{} venues average ${region_avg:.0} over {} shows",
                    target.region,
                    region_fees.len()
                ),
                adjustment_pct,
            });
            estimate = blended;
        }

        // Step 3: distance surcharge; zero-surcharge tier leaves no record.
        if let Some(location) = target.location() {
            let miles = distance_miles(self.home, location);
            let surcharge = self.distance_surcharge(miles);
            if surcharge > 0.0 {
                estimate *= 1.0 + surcharge;
                factors.push(PriceFactor {
                    kind: FactorKind::Distance,
                    detail: format!("{miles:.0} mi from home"),
                    adjustment_pct: surcharge * 100.0,
                });
            }
        }

        // Step 4: capacity multiplier; the standard tier leaves no record.
        if let Some(capacity) = target.capacity {
            let multiplier = self.capacity_multiplier(capacity);
            if (multiplier - 1.0).abs() > f64::EPSILON {
                estimate *= multiplier;
                factors.push(PriceFactor {
                    kind: FactorKind::Capacity,
                    detail: format!("capacity {capacity}"),
                    adjustment_pct: (multiplier - 1.0) * 100.0,
                });
            }
        }

        let suggested_fee = round_to(estimate, self.tiers.round_to);
        let range = PriceRange {
            min: round_to(estimate * (1.0 - self.tiers.range_spread), self.tiers.round_to),
            max: round_to(estimate * (1.0 + self.tiers.range_spread), self.tiers.round_to),
        };
        debug!(venue = %target.id.0, suggested_fee, factors = factors.len(), "price suggestion");

        PriceSuggestion {
            suggested_fee,
            range,
            factors,
            comparisons: self.comparisons(shows, venues, target),
            sample_count: all_fees.len(),
        }
    }

    fn distance_surcharge(&self, miles: f64) -> f64 {
        let t = &self.tiers;
        if miles <= t.near_miles {
            0.0
        } else if miles <= t.mid_miles {
            t.mid_surcharge
        } else if miles <= t.far_miles {
            t.far_surcharge
        } else {
            t.beyond_surcharge
        }
    }

    fn capacity_multiplier(&self, capacity: u32) -> f64 {
        let t = &self.tiers;
        if capacity <= t.small_capacity {
            t.small_multiplier
        } else if capacity <= t.standard_capacity {
            1.0
        } else if capacity <= t.large_capacity {
            t.large_multiplier
        } else {
            t.max_multiplier
        }
    }

    /// Up to `max_comparisons` other same-type venues with show history,
    /// busiest first.
    fn comparisons(
        &self,
        shows: &[Show],
        venues: &[Venue],
        target: &Venue,
    ) -> Vec<VenueComparison> {
        let Some(label) = target.venue_type.as_deref() else {
            return Vec::new();
        };

        let mut entries: Vec<VenueComparison> = venues
            .iter()
            .filter(|v| v.id != target.id)
            .filter(|v| v.venue_type.as_deref().is_some_and(|t| t == label))
            .filter_map(|v| {
                let venue_shows: Vec<&Show> =
                    shows.iter().filter(|s| s.venue_id == v.id).collect();
                if venue_shows.is_empty() {
                    return None;
                }
                let fees = positive_fees(venue_shows.iter().copied());
                Some(VenueComparison {
                    venue_id: v.id.clone(),
                    venue_name: v.name.clone(),
                    average_fee: stats::mean(&fees),
                    show_count: venue_shows.len(),
                })
            })
            .collect();

        entries.sort_by(|a, b| b.show_count.cmp(&a.show_count));
        entries.truncate(self.tiers.max_comparisons);
        entries
    }
}

fn positive_fees<'a>(shows: impl Iterator<Item = &'a Show>) -> Vec<f64> {
    shows.map(|s| decimal_to_f64(s.fee)).filter(|f| *f > 0.0).collect()
}

fn round_to(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}
