//! Revenue forecasting from weighted historical averages.
//!
//! Up to four component averages contribute (venue type, region, season,
//! overall); each is included only when at least one supporting observation
//! exists, and the fixed weights are renormalized over the included set so a
//! missing component drops out of both numerator and denominator.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::show::{Season, Show};
use crate::domain::venue::{Venue, VenueId};
use crate::insights::decimal_to_f64;
use crate::stats;

/// Blend weights for the forecast components.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastWeights {
    /// Weight for the venue-type average (default: 0.40)
    pub venue_type: f64,
    /// Weight for the region average (default: 0.25)
    pub region: f64,
    /// Weight for the season average (default: 0.20)
    pub season: f64,
    /// Weight for the overall average (default: 0.15)
    pub overall: f64,
}

impl Default for ForecastWeights {
    fn default() -> Self {
        Self { venue_type: 0.40, region: 0.25, season: 0.20, overall: 0.15 }
    }
}

/// Share of a forecast attributed to the performance fee; the remainder is
/// merchandise. A fixed display heuristic, not independently modeled.
const FEE_SHARE: f64 = 0.70;

/// Which historical slice a forecast component was averaged over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastFactor {
    VenueType,
    Region,
    Season,
    Overall,
}

/// One included component of the blend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastComponent {
    pub factor: ForecastFactor,
    /// Mean revenue (fee + merch) over the supporting shows.
    pub average: f64,
    pub weight: f64,
    pub sample_count: usize,
}

/// A revenue forecast for one prospective show.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct RevenueForecast {
    pub predicted_total: f64,
    /// 70% of the prediction, as a display split.
    pub estimated_fee: f64,
    /// 30% of the prediction.
    pub estimated_merch: f64,
    /// included components / 4, as a percentage: one of 0, 25, 50, 75, 100.
    pub confidence_pct: u8,
    pub components: Vec<ForecastComponent>,
}

/// Stateless forecaster; weights are fixed at construction.
#[derive(Clone, Debug, Default)]
pub struct RevenuePredictor {
    weights: ForecastWeights,
}

impl RevenuePredictor {
    pub fn new(weights: ForecastWeights) -> Self {
        Self { weights }
    }

    /// Forecast revenue for a show at `target`, optionally on `target_date`
    /// (the date enables the season component).
    pub fn forecast(
        &self,
        shows: &[Show],
        venues: &[Venue],
        target: &Venue,
        target_date: Option<NaiveDate>,
    ) -> RevenueForecast {
        let by_id: HashMap<&VenueId, &Venue> = venues.iter().map(|v| (&v.id, v)).collect();
        let mut components = Vec::new();

        let all: Vec<f64> = shows.iter().map(|s| decimal_to_f64(s.revenue())).collect();

        if let Some(label) = target.venue_type.as_deref() {
            let same_type: Vec<f64> = shows
                .iter()
                .filter(|s| {
                    by_id
                        .get(&s.venue_id)
                        .and_then(|v| v.venue_type.as_deref())
                        .is_some_and(|t| t == label)
                })
                .map(|s| decimal_to_f64(s.revenue()))
                .collect();
            push_component(
                &mut components,
                ForecastFactor::VenueType,
                &same_type,
                self.weights.venue_type,
            );
        }

        let same_region: Vec<f64> = shows
            .iter()
            .filter(|s| by_id.get(&s.venue_id).is_some_and(|v| v.region == target.region))
            .map(|s| decimal_to_f64(s.revenue()))
            .collect();
        push_component(&mut components, ForecastFactor::Region, &same_region, self.weights.region);

        if let Some(date) = target_date {
            let season = Season::of(date);
            let same_season: Vec<f64> = shows
                .iter()
                .filter(|s| s.season() == season)
                .map(|s| decimal_to_f64(s.revenue()))
                .collect();
            push_component(
                &mut components,
                ForecastFactor::Season,
                &same_season,
                self.weights.season,
            );
        }

        push_component(&mut components, ForecastFactor::Overall, &all, self.weights.overall);

        // Weighted average over the included components only.
        let weight_total: f64 = components.iter().map(|c| c.weight).sum();
        let predicted_total = if weight_total > 0.0 {
            components.iter().map(|c| c.average * c.weight).sum::<f64>() / weight_total
        } else {
            0.0
        };

        let confidence_pct = (components.len() * 100 / 4) as u8;
        debug!(
            venue = %target.id.0,
            components = components.len(),
            predicted_total,
            "revenue forecast"
        );

        RevenueForecast {
            predicted_total,
            estimated_fee: predicted_total * FEE_SHARE,
            estimated_merch: predicted_total * (1.0 - FEE_SHARE),
            confidence_pct,
            components,
        }
    }
}

fn push_component(
    components: &mut Vec<ForecastComponent>,
    factor: ForecastFactor,
    values: &[f64],
    weight: f64,
) {
    if values.is_empty() {
        return;
    }
    components.push(ForecastComponent {
        factor,
        average: stats::mean(values),
        weight,
        sample_count: values.len(),
    });
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::show::ShowId;
    use crate::geo::Coordinates;

    fn venue(id: &str, region: &str, venue_type: Option<&str>) -> Venue {
        Venue {
            id: VenueId(id.to_string()),
            name: format!("Venue {id}"),
            city: "Ashland".to_string(),
            region: region.to_string(),
            coordinates: Some(Coordinates::new(46.5, -90.8)),
            venue_type: venue_type.map(str::to_string),
            capacity: Some(1000),
        }
    }

    fn show(id: &str, venue: &str, start: &str, fee: i64, merch: i64) -> Show {
        Show {
            id: ShowId(id.to_string()),
            venue_id: VenueId(venue.to_string()),
            start_date: start.parse().unwrap(),
            end_date: start.parse().unwrap(),
            fee: Decimal::from(fee),
            merch_sales: Decimal::from(merch),
            materials_cost: Decimal::ZERO,
            expenses: Decimal::ZERO,
        }
    }

    #[test]
    fn no_history_yields_zero_prediction_and_confidence() {
        let predictor = RevenuePredictor::default();
        let target = venue("t", "WI", Some("Fair/Festival"));

        let forecast = predictor.forecast(&[], &[], &target, None);

        assert_eq!(forecast.predicted_total, 0.0);
        assert_eq!(forecast.confidence_pct, 0);
        assert!(forecast.components.is_empty());
    }

    #[test]
    fn overall_only_when_nothing_else_matches() {
        let predictor = RevenuePredictor::default();
        let venues = vec![venue("v1", "MN", Some("Theater"))];
        let shows = vec![show("s1", "v1", "2025-10-01", 1000, 200)];
        // Different region, different type, no date.
        let target = venue("t", "WI", Some("Fair/Festival"));

        let forecast = predictor.forecast(&shows, &venues, &target, None);

        assert_eq!(forecast.components.len(), 1);
        assert_eq!(forecast.components[0].factor, ForecastFactor::Overall);
        // Renormalized: the single component's average passes straight through.
        assert!((forecast.predicted_total - 1200.0).abs() < 1e-9);
        assert_eq!(forecast.confidence_pct, 25);
    }

    #[test]
    fn all_four_components_give_full_confidence() {
        let predictor = RevenuePredictor::default();
        let venues = vec![venue("v1", "WI", Some("Fair/Festival"))];
        let shows = vec![show("s1", "v1", "2025-06-15", 2000, 500)];
        let target = venue("t", "WI", Some("Fair/Festival"));

        let forecast =
            predictor.forecast(&shows, &venues, &target, Some("2026-07-04".parse().unwrap()));

        assert_eq!(forecast.components.len(), 4);
        assert_eq!(forecast.confidence_pct, 100);
        // All components average the same single show, so the blend is flat.
        assert!((forecast.predicted_total - 2500.0).abs() < 1e-9);
    }

    #[test]
    fn weights_are_renormalized_over_included_components() {
        let predictor = RevenuePredictor::default();
        let venues =
            vec![venue("v1", "WI", Some("Fair/Festival")), venue("v2", "MN", Some("Theater"))];
        // Same-type show at 3000, overall is {3000, 1000}.
        let shows = vec![
            show("s1", "v1", "2025-10-01", 3000, 0),
            show("s2", "v2", "2025-10-01", 1000, 0),
        ];
        let target = venue("t", "IA", Some("Fair/Festival"));

        let forecast = predictor.forecast(&shows, &venues, &target, None);

        // Included: venue_type (3000, w 0.40) and overall (2000, w 0.15).
        // (3000*0.40 + 2000*0.15) / 0.55 = 1500/0.55.
        let expected = (3000.0 * 0.40 + 2000.0 * 0.15) / 0.55;
        assert_eq!(forecast.components.len(), 2);
        assert!((forecast.predicted_total - expected).abs() < 1e-9);
        assert_eq!(forecast.confidence_pct, 50);
    }

    #[test]
    fn season_component_requires_a_target_date() {
        let predictor = RevenuePredictor::default();
        let venues = vec![venue("v1", "MN", Some("Theater"))];
        let shows = vec![show("s1", "v1", "2025-07-01", 1000, 0)];
        let target = venue("t", "IA", Some("Club"));

        let without_date = predictor.forecast(&shows, &venues, &target, None);
        let with_date =
            predictor.forecast(&shows, &venues, &target, Some("2026-08-01".parse().unwrap()));

        assert!(!without_date.components.iter().any(|c| c.factor == ForecastFactor::Season));
        assert!(with_date.components.iter().any(|c| c.factor == ForecastFactor::Season));
    }

    #[test]
    fn unknown_venue_references_fall_out_of_type_and_region_slices() {
        let predictor = RevenuePredictor::default();
        // Show points at a venue absent from the collection.
        let shows = vec![show("s1", "ghost", "2025-07-01", 1000, 0)];
        let target = venue("t", "WI", Some("Fair/Festival"));

        let forecast = predictor.forecast(&shows, &[], &target, None);

        // Only the overall component can include the orphaned show.
        assert_eq!(forecast.components.len(), 1);
        assert_eq!(forecast.components[0].factor, ForecastFactor::Overall);
    }

    #[test]
    fn breakdown_splits_seventy_thirty() {
        let predictor = RevenuePredictor::default();
        let venues = vec![venue("v1", "WI", None)];
        let shows = vec![show("s1", "v1", "2025-07-01", 1000, 0)];
        let target = venue("t", "WI", None);

        let forecast = predictor.forecast(&shows, &venues, &target, None);

        assert!((forecast.estimated_fee - forecast.predicted_total * 0.70).abs() < 1e-9);
        assert!((forecast.estimated_merch - forecast.predicted_total * 0.30).abs() < 1e-9);
    }
}
