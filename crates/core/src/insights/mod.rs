//! The Insights Engine
//!
//! Heuristic analyzers over the show and venue history: route planning,
//! revenue forecasting, outlier scanning, fee suggestions, and open-date
//! ranking. Every analyzer is a pure function over immutable snapshots of
//! the two collections; insufficient data surfaces as empty results or
//! reduced confidence, never as an error.

pub mod anomaly;
pub mod pricing;
pub mod revenue;
pub mod route;
pub mod scheduling;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

pub use anomaly::{AnomalyDetector, AnomalyReport, AnomalyRule, AnomalyThresholds, Finding, Severity};
pub use pricing::{
    FactorKind, PriceFactor, PriceRange, PriceSuggestion, PricingRecommender, PricingTiers,
    VenueComparison,
};
pub use revenue::{
    ForecastComponent, ForecastFactor, ForecastWeights, RevenueForecast, RevenuePredictor,
};
pub use route::{RouteLeg, RouteOptimizer, RoutePlan, RouteStop};
pub use scheduling::{DateSuggestion, SchedulingAdvisor, SchedulingWeights};

use crate::config::InsightsConfig;
use crate::domain::show::Show;
use crate::domain::venue::Venue;

/// Display sentinel for a show whose venue reference is stale.
pub const UNKNOWN_VENUE: &str = "Unknown Venue";

pub(crate) fn decimal_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// All five analyzers behind one configured value. Each call is independent
/// and idempotent; the engine holds no state beyond its configuration.
#[derive(Clone, Debug)]
pub struct InsightsEngine {
    route: RouteOptimizer,
    revenue: RevenuePredictor,
    anomaly: AnomalyDetector,
    pricing: PricingRecommender,
    scheduling: SchedulingAdvisor,
}

impl Default for InsightsEngine {
    fn default() -> Self {
        Self::new(InsightsConfig::default())
    }
}

impl InsightsEngine {
    pub fn new(config: InsightsConfig) -> Self {
        Self {
            route: RouteOptimizer::new(config.home),
            revenue: RevenuePredictor::new(config.forecast),
            anomaly: AnomalyDetector::new(config.anomaly),
            pricing: PricingRecommender::new(config.home, config.pricing),
            scheduling: SchedulingAdvisor::new(config.scheduling),
        }
    }

    pub fn plan_route(&self, stops: &[RouteStop], round_trip_from_home: bool) -> RoutePlan {
        self.route.optimize(stops, round_trip_from_home)
    }

    pub fn forecast_revenue(
        &self,
        shows: &[Show],
        venues: &[Venue],
        target: &Venue,
        target_date: Option<NaiveDate>,
    ) -> RevenueForecast {
        self.revenue.forecast(shows, venues, target, target_date)
    }

    pub fn scan_anomalies(&self, shows: &[Show], venues: &[Venue]) -> AnomalyReport {
        self.anomaly.scan(shows, venues)
    }

    pub fn suggest_price(&self, shows: &[Show], venues: &[Venue], target: &Venue) -> PriceSuggestion {
        self.pricing.suggest(shows, venues, target)
    }

    pub fn suggest_dates(
        &self,
        shows: &[Show],
        venues: &[Venue],
        target: &Venue,
        year: i32,
        month: u32,
    ) -> Vec<DateSuggestion> {
        self.scheduling.suggest_dates(shows, venues, target, year, month)
    }
}
