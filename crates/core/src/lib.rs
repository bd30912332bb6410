pub mod config;
pub mod domain;
pub mod errors;
pub mod geo;
pub mod insights;
pub mod stats;

pub use config::{ConfigError, InsightsConfig, DEFAULT_HOME};
pub use domain::show::{Season, Show, ShowId};
pub use domain::venue::{Venue, VenueId};
pub use errors::DomainError;
pub use geo::{direction, distance_miles, CompassDirection, Coordinates};
pub use insights::{
    AnomalyDetector, AnomalyReport, AnomalyRule, AnomalyThresholds, DateSuggestion, FactorKind,
    Finding, ForecastComponent, ForecastFactor, ForecastWeights, InsightsEngine, PriceFactor,
    PriceRange, PriceSuggestion, PricingRecommender, PricingTiers, RevenueForecast,
    RevenuePredictor, RouteLeg, RouteOptimizer, RoutePlan, RouteStop, SchedulingAdvisor,
    SchedulingWeights, Severity, VenueComparison, UNKNOWN_VENUE,
};
pub use stats::{mean, median, percentile, std_dev, Summary};
