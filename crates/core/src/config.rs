use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Coordinates;
use crate::insights::{AnomalyThresholds, ForecastWeights, PricingTiers, SchedulingWeights};

/// Default base of operations (Washburn, WI).
pub const DEFAULT_HOME: Coordinates = Coordinates { lat: 46.6721, lng: -90.8968 };

/// Tunable constants for the Insights Engine.
///
/// Every field has a production default; a TOML file can override any
/// subset, section by section, and missing keys fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    /// Home coordinate anchoring route and distance-from-base calculations.
    pub home: Coordinates,
    pub forecast: ForecastWeights,
    pub anomaly: AnomalyThresholds,
    pub pricing: PricingTiers,
    pub scheduling: SchedulingWeights,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            home: DEFAULT_HOME,
            forecast: ForecastWeights::default(),
            anomaly: AnomalyThresholds::default(),
            pricing: PricingTiers::default(),
            scheduling: SchedulingWeights::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl InsightsConfig {
    /// Load the config from a TOML file over the defaults, then validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
        let config: Self = toml::from_str(&raw)
            .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.home.is_valid() {
            return Err(ConfigError::Validation(format!(
                "home coordinate ({}, {}) is not a valid WGS84 position",
                self.home.lat, self.home.lng
            )));
        }

        let weights = [
            ("forecast.venue_type", self.forecast.venue_type),
            ("forecast.region", self.forecast.region),
            ("forecast.season", self.forecast.season),
            ("forecast.overall", self.forecast.overall),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{name} must be a positive finite weight, got {value}"
                )));
            }
        }

        if self.anomaly.min_fee_samples == 0 {
            return Err(ConfigError::Validation(
                "anomaly.min_fee_samples must be at least 1".to_string(),
            ));
        }

        let p = &self.pricing;
        if !(p.near_miles < p.mid_miles && p.mid_miles < p.far_miles) {
            return Err(ConfigError::Validation(format!(
                "pricing distance tiers must be increasing: {} / {} / {}",
                p.near_miles, p.mid_miles, p.far_miles
            )));
        }
        if !(p.small_capacity < p.standard_capacity && p.standard_capacity < p.large_capacity) {
            return Err(ConfigError::Validation(format!(
                "pricing capacity tiers must be increasing: {} / {} / {}",
                p.small_capacity, p.standard_capacity, p.large_capacity
            )));
        }
        if p.round_to <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "pricing.round_to must be positive, got {}",
                p.round_to
            )));
        }

        if self.scheduling.max_suggestions == 0 {
            return Err(ConfigError::Validation(
                "scheduling.max_suggestions must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(InsightsConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_overrides_one_section() {
        let config: InsightsConfig = toml::from_str(
            r#"
            [home]
            lat = 44.95
            lng = -93.09

            [anomaly]
            min_fee_samples = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.home, Coordinates::new(44.95, -93.09));
        assert_eq!(config.anomaly.min_fee_samples, 5);
        // Untouched sections stay at their defaults.
        assert_eq!(config.anomaly.low_fee_ratio, 0.5);
        assert_eq!(config.forecast, ForecastWeights::default());
        assert_eq!(config.pricing.round_to, 100.0);
    }

    #[test]
    fn load_reads_a_file_and_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scheduling]\nmax_suggestions = 5").unwrap();

        let config = InsightsConfig::load(file.path()).unwrap();

        assert_eq!(config.scheduling.max_suggestions, 5);
        assert_eq!(config.home, DEFAULT_HOME);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = InsightsConfig::load(Path::new("/nonexistent/insights.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn invalid_home_fails_validation() {
        let config = InsightsConfig {
            home: Coordinates::new(f64::NAN, -90.0),
            ..InsightsConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn zero_weight_fails_validation() {
        let mut config = InsightsConfig::default();
        config.forecast.region = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_distance_tiers_fail_validation() {
        let mut config = InsightsConfig::default();
        config.pricing.mid_miles = 1000.0;
        assert!(config.validate().is_err());
    }
}
