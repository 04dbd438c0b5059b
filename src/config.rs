use serde::Deserialize;
use thiserror::Error;

use crate::predict::SearchConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub station: StationConfig,
    #[serde(default)]
    pub predict: PredictConfig,
}

/// Default observing site, used when the CLI does not name one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationConfig {
    pub name: Option<String>,
    /// `"lat, lon"` in degrees.
    pub coordinates: Option<String>,
    #[serde(default)]
    pub altitude_m: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictConfig {
    #[serde(default = "default_horizon")]
    pub horizon_deg: f64,
    #[serde(default = "default_twilight")]
    pub twilight_deg: f64,
    #[serde(default = "default_min_pass")]
    pub min_pass_seconds: f64,
    #[serde(default = "default_advance")]
    pub advance_minutes: f64,
    #[serde(default = "default_coarse_step")]
    pub coarse_step_seconds: f64,
    #[serde(default = "default_window")]
    pub max_window_days: f64,
    #[serde(default = "default_staleness")]
    pub tle_staleness_days: f64,
}

fn default_horizon() -> f64 {
    0.0
}

fn default_twilight() -> f64 {
    -6.0
}

fn default_min_pass() -> f64 {
    30.0
}

fn default_advance() -> f64 {
    25.0
}

fn default_coarse_step() -> f64 {
    60.0
}

fn default_window() -> f64 {
    10.0
}

fn default_staleness() -> f64 {
    7.0
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            horizon_deg: default_horizon(),
            twilight_deg: default_twilight(),
            min_pass_seconds: default_min_pass(),
            advance_minutes: default_advance(),
            coarse_step_seconds: default_coarse_step(),
            max_window_days: default_window(),
            tle_staleness_days: default_staleness(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

impl PredictConfig {
    pub fn search(&self) -> SearchConfig {
        SearchConfig {
            coarse_step_s: self.coarse_step_seconds,
            min_duration_s: self.min_pass_seconds,
            advance_minutes: self.advance_minutes,
            max_window_days: self.max_window_days,
            twilight_deg: self.twilight_deg,
            ..SearchConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_config_uses_the_documented_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_relative_eq!(config.predict.horizon_deg, 0.0);
        assert_relative_eq!(config.predict.twilight_deg, -6.0);
        assert_relative_eq!(config.predict.min_pass_seconds, 30.0);
        assert_relative_eq!(config.predict.advance_minutes, 25.0);
        assert_relative_eq!(config.predict.coarse_step_seconds, 60.0);
        assert_relative_eq!(config.predict.max_window_days, 10.0);
        assert_relative_eq!(config.predict.tle_staleness_days, 7.0);
        assert!(config.station.coordinates.is_none());
    }

    #[test]
    fn partial_config_overrides_selected_fields() {
        let yaml = r#"
station:
  name: Madrid
  coordinates: "40.4168, -3.7038"
  altitude_m: 650
predict:
  twilight_deg: -12
  max_window_days: 3
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.station.name.as_deref(), Some("Madrid"));
        assert_eq!(config.station.coordinates.as_deref(), Some("40.4168, -3.7038"));
        assert_relative_eq!(config.station.altitude_m, 650.0);
        assert_relative_eq!(config.predict.twilight_deg, -12.0);
        assert_relative_eq!(config.predict.max_window_days, 3.0);
        // Untouched fields keep their defaults.
        assert_relative_eq!(config.predict.advance_minutes, 25.0);
    }

    #[test]
    fn search_config_carries_the_tuned_values() {
        let predict = PredictConfig {
            coarse_step_seconds: 30.0,
            ..PredictConfig::default()
        };
        let search = predict.search();
        assert_relative_eq!(search.coarse_step_s, 30.0);
        assert_relative_eq!(search.twilight_deg, -6.0);
    }
}
