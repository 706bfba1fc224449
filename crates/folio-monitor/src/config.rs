//! Alert thresholds

use folio_domain::AlertThresholds;
use serde::{Deserialize, Serialize};

/// Thresholds for the overall failure-spike alert
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailureSpikeConfig {
    /// Window to aggregate over (minutes)
    pub lookback_minutes: u64,
    /// Fewest events before the alert can fire
    pub min_events: usize,
    /// Failure rate at or above which the alert fires
    pub failure_rate_threshold: f64,
}

impl FailureSpikeConfig {
    /// As domain thresholds
    pub fn thresholds(&self) -> AlertThresholds {
        AlertThresholds {
            lookback_minutes: self.lookback_minutes,
            min_events: self.min_events,
            failure_rate_threshold: self.failure_rate_threshold,
        }
    }
}

impl Default for FailureSpikeConfig {
    fn default() -> Self {
        let defaults = AlertThresholds::default();
        Self {
            lookback_minutes: defaults.lookback_minutes,
            min_events: defaults.min_events,
            failure_rate_threshold: defaults.failure_rate_threshold,
        }
    }
}

/// Thresholds for the per-(model, portfolio) misconfiguration alert
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MisconfigurationConfig {
    /// Window to aggregate over (minutes)
    pub lookback_minutes: u64,
    /// Fewest events for a pairing before it can be flagged
    pub min_events: usize,
    /// A pairing is never flagged below this failure rate
    pub min_failure_rate: f64,
    /// How far above the rest of the traffic a pairing must fail
    pub baseline_margin: f64,
}

impl Default for MisconfigurationConfig {
    fn default() -> Self {
        Self {
            lookback_minutes: 60,
            min_events: 5,
            min_failure_rate: 0.5,
            baseline_margin: 0.3,
        }
    }
}

/// Monitor configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Overall failure spike
    pub failure_spike: FailureSpikeConfig,
    /// Per-pairing misconfiguration
    pub misconfiguration: MisconfigurationConfig,
}

impl MonitorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let rate_ok = |r: f64| (0.0..=1.0).contains(&r);

        if self.failure_spike.lookback_minutes == 0 || self.misconfiguration.lookback_minutes == 0 {
            return Err("lookback_minutes must be greater than 0".to_string());
        }
        if self.failure_spike.min_events == 0 || self.misconfiguration.min_events == 0 {
            return Err("min_events must be greater than 0".to_string());
        }
        if !rate_ok(self.failure_spike.failure_rate_threshold) {
            return Err("failure_rate_threshold must be between 0.0 and 1.0".to_string());
        }
        if !rate_ok(self.misconfiguration.min_failure_rate) {
            return Err("min_failure_rate must be between 0.0 and 1.0".to_string());
        }
        if !rate_ok(self.misconfiguration.baseline_margin) {
            return Err("baseline_margin must be between 0.0 and 1.0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(MonitorConfig::default().validate().is_ok());
        assert_eq!(
            MonitorConfig::default().failure_spike.thresholds(),
            AlertThresholds::default()
        );
    }

    #[test]
    fn test_invalid_rates() {
        let mut config = MonitorConfig::default();
        config.failure_spike.failure_rate_threshold = 1.2;
        assert!(config.validate().is_err());

        let mut config = MonitorConfig::default();
        config.misconfiguration.min_events = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config = MonitorConfig::from_toml(
            r#"
            [misconfiguration]
            min_events = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.misconfiguration.min_events, 10);
        assert_eq!(config.misconfiguration.lookback_minutes, 60);
        assert_eq!(config.failure_spike, FailureSpikeConfig::default());
    }
}
