//! Configuration for the Gatekeeper

use crate::policy::LeadPolicy;
use folio_domain::StrategyMode;
use serde::{Deserialize, Serialize};

/// Lead guard configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Minimum model confidence to accept a lead the text does not back up
    pub min_confidence: f64,

    /// Policy under consultative mode
    pub consultative: LeadPolicy,

    /// Policy under sales mode
    pub sales: LeadPolicy,

    /// Policy under support mode
    pub support: LeadPolicy,
}

impl GuardConfig {
    /// Policy for a strategy mode
    pub fn policy(&self, mode: StrategyMode) -> &LeadPolicy {
        match mode {
            StrategyMode::Consultative => &self.consultative,
            StrategyMode::Sales => &self.sales,
            StrategyMode::Support => &self.support,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err("min_confidence must be between 0.0 and 1.0".to_string());
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

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            consultative: LeadPolicy::for_mode(StrategyMode::Consultative),
            sales: LeadPolicy::for_mode(StrategyMode::Sales),
            support: LeadPolicy::for_mode(StrategyMode::Support),
        }
    }
}
