//! Strategy modes and behavior presets

use std::fmt;

/// Tenant-selected conversational objective
///
/// Governs both prompt tone and how much evidence the lead guard demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyMode {
    /// Advise first, qualify later; strictest lead policy
    Consultative,
    /// Drive toward a concrete next step; most permissive lead policy
    Sales,
    /// Answer questions and resolve issues
    Support,
}

impl StrategyMode {
    /// All modes, in display order
    pub const ALL: [StrategyMode; 3] = [
        StrategyMode::Consultative,
        StrategyMode::Sales,
        StrategyMode::Support,
    ];

    /// Storage/wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyMode::Consultative => "consultative",
            StrategyMode::Sales => "sales",
            StrategyMode::Support => "support",
        }
    }

    /// Parse a mode name
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "consultative" => Some(StrategyMode::Consultative),
            "sales" => Some(StrategyMode::Sales),
            "support" => Some(StrategyMode::Support),
            _ => None,
        }
    }
}

impl Default for StrategyMode {
    fn default() -> Self {
        StrategyMode::Consultative
    }
}

impl fmt::Display for StrategyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StrategyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid strategy mode: {}", s))
    }
}

/// Canned tone preset selected in the agent configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorType {
    /// Warm and conversational
    Friendly,
    /// Polished and precise
    Professional,
    /// Enthusiastic and outcome-driven
    Sales,
    /// Short and to the point
    Minimal,
}

impl BehaviorType {
    /// Storage/wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviorType::Friendly => "friendly",
            BehaviorType::Professional => "professional",
            BehaviorType::Sales => "sales",
            BehaviorType::Minimal => "minimal",
        }
    }

    /// Parse a preset name
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "friendly" => Some(BehaviorType::Friendly),
            "professional" => Some(BehaviorType::Professional),
            "sales" => Some(BehaviorType::Sales),
            "minimal" => Some(BehaviorType::Minimal),
            _ => None,
        }
    }
}

impl Default for BehaviorType {
    fn default() -> Self {
        BehaviorType::Friendly
    }
}

impl std::str::FromStr for BehaviorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid behavior type: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_round_trip() {
        for mode in StrategyMode::ALL {
            assert_eq!(StrategyMode::parse(mode.as_str()), Some(mode));
        }
        assert!("pushy".parse::<StrategyMode>().is_err());
    }

    #[test]
    fn test_behavior_parse() {
        assert_eq!(BehaviorType::parse("Professional"), Some(BehaviorType::Professional));
        assert_eq!(BehaviorType::parse("casual"), None);
    }
}
