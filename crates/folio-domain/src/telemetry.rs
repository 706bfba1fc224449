//! Conversation outcome telemetry

use std::time::{SystemTime, UNIX_EPOCH};

/// First timestamp inside a window of `lookback_minutes` ending at `now`
pub fn window_start(now: u64, lookback_minutes: u64) -> u64 {
    now.saturating_sub(lookback_minutes.saturating_mul(60_000))
}

/// Current time in milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Result of one generation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The model produced a reply
    Success,
    /// The model call failed or timed out
    Failure,
}

impl Outcome {
    /// Storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }

    /// Parse a storage name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Outcome::Success),
            "failure" => Some(Outcome::Failure),
            _ => None,
        }
    }
}

/// Append-only log entry describing one conversation turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryEvent {
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    /// Turn outcome
    pub outcome: Outcome,
    /// Model id the turn used
    pub model_id: String,
    /// Portfolio the turn belonged to
    pub portfolio_id: String,
}

impl TelemetryEvent {
    /// Event stamped with the current time
    pub fn now(outcome: Outcome, model_id: impl Into<String>, portfolio_id: impl Into<String>) -> Self {
        Self {
            timestamp: now_millis(),
            outcome,
            model_id: model_id.into(),
            portfolio_id: portfolio_id.into(),
        }
    }

    /// Whether this event is a failure
    pub fn is_failure(&self) -> bool {
        self.outcome == Outcome::Failure
    }
}

/// Alert trigger configuration for one alert kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThresholds {
    /// Window size, counted back from now
    pub lookback_minutes: u64,
    /// Minimum number of events in the window before the alert can fire
    pub min_events: usize,
    /// Failure ratio (0.0-1.0) at or above which the alert fires
    pub failure_rate_threshold: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            lookback_minutes: 15,
            min_events: 20,
            failure_rate_threshold: 0.25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_round_trip() {
        assert_eq!(Outcome::parse(Outcome::Success.as_str()), Some(Outcome::Success));
        assert_eq!(Outcome::parse(Outcome::Failure.as_str()), Some(Outcome::Failure));
        assert_eq!(Outcome::parse("timeout"), None);
    }

    #[test]
    fn test_window_start() {
        assert_eq!(window_start(1_000_000, 10), 400_000);
        assert_eq!(window_start(1_000, 10), 0);
    }
}
