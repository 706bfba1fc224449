//! Pure alert aggregation over telemetry events

use crate::config::MisconfigurationConfig;
use folio_domain::{window_start, AlertThresholds, TelemetryEvent};
use serde::Serialize;
use std::collections::BTreeMap;

/// A (model, portfolio) pairing failing well above the rest of the traffic
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspectPairing {
    /// Model id
    pub model_id: String,
    /// Portfolio id
    pub portfolio_id: String,
    /// Events for this pairing in the window
    pub events: usize,
    /// Failures for this pairing in the window
    pub failures: usize,
    /// Failure rate of this pairing
    pub failure_rate: f64,
    /// Failure rate of all other events in the window
    pub baseline_rate: f64,
}

/// Both alert flags plus the pairings behind the misconfiguration flag
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertReport {
    /// Overall failure spike
    pub failure_spike: bool,
    /// At least one suspect pairing
    pub misconfiguration_spike: bool,
    /// Suspect pairings, worst first
    pub suspects: Vec<SuspectPairing>,
}

impl AlertReport {
    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Telemetry Alert Summary".to_string(),
            "=======================".to_string(),
            format!("Failure spike: {}", if self.failure_spike { "YES" } else { "no" }),
            format!(
                "Misconfiguration spike: {}",
                if self.misconfiguration_spike { "YES" } else { "no" }
            ),
        ];

        if !self.suspects.is_empty() {
            lines.push(String::new());
            lines.push("Suspect model/portfolio pairings:".to_string());
            for s in &self.suspects {
                lines.push(format!(
                    "  {} @ {}: {}/{} failed ({:.0}% vs {:.0}% baseline)",
                    s.model_id,
                    s.portfolio_id,
                    s.failures,
                    s.events,
                    s.failure_rate * 100.0,
                    s.baseline_rate * 100.0
                ));
            }
        }

        lines.join("\n")
    }
}

fn in_window<'a>(
    events: &'a [TelemetryEvent],
    now: u64,
    lookback_minutes: u64,
) -> impl Iterator<Item = &'a TelemetryEvent> {
    let since = window_start(now, lookback_minutes);
    events
        .iter()
        .filter(move |e| e.timestamp >= since && e.timestamp <= now)
}

fn rate(failures: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        failures as f64 / total as f64
    }
}

/// Whether the overall failure rate in the window is at or above threshold
///
/// Never fires with fewer than `min_events` events in the window.
pub fn failure_spike(events: &[TelemetryEvent], now: u64, thresholds: &AlertThresholds) -> bool {
    let (total, failures) = in_window(events, now, thresholds.lookback_minutes)
        .fold((0usize, 0usize), |(total, failures), e| {
            (total + 1, failures + usize::from(e.is_failure()))
        });

    if total < thresholds.min_events.max(1) {
        return false;
    }
    rate(failures, total) >= thresholds.failure_rate_threshold
}

/// Pairings whose failure rate stands out from the rest of the window
///
/// A pairing is a suspect when it has at least `min_events` events and its
/// failure rate is at or above both `min_failure_rate` and the failure rate
/// of all other events plus `baseline_margin`.
pub fn misconfiguration_suspects(
    events: &[TelemetryEvent],
    now: u64,
    lookback_minutes: u64,
    min_events: usize,
    policy: &MisconfigurationConfig,
) -> Vec<SuspectPairing> {
    let mut pairs: BTreeMap<(&str, &str), (usize, usize)> = BTreeMap::new();
    let mut total = 0usize;
    let mut total_failures = 0usize;

    for event in in_window(events, now, lookback_minutes) {
        let entry = pairs
            .entry((event.model_id.as_str(), event.portfolio_id.as_str()))
            .or_insert((0, 0));
        entry.0 += 1;
        total += 1;
        if event.is_failure() {
            entry.1 += 1;
            total_failures += 1;
        }
    }

    let mut suspects: Vec<SuspectPairing> = pairs
        .into_iter()
        .filter(|(_, (count, _))| *count >= min_events.max(1))
        .filter_map(|((model_id, portfolio_id), (count, failures))| {
            let failure_rate = rate(failures, count);
            let baseline_rate = rate(total_failures - failures, total - count);
            let required = policy.min_failure_rate.max(baseline_rate + policy.baseline_margin);

            (failure_rate >= required).then(|| SuspectPairing {
                model_id: model_id.to_string(),
                portfolio_id: portfolio_id.to_string(),
                events: count,
                failures,
                failure_rate,
                baseline_rate,
            })
        })
        .collect();

    // BTreeMap order breaks ties deterministically
    suspects.sort_by(|a, b| {
        b.failure_rate
            .partial_cmp(&a.failure_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    suspects
}
