//! Alert queries against a telemetry log

use crate::alerts::{failure_spike, misconfiguration_suspects, AlertReport, SuspectPairing};
use crate::config::MonitorConfig;
use folio_domain::traits::TelemetryLog;
use folio_domain::{now_millis, window_start, AlertThresholds, TelemetryEvent};
use std::fmt::Display;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while reading telemetry
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Telemetry log error
    #[error("Store error: {0}")]
    Store(String),
}

/// Read-only alerting over a shared telemetry log
pub struct TelemetryMonitor<S> {
    log: Arc<Mutex<S>>,
    config: MonitorConfig,
}

impl<S> TelemetryMonitor<S>
where
    S: TelemetryLog,
    S::Error: Display,
{
    /// Create a new monitor
    pub fn new(log: Arc<Mutex<S>>, config: MonitorConfig) -> Self {
        Self { log, config }
    }

    /// Configuration in use
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Whether failures spiked in the window given by `thresholds`
    pub fn has_failure_spike(&self, thresholds: &AlertThresholds) -> Result<bool, MonitorError> {
        let now = now_millis();
        let events = self.events_since(now, thresholds.lookback_minutes)?;
        Ok(failure_spike(&events, now, thresholds))
    }

    /// Whether any (model, portfolio) pairing looks misconfigured
    pub fn has_model_misconfiguration_spike(
        &self,
        lookback_minutes: u64,
        min_events: usize,
    ) -> Result<bool, MonitorError> {
        Ok(!self
            .suspected_misconfigurations(lookback_minutes, min_events)?
            .is_empty())
    }

    /// The pairings behind the misconfiguration flag, worst first
    pub fn suspected_misconfigurations(
        &self,
        lookback_minutes: u64,
        min_events: usize,
    ) -> Result<Vec<SuspectPairing>, MonitorError> {
        let now = now_millis();
        let events = self.events_since(now, lookback_minutes)?;
        Ok(misconfiguration_suspects(
            &events,
            now,
            lookback_minutes,
            min_events,
            &self.config.misconfiguration,
        ))
    }

    /// Evaluate both alerts with the configured thresholds
    pub fn report(&self) -> Result<AlertReport, MonitorError> {
        let failure_spike = self.has_failure_spike(&self.config.failure_spike.thresholds())?;
        let suspects = self.suspected_misconfigurations(
            self.config.misconfiguration.lookback_minutes,
            self.config.misconfiguration.min_events,
        )?;

        if failure_spike {
            warn!("Telemetry failure spike detected");
        }
        for s in &suspects {
            warn!(
                model = s.model_id.as_str(),
                portfolio = s.portfolio_id.as_str(),
                failure_rate = s.failure_rate,
                "Suspected model misconfiguration"
            );
        }

        Ok(AlertReport {
            failure_spike,
            misconfiguration_spike: !suspects.is_empty(),
            suspects,
        })
    }

    fn events_since(&self, now: u64, lookback_minutes: u64) -> Result<Vec<TelemetryEvent>, MonitorError> {
        let since = window_start(now, lookback_minutes);
        let log = self
            .log
            .lock()
            .map_err(|e| MonitorError::Store(format!("Store lock error: {}", e)))?;
        let events = log
            .events_since(since)
            .map_err(|e| MonitorError::Store(e.to_string()))?;
        debug!("Loaded {} telemetry events", events.len());
        Ok(events)
    }
}
