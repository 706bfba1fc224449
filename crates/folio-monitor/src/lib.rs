//! Folio Telemetry Monitor
//!
//! Read-only alert queries over the append-only telemetry log.
//!
//! Two independent signals are computed from the same events:
//! - **Failure spike**: the overall failure rate in the lookback window is
//!   at or above a threshold, given enough events to be meaningful
//! - **Misconfiguration spike**: failures concentrated on one
//!   (model, portfolio) pairing well above the rate of everything else,
//!   which usually means a tenant picked a model that does not work
//!
//! Both are pure functions of the events and the current time; calling them
//! at any cadence never changes the log.

#![warn(missing_docs)]

pub mod alerts;
pub mod config;
pub mod monitor;

pub use alerts::{failure_spike, misconfiguration_suspects, AlertReport, SuspectPairing};
pub use config::{FailureSpikeConfig, MisconfigurationConfig, MonitorConfig};
pub use monitor::{MonitorError, TelemetryMonitor};
