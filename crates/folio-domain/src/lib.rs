//! Folio Domain Layer
//!
//! Core value types and trait seams for the portfolio agent: the visitor
//! conversation, knowledge chunks, lead evidence, strategy tags and telemetry
//! events. Like the rest of the domain layer this crate carries no
//! infrastructure dependencies; storage, model providers and HTTP live in the
//! other workspace crates and plug in through [`traits`].
//!
//! ## Key Concepts
//!
//! - **Message / History**: ordered visitor conversation, oldest first
//! - **KnowledgeChunk**: bounded excerpt of an ingested document, owned by a source
//! - **LeadChannels / LeadCandidate / LeadRecord**: contact evidence, the per-turn
//!   decision input, and the persisted lead
//! - **StrategyMode / BehaviorType**: tenant-selected objective and tone
//! - **TelemetryEvent**: append-only outcome log used for alerting

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod agent;
pub mod id;
pub mod knowledge;
pub mod lead;
pub mod message;
pub mod model;
pub mod strategy;
pub mod telemetry;
pub mod traits;

// Re-exports for convenience
pub use agent::{AgentConfig, Persona};
pub use id::RecordId;
pub use knowledge::{KnowledgeChunk, KnowledgeSource, NewChunk, SourceKind, SourceStatus};
pub use lead::{LeadCandidate, LeadChannels, LeadClaim, LeadRecord, NewLead};
pub use message::{History, Message, Role};
pub use model::{ChatRequest, SupportedModel};
pub use strategy::{BehaviorType, StrategyMode};
pub use telemetry::{now_millis, window_start, AlertThresholds, Outcome, TelemetryEvent};
