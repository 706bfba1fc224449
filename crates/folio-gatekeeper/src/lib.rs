//! Folio Lead Gatekeeper
//!
//! Decides whether a conversation turn produced a lead worth persisting.
//!
//! The gatekeeper provides:
//! - Contact channel extraction from free text (email, phone, website)
//! - A per-strategy sufficiency policy for lead fields
//! - Evaluation of the model's lead claim against that policy
//! - Once-per-session capture through the `LeadStore` seam
//!
//! Rejections are expected outcomes, not errors; they carry a
//! [`RejectionReason`] for logging and tests.
//!
//! # Examples
//!
//! ```
//! use folio_gatekeeper::{has_sufficient_lead_fields, parse_lead_channels_from_text};
//! use folio_domain::StrategyMode;
//!
//! let channels = parse_lead_channels_from_text("Reach me at jane@co.com");
//! assert_eq!(channels.email.as_deref(), Some("jane@co.com"));
//! assert!(has_sufficient_lead_fields(StrategyMode::Sales, &channels, None));
//! ```

#![warn(missing_docs)]

mod channels;
mod config;
mod error;
mod guard;
mod policy;

pub use channels::parse_lead_channels_from_text;
pub use config::GuardConfig;
pub use error::GuardError;
pub use guard::{CaptureOutcome, GuardDecision, LeadGuard, LeadTurn, RejectionReason};
pub use policy::{has_sufficient_lead_fields, LeadPolicy};
