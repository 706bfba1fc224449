//! Folio Reply Generation
//!
//! Produces the agent's reply to one visitor turn: the history is sanitized,
//! relevant knowledge is retrieved, the system prompt is assembled from the
//! tenant's presets and persona, the model is called under a timeout, and the
//! structured lead suffix is split off the visible reply.
//!
//! # Architecture
//!
//! ```text
//! Visitor message + raw history
//!     ↓
//! sanitize_history / validate_message   (ValidationError, no network)
//!     ↓
//! KnowledgeIndex::retrieve              (degrades to no knowledge)
//!     ↓
//! PromptBuilder                         (presets + persona + knowledge + suffix contract)
//!     ↓
//! ChatModel::complete                   (GenerationError on failure or timeout)
//!     ↓
//! parse_reply                           (malformed suffix → no lead, full text shown)
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod generator;
pub mod history;
pub mod parser;
pub mod presets;
pub mod prompt;

pub use config::ResponderConfig;
pub use error::{GenerationError, ValidationError};
pub use generator::{GeneratedReply, ReplyGenerator};
pub use history::{sanitize_history, validate_message, RawMessage};
pub use parser::{parse_reply, ParsedReply, LEAD_MARKER};
pub use prompt::PromptBuilder;
