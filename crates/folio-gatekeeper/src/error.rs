//! Error types for the Gatekeeper

use thiserror::Error;

/// Errors that can occur during lead capture
#[derive(Error, Debug)]
pub enum GuardError {
    /// Lead store error
    #[error("Store error: {0}")]
    Store(String),
}
