//! Lead evidence and persisted leads

use crate::{RecordId, StrategyMode};

/// Normalized contact identifiers extracted from free text
///
/// `None` means the channel was not found; an empty string is never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadChannels {
    /// Lower-cased email address
    pub email: Option<String>,
    /// Phone number as written (7-15 digits once formatting is removed)
    pub phone: Option<String>,
    /// Website without scheme, host lower-cased
    pub website: Option<String>,
}

impl LeadChannels {
    /// Whether at least one viable contact channel is present
    pub fn has_any(&self) -> bool {
        self.email.is_some() || self.phone.is_some() || self.website.is_some()
    }

    /// Fill channels missing here from `other`; present channels win
    pub fn or(self, other: LeadChannels) -> LeadChannels {
        LeadChannels {
            email: self.email.or(other.email),
            phone: self.phone.or(other.phone),
            website: self.website.or(other.website),
        }
    }
}

/// Lead judgment claimed by the model in its structured reply suffix
///
/// Every field is unverified model output; the guard validates channels
/// before any of it reaches a [`LeadCandidate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadClaim {
    /// Whether the model believes the visitor is a lead
    pub detected: bool,
    /// Model confidence in [0, 1]
    pub confidence: f64,
    /// Claimed visitor name
    pub name: Option<String>,
    /// Claimed email
    pub email: Option<String>,
    /// Claimed phone
    pub phone: Option<String>,
    /// Claimed website
    pub website: Option<String>,
    /// Claimed project description
    pub project_details: Option<String>,
    /// Claimed budget
    pub budget: Option<String>,
}

impl LeadClaim {
    /// A claim that no lead was detected
    pub fn none() -> Self {
        Self::default()
    }
}

/// Per-turn lead decision input
///
/// Produced by the guard when evidence passes policy; never persisted as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadCandidate {
    /// Strategy the conversation runs under
    pub strategy_mode: StrategyMode,
    /// Contact channels (model-claimed merged with text-extracted)
    pub channels: LeadChannels,
    /// Visitor name, when the model picked one up
    pub name: Option<String>,
    /// Description of what the visitor needs
    pub project_details: Option<String>,
    /// Budget as stated by the visitor
    pub budget: Option<String>,
    /// Model confidence in [0, 1]
    pub confidence: f64,
}

/// Lead to be written by the persistence collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct NewLead {
    /// Portfolio the lead belongs to
    pub portfolio_id: String,
    /// Deduplication key: session id or an anonymous caller key
    pub session_key: String,
    /// Accepted candidate
    pub candidate: LeadCandidate,
}

/// Persisted lead
#[derive(Debug, Clone, PartialEq)]
pub struct LeadRecord {
    /// Lead identifier
    pub id: RecordId,
    /// Owning portfolio
    pub portfolio_id: String,
    /// Deduplication key the lead was captured under
    pub session_key: String,
    /// Visitor name
    pub name: Option<String>,
    /// Email channel
    pub email: Option<String>,
    /// Phone channel
    pub phone: Option<String>,
    /// Website channel
    pub website: Option<String>,
    /// Project description
    pub project_details: Option<String>,
    /// Stated budget
    pub budget: Option<String>,
    /// Read flag, toggled by the dashboard only
    pub is_read: bool,
    /// Creation time (milliseconds since Unix epoch)
    pub created_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_any() {
        assert!(!LeadChannels::default().has_any());
        let channels = LeadChannels {
            website: Some("example.com".to_string()),
            ..Default::default()
        };
        assert!(channels.has_any());
    }

    #[test]
    fn test_or_prefers_self() {
        let model = LeadChannels {
            email: Some("a@b.co".to_string()),
            ..Default::default()
        };
        let text = LeadChannels {
            email: Some("other@b.co".to_string()),
            phone: Some("555 111 2222".to_string()),
            website: None,
        };
        let merged = model.or(text);
        assert_eq!(merged.email.as_deref(), Some("a@b.co"));
        assert_eq!(merged.phone.as_deref(), Some("555 111 2222"));
        assert_eq!(merged.website, None);
    }
}
