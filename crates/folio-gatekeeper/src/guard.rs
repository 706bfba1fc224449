//! Lead evaluation and capture

use crate::channels::{has_contact_evidence, parse_lead_channels_from_text};
use crate::config::GuardConfig;
use crate::error::GuardError;
use folio_domain::traits::LeadStore;
use folio_domain::{
    History, LeadCandidate, LeadChannels, LeadClaim, LeadRecord, NewLead, Role, StrategyMode,
};
use std::fmt::Display;
use tracing::{debug, info};

/// Everything the guard looks at for one turn
#[derive(Debug, Clone, Copy)]
pub struct LeadTurn<'a> {
    /// Strategy the agent runs under
    pub strategy_mode: StrategyMode,
    /// Lead judgment claimed by the model
    pub claim: &'a LeadClaim,
    /// The visitor's message this turn
    pub message: &'a str,
    /// Sanitized prior history
    pub history: &'a History,
}

/// Why a turn did not produce a lead
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// The session already has a lead
    AlreadyCaptured,

    /// Neither the model nor the message indicate a lead
    NotDetected,

    /// The model's claim is too uncertain and the message has no channel
    LowConfidence {
        /// Model confidence
        confidence: f64,
        /// Configured minimum
        required: f64,
    },

    /// The evidence does not satisfy the strategy's policy
    InsufficientFields,
}

/// Outcome of evaluating a turn
#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    /// Persist this candidate
    Accept(LeadCandidate),
    /// Do nothing
    Reject(RejectionReason),
}

/// Outcome of a capture attempt
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// A new lead was written
    Captured(LeadRecord),
    /// The session already had a lead; nothing was written
    AlreadyCaptured,
    /// The turn was rejected by policy
    Rejected(RejectionReason),
}

impl CaptureOutcome {
    /// Whether this call wrote a lead
    pub fn is_captured(&self) -> bool {
        matches!(self, CaptureOutcome::Captured(_))
    }
}

/// Gate between model lead claims and lead persistence
pub struct LeadGuard {
    config: GuardConfig,
}

impl LeadGuard {
    /// Create a new guard with the given configuration
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    /// Evaluate a turn, returning the candidate to persist if any
    pub fn evaluate(&self, turn: &LeadTurn<'_>) -> Option<LeadCandidate> {
        match self.assess(turn, false) {
            GuardDecision::Accept(candidate) => Some(candidate),
            GuardDecision::Reject(_) => None,
        }
    }

    /// Evaluate a turn with an explicit decision and rejection reason
    ///
    /// A session already marked captured is rejected without looking at the
    /// evidence.
    pub fn assess(&self, turn: &LeadTurn<'_>, already_captured: bool) -> GuardDecision {
        if already_captured {
            return GuardDecision::Reject(RejectionReason::AlreadyCaptured);
        }

        let claim = turn.claim;
        let message_channels = parse_lead_channels_from_text(turn.message);
        let text_evidence = has_contact_evidence(&message_channels, turn.message);

        if !claim.detected && !text_evidence {
            return GuardDecision::Reject(RejectionReason::NotDetected);
        }
        if claim.detected && claim.confidence < self.config.min_confidence && !text_evidence {
            return GuardDecision::Reject(RejectionReason::LowConfidence {
                confidence: claim.confidence,
                required: self.config.min_confidence,
            });
        }

        let channels = validated_claim_channels(claim)
            .or(message_channels)
            .or(user_history_channels(turn.history));

        let policy = self.config.policy(turn.strategy_mode);
        if !policy.is_sufficient(&channels, claim.project_details.as_deref()) {
            return GuardDecision::Reject(RejectionReason::InsufficientFields);
        }

        GuardDecision::Accept(LeadCandidate {
            strategy_mode: turn.strategy_mode,
            channels,
            name: claim.name.clone(),
            project_details: claim.project_details.clone(),
            budget: claim.budget.clone(),
            confidence: claim.confidence,
        })
    }

    /// Evaluate a turn and persist the lead at most once per session
    ///
    /// The store's uniqueness on (portfolio, session key) is the final
    /// arbiter: if a concurrent turn wins the insert, this call reports
    /// `AlreadyCaptured`.
    pub fn capture<S>(
        &self,
        store: &mut S,
        portfolio_id: &str,
        session_key: &str,
        turn: &LeadTurn<'_>,
    ) -> Result<CaptureOutcome, GuardError>
    where
        S: LeadStore,
        S::Error: Display,
    {
        let already_captured = store
            .find_lead_by_session(portfolio_id, session_key)
            .map_err(|e| GuardError::Store(e.to_string()))?
            .is_some();

        let candidate = match self.assess(turn, already_captured) {
            GuardDecision::Accept(candidate) => candidate,
            GuardDecision::Reject(RejectionReason::AlreadyCaptured) => {
                debug!("Session already has a lead, skipping evaluation");
                return Ok(CaptureOutcome::AlreadyCaptured);
            }
            GuardDecision::Reject(reason) => {
                debug!(?reason, "Lead rejected");
                return Ok(CaptureOutcome::Rejected(reason));
            }
        };

        let lead = NewLead {
            portfolio_id: portfolio_id.to_string(),
            session_key: session_key.to_string(),
            candidate,
        };

        match store.create_lead(lead) {
            Ok(record) => {
                info!(
                    strategy = turn.strategy_mode.as_str(),
                    "Lead captured for portfolio {}", portfolio_id
                );
                Ok(CaptureOutcome::Captured(record))
            }
            Err(e) => {
                let exists = store
                    .find_lead_by_session(portfolio_id, session_key)
                    .map_err(|e| GuardError::Store(e.to_string()))?
                    .is_some();
                if exists {
                    debug!("Concurrent turn captured the lead first");
                    Ok(CaptureOutcome::AlreadyCaptured)
                } else {
                    Err(GuardError::Store(e.to_string()))
                }
            }
        }
    }
}

impl Default for LeadGuard {
    fn default() -> Self {
        Self::new(GuardConfig::default())
    }
}

/// Model-claimed channels that survive the same validation as text channels
fn validated_claim_channels(claim: &LeadClaim) -> LeadChannels {
    let check = |value: &Option<String>| {
        value
            .as_deref()
            .map(parse_lead_channels_from_text)
            .unwrap_or_default()
    };

    LeadChannels {
        email: check(&claim.email).email,
        phone: check(&claim.phone).phone,
        website: check(&claim.website).website,
    }
}

/// Channels from the visitor's own earlier messages, most recent first
fn user_history_channels(history: &History) -> LeadChannels {
    history
        .iter()
        .rev()
        .filter(|m| m.role == Role::User)
        .map(|m| parse_lead_channels_from_text(&m.content))
        .fold(LeadChannels::default(), LeadChannels::or)
}
