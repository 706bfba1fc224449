//! Per-strategy lead sufficiency policy
//!
//! Each strategy mode maps to a plain [`LeadPolicy`] value; the decision is
//! a pure function of the policy, the channels and the project details.

use folio_domain::{LeadChannels, StrategyMode};
use serde::{Deserialize, Serialize};

/// Evidence a strategy mode demands before a lead is captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadPolicy {
    /// Words of project details that allow capture without any channel;
    /// `None` means a contact channel is always required
    pub detail_only_min_words: Option<usize>,

    /// Words of project details required when a website is the only channel
    pub website_only_min_detail_words: usize,
}

impl LeadPolicy {
    /// Built-in policy for a strategy mode
    pub fn for_mode(mode: StrategyMode) -> Self {
        match mode {
            // A bare website or a vague ask is not enough to follow up on
            StrategyMode::Consultative => Self {
                detail_only_min_words: None,
                website_only_min_detail_words: 6,
            },
            StrategyMode::Support => Self {
                detail_only_min_words: None,
                website_only_min_detail_words: 0,
            },
            StrategyMode::Sales => Self {
                detail_only_min_words: Some(8),
                website_only_min_detail_words: 0,
            },
        }
    }

    /// Whether the evidence satisfies this policy
    pub fn is_sufficient(&self, channels: &LeadChannels, project_details: Option<&str>) -> bool {
        let detail_words = project_details
            .map(|d| d.split_whitespace().count())
            .unwrap_or(0);

        if channels.email.is_some() || channels.phone.is_some() {
            return true;
        }
        if channels.website.is_some() {
            return detail_words >= self.website_only_min_detail_words;
        }
        match self.detail_only_min_words {
            Some(min) => detail_words >= min.max(1),
            None => false,
        }
    }
}

/// Whether the lead fields satisfy the built-in policy for `mode`
pub fn has_sufficient_lead_fields(
    mode: StrategyMode,
    channels: &LeadChannels,
    project_details: Option<&str>,
) -> bool {
    LeadPolicy::for_mode(mode).is_sufficient(channels, project_details)
}
