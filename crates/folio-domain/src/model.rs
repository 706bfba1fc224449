//! Language model identifiers and requests

use crate::Message;
use std::fmt;

/// Models a tenant may select for their agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportedModel {
    /// gpt-4o-mini
    Gpt4oMini,
    /// gpt-4o
    Gpt4o,
    /// gpt-4.1-mini
    Gpt41Mini,
    /// gpt-4.1
    Gpt41,
}

impl SupportedModel {
    /// Every supported model
    pub const ALL: [SupportedModel; 4] = [
        SupportedModel::Gpt4oMini,
        SupportedModel::Gpt4o,
        SupportedModel::Gpt41Mini,
        SupportedModel::Gpt41,
    ];

    /// Provider model id
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportedModel::Gpt4oMini => "gpt-4o-mini",
            SupportedModel::Gpt4o => "gpt-4o",
            SupportedModel::Gpt41Mini => "gpt-4.1-mini",
            SupportedModel::Gpt41 => "gpt-4.1",
        }
    }

    /// Parse a provider model id (exact match, case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|m| m.as_str() == wanted)
    }
}

impl Default for SupportedModel {
    fn default() -> Self {
        SupportedModel::Gpt4oMini
    }
}

impl fmt::Display for SupportedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat completion request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Provider model id
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// System prompt
    pub system_prompt: String,
    /// Conversation, oldest first, ending with the newest visitor message
    pub messages: Vec<Message>,
}

impl ChatRequest {
    /// The newest visitor message, if any
    pub fn latest_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == crate::Role::User)
            .map(|m| m.content.as_str())
    }
}
