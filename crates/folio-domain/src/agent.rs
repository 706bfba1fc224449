//! Tenant agent configuration
//!
//! Owned by the dashboard; the core only reads it.

use crate::{BehaviorType, StrategyMode};

/// How the agent presents itself to visitors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Persona {
    /// Name shown in the chat widget
    pub display_name: String,
    /// Avatar image URL
    pub avatar_url: Option<String>,
    /// Opening line shown to visitors
    pub intro: Option<String>,
    /// Role description, e.g. "studio assistant"
    pub role_label: Option<String>,
}

/// Per-tenant agent configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Agent identifier
    pub agent_id: String,
    /// Owning portfolio
    pub portfolio_id: String,
    /// Public handle used by embedded widgets
    pub handle: String,
    /// Whether the public agent answers at all
    pub is_enabled: bool,
    /// Model id as configured; validated against the supported list per turn
    pub model: String,
    /// Tone preset
    pub behavior_type: BehaviorType,
    /// Extra tenant instructions layered on top of the preset
    pub custom_prompt: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Conversational objective
    pub strategy_mode: StrategyMode,
    /// Presentation details
    pub persona: Persona,
}
