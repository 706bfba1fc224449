//! Tone presets and strategy instructions
//!
//! Both are closed tag-to-text tables; adding a tag means adding a match arm
//! here and nowhere else.

use folio_domain::{BehaviorType, StrategyMode};

/// Tone guidance for a behavior preset
pub fn behavior_preset(behavior: BehaviorType) -> &'static str {
    match behavior {
        BehaviorType::Friendly => FRIENDLY,
        BehaviorType::Professional => PROFESSIONAL,
        BehaviorType::Sales => SALES_TONE,
        BehaviorType::Minimal => MINIMAL,
    }
}

/// Conversation objective for a strategy mode
pub fn strategy_instructions(mode: StrategyMode) -> &'static str {
    match mode {
        StrategyMode::Consultative => CONSULTATIVE,
        StrategyMode::Sales => SALES_STRATEGY,
        StrategyMode::Support => SUPPORT,
    }
}

const FRIENDLY: &str = "Be warm, approachable and conversational. Use plain language, \
show genuine interest in what the visitor is working on, and keep the tone light \
without being flippant.";

const PROFESSIONAL: &str = "Be polished, precise and courteous. Prefer clear, well-structured \
answers over casual chatter, and keep a confident but measured tone.";

const SALES_TONE: &str = "Be energetic and outcome-focused. Highlight the value of the work \
and relevant results, and keep the conversation moving toward what the visitor wants to achieve.";

const MINIMAL: &str = "Be brief. Answer in as few sentences as the question allows, \
skip pleasantries, and avoid lists unless asked.";

const CONSULTATIVE: &str = "Act as an advisor. Understand the visitor's situation and goals \
before suggesting anything. Do not ask for contact details, budget or timeline early in the \
conversation; only invite the visitor to share contact details once they have described a \
concrete need and shown interest in working together.";

const SALES_STRATEGY: &str = "Guide the conversation toward a concrete next step such as a call, \
a quote or a booking. Once the visitor shows interest, ask for the best way to reach them \
(email or phone) and a short description of the project.";

const SUPPORT: &str = "Focus on answering questions accurately and resolving the visitor's \
issue. Offer to connect the visitor with a person when the question cannot be answered \
from what you know.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_behavior_has_distinct_preset() {
        let presets: Vec<_> = [
            BehaviorType::Friendly,
            BehaviorType::Professional,
            BehaviorType::Sales,
            BehaviorType::Minimal,
        ]
        .into_iter()
        .map(behavior_preset)
        .collect();

        for (i, a) in presets.iter().enumerate() {
            assert!(!a.is_empty());
            for b in &presets[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_consultative_defers_qualification() {
        assert!(strategy_instructions(StrategyMode::Consultative).contains("Do not ask for contact details"));
    }

    #[test]
    fn test_sales_pushes_next_step() {
        assert!(strategy_instructions(StrategyMode::Sales).contains("concrete next step"));
    }
}
