//! System prompt assembly

use crate::parser::LEAD_MARKER;
use crate::presets::{behavior_preset, strategy_instructions};
use folio_domain::{AgentConfig, BehaviorType, KnowledgeChunk, StrategyMode};

/// Builds the system prompt for one visitor turn
///
/// Operator identifiers (portfolio id, agent id) and the avatar never enter
/// the prompt; only the persona's visible fields do.
pub struct PromptBuilder {
    display_name: String,
    behavior: BehaviorType,
    strategy: StrategyMode,
    custom_prompt: Option<String>,
    role_label: Option<String>,
    intro: Option<String>,
    knowledge: Vec<KnowledgeChunk>,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new(display_name: impl Into<String>, behavior: BehaviorType, strategy: StrategyMode) -> Self {
        Self {
            display_name: display_name.into(),
            behavior,
            strategy,
            custom_prompt: None,
            role_label: None,
            intro: None,
            knowledge: Vec::new(),
        }
    }

    /// Start from an agent's configuration and persona
    pub fn for_agent(agent: &AgentConfig) -> Self {
        Self::new(
            agent.persona.display_name.clone(),
            agent.behavior_type,
            agent.strategy_mode,
        )
        .with_custom_prompt(agent.custom_prompt.clone())
        .with_role_label(agent.persona.role_label.clone())
        .with_intro(agent.persona.intro.clone())
    }

    /// Tenant instructions that supplement the preset
    pub fn with_custom_prompt(mut self, custom_prompt: Option<String>) -> Self {
        self.custom_prompt = non_blank(custom_prompt);
        self
    }

    /// Role description, e.g. "studio assistant"
    pub fn with_role_label(mut self, role_label: Option<String>) -> Self {
        self.role_label = non_blank(role_label);
        self
    }

    /// Opening line the visitor has already seen
    pub fn with_intro(mut self, intro: Option<String>) -> Self {
        self.intro = non_blank(intro);
        self
    }

    /// Retrieved knowledge, in rank order
    pub fn with_knowledge(mut self, chunks: Vec<KnowledgeChunk>) -> Self {
        self.knowledge = chunks;
        self
    }

    /// Build the complete system prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. Identity
        match &self.role_label {
            Some(role) => prompt.push_str(&format!(
                "You are {}, the {} for this portfolio website.\n",
                self.display_name, role
            )),
            None => prompt.push_str(&format!(
                "You are {}, the assistant for this portfolio website.\n",
                self.display_name
            )),
        }
        if let Some(intro) = &self.intro {
            prompt.push_str(&format!(
                "Visitors were greeted with: \"{}\". Stay consistent with it.\n",
                intro
            ));
        }
        prompt.push('\n');

        // 2. Tone
        prompt.push_str("Tone:\n");
        prompt.push_str(behavior_preset(self.behavior));
        prompt.push_str("\n\n");

        if let Some(custom) = &self.custom_prompt {
            prompt.push_str("Additional instructions from the owner:\n");
            prompt.push_str(custom);
            prompt.push_str("\n\n");
        }

        // 3. Objective
        prompt.push_str("Objective:\n");
        prompt.push_str(strategy_instructions(self.strategy));
        prompt.push_str("\n\n");

        // 4. Knowledge, omitted entirely when nothing was retrieved
        if !self.knowledge.is_empty() {
            prompt.push_str(KNOWLEDGE_HEADER);
            prompt.push('\n');
            for (rank, chunk) in self.knowledge.iter().enumerate() {
                prompt.push_str(&format!("[Knowledge {}]\n{}\n\n", rank + 1, chunk.text));
            }
        }

        // 5. Structured suffix contract
        prompt.push_str(&suffix_instructions());

        prompt
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

const KNOWLEDGE_HEADER: &str = "Reference material about this portfolio. Use it to answer \
accurately; do not quote these labels to the visitor.";

fn suffix_instructions() -> String {
    format!(
        r#"Reply to the visitor in natural language first. Then, on a new line, write {marker} followed by a single JSON object and nothing else:
{{"lead_detected": true|false, "confidence": 0.0-1.0, "name": string|null, "email": string|null, "phone": string|null, "website": string|null, "project_details": string|null, "budget": string|null}}

Rules for the JSON:
- lead_detected is true only when the visitor wants to work together or hire and has shared a way to reach them or a concrete project need
- Only fill fields the visitor actually stated; use null otherwise
- Never mention {marker} or the JSON in your reply"#,
        marker = LEAD_MARKER
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_domain::{Persona, RecordId};

    fn chunk(text: &str) -> KnowledgeChunk {
        KnowledgeChunk {
            id: RecordId::new(),
            source_id: "src-1".to_string(),
            ordinal: 0,
            text: text.to_string(),
            embedding: vec![],
        }
    }

    fn agent() -> AgentConfig {
        AgentConfig {
            agent_id: "agent-secret-id".to_string(),
            portfolio_id: "portfolio-secret-id".to_string(),
            handle: "ada".to_string(),
            is_enabled: true,
            model: "gpt-4o-mini".to_string(),
            behavior_type: BehaviorType::Professional,
            custom_prompt: Some("Mention the free discovery call.".to_string()),
            temperature: 0.4,
            strategy_mode: StrategyMode::Sales,
            persona: Persona {
                display_name: "Ada".to_string(),
                avatar_url: Some("https://cdn.example/ada.png".to_string()),
                intro: Some("Hi, I'm Ada!".to_string()),
                role_label: Some("studio assistant".to_string()),
            },
        }
    }

    #[test]
    fn test_prompt_includes_persona_and_presets() {
        let prompt = PromptBuilder::for_agent(&agent()).build();
        assert!(prompt.contains("You are Ada, the studio assistant"));
        assert!(prompt.contains("Hi, I'm Ada!"));
        assert!(prompt.contains(behavior_preset(BehaviorType::Professional)));
        assert!(prompt.contains(strategy_instructions(StrategyMode::Sales)));
    }

    #[test]
    fn test_custom_prompt_supplements_preset() {
        let prompt = PromptBuilder::for_agent(&agent()).build();
        let preset_at = prompt.find(behavior_preset(BehaviorType::Professional)).unwrap();
        let custom_at = prompt.find("Mention the free discovery call.").unwrap();
        assert!(preset_at < custom_at);
    }

    #[test]
    fn test_prompt_never_leaks_identifiers() {
        let prompt = PromptBuilder::for_agent(&agent())
            .with_knowledge(vec![chunk("We build apps.")])
            .build();
        assert!(!prompt.contains("agent-secret-id"));
        assert!(!prompt.contains("portfolio-secret-id"));
        assert!(!prompt.contains("src-1"));
        assert!(!prompt.contains("ada.png"));
    }

    #[test]
    fn test_knowledge_blocks_in_rank_order() {
        let prompt = PromptBuilder::new("Ada", BehaviorType::Friendly, StrategyMode::Consultative)
            .with_knowledge(vec![chunk("First passage"), chunk("Second passage")])
            .build();
        let first = prompt.find("[Knowledge 1]\nFirst passage").unwrap();
        let second = prompt.find("[Knowledge 2]\nSecond passage").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_knowledge_section_omitted_when_empty() {
        let prompt = PromptBuilder::new("Ada", BehaviorType::Minimal, StrategyMode::Support).build();
        assert!(!prompt.contains(KNOWLEDGE_HEADER));
        assert!(!prompt.contains("[Knowledge"));
    }

    #[test]
    fn test_blank_optional_fields_ignored() {
        let prompt = PromptBuilder::new("Ada", BehaviorType::Friendly, StrategyMode::Support)
            .with_custom_prompt(Some("   ".to_string()))
            .with_role_label(None)
            .build();
        assert!(!prompt.contains("Additional instructions"));
        assert!(prompt.contains("You are Ada, the assistant"));
    }

    #[test]
    fn test_prompt_requests_structured_suffix() {
        let prompt = PromptBuilder::new("Ada", BehaviorType::Friendly, StrategyMode::Sales).build();
        assert!(prompt.contains(LEAD_MARKER));
        assert!(prompt.contains("\"lead_detected\""));
    }
}
