//! Prompt version registry and coach prompt builder
//!
//! Prompt templates are pre-built strings. Each version is a named variant of
//! the coach instruction template, so quality changes can be attributed to
//! prompt changes across experiment runs.

use crate::eval::dataset::UserProfile;
use crate::llm::messages::ChatMessage;

/// One named variant of the coach instruction template
#[derive(Debug, Clone, Copy)]
pub struct PromptVersion {
    /// Stable identifier, e.g. "v2-empathetic"
    pub id: &'static str,
    pub description: &'static str,
    system_template: &'static str,
}

const V1_BASELINE: &str = "You are a personal finance coach. Answer the user's question using their \
profile and recent transactions. Be practical and specific. Never promise or guarantee financial \
outcomes, and never tell the user to buy a specific asset.";

const V2_EMPATHETIC: &str = "You are a supportive personal finance coach. Acknowledge how the user \
feels before advising. Suggest one or two concrete next steps tied to their stated goals. Avoid \
jargon. Never promise or guarantee outcomes, and never recommend specific volatile assets.";

const V3_STRUCTURED: &str = "You are a personal finance coach. Reply with: (1) a one-sentence \
summary of the user's situation, (2) two or three numbered action steps with dollar amounts where \
possible, (3) one encouraging closing line. Never guarantee outcomes or push specific investments.";

/// All recognized prompt versions, in release order
pub const PROMPT_VERSIONS: &[PromptVersion] = &[
    PromptVersion {
        id: "v1-baseline",
        description: "Original coach instructions",
        system_template: V1_BASELINE,
    },
    PromptVersion {
        id: "v2-empathetic",
        description: "Leads with empathy, pushes concrete next steps",
        system_template: V2_EMPATHETIC,
    },
    PromptVersion {
        id: "v3-structured",
        description: "Fixed three-part answer structure",
        system_template: V3_STRUCTURED,
    },
];

/// Look up a recognized prompt version by id
pub fn find_prompt_version(id: &str) -> Option<&'static PromptVersion> {
    PROMPT_VERSIONS.iter().find(|v| v.id == id)
}

impl PromptVersion {
    /// Build the composed coach prompt for a scenario question.
    ///
    /// Conversation history is empty for experiment runs; the profile is
    /// rendered into the system message the same way the app does it.
    pub fn build_coach_prompt(&self, profile: &UserProfile, question: &str) -> Vec<ChatMessage> {
        let system = format!(
            "{}\n\nUser profile:\n- Income range: {}\n- Goals: {}\n- Concerns: {}",
            self.system_template,
            profile.income_range,
            profile.goals.join(", "),
            profile.concerns.join(", "),
        );
        vec![ChatMessage::system(system), ChatMessage::user(question)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            income_range: "$40k-$60k".to_string(),
            goals: vec!["emergency fund".to_string()],
            concerns: vec!["overspending".to_string()],
        }
    }

    #[test]
    fn test_registry_lookup() {
        assert!(find_prompt_version("v2-empathetic").is_some());
        assert!(find_prompt_version("v99-nope").is_none());
    }

    #[test]
    fn test_version_ids_unique() {
        for (i, a) in PROMPT_VERSIONS.iter().enumerate() {
            for b in &PROMPT_VERSIONS[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn test_coach_prompt_carries_profile_and_question() {
        let version = find_prompt_version("v1-baseline").unwrap();
        let messages = version.build_coach_prompt(&profile(), "How do I save more?");
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("emergency fund"));
        assert!(messages[0].content.contains("overspending"));
        assert_eq!(messages[1].content, "How do I save more?");
    }
}
