use a2a_types::{AgentSkill, Task};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::capability::ResponseCapability;
use crate::errors::AgentResult;

pub const GREETING_SKILL_ID: &str = "hello";

static GREETING_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new("(?i)hello|hi|hey").expect("greeting words regex is valid"));

/// Replies with a greeting addressed to whatever the caller wrote after
/// removing greeting words. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreetingCapability;

impl GreetingCapability {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Name to greet: the text with every `hello`, `hi` and `hey` removed
    /// (anywhere, any case) and trimmed, or `World` when nothing is left.
    #[must_use]
    pub fn addressee(text: &str) -> String {
        let stripped = GREETING_WORDS.replace_all(text, "");
        let name = stripped.trim();
        if name.is_empty() {
            "World".to_string()
        } else {
            name.to_string()
        }
    }

    #[must_use]
    pub fn skill_metadata() -> AgentSkill {
        AgentSkill::new(
            GREETING_SKILL_ID,
            "Hello",
            "Greets the caller by name and reports the current time",
        )
        .with_tags(["greeting", "demo"])
        .with_examples(["Hello", "Hi Alice", "hey there"])
    }
}

#[async_trait::async_trait]
impl ResponseCapability for GreetingCapability {
    fn skill(&self) -> AgentSkill {
        Self::skill_metadata()
    }

    async fn generate(&self, text: &str, _prior_turns: &[Task]) -> AgentResult<String> {
        let name = Self::addressee(text);
        let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        Ok(format!(
            "Hello, {name}! This is an A2A agent. The time is {now}."
        ))
    }
}
