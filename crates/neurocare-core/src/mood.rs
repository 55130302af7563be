//! Mood context — who is chatting, how they feel, and which mood log
//! the conversation belongs to.

use serde::{Deserialize, Serialize};

/// Username used when the context has none.
pub const DEFAULT_USERNAME: &str = "User";

/// Mood label used when the context has none.
pub const DEFAULT_MOOD: &str = "Neutral";

/// Source of the current user's mood state.
///
/// Every value is optional; the session applies its own defaults.
pub trait MoodContext: Send + Sync {
    fn username(&self) -> Option<String>;

    fn current_mood(&self) -> Option<String>;

    /// Identifier of the mood-questionnaire submission this chat follows.
    /// Required by the primary chat service only.
    fn mood_log_id(&self) -> Option<String>;
}

/// Mood context read from the `[profile]` config section or CLI flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileContext {
    pub username: Option<String>,
    pub mood: Option<String>,
    pub mood_log_id: Option<String>,
}

impl ProfileContext {
    /// Overlay any provided values on top of this profile.
    pub fn merged(
        mut self,
        username: Option<String>,
        mood: Option<String>,
        mood_log_id: Option<String>,
    ) -> Self {
        if username.is_some() {
            self.username = username;
        }
        if mood.is_some() {
            self.mood = mood;
        }
        if mood_log_id.is_some() {
            self.mood_log_id = mood_log_id;
        }
        self
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl MoodContext for ProfileContext {
    fn username(&self) -> Option<String> {
        non_blank(&self.username)
    }

    fn current_mood(&self) -> Option<String> {
        non_blank(&self.mood)
    }

    fn mood_log_id(&self) -> Option<String> {
        non_blank(&self.mood_log_id)
    }
}

const GENERIC_GREETING: &str = "Hello! I'm NeuroCare AI, your mental wellness companion. I'm here to listen and support you. How are you feeling today?";

const MOOD_GREETINGS: &[(&str, &str)] = &[
    (
        "Happy/Calm",
        "Hello! I'm NeuroCare AI. I can see you're feeling positive and balanced today - that's wonderful! What would you like to talk about?",
    ),
    (
        "Neutral",
        "Hello! I'm NeuroCare AI. I see you're in a stable mood today. How has your day been so far?",
    ),
    (
        "Stressed",
        "Hello! I'm NeuroCare AI. I notice you might be feeling some stress. I'm here to listen and help you work through whatever is on your mind.",
    ),
    (
        "Depressed/Low",
        "Hello! I'm NeuroCare AI. I sense you might be going through a difficult time. Please know I'm here to support you without judgment.",
    ),
    (
        "Tired/Exhausted",
        "Hello! I'm NeuroCare AI. It seems like you might be feeling drained today. Let's talk about what's been weighing on you.",
    ),
];

/// Opening line for a mood label. Exact match only.
pub fn greeting_for(mood: &str) -> &'static str {
    MOOD_GREETINGS
        .iter()
        .find(|(label, _)| *label == mood)
        .map(|(_, greeting)| *greeting)
        .unwrap_or(GENERIC_GREETING)
}

/// All mood labels with a dedicated greeting.
pub fn known_moods() -> impl Iterator<Item = &'static str> {
    MOOD_GREETINGS.iter().map(|(label, _)| *label)
}
