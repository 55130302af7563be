//! Local responder — the offline last resort of the reply cascade.
//!
//! Keyword rules are checked in order against the lowercased message,
//! first match wins. A keyword matches anywhere in the message, so
//! inflections like "sleepy" or "stressful" still land in their category.

use rand::Rng;
use rand::seq::SliceRandom;

/// A keyword category with its fixed reply.
pub struct Rule {
    pub category: &'static str,
    pub keywords: &'static [&'static str],
    pub reply: &'static str,
}

pub const RULES: &[Rule] = &[
    Rule {
        category: "greeting",
        keywords: &["hello", "hi", "hey"],
        reply: "Hello! I'm NeuroCare AI. How can I support you today?",
    },
    Rule {
        category: "sadness",
        keywords: &["sad", "depressed", "down"],
        reply: "I'm really sorry you're feeling this way. Want to share what's troubling you?",
    },
    Rule {
        category: "anxiety",
        keywords: &["anxious", "anxiety", "worried"],
        reply: "Anxiety can be overwhelming. Do you know what triggered it?",
    },
    Rule {
        category: "stress",
        keywords: &["stress", "stressed", "overwhelmed"],
        reply: "Stress can feel overwhelming. Let's break this down together.",
    },
    Rule {
        category: "sleep",
        keywords: &["sleep", "tired", "exhausted"],
        reply: "Sleep issues can really affect your wellbeing. How's your sleep been lately?",
    },
    Rule {
        category: "farewell",
        keywords: &["bye", "goodbye"],
        reply: "Take care! I'm always here if you need me.",
    },
];

pub const GENERIC_REPLIES: &[&str] = &[
    "I understand... please tell me more about how you're feeling.",
    "Thank you for sharing that with me. Would you like to explore this further?",
    "I'm listening carefully. Could you tell me more about what's on your mind?",
    "That sounds important. How has this been affecting you?",
    "I appreciate you opening up about this. What would help you feel better?",
    "Let's work through this together. What do you think might help?",
];

/// First rule with a keyword contained in the message.
pub fn match_rule(message: &str) -> Option<&'static Rule> {
    let lowered = message.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lowered.contains(*k)))
}

/// Reply to a message without any network access.
pub fn local_reply(message: &str) -> String {
    local_reply_with(message, &mut rand::thread_rng())
}

/// [`local_reply`] with a caller-supplied RNG for the generic pool.
pub fn local_reply_with<R: Rng + ?Sized>(message: &str, rng: &mut R) -> String {
    if let Some(rule) = match_rule(message) {
        return rule.reply.to_string();
    }
    GENERIC_REPLIES
        .choose(rng)
        .copied()
        .unwrap_or(GENERIC_REPLIES[0])
        .to_string()
}
