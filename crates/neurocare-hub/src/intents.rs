//! Intent classifier behind the chatbot service.
//!
//! Two passes over the intent table: regex pattern matches first
//! (confidence 0.9), then plain substring matches on each pattern's bare
//! keyword (0.6). Anything else is the `general` intent at 0.3.

use rand::seq::SliceRandom;
use regex::Regex;

use neurocare_core::error::{NeuroCareError, Result};

pub const GENERAL_INTENT: &str = "general";

const PATTERN_CONFIDENCE: f32 = 0.9;
const KEYWORD_CONFIDENCE: f32 = 0.6;
const GENERAL_CONFIDENCE: f32 = 0.3;

struct IntentSpec {
    name: &'static str,
    patterns: &'static [&'static str],
    responses: &'static [&'static str],
}

const INTENTS: &[IntentSpec] = &[
    IntentSpec {
        name: "greeting",
        patterns: &[r"\bhi\b", r"\bhello\b", r"\bhey\b", r"assalam"],
        responses: &[
            "Hello! How can I support you today?",
            "Hey there! What's on your mind?",
            "Hi! I'm here to help whenever you're ready.",
        ],
    },
    IntentSpec {
        name: "sadness",
        patterns: &[r"\bsad\b", r"\bdepressed\b", r"\bdown\b", r"\bunhappy\b"],
        responses: &[
            "I'm really sorry you're feeling this way. Want to share what's troubling you?",
            "That sounds hard… I'm here for you. What happened?",
            "It's okay to feel this way. Tell me more, I'm listening.",
        ],
    },
    IntentSpec {
        name: "anxiety",
        patterns: &[r"\banxious\b", r"\banxiety\b", r"\bscared\b", r"\bworried\b"],
        responses: &[
            "Anxiety can be overwhelming. Do you know what triggered it?",
            "You're safe. Let's work through this. What are you worried about?",
            "Take a breath… I'm right here. Want to talk about what's making you anxious?",
        ],
    },
    IntentSpec {
        name: "stress",
        patterns: &[
            r"\bstress\b",
            r"\bstressed\b",
            r"\boverwhelmed\b",
            r"\bpressure\b",
        ],
        responses: &[
            "Stress can feel overwhelming. Let's break this down together.",
            "I hear you're feeling stressed. What's causing the most pressure right now?",
            "Stress is tough. Would it help to talk about what's overwhelming you?",
        ],
    },
    IntentSpec {
        name: "sleep",
        patterns: &[r"\bsleep\b", r"\btired\b", r"\binsomnia\b", r"\bexhausted\b"],
        responses: &[
            "Sleep issues can really affect your wellbeing. How's your sleep been lately?",
            "Feeling tired can make everything harder. Are you getting enough rest?",
            "Sleep is so important for mental health. What's your sleep pattern been like?",
        ],
    },
    IntentSpec {
        name: "goodbye",
        patterns: &[r"\bbye\b", r"\bgoodbye\b", r"\bsee you\b", r"\bgood night\b"],
        responses: &[
            "Take care! I'm always here if you need me.",
            "Goodbye! Remember, you're doing your best.",
            "See you soon. Stay strong!",
        ],
    },
];

const GENERAL_RESPONSES: &[&str] = &[
    "I understand... please tell me more about how you're feeling.",
    "Thank you for sharing that with me. Would you like to explore this further?",
    "I'm listening carefully. Could you tell me more about what's on your mind?",
];

/// Result of classifying a message.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub intent: &'static str,
    pub confidence: f32,
}

struct CompiledIntent {
    spec: &'static IntentSpec,
    patterns: Vec<Regex>,
    keywords: Vec<String>,
}

/// The literal text of a pattern, with word-boundary anchors removed.
fn bare_keyword(pattern: &str) -> String {
    pattern.replace(r"\b", "").trim().to_string()
}

pub struct IntentClassifier {
    intents: Vec<CompiledIntent>,
}

impl IntentClassifier {
    pub fn new() -> Result<Self> {
        let intents = INTENTS
            .iter()
            .map(|spec| -> Result<CompiledIntent> {
                let patterns = spec
                    .patterns
                    .iter()
                    .map(|p| Regex::new(p))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| NeuroCareError::Other(format!("Bad intent pattern: {}", e)))?;
                let keywords = spec
                    .patterns
                    .iter()
                    .map(|p| bare_keyword(p))
                    .filter(|k| !k.is_empty())
                    .collect();
                Ok(CompiledIntent {
                    spec,
                    patterns,
                    keywords,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { intents })
    }

    /// Intent names in table order.
    pub fn names(&self) -> Vec<&'static str> {
        self.intents.iter().map(|i| i.spec.name).collect()
    }

    pub fn classify(&self, message: &str) -> Classification {
        let message = message.to_lowercase();

        for intent in &self.intents {
            if intent.patterns.iter().any(|p| p.is_match(&message)) {
                return Classification {
                    intent: intent.spec.name,
                    confidence: PATTERN_CONFIDENCE,
                };
            }
        }

        for intent in &self.intents {
            if intent.keywords.iter().any(|k| message.contains(k.as_str())) {
                return Classification {
                    intent: intent.spec.name,
                    confidence: KEYWORD_CONFIDENCE,
                };
            }
        }

        Classification {
            intent: GENERAL_INTENT,
            confidence: GENERAL_CONFIDENCE,
        }
    }

    /// Pick a reply for an intent; unknown intents get a general reply.
    pub fn reply_for(&self, intent: &str) -> &'static str {
        let pool = self
            .intents
            .iter()
            .find(|i| i.spec.name == intent)
            .map(|i| i.spec.responses)
            .unwrap_or(GENERAL_RESPONSES);

        pool.choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(GENERAL_RESPONSES[0])
    }
}
