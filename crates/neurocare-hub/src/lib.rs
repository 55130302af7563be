//! # NeuroCare Hub
//!
//! Network side of NeuroCare: HTTP clients for the primary and chatbot
//! chat services, plus the intent chatbot service itself.

pub mod api;
pub mod intents;
pub mod services;

pub use services::{ChatbotService, PrimaryService};
