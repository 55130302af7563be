//! # NeuroCare Core
//!
//! Session controller, reply cascade, and shared types for the NeuroCare
//! mental-wellness companion. Contains no network code; remote chat
//! services plug in through [`tier::ChatTier`].

pub mod bus;
pub mod config;
pub mod error;
pub mod message;
pub mod mood;
pub mod responder;
pub mod session;
pub mod tier;
