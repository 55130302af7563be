//! Chat tier trait — the abstraction over remote chat services.

use async_trait::async_trait;

use crate::error::Result;

/// Everything a tier may need to address its service.
#[derive(Debug, Clone, Copy)]
pub struct TierRequest<'a> {
    pub session_id: i64,
    pub username: &'a str,
    pub mood_log_id: Option<&'a str>,
    pub message: &'a str,
}

/// A remote chat service attempted by the reply cascade.
///
/// Any `Err` counts as a tier failure: the session logs it and moves on.
///
/// # Example
///
/// ```rust,ignore
/// struct EchoTier;
///
/// #[async_trait]
/// impl ChatTier for EchoTier {
///     fn name(&self) -> &str { "echo" }
///
///     async fn reply(&self, request: TierRequest<'_>) -> Result<String> {
///         Ok(request.message.to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait ChatTier: Send + Sync {
    /// Tier name for logs (e.g. "primary", "chatbot").
    fn name(&self) -> &str;

    /// Whether this tier can only be addressed with a mood-log identifier.
    /// When it is absent the session fails the tier without calling it.
    fn requires_mood_log(&self) -> bool {
        false
    }

    /// Resolve a user message to a reply.
    async fn reply(&self, request: TierRequest<'_>) -> Result<String>;
}
