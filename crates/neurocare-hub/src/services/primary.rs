//! Primary chat service — the mood-aware conversation backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use neurocare_core::error::{NeuroCareError, Result};
use neurocare_core::tier::{ChatTier, TierRequest};

use super::{endpoint, http_client, post_json};

/// Client for `POST /chat/message`.
///
/// Only usable once the user has a mood log; without one the tier fails
/// before any request is made.
pub struct PrimaryService {
    client: Client,
    api_url: String,
}

impl PrimaryService {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: http_client(),
            api_url: endpoint(base_url, "chat/message"),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    session_id: i64,
    message: &'a str,
    mood_log_id: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    response: String,
}

#[async_trait]
impl ChatTier for PrimaryService {
    fn name(&self) -> &str {
        "primary"
    }

    fn requires_mood_log(&self) -> bool {
        true
    }

    async fn reply(&self, request: TierRequest<'_>) -> Result<String> {
        let mood_log_id = request.mood_log_id.ok_or(NeuroCareError::MissingMoodLog)?;

        info!("Calling primary chat service for session {}", request.session_id);

        let body = ApiRequest {
            session_id: request.session_id,
            message: request.message,
            mood_log_id,
        };
        let resp: ApiResponse = post_json(&self.client, "Main chat", &self.api_url, &body).await?;
        Ok(resp.response)
    }
}
