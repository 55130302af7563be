//! Secondary chat service — the intent chatbot, addressed by username.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use neurocare_core::error::Result;
use neurocare_core::tier::{ChatTier, TierRequest};

use super::{endpoint, http_client, post_json};

/// Client for `POST /chatbot/message`.
pub struct ChatbotService {
    client: Client,
    api_url: String,
}

impl ChatbotService {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: http_client(),
            api_url: endpoint(base_url, "chatbot/message"),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    user_id: &'a str,
    message: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    bot_reply: String,
}

#[async_trait]
impl ChatTier for ChatbotService {
    fn name(&self) -> &str {
        "chatbot"
    }

    async fn reply(&self, request: TierRequest<'_>) -> Result<String> {
        info!("Calling chatbot service for user {}", request.username);

        let body = ApiRequest {
            user_id: request.username,
            message: request.message,
        };
        let resp: ApiResponse = post_json(&self.client, "Chatbot", &self.api_url, &body).await?;
        Ok(resp.bot_reply)
    }
}
