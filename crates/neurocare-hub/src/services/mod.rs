//! Remote chat service tiers.

pub mod chatbot;
pub mod primary;

pub use chatbot::ChatbotService;
pub use primary::PrimaryService;

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use neurocare_core::error::{NeuroCareError, Result};

/// Client-level timeout; the session applies its own tighter per-tier bound.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn http_client() -> Client {
    Client::builder()
        .timeout(CLIENT_TIMEOUT)
        .build()
        .unwrap_or_default()
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// POST a JSON body and decode a JSON reply. Any non-2xx status is an error.
pub(crate) async fn post_json<B, R>(client: &Client, service: &str, url: &str, body: &B) -> Result<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let resp = client
        .post(url)
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await?;

    let status = resp.status();
    let body_text = resp.text().await?;

    debug!("{} response status: {}, body length: {}", service, status, body_text.len());

    if !status.is_success() {
        return Err(NeuroCareError::Status {
            service: service.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(serde_json::from_str(&body_text)?)
}
