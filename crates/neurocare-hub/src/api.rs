//! Chatbot service — the HTTP backend the secondary tier talks to.
//!
//! Endpoints:
//! - POST /chatbot/message — Classify a message and reply
//! - GET  /chatbot/intents — Known intent names
//! - GET  /health — Health check

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::intents::IntentClassifier;

type SharedState = Arc<IntentClassifier>;

// ─── Request/Response types ────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatbotRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    pub message: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatbotResponse {
    pub user_id: Option<String>,
    pub message: String,
    pub intent: String,
    pub timestamp: String,
    pub bot_reply: String,
    pub confidence: f32,
}

#[derive(Serialize)]
pub struct IntentsResponse {
    pub intents: Vec<&'static str>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ─── Handlers ──────────────────────────────────────────────

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn intents(State(classifier): State<SharedState>) -> Json<IntentsResponse> {
    Json(IntentsResponse {
        intents: classifier.names(),
    })
}

async fn chatbot_message(
    State(classifier): State<SharedState>,
    Json(req): Json<ChatbotRequest>,
) -> Result<Json<ChatbotResponse>, (StatusCode, Json<ErrorResponse>)> {
    if req.message.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Message cannot be empty".to_string(),
            }),
        ));
    }

    let classification = classifier.classify(&req.message);
    let bot_reply = classifier.reply_for(classification.intent);

    debug!(
        "Chatbot intent {} ({:.1}) for user {:?}, metadata: {}",
        classification.intent,
        classification.confidence,
        req.user_id,
        req.metadata.is_some()
    );

    Ok(Json(ChatbotResponse {
        user_id: req.user_id,
        message: req.message,
        intent: classification.intent.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        bot_reply: bot_reply.to_string(),
        confidence: classification.confidence,
    }))
}

// ─── Server builder ────────────────────────────────────────

/// Build the chatbot router.
pub fn build_router(classifier: IntentClassifier) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chatbot/intents", get(intents))
        .route("/chatbot/message", post(chatbot_message))
        .with_state(Arc::new(classifier))
}

/// Start the chatbot server.
pub async fn start_server(host: &str, port: u16) -> anyhow::Result<()> {
    let app = build_router(IntentClassifier::new()?);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("🌐 Chatbot service listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
