//! Chat gateway — stateless HTTP surface for the embedded widget
//!
//! ## Endpoint map
//!
//! | Route          | Method | Description                              |
//! |----------------|--------|------------------------------------------|
//! | `/health`      | GET    | Load balancer health probe               |
//! | `/widget/load` | GET    | Widget config snapshot, keyed by token   |
//! | `/widget/chat` | POST   | One chat turn through the safety gate    |
//!
//! CORS headers ride on every response from both widget routes (the widget
//! runs on arbitrary merchant origins); OPTIONS preflights are answered by
//! the CORS layer with no body.

pub mod chat;
pub mod load;
pub mod reply;

use crate::config::{AppConfig, GatewayConfig};
use crate::directory::{MemoryDirectory, PersonaDirectory};
use crate::guard::Classifier;
use axum::extract::Request;
use axum::http::{header, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use reply::{PreviewReplyEngine, ReplyEngine};

/// Shared state for the gateway handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Persona store + usage-limit flags (external collaborator)
    pub directory: Arc<dyn PersonaDirectory>,
    /// Injection gate
    pub classifier: Arc<Classifier>,
    /// Normal-path reply generation (external collaborator)
    pub replies: Arc<dyn ReplyEngine>,
    /// Fixed reply strings and preview bounds
    pub settings: Arc<GatewayConfig>,
}

impl GatewayState {
    /// Assemble state from explicit collaborators.
    pub fn new(
        directory: Arc<dyn PersonaDirectory>,
        classifier: Classifier,
        replies: Arc<dyn ReplyEngine>,
        settings: GatewayConfig,
    ) -> Self {
        Self {
            directory,
            classifier: Arc::new(classifier),
            replies,
            settings: Arc::new(settings),
        }
    }

    /// Assemble state from the app config: in-memory directory seeded with
    /// the static roster, classifier per the classifier section, stub reply
    /// engine.
    pub async fn from_config(config: &AppConfig) -> Self {
        let directory = MemoryDirectory::from_entries(&config.personas).await;

        let mut classifier = Classifier::new();
        if !config.classifier.detect_encoded {
            classifier = classifier.without_encoded_detection();
        }
        for pattern in &config.classifier.extra_patterns {
            classifier.add_custom_pattern(pattern);
        }

        let replies = PreviewReplyEngine::new(config.gateway.reply_preview_len);

        Self::new(
            Arc::new(directory),
            classifier,
            Arc::new(replies),
            config.gateway.clone(),
        )
    }
}

/// Build the complete gateway application.
pub fn build_app(state: GatewayState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/widget/load", get(load::widget_load))
        .route("/widget/chat", post(chat::widget_chat))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(cors_origins))
        .layer(middleware::from_fn(preflight_no_content))
        .with_state(state)
}

/// Preflights answer 204 with no body.
///
/// The CORS layer resolves OPTIONS itself but reports 200; this wrapper sits
/// outside it and rewrites successful OPTIONS responses to 204, which is the
/// status the embedded widget's routes document.
async fn preflight_no_content(request: Request, next: Next) -> Response {
    let is_options = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;
    if is_options && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let resp = health_check().await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn test_build_cors_empty_origins() {
        let _cors = build_cors(&[]);
    }

    #[test]
    fn test_build_cors_with_origins() {
        let _cors = build_cors(&[
            "https://shop.example.com".to_string(),
            "http://localhost:5173".to_string(),
        ]);
    }

    #[tokio::test]
    async fn test_state_from_config_seeds_directory() {
        let mut config = AppConfig::default();
        config.personas.push(crate::config::PersonaEntry {
            token: "tok-1".to_string(),
            name: "Luna".to_string(),
            ..Default::default()
        });

        let state = GatewayState::from_config(&config).await;
        assert_eq!(state.directory.widget_config("tok-1").await.name, "Luna");
    }
}
