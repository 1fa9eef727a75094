//! POST /widget/chat — one chat turn
//!
//! Stateless per invocation. The three outcomes share one envelope and one
//! status code; a blocked turn is a conversational outcome, not a protocol
//! error.

use super::GatewayState;
use crate::protocol::{ChatReply, ChatRequest};
use axum::extract::State;
use axum::Json;

/// Confidence reported alongside the fixed injection redirect.
const REDIRECT_CONFIDENCE: f64 = 0.5;

/// Confidence reported alongside a normal reply.
const NORMAL_CONFIDENCE: f64 = 0.85;

/// Generic reply when the engine yields nothing usable. The envelope stays
/// uniform either way.
const FALLBACK_REPLY: &str = "I'm not sure what to say to that, but I'm happy to help!";

/// Handle one chat turn. First match wins:
/// usage limit, then injection gate, then normal reply.
pub async fn widget_chat(State(state): State<GatewayState>, body: String) -> Json<ChatReply> {
    // Malformed bodies become an empty request; processing continues with
    // default field values instead of a 4xx.
    let request = ChatRequest::from_body(&body);
    let session_id = request.session_id.as_deref().unwrap_or("-");

    if state.directory.limit_reached(&request.token).await {
        tracing::info!(token = %request.token, session_id, "Turn blocked: usage limit");
        return Json(ChatReply::limit(&state.settings.limit_message));
    }

    let classification = state.classifier.classify(&request.message);
    if classification.is_injection {
        tracing::info!(
            token = %request.token,
            session_id,
            rule = classification.matched_rule.unwrap_or("unknown"),
            "Turn redirected: injection pattern"
        );
        return Json(ChatReply::talking(
            &state.settings.redirect_message,
            REDIRECT_CONFIDENCE,
        ));
    }

    let reply = match state
        .replies
        .reply(&request.token, &request.message, request.page_context.as_ref())
        .await
    {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => FALLBACK_REPLY.to_string(),
        Err(e) => {
            tracing::warn!(token = %request.token, session_id, "Reply engine failed: {}", e);
            FALLBACK_REPLY.to_string()
        }
    };

    Json(ChatReply::talking(reply, NORMAL_CONFIDENCE))
}
