//! GET /widget/load — widget config snapshot

use super::GatewayState;
use crate::protocol::WidgetConfig;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

/// Query parameters for the load route.
#[derive(Debug, Deserialize)]
pub struct LoadQuery {
    /// Persona token from the embedding script tag
    #[serde(default)]
    pub token: String,
}

/// Return the persona's widget config, or the default config for an unknown
/// or missing token. Always 200: the widget falls back locally anyway, and a
/// broken embed on a merchant's storefront is worse than default styling.
pub async fn widget_load(
    State(state): State<GatewayState>,
    Query(query): Query<LoadQuery>,
) -> Json<WidgetConfig> {
    let config = state.directory.widget_config(&query.token).await;
    tracing::debug!(token = %query.token, persona = %config.name, "Widget config served");
    Json(config)
}
