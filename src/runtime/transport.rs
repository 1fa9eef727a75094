//! Network seam between the widget runtime and the gateway
//!
//! The runtime never talks HTTP directly; it drives this trait, and its
//! state-update layer treats every `Err` as "substitute the fallback value".
//! That makes the swallow-on-failure policy an explicit, testable branch.

use crate::error::Result;
use crate::protocol::{ChatReply, ChatRequest, WidgetConfig};
use async_trait::async_trait;

/// Transport for the two runtime network calls.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Fetch the widget config for a token.
    async fn load_config(&self, token: &str) -> Result<WidgetConfig>;

    /// Deliver one chat turn and return the reply envelope.
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply>;
}

/// HTTP transport against a gateway API base.
pub struct HttpTransport {
    client: reqwest::Client,
    api_base: String,
}

impl HttpTransport {
    /// Create a transport for the given API base URL.
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn load_config(&self, token: &str) -> Result<WidgetConfig> {
        let response = self
            .client
            .get(self.url("/widget/load"))
            .query(&[("token", token)])
            .send()
            .await?
            .error_for_status()?;

        // Lenient decode: a partial document still yields a usable config.
        let body = response.text().await?;
        Ok(WidgetConfig::from_json(&body))
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        let reply = self
            .client
            .post(self.url("/widget/chat"))
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatReply>()
            .await?;
        Ok(reply)
    }
}
