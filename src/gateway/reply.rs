//! Reply generation seam
//!
//! Real reply generation is an external model-inference service. The gateway
//! only depends on this trait; the default engine is a deterministic stub
//! that quotes a bounded preview of the visitor's message back.

use crate::error::Result;
use crate::protocol::PageContext;
use async_trait::async_trait;

/// External collaborator producing the normal-path reply text.
#[async_trait]
pub trait ReplyEngine: Send + Sync {
    /// Produce a reply for one chat turn.
    async fn reply(
        &self,
        token: &str,
        message: &str,
        context: Option<&PageContext>,
    ) -> Result<String>;
}

/// Stub engine: derives the reply from the message, truncated to a bounded
/// preview length.
pub struct PreviewReplyEngine {
    preview_len: usize,
}

impl PreviewReplyEngine {
    /// Create an engine with the given preview length.
    pub fn new(preview_len: usize) -> Self {
        Self { preview_len }
    }

    fn preview(&self, message: &str) -> String {
        let trimmed = message.trim();
        if trimmed.chars().count() <= self.preview_len {
            trimmed.to_string()
        } else {
            let cut: String = trimmed.chars().take(self.preview_len).collect();
            format!("{}...", cut)
        }
    }
}

#[async_trait]
impl ReplyEngine for PreviewReplyEngine {
    async fn reply(
        &self,
        _token: &str,
        message: &str,
        _context: Option<&PageContext>,
    ) -> Result<String> {
        if message.trim().is_empty() {
            return Ok("I'm all ears! What would you like to know?".to_string());
        }
        Ok(format!(
            "Great question about \"{}\" — let me help you with that!",
            self.preview(message)
        ))
    }
}
