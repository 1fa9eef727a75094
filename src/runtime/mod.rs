//! Embedded widget runtime
//!
//! Headless model of the widget that runs on a merchant's page: one runtime
//! instance per mount, owning the UI state (open/closed flag, transcript,
//! composer, in-flight send lock) and the conversation session with the
//! gateway. Rendering and styling live elsewhere; everything observable about
//! the conversation lifecycle is here.
//!
//! Failure policy: every failure a visitor could see becomes an in-transcript
//! message, never an error surfaced to the host page. A third-party embed
//! must degrade gracefully regardless of backend availability.

pub mod embed;
pub mod transport;

use crate::protocol::{ChatRequest, Message, PageContext, Trigger, WidgetConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

pub use embed::{EmbedOptions, API_BASE_ENV, DEFAULT_API_BASE};
pub use transport::{ChatTransport, HttpTransport};

/// Fixed apology appended when the chat network call fails.
pub const APOLOGY_MESSAGE: &str =
    "Sorry, I'm having trouble connecting right now. Please try again in a moment!";

/// Generic fallback when the gateway reply field is absent or empty.
pub const EMPTY_REPLY_FALLBACK: &str = "Thanks for your message!";

/// What happened to one `send` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// A reply came back and was appended
    Delivered,
    /// The network call failed; the apology was appended instead
    Failed,
    /// Guard rejected the call (empty text or a send already in flight);
    /// nothing was appended and no request was issued
    Ignored,
}

/// Releases the send lock when dropped, so the lock clears even when the
/// `send` future is abandoned mid-await instead of running to completion.
struct SendLockGuard<'a>(&'a AtomicBool);

impl Drop for SendLockGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// One visitor's conversation with one configured persona.
///
/// All mutation goes through interior mutability so a runtime can be shared
/// behind an `Arc` the way a browser event loop shares the widget singleton —
/// except here nothing is global, so multiple embeds coexist independently.
pub struct WidgetRuntime<T: ChatTransport> {
    transport: T,
    token: String,
    api_base: String,
    /// Generated once at construction, immutable for the page-load lifetime.
    /// Collision-tolerant, not a security boundary.
    session_id: String,
    page_context: PageContext,
    config: RwLock<WidgetConfig>,
    transcript: RwLock<Vec<Message>>,
    composer: RwLock<String>,
    open: AtomicBool,
    input_focused: AtomicBool,
    loaded: AtomicBool,
    in_flight: AtomicBool,
}

impl<T: ChatTransport> WidgetRuntime<T> {
    /// Mount a runtime from the embedding options.
    ///
    /// Returns `None` when no token is present: the widget renders nothing
    /// and performs no action. Silent by contract — not an error, not a
    /// console warning on the merchant's page.
    pub fn mount(options: EmbedOptions, transport: T) -> Option<Self> {
        let token = options.token.clone()?;
        let api_base = options.resolve_api_base();

        Some(Self {
            transport,
            token,
            api_base,
            session_id: uuid::Uuid::new_v4().to_string(),
            page_context: PageContext::default(),
            config: RwLock::new(WidgetConfig::default()),
            transcript: RwLock::new(Vec::new()),
            composer: RwLock::new(String::new()),
            open: AtomicBool::new(false),
            input_focused: AtomicBool::new(false),
            loaded: AtomicBool::new(false),
            in_flight: AtomicBool::new(false),
        })
    }

    /// Attach the host-page context sent along with every chat turn.
    pub fn with_page_context(mut self, context: PageContext) -> Self {
        self.page_context = context;
        self
    }

    /// Load the widget config and seed the greeting.
    ///
    /// On failure the runtime keeps operating with built-in defaults; the
    /// fallback is this explicit branch, not an implicit catch. Idempotent:
    /// only the first call fetches and seeds.
    pub async fn load(&self) {
        if self.loaded.swap(true, Ordering::SeqCst) {
            return;
        }

        let config = match self.transport.load_config(&self.token).await {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!(token = %self.token, "Config load failed, using defaults: {}", e);
                WidgetConfig::default()
            }
        };

        // The transcript always starts with exactly one assistant greeting.
        // A send that raced ahead of the load has already seeded the default
        // greeting, in which case the loaded one is not inserted over it.
        {
            let mut transcript = self.transcript.write().await;
            if transcript.is_empty() {
                transcript.push(Message::assistant(&config.greeting));
            }
        }
        *self.config.write().await = config;
    }

    /// Flip the panel open/closed. On transition to open, input focus moves
    /// into the text field. No network effect.
    pub fn toggle(&self) {
        let was_open = self.open.fetch_xor(true, Ordering::SeqCst);
        if !was_open {
            self.input_focused.store(true, Ordering::SeqCst);
        }
    }

    /// Send one chat turn.
    ///
    /// Guards: text non-empty after trim, and no send already in flight
    /// (token presence is structural — a runtime only exists with one).
    /// The user message is appended optimistically before the network call;
    /// the send lock is released on every completion path.
    pub async fn send(&self, text: &str) -> SendOutcome {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return SendOutcome::Ignored;
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return SendOutcome::Ignored;
        }
        let _lock = SendLockGuard(&self.in_flight);

        let greeting = self.config.read().await.greeting.clone();
        {
            let mut transcript = self.transcript.write().await;
            // A send before the config load still keeps the greeting first.
            if transcript.is_empty() {
                transcript.push(Message::assistant(greeting));
            }
            transcript.push(Message::user(trimmed));
        }
        self.composer.write().await.clear();

        let request = ChatRequest {
            token: self.token.clone(),
            message: trimmed.to_string(),
            session_id: Some(self.session_id.clone()),
            page_context: Some(self.page_context.clone()),
        };

        let (reply_text, outcome) = match self.transport.send_chat(&request).await {
            Ok(reply) if !reply.reply.trim().is_empty() => (reply.reply, SendOutcome::Delivered),
            Ok(_) => (EMPTY_REPLY_FALLBACK.to_string(), SendOutcome::Delivered),
            Err(e) => {
                tracing::debug!(session_id = %self.session_id, "Chat send failed: {}", e);
                (APOLOGY_MESSAGE.to_string(), SendOutcome::Failed)
            }
        };

        self.transcript.write().await.push(Message::assistant(reply_text));
        outcome
    }

    /// Whether the panel should open on its own after `elapsed` time on the
    /// page, per the config's trigger.
    pub async fn should_auto_open(&self, elapsed: Duration) -> bool {
        match self.config.read().await.trigger {
            Trigger::Immediate => true,
            Trigger::Delay(secs) => elapsed >= Duration::from_secs(u64::from(secs)),
            Trigger::OnClick => false,
        }
    }

    /// Replace the composer draft (the text field contents).
    pub async fn set_composer(&self, text: impl Into<String>) {
        *self.composer.write().await = text.into();
    }

    /// Current composer draft
    pub async fn composer(&self) -> String {
        self.composer.read().await.clone()
    }

    /// Snapshot of the transcript in chronological order
    pub async fn transcript(&self) -> Vec<Message> {
        self.transcript.read().await.clone()
    }

    /// Snapshot of the active config
    pub async fn config(&self) -> WidgetConfig {
        self.config.read().await.clone()
    }

    /// Session identifier for this page load
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Resolved API base this runtime talks to
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Whether the panel is open
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Whether input focus is in the text field
    pub fn is_input_focused(&self) -> bool {
        self.input_focused.load(Ordering::SeqCst)
    }

    /// Whether a chat request is currently in flight
    pub fn is_sending(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}
