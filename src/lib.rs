//! Charsona - embeddable character chat widget runtime and gateway
//!
//! Charsona is the conversational core of a "character widget" product for
//! e-commerce merchants: a merchant configures a persona, drops one script
//! tag on their storefront, and visitors chat with the persona through a
//! style-isolated widget. This crate implements the two components with a
//! real contract between them, plus the wire protocol they share:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 Merchant storefront (any origin)          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │              Widget Runtime (per embed)             │  │
//! │  │  - open/closed state, transcript, composer          │  │
//! │  │  - one-in-flight send lock                          │  │
//! │  │  - optimistic append, apology on failure            │  │
//! │  └───────────────────────┬────────────────────────────┘  │
//! └──────────────────────────┼───────────────────────────────┘
//!                            │ GET /widget/load, POST /widget/chat
//! ┌──────────────────────────▼───────────────────────────────┐
//! │                     Chat Gateway (stateless)              │
//! │   usage-limit flag  →  injection gate  →  reply engine    │
//! │   (uniform 200 reply envelope for every outcome)          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Persona storage, usage accounting, and reply generation are external
//! collaborators behind traits ([`directory::PersonaDirectory`],
//! [`gateway::ReplyEngine`]); the crate ships in-process defaults.
//!
//! ## Modules
//!
//! - [`protocol`]: wire types with lenient parse-with-defaults decoding
//! - [`guard`]: ordered-rule prompt-injection classifier
//! - [`gateway`]: axum HTTP surface (`/widget/load`, `/widget/chat`)
//! - [`runtime`]: widget conversation state machine and embedding contract
//! - [`directory`]: persona directory collaborator seam
//! - [`config`]: configuration management
//! - [`error`]: crate error types

pub mod config;
pub mod directory;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod protocol;
pub mod runtime;

pub use config::AppConfig;
pub use directory::{MemoryDirectory, PersonaDirectory};
pub use error::{Error, Result};
pub use gateway::{build_app, GatewayState, PreviewReplyEngine, ReplyEngine};
pub use guard::{Classification, Classifier};
pub use protocol::{ChatReply, ChatRequest, Message, PageContext, Role, WidgetConfig};
pub use runtime::{ChatTransport, EmbedOptions, HttpTransport, SendOutcome, WidgetRuntime};
