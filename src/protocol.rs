//! Wire protocol types shared by the widget runtime and the chat gateway
//!
//! Every decode path in this module is lenient: a partial or malformed
//! document yields a fully-populated value with documented defaults instead
//! of an error. A third-party embed must never break because the backend
//! returned something unexpected, and the gateway must never 500 a visitor
//! because the widget sent something unexpected.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Default persona display name when the config omits one.
pub const DEFAULT_NAME: &str = "Character";

/// Default greeting shown as the first transcript message.
pub const DEFAULT_GREETING: &str = "Hi! I'm here to help you find what you're looking for.";

/// Default auto-open delay in seconds (wire form `"45-seconds"`).
pub const DEFAULT_TRIGGER_SECONDS: u32 = 45;

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry. Append-only; render order is chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message author
    pub role: Role,
    /// Message content
    pub text: String,
}

impl Message {
    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Widget panel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    SideBySide,
    CharacterTop,
    ChatFocus,
    Mirror,
    Immersive,
    Compact,
    Cinematic,
}

impl Layout {
    /// Parse a wire string; unknown values degrade to the default layout.
    pub fn from_wire(s: &str) -> Self {
        match s {
            "side-by-side" => Layout::SideBySide,
            "character-top" => Layout::CharacterTop,
            "chat-focus" => Layout::ChatFocus,
            "mirror" => Layout::Mirror,
            "immersive" => Layout::Immersive,
            "compact" => Layout::Compact,
            "cinematic" => Layout::Cinematic,
            _ => Layout::default(),
        }
    }

    /// Wire representation
    pub fn as_wire(&self) -> &'static str {
        match self {
            Layout::SideBySide => "side-by-side",
            Layout::CharacterTop => "character-top",
            Layout::ChatFocus => "chat-focus",
            Layout::Mirror => "mirror",
            Layout::Immersive => "immersive",
            Layout::Compact => "compact",
            Layout::Cinematic => "cinematic",
        }
    }
}

impl Serialize for Layout {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for Layout {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Layout::from_wire(&s))
    }
}

/// Horizontal screen anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizontal {
    Left,
    Right,
}

/// Vertical screen anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertical {
    Top,
    Bottom,
}

/// Page corner the widget anchors to.
///
/// The horizontal and vertical anchors are derived independently by substring
/// match on the wire value, so partial or unrecognized strings degrade to
/// bottom-right through the per-axis fallback rather than a decode error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
}

impl Position {
    /// Derive the corner from a wire string, one axis at a time.
    pub fn from_wire(s: &str) -> Self {
        let horizontal = if s.contains("left") {
            Horizontal::Left
        } else {
            Horizontal::Right
        };
        let vertical = if s.contains("top") {
            Vertical::Top
        } else {
            Vertical::Bottom
        };
        match (vertical, horizontal) {
            (Vertical::Bottom, Horizontal::Right) => Position::BottomRight,
            (Vertical::Bottom, Horizontal::Left) => Position::BottomLeft,
            (Vertical::Top, Horizontal::Right) => Position::TopRight,
            (Vertical::Top, Horizontal::Left) => Position::TopLeft,
        }
    }

    /// Wire representation
    pub fn as_wire(&self) -> &'static str {
        match self {
            Position::BottomRight => "bottom-right",
            Position::BottomLeft => "bottom-left",
            Position::TopRight => "top-right",
            Position::TopLeft => "top-left",
        }
    }

    /// Horizontal anchor for this corner
    pub fn horizontal(&self) -> Horizontal {
        match self {
            Position::BottomLeft | Position::TopLeft => Horizontal::Left,
            Position::BottomRight | Position::TopRight => Horizontal::Right,
        }
    }

    /// Vertical anchor for this corner
    pub fn vertical(&self) -> Vertical {
        match self {
            Position::TopLeft | Position::TopRight => Vertical::Top,
            Position::BottomLeft | Position::BottomRight => Vertical::Bottom,
        }
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Position::from_wire(&s))
    }
}

/// When the widget panel opens without a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Open as soon as the widget mounts
    Immediate,
    /// Open after the given number of seconds on the page
    Delay(u32),
    /// Open only when the visitor clicks the launcher
    OnClick,
}

impl Default for Trigger {
    fn default() -> Self {
        Trigger::Delay(DEFAULT_TRIGGER_SECONDS)
    }
}

impl Trigger {
    /// Parse a wire string (`"immediate"`, `"on-click"`, `"<n>-seconds"`);
    /// unknown values degrade to the default delay.
    pub fn from_wire(s: &str) -> Self {
        match s {
            "immediate" => Trigger::Immediate,
            "on-click" => Trigger::OnClick,
            _ => s
                .strip_suffix("-seconds")
                .and_then(|n| n.parse::<u32>().ok())
                .map(Trigger::Delay)
                .unwrap_or_default(),
        }
    }

    /// Wire representation
    pub fn as_wire(&self) -> String {
        match self {
            Trigger::Immediate => "immediate".to_string(),
            Trigger::OnClick => "on-click".to_string(),
            Trigger::Delay(secs) => format!("{}-seconds", secs),
        }
    }
}

impl Serialize for Trigger {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_wire())
    }
}

impl<'de> Deserialize<'de> for Trigger {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Trigger::from_wire(&s))
    }
}

/// Read-only persona snapshot fetched once per page load.
///
/// Every field is optional on the wire; a missing or malformed document
/// decodes to a fully-populated default config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Persona display name
    pub name: String,
    /// Avatar image URL
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Panel layout
    pub layout: Layout,
    /// Page corner the widget anchors to
    pub position: Position,
    /// Auto-open behavior
    pub trigger: Trigger,
    /// First transcript message
    pub greeting: String,
    /// Canned messages preloaded by the merchant
    pub messages: Vec<Message>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            image_url: None,
            layout: Layout::default(),
            position: Position::default(),
            trigger: Trigger::default(),
            greeting: DEFAULT_GREETING.to_string(),
            messages: Vec::new(),
        }
    }
}

impl WidgetConfig {
    /// Decode a config document, substituting the default config when the
    /// document does not parse at all.
    pub fn from_json(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }
}

/// Where on the merchant's site the conversation is happening.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageContext {
    /// Host page URL
    pub url: String,
    /// Merchant-defined page kind (product, cart, ...)
    pub page_type: String,
}

/// One chat turn from the widget to the gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    /// Persona token from the embedding script tag
    pub token: String,
    /// Visitor message text
    pub message: String,
    /// Per-page-load session identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Host page context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_context: Option<PageContext>,
}

impl ChatRequest {
    /// Decode a request body, substituting an empty request when the body is
    /// malformed. A visitor-facing chat endpoint never rejects a turn over a
    /// parse failure.
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }
}

/// Uniform reply envelope for every chat outcome.
///
/// Blocked input is a conversational outcome, not a protocol error, so all
/// three gateway paths produce this shape with HTTP 200 and the widget needs
/// no outcome-specific error handling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatReply {
    /// Assistant reply text
    pub reply: String,
    /// Set when the persona's usage limit blocked the turn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_reached: Option<bool>,
    /// Avatar animation hint for the widget
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation_state: Option<String>,
    /// Reply confidence reported to the widget
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl ChatReply {
    /// Envelope for the usage-limit outcome
    pub fn limit(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            limit_reached: Some(true),
            animation_state: None,
            confidence: None,
        }
    }

    /// Envelope for a spoken reply (injection redirect or normal turn)
    pub fn talking(reply: impl Into<String>, confidence: f64) -> Self {
        Self {
            reply: reply.into(),
            limit_reached: None,
            animation_state: Some("talking".to_string()),
            confidence: Some(confidence),
        }
    }
}
