//! Charsona configuration management

use crate::protocol::{Layout, Message, Position, Trigger, WidgetConfig, DEFAULT_GREETING, DEFAULT_NAME};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main Charsona configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// CORS configuration
    pub cors: CorsConfig,

    /// Gateway reply configuration
    pub gateway: GatewayConfig,

    /// Classifier configuration
    pub classifier: ClassifierConfig,

    /// Static persona roster for the in-memory directory
    pub personas: Vec<PersonaEntry>,
}

impl AppConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))
    }

    /// Load configuration from a file, or the built-in default when no path
    /// is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    anyhow::anyhow!("Failed to read config {}: {}", path.display(), e)
                })?;
                Self::from_yaml(&content)
            }
            None => Ok(Self::default()),
        }
    }

    /// Serialize the config to YAML (used by `charsona config --default`).
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        serde_yaml::to_string(self).map_err(|e| anyhow::anyhow!("Failed to render config: {}", e))
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8970,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins; empty means any origin (the widget is embedded on
    /// arbitrary merchant domains).
    pub allowed_origins: Vec<String>,
}

/// Gateway reply configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Fixed message returned when a persona's usage limit is reached
    pub limit_message: String,
    /// Fixed redirect returned when the classifier flags a turn
    pub redirect_message: String,
    /// Bounded preview length the stub reply engine quotes back
    pub reply_preview_len: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            limit_message: "I've loved chatting with you, but I've reached my conversation \
                            limit for now. Please check back soon!"
                .to_string(),
            redirect_message: "Let's keep chatting about our products! What can I help you \
                               find today?"
                .to_string(),
            reply_preview_len: 120,
        }
    }
}

/// Classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Probe base64 runs for encoded rule matches
    pub detect_encoded: bool,
    /// Extra case-insensitive patterns appended to the built-in rule table
    pub extra_patterns: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            detect_encoded: true,
            extra_patterns: Vec::new(),
        }
    }
}

/// One persona in the static roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaEntry {
    /// Token the embedding script tag carries
    pub token: String,
    /// Persona display name
    pub name: String,
    /// Avatar image URL
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
    /// Precomputed usage-limit flag (owned by an external collaborator in
    /// production; static here)
    pub limit_reached: bool,
}

impl Default for PersonaEntry {
    fn default() -> Self {
        Self {
            token: String::new(),
            name: DEFAULT_NAME.to_string(),
            image_url: None,
            layout: Layout::default(),
            position: Position::default(),
            trigger: Trigger::default(),
            greeting: DEFAULT_GREETING.to_string(),
            messages: Vec::new(),
            limit_reached: false,
        }
    }
}

impl PersonaEntry {
    /// The widget-facing view of this persona.
    pub fn widget_config(&self) -> WidgetConfig {
        WidgetConfig {
            name: self.name.clone(),
            image_url: self.image_url.clone(),
            layout: self.layout,
            position: self.position,
            trigger: self.trigger,
            greeting: self.greeting.clone(),
            messages: self.messages.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8970);
        assert!(config.cors.allowed_origins.is_empty());
        assert!(config.classifier.detect_encoded);
        assert!(config.personas.is_empty());
        assert!(!config.gateway.limit_message.is_empty());
        assert!(!config.gateway.redirect_message.is_empty());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = AppConfig::from_yaml(
            r#"
server:
  port: 9000
personas:
  - token: tok-1
    name: Luna
    greeting: "Hey!"
    position: bottom-left
"#,
        )
        .expect("parse");

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.personas.len(), 1);

        let persona = &config.personas[0];
        assert_eq!(persona.name, "Luna");
        assert_eq!(persona.position, Position::BottomLeft);
        assert_eq!(persona.layout, Layout::SideBySide);
        assert_eq!(persona.trigger, Trigger::Delay(45));
        assert!(!persona.limit_reached);
    }

    #[test]
    fn test_config_round_trip() {
        let config = AppConfig::default();
        let yaml = config.to_yaml().expect("render");
        let parsed = AppConfig::from_yaml(&yaml).expect("parse");
        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(parsed.gateway.limit_message, config.gateway.limit_message);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("charsona.yaml");
        std::fs::write(&path, "server:\n  port: 9100\n").expect("write");

        let config = AppConfig::load(Some(&path)).expect("load");
        assert_eq!(config.server.port, 9100);
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/charsona.yaml")));
        assert!(result.is_err());
    }
}
