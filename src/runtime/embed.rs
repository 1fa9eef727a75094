//! Script-tag embedding contract
//!
//! A merchant embeds the widget with a single script tag carrying
//! `data-persona` (or the legacy `data-token`) and an optional `data-api`
//! override. No further host-page JavaScript is required.

/// Hardcoded API base, the last resort of the resolution chain.
pub const DEFAULT_API_BASE: &str = "https://api.charsona.app";

/// Process-wide API base override.
pub const API_BASE_ENV: &str = "CHARSONA_API";

/// Options read from the embedding script tag's attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbedOptions {
    /// Persona token; without one the runtime mounts as a silent no-op
    pub token: Option<String>,
    /// API base override from `data-api`
    pub api_base: Option<String>,
}

impl EmbedOptions {
    /// Read the embedding contract from attribute name/value pairs.
    /// `data-persona` wins over the legacy `data-token`; empty values count
    /// as absent.
    pub fn from_attributes<'a>(attrs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut persona = None;
        let mut legacy = None;
        let mut api_base = None;

        for (name, value) in attrs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match name {
                "data-persona" => persona = Some(value.to_string()),
                "data-token" => legacy = Some(value.to_string()),
                "data-api" => api_base = Some(value.to_string()),
                _ => {}
            }
        }

        Self {
            token: persona.or(legacy),
            api_base,
        }
    }

    /// Resolve the API base: attribute override, then the process-wide env
    /// default, then the hardcoded default.
    pub fn resolve_api_base(&self) -> String {
        if let Some(base) = self.api_base.as_deref().filter(|b| !b.is_empty()) {
            return base.to_string();
        }
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.trim().is_empty() {
                return base;
            }
        }
        DEFAULT_API_BASE.to_string()
    }
}
