//! Engine configuration.

use serde::Deserialize;

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8080";

/// Settings shared by every request the engine serves.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Root of every collection URL (`<service_url>/<wire-type>`).
    pub service_url: String,
    /// Emit `links.self`/`links.related` next to relationship linkage.
    pub relationship_links: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            relationship_links: true,
        }
    }
}

impl EngineConfig {
    /// Reads `DOCUMENT_SERVICE_URL` and `DOCUMENT_RELATIONSHIP_LINKS`.
    /// Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            service_url: lookup("DOCUMENT_SERVICE_URL")
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(defaults.service_url),
            relationship_links: lookup("DOCUMENT_RELATIONSHIP_LINKS")
                .and_then(|s| parse_flag(&s))
                .unwrap_or(defaults.relationship_links),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
