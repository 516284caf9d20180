//! Adapter configuration loaded from `~/.config/tvthek/config.toml`.
//!
//! Every field has a default, so a missing file (or a file that sets only a
//! few keys) is fine.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ParserError, Result};

/// Which upstream API generation to scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiMode {
    /// Structured JSON service.
    #[default]
    Service,
    /// Legacy HTML pages with an embedded player playlist.
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub mode: ApiMode,
    /// Portal root, used for letter page locators.
    pub portal_base: String,
    /// JSON service root, without trailing slash.
    pub service_base: String,
    /// Page size for listing endpoints.
    pub entries_per_page: u32,
    /// Charset used to decode response bodies.
    pub charset: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Schemes registered at startup by the CLI.
    pub protocols: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            mode: ApiMode::Service,
            portal_base: "https://tvthek.orf.at".to_string(),
            service_base: "https://tvthek.orf.at/service_api/v1".to_string(),
            entries_per_page: 1000,
            charset: "utf-8".to_string(),
            user_agent: concat!("tvthek/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            protocols: vec!["http".to_string(), "https".to_string(), "rtmp".to_string()],
        }
    }
}

impl ParserConfig {
    /// Load from the default location, falling back to defaults if absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ParserError::Config(format!("failed to read {}: {e}", path.display())))?;

        Self::from_toml_str(&content)
            .map_err(|e| ParserError::Config(format!("invalid TOML in {}: {e}", path.display())))
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Return the path to the config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tvthek")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let config = ParserConfig::from_toml_str("").unwrap();
        assert_eq!(config, ParserConfig::default());
        assert_eq!(config.mode, ApiMode::Service);
    }

    #[test]
    fn parse_partial_config() {
        let toml_str = r#"
mode = "html"
entries_per_page = 50
protocols = ["http"]
"#;
        let config = ParserConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.mode, ApiMode::Html);
        assert_eq!(config.entries_per_page, 50);
        assert_eq!(config.protocols, vec!["http"]);
        assert_eq!(config.portal_base, "https://tvthek.orf.at");
    }

    #[test]
    fn reject_unknown_mode() {
        assert!(ParserConfig::from_toml_str("mode = \"flash\"").is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = ParserConfig::load_from(Path::new("/nonexistent/tvthek/config.toml")).unwrap();
        assert_eq!(config, ParserConfig::default());
    }
}
