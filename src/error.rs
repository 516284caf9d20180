//! Error taxonomy for catalog traversal and video resolution.
//!
//! Transport failures, missing required fields and unresolvable segments
//! abort the current operation. Optional fields never surface here: they
//! degrade to a default and are logged at `warn` level where they are read.

use thiserror::Error;

use crate::page::PageId;

/// Parser errors
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed {context}: {reason}")]
    Malformed { context: String, reason: String },

    /// No streaming URL with a supported scheme. Carries the last URL looked
    /// at and the schemes that were supported at the time.
    #[error("No supported video found (last url: {}, supported: {})", .url.as_deref().unwrap_or("none"), .supported.join(", "))]
    NoSupportedVideo {
        url: Option<String>,
        supported: Vec<String>,
    },

    #[error("No progressive HTTP source with a known quality for \"{title}\"")]
    NoAcceptableSource { title: String },

    #[error("Invalid CSS selector: {0}")]
    Selector(String),

    #[error("Unknown page: {0}")]
    UnknownPage(PageId),

    #[error("Config error: {0}")]
    Config(String),
}

impl ParserError {
    pub(crate) fn malformed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ParserError>;
