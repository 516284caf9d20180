//! HTTP fetching for portal pages and service endpoints.
//!
//! Catalog code only sees the [`Fetcher`] trait so it can be driven by
//! canned responses in tests. [`PortalClient`] is the reqwest-backed
//! implementation used in production.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use tracing::{debug, info, instrument};

use crate::config::ParserConfig;
use crate::error::{ParserError, Result};

/// Text fetch collaborator.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` with optional extra headers and return the decoded body.
    async fn fetch_text_with_headers(&self, url: &str, headers: &[(&str, &str)]) -> Result<String>;

    /// GET `url` and return the decoded body.
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.fetch_text_with_headers(url, &[]).await
    }
}

/// reqwest-backed [`Fetcher`].
pub struct PortalClient {
    client: Client,
    charset: String,
}

impl PortalClient {
    pub fn new() -> Result<Self> {
        Self::from_config(&ParserConfig::default())
    }

    pub fn from_config(config: &ParserConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(10))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            charset: config.charset.clone(),
        })
    }
}

#[async_trait]
impl Fetcher for PortalClient {
    #[instrument(skip(self, headers), fields(url = %url))]
    async fn fetch_text_with_headers(&self, url: &str, headers: &[(&str, &str)]) -> Result<String> {
        debug!("Fetching");
        let response = self
            .client
            .get(url)
            .headers(to_header_map(headers))
            .send()
            .await?;

        let status = response.status();
        info!(
            status = %status,
            version = ?response.version(),
            content_encoding = ?response.headers().get("content-encoding"),
            "Response received"
        );

        if !status.is_success() {
            return Err(ParserError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text_with_charset(&self.charset).await?)
    }
}

fn to_header_map(headers: &[(&str, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => debug!("Skipping invalid header {}", name),
        }
    }
    map
}
