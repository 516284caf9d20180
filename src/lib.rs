//! `tvthek` - ORF TVthek catalog adapter
//!
//! Scrapes the ORF TVthek video portal into a navigable page tree for a
//! video hub: an alphabetic index of programs, their episodes, and the
//! playable segments of each episode resolved to direct video URLs.
//!
//! # Features
//!
//! - **JSON service mode**: program directory, episode listings and
//!   per-segment streaming URLs from the structured service API
//! - **Legacy HTML mode**: letter pages and the player playlist embedded in
//!   episode pages
//! - **Quality selection**: best progressive tier, or last supported
//!   streaming URL
//! - **Stable handles**: root and letter buckets keep their identity across
//!   refreshes
//!
//! # Example
//!
//! ```rust,no_run
//! use tvthek::{ParserConfig, TvthekParser, WebParser};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let parser = TvthekParser::from_config(&ParserConfig::load()?)?;
//!     parser.protocols().add_protocol(["http", "https", "rtmp"]);
//!
//!     let root = parser.root().await?;
//!     println!("{} letters", parser.children(root).await.unwrap_or_default().len());
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod html;
pub mod http_client;
pub mod index;
pub mod page;
pub mod parser;
pub mod protocols;
pub mod quality;

pub use catalog::{CatalogStrategy, HtmlStrategy, Route, ServiceStrategy};
pub use config::{ApiMode, ParserConfig};
pub use error::{ParserError, Result};
pub use http_client::{Fetcher, PortalClient};
pub use index::{bucket_key, AlphaIndex, BUCKET_KEYS};
pub use page::{Page, PageId, PageKind, PageNode, PageTree, UserData, VideoDetails};
pub use parser::{TvthekParser, WebParser, PARSER_ID, PARSER_TITLE};
pub use protocols::ProtocolSet;
pub use quality::{select_progressive, select_streaming, StreamSelection, VideoSource};

/// Version of tvthek
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
