//! Host-facing parser and page dispatcher.
//!
//! The host hub knows every content source only through [`WebParser`]: a
//! stable id, a display title, a root page and a `parse` call that expands
//! whatever page the user navigated into. [`TvthekParser`] implements it on
//! top of one [`CatalogStrategy`].
//!
//! # Example
//!
//! ```rust,no_run
//! use tvthek::{ParserConfig, TvthekParser, WebParser};
//!
//! # async fn example() -> tvthek::Result<()> {
//! let parser = TvthekParser::from_config(&ParserConfig::default())?;
//! parser.protocols().add_protocol(["http", "rtmp"]);
//!
//! let root = parser.root().await?;
//! for bucket in parser.children(root).await.unwrap_or_default() {
//!     let page = parser.page(bucket).await.unwrap();
//!     let programs = parser.children(bucket).await.unwrap_or_default();
//!     println!("{}: {} programs", page.title, programs.len());
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::catalog::{CatalogStrategy, HtmlStrategy, Route, ServiceStrategy};
use crate::config::{ApiMode, ParserConfig};
use crate::error::{ParserError, Result};
use crate::http_client::{Fetcher, PortalClient};
use crate::index::AlphaIndex;
use crate::page::{Page, PageId, PageNode, PageTree};
use crate::protocols::ProtocolSet;

/// Adapter identity used by the host to route pages back here.
pub const PARSER_ID: &str = "at.orf.tvthek";
/// Display name.
pub const PARSER_TITLE: &str = "ORF TVthek";

/// Contract between a content source and the host hub.
#[async_trait]
pub trait WebParser: Send + Sync {
    fn id(&self) -> &'static str;

    fn title(&self) -> &'static str;

    /// Refresh the catalog index and return the root page.
    ///
    /// The returned handle is the same on every call; the content is not.
    async fn root(&self) -> Result<PageId>;

    /// Expand `page` in place and return its handle.
    ///
    /// On failure the page is left without children.
    async fn parse(&self, page: PageId) -> Result<PageId>;
}

/// TVthek content source.
pub struct TvthekParser {
    strategy: Box<dyn CatalogStrategy>,
    fetcher: Arc<dyn Fetcher>,
    protocols: ProtocolSet,
    tree: RwLock<PageTree>,
    index: AlphaIndex,
}

impl TvthekParser {
    /// Build a parser with the strategy selected by `config.mode` and a
    /// reqwest-backed fetcher.
    pub fn from_config(config: &ParserConfig) -> Result<Self> {
        let fetcher = Arc::new(PortalClient::from_config(config)?);
        Self::new(config, fetcher, ProtocolSet::new())
    }

    pub fn new(config: &ParserConfig, fetcher: Arc<dyn Fetcher>, protocols: ProtocolSet) -> Result<Self> {
        let strategy: Box<dyn CatalogStrategy> = match config.mode {
            ApiMode::Service => Box::new(ServiceStrategy::new(PARSER_ID, config)),
            ApiMode::Html => Box::new(HtmlStrategy::new(PARSER_ID)),
        };
        Self::with_strategy(strategy, &config.portal_base, fetcher, protocols)
    }

    pub fn with_strategy(
        strategy: Box<dyn CatalogStrategy>,
        portal_base: &str,
        fetcher: Arc<dyn Fetcher>,
        protocols: ProtocolSet,
    ) -> Result<Self> {
        let portal_base = portal_base.trim_end_matches('/');
        let mut tree = PageTree::new();
        let root = Page::overview(format!("vchpage://localhost/{PARSER_ID}"), PARSER_TITLE)
            .with_parser(PARSER_ID);
        let index = AlphaIndex::create(&mut tree, root, PARSER_ID, |label| {
            format!("{portal_base}/profiles/letter/{label}")
        })?;

        info!("Using {} strategy", strategy.name());
        Ok(Self {
            strategy,
            fetcher,
            protocols,
            tree: RwLock::new(tree),
            index,
        })
    }

    /// Supported playback schemes. Add/remove handlers through this handle.
    pub fn protocols(&self) -> &ProtocolSet {
        &self.protocols
    }

    /// Handle of the letter bucket for `key` (`'0'`, `'a'`..`'z'`).
    pub fn bucket(&self, key: char) -> Option<PageId> {
        self.index.bucket(key)
    }

    /// Store a page created by the host so it can be parsed.
    pub async fn open(&self, page: Page) -> PageId {
        let page = if page.parser.is_empty() {
            page.with_parser(PARSER_ID)
        } else {
            page
        };
        self.tree.write().await.insert(page)
    }

    /// Forget a page previously stored with [`open`](Self::open).
    ///
    /// The root and the letter buckets cannot be closed.
    pub async fn close(&self, id: PageId) -> Option<Page> {
        if self.index.is_index_page(id) {
            return None;
        }
        self.tree.write().await.remove(id)
    }

    pub async fn page(&self, id: PageId) -> Option<Page> {
        self.tree.read().await.get(id).cloned()
    }

    pub async fn children(&self, id: PageId) -> Option<Vec<PageId>> {
        self.tree.read().await.children(id).map(<[PageId]>::to_vec)
    }

    /// Copy of the subtree below `id`.
    pub async fn snapshot(&self, id: PageId) -> Option<PageNode> {
        self.tree.read().await.snapshot(id)
    }
}

#[async_trait]
impl WebParser for TvthekParser {
    fn id(&self) -> &'static str {
        PARSER_ID
    }

    fn title(&self) -> &'static str {
        PARSER_TITLE
    }

    async fn root(&self) -> Result<PageId> {
        self.index.clear(&mut *self.tree.write().await)?;

        if let Some(programs) = self.strategy.program_directory(self.fetcher.as_ref()).await? {
            self.index.rebuild(&mut *self.tree.write().await, programs)?;
        }

        Ok(self.index.root())
    }

    async fn parse(&self, id: PageId) -> Result<PageId> {
        let page = self
            .tree
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(ParserError::UnknownPage(id))?;
        info!("Parsing page {}", page.uri);

        if id == self.index.root() || !page.is_overview() {
            return Ok(id);
        }

        let route = self.strategy.classify(&page.uri);
        let fetcher = self.fetcher.as_ref();
        let expanded = match route {
            Route::Passthrough => return Ok(id),
            Route::Letter => self.strategy.letter_programs(fetcher, &page).await,
            Route::Listing => self.strategy.episodes(fetcher, &page).await,
            Route::Episode => self
                .strategy
                .videos(fetcher, &page, &self.protocols)
                .await
                .map(Some),
        };

        let mut tree = self.tree.write().await;
        // A failed expansion leaves the page empty, never with earlier results.
        let children = match expanded {
            Ok(Some(children)) => children,
            Ok(None) => return Ok(id),
            Err(e) => {
                warn!("Couldn't expand {}: {}", page.uri, e);
                if tree.contains(id) {
                    tree.clear_children(id)?;
                }
                return Err(e);
            }
        };
        tree.replace_children(id, children)?;
        if route == Route::Letter {
            tree.sort_children_by_title(id)?;
        }
        Ok(id)
    }
}
