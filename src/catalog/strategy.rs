//! Strategy trait and locator routing.
//!
//! A [`CatalogStrategy`] knows one upstream API generation: how its locators
//! look, where the program directory lives and how episode pages turn into
//! playable videos. It returns detached [`PageNode`] trees; storing them is
//! the parser's job.

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::http_client::Fetcher;
use crate::page::{Page, PageNode};
use crate::protocols::ProtocolSet;

/// What to do with a page, decided from its locator alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Already complete, return unchanged.
    Passthrough,
    /// A letter page that lists programs.
    Letter,
    /// A program whose episodes must be listed.
    Listing,
    /// An episode whose segments must be resolved to videos.
    Episode,
}

#[async_trait]
pub trait CatalogStrategy: Send + Sync {
    /// Short lowercase strategy name (`"service"`, `"html"`).
    fn name(&self) -> &'static str;

    /// Route a page by its locator.
    fn classify(&self, uri: &str) -> Route;

    /// Fetch every program for a root refresh.
    ///
    /// `None` means this strategy fills letter buckets lazily through
    /// [`Route::Letter`] instead.
    async fn program_directory(&self, fetcher: &dyn Fetcher) -> Result<Option<Vec<PageNode>>>;

    /// Programs listed on a letter page.
    ///
    /// `None` leaves the page and its children untouched.
    async fn letter_programs(&self, fetcher: &dyn Fetcher, letter: &Page) -> Result<Option<Vec<PageNode>>> {
        let _ = fetcher;
        debug!("{} strategy has no letter pages, {} stays as is", self.name(), letter.uri);
        Ok(None)
    }

    /// Episodes of a program. `None` as for [`letter_programs`](Self::letter_programs).
    async fn episodes(&self, fetcher: &dyn Fetcher, program: &Page) -> Result<Option<Vec<PageNode>>> {
        let _ = fetcher;
        debug!("{} strategy has no episode listings, {} stays as is", self.name(), program.uri);
        Ok(None)
    }

    /// Playable videos of an episode. Fails as a whole if any video cannot
    /// be resolved.
    async fn videos(
        &self,
        fetcher: &dyn Fetcher,
        episode: &Page,
        protocols: &ProtocolSet,
    ) -> Result<Vec<PageNode>>;
}
