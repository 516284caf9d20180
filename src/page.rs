//! Page model shared with the host application.
//!
//! Pages live in a [`PageTree`], a generational arena addressed by
//! [`PageId`] handles. Nodes that must stay identity-stable (the root and the
//! letter buckets) are simply never removed: rebuilding a bucket swaps its
//! child list in place, so anyone holding the bucket's `PageId` sees the new
//! children. Removed nodes bump their slot generation, which turns every
//! outstanding handle to them into a stale one instead of an alias.
//!
//! # Example
//!
//! ```rust
//! use tvthek::page::{Page, PageNode, PageTree};
//!
//! let mut tree = PageTree::new();
//! let root = tree.insert(Page::overview("vchpage://localhost/demo", "Demo"));
//! let child = PageNode::leaf(Page::overview("https://example.com/a", "A"));
//! tree.replace_children(root, vec![child]).unwrap();
//!
//! assert_eq!(tree.children(root).unwrap().len(), 1);
//! ```

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::{ParserError, Result};

/// Stable handle to a page stored in a [`PageTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId {
    index: usize,
    generation: u32,
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Adapter-private scratch data attached to a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserData {
    /// Broadcast time of the episode a page belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<NaiveDateTime>,
    /// Upstream segment id of a video page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_id: Option<i64>,
    /// RTMP substream path (`mp4:...`) for players that need it separately.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtmp_stream_name: Option<String>,
}

/// Leaf attributes of a playable page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoDetails {
    /// Duration in seconds.
    pub duration: u64,
    pub publish_date: Option<NaiveDateTime>,
    pub description: String,
    pub thumbnail: Option<String>,
    /// Resolved direct/streaming URL. Never empty on a returned page.
    pub video_uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PageKind {
    Overview,
    Video(VideoDetails),
}

/// A single navigation node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub uri: String,
    pub title: String,
    /// Identity of the adapter that owns this page.
    pub parser: String,
    pub user_data: UserData,
    #[serde(flatten)]
    pub kind: PageKind,
}

impl Page {
    /// Create an overview page with no owner set.
    pub fn overview(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            title: title.into(),
            parser: String::new(),
            user_data: UserData::default(),
            kind: PageKind::Overview,
        }
    }

    pub fn video(uri: impl Into<String>, title: impl Into<String>, details: VideoDetails) -> Self {
        Self {
            uri: uri.into(),
            title: title.into(),
            parser: String::new(),
            user_data: UserData::default(),
            kind: PageKind::Video(details),
        }
    }

    #[must_use]
    pub fn with_parser(mut self, parser: &str) -> Self {
        self.parser = parser.to_string();
        self
    }

    pub fn is_overview(&self) -> bool {
        matches!(self.kind, PageKind::Overview)
    }

    pub fn video_details(&self) -> Option<&VideoDetails> {
        match &self.kind {
            PageKind::Video(details) => Some(details),
            PageKind::Overview => None,
        }
    }
}

/// A detached subtree produced by parsing, not yet stored in a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNode {
    pub page: Page,
    pub children: Vec<PageNode>,
}

impl PageNode {
    pub fn leaf(page: Page) -> Self {
        Self {
            page,
            children: Vec::new(),
        }
    }

    pub fn with_children(page: Page, children: Vec<PageNode>) -> Self {
        Self { page, children }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

#[derive(Debug)]
struct Entry {
    page: Page,
    children: Vec<PageId>,
}

/// Generational arena of pages.
#[derive(Debug, Default)]
pub struct PageTree {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl PageTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a page without children and return its handle.
    pub fn insert(&mut self, page: Page) -> PageId {
        let entry = Entry {
            page,
            children: Vec::new(),
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.entry = Some(entry);
            PageId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len();
            self.slots.push(Slot {
                generation: 0,
                entry: Some(entry),
            });
            PageId {
                index,
                generation: 0,
            }
        }
    }

    /// Store a detached subtree and return the handle of its top node.
    pub fn insert_node(&mut self, node: PageNode) -> PageId {
        let id = self.insert(node.page);
        let children: Vec<PageId> = node
            .children
            .into_iter()
            .map(|child| self.insert_node(child))
            .collect();
        if let Some(entry) = self.entry_mut(id) {
            entry.children = children;
        }
        id
    }

    pub fn contains(&self, id: PageId) -> bool {
        self.entry(id).is_some()
    }

    pub fn get(&self, id: PageId) -> Option<&Page> {
        self.entry(id).map(|e| &e.page)
    }

    pub fn children(&self, id: PageId) -> Option<&[PageId]> {
        self.entry(id).map(|e| e.children.as_slice())
    }

    /// Append an existing page to the end of `parent`'s children.
    pub fn push_child(&mut self, parent: PageId, child: PageId) -> Result<()> {
        if !self.contains(child) {
            return Err(ParserError::UnknownPage(child));
        }
        let entry = self
            .entry_mut(parent)
            .ok_or(ParserError::UnknownPage(parent))?;
        entry.children.push(child);
        Ok(())
    }

    /// Drop every child subtree of `parent`, keeping `parent` itself.
    pub fn clear_children(&mut self, parent: PageId) -> Result<()> {
        let entry = self
            .entry_mut(parent)
            .ok_or(ParserError::UnknownPage(parent))?;
        let old = std::mem::take(&mut entry.children);
        for child in old {
            self.remove(child);
        }
        Ok(())
    }

    /// Replace `parent`'s children with freshly inserted subtrees.
    pub fn replace_children(&mut self, parent: PageId, nodes: Vec<PageNode>) -> Result<Vec<PageId>> {
        self.clear_children(parent)?;
        let ids: Vec<PageId> = nodes.into_iter().map(|n| self.insert_node(n)).collect();
        if let Some(entry) = self.entry_mut(parent) {
            entry.children.clone_from(&ids);
        }
        Ok(ids)
    }

    /// Stable-sort `parent`'s children by title.
    pub fn sort_children_by_title(&mut self, parent: PageId) -> Result<()> {
        let mut children = self
            .children(parent)
            .ok_or(ParserError::UnknownPage(parent))?
            .to_vec();
        children.sort_by(|a, b| {
            let ta = self.get(*a).map_or("", |p| p.title.as_str());
            let tb = self.get(*b).map_or("", |p| p.title.as_str());
            ta.cmp(tb)
        });
        if let Some(entry) = self.entry_mut(parent) {
            entry.children = children;
        }
        Ok(())
    }

    /// Remove a page and its whole subtree. Outstanding handles become stale.
    pub fn remove(&mut self, id: PageId) -> Option<Page> {
        let slot = self.slots.get_mut(id.index)?;
        if slot.generation != id.generation {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        for child in entry.children {
            self.remove(child);
        }
        Some(entry.page)
    }

    /// Number of live pages.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone a subtree back out of the arena.
    pub fn snapshot(&self, id: PageId) -> Option<PageNode> {
        let entry = self.entry(id)?;
        Some(PageNode {
            page: entry.page.clone(),
            children: entry
                .children
                .iter()
                .filter_map(|c| self.snapshot(*c))
                .collect(),
        })
    }

    fn entry(&self, id: PageId) -> Option<&Entry> {
        let slot = self.slots.get(id.index)?;
        if slot.generation == id.generation {
            slot.entry.as_ref()
        } else {
            None
        }
    }

    fn entry_mut(&mut self, id: PageId) -> Option<&mut Entry> {
        let slot = self.slots.get_mut(id.index)?;
        if slot.generation == id.generation {
            slot.entry.as_mut()
        } else {
            None
        }
    }
}
