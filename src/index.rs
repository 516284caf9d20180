//! Alphabetic index of programs.
//!
//! The index owns 27 bucket pages keyed `0`, `a`..`z` below one root page.
//! All 28 pages are created once; [`AlphaIndex::rebuild`] only swaps the
//! buckets' children, so handles held elsewhere keep working.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::error::Result;
use crate::page::{Page, PageId, PageNode, PageTree};

/// Bucket keys in display order.
pub const BUCKET_KEYS: [char; 27] = [
    '0', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Bucket key for a program title.
///
/// The first character is lower-cased, German umlauts fold to their base
/// letter, and anything outside `a-z` lands in `0`.
pub fn bucket_key(title: &str) -> char {
    let Some(first) = title.chars().next() else {
        return '0';
    };
    let lower = first.to_lowercase().next().unwrap_or(first);
    let folded = match lower {
        'ö' => 'o',
        'ü' => 'u',
        'ä' => 'a',
        c => c,
    };
    if folded.is_ascii_lowercase() {
        folded
    } else {
        '0'
    }
}

/// Root page plus its 27 letter buckets.
#[derive(Debug)]
pub struct AlphaIndex {
    root: PageId,
    buckets: BTreeMap<char, PageId>,
}

impl AlphaIndex {
    /// Create the root and bucket pages inside `tree`.
    ///
    /// `bucket_uri` maps an upper-case bucket label (`0`, `A`..`Z`) to its
    /// locator.
    pub fn create(
        tree: &mut PageTree,
        root: Page,
        parser_id: &str,
        bucket_uri: impl Fn(&str) -> String,
    ) -> Result<Self> {
        let root = tree.insert(root);
        let mut buckets = BTreeMap::new();
        for key in BUCKET_KEYS {
            let label = key.to_ascii_uppercase().to_string();
            let page = Page::overview(bucket_uri(&label), label).with_parser(parser_id);
            let id = tree.insert(page);
            tree.push_child(root, id)?;
            buckets.insert(key, id);
        }
        Ok(Self { root, buckets })
    }

    pub fn root(&self) -> PageId {
        self.root
    }

    pub fn bucket(&self, key: char) -> Option<PageId> {
        self.buckets.get(&key).copied()
    }

    /// Whether `id` is the root or one of the buckets.
    pub fn is_index_page(&self, id: PageId) -> bool {
        id == self.root || self.buckets.values().any(|b| *b == id)
    }

    /// Empty every bucket.
    pub fn clear(&self, tree: &mut PageTree) -> Result<()> {
        for bucket in self.buckets.values() {
            tree.clear_children(*bucket)?;
        }
        Ok(())
    }

    /// Clear all buckets, distribute `programs` by title and sort each
    /// bucket by title.
    pub fn rebuild(&self, tree: &mut PageTree, programs: Vec<PageNode>) -> Result<()> {
        self.clear(tree)?;

        let total = programs.len();
        let mut placed = 0usize;
        for program in programs {
            let key = bucket_key(&program.page.title);
            let Some(bucket) = self.bucket(key) else {
                warn!("No bucket {:?} for program {:?}, dropping it", key, program.page.title);
                continue;
            };
            let id = tree.insert_node(program);
            tree.push_child(bucket, id)?;
            placed += 1;
        }

        for bucket in self.buckets.values() {
            tree.sort_children_by_title(*bucket)?;
        }

        info!("Indexed {} of {} programs", placed, total);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(title: &str) -> PageNode {
        PageNode::leaf(Page::overview(format!("https://example.com/{title}"), title))
    }

    fn index() -> (PageTree, AlphaIndex) {
        let mut tree = PageTree::new();
        let index = AlphaIndex::create(
            &mut tree,
            Page::overview("vchpage://localhost/test", "Test"),
            "test",
            |label| format!("https://example.com/profiles/letter/{label}"),
        )
        .unwrap();
        (tree, index)
    }

    fn titles(tree: &PageTree, bucket: PageId) -> Vec<String> {
        tree.children(bucket)
            .unwrap()
            .iter()
            .map(|id| tree.get(*id).unwrap().title.clone())
            .collect()
    }

    #[test]
    fn keys_fold_umlauts_and_non_letters() {
        assert_eq!(bucket_key("Ökoland"), 'o');
        assert_eq!(bucket_key("Überblick"), 'u');
        assert_eq!(bucket_key("Ärztekammer"), 'a');
        assert_eq!(bucket_key("zeit im bild"), 'z');
        assert_eq!(bucket_key("Zeit im Bild"), 'z');
        assert_eq!(bucket_key("3sat"), '0');
        assert_eq!(bucket_key("#heimat"), '0');
        assert_eq!(bucket_key("Éclair"), '0');
        assert_eq!(bucket_key(""), '0');
    }

    #[test]
    fn create_builds_27_buckets_under_root() {
        let (tree, index) = index();
        let children = tree.children(index.root()).unwrap();
        assert_eq!(children.len(), 27);
        assert_eq!(tree.get(children[0]).unwrap().title, "0");
        assert_eq!(tree.get(children[26]).unwrap().title, "Z");
        assert_eq!(
            tree.get(index.bucket('m').unwrap()).unwrap().uri,
            "https://example.com/profiles/letter/M"
        );
    }

    #[test]
    fn rebuild_sorts_each_bucket() {
        let (mut tree, index) = index();
        index
            .rebuild(
                &mut tree,
                vec![program("Zeit im Bild"), program("Zoom"), program("ZIB 2"), program("Ö1")],
            )
            .unwrap();
        assert_eq!(
            titles(&tree, index.bucket('z').unwrap()),
            ["ZIB 2", "Zeit im Bild", "Zoom"]
        );
        assert_eq!(titles(&tree, index.bucket('o').unwrap()), ["Ö1"]);
    }

    #[test]
    fn rebuild_twice_keeps_identity_and_content() {
        let (mut tree, index) = index();
        let programs = vec![program("Alpha"), program("9 Uhr"), program("Beta")];
        let bucket_a = index.bucket('a').unwrap();

        index.rebuild(&mut tree, programs.clone()).unwrap();
        let once: Vec<_> = BUCKET_KEYS
            .iter()
            .map(|k| titles(&tree, index.bucket(*k).unwrap()))
            .collect();
        let live_after_once = tree.len();

        index.rebuild(&mut tree, programs).unwrap();
        let twice: Vec<_> = BUCKET_KEYS
            .iter()
            .map(|k| titles(&tree, index.bucket(*k).unwrap()))
            .collect();

        assert_eq!(once, twice);
        assert_eq!(index.bucket('a'), Some(bucket_a));
        assert_eq!(tree.len(), live_after_once, "old program nodes are reclaimed");
    }

    #[test]
    fn clear_empties_buckets_only() {
        let (mut tree, index) = index();
        index.rebuild(&mut tree, vec![program("Alpha")]).unwrap();
        index.clear(&mut tree).unwrap();
        assert!(tree.children(index.bucket('a').unwrap()).unwrap().is_empty());
        assert_eq!(tree.children(index.root()).unwrap().len(), 27);
    }

    #[test]
    fn index_pages_are_recognized() {
        let (tree, index) = index();
        assert!(index.is_index_page(index.root()));
        assert!(index.is_index_page(index.bucket('q').unwrap()));
        let other = tree.children(index.root()).unwrap()[0];
        assert!(index.is_index_page(other));
    }
}
