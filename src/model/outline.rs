//! Outline (table of contents) types.

use serde::{Deserialize, Serialize};

/// Where an outline entry or link points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Destination {
    /// A page, optionally with a view position on it.
    Page {
        /// Target page number (1-indexed)
        page: u32,
        /// Scroll position and zoom, if the source specified one
        #[serde(default, skip_serializing_if = "Option::is_none")]
        view: Option<ViewPosition>,
    },
    /// A named target, resolved by the engine that owns it.
    Named {
        /// Destination name
        name: String,
    },
}

impl Destination {
    /// Destination to the top of a page.
    pub fn page(page: u32) -> Self {
        Destination::Page { page, view: None }
    }

    /// Named destination.
    pub fn named(name: impl Into<String>) -> Self {
        Destination::Named { name: name.into() }
    }

    /// Target page number, if this is a page destination.
    pub fn page_number(&self) -> Option<u32> {
        match self {
            Destination::Page { page, .. } => Some(*page),
            Destination::Named { .. } => None,
        }
    }
}

/// Position on a destination page. Missing fields keep the viewer's current value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewPosition {
    /// Left edge in page space
    pub left: Option<f64>,
    /// Top edge in page space
    pub top: Option<f64>,
    /// Zoom factor
    pub zoom: Option<f64>,
}

/// Role of a node in a merged outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutlineKind {
    /// Synthetic root of a merged tree.
    Root,
    /// One whole constituent document.
    Group {
        /// 0-based constituent index in manifest order
        constituent: usize,
        /// The constituent could not be opened
        failed: bool,
    },
    /// Bookmark taken from a document's own outline.
    #[default]
    Entry,
}

/// A node in an outline tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineNode {
    /// Display title
    pub title: String,

    /// Target of the node, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Destination>,

    /// Node role
    #[serde(flatten)]
    pub kind: OutlineKind,

    /// Child nodes in display order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// Create a bookmark entry.
    pub fn new(title: impl Into<String>, destination: Option<Destination>) -> Self {
        Self {
            title: title.into(),
            destination,
            kind: OutlineKind::Entry,
            children: Vec::new(),
        }
    }

    /// Create a bookmark entry pointing at the top of a page.
    pub fn to_page(title: impl Into<String>, page: u32) -> Self {
        Self::new(title, Some(Destination::page(page)))
    }

    /// Create the synthetic root of a merged tree.
    pub fn root(title: Option<String>) -> Self {
        Self {
            title: title.unwrap_or_default(),
            destination: None,
            kind: OutlineKind::Root,
            children: Vec::new(),
        }
    }

    /// Add a child node.
    pub fn add_child(&mut self, child: OutlineNode) {
        self.children.push(child);
    }

    /// Builder form of [`add_child`](Self::add_child).
    pub fn with_child(mut self, child: OutlineNode) -> Self {
        self.children.push(child);
        self
    }

    /// Check if this node is a grouping node.
    pub fn is_group(&self) -> bool {
        matches!(self.kind, OutlineKind::Group { .. })
    }

    /// Get the total number of descendants (not counting this node).
    pub fn total_items(&self) -> usize {
        fn count_items(items: &[OutlineNode]) -> usize {
            items
                .iter()
                .map(|item| 1 + count_items(&item.children))
                .sum()
        }
        count_items(&self.children)
    }

    /// Visit this node and all descendants depth-first, pre-order.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a OutlineNode, usize)) {
        fn go<'a>(node: &'a OutlineNode, depth: usize, f: &mut impl FnMut(&'a OutlineNode, usize)) {
            f(node, depth);
            for child in &node.children {
                go(child, depth + 1, f);
            }
        }
        go(self, 0, f);
    }
}
