//! Merging constituent outlines into one tree.

use crate::manifest::ManifestRecord;
use crate::model::{Destination, OutlineKind, OutlineNode};

use super::index::PageIndex;

/// What the merger needs to know about one constituent.
#[derive(Debug, Clone, Copy)]
pub struct OutlineSource<'a> {
    /// Manifest record of the constituent
    pub record: &'a ManifestRecord,
    /// The constituent's own outline; `None` when it has none
    pub outline: Option<&'a [OutlineNode]>,
    /// The constituent failed to open
    pub failed: bool,
}

/// Builds the merged outline of a composite document.
///
/// The result has one synthetic root and, beneath it, one grouping node per
/// constituent in manifest order. A constituent's own outline is copied
/// under its grouping node with page destinations moved into logical page
/// space.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineMerger;

impl OutlineMerger {
    /// Merge constituent outlines.
    ///
    /// `sources` must be in the same order as the constituents of `index`.
    pub fn merge(
        sources: &[OutlineSource<'_>],
        index: &PageIndex,
        root_title: Option<String>,
    ) -> OutlineNode {
        let mut root = OutlineNode::root(root_title);

        for (constituent, source) in sources.iter().enumerate() {
            let destination = index
                .range_of(constituent)
                .filter(|(_, count)| *count > 0)
                .map(|(start, _)| Destination::page(start));

            let mut group = OutlineNode {
                title: source.record.display_title(),
                destination,
                kind: OutlineKind::Group {
                    constituent,
                    failed: source.failed,
                },
                children: Vec::new(),
            };

            if let Some(native) = source.outline.filter(|_| !source.failed) {
                group.children = native
                    .iter()
                    .map(|node| translate(node, constituent, index))
                    .collect();
            }

            root.add_child(group);
        }

        log::debug!(
            "Merged outline: {} group(s), {} node(s)",
            root.children.len(),
            root.total_items()
        );
        root
    }
}

/// Deep-copy a native node, mapping local page destinations to logical ones.
fn translate(node: &OutlineNode, constituent: usize, index: &PageIndex) -> OutlineNode {
    let destination = match &node.destination {
        Some(Destination::Page { page, view }) => match index.to_logical(constituent, *page) {
            Some(logical) => Some(Destination::Page {
                page: logical,
                view: *view,
            }),
            None => {
                log::warn!(
                    "Dropping destination of {:?}: page {} is outside constituent {}",
                    node.title,
                    page,
                    constituent
                );
                None
            }
        },
        other => other.clone(),
    };

    OutlineNode {
        title: node.title.clone(),
        destination,
        kind: OutlineKind::Entry,
        children: node
            .children
            .iter()
            .map(|child| translate(child, constituent, index))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ViewPosition;

    fn source<'a>(record: &'a ManifestRecord, outline: Option<&'a [OutlineNode]>) -> OutlineSource<'a> {
        OutlineSource {
            record,
            outline,
            failed: false,
        }
    }

    #[test]
    fn test_destinations_are_translated() {
        let first = ManifestRecord::new("a.pdf");
        let second = ManifestRecord::new("b.pdf").with_title("Second");
        let native = vec![OutlineNode::to_page("Intro", 1)
            .with_child(OutlineNode::to_page("Detail", 2))];
        let index = PageIndex::build(&[9, 3]).unwrap();

        let root = OutlineMerger::merge(
            &[source(&first, None), source(&second, Some(native.as_slice()))],
            &index,
            None,
        );

        assert_eq!(root.kind, OutlineKind::Root);
        assert_eq!(root.children.len(), 2);
        let group = &root.children[1];
        assert_eq!(group.title, "Second");
        assert_eq!(group.destination, Some(Destination::page(10)));
        assert_eq!(group.children[0].destination, Some(Destination::page(10)));
        assert_eq!(
            group.children[0].children[0].destination,
            Some(Destination::page(11))
        );
    }

    #[test]
    fn test_view_and_named_destinations_survive() {
        let record = ManifestRecord::new("a.pdf");
        let view = ViewPosition {
            left: Some(0.0),
            top: Some(500.0),
            zoom: Some(1.5),
        };
        let native = vec![
            OutlineNode::new("Viewed", Some(Destination::Page { page: 2, view: Some(view) })),
            OutlineNode::new("Named", Some(Destination::named("appendix"))),
            OutlineNode::new("Heading", None),
        ];
        let index = PageIndex::build(&[0, 2]).unwrap();
        let other = ManifestRecord::new("empty.pdf");

        let root = OutlineMerger::merge(
            &[source(&other, None), source(&record, Some(native.as_slice()))],
            &index,
            Some("Binder".to_string()),
        );

        assert_eq!(root.title, "Binder");
        assert_eq!(root.children[0].destination, None);
        let children = &root.children[1].children;
        assert_eq!(
            children[0].destination,
            Some(Destination::Page {
                page: 2,
                view: Some(view)
            })
        );
        assert_eq!(children[1].destination, Some(Destination::named("appendix")));
        assert_eq!(children[2].destination, None);
    }

    #[test]
    fn test_out_of_range_destination_is_dropped() {
        let record = ManifestRecord::new("a.pdf");
        let native = vec![OutlineNode::to_page("Ghost", 40)];
        let index = PageIndex::build(&[3]).unwrap();

        let root = OutlineMerger::merge(&[source(&record, Some(native.as_slice()))], &index, None);
        let node = &root.children[0].children[0];
        assert_eq!(node.title, "Ghost");
        assert_eq!(node.destination, None);
    }

    #[test]
    fn test_failed_constituent_gets_empty_group() {
        let record = ManifestRecord::new("dir/missing.pdf");
        let index = PageIndex::build(&[0]).unwrap();
        let failed = OutlineSource {
            record: &record,
            outline: None,
            failed: true,
        };

        let root = OutlineMerger::merge(&[failed], &index, None);
        let group = &root.children[0];
        assert_eq!(group.title, "missing.pdf");
        assert_eq!(
            group.kind,
            OutlineKind::Group {
                constituent: 0,
                failed: true
            }
        );
        assert!(group.children.is_empty());
        assert_eq!(group.destination, None);
    }
}
