//! Plain text rendering for merged outlines.

use std::fmt::Write;

use crate::model::{Destination, OutlineKind, OutlineNode};

/// Render an outline as an indented list, one node per line.
///
/// The root itself is printed only when it has a title. Page targets are
/// appended as `p. N`, named targets as `#name`, and groups whose
/// constituent failed to open are marked `(unavailable)`.
pub fn toc_to_text(root: &OutlineNode, indent: usize) -> String {
    let mut output = String::new();
    let skip_root = root.title.is_empty() && root.kind == OutlineKind::Root;

    root.walk(&mut |node, depth| {
        if skip_root && depth == 0 {
            return;
        }
        let level = if skip_root { depth - 1 } else { depth };
        let _ = write!(output, "{:width$}{}", "", node.title, width = level * indent);

        match &node.destination {
            Some(Destination::Page { page, .. }) => {
                let _ = write!(output, "  p. {}", page);
            }
            Some(Destination::Named { name }) => {
                let _ = write!(output, "  #{}", name);
            }
            None => {}
        }
        if let OutlineKind::Group { failed: true, .. } = node.kind {
            output.push_str("  (unavailable)");
        }
        output.push('\n');
    });

    output
}
