//! JSON rendering for merged outlines.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::OutlineNode;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert an outline tree to JSON.
pub fn toc_to_json(root: &OutlineNode, format: JsonFormat) -> Result<String> {
    to_json(root, format)
}

/// Serialize any value in the requested format.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
