//! Manifest parsing.
//!
//! A manifest lists constituent files, one `file:` line each, optionally
//! followed by `key: value` metadata lines for that file:
//!
//! ```text
//! file: part1.pdf
//! title: Part One
//! file: appendix.pdf
//! ```

mod parser;
mod record;

pub use parser::{normalize_newlines, ManifestParser, RECORD_PREFIX};
pub use record::{ManifestRecord, ParsedManifest};
