//! Manifest record types.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// One constituent file entry of a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRecord {
    /// File reference exactly as declared (trimmed, never empty)
    pub path: String,

    /// Title of the grouping node, from a `title:` metadata line
    pub outline_title: Option<String>,

    /// Metadata lines in declaration order, as `(key, value)` pairs
    pub metadata: Vec<(String, String)>,

    /// Normalized source text of the record, boundary line included
    #[serde(skip)]
    pub raw: String,
}

impl ManifestRecord {
    /// Create a record for a file reference.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            outline_title: None,
            metadata: Vec::new(),
            raw: String::new(),
        }
    }

    /// Set the grouping node title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.outline_title = Some(title.into());
        self
    }

    /// Look up the first metadata value for a key (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Title shown for this file in a merged outline.
    ///
    /// The declared title when present, otherwise the file's base name,
    /// otherwise the path itself.
    pub fn display_title(&self) -> String {
        if let Some(title) = self.outline_title.as_deref().filter(|t| !t.is_empty()) {
            return title.to_string();
        }
        Path::new(&self.path)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.path)
            .to_string()
    }
}

/// An ordered, non-empty list of manifest records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecordList")]
pub struct ParsedManifest {
    records: Vec<ManifestRecord>,
}

/// Unchecked serialized form of [`ParsedManifest`].
#[derive(Deserialize)]
struct RecordList {
    records: Vec<ManifestRecord>,
}

impl TryFrom<RecordList> for ParsedManifest {
    type Error = ParseError;

    fn try_from(list: RecordList) -> Result<Self, Self::Error> {
        if list.records.is_empty() {
            return Err(ParseError::NoRecords);
        }
        if let Some(record) = list.records.iter().position(|r| r.path.trim().is_empty()) {
            return Err(ParseError::EmptyPath { record });
        }
        Ok(Self::from_records(list.records))
    }
}

impl ParsedManifest {
    /// Wrap records that are already known to be non-empty.
    pub(crate) fn from_records(records: Vec<ManifestRecord>) -> Self {
        debug_assert!(!records.is_empty());
        Self { records }
    }

    /// Records in manifest order.
    pub fn records(&self) -> &[ManifestRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for a successfully parsed manifest.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over records in manifest order.
    pub fn iter(&self) -> std::slice::Iter<'_, ManifestRecord> {
        self.records.iter()
    }

    /// Take ownership of the records.
    pub fn into_records(self) -> Vec<ManifestRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a ParsedManifest {
    type Item = &'a ManifestRecord;
    type IntoIter = std::slice::Iter<'a, ManifestRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
