//! Line-oriented manifest parser.

use std::path::Path;

use crate::error::{Error, ParseError, Result};

use super::record::{ManifestRecord, ParsedManifest};

/// Prefix that opens a new record.
pub const RECORD_PREFIX: &str = "file:";

/// Metadata key that sets a record's outline title.
const TITLE_KEY: &str = "title";

/// Manifest parser.
///
/// Any line starting with `file:` (no leading whitespace allowed) opens a
/// record that runs until the next such line. Text before the first record
/// is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestParser;

impl ManifestParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse manifest text.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NoRecords`] when no line starts with `file:` and
    /// [`ParseError::EmptyPath`] for the first record with a blank path.
    ///
    /// # Example
    ///
    /// ```
    /// use vbkm::manifest::ManifestParser;
    ///
    /// let manifest = ManifestParser::new()
    ///     .parse("file: a.pdf\ntitle: Intro\nfile: b.pdf\n")
    ///     .unwrap();
    /// assert_eq!(manifest.len(), 2);
    /// assert_eq!(manifest.records()[0].outline_title.as_deref(), Some("Intro"));
    /// ```
    pub fn parse(&self, text: &str) -> std::result::Result<ParsedManifest, ParseError> {
        let text = normalize_newlines(text);
        let spans = split_records(&text);
        if spans.is_empty() {
            return Err(ParseError::NoRecords);
        }

        let records = spans
            .into_iter()
            .enumerate()
            .map(|(index, raw)| parse_record(index, raw))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        log::debug!("Parsed manifest with {} record(s)", records.len());
        Ok(ParsedManifest::from_records(records))
    }

    /// Parse manifest bytes, which must be UTF-8.
    pub fn parse_bytes(&self, data: &[u8]) -> Result<ParsedManifest> {
        let text = std::str::from_utf8(data).map_err(|e| Error::Encoding(e.to_string()))?;
        Ok(self.parse(text)?)
    }

    /// Read and parse a manifest file.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<ParsedManifest> {
        let data = std::fs::read(path)?;
        self.parse_bytes(&data)
    }
}

/// Replace `\r\n` and lone `\r` with `\n`.
pub fn normalize_newlines(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

/// Split normalized text into record spans, each starting at a boundary line.
fn split_records(text: &str) -> Vec<&str> {
    let mut starts = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.starts_with(RECORD_PREFIX) {
            starts.push(offset);
        }
        offset += line.len();
    }

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            &text[start..end]
        })
        .collect()
}

fn parse_record(index: usize, raw: &str) -> std::result::Result<ManifestRecord, ParseError> {
    let mut lines = raw.lines();
    let first = lines.next().unwrap_or_default();

    let path = first
        .split_once(':')
        .map(|(_, value)| value.trim())
        .unwrap_or_default();
    if path.is_empty() {
        return Err(ParseError::EmptyPath { record: index });
    }

    let mut record = ManifestRecord::new(path);
    record.raw = raw.to_string();

    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            log::debug!("Record {}: ignoring line without key: {:?}", index, line);
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.eq_ignore_ascii_case(TITLE_KEY) && !value.is_empty() {
            record.outline_title = Some(value.to_string());
        }
        record.metadata.push((key.to_string(), value.to_string()));
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> std::result::Result<ParsedManifest, ParseError> {
        ManifestParser::new().parse(text)
    }

    #[test]
    fn test_path_extraction() {
        let manifest = parse("file: foo/bar.pdf").unwrap();
        assert_eq!(manifest.records()[0].path, "foo/bar.pdf");
    }

    #[test]
    fn test_blank_path_fails() {
        assert_eq!(
            parse("file:   \n"),
            Err(ParseError::EmptyPath { record: 0 })
        );
    }

    #[test]
    fn test_second_record_failure_rejects_manifest() {
        assert_eq!(
            parse("file: a.pdf\nfile:\nfile: c.pdf\n"),
            Err(ParseError::EmptyPath { record: 1 })
        );
    }

    #[test]
    fn test_no_records() {
        assert_eq!(parse(""), Err(ParseError::NoRecords));
        assert_eq!(parse("title: nothing\n\n"), Err(ParseError::NoRecords));
    }

    #[test]
    fn test_leading_whitespace_is_not_a_boundary() {
        assert_eq!(parse("  file: a.pdf\n"), Err(ParseError::NoRecords));
    }

    #[test]
    fn test_preamble_is_ignored() {
        let manifest = parse("some header\n\nfile: a.pdf\n").unwrap();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.records()[0].raw, "file: a.pdf\n");
    }

    #[test]
    fn test_newline_normalization() {
        let manifest = parse("file: a.pdf\r\ntitle: A\rfile: b.pdf\r").unwrap();
        let records = manifest.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].path, "a.pdf");
        assert_eq!(records[0].outline_title.as_deref(), Some("A"));
        assert_eq!(records[1].path, "b.pdf");
    }

    #[test]
    fn test_path_keeps_inner_colons() {
        let manifest = parse("file: C:\\docs\\a.pdf\n").unwrap();
        assert_eq!(manifest.records()[0].path, "C:\\docs\\a.pdf");
    }

    #[test]
    fn test_metadata_lines() {
        let manifest = parse("file: a.pdf\n# comment\ntitle: First\nlevel: 2\nstray text\n").unwrap();
        let record = &manifest.records()[0];
        assert_eq!(record.outline_title.as_deref(), Some("First"));
        assert_eq!(
            record.metadata,
            vec![
                ("title".to_string(), "First".to_string()),
                ("level".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn test_empty_title_is_ignored() {
        let manifest = parse("file: a.pdf\ntitle:   \n").unwrap();
        assert_eq!(manifest.records()[0].outline_title, None);
    }

    #[test]
    fn test_raw_spans_reproduce_text() {
        let text = "preamble\nfile: a.pdf\ntitle: A\n\nfile: b.pdf\nfile: c.pdf";
        let manifest = parse(text).unwrap();
        assert_eq!(manifest.len(), 3);
        let joined: String = manifest.iter().map(|r| r.raw.as_str()).collect();
        assert_eq!(joined, &text[text.find("file:").unwrap()..]);
    }

    #[test]
    fn test_parse_bytes_rejects_invalid_utf8() {
        let result = ManifestParser::new().parse_bytes(&[b'f', 0xFF, 0xFE]);
        assert!(matches!(result, Err(Error::Encoding(_))));
    }
}
