//! Integration tests for manifest parsing.

use std::io::Write;

use tempfile::NamedTempFile;
use vbkm::error::{Error, ParseError};
use vbkm::{is_manifest_file, parse_manifest, ManifestParser};

#[test]
fn test_record_count_matches_boundaries() {
    let text = "# binder\nfile: intro.pdf\ntitle: Introduction\n\nfile: ch1.pdf\nfile: ch2.pdf\nnote: draft\n";
    let manifest = parse_manifest(text).unwrap();
    assert_eq!(manifest.len(), 3);

    let paths: Vec<&str> = manifest.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["intro.pdf", "ch1.pdf", "ch2.pdf"]);
    assert_eq!(manifest.records()[2].get("NOTE"), Some("draft"));
}

#[test]
fn test_display_titles() {
    let manifest = parse_manifest("file: books/intro.pdf\ntitle: Start\nfile: books/ch1.pdf\n").unwrap();
    let titles: Vec<String> = manifest.iter().map(|r| r.display_title()).collect();
    assert_eq!(titles, vec!["Start", "ch1.pdf"]);
}

#[test]
fn test_empty_inputs_fail() {
    for text in ["", "\n\n", "   file: indented.pdf", "title: orphan"] {
        assert!(
            matches!(parse_manifest(text), Err(Error::Parse(ParseError::NoRecords))),
            "{:?} should have no records",
            text
        );
    }
}

#[test]
fn test_parse_file_from_disk() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "file: a.pdf\r\ntitle: A\r\nfile: b.pdf\r\n").unwrap();

    let manifest = ManifestParser::new().parse_file(file.path()).unwrap();
    assert_eq!(manifest.len(), 2);
    assert_eq!(manifest.records()[0].outline_title.as_deref(), Some("A"));
    assert_eq!(manifest.records()[1].path, "b.pdf");
}

#[test]
fn test_parse_file_missing() {
    let result = ManifestParser::new().parse_file("/nonexistent/binder.vbkm");
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_manifest_extension_detection() {
    assert!(is_manifest_file("binder.vbkm", false));
    assert!(is_manifest_file("BINDER.VBKM", false));
    assert!(!is_manifest_file("binder.pdf", false));
    assert!(!is_manifest_file("binder.vbkm", true));
}
