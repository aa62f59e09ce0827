//! Manifest file association.
//!
//! Manifests are recognized by their declared extension only. There is no
//! magic header to look for, so content sniffing is always refused.

use std::path::Path;

/// Extension of manifest files, without the leading dot.
pub const MANIFEST_EXTENSION: &str = "vbkm";

/// Check whether a file reference names a manifest.
///
/// # Arguments
/// * `path` - File reference to check
/// * `sniff` - Whether the caller is asking for content-based detection
///
/// # Returns
/// * `true` if `sniff` is false and the extension is `.vbkm` (any case)
/// * `false` otherwise
///
/// # Example
/// ```
/// use vbkm::detect::is_manifest_file;
///
/// assert!(is_manifest_file("books/set.VBKM", false));
/// assert!(!is_manifest_file("books/set.vbkm", true));
/// ```
pub fn is_manifest_file<P: AsRef<Path>>(path: P, sniff: bool) -> bool {
    if sniff {
        return false;
    }
    has_extension(path.as_ref(), MANIFEST_EXTENSION)
}

/// Lowercased extension of a path, if it has one.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

fn has_extension(path: &Path, ext: &str) -> bool {
    extension_of(path).is_some_and(|e| e == ext)
}
