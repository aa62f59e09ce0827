//! # vbkm
//!
//! Virtual binders: several documents presented as one.
//!
//! A `.vbkm` manifest lists constituent files. This library opens each one
//! through a [`DocumentEngine`], lays their pages end to end in a single
//! logical page space, merges their outlines under one grouping node per
//! file, and forwards every per-page request to the document that owns the
//! page.
//!
//! ## Quick Start
//!
//! ```no_run
//! use vbkm::{open_file, render};
//!
//! fn main() -> vbkm::Result<()> {
//!     let doc = open_file("binder.vbkm")?;
//!     println!("{} pages", doc.page_count());
//!
//!     let toc = doc.toc_tree();
//!     print!("{}", render::toc_to_text(&toc, 2));
//!
//!     let (constituent, local) = doc.locate(12)?;
//!     println!("page 12 is page {} of file {}", local, constituent);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Pluggable engines**: anything implementing [`DocumentEngine`]; a
//!   lopdf-backed PDF engine is included behind the `lopdf-engine` feature
//! - **Partial loading**: files that fail to open keep their outline slot
//!   and contribute no pages
//! - **Parallel loading**: constituents are opened with Rayon

pub mod composite;
pub mod detect;
pub mod engine;
pub mod error;
pub mod manifest;
pub mod model;
pub mod render;

// Re-export commonly used types
pub use composite::{
    CompositeDocument, ConstituentStatus, LoadOptions, LoadedConstituent, OutlineMerger,
    PageIndex,
};
pub use detect::{is_manifest_file, MANIFEST_EXTENSION};
#[cfg(feature = "lopdf-engine")]
pub use engine::{LopdfEngine, LopdfEngineFactory};
pub use engine::{
    CredentialProvider, DocumentEngine, EngineFactory, EngineRegistry, NoCredentials,
    StaticPassword,
};
pub use error::{Error, IndexError, ParseError, Result};
pub use manifest::{ManifestParser, ManifestRecord, ParsedManifest};
pub use model::{
    AbortCookie, Destination, DocumentProperty, OutlineKind, OutlineNode, PageText, Point, Rect,
    RenderRequest, RenderTarget, RenderedBitmap, ViewPosition,
};
pub use render::JsonFormat;

use std::path::Path;

/// Open a manifest file with default options and engines.
///
/// # Example
///
/// ```no_run
/// use vbkm::open_file;
///
/// let doc = open_file("binder.vbkm").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn open_file<P: AsRef<Path>>(path: P) -> Result<CompositeDocument> {
    CompositeDocument::open(path, &LoadOptions::default())
}

/// Open a manifest file with custom options.
///
/// # Example
///
/// ```no_run
/// use vbkm::{open_file_with_options, LoadOptions};
///
/// let options = LoadOptions::new()
///     .sequential()
///     .with_password("secret");
/// let doc = open_file_with_options("binder.vbkm", &options).unwrap();
/// ```
pub fn open_file_with_options<P: AsRef<Path>>(
    path: P,
    options: &LoadOptions,
) -> Result<CompositeDocument> {
    CompositeDocument::open(path, options)
}

/// Parse manifest text without opening anything.
///
/// # Example
///
/// ```
/// let manifest = vbkm::parse_manifest("file: a.pdf\nfile: b.pdf\n").unwrap();
/// assert_eq!(manifest.len(), 2);
/// ```
pub fn parse_manifest(text: &str) -> Result<ParsedManifest> {
    Ok(ManifestParser::new().parse(text)?)
}
