//! Error types for vbkm library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for vbkm operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing manifest text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The manifest contains no `file:` line.
    #[error("manifest contains no \"file:\" records")]
    NoRecords,

    /// A `file:` line has nothing after the colon.
    #[error("record {record} has an empty file path")]
    EmptyPath {
        /// 0-based index of the offending record.
        record: usize,
    },
}

/// Errors raised by logical page lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Logical page outside `[1, total]`.
    #[error("Page {page} is out of range (document has {total} pages)")]
    OutOfRange {
        /// Requested logical page.
        page: u32,
        /// Total logical pages.
        total: u32,
    },

    /// Page counts add up to more logical pages than a `u32` can number.
    #[error("Constituent {constituent} pushes the page total past {max}")]
    TooManyPages {
        /// 0-based index of the constituent that overflowed.
        constituent: usize,
        /// Largest supported logical page number.
        max: u32,
    },
}

/// Error types that can occur while building or querying a composite document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Manifest text could not be parsed.
    #[error("Manifest error: {0}")]
    Parse(#[from] ParseError),

    /// Logical page lookup failed.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Text is not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// No engine is registered for the file's extension.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Error parsing a constituent's structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The document is encrypted and no usable password was supplied.
    #[error("Document is encrypted")]
    Encrypted,

    /// The constituent's structure is corrupted or malformed.
    #[error("Corrupted document structure: {0}")]
    Corrupted(String),

    /// Error extracting text content.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Page number outside an engine's own page range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// No constituent carries the requested page label.
    #[error("Page label not found: {0}")]
    LabelNotFound(String),

    /// The operation is not available for this document.
    #[error("Operation not supported: {0}")]
    Unsupported(&'static str),

    /// No constituent listed in the manifest opened with at least one page.
    #[error("None of the {0} constituent document(s) contributed a page")]
    NoUsableConstituents(usize),

    /// A constituent engine's lock was poisoned by a panic in another thread.
    #[error("Engine for constituent {0} is unavailable after a panic")]
    EnginePoisoned(usize),

    /// A constituent could not be opened.
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        /// Resolved path of the constituent.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: Box<Error>,
    },

    /// A constituent engine failed while serving a logical page.
    #[error("Constituent {constituent} failed on page {page}: {source}")]
    Constituent {
        /// Logical page that was requested.
        page: u32,
        /// 0-based constituent index in manifest order.
        constituent: usize,
        /// The engine's own error.
        #[source]
        source: Box<Error>,
    },

    /// Error during output rendering (JSON, text).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Wrap an open failure with the path that caused it.
    pub fn open(path: impl Into<PathBuf>, source: Error) -> Self {
        Error::Open {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Tag an engine error with the logical page and constituent it came from.
    pub fn constituent(page: u32, constituent: usize, source: Error) -> Self {
        Error::Constituent {
            page,
            constituent,
            source: Box::new(source),
        }
    }

    /// Check if this is a logical page range error.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Error::Index(IndexError::OutOfRange { .. }))
    }
}

#[cfg(feature = "lopdf-engine")]
impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
