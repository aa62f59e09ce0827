//! Composite documents.
//!
//! A [`CompositeDocument`] owns one engine per manifest record, a
//! [`PageIndex`] mapping logical pages to constituents, and the merged
//! outline built by [`OutlineMerger`].

mod document;
mod index;
mod options;
mod outline;

pub use document::{CompositeDocument, ConstituentStatus, LoadedConstituent};
pub use index::{PageIndex, PageRange};
pub use options::LoadOptions;
pub use outline::{OutlineMerger, OutlineSource};
