//! Value types shared by engines and the composite document.
//!
//! Everything here is engine-agnostic: geometry, outline trees, and the
//! request/result types of per-page operations.

mod geometry;
mod outline;
mod page;

pub use geometry::{normalize_rotation, transform_point, transform_rect, Point, Rect};
pub use outline::{Destination, OutlineKind, OutlineNode, ViewPosition};
pub use page::{
    AbortCookie, DocumentProperty, PageText, RenderRequest, RenderTarget, RenderedBitmap,
};
