//! Single-document engine abstraction.
//!
//! The composite layer never touches a concrete document format. Everything
//! it needs from a constituent goes through [`DocumentEngine`]; opening a
//! file goes through an [`EngineFactory`] picked by the [`EngineRegistry`].

#[cfg(feature = "lopdf-engine")]
mod pdf;
mod registry;

#[cfg(feature = "lopdf-engine")]
pub use pdf::{LopdfEngine, LopdfEngineFactory};
pub use registry::EngineRegistry;

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{
    self, Destination, DocumentProperty, OutlineNode, PageText, Point, Rect, RenderRequest,
    RenderTarget, RenderedBitmap,
};

/// Capabilities of one opened document.
///
/// Page numbers are 1-based and local to the document. Implementations
/// return [`Error::PageOutOfRange`] for pages outside `[1, page_count]`.
/// Engines only need to be `Send`: callers serialize access to a single
/// engine unless they know more about it.
pub trait DocumentEngine: Send {
    /// Number of pages.
    fn page_count(&self) -> u32;

    /// Media box of a page in page space.
    fn page_mediabox(&self, page: u32) -> Result<Rect>;

    /// Visible content box of a page; defaults to the media box.
    fn page_content_box(&self, page: u32, _target: RenderTarget) -> Result<Rect> {
        self.page_mediabox(page)
    }

    /// Rasterize a page.
    fn render(&self, page: u32, request: &RenderRequest) -> Result<RenderedBitmap>;

    /// Extract the text of a page.
    fn extract_text(&self, page: u32) -> Result<PageText>;

    /// Map a point between page space and device space.
    fn transform_point(
        &self,
        point: Point,
        page: u32,
        zoom: f32,
        rotation: i32,
        inverse: bool,
    ) -> Result<Point> {
        let page_box = self.page_mediabox(page)?;
        Ok(model::transform_point(point, page_box, zoom, rotation, inverse))
    }

    /// Map a rectangle between page space and device space.
    fn transform_rect(
        &self,
        rect: Rect,
        page: u32,
        zoom: f32,
        rotation: i32,
        inverse: bool,
    ) -> Result<Rect> {
        let page_box = self.page_mediabox(page)?;
        Ok(model::transform_rect(rect, page_box, zoom, rotation, inverse))
    }

    /// Top-level nodes of the document's own outline, if it has one.
    fn outline(&self) -> Option<Vec<OutlineNode>>;

    /// Resolve a named destination.
    fn named_destination(&self, _name: &str) -> Option<Destination> {
        None
    }

    /// Display label of a page; defaults to the page number.
    fn page_label(&self, page: u32) -> Result<String> {
        check_page(page, self.page_count())?;
        Ok(page.to_string())
    }

    /// Find the page carrying a label.
    fn page_by_label(&self, label: &str) -> Option<u32> {
        let count = self.page_count();
        (1..=count).find(|&page| self.page_label(page).is_ok_and(|l| l == label))
    }

    /// Whether rendering may skip content outside the requested area.
    fn has_clip_optimizations(&self, _page: u32) -> bool {
        true
    }

    /// Document-level property, if known.
    fn property(&self, _prop: DocumentProperty) -> Option<String> {
        None
    }
}

/// Check a 1-based page number against a page count.
pub fn check_page(page: u32, count: u32) -> Result<()> {
    if page == 0 || page > count {
        return Err(Error::PageOutOfRange(page, count));
    }
    Ok(())
}

/// Supplies passwords for encrypted documents.
pub trait CredentialProvider: Send + Sync {
    /// Password to try for `path`; `attempt` starts at 0. `None` gives up.
    fn password(&self, path: &Path, attempt: u32) -> Option<String>;
}

/// Provider that never has a password.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn password(&self, _path: &Path, _attempt: u32) -> Option<String> {
        None
    }
}

/// Provider that offers one fixed password, once.
#[derive(Debug, Clone)]
pub struct StaticPassword(String);

impl StaticPassword {
    /// Create a provider for a password.
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }
}

impl CredentialProvider for StaticPassword {
    fn password(&self, _path: &Path, attempt: u32) -> Option<String> {
        (attempt == 0).then(|| self.0.clone())
    }
}

/// Opens documents of one or more formats.
///
/// Implement this trait to add support for a new document format.
pub trait EngineFactory: Send + Sync {
    /// Supported file extensions, lowercase without the leading dot.
    fn supported_extensions(&self) -> &[&str];

    /// Name of this factory.
    fn name(&self) -> &str;

    /// Open a document.
    fn open(
        &self,
        path: &Path,
        credentials: &dyn CredentialProvider,
    ) -> Result<Box<dyn DocumentEngine>>;

    /// Check if this factory supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}
