//! Per-page request and result types.

use super::Rect;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Purpose of a rendering or content-box request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderTarget {
    /// On-screen display
    #[default]
    View,
    /// Printing
    Print,
    /// Export to an image file
    Export,
}

/// Shared cancellation flag for a long-running render.
///
/// Clones share the same flag: the caller keeps one and hands another to the
/// render call; [`abort`](Self::abort) from any thread is visible to all.
#[derive(Debug, Clone, Default)]
pub struct AbortCookie {
    flag: Arc<AtomicBool>,
}

impl AbortCookie {
    /// Create a new, untriggered cookie.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn abort(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation was requested.
    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Parameters for rendering one page.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Scale factor (1.0 = 72 dpi)
    pub zoom: f32,
    /// Clockwise rotation in degrees
    pub rotation: i32,
    /// Intended use of the bitmap
    pub target: RenderTarget,
    /// Page area to render; the whole media box when `None`
    pub page_rect: Option<Rect>,
    /// Cancellation flag checked by the engine
    pub abort: Option<AbortCookie>,
}

impl RenderRequest {
    /// Create a request for the whole page at the given zoom.
    pub fn new(zoom: f32) -> Self {
        Self {
            zoom,
            ..Default::default()
        }
    }

    /// Set rotation.
    pub fn with_rotation(mut self, rotation: i32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set render target.
    pub fn with_target(mut self, target: RenderTarget) -> Self {
        self.target = target;
        self
    }

    /// Restrict rendering to part of the page.
    pub fn with_page_rect(mut self, rect: Rect) -> Self {
        self.page_rect = Some(rect);
        self
    }

    /// Attach a cancellation cookie.
    pub fn with_abort(mut self, cookie: AbortCookie) -> Self {
        self.abort = Some(cookie);
        self
    }

    /// Check whether the attached cookie, if any, was triggered.
    pub fn is_aborted(&self) -> bool {
        self.abort.as_ref().is_some_and(AbortCookie::is_aborted)
    }
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            rotation: 0,
            target: RenderTarget::View,
            page_rect: None,
            abort: None,
        }
    }
}

/// A rendered page image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBitmap {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// RGBA pixel data, row-major
    pub data: Vec<u8>,
}

impl RenderedBitmap {
    /// Create a bitmap from raw RGBA data.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }
}

/// Text of one page with per-character boxes in page space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageText {
    /// Extracted text
    pub text: String,
    /// One box per character of `text`, when the engine provides them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coords: Vec<Rect>,
}

impl PageText {
    /// Text without coordinates.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            coords: Vec::new(),
        }
    }
}

/// Document-level properties an engine may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentProperty {
    /// Document title
    Title,
    /// Document author
    Author,
    /// Subject
    Subject,
    /// Creator application
    Creator,
    /// Producer
    Producer,
    /// Creation date, as stored
    CreationDate,
    /// Last modification date, as stored
    ModificationDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abort_cookie_shared() {
        let cookie = AbortCookie::new();
        let request = RenderRequest::new(2.0).with_abort(cookie.clone());
        assert!(!request.is_aborted());
        cookie.abort();
        assert!(request.is_aborted());
    }

    #[test]
    fn test_render_request_builder() {
        let request = RenderRequest::new(1.5)
            .with_rotation(90)
            .with_target(RenderTarget::Print);
        assert_eq!(request.zoom, 1.5);
        assert_eq!(request.rotation, 90);
        assert_eq!(request.target, RenderTarget::Print);
        assert!(request.page_rect.is_none());
    }
}
