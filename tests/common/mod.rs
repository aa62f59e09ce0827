//! Shared test helpers.
#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use vbkm::engine::check_page;
use vbkm::error::{Error, Result};
use vbkm::{
    CredentialProvider, Destination, DocumentEngine, DocumentProperty, EngineFactory,
    OutlineNode, PageText, Rect, RenderRequest, RenderedBitmap,
};

/// Mock engine for testing.
#[derive(Default)]
pub struct MockEngine {
    pub name: String,
    pub pages: u32,
    pub outline: Option<Vec<OutlineNode>>,
    pub labels: Vec<String>,
    pub named: Vec<(String, u32)>,
    pub title: Option<String>,
    pub calls: Arc<AtomicUsize>,
}

impl MockEngine {
    pub fn new(name: &str, pages: u32) -> Self {
        Self {
            name: name.to_string(),
            pages,
            ..Default::default()
        }
    }

    pub fn with_outline(mut self, outline: Vec<OutlineNode>) -> Self {
        self.outline = Some(outline);
        self
    }

    pub fn with_labels(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_named(mut self, name: &str, page: u32) -> Self {
        self.named.push((name.to_string(), page));
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_counter(mut self, calls: Arc<AtomicUsize>) -> Self {
        self.calls = calls;
        self
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl DocumentEngine for MockEngine {
    fn page_count(&self) -> u32 {
        self.pages
    }

    fn page_mediabox(&self, page: u32) -> Result<Rect> {
        check_page(page, self.pages)?;
        self.hit();
        Ok(Rect::new(0.0, 0.0, 612.0, 792.0))
    }

    fn render(&self, page: u32, request: &RenderRequest) -> Result<RenderedBitmap> {
        check_page(page, self.pages)?;
        self.hit();
        if request.is_aborted() {
            return Err(Error::Render("aborted".to_string()));
        }
        let width = (612.0 * request.zoom) as u32;
        let height = (792.0 * request.zoom) as u32;
        Ok(RenderedBitmap::new(width, height, vec![page as u8]))
    }

    fn extract_text(&self, page: u32) -> Result<PageText> {
        check_page(page, self.pages)?;
        self.hit();
        Ok(PageText::plain(format!("{} page {}", self.name, page)))
    }

    fn outline(&self) -> Option<Vec<OutlineNode>> {
        self.outline.clone()
    }

    fn named_destination(&self, name: &str) -> Option<Destination> {
        self.named
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, page)| Destination::page(*page))
    }

    fn page_label(&self, page: u32) -> Result<String> {
        check_page(page, self.pages)?;
        Ok(self
            .labels
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_else(|| page.to_string()))
    }

    fn property(&self, prop: DocumentProperty) -> Option<String> {
        match prop {
            DocumentProperty::Title => self.title.clone(),
            _ => None,
        }
    }
}

/// Factory for `.mock` files whose first line is a page count.
pub struct MockFactory;

impl EngineFactory for MockFactory {
    fn supported_extensions(&self) -> &[&str] {
        &["mock"]
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn open(
        &self,
        path: &Path,
        _credentials: &dyn CredentialProvider,
    ) -> Result<Box<dyn DocumentEngine>> {
        let content = std::fs::read_to_string(path)?;
        let pages = content
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .parse::<u32>()
            .map_err(|e| Error::Corrupted(e.to_string()))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Box::new(MockEngine::new(&name, pages)))
    }
}
