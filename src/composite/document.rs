//! The composite document façade.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use rayon::prelude::*;

use crate::detect::is_manifest_file;
use crate::engine::{
    CredentialProvider, DocumentEngine, EngineRegistry, NoCredentials, StaticPassword,
};
use crate::error::{Error, IndexError, Result};
use crate::manifest::{ManifestParser, ManifestRecord, ParsedManifest};
use crate::model::{
    Destination, DocumentProperty, OutlineNode, PageText, Point, Rect, RenderRequest,
    RenderTarget, RenderedBitmap,
};

use super::index::PageIndex;
use super::options::LoadOptions;
use super::outline::{OutlineMerger, OutlineSource};

/// Load state of one constituent.
pub enum ConstituentStatus {
    /// The engine opened; calls to it are serialized by the mutex.
    Loaded {
        /// The constituent's engine
        engine: Mutex<Box<dyn DocumentEngine>>,
        /// Page count reported at load time
        page_count: u32,
    },
    /// The engine could not be opened.
    Failed {
        /// Why opening failed
        reason: Error,
    },
}

/// A manifest record paired with its load result.
pub struct LoadedConstituent {
    record: ManifestRecord,
    path: PathBuf,
    status: ConstituentStatus,
}

impl LoadedConstituent {
    /// Manifest record of this constituent.
    pub fn record(&self) -> &ManifestRecord {
        &self.record
    }

    /// Resolved path the engine was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load state.
    pub fn status(&self) -> &ConstituentStatus {
        &self.status
    }

    /// Check if the engine opened.
    pub fn is_loaded(&self) -> bool {
        matches!(self.status, ConstituentStatus::Loaded { .. })
    }

    /// Pages contributed to the composite; zero when loading failed.
    pub fn page_count(&self) -> u32 {
        match &self.status {
            ConstituentStatus::Loaded { page_count, .. } => *page_count,
            ConstituentStatus::Failed { .. } => 0,
        }
    }

    /// Load failure, if any.
    pub fn failure(&self) -> Option<&Error> {
        match &self.status {
            ConstituentStatus::Failed { reason } => Some(reason),
            ConstituentStatus::Loaded { .. } => None,
        }
    }
}

impl std::fmt::Debug for LoadedConstituent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedConstituent")
            .field("path", &self.path)
            .field("page_count", &self.page_count())
            .field("failure", &self.failure().map(|e| e.to_string()))
            .finish()
    }
}

/// Several documents presented as one.
///
/// Logical pages run from 1 to [`page_count`](Self::page_count) across all
/// constituents in manifest order. Every per-page call is resolved to a
/// constituent and local page, then forwarded to that constituent's engine.
///
/// # Example
///
/// ```no_run
/// use vbkm::{CompositeDocument, LoadOptions};
///
/// let doc = CompositeDocument::open("binder.vbkm", &LoadOptions::default())?;
/// println!("{} pages", doc.page_count());
/// let text = doc.extract_page_text(1)?;
/// println!("{}", text.text);
/// # Ok::<(), vbkm::Error>(())
/// ```
pub struct CompositeDocument {
    constituents: Vec<LoadedConstituent>,
    index: PageIndex,
    toc: Arc<OutlineNode>,
}

impl CompositeDocument {
    /// Open a manifest file with the default engines.
    ///
    /// Relative constituent paths resolve against the manifest's directory
    /// unless `options.base_dir` is set.
    pub fn open<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self> {
        Self::open_with_registry(path, &EngineRegistry::with_defaults(), options)
    }

    /// Open a manifest file with a custom registry.
    pub fn open_with_registry<P: AsRef<Path>>(
        path: P,
        registry: &EngineRegistry,
        options: &LoadOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        if !is_manifest_file(path, false) {
            log::debug!("{} has no .vbkm extension, parsing anyway", path.display());
        }

        let manifest = ManifestParser::new().parse_file(path)?;

        let mut options = options.clone();
        if options.base_dir.is_none() {
            options.base_dir = path.parent().map(Path::to_path_buf);
        }
        Self::from_manifest(manifest, registry, &options)
    }

    /// Build from a parsed manifest, opening constituents through a registry.
    pub fn from_manifest(
        manifest: ParsedManifest,
        registry: &EngineRegistry,
        options: &LoadOptions,
    ) -> Result<Self> {
        let credentials: Box<dyn CredentialProvider> = match &options.password {
            Some(password) => Box::new(StaticPassword::new(password.clone())),
            None => Box::new(NoCredentials),
        };
        Self::from_manifest_with(manifest, options, |path, _record| {
            registry.open(path, credentials.as_ref())
        })
    }

    /// Build from a parsed manifest with a caller-supplied opener.
    ///
    /// `opener` receives the resolved path and the record for each
    /// constituent. Failures are kept in place as empty constituents. An
    /// error is returned only when no constituent contributes a page.
    pub fn from_manifest_with<F>(
        manifest: ParsedManifest,
        options: &LoadOptions,
        opener: F,
    ) -> Result<Self>
    where
        F: Fn(&Path, &ManifestRecord) -> Result<Box<dyn DocumentEngine>> + Sync,
    {
        let records = manifest.into_records();
        let total = records.len();
        log::debug!(
            "Loading {} constituent(s){}",
            total,
            if options.parallel { " in parallel" } else { "" }
        );

        let load = |(index, record): (usize, ManifestRecord)| {
            load_constituent(index, record, options, &opener)
        };
        let mut loaded: Vec<(LoadedConstituent, Option<Vec<OutlineNode>>)> = if options.parallel {
            records.into_par_iter().enumerate().map(load).collect()
        } else {
            records.into_iter().enumerate().map(load).collect()
        };

        let mut counts: Vec<u32> = loaded.iter().map(|(c, _)| c.page_count()).collect();
        let index = loop {
            match PageIndex::build(&counts) {
                Ok(index) => break index,
                Err(IndexError::TooManyPages { constituent, max }) => {
                    let (overflowing, outline) = &mut loaded[constituent];
                    let reason = Error::open(
                        &overflowing.path,
                        IndexError::TooManyPages { constituent, max }.into(),
                    );
                    log::warn!("Constituent {} skipped: {}", constituent, reason);
                    overflowing.status = ConstituentStatus::Failed { reason };
                    *outline = None;
                    counts[constituent] = 0;
                }
                Err(e) => return Err(e.into()),
            }
        };

        if index.total_page_count() == 0 {
            if loaded.iter().any(|(c, _)| c.is_loaded()) {
                log::warn!("Every loaded constituent is empty");
            }
            return Err(Error::NoUsableConstituents(total));
        }

        log::debug!(
            "Page index: {} page(s) across {} constituent(s)",
            index.total_page_count(),
            index.len()
        );

        let sources: Vec<OutlineSource<'_>> = loaded
            .iter()
            .map(|(constituent, outline)| OutlineSource {
                record: &constituent.record,
                outline: outline.as_deref(),
                failed: !constituent.is_loaded(),
            })
            .collect();
        let toc = OutlineMerger::merge(&sources, &index, options.title.clone());

        Ok(Self {
            constituents: loaded.into_iter().map(|(c, _)| c).collect(),
            index,
            toc: Arc::new(toc),
        })
    }

    /// Total logical page count.
    pub fn page_count(&self) -> u32 {
        self.index.total_page_count()
    }

    /// The page table.
    pub fn index(&self) -> &PageIndex {
        &self.index
    }

    /// Constituents in manifest order.
    pub fn constituents(&self) -> &[LoadedConstituent] {
        &self.constituents
    }

    /// Constituents that failed to open, with their indices.
    pub fn failed_constituents(&self) -> Vec<(usize, &LoadedConstituent)> {
        self.constituents
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_loaded())
            .collect()
    }

    /// Map a logical page to `(constituent, local page)`.
    pub fn locate(&self, page: u32) -> Result<(usize, u32)> {
        Ok(self.index.resolve(page)?)
    }

    /// Lock the engine of a constituent.
    fn engine(&self, constituent: usize) -> Result<MutexGuard<'_, Box<dyn DocumentEngine>>> {
        match self.constituents.get(constituent).map(|c| &c.status) {
            Some(ConstituentStatus::Loaded { engine, .. }) => engine
                .lock()
                .map_err(|_| Error::EnginePoisoned(constituent)),
            _ => Err(Error::Other(format!(
                "Constituent {} is not loaded",
                constituent
            ))),
        }
    }

    /// Resolve a logical page and run `f` on the owning engine with the local page.
    fn dispatch<T>(
        &self,
        page: u32,
        f: impl FnOnce(&dyn DocumentEngine, u32) -> Result<T>,
    ) -> Result<T> {
        let (constituent, local) = self.index.resolve(page)?;
        let engine = self.engine(constituent)?;
        f(&**engine, local).map_err(|e| Error::constituent(page, constituent, e))
    }

    /// Media box of a logical page.
    pub fn page_mediabox(&self, page: u32) -> Result<Rect> {
        self.dispatch(page, |engine, local| engine.page_mediabox(local))
    }

    /// Content box of a logical page.
    pub fn page_content_box(&self, page: u32, target: RenderTarget) -> Result<Rect> {
        self.dispatch(page, |engine, local| engine.page_content_box(local, target))
    }

    /// Rasterize a logical page.
    ///
    /// The request, abort cookie included, reaches the engine unchanged.
    pub fn render_page(&self, page: u32, request: &RenderRequest) -> Result<RenderedBitmap> {
        self.dispatch(page, |engine, local| engine.render(local, request))
    }

    /// Text of a logical page, in the owning page's coordinate space.
    pub fn extract_page_text(&self, page: u32) -> Result<PageText> {
        self.dispatch(page, |engine, local| engine.extract_text(local))
    }

    /// Map a point between page space and device space on a logical page.
    pub fn transform_point(
        &self,
        point: Point,
        page: u32,
        zoom: f32,
        rotation: i32,
        inverse: bool,
    ) -> Result<Point> {
        self.dispatch(page, |engine, local| {
            engine.transform_point(point, local, zoom, rotation, inverse)
        })
    }

    /// Map a rectangle between page space and device space on a logical page.
    pub fn transform_rect(
        &self,
        rect: Rect,
        page: u32,
        zoom: f32,
        rotation: i32,
        inverse: bool,
    ) -> Result<Rect> {
        self.dispatch(page, |engine, local| {
            engine.transform_rect(rect, local, zoom, rotation, inverse)
        })
    }

    /// Display label of a logical page, as the owning constituent labels it.
    pub fn page_label(&self, page: u32) -> Result<String> {
        self.dispatch(page, |engine, local| engine.page_label(local))
    }

    /// First logical page carrying `label`, searching constituents in order.
    pub fn page_by_label(&self, label: &str) -> Result<u32> {
        for constituent in self.loaded_indices() {
            let local = match self.engine(constituent) {
                Ok(engine) => engine.page_by_label(label),
                Err(e) => {
                    log::warn!("Skipping constituent {}: {}", constituent, e);
                    continue;
                }
            };
            if let Some(logical) = local.and_then(|l| self.index.to_logical(constituent, l)) {
                return Ok(logical);
            }
        }
        Err(Error::LabelNotFound(label.to_string()))
    }

    /// Resolve a named destination, searching constituents in order.
    ///
    /// Page results are returned in logical page numbering.
    pub fn named_destination(&self, name: &str) -> Option<Destination> {
        for constituent in self.loaded_indices() {
            let found = match self.engine(constituent) {
                Ok(engine) => engine.named_destination(name),
                Err(e) => {
                    log::warn!("Skipping constituent {}: {}", constituent, e);
                    continue;
                }
            };
            match found {
                Some(Destination::Page { page, view }) => {
                    if let Some(logical) = self.index.to_logical(constituent, page) {
                        return Some(Destination::Page {
                            page: logical,
                            view,
                        });
                    }
                }
                Some(named) => return Some(named),
                None => {}
            }
        }
        None
    }

    /// Whether rendering a logical page may clip to the requested area.
    pub fn has_clip_optimizations(&self, page: u32) -> bool {
        self.dispatch(page, |engine, local| Ok(engine.has_clip_optimizations(local)))
            .unwrap_or(false)
    }

    /// Document property, taken from the first loaded constituent.
    pub fn property(&self, prop: DocumentProperty) -> Option<String> {
        let first = self.loaded_indices().next()?;
        self.engine(first).ok()?.property(prop)
    }

    /// The merged outline.
    pub fn toc_tree(&self) -> Arc<OutlineNode> {
        Arc::clone(&self.toc)
    }

    /// Composite documents are read-only.
    pub fn save_as(&self, _path: &Path, _include_annotations: bool) -> Result<()> {
        Err(Error::Unsupported("saving a composite document"))
    }

    /// Composite documents cannot be duplicated.
    pub fn try_clone(&self) -> Result<Self> {
        Err(Error::Unsupported("cloning a composite document"))
    }

    /// Composite documents have no single backing file.
    pub fn file_data(&self) -> Result<Vec<u8>> {
        Err(Error::Unsupported("raw file data of a composite document"))
    }

    /// Annotations are not supported on composite documents.
    pub fn supports_annotations(&self) -> bool {
        false
    }

    fn loaded_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.constituents
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_loaded())
            .map(|(i, _)| i)
    }
}

/// Open one constituent, capturing its outline while the engine is still unshared.
fn load_constituent<F>(
    index: usize,
    record: ManifestRecord,
    options: &LoadOptions,
    opener: &F,
) -> (LoadedConstituent, Option<Vec<OutlineNode>>)
where
    F: Fn(&Path, &ManifestRecord) -> Result<Box<dyn DocumentEngine>> + Sync,
{
    let path = options.resolve_path(&record.path);

    match opener(&path, &record) {
        Ok(engine) => {
            let page_count = engine.page_count();
            let outline = engine.outline();
            log::debug!(
                "Constituent {} ({}): {} page(s)",
                index,
                path.display(),
                page_count
            );
            let status = ConstituentStatus::Loaded {
                engine: Mutex::new(engine),
                page_count,
            };
            (
                LoadedConstituent {
                    record,
                    path,
                    status,
                },
                outline,
            )
        }
        Err(e) => {
            let reason = Error::open(&path, e);
            log::warn!("Constituent {} skipped: {}", index, reason);
            (
                LoadedConstituent {
                    record,
                    path,
                    status: ConstituentStatus::Failed { reason },
                },
                None,
            )
        }
    }
}

impl DocumentEngine for CompositeDocument {
    fn page_count(&self) -> u32 {
        CompositeDocument::page_count(self)
    }

    fn page_mediabox(&self, page: u32) -> Result<Rect> {
        CompositeDocument::page_mediabox(self, page)
    }

    fn page_content_box(&self, page: u32, target: RenderTarget) -> Result<Rect> {
        CompositeDocument::page_content_box(self, page, target)
    }

    fn render(&self, page: u32, request: &RenderRequest) -> Result<RenderedBitmap> {
        self.render_page(page, request)
    }

    fn extract_text(&self, page: u32) -> Result<PageText> {
        self.extract_page_text(page)
    }

    fn transform_point(
        &self,
        point: Point,
        page: u32,
        zoom: f32,
        rotation: i32,
        inverse: bool,
    ) -> Result<Point> {
        CompositeDocument::transform_point(self, point, page, zoom, rotation, inverse)
    }

    fn transform_rect(
        &self,
        rect: Rect,
        page: u32,
        zoom: f32,
        rotation: i32,
        inverse: bool,
    ) -> Result<Rect> {
        CompositeDocument::transform_rect(self, rect, page, zoom, rotation, inverse)
    }

    fn outline(&self) -> Option<Vec<OutlineNode>> {
        Some(self.toc.children.clone())
    }

    fn named_destination(&self, name: &str) -> Option<Destination> {
        CompositeDocument::named_destination(self, name)
    }

    fn page_label(&self, page: u32) -> Result<String> {
        CompositeDocument::page_label(self, page)
    }

    fn page_by_label(&self, label: &str) -> Option<u32> {
        CompositeDocument::page_by_label(self, label).ok()
    }

    fn has_clip_optimizations(&self, page: u32) -> bool {
        CompositeDocument::has_clip_optimizations(self, page)
    }

    fn property(&self, prop: DocumentProperty) -> Option<String> {
        CompositeDocument::property(self, prop)
    }
}

impl std::fmt::Debug for CompositeDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeDocument")
            .field("page_count", &self.page_count())
            .field("constituents", &self.constituents)
            .finish()
    }
}
