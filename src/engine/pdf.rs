//! PDF engine backed by lopdf.
//!
//! Covers everything except rasterization: page boxes, text, outline,
//! named destinations, page labels and document info.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::{
    Destination, DocumentProperty, OutlineNode, PageText, Rect, RenderRequest, RenderTarget,
    RenderedBitmap, ViewPosition,
};

use super::{check_page, CredentialProvider, DocumentEngine, EngineFactory};

/// Upper bound on name/number tree depth, guarding against reference cycles.
const MAX_TREE_DEPTH: usize = 32;

/// Largest label number spelled as roman numerals or letters; beyond it
/// labels fall back to decimal.
const MAX_SPELLED_LABEL: u32 = 4999;

/// Concrete [`DocumentEngine`] backed by `lopdf::Document`.
pub struct LopdfEngine {
    doc: LopdfDocument,
    pages: Vec<ObjectId>,
    labels: Option<Vec<String>>,
}

impl LopdfEngine {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let doc = LopdfDocument::load(path)?;
        Ok(Self::from_document(doc))
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self::from_document(doc))
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Self {
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        let mut engine = Self {
            doc,
            pages,
            labels: None,
        };
        engine.labels = engine.collect_page_labels();
        engine
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        check_page(page, self.page_count())?;
        Ok(self.pages[(page - 1) as usize])
    }

    fn page_number_of(&self, id: ObjectId) -> Option<u32> {
        self.pages
            .iter()
            .position(|p| *p == id)
            .map(|i| i as u32 + 1)
    }

    /// Follow a reference, if `obj` is one.
    fn deref<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    fn deref_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match self.deref(obj)? {
            Object::Dictionary(d) => Some(d),
            Object::Stream(s) => Some(&s.dict),
            _ => None,
        }
    }

    fn deref_array<'a>(&'a self, obj: &'a Object) -> Option<&'a Vec<Object>> {
        match self.deref(obj)? {
            Object::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Look up a page attribute, walking up the page tree for inherited keys.
    fn inherited<'a>(&'a self, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
        let mut current = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(value) = current.get(key) {
                return self.deref(value);
            }
            let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
            current = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn page_box(&self, page: u32, key: &[u8]) -> Result<Option<Rect>> {
        let page_id = self.page_id(page)?;
        Ok(self
            .inherited(page_id, key)
            .and_then(|obj| self.deref_array(obj))
            .and_then(|arr| rect_from_array(arr)))
    }

    fn catalog_entry(&self, key: &[u8]) -> Option<&Object> {
        let catalog = self.doc.catalog().ok()?;
        self.deref(catalog.get(key).ok()?)
    }

    fn info_string(&self, key: &[u8]) -> Option<String> {
        let info = self.doc.trailer.get(b"Info").ok()?;
        let info = self.deref_dict(info)?;
        get_string_from_dict(info, key)
    }

    // ---------------------------------------------------------------------
    // Destinations
    // ---------------------------------------------------------------------

    /// Resolve a destination object (array, name or string).
    fn resolve_destination(&self, dest: &Object, depth: usize) -> Option<Destination> {
        if depth > MAX_TREE_DEPTH {
            log::warn!("Destination nested deeper than {}, ignoring", MAX_TREE_DEPTH);
            return None;
        }
        match self.deref(dest)? {
            Object::Array(arr) => self.explicit_destination(arr),
            Object::Name(name) => {
                let name = String::from_utf8_lossy(name).to_string();
                Some(self.lookup_named(&name).unwrap_or(Destination::Named { name }))
            }
            Object::String(bytes, _) => {
                let name = decode_pdf_string(bytes);
                Some(self.lookup_named(&name).unwrap_or(Destination::Named { name }))
            }
            Object::Dictionary(dict) => self.resolve_destination(dict.get(b"D").ok()?, depth + 1),
            _ => None,
        }
    }

    /// `[page /XYZ left top zoom]`, `[page /FitH top]`, and friends.
    fn explicit_destination(&self, arr: &[Object]) -> Option<Destination> {
        let page = match arr.first()? {
            Object::Reference(id) => self.page_number_of(*id)?,
            // Remote destinations use a 0-based page index.
            Object::Integer(i) => u32::try_from(*i).ok()? + 1,
            _ => return None,
        };

        let number = |i: usize| arr.get(i).and_then(|o| o.as_float().ok()).map(f64::from);
        let view = match arr.get(1) {
            Some(Object::Name(kind)) => match kind.as_slice() {
                b"XYZ" => Some(ViewPosition {
                    left: number(2),
                    top: number(3),
                    zoom: number(4).filter(|z| *z > 0.0),
                }),
                b"FitH" | b"FitBH" => Some(ViewPosition {
                    top: number(2),
                    ..Default::default()
                }),
                b"FitV" | b"FitBV" => Some(ViewPosition {
                    left: number(2),
                    ..Default::default()
                }),
                b"FitR" => Some(ViewPosition {
                    left: number(2),
                    top: number(5),
                    zoom: None,
                }),
                _ => None,
            },
            _ => None,
        };

        Some(Destination::Page { page, view })
    }

    /// Find a named destination in `/Dests` or the `/Names /Dests` tree.
    fn lookup_named(&self, name: &str) -> Option<Destination> {
        if let Some(Object::Dictionary(dests)) = self.catalog_entry(b"Dests") {
            if let Ok(value) = dests.get(name.as_bytes()) {
                if let Some(dest) = self.destination_value(value) {
                    return Some(dest);
                }
            }
        }

        let names = self.catalog_entry(b"Names")?;
        let names = self.deref_dict(names)?;
        let tree = self.deref_dict(names.get(b"Dests").ok()?)?;
        let value = self.name_tree_lookup(tree, name, 0)?;
        self.destination_value(value)
    }

    /// A destination stored in a name tree: an array, or a dict with `/D`.
    fn destination_value(&self, value: &Object) -> Option<Destination> {
        match self.deref(value)? {
            Object::Array(arr) => self.explicit_destination(arr),
            Object::Dictionary(dict) => {
                let d = self.deref_array(dict.get(b"D").ok()?)?;
                self.explicit_destination(d)
            }
            _ => None,
        }
    }

    fn name_tree_lookup<'a>(
        &'a self,
        node: &'a Dictionary,
        name: &str,
        depth: usize,
    ) -> Option<&'a Object> {
        if depth > MAX_TREE_DEPTH {
            return None;
        }
        if let Some(names) = node.get(b"Names").ok().and_then(|n| self.deref_array(n)) {
            for pair in names.chunks(2) {
                if let [Object::String(key, _), value] = pair {
                    if decode_pdf_string(key) == name {
                        return Some(value);
                    }
                }
            }
        }
        let kids = self.deref_array(node.get(b"Kids").ok()?)?;
        kids.iter()
            .filter_map(|kid| self.deref_dict(kid))
            .find_map(|kid| self.name_tree_lookup(kid, name, depth + 1))
    }

    // ---------------------------------------------------------------------
    // Outline
    // ---------------------------------------------------------------------

    fn extract_outline(&self) -> Option<Vec<OutlineNode>> {
        let outlines = self.deref_dict(self.doc.catalog().ok()?.get(b"Outlines").ok()?)?;
        let first = outlines.get(b"First").ok()?.as_reference().ok()?;

        let mut visited = HashSet::new();
        let items = self.extract_outline_items(first, 0, &mut visited);
        (!items.is_empty()).then_some(items)
    }

    /// Collect a sibling chain starting at `first`, recursing into children.
    fn extract_outline_items(
        &self,
        first: ObjectId,
        depth: usize,
        visited: &mut HashSet<ObjectId>,
    ) -> Vec<OutlineNode> {
        let mut items = Vec::new();
        if depth > MAX_TREE_DEPTH {
            return items;
        }

        let mut next = Some(first);
        while let Some(item_ref) = next.take() {
            if !visited.insert(item_ref) {
                log::warn!("Outline item {:?} visited twice, stopping", item_ref);
                break;
            }
            let Ok(item_dict) = self.doc.get_dictionary(item_ref) else {
                break;
            };

            let title = get_string_from_dict(item_dict, b"Title").unwrap_or_default();
            let mut node = OutlineNode::new(title, self.get_outline_destination(item_dict));

            if let Ok(child) = item_dict.get(b"First").and_then(Object::as_reference) {
                node.children = self.extract_outline_items(child, depth + 1, visited);
            }
            items.push(node);

            next = item_dict
                .get(b"Next")
                .and_then(Object::as_reference)
                .ok();
        }

        items
    }

    /// Destination of an outline item: `/Dest`, or the `/D` of a GoTo action.
    fn get_outline_destination(&self, item_dict: &Dictionary) -> Option<Destination> {
        if let Ok(dest) = item_dict.get(b"Dest") {
            return self.resolve_destination(dest, 0);
        }

        let action = self.deref_dict(item_dict.get(b"A").ok()?)?;
        match action.get(b"S").ok()? {
            Object::Name(kind) if kind.as_slice() == b"GoTo" => {
                self.resolve_destination(action.get(b"D").ok()?, 0)
            }
            _ => None,
        }
    }

    // ---------------------------------------------------------------------
    // Page labels
    // ---------------------------------------------------------------------

    fn collect_page_labels(&self) -> Option<Vec<String>> {
        let tree = self.deref_dict(self.catalog_entry(b"PageLabels")?)?;
        let mut ranges = BTreeMap::new();
        self.collect_number_tree(tree, &mut ranges, 0);
        if ranges.is_empty() {
            return None;
        }

        let labels = (0..self.pages.len() as u32)
            .map(|index| match ranges.range(..=index).next_back() {
                Some((start, style)) => style
                    .format(index - start)
                    .unwrap_or_else(|| (index + 1).to_string()),
                None => (index + 1).to_string(),
            })
            .collect();
        Some(labels)
    }

    fn collect_number_tree(
        &self,
        node: &Dictionary,
        out: &mut BTreeMap<u32, LabelStyle>,
        depth: usize,
    ) {
        if depth > MAX_TREE_DEPTH {
            return;
        }
        if let Some(nums) = node.get(b"Nums").ok().and_then(|n| self.deref_array(n)) {
            for pair in nums.chunks(2) {
                if let [Object::Integer(start), value] = pair {
                    if let (Ok(start), Some(dict)) = (u32::try_from(*start), self.deref_dict(value))
                    {
                        out.insert(start, LabelStyle::from_dict(dict));
                    }
                }
            }
        }
        if let Some(kids) = node.get(b"Kids").ok().and_then(|k| self.deref_array(k)) {
            for kid in kids.iter().filter_map(|k| self.deref_dict(k)) {
                self.collect_number_tree(kid, out, depth + 1);
            }
        }
    }
}

impl DocumentEngine for LopdfEngine {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_mediabox(&self, page: u32) -> Result<Rect> {
        // Default to Letter size
        Ok(self.page_box(page, b"MediaBox")?.unwrap_or_else(Rect::letter))
    }

    fn page_content_box(&self, page: u32, _target: RenderTarget) -> Result<Rect> {
        match self.page_box(page, b"CropBox")? {
            Some(crop) => Ok(crop),
            None => self.page_mediabox(page),
        }
    }

    fn render(&self, page: u32, _request: &RenderRequest) -> Result<RenderedBitmap> {
        check_page(page, self.page_count())?;
        Err(Error::Unsupported("rendering with the lopdf engine"))
    }

    fn extract_text(&self, page: u32) -> Result<PageText> {
        check_page(page, self.page_count())?;
        self.doc
            .extract_text(&[page])
            .map(PageText::plain)
            .map_err(|e| Error::TextExtract(format!("Page {}: {}", page, e)))
    }

    fn outline(&self) -> Option<Vec<OutlineNode>> {
        self.extract_outline()
    }

    fn named_destination(&self, name: &str) -> Option<Destination> {
        self.lookup_named(name)
    }

    fn page_label(&self, page: u32) -> Result<String> {
        check_page(page, self.page_count())?;
        Ok(match &self.labels {
            Some(labels) => labels[(page - 1) as usize].clone(),
            None => page.to_string(),
        })
    }

    fn page_by_label(&self, label: &str) -> Option<u32> {
        match &self.labels {
            Some(labels) => labels
                .iter()
                .position(|l| l == label)
                .map(|i| i as u32 + 1),
            None => label
                .parse::<u32>()
                .ok()
                .filter(|p| check_page(*p, self.page_count()).is_ok()),
        }
    }

    fn property(&self, prop: DocumentProperty) -> Option<String> {
        let key: &[u8] = match prop {
            DocumentProperty::Title => b"Title",
            DocumentProperty::Author => b"Author",
            DocumentProperty::Subject => b"Subject",
            DocumentProperty::Creator => b"Creator",
            DocumentProperty::Producer => b"Producer",
            DocumentProperty::CreationDate => b"CreationDate",
            DocumentProperty::ModificationDate => b"ModDate",
        };
        self.info_string(key)
    }
}

/// Factory that opens `.pdf` files with [`LopdfEngine`].
#[derive(Debug, Clone, Default)]
pub struct LopdfEngineFactory {
    _private: (),
}

impl LopdfEngineFactory {
    /// Create a new PDF engine factory.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl EngineFactory for LopdfEngineFactory {
    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn name(&self) -> &str {
        "pdf"
    }

    fn open(
        &self,
        path: &Path,
        credentials: &dyn CredentialProvider,
    ) -> Result<Box<dyn DocumentEngine>> {
        let engine = LopdfEngine::load_file(path)?;

        if engine.is_encrypted() {
            if credentials.password(path, 0).is_some() {
                log::warn!(
                    "Password was provided for {} but decryption is not supported",
                    path.display()
                );
            }
            return Err(Error::Encrypted);
        }

        Ok(Box::new(engine))
    }
}

/// Numbering style of one page label range.
#[derive(Debug, Clone, Default)]
struct LabelStyle {
    style: Option<u8>,
    prefix: String,
    start: u32,
}

impl LabelStyle {
    fn from_dict(dict: &Dictionary) -> Self {
        let style = match dict.get(b"S") {
            Ok(Object::Name(n)) => n.first().copied(),
            _ => None,
        };
        let prefix = get_string_from_dict(dict, b"P").unwrap_or_default();
        let start = dict
            .get(b"St")
            .ok()
            .and_then(|s| s.as_i64().ok())
            .and_then(|s| u32::try_from(s).ok())
            .filter(|s| *s > 0)
            .unwrap_or(1);
        Self {
            style,
            prefix,
            start,
        }
    }

    /// Label of the page `offset` pages into this range.
    ///
    /// `None` when the number does not fit in a `u32`.
    fn format(&self, offset: u32) -> Option<String> {
        let n = self.start.checked_add(offset)?;
        let number = match self.style {
            Some(b'D') => n.to_string(),
            Some(b'R' | b'r' | b'A' | b'a') if n > MAX_SPELLED_LABEL => n.to_string(),
            Some(b'R') => to_roman(n),
            Some(b'r') => to_roman(n).to_lowercase(),
            Some(b'A') => to_letters(n),
            Some(b'a') => to_letters(n).to_lowercase(),
            _ => String::new(),
        };
        Some(format!("{}{}", self.prefix, number))
    }
}

fn to_roman(mut n: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (value, digits) in TABLE {
        while n >= value {
            out.push_str(digits);
            n -= value;
        }
    }
    out
}

/// A..Z, then AA..ZZ, AAA..ZZZ and so on.
fn to_letters(n: u32) -> String {
    if n == 0 {
        return String::new();
    }
    let letter = (b'A' + ((n - 1) % 26) as u8) as char;
    let repeat = ((n - 1) / 26 + 1) as usize;
    std::iter::repeat(letter).take(repeat).collect()
}

/// Parse `[llx lly urx ury]` into a normalized rectangle.
fn rect_from_array(arr: &[Object]) -> Option<Rect> {
    if arr.len() < 4 {
        return None;
    }
    let mut v = [0f64; 4];
    for (slot, obj) in v.iter_mut().zip(arr) {
        *slot = f64::from(obj.as_float().ok()?);
    }
    let x = v[0].min(v[2]);
    let y = v[1].min(v[3]);
    Some(Rect::new(x, y, (v[2] - v[0]).abs(), (v[3] - v[1]).abs()))
}

/// Decode a PDF text string: UTF-16BE with BOM, UTF-8, or Latin-1.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Helper to get a string from a PDF dictionary.
fn get_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}
