//! Extension-based engine lookup.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::detect::extension_of;
use crate::error::{Error, Result};

use super::{CredentialProvider, DocumentEngine, EngineFactory};

/// Registry for engine factories.
///
/// The registry maps file extensions to factories and opens constituent
/// documents with the matching one.
///
/// # Example
///
/// ```no_run
/// use vbkm::engine::{EngineRegistry, NoCredentials};
/// use std::path::Path;
///
/// let registry = EngineRegistry::with_defaults();
/// let engine = registry.open(Path::new("part1.pdf"), &NoCredentials)?;
/// println!("{} pages", engine.page_count());
/// # Ok::<(), vbkm::Error>(())
/// ```
#[derive(Clone)]
pub struct EngineRegistry {
    factories: HashMap<String, Arc<dyn EngineFactory>>,
    by_name: HashMap<String, Arc<dyn EngineFactory>>,
}

impl EngineRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the bundled engines.
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();
        #[cfg(feature = "lopdf-engine")]
        registry.register(Arc::new(super::LopdfEngineFactory::new()));
        registry
    }

    /// Register a factory for all its supported extensions.
    ///
    /// A later registration for the same extension replaces the earlier one.
    pub fn register(&mut self, factory: Arc<dyn EngineFactory>) {
        for ext in factory.supported_extensions() {
            self.factories.insert(ext.to_lowercase(), factory.clone());
        }
        self.by_name.insert(factory.name().to_lowercase(), factory);
    }

    /// Get a factory by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn EngineFactory>> {
        self.factories.get(&ext.to_lowercase()).cloned()
    }

    /// Get a factory by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn EngineFactory>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.factories.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions.
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    /// Open a document with the factory registered for its extension.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedFormat`] when the path has no extension or no
    /// factory handles it; otherwise whatever the factory reports.
    pub fn open(
        &self,
        path: &Path,
        credentials: &dyn CredentialProvider,
    ) -> Result<Box<dyn DocumentEngine>> {
        let ext = extension_of(path).ok_or_else(|| {
            Error::UnsupportedFormat(format!("{} has no extension", path.display()))
        })?;

        let factory = self
            .get_by_extension(&ext)
            .ok_or_else(|| Error::UnsupportedFormat(format!("no engine for .{}", ext)))?;

        log::debug!("Opening {} with {} engine", path.display(), factory.name());
        factory.open(path, credentials)
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.by_name.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        f.debug_struct("EngineRegistry")
            .field("engines", &names)
            .finish()
    }
}
