//! Loading options and configuration.

use std::path::{Path, PathBuf};

/// Options for loading a composite document.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Open constituents in parallel
    pub parallel: bool,

    /// Password offered to encrypted constituents
    pub password: Option<String>,

    /// Title of the merged outline root
    pub title: Option<String>,

    /// Directory that relative constituent paths are resolved against
    pub base_dir: Option<PathBuf>,
}

impl LoadOptions {
    /// Create new load options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel loading.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel loading.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set password for encrypted constituents.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the outline root title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the base directory for relative paths.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Resolve a declared constituent path.
    ///
    /// Absolute paths are returned unchanged.
    pub fn resolve_path(&self, declared: &str) -> PathBuf {
        let path = Path::new(declared);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            password: None,
            title: None,
            base_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_options_builder() {
        let options = LoadOptions::new()
            .sequential()
            .with_password("secret")
            .with_title("Binder");

        assert!(!options.parallel);
        assert_eq!(options.password.as_deref(), Some("secret"));
        assert_eq!(options.title.as_deref(), Some("Binder"));
    }

    #[test]
    fn test_default_options() {
        let options = LoadOptions::default();
        assert!(options.parallel);
        assert!(options.password.is_none());
        assert!(options.base_dir.is_none());
    }

    #[test]
    fn test_resolve_path() {
        let options = LoadOptions::new().with_base_dir("/books");
        assert_eq!(options.resolve_path("a.pdf"), PathBuf::from("/books/a.pdf"));
        assert_eq!(
            options.resolve_path("/abs/b.pdf"),
            PathBuf::from("/abs/b.pdf")
        );
        assert_eq!(LoadOptions::new().resolve_path("c.pdf"), PathBuf::from("c.pdf"));
    }
}
