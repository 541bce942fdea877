//! Format registry for name and extension lookup.
//!
//! The global registry is built once via [`FormatRegistry::global()`] with
//! the built-in formats registered.
//!
//! # Example
//!
//! ```rust
//! use chroma_formats::FormatRegistry;
//!
//! let registry = FormatRegistry::global();
//! assert!(registry.get_by_extension("ITX").is_some());
//! assert!(registry.capabilities("iridas_itx").unwrap().can_bake);
//! assert!(!registry.capabilities("spi1d").unwrap().can_bake);
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::format::{FileFormat, FormatCapabilities, FormatInfo};
use crate::iridas_itx::IridasItx;
use crate::spi1d::Spi1D;
use crate::{FormatError, FormatResult};

struct Entry {
    info: FormatInfo,
    format: Arc<dyn FileFormat>,
}

/// Central table of LUT file formats.
#[derive(Default)]
pub struct FormatRegistry {
    formats: Vec<Entry>,
    by_name: HashMap<String, usize>,
    by_extension: HashMap<String, usize>,
}

impl FormatRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in formats.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(IridasItx));
        registry.register(Arc::new(Spi1D));
        registry
    }

    /// Returns the global registry instance with built-in formats.
    pub fn global() -> &'static FormatRegistry {
        static INSTANCE: OnceLock<FormatRegistry> = OnceLock::new();
        INSTANCE.get_or_init(FormatRegistry::with_builtins)
    }

    /// Registers every entry a format reports. Later registrations replace
    /// earlier ones with the same name or extension.
    pub fn register(&mut self, format: Arc<dyn FileFormat>) {
        for info in format.format_info() {
            let index = self.formats.len();
            self.by_name.insert(info.name.to_ascii_lowercase(), index);
            self.by_extension.insert(info.extension.to_ascii_lowercase(), index);
            self.formats.push(Entry {
                info,
                format: Arc::clone(&format),
            });
            tracing::trace!(name = info.name, extension = info.extension, "registered LUT format");
        }
    }

    /// Looks up a format by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&dyn FileFormat> {
        self.entry(&self.by_name, name).map(|e| e.format.as_ref())
    }

    /// Looks up a format by file extension (without the dot), ignoring case.
    pub fn get_by_extension(&self, extension: &str) -> Option<&dyn FileFormat> {
        self.entry(&self.by_extension, extension).map(|e| e.format.as_ref())
    }

    /// Picks the format for a file from its extension.
    pub fn format_for_path(&self, path: &Path) -> FormatResult<&dyn FileFormat> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.get_by_extension(ext))
            .ok_or_else(|| FormatError::UnknownFormat(path.display().to_string()))
    }

    /// Capabilities of the named format.
    pub fn capabilities(&self, name: &str) -> Option<FormatCapabilities> {
        self.entry(&self.by_name, name).map(|e| e.info.capabilities)
    }

    /// Every registered entry, in registration order.
    pub fn formats(&self) -> Vec<FormatInfo> {
        self.formats.iter().map(|e| e.info).collect()
    }

    fn entry(&self, index: &HashMap<String, usize>, key: &str) -> Option<&Entry> {
        index
            .get(&key.to_ascii_lowercase())
            .and_then(|&i| self.formats.get(i))
    }
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("formats", &self.formats())
            .finish()
    }
}
