//! Thread-safe per-path cache of parsed LUT files.
//!
//! Each path gets its own slot. The map lock is held only long enough to
//! fetch or create a slot; the slot lock serializes the first parse, so a
//! file is parsed successfully at most once even when many threads ask for
//! it at the same time. Failed parses leave the slot empty and the next
//! caller retries.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use chroma_formats::{FileCache, FormatRegistry};
//!
//! let cache = FileCache::global();
//! let first = cache.get_or_load(Path::new("looks/film.spi1d"), FormatRegistry::global())?;
//! let again = cache.get_or_load(Path::new("looks/film.spi1d"), FormatRegistry::global())?;
//! assert!(std::sync::Arc::ptr_eq(&first, &again));
//! # Ok::<(), chroma_formats::FormatError>(())
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::format::CachedFile;
use crate::{FormatRegistry, FormatResult};

type Slot = Arc<Mutex<Option<Arc<CachedFile>>>>;

/// Parsed LUT files keyed by path.
#[derive(Debug, Default)]
pub struct FileCache {
    slots: Mutex<HashMap<PathBuf, Slot>>,
}

impl FileCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache.
    pub fn global() -> &'static FileCache {
        static INSTANCE: OnceLock<FileCache> = OnceLock::new();
        INSTANCE.get_or_init(FileCache::new)
    }

    /// Returns the cached entry for `path`, parsing the file on first use
    /// with the format its extension selects.
    pub fn get_or_load(&self, path: &Path, registry: &FormatRegistry) -> FormatResult<Arc<CachedFile>> {
        self.get_or_insert_with(path, || {
            let format = registry.format_for_path(path)?;
            let file = File::open(path)?;
            let mut reader = BufReader::new(file);
            format.read(&mut reader, &path.display().to_string())
        })
    }

    /// Returns the cached entry for `path`, running `load` if there is none.
    ///
    /// Concurrent callers for the same path wait for the first one; callers
    /// for other paths are not blocked.
    pub fn get_or_insert_with<F>(&self, path: &Path, load: F) -> FormatResult<Arc<CachedFile>>
    where
        F: FnOnce() -> FormatResult<CachedFile>,
    {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(path.to_path_buf()).or_default())
        };

        let mut entry = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = entry.as_ref() {
            return Ok(Arc::clone(cached));
        }

        match load() {
            Ok(parsed) => {
                tracing::debug!(path = %path.display(), kind = parsed.kind_name(), "cached LUT file");
                let cached = Arc::new(parsed);
                *entry = Some(Arc::clone(&cached));
                Ok(cached)
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to load LUT file");
                Err(err)
            }
        }
    }

    /// Returns the entry for `path` if it has been parsed.
    pub fn get(&self, path: &Path) -> Option<Arc<CachedFile>> {
        let slot = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.get(path).cloned()
        }?;
        let entry = slot.lock().unwrap_or_else(PoisonError::into_inner);
        entry.clone()
    }

    /// True when `path` has a parsed entry.
    pub fn contains(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }

    /// Number of parsed entries.
    pub fn len(&self) -> usize {
        let slots: Vec<Slot> = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.values().cloned().collect()
        };
        slots
            .iter()
            .filter(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).is_some())
            .count()
    }

    /// True when nothing has been parsed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry. Ops already built keep their shared LUT data.
    pub fn clear(&self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(entries = slots.len(), "clearing LUT file cache");
        slots.clear();
    }
}
