//! File transforms: a LUT file turned into a finalized op chain.

use std::path::{Path, PathBuf};

use chroma_lut::Interpolation;
use chroma_ops::{OpChain, OptimizationLevel, TransformDirection};
use serde::{Deserialize, Serialize};

use crate::{FileCache, FormatRegistry, FormatResult};

/// A reference to a LUT file plus how to apply it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTransform {
    /// Path of the LUT file.
    pub src: PathBuf,
    /// Interpolation used by the LUT ops.
    #[serde(default)]
    pub interpolation: Interpolation,
    /// Direction of this transform, combined with the requested one.
    #[serde(default)]
    pub direction: TransformDirection,
}

impl FileTransform {
    /// Forward, linear transform of `src`.
    pub fn new(src: impl Into<PathBuf>) -> Self {
        Self {
            src: src.into(),
            interpolation: Interpolation::default(),
            direction: TransformDirection::Forward,
        }
    }

    /// Sets the interpolation.
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Sets the direction.
    pub fn with_direction(mut self, direction: TransformDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Path of the LUT file.
    pub fn src(&self) -> &Path {
        &self.src
    }
}

/// Loads `transform.src` through `cache`, builds its ops for `direction`,
/// optimizes at `level` and finalizes the result.
pub fn build_file_ops(
    transform: &FileTransform,
    direction: TransformDirection,
    cache: &FileCache,
    registry: &FormatRegistry,
    level: OptimizationLevel,
) -> FormatResult<OpChain> {
    let format = registry.format_for_path(&transform.src)?;
    let cached = cache.get_or_load(&transform.src, registry)?;

    let mut chain = OpChain::new();
    format
        .build_ops(&mut chain, &cached, transform, direction)
        .inspect_err(|err| {
            tracing::warn!(src = %transform.src.display(), error = %err, "failed to build file ops");
        })?;
    let built = chain.len();
    chain.optimize(level)?;
    chain.finalize()?;

    tracing::debug!(
        src = %transform.src.display(),
        %direction,
        built,
        kept = chain.len(),
        "built file transform"
    );
    Ok(chain)
}
