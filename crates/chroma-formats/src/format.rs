//! The contract every LUT file format implements.

use std::io::BufRead;
use std::sync::Arc;

use chroma_lut::{Lut1D, Lut3D};
use chroma_ops::{CpuProcessor, OpChain, TransformDirection};

use crate::{FileTransform, FormatError, FormatResult};

/// What a registered format can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatCapabilities {
    /// Files can be parsed into a [`CachedFile`].
    pub can_read: bool,
    /// Transforms can be baked into this format.
    pub can_bake: bool,
}

/// Registry entry describing one format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    /// Lookup name, e.g. `iridas_itx`.
    pub name: &'static str,
    /// File extension without the dot.
    pub extension: &'static str,
    /// Supported operations.
    pub capabilities: FormatCapabilities,
}

/// Parsed contents of one LUT file, shared through the file cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedFile {
    /// A per-channel curve over the input domain `[from_min, from_max]`.
    Lut1D {
        /// Curve samples.
        lut: Arc<Lut1D>,
        /// Lower bound of the input domain.
        from_min: f64,
        /// Upper bound of the input domain.
        from_max: f64,
    },
    /// A full RGB cube over `[0, 1]`.
    Lut3D {
        /// Cube samples.
        lut: Arc<Lut3D>,
    },
}

impl CachedFile {
    /// Short label for logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            CachedFile::Lut1D { .. } => "lut1d",
            CachedFile::Lut3D { .. } => "lut3d",
        }
    }
}

/// Options passed to [`FileFormat::bake`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BakeOptions {
    /// Edge length of the baked cube; the format picks a default when unset.
    pub cube_size: Option<usize>,
}

/// A LUT file format: a parser, an op builder and optionally a baker.
///
/// Implementations own every text quirk of their format. The rest of the
/// pipeline only sees validated [`CachedFile`] entries.
pub trait FileFormat: Send + Sync {
    /// Names, extensions and capabilities this format registers under.
    fn format_info(&self) -> Vec<FormatInfo>;

    /// Parses a whole file. Aborts on the first malformed line.
    fn read(&self, reader: &mut dyn BufRead, source_name: &str) -> FormatResult<CachedFile>;

    /// Appends the ops for `cached` to `chain`.
    ///
    /// `direction` is combined with the transform's own direction; an
    /// unknown result fails without touching the chain.
    fn build_ops(
        &self,
        chain: &mut OpChain,
        cached: &CachedFile,
        transform: &FileTransform,
        direction: TransformDirection,
    ) -> FormatResult<()>;

    /// Renders `processor` into this format's text.
    fn bake(&self, _processor: &CpuProcessor, _options: &BakeOptions) -> FormatResult<String> {
        let name = self
            .format_info()
            .first()
            .map_or("this format", |info| info.name);
        Err(FormatError::Unsupported(format!("{name} cannot bake")))
    }
}
