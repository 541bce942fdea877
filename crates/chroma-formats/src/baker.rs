//! Baking processors into LUT files.

use chroma_ops::CpuProcessor;

use crate::format::BakeOptions;
use crate::{FormatError, FormatRegistry, FormatResult};

/// Renders a processor into the text of a bake-capable format.
///
/// ```rust
/// use chroma_formats::Baker;
/// use chroma_ops::{OpChain, TransformDirection, create_min_max_op};
///
/// let mut chain = OpChain::new();
/// create_min_max_op(&mut chain, [0.0; 3], [1.0; 3], TransformDirection::Forward).unwrap();
/// chain.finalize().unwrap();
///
/// let text = Baker::new("iridas_itx")
///     .with_cube_size(2)
///     .bake(&chain.cpu_processor().unwrap())
///     .unwrap();
/// assert!(text.starts_with("LUT_3D_SIZE 2\n0.000000 0.000000 0.000000\n"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Baker {
    format_name: String,
    cube_size: Option<usize>,
}

impl Baker {
    /// Baker for the named format with its default cube size.
    pub fn new(format_name: impl Into<String>) -> Self {
        Self {
            format_name: format_name.into(),
            cube_size: None,
        }
    }

    /// Sets the cube edge length. Sizes below 2 bake as 2; the format
    /// rejects sizes above its maximum.
    pub fn with_cube_size(mut self, size: usize) -> Self {
        self.cube_size = Some(size);
        self
    }

    /// Target format name.
    pub fn format_name(&self) -> &str {
        &self.format_name
    }

    /// Requested cube edge, if any.
    pub fn cube_size(&self) -> Option<usize> {
        self.cube_size
    }

    /// Bakes using the global registry.
    pub fn bake(&self, processor: &CpuProcessor) -> FormatResult<String> {
        self.bake_with(processor, FormatRegistry::global())
    }

    /// Bakes using `registry` to find the format.
    pub fn bake_with(&self, processor: &CpuProcessor, registry: &FormatRegistry) -> FormatResult<String> {
        let format = registry
            .get(&self.format_name)
            .ok_or_else(|| FormatError::UnknownFormat(self.format_name.clone()))?;
        let can_bake = registry
            .capabilities(&self.format_name)
            .is_some_and(|caps| caps.can_bake);
        if !can_bake {
            return Err(FormatError::Unsupported(format!(
                "{} cannot bake",
                self.format_name
            )));
        }
        let options = BakeOptions {
            cube_size: self.cube_size,
        };
        format.bake(processor, &options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_only_format_refuses() {
        let processor = CpuProcessor::new(Vec::new(), String::new());
        let err = Baker::new("spi1d").bake(&processor).unwrap_err();
        assert!(matches!(err, FormatError::Unsupported(_)));
        let err = Baker::new("csp").bake(&processor).unwrap_err();
        assert!(matches!(err, FormatError::UnknownFormat(_)));
    }
}
