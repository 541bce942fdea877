//! Pipeline settings loaded from YAML.
//!
//! ```yaml
//! optimization: lossless
//! interpolation: tetrahedral
//! bake:
//!   format: iridas_itx
//!   cube_size: 33
//! gpu:
//!   language: glsl_es300
//!   function_name: apply_look
//! ```
//!
//! Every key is optional.

use std::path::{Path, PathBuf};

use chroma_lut::Interpolation;
use chroma_ops::{GpuConfig, GpuShaderDesc, OptimizationLevel, TransformDirection};
use serde::{Deserialize, Serialize};

use crate::{Baker, FileTransform, FormatResult};

/// Bake target settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BakeConfig {
    /// Registered format name.
    pub format: String,
    /// Cube edge; the format default when unset.
    pub cube_size: Option<usize>,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            format: "iridas_itx".into(),
            cube_size: None,
        }
    }
}

/// Settings shared by chain building, baking and shader generation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Optimization applied to built chains.
    pub optimization: OptimizationLevel,
    /// Interpolation for file transforms.
    pub interpolation: Interpolation,
    /// Bake target.
    pub bake: BakeConfig,
    /// Shader naming and language.
    pub gpu: GpuConfig,
}

impl PipelineConfig {
    /// Parses a YAML document.
    pub fn from_yaml_str(yaml: &str) -> FormatResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> FormatResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Serializes back to YAML.
    pub fn to_yaml_string(&self) -> FormatResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Baker for the configured target.
    pub fn baker(&self) -> Baker {
        let baker = Baker::new(self.bake.format.clone());
        match self.bake.cube_size {
            Some(size) => baker.with_cube_size(size),
            None => baker,
        }
    }

    /// Empty shader description using the configured names and language.
    pub fn shader_desc(&self) -> GpuShaderDesc {
        GpuShaderDesc::new(self.gpu.clone())
    }

    /// File transform of `src` using the configured interpolation.
    pub fn file_transform(&self, src: impl Into<PathBuf>, direction: TransformDirection) -> FileTransform {
        FileTransform::new(src)
            .with_interpolation(self.interpolation)
            .with_direction(direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chroma_ops::GpuLanguage;

    #[test]
    fn empty_document_is_default() {
        let config = PipelineConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.bake.format, "iridas_itx");
        assert_eq!(config.optimization, OptimizationLevel::Lossless);
    }

    #[test]
    fn partial_gpu_section() {
        let config = PipelineConfig::from_yaml_str("gpu:\n  language: glsl120\n").unwrap();
        assert_eq!(config.gpu.language, GpuLanguage::Glsl120);
        assert_eq!(config.gpu.pixel_name, GpuConfig::default().pixel_name);
    }
}
