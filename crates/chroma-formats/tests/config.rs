//! Pipeline config loading and use.

use std::fs;

use chroma_formats::{FileCache, FormatError, FormatRegistry, PipelineConfig, build_file_ops};
use chroma_lut::Interpolation;
use chroma_ops::{GpuLanguage, OptimizationLevel, TransformDirection};
use tempfile::TempDir;

const CONFIG: &str = "\
optimization: none
interpolation: nearest
bake:
  cube_size: 3
gpu:
  language: glsl_es300
  function_name: apply_look
  pixel_name: look
";

#[test]
fn loads_every_section() {
    let config = PipelineConfig::from_yaml_str(CONFIG).unwrap();
    assert_eq!(config.optimization, OptimizationLevel::None);
    assert_eq!(config.interpolation, Interpolation::Nearest);
    assert_eq!(config.bake.format, "iridas_itx");
    assert_eq!(config.bake.cube_size, Some(3));
    assert_eq!(config.gpu.language, GpuLanguage::GlslEs300);
    assert_eq!(config.gpu.resource_prefix, "chroma_");
}

#[test]
fn round_trips_through_yaml() {
    let config = PipelineConfig::from_yaml_str(CONFIG).unwrap();
    let yaml = config.to_yaml_string().unwrap();
    assert_eq!(PipelineConfig::from_yaml_str(&yaml).unwrap(), config);
}

#[test]
fn bad_value_is_a_config_error() {
    let err = PipelineConfig::from_yaml_str("optimization: aggressive\n").unwrap_err();
    assert!(matches!(err, FormatError::Config(_)));
}

#[test]
fn drives_building_baking_and_shaders() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("pipeline.yaml");
    fs::write(&config_path, CONFIG).unwrap();
    let lut_path = dir.path().join("flat.spi1d");
    fs::write(
        &lut_path,
        "Version 1\nLength 2\nComponents 1\n{\n0.0\n1.0\n}\n",
    )
    .unwrap();

    let config = PipelineConfig::from_file(&config_path).unwrap();
    let transform = config.file_transform(&lut_path, TransformDirection::Forward);
    assert_eq!(transform.interpolation, Interpolation::Nearest);

    let chain = build_file_ops(
        &transform,
        TransformDirection::Forward,
        &FileCache::new(),
        FormatRegistry::global(),
        config.optimization,
    )
    .unwrap();
    // Level none keeps the identity range and curve.
    assert_eq!(chain.len(), 2);

    let baked = config.baker().bake(&chain.cpu_processor().unwrap()).unwrap();
    assert!(baked.starts_with("LUT_3D_SIZE 3\n"));

    let mut desc = config.shader_desc();
    chain.extract_gpu_shader_info(&mut desc).unwrap();
    let text = desc.shader_text();
    assert!(text.starts_with("#version 300 es"));
    assert!(text.contains("vec4 apply_look(in vec4 inPixel)"));
    assert!(text.contains("vec4 look = inPixel;"));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = PipelineConfig::from_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, FormatError::Io(_)));
}
