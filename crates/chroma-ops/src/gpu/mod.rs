//! GPU backend: GLSL text generation.
//!
//! Every finalized op appends a self-contained fragment to a shared
//! [`GpuShaderDesc`]. Fragments read and write one working `vec4` (by
//! default `outColor`) and run top to bottom, so the rendered function is
//! equivalent to running the CPU evaluators of the same chain in order.
//!
//! # Example
//!
//! ```rust
//! use chroma_ops::{GpuShaderDesc, OpChain, TransformDirection, create_min_max_op};
//!
//! let mut chain = OpChain::new();
//! create_min_max_op(&mut chain, [0.0; 3], [2.0; 3], TransformDirection::Forward).unwrap();
//! chain.finalize().unwrap();
//!
//! let mut desc = GpuShaderDesc::default();
//! chain.extract_gpu_shader_info(&mut desc).unwrap();
//! let glsl = desc.shader_text();
//! assert!(glsl.starts_with("#version 330 core"));
//! assert!(glsl.contains("vec4 chroma_transform(in vec4 inPixel)"));
//! ```

mod affine;
mod fixed_function;
mod lut;

use std::fmt::Write;

use serde::{Deserialize, Serialize};

pub(crate) use affine::{emit_matrix, emit_range};
pub(crate) use fixed_function::emit_fixed_function;
pub(crate) use lut::{emit_lut1d, emit_lut3d};

/// Target shader language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GpuLanguage {
    /// GLSL 1.20 (OpenGL 2.1)
    Glsl120,
    /// GLSL 3.30 (OpenGL 3.3)
    #[default]
    Glsl330,
    /// GLSL 4.00 (OpenGL 4.0)
    Glsl400,
    /// GLSL ES 3.00 (WebGL 2.0)
    GlslEs300,
}

impl GpuLanguage {
    /// Returns the version directive for this language.
    pub fn version_directive(&self) -> &'static str {
        match self {
            GpuLanguage::Glsl120 => "#version 120",
            GpuLanguage::Glsl330 => "#version 330 core",
            GpuLanguage::Glsl400 => "#version 400 core",
            GpuLanguage::GlslEs300 => "#version 300 es\nprecision highp float;",
        }
    }

    /// 2D texture lookup function.
    pub fn texture_2d(&self) -> &'static str {
        match self {
            GpuLanguage::Glsl120 => "texture2D",
            _ => "texture",
        }
    }

    /// 3D texture lookup function.
    pub fn texture_3d(&self) -> &'static str {
        match self {
            GpuLanguage::Glsl120 => "texture3D",
            _ => "texture",
        }
    }
}

/// Texture shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuTextureType {
    /// `width x 1` texture holding a 1D table.
    Texture2D,
    /// Cube texture holding a 3D table.
    Texture3D,
}

impl GpuTextureType {
    fn sampler(self) -> &'static str {
        match self {
            GpuTextureType::Texture2D => "sampler2D",
            GpuTextureType::Texture3D => "sampler3D",
        }
    }
}

/// Texture filtering the host must configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuInterpolation {
    /// Nearest neighbor.
    Nearest,
    /// Hardware linear filtering.
    #[default]
    Linear,
}

/// A texture the host must upload before running the shader.
#[derive(Debug, Clone)]
pub struct GpuTexture {
    /// Sampler uniform name.
    pub name: String,
    /// Texture type.
    pub texture_type: GpuTextureType,
    /// Texture width.
    pub width: u32,
    /// Texture height.
    pub height: u32,
    /// Texture depth (1 for 2D textures).
    pub depth: u32,
    /// Interleaved RGB f32 texels, x fastest.
    pub data: Vec<f32>,
    /// Filtering mode.
    pub interpolation: GpuInterpolation,
}

/// Naming and language settings for generated shaders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuConfig {
    /// Target language.
    pub language: GpuLanguage,
    /// Name of the generated function.
    pub function_name: String,
    /// Name of the working pixel variable.
    pub pixel_name: String,
    /// Prefix for every generated resource name.
    pub resource_prefix: String,
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            language: GpuLanguage::default(),
            function_name: "chroma_transform".into(),
            pixel_name: "outColor".into(),
            resource_prefix: "chroma_".into(),
        }
    }
}

/// Indentation-aware text builder for one op fragment.
#[derive(Debug, Clone)]
pub struct GpuShaderText {
    language: GpuLanguage,
    indent: usize,
    text: String,
}

impl GpuShaderText {
    const INDENT: &'static str = "    ";

    /// Starts an empty fragment at indentation level zero.
    pub fn new(language: GpuLanguage) -> Self {
        Self {
            language,
            indent: 0,
            text: String::new(),
        }
    }

    /// Target language.
    pub fn language(&self) -> GpuLanguage {
        self.language
    }

    /// Opens one indentation level.
    pub fn indent(&mut self) {
        self.indent += 1;
    }

    /// Closes one indentation level.
    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Current indentation level.
    pub fn level(&self) -> usize {
        self.indent
    }

    /// Appends one line at the current indentation.
    pub fn line(&mut self, line: impl AsRef<str>) {
        for _ in 0..self.indent {
            self.text.push_str(Self::INDENT);
        }
        self.text.push_str(line.as_ref());
        self.text.push('\n');
    }

    /// Accumulated text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consumes the builder and returns the text.
    pub fn into_string(self) -> String {
        self.text
    }
}

/// Shader accumulator shared by all ops of a chain.
#[derive(Debug, Clone, Default)]
pub struct GpuShaderDesc {
    config: GpuConfig,
    declarations: Vec<String>,
    body: String,
    textures: Vec<GpuTexture>,
    next_index: usize,
}

impl GpuShaderDesc {
    /// Creates an empty accumulator.
    pub fn new(config: GpuConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Naming and language settings.
    pub fn config(&self) -> &GpuConfig {
        &self.config
    }

    /// Target language.
    pub fn language(&self) -> GpuLanguage {
        self.config.language
    }

    /// Working pixel variable.
    pub fn pixel_name(&self) -> &str {
        &self.config.pixel_name
    }

    /// Generated function name.
    pub fn function_name(&self) -> &str {
        &self.config.function_name
    }

    /// Returns a resource name unique within this shader.
    pub fn unique_name(&mut self, base: &str) -> String {
        let name = format!("{}{}_{}", self.config.resource_prefix, base, self.next_index);
        self.next_index += 1;
        name
    }

    /// Declares a `const vec3` and returns its name.
    pub fn add_vec3_constant(&mut self, base: &str, value: [f32; 3]) -> String {
        let name = self.unique_name(base);
        self.declarations
            .push(format!("const vec3 {name} = {};", vec3(value)));
        name
    }

    /// Declares a `const mat3` from a row-major matrix and returns its name.
    pub fn add_mat3_constant(&mut self, base: &str, rows: [[f32; 3]; 3]) -> String {
        let name = self.unique_name(base);
        // GLSL constructors fill columns
        let mut cols = Vec::with_capacity(9);
        for c in 0..3 {
            for row in &rows {
                cols.push(float(row[c]));
            }
        }
        self.declarations
            .push(format!("const mat3 {name} = mat3({});", cols.join(", ")));
        name
    }

    /// Registers a texture and declares its sampler uniform.
    pub fn add_texture(&mut self, texture: GpuTexture) -> String {
        let name = texture.name.clone();
        self.declarations
            .push(format!("uniform {} {name};", texture.texture_type.sampler()));
        self.textures.push(texture);
        name
    }

    /// Appends an already indented fragment to the function body.
    pub fn add_to_function_body(&mut self, fragment: &str) {
        self.body.push_str(fragment);
    }

    /// Starts a fragment at function-body indentation.
    pub fn new_text(&self) -> GpuShaderText {
        let mut st = GpuShaderText::new(self.config.language);
        st.indent();
        st
    }

    /// Declarations in insertion order.
    pub fn declarations(&self) -> &[String] {
        &self.declarations
    }

    /// Accumulated function body.
    pub fn function_body(&self) -> &str {
        &self.body
    }

    /// Textures to upload.
    pub fn textures(&self) -> &[GpuTexture] {
        &self.textures
    }

    /// Renders the complete shader text.
    pub fn shader_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.config.language.version_directive());
        out.push('\n');
        for decl in &self.declarations {
            let _ = writeln!(out, "{decl}");
        }
        if !self.declarations.is_empty() {
            out.push('\n');
        }
        let px = &self.config.pixel_name;
        let _ = writeln!(out, "vec4 {}(in vec4 inPixel)", self.config.function_name);
        out.push_str("{\n");
        let _ = writeln!(out, "    vec4 {px} = inPixel;");
        out.push_str(&self.body);
        let _ = writeln!(out, "    return {px};");
        out.push_str("}\n");
        out
    }
}

/// GLSL float literal.
pub(crate) fn float(v: f32) -> String {
    format!("{v:?}")
}

/// GLSL vec3 literal.
pub(crate) fn vec3(v: [f32; 3]) -> String {
    format!("vec3({}, {}, {})", float(v[0]), float(v[1]), float(v[2]))
}
