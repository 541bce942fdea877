//! # chroma-formats
//!
//! LUT file formats for chroma op chains: parsing, a shared per-path file
//! cache, op building for file transforms and baking.
//!
//! # Supported Formats
//!
//! | Name | Extension | Read | Bake |
//! |------|-----------|------|------|
//! | `iridas_itx` | `.itx` | yes | yes |
//! | `spi1d` | `.spi1d` | yes | no |
//!
//! # Example
//!
//! ```rust
//! use chroma_formats::{FileFormat, iridas_itx::IridasItx};
//! use chroma_ops::{OpChain, TransformDirection};
//! use chroma_formats::FileTransform;
//!
//! let text = "LUT_3D_SIZE 2\n\
//!     0 0 0\n1 0 0\n0 1 0\n1 1 0\n0 0 1\n1 0 1\n0 1 1\n1 1 1\n";
//! let cached = IridasItx.read(&mut text.as_bytes(), "identity.itx").unwrap();
//!
//! let mut chain = OpChain::new();
//! IridasItx
//!     .build_ops(&mut chain, &cached, &FileTransform::new("identity.itx"), TransformDirection::Forward)
//!     .unwrap();
//! assert_eq!(chain.len(), 1);
//! ```
//!
//! Whole files go through [`build_file_ops`], which loads via a
//! [`FileCache`], builds, optimizes and finalizes in one call.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod baker;
mod cache;
mod config;
mod error;
mod file_transform;
mod format;
pub mod iridas_itx;
mod registry;
pub mod spi1d;

pub use baker::Baker;
pub use cache::FileCache;
pub use config::{BakeConfig, PipelineConfig};
pub use error::{FormatError, FormatResult, ParseError};
pub use file_transform::{FileTransform, build_file_ops};
pub use format::{BakeOptions, CachedFile, FileFormat, FormatCapabilities, FormatInfo};
pub use registry::FormatRegistry;
