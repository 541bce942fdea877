//! # chroma-ops
//!
//! Color transform ops: the pipeline elements, their combination algebra
//! and the two backends that render them.
//!
//! # Overview
//!
//! - [`TransformDirection`] - forward / inverse / unknown and how they compose
//! - [`OpData`] - tagged payloads: LUT1D, LUT3D, fixed function, range, matrix
//! - [`Op`] - one payload plus identity, inverse and combination queries
//! - [`OpChain`] - ordered ops, optimized then finalized
//! - [`CpuProcessor`] - pure evaluator over packed pixel buffers
//! - [`GpuShaderDesc`] - GLSL text accumulator
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use chroma_lut::{Interpolation, Lut1D};
//! use chroma_ops::{
//!     OpChain, OptimizationLevel, TransformDirection, create_lut1d_op, create_min_max_op,
//! };
//!
//! let curve: Vec<f32> = (0..16)
//!     .flat_map(|i| {
//!         let v = (i as f32 / 15.0).powf(2.0);
//!         [v, v, v]
//!     })
//!     .collect();
//! let lut = Arc::new(Lut1D::from_values(16, curve).unwrap());
//!
//! let mut chain = OpChain::new();
//! create_min_max_op(&mut chain, [0.0; 3], [2.0; 3], TransformDirection::Forward).unwrap();
//! create_lut1d_op(&mut chain, lut, Interpolation::Linear, TransformDirection::Forward).unwrap();
//! chain.optimize(OptimizationLevel::Lossless).unwrap();
//! chain.finalize().unwrap();
//!
//! let rgb = chain.cpu_processor().unwrap().apply_rgb([2.0, 1.0, 0.0]);
//! assert!((rgb[0] - 1.0).abs() < 1e-6);
//! ```
//!
//! # Lifecycle
//!
//! Ops are assembled and optimized while mutable, then
//! [`OpChain::finalize`] validates each payload, resolves derived state
//! (the inverse cube of an inverse LUT3D) and computes cache ids. Rendering
//! an unfinalized op, or mutating a finalized one, is a
//! [`OpError::ContractViolation`].

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod builder;
mod chain;
pub mod cpu;
pub mod data;
mod direction;
mod error;
mod fingerprint;
pub mod gpu;
mod op;

pub use builder::{
    create_fixed_function_op, create_lut1d_op, create_lut3d_op, create_matrix_op,
    create_min_max_op,
};
pub use chain::{OpChain, OptimizationLevel};
pub use cpu::{CpuOp, CpuProcessor};
pub use data::{OpData, OpKind};
pub use direction::{TransformDirection, combine_directions, resolve_direction};
pub use error::{OpError, OpResult};
pub use gpu::{GpuConfig, GpuLanguage, GpuShaderDesc, GpuShaderText, GpuTexture};
pub use op::Op;
