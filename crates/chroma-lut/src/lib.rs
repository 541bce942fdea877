//! # chroma-lut
//!
//! Lookup table (LUT) data model for color op pipelines.
//!
//! This crate provides value types for 1D and 3D LUTs together with their
//! shape invariants, interpolation modes and inverse evaluation.
//!
//! # LUT Types
//!
//! - [`Lut1D`] - per-channel curves, `3 * length` interleaved samples
//! - [`Lut3D`] - full RGB cube, `3 * N^3` samples in red-fastest order
//!
//! # Usage
//!
//! ```rust
//! use chroma_lut::{Interpolation, Lut1D, Lut3D, LutError};
//!
//! // A 2-entry identity ramp
//! let ramp = Lut1D::from_values(2, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
//! assert!(ramp.is_identity());
//!
//! // Shape is validated at construction
//! let err = Lut3D::from_values(2, vec![0.0; 21]).unwrap_err();
//! assert_eq!(err, LutError::ShapeMismatch { expected: 24, actual: 21 });
//!
//! // Interpolation only affects lookup, never the samples
//! let cube = Lut3D::identity(33).unwrap().with_interpolation(Interpolation::Tetrahedral);
//! let rgb = cube.apply([0.5, 0.3, 0.2]);
//! ```
//!
//! # Inversion
//!
//! - 1D tables invert exactly per channel when monotonic
//!   ([`Lut1D::is_invertible`], [`Lut1D::apply_inverse_rgb`])
//! - 3D tables advertise a [`Lut3DInversion`] capability; when supported,
//!   [`Lut3D::invert`] builds an inverse cube by numerical search
//!
//! # Used By
//!
//! - `chroma-ops` - op data and CPU/GPU backends
//! - `chroma-formats` - file format adapters

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod interp;
pub mod lut1d;
pub mod lut3d;

pub use error::{LutError, LutResult};
pub use interp::{BitDepth, Interpolation};
pub use lut1d::{Lut1D, inverse_search_steps};
pub use lut3d::{Lut3D, Lut3DInversion, identity_grid};
