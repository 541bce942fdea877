//! Interpolation methods and output precision tags.

use serde::{Deserialize, Serialize};

/// Interpolation method for LUT evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Nearest neighbor (no interpolation).
    Nearest,

    /// Linear interpolation (1D) / Trilinear (3D).
    #[default]
    Linear,

    /// Tetrahedral interpolation (3D only, 1D tables fall back to linear).
    Tetrahedral,
}

impl Interpolation {
    /// Short lowercase name, used in cache ids and config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Interpolation::Nearest => "nearest",
            Interpolation::Linear => "linear",
            Interpolation::Tetrahedral => "tetrahedral",
        }
    }
}

/// Output precision tag carried by a LUT.
///
/// Tables produced by the text formats are always [`BitDepth::F32`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BitDepth {
    /// 8-bit unsigned integer.
    UInt8,
    /// 10-bit unsigned integer.
    UInt10,
    /// 12-bit unsigned integer.
    UInt12,
    /// 16-bit unsigned integer.
    UInt16,
    /// 16-bit half float.
    F16,
    /// 32-bit float.
    #[default]
    F32,
}

impl BitDepth {
    /// Short name, used in cache ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            BitDepth::UInt8 => "8ui",
            BitDepth::UInt10 => "10ui",
            BitDepth::UInt12 => "12ui",
            BitDepth::UInt16 => "16ui",
            BitDepth::F16 => "16f",
            BitDepth::F32 => "32f",
        }
    }
}
