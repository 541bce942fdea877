//! Op data variants.
//!
//! Each variant validates itself, reports identity and inverse pairing,
//! and contributes the payload part of an op cache id.

mod fixed_function;
mod lut1d;
mod lut3d;
mod matrix;
mod range;

pub use fixed_function::{
    FixedFunctionData, FixedFunctionStyle, REC2100_GAMMA_MAX, REC2100_GAMMA_MIN,
};
pub use lut1d::Lut1DOpData;
pub use lut3d::Lut3DOpData;
pub use matrix::MatrixData;
pub use range::RangeData;

use std::fmt;

/// Tagged op payload.
#[derive(Debug, Clone)]
pub enum OpData {
    /// Per-channel 1D table.
    Lut1D(Lut1DOpData),
    /// RGB cube.
    Lut3D(Lut3DOpData),
    /// Named closed-form function.
    FixedFunction(FixedFunctionData),
    /// Per-channel affine domain remap.
    Range(RangeData),
    /// 3x3 matrix with offset.
    Matrix(MatrixData),
}

/// Discriminant of [`OpData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// [`OpData::Lut1D`]
    Lut1D,
    /// [`OpData::Lut3D`]
    Lut3D,
    /// [`OpData::FixedFunction`]
    FixedFunction,
    /// [`OpData::Range`]
    Range,
    /// [`OpData::Matrix`]
    Matrix,
}

impl OpKind {
    /// Name used in cache ids and logs.
    pub fn name(self) -> &'static str {
        match self {
            OpKind::Lut1D => "Lut1DOp",
            OpKind::Lut3D => "Lut3DOp",
            OpKind::FixedFunction => "FixedFunctionOp",
            OpKind::Range => "RangeOp",
            OpKind::Matrix => "MatrixOffsetOp",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl OpData {
    /// Variant discriminant.
    pub fn kind(&self) -> OpKind {
        match self {
            OpData::Lut1D(_) => OpKind::Lut1D,
            OpData::Lut3D(_) => OpKind::Lut3D,
            OpData::FixedFunction(_) => OpKind::FixedFunction,
            OpData::Range(_) => OpKind::Range,
            OpData::Matrix(_) => OpKind::Matrix,
        }
    }
}
