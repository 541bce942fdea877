//! Op creation helpers.
//!
//! Each helper appends one op for a resolved direction. An unknown
//! direction, or an inverse the data cannot provide, fails with
//! [`OpError::Direction`] and leaves the chain untouched.

use std::sync::Arc;

use chroma_lut::{Interpolation, Lut1D, Lut3D};

use crate::data::{
    FixedFunctionData, FixedFunctionStyle, Lut1DOpData, Lut3DOpData, MatrixData, OpData, RangeData,
};
use crate::{Op, OpChain, OpError, OpResult, TransformDirection};

fn require_known(direction: TransformDirection, what: &str) -> OpResult<()> {
    if direction.is_known() {
        Ok(())
    } else {
        Err(OpError::Direction(format!(
            "Cannot build {what}, unspecified transform direction."
        )))
    }
}

/// Appends a LUT1D op. The inverse requires a monotonic table.
pub fn create_lut1d_op(
    chain: &mut OpChain,
    lut: Arc<Lut1D>,
    interpolation: Interpolation,
    direction: TransformDirection,
) -> OpResult<()> {
    require_known(direction, "LUT1D op")?;
    let data = Lut1DOpData::new(lut, interpolation, direction);
    data.validate()?;
    chain.push(Op::new(OpData::Lut1D(data)))
}

/// Appends a LUT3D op. The inverse requires an interpolation whose
/// inversion is supported.
pub fn create_lut3d_op(
    chain: &mut OpChain,
    lut: Arc<Lut3D>,
    interpolation: Interpolation,
    direction: TransformDirection,
) -> OpResult<()> {
    require_known(direction, "LUT3D op")?;
    let data = Lut3DOpData::new(lut, interpolation, direction);
    data.validate()?;
    chain.push(Op::new(OpData::Lut3D(data)))
}

/// Appends a range remap for the domain `[min, max]`.
///
/// Forward maps the domain onto `[0, 1]`; inverse maps it back.
pub fn create_min_max_op(
    chain: &mut OpChain,
    min: [f64; 3],
    max: [f64; 3],
    direction: TransformDirection,
) -> OpResult<()> {
    require_known(direction, "range op")?;
    let data = RangeData::from_min_max(min, max, direction)?;
    chain.push(Op::new(OpData::Range(data)))
}

/// Appends a fixed-function op; the inverse appends the paired style.
pub fn create_fixed_function_op(
    chain: &mut OpChain,
    style: FixedFunctionStyle,
    params: Vec<f64>,
    direction: TransformDirection,
) -> OpResult<()> {
    require_known(direction, "fixed function op")?;
    let data = FixedFunctionData::new(style, params);
    data.validate()?;
    let data = match direction {
        TransformDirection::Inverse => data.inverse(),
        _ => data,
    };
    chain.push(Op::new(OpData::FixedFunction(data)))
}

/// Appends a matrix op; the inverse appends the analytic inverse.
pub fn create_matrix_op(
    chain: &mut OpChain,
    matrix: [[f64; 3]; 3],
    offset: [f64; 3],
    direction: TransformDirection,
) -> OpResult<()> {
    require_known(direction, "matrix op")?;
    let data = MatrixData::new(matrix, offset);
    data.validate()?;
    let data = match direction {
        TransformDirection::Inverse => data.inverse()?,
        _ => data,
    };
    chain.push(Op::new(OpData::Matrix(data)))
}
