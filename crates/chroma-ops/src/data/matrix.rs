//! Matrix-with-offset op data.

use crate::data::range::fits_f32;
use crate::{OpError, OpResult};

const IDENTITY: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
const TOLERANCE: f64 = 1e-9;

/// `out = matrix * in + offset`, matrix rows applied to RGB columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixData {
    matrix: [[f64; 3]; 3],
    offset: [f64; 3],
}

impl Default for MatrixData {
    fn default() -> Self {
        Self {
            matrix: IDENTITY,
            offset: [0.0; 3],
        }
    }
}

impl MatrixData {
    /// Creates matrix data.
    pub fn new(matrix: [[f64; 3]; 3], offset: [f64; 3]) -> Self {
        Self { matrix, offset }
    }

    /// Pure per-channel scale.
    pub fn scale(scale: [f64; 3]) -> Self {
        let mut m = Self::default();
        for c in 0..3 {
            m.matrix[c][c] = scale[c];
        }
        m
    }

    /// Row-major 3x3 matrix.
    pub fn matrix(&self) -> [[f64; 3]; 3] {
        self.matrix
    }

    /// Offset added after the matrix.
    pub fn offset(&self) -> [f64; 3] {
        self.offset
    }

    /// Fails on non-finite coefficients.
    pub fn validate(&self) -> OpResult<()> {
        let finite = self.matrix.iter().flatten().chain(&self.offset).all(|v| fits_f32(*v));
        if !finite {
            return Err(OpError::Validation(
                "Matrix op has non-finite coefficients".into(),
            ));
        }
        Ok(())
    }

    /// True when the map is the identity within tolerance.
    pub fn is_identity(&self) -> bool {
        self.matrix
            .iter()
            .flatten()
            .zip(IDENTITY.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= TOLERANCE)
            && self.offset.iter().all(|o| o.abs() <= TOLERANCE)
    }

    /// Analytic inverse: `M^-1 * (in - offset)`.
    ///
    /// Fails with [`OpError::Direction`] for a singular matrix.
    pub fn inverse(&self) -> OpResult<Self> {
        let inv = invert_3x3(&self.matrix).ok_or_else(|| {
            OpError::Direction("Cannot invert matrix op, the matrix is singular.".into())
        })?;
        let mut offset = [0.0; 3];
        for (r, row) in inv.iter().enumerate() {
            offset[r] = -(0..3).map(|c| row[c] * self.offset[c]).sum::<f64>();
        }
        Ok(Self { matrix: inv, offset })
    }

    /// Composition: applies `self` first, then `next`.
    pub fn compose(&self, next: &MatrixData) -> Self {
        let mut out = Self::default();
        for r in 0..3 {
            for c in 0..3 {
                out.matrix[r][c] = (0..3).map(|k| next.matrix[r][k] * self.matrix[k][c]).sum();
            }
            out.offset[r] = (0..3)
                .map(|k| next.matrix[r][k] * self.offset[k])
                .sum::<f64>()
                + next.offset[r];
        }
        out
    }

    /// True when applying `other` after `self` is the identity.
    pub fn is_inverse_of(&self, other: &MatrixData) -> bool {
        self.compose(other).is_identity()
    }

    /// Applies the map to one pixel.
    #[inline]
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let v = rgb.map(f64::from);
        let mut out = [0.0f32; 3];
        for (r, row) in self.matrix.iter().enumerate() {
            out[r] = (row[0] * v[0] + row[1] * v[1] + row[2] * v[2] + self.offset[r]) as f32;
        }
        out
    }

    pub(crate) fn cache_id(&self) -> String {
        let m: Vec<String> = self.matrix.iter().flatten().map(f64::to_string).collect();
        let o: Vec<String> = self.offset.iter().map(f64::to_string).collect();
        format!("matrix {} offset {}", m.join(" "), o.join(" "))
    }
}

/// Inverts a 3x3 matrix. Returns None if singular.
fn invert_3x3(m: &[[f64; 3]; 3]) -> Option<[[f64; 3]; 3]> {
    let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);
    if det.abs() < 1e-12 {
        return None;
    }
    let d = 1.0 / det;
    Some([
        [
            (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * d,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * d,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * d,
        ],
        [
            (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * d,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * d,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * d,
        ],
        [
            (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * d,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * d,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * d,
        ],
    ])
}
