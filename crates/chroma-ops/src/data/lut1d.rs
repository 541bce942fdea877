//! LUT1D op data.

use std::sync::Arc;

use chroma_lut::{Interpolation, Lut1D};

use crate::data::RangeData;
use crate::fingerprint::digest_f32;
use crate::{OpError, OpResult, TransformDirection};

/// A shared 1D table plus the op's own interpolation and direction.
///
/// The table may be shared with a file cache entry and is never mutated
/// through the op.
#[derive(Debug, Clone)]
pub struct Lut1DOpData {
    lut: Arc<Lut1D>,
    interpolation: Interpolation,
    direction: TransformDirection,
}

impl Lut1DOpData {
    /// Wraps a shared table.
    pub fn new(lut: Arc<Lut1D>, interpolation: Interpolation, direction: TransformDirection) -> Self {
        Self {
            lut,
            interpolation,
            direction,
        }
    }

    /// The shared table.
    pub fn lut(&self) -> &Arc<Lut1D> {
        &self.lut
    }

    /// Interpolation used for forward evaluation.
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub(crate) fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    /// Evaluation direction.
    pub fn direction(&self) -> TransformDirection {
        self.direction
    }

    /// Samples must be finite and the direction known; the inverse needs a
    /// monotonic table.
    pub fn validate(&self) -> OpResult<()> {
        if self.lut.values().iter().any(|v| !v.is_finite()) {
            return Err(OpError::Validation("LUT1D op has non-finite samples.".into()));
        }
        match self.direction {
            TransformDirection::Unknown => Err(OpError::Direction(
                "Cannot build LUT1D op, unspecified transform direction.".into(),
            )),
            TransformDirection::Inverse if !self.lut.is_invertible() => Err(OpError::Direction(
                "Cannot invert LUT1D op, the table is not monotonically increasing.".into(),
            )),
            _ => Ok(()),
        }
    }

    /// True when the op reduces to a clamp to `[0, 1]`: an identity table
    /// read with a non-nearest interpolation. Nearest snaps to grid points.
    pub fn is_clamp_only(&self) -> bool {
        self.interpolation != Interpolation::Nearest && self.lut.is_identity()
    }

    /// Same table (shared or equal samples) evaluated in opposite directions.
    /// Nearest lookups never pair.
    pub fn is_inverse_of(&self, other: &Lut1DOpData) -> bool {
        self.interpolation != Interpolation::Nearest
            && other.interpolation != Interpolation::Nearest
            && self.direction.is_known()
            && other.direction == self.direction.inverse()
            && (Arc::ptr_eq(&self.lut, &other.lut) || self.lut.values() == other.lut.values())
    }

    /// What this op followed by its inverse still does. Forward lookups clamp
    /// input to `[0, 1]`; inverse ones clamp to the first and last samples.
    pub fn inverse_pair_clamp(&self) -> RangeData {
        match self.direction {
            TransformDirection::Inverse => {
                let values = self.lut.values();
                let last = 3 * (self.lut.length() - 1);
                let lower = [0, 1, 2].map(|c| values[c] as f64);
                let upper = [0, 1, 2].map(|c| values[last + c] as f64);
                RangeData::clamp(lower, upper)
            }
            _ => RangeData::clamp([0.0; 3], [1.0; 3]),
        }
    }

    /// Evaluates one pixel.
    #[inline]
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        match self.direction {
            TransformDirection::Inverse => self.lut.apply_inverse_rgb(rgb),
            _ => self.lut.eval_rgb(rgb, self.interpolation),
        }
    }

    pub(crate) fn cache_id(&self) -> String {
        format!(
            "{} {} {}",
            digest_f32(&[self.lut.length()], self.lut.values()),
            self.interpolation.as_str(),
            self.direction
        )
    }
}
