//! LUT3D op data.

use std::sync::Arc;

use chroma_lut::{Interpolation, Lut3D, Lut3DInversion};

use crate::data::RangeData;
use crate::fingerprint::digest_f32;
use crate::{OpError, OpResult, TransformDirection};

/// A shared 3D table plus the op's own interpolation and direction.
///
/// Inverse ops resolve an inverse cube at finalize time; both backends
/// evaluate that cube forward.
#[derive(Debug, Clone)]
pub struct Lut3DOpData {
    lut: Arc<Lut3D>,
    interpolation: Interpolation,
    direction: TransformDirection,
    inverse_grid: Option<Arc<Lut3D>>,
}

impl Lut3DOpData {
    /// Wraps a shared table.
    pub fn new(lut: Arc<Lut3D>, interpolation: Interpolation, direction: TransformDirection) -> Self {
        Self {
            lut,
            interpolation,
            direction,
            inverse_grid: None,
        }
    }

    /// The shared table.
    pub fn lut(&self) -> &Arc<Lut3D> {
        &self.lut
    }

    /// Interpolation used for evaluation.
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub(crate) fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
        self.inverse_grid = None;
    }

    /// Evaluation direction.
    pub fn direction(&self) -> TransformDirection {
        self.direction
    }

    /// Inversion capability of this op's interpolation.
    pub fn inversion(&self) -> Lut3DInversion {
        Lut3DInversion::for_interpolation(self.interpolation)
    }

    /// Samples must be finite and the direction known; the inverse needs a
    /// supported inversion.
    pub fn validate(&self) -> OpResult<()> {
        if self.lut.values().iter().any(|v| !v.is_finite()) {
            return Err(OpError::Validation("LUT3D op has non-finite samples.".into()));
        }
        match self.direction {
            TransformDirection::Unknown => Err(OpError::Direction(
                "Cannot build LUT3D op, unspecified transform direction.".into(),
            )),
            TransformDirection::Inverse if self.inversion() == Lut3DInversion::Unsupported => {
                Err(OpError::Direction(format!(
                    "Cannot invert LUT3D op with {} interpolation.",
                    self.interpolation.as_str()
                )))
            }
            _ => Ok(()),
        }
    }

    /// Resolves the inverse cube for inverse ops. Idempotent.
    pub(crate) fn resolve(&mut self) -> OpResult<()> {
        self.validate()?;
        if self.direction == TransformDirection::Inverse && self.inverse_grid.is_none() {
            let grid = (*self.lut)
                .clone()
                .with_interpolation(self.interpolation)
                .invert()?;
            tracing::debug!(
                grid_size = grid.grid_size(),
                interpolation = self.interpolation.as_str(),
                "resolved inverse 3D LUT"
            );
            self.inverse_grid = Some(Arc::new(grid));
        }
        Ok(())
    }

    /// The table actually evaluated: the inverse cube for resolved inverse
    /// ops, otherwise the shared table.
    pub fn effective_lut(&self) -> &Arc<Lut3D> {
        self.inverse_grid.as_ref().unwrap_or(&self.lut)
    }

    /// True when the op reduces to a clamp to `[0, 1]`: an identity table
    /// read with a non-nearest interpolation. Nearest snaps to grid points.
    pub fn is_clamp_only(&self) -> bool {
        self.interpolation != Interpolation::Nearest && self.lut.is_identity()
    }

    /// Same table (shared or equal samples) evaluated in opposite directions.
    /// Nearest lookups never pair.
    pub fn is_inverse_of(&self, other: &Lut3DOpData) -> bool {
        self.interpolation != Interpolation::Nearest
            && other.interpolation != Interpolation::Nearest
            && self.direction.is_known()
            && other.direction == self.direction.inverse()
            && (Arc::ptr_eq(&self.lut, &other.lut)
                || (self.lut.grid_size() == other.lut.grid_size()
                    && self.lut.values() == other.lut.values()))
    }

    /// What this op followed by its inverse still does. Both directions
    /// evaluate a cube, which clamps input to `[0, 1]`.
    pub fn inverse_pair_clamp(&self) -> RangeData {
        RangeData::clamp([0.0; 3], [1.0; 3])
    }

    /// Evaluates one pixel.
    #[inline]
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        self.effective_lut().eval(rgb, self.interpolation)
    }

    pub(crate) fn cache_id(&self) -> String {
        format!(
            "{} {} {}",
            digest_f32(&[self.lut.grid_size(); 3], self.lut.values()),
            self.interpolation.as_str(),
            self.direction
        )
    }
}
