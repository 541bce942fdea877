//! Range remap op data.
//!
//! A per-channel affine map `out = in * scale + offset`. Built from a
//! declared input domain `[min, max]`: forward maps the domain onto `[0, 1]`,
//! inverse maps `[0, 1]` back onto the domain. Remaps built that way never
//! clamp; an optional per-channel output clamp is what an elided LUT leaves
//! behind.

use crate::{OpError, OpResult, TransformDirection};

const TOLERANCE: f64 = 1e-9;

/// Per-channel scale and offset, optionally followed by a clamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeData {
    scale: [f64; 3],
    offset: [f64; 3],
    clamp: Option<([f64; 3], [f64; 3])>,
}

impl Default for RangeData {
    fn default() -> Self {
        Self {
            scale: [1.0; 3],
            offset: [0.0; 3],
            clamp: None,
        }
    }
}

impl RangeData {
    /// Builds the remap for a `[min, max]` domain in the given direction.
    ///
    /// Fails when a channel has `min == max` or the direction is unknown.
    pub fn from_min_max(
        min: [f64; 3],
        max: [f64; 3],
        direction: TransformDirection,
    ) -> OpResult<Self> {
        let mut data = Self::default();
        for c in 0..3 {
            let span = max[c] - min[c];
            if span == 0.0 || !span.is_finite() {
                return Err(OpError::Validation(format!(
                    "Range channel {c} has an empty domain [{}, {}]",
                    min[c], max[c]
                )));
            }
            match direction {
                TransformDirection::Forward => {
                    data.scale[c] = 1.0 / span;
                    data.offset[c] = -min[c] / span;
                }
                TransformDirection::Inverse => {
                    data.scale[c] = span;
                    data.offset[c] = min[c];
                }
                TransformDirection::Unknown => {
                    return Err(OpError::Direction(
                        "Cannot build range op, unspecified transform direction.".into(),
                    ));
                }
            }
        }
        Ok(data)
    }

    /// Builds a remap from explicit scale and offset.
    pub fn from_scale_offset(scale: [f64; 3], offset: [f64; 3]) -> Self {
        Self {
            scale,
            offset,
            clamp: None,
        }
    }

    /// A pure clamp of every channel to `[lower, upper]`.
    pub fn clamp(lower: [f64; 3], upper: [f64; 3]) -> Self {
        Self {
            clamp: Some((lower, upper)),
            ..Self::default()
        }
    }

    /// Output clamp bounds, if any.
    pub fn clamp_bounds(&self) -> Option<([f64; 3], [f64; 3])> {
        self.clamp
    }

    /// Per-channel scale.
    pub fn scale(&self) -> [f64; 3] {
        self.scale
    }

    /// Per-channel offset.
    pub fn offset(&self) -> [f64; 3] {
        self.offset
    }

    /// The domain this remap maps onto `[0, 1]`, as `(min, max)`.
    ///
    /// Only meaningful for a non-degenerate scale.
    pub fn domain(&self) -> ([f64; 3], [f64; 3]) {
        let mut min = [0.0; 3];
        let mut max = [0.0; 3];
        for c in 0..3 {
            min[c] = -self.offset[c] / self.scale[c];
            max[c] = min[c] + 1.0 / self.scale[c];
        }
        (min, max)
    }

    /// Fails when any scale is zero, a coefficient does not fit a finite
    /// `f32` (the precision both backends evaluate in) or a clamp is empty.
    pub fn validate(&self) -> OpResult<()> {
        if let Some((lower, upper)) = self.clamp {
            for c in 0..3 {
                if !fits_f32(lower[c]) || !fits_f32(upper[c]) || lower[c] > upper[c] {
                    return Err(OpError::Validation(format!(
                        "Range channel {c} has an invalid clamp [{}, {}]",
                        lower[c], upper[c]
                    )));
                }
            }
        }
        for c in 0..3 {
            if self.scale[c] == 0.0 || !fits_f32(self.scale[c]) || !fits_f32(self.offset[c]) {
                return Err(OpError::Validation(format!(
                    "Range channel {c} is degenerate (scale {}, offset {})",
                    self.scale[c], self.offset[c]
                )));
            }
        }
        Ok(())
    }

    /// True when the map is the identity within tolerance. A clamp is never
    /// the identity.
    pub fn is_identity(&self) -> bool {
        self.clamp.is_none() && self.is_affine_identity()
    }

    fn is_affine_identity(&self) -> bool {
        (0..3).all(|c| {
            (self.scale[c] - 1.0).abs() <= TOLERANCE && self.offset[c].abs() <= TOLERANCE
        })
    }

    /// The algebraic inverse. A clamp has none.
    pub fn inverse(&self) -> OpResult<Self> {
        self.validate()?;
        if self.clamp.is_some() {
            return Err(OpError::Direction("Cannot invert a clamping range op.".into()));
        }
        let mut inv = Self::default();
        for c in 0..3 {
            inv.scale[c] = 1.0 / self.scale[c];
            inv.offset[c] = -self.offset[c] / self.scale[c];
        }
        Ok(inv)
    }

    /// Composition: applies `self` first, then `next`.
    ///
    /// A clamp followed by an affine map equals the map followed by a clamp
    /// to the mapped bounds, so any two remaps compose exactly.
    pub fn compose(&self, next: &RangeData) -> Self {
        let mut out = Self::default();
        for c in 0..3 {
            out.scale[c] = self.scale[c] * next.scale[c];
            out.offset[c] = self.offset[c] * next.scale[c] + next.offset[c];
        }
        let carried = self.clamp.map(|(lower, upper)| {
            let mut lo = [0.0; 3];
            let mut hi = [0.0; 3];
            for c in 0..3 {
                let a = lower[c] * next.scale[c] + next.offset[c];
                let b = upper[c] * next.scale[c] + next.offset[c];
                lo[c] = a.min(b);
                hi[c] = a.max(b);
            }
            (lo, hi)
        });
        out.clamp = match (carried, next.clamp) {
            (Some((lo, hi)), Some((nlo, nhi))) => {
                let mut lower = [0.0; 3];
                let mut upper = [0.0; 3];
                for c in 0..3 {
                    // Disjoint ranges collapse onto the nearer bound of `next`.
                    lower[c] = lo[c].max(nlo[c]).min(nhi[c]);
                    upper[c] = hi[c].min(nhi[c]).max(lower[c]);
                }
                Some((lower, upper))
            }
            (carried, next_clamp) => carried.or(next_clamp),
        };
        out
    }

    /// True when applying `other` after `self` is the identity.
    pub fn is_inverse_of(&self, other: &RangeData) -> bool {
        self.compose(other).is_identity()
    }

    /// Applies the map to one pixel.
    #[inline]
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let mut out = rgb;
        for c in 0..3 {
            let mut v = rgb[c] as f64 * self.scale[c] + self.offset[c];
            if let Some((lower, upper)) = self.clamp {
                v = v.max(lower[c]).min(upper[c]);
            }
            out[c] = v as f32;
        }
        out
    }

    pub(crate) fn cache_id(&self) -> String {
        let mut id = format!(
            "scale {} {} {} offset {} {} {}",
            self.scale[0], self.scale[1], self.scale[2], self.offset[0], self.offset[1], self.offset[2]
        );
        if let Some((lo, hi)) = self.clamp {
            id.push_str(&format!(
                " clamp {} {} {} {} {} {}",
                lo[0], lo[1], lo[2], hi[0], hi[1], hi[2]
            ));
        }
        id
    }
}

pub(crate) fn fits_f32(v: f64) -> bool {
    (v as f32).is_finite()
}
