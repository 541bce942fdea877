//! 1-dimensional lookup table.
//!
//! A 1D LUT applies an independent curve to each color channel. Samples are
//! stored as interleaved RGB triples, one triple per table entry, so the flat
//! array always holds exactly `3 * length` values.

use crate::{BitDepth, Interpolation, LutError, LutResult};

/// Tolerance used when comparing samples against the identity ramp.
pub const IDENTITY_TOLERANCE: f32 = 1e-6;

/// A 1-dimensional lookup table with one curve per RGB channel.
///
/// The input domain of the table is `[0, 1]`; inputs outside are clamped.
/// Remapping from a file-declared domain is done by a separate range op.
///
/// # Example
///
/// ```rust
/// use chroma_lut::Lut1D;
///
/// let lut = Lut1D::from_values(2, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
/// assert!(lut.is_identity());
/// assert_eq!(lut.apply_rgb([0.25, 0.5, 0.75]), [0.25, 0.5, 0.75]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Lut1D {
    length: usize,
    values: Vec<f32>,
    interpolation: Interpolation,
    bit_depth: BitDepth,
}

impl Lut1D {
    /// Creates an identity ramp with `length` entries.
    ///
    /// A single-entry table holds one black sample.
    pub fn identity(length: usize) -> LutResult<Self> {
        sample_count(length)?;
        let denom = (length.max(2) - 1) as f32;
        let values = (0..length)
            .flat_map(|i| {
                let v = i as f32 / denom;
                [v, v, v]
            })
            .collect();
        Ok(Self {
            length,
            values,
            interpolation: Interpolation::default(),
            bit_depth: BitDepth::default(),
        })
    }

    /// Creates a table from interleaved RGB samples.
    ///
    /// Fails with [`LutError::ShapeMismatch`] unless `values.len() == 3 * length`,
    /// and with [`LutError::InvalidSize`] when that count overflows.
    pub fn from_values(length: usize, values: Vec<f32>) -> LutResult<Self> {
        check_shape(sample_count(length)?, values.len())?;
        Ok(Self {
            length,
            values,
            interpolation: Interpolation::default(),
            bit_depth: BitDepth::default(),
        })
    }

    /// Replaces the samples with externally ordered triple-per-entry data.
    ///
    /// The data is stored as is; only the count is checked.
    pub fn set_array_from_red_fastest(&mut self, values: &[f32]) -> LutResult<()> {
        check_shape(3 * self.length, values.len())?;
        self.values.clear();
        self.values.extend_from_slice(values);
        Ok(())
    }

    /// Sets the interpolation method.
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Sets the output precision tag.
    pub fn with_bit_depth(mut self, bit_depth: BitDepth) -> Self {
        self.bit_depth = bit_depth;
        self
    }

    /// Number of entries.
    #[inline]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Flat interleaved sample array (`3 * length` values).
    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// RGB sample at entry `index`.
    #[inline]
    pub fn sample(&self, index: usize) -> [f32; 3] {
        let i = 3 * index;
        [self.values[i], self.values[i + 1], self.values[i + 2]]
    }

    /// Interpolation method.
    #[inline]
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Changes the interpolation method. Samples are left untouched.
    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    /// Output precision tag.
    #[inline]
    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    /// Returns true when every sample matches `index / (length - 1)` on all
    /// channels within [`IDENTITY_TOLERANCE`].
    ///
    /// A single-entry table is never an identity.
    pub fn is_identity(&self) -> bool {
        if self.length < 2 {
            return false;
        }
        let denom = (self.length - 1) as f32;
        self.values.chunks_exact(3).enumerate().all(|(i, rgb)| {
            let expected = i as f32 / denom;
            rgb.iter().all(|v| (v - expected).abs() <= IDENTITY_TOLERANCE)
        })
    }

    /// Returns true when every channel is monotonically non-decreasing and
    /// not flat, which is what inverse evaluation requires.
    pub fn is_invertible(&self) -> bool {
        if self.length < 2 {
            return false;
        }
        (0..3).all(|c| {
            let first = self.values[c];
            let last = self.values[3 * (self.length - 1) + c];
            let rising = self
                .values
                .chunks_exact(3)
                .zip(self.values.chunks_exact(3).skip(1))
                .all(|(a, b)| b[c] >= a[c]);
            rising && last > first
        })
    }

    /// Applies the table with its own interpolation method.
    pub fn apply_rgb(&self, rgb: [f32; 3]) -> [f32; 3] {
        self.eval_rgb(rgb, self.interpolation)
    }

    /// Applies the table with an explicit interpolation method.
    ///
    /// Tetrahedral has no meaning in 1D and is evaluated as linear.
    pub fn eval_rgb(&self, rgb: [f32; 3], interpolation: Interpolation) -> [f32; 3] {
        let mut out = [0.0f32; 3];
        for (c, value) in out.iter_mut().enumerate() {
            *value = match interpolation {
                Interpolation::Nearest => self.channel_nearest(c, rgb[c]),
                Interpolation::Linear | Interpolation::Tetrahedral => {
                    self.channel_linear(c, rgb[c])
                }
            };
        }
        out
    }

    /// Evaluates the inverse curve on each channel.
    ///
    /// For each channel the sample segment `[v[i], v[i + 1]]` that brackets
    /// the input is located by bisection and the position inside it is
    /// interpolated linearly. Inputs below the first sample map to 0, inputs
    /// above the last sample map to 1. Only meaningful when
    /// [`is_invertible`](Self::is_invertible) holds.
    pub fn apply_inverse_rgb(&self, rgb: [f32; 3]) -> [f32; 3] {
        let mut out = [0.0f32; 3];
        for (c, value) in out.iter_mut().enumerate() {
            *value = self.channel_inverse(c, rgb[c]);
        }
        out
    }

    #[inline]
    fn at(&self, index: usize, channel: usize) -> f32 {
        self.values[3 * index + channel]
    }

    fn channel_nearest(&self, channel: usize, x: f32) -> f32 {
        let n = (self.length - 1) as f32;
        let idx = (x.clamp(0.0, 1.0) * n).round() as usize;
        self.at(idx.min(self.length - 1), channel)
    }

    fn channel_linear(&self, channel: usize, x: f32) -> f32 {
        if self.length == 1 {
            return self.at(0, channel);
        }
        let n = (self.length - 1) as f32;
        let pos = x.clamp(0.0, 1.0) * n;
        let i0 = (pos.floor() as usize).min(self.length - 2);
        let frac = pos - i0 as f32;
        let a = self.at(i0, channel);
        let b = self.at(i0 + 1, channel);
        a + (b - a) * frac
    }

    fn channel_inverse(&self, channel: usize, y: f32) -> f32 {
        if self.length == 1 {
            return 0.0;
        }
        let last = self.length - 1;
        if y <= self.at(0, channel) {
            return 0.0;
        }
        if y >= self.at(last, channel) {
            return 1.0;
        }

        // Invariant: v[lo] <= y < v[hi]
        let mut lo = 0usize;
        let mut hi = last;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if self.at(mid, channel) <= y {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        let v0 = self.at(lo, channel);
        let v1 = self.at(lo + 1, channel);
        let t = if v1 > v0 { (y - v0) / (v1 - v0) } else { 0.0 };
        (lo as f32 + t) / last as f32
    }
}

/// Number of bisection steps needed to bracket a value in a table of
/// `length` entries.
pub fn inverse_search_steps(length: usize) -> usize {
    let mut steps = 0;
    let mut span = length.saturating_sub(1);
    while span > 1 {
        span = span.div_ceil(2);
        steps += 1;
    }
    steps
}

/// Number of samples a table of `length` entries holds.
fn sample_count(length: usize) -> LutResult<usize> {
    if length == 0 {
        return Err(LutError::InvalidSize("1D LUT length must be >= 1".into()));
    }
    length
        .checked_mul(3)
        .ok_or_else(|| LutError::InvalidSize(format!("1D LUT length {length} is too large")))
}

fn check_shape(expected: usize, actual: usize) -> LutResult<()> {
    if expected != actual {
        return Err(LutError::ShapeMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn gamma_lut(length: usize, gamma: f32) -> Lut1D {
        let values = (0..length)
            .flat_map(|i| {
                let v = (i as f32 / (length - 1) as f32).powf(gamma);
                [v, v, v]
            })
            .collect();
        Lut1D::from_values(length, values).unwrap()
    }

    #[test]
    fn identity_ramp() {
        let lut = Lut1D::identity(256).unwrap();
        assert!(lut.is_identity());
        assert_eq!(lut.values().len(), 3 * 256);
        let out = lut.apply_rgb([0.5, 0.3, 0.8]);
        assert_abs_diff_eq!(out[0], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(out[1], 0.3, epsilon = 1e-6);
        assert_abs_diff_eq!(out[2], 0.8, epsilon = 1e-6);
    }

    #[test]
    fn single_entry_is_not_identity() {
        let lut = Lut1D::identity(1).unwrap();
        assert!(!lut.is_identity());
        assert_eq!(lut.apply_rgb([0.7, 0.7, 0.7]), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn zero_length_rejected() {
        assert!(matches!(Lut1D::identity(0), Err(LutError::InvalidSize(_))));
        assert!(matches!(
            Lut1D::from_values(0, vec![]),
            Err(LutError::InvalidSize(_))
        ));
    }

    #[test]
    fn oversized_length_rejected() {
        assert!(matches!(
            Lut1D::from_values(usize::MAX / 2, vec![]),
            Err(LutError::InvalidSize(_))
        ));
        assert!(matches!(Lut1D::identity(usize::MAX), Err(LutError::InvalidSize(_))));
    }

    #[test]
    fn shape_mismatch_reports_counts() {
        let err = Lut1D::from_values(4, vec![0.0; 11]).unwrap_err();
        assert_eq!(err, LutError::ShapeMismatch { expected: 12, actual: 11 });

        let mut lut = Lut1D::identity(2).unwrap();
        let err = lut.set_array_from_red_fastest(&[0.0; 5]).unwrap_err();
        assert_eq!(err, LutError::ShapeMismatch { expected: 6, actual: 5 });
    }

    #[test]
    fn set_array_stores_as_is() {
        let mut lut = Lut1D::identity(2).unwrap();
        lut.set_array_from_red_fastest(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6]).unwrap();
        assert_eq!(lut.sample(0), [0.1, 0.2, 0.3]);
        assert_eq!(lut.sample(1), [0.4, 0.5, 0.6]);
    }

    #[test]
    fn nearest_vs_linear() {
        let lut = Lut1D::from_values(2, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
        let lin = lut.eval_rgb([0.4, 0.4, 0.4], Interpolation::Linear);
        let near = lut.eval_rgb([0.4, 0.4, 0.4], Interpolation::Nearest);
        assert_abs_diff_eq!(lin[0], 0.4, epsilon = 1e-6);
        assert_eq!(near[0], 0.0);
        // Interpolation change does not touch samples
        let mut lut = lut;
        lut.set_interpolation(Interpolation::Nearest);
        assert_eq!(lut.values(), &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        assert_eq!(lut.apply_rgb([0.6, 0.6, 0.6]), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn inverse_undoes_forward() {
        let lut = gamma_lut(1024, 2.2);
        assert!(lut.is_invertible());
        for &x in &[0.05f32, 0.25, 0.5, 0.9] {
            let fwd = lut.apply_rgb([x, x, x]);
            let back = lut.apply_inverse_rgb(fwd);
            assert_abs_diff_eq!(back[0], x, epsilon = 1e-3);
        }
    }

    #[test]
    fn inverse_clamps_outside_range() {
        let lut = gamma_lut(16, 2.0);
        assert_eq!(lut.apply_inverse_rgb([-1.0, 2.0, 0.0]), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn decreasing_curve_is_not_invertible() {
        let lut = Lut1D::from_values(2, vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0]).unwrap();
        assert!(!lut.is_invertible());
        let flat = Lut1D::from_values(2, vec![0.5; 6]).unwrap();
        assert!(!flat.is_invertible());
    }

    #[test]
    fn search_steps() {
        assert_eq!(inverse_search_steps(2), 0);
        assert_eq!(inverse_search_steps(3), 1);
        assert_eq!(inverse_search_steps(5), 2);
        assert_eq!(inverse_search_steps(1024), 10);
    }
}
