//! 3-dimensional lookup table.
//!
//! A 3D LUT maps RGB input to RGB output through a cube of color values.
//! Samples live in one flat array in red-fastest order: the flat entry index
//! of grid point `(r, g, b)` is `r + N*g + N*N*b`.

use crate::{BitDepth, Interpolation, LutError, LutResult};

/// Tolerance used when comparing samples against the identity cube.
pub const IDENTITY_TOLERANCE: f32 = 1e-6;

/// How a 3D LUT can be evaluated in the inverse direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lut3DInversion {
    /// No inverse is available for this interpolation method.
    Unsupported,
    /// The inverse is approximated by a per-grid-point numerical search.
    NumericalSearch,
}

impl Lut3DInversion {
    /// Inversion capability for a given interpolation method.
    ///
    /// Nearest-neighbor lookup is piecewise constant and has no inverse.
    pub fn for_interpolation(interpolation: Interpolation) -> Self {
        match interpolation {
            Interpolation::Nearest => Lut3DInversion::Unsupported,
            Interpolation::Linear | Interpolation::Tetrahedral => Lut3DInversion::NumericalSearch,
        }
    }
}

/// A 3-dimensional lookup table.
///
/// # Structure
///
/// - `grid_size^3` entries, each an RGB triple
/// - Stored flat in red-fastest order (R varies fastest, then G, then B)
/// - Nearest, trilinear or tetrahedral lookup
///
/// # Example
///
/// ```rust
/// use chroma_lut::Lut3D;
///
/// let lut = Lut3D::identity(17).unwrap();
/// let out = lut.apply([0.5, 0.3, 0.2]);
/// assert!((out[0] - 0.5).abs() < 1e-5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Lut3D {
    grid_size: usize,
    values: Vec<f32>,
    interpolation: Interpolation,
    bit_depth: BitDepth,
}

impl Lut3D {
    /// Creates an identity cube of edge `grid_size`.
    pub fn identity(grid_size: usize) -> LutResult<Self> {
        sample_count(grid_size)?;
        Ok(Self {
            grid_size,
            values: identity_grid(grid_size),
            interpolation: Interpolation::default(),
            bit_depth: BitDepth::default(),
        })
    }

    /// Creates a cube from flat red-fastest samples.
    ///
    /// Fails with [`LutError::ShapeMismatch`] unless
    /// `values.len() == 3 * grid_size^3`, and with [`LutError::InvalidSize`]
    /// when that count overflows.
    pub fn from_values(grid_size: usize, values: Vec<f32>) -> LutResult<Self> {
        check_shape(sample_count(grid_size)?, values.len())?;
        Ok(Self {
            grid_size,
            values,
            interpolation: Interpolation::default(),
            bit_depth: BitDepth::default(),
        })
    }

    /// Replaces the samples with data that is already in red-fastest order.
    ///
    /// No reordering happens; only the count is checked.
    pub fn set_array_from_red_fastest(&mut self, values: &[f32]) -> LutResult<()> {
        check_shape(3 * self.entry_count(), values.len())?;
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

    /// Cube edge size.
    #[inline]
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Returns the total number of grid entries.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.grid_size * self.grid_size * self.grid_size
    }

    /// Flat red-fastest sample array.
    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
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

    /// Inversion capability for the table's own interpolation method.
    pub fn inversion(&self) -> Lut3DInversion {
        Lut3DInversion::for_interpolation(self.interpolation)
    }

    /// Gets the value at grid position (r, g, b).
    #[inline]
    pub fn sample(&self, r: usize, g: usize, b: usize) -> [f32; 3] {
        let i = 3 * (b * self.grid_size * self.grid_size + g * self.grid_size + r);
        [self.values[i], self.values[i + 1], self.values[i + 2]]
    }

    /// Returns true when the cube matches the canonical identity grid of the
    /// same size within [`IDENTITY_TOLERANCE`].
    pub fn is_identity(&self) -> bool {
        let n = (self.grid_size - 1) as f32;
        self.values.chunks_exact(3).enumerate().all(|(i, rgb)| {
            let r = i % self.grid_size;
            let g = (i / self.grid_size) % self.grid_size;
            let b = i / (self.grid_size * self.grid_size);
            (rgb[0] - r as f32 / n).abs() <= IDENTITY_TOLERANCE
                && (rgb[1] - g as f32 / n).abs() <= IDENTITY_TOLERANCE
                && (rgb[2] - b as f32 / n).abs() <= IDENTITY_TOLERANCE
        })
    }

    /// Applies the LUT with its own interpolation method.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        self.eval(rgb, self.interpolation)
    }

    /// Applies the LUT with an explicit interpolation method.
    ///
    /// Inputs are clamped to `[0, 1]`.
    pub fn eval(&self, rgb: [f32; 3], interpolation: Interpolation) -> [f32; 3] {
        match interpolation {
            Interpolation::Nearest => self.apply_nearest(rgb),
            Interpolation::Linear => self.apply_trilinear(rgb),
            Interpolation::Tetrahedral => self.apply_tetrahedral(rgb),
        }
    }

    fn apply_nearest(&self, rgb: [f32; 3]) -> [f32; 3] {
        let n = (self.grid_size - 1) as f32;
        let idx = |v: f32| ((v.clamp(0.0, 1.0) * n).round() as usize).min(self.grid_size - 1);
        self.sample(idx(rgb[0]), idx(rgb[1]), idx(rgb[2]))
    }

    /// Lower grid corner and fractional offsets of an input color.
    fn locate(&self, rgb: [f32; 3]) -> ([usize; 3], [f32; 3]) {
        let n = (self.grid_size - 1) as f32;
        let mut base = [0usize; 3];
        let mut frac = [0.0f32; 3];
        for c in 0..3 {
            let pos = rgb[c].clamp(0.0, 1.0) * n;
            base[c] = (pos.floor() as usize).min(self.grid_size - 2);
            frac[c] = pos - base[c] as f32;
        }
        (base, frac)
    }

    fn apply_trilinear(&self, rgb: [f32; 3]) -> [f32; 3] {
        let ([ri, gi, bi], [rf, gf, bf]) = self.locate(rgb);

        let c000 = self.sample(ri, gi, bi);
        let c100 = self.sample(ri + 1, gi, bi);
        let c010 = self.sample(ri, gi + 1, bi);
        let c110 = self.sample(ri + 1, gi + 1, bi);
        let c001 = self.sample(ri, gi, bi + 1);
        let c101 = self.sample(ri + 1, gi, bi + 1);
        let c011 = self.sample(ri, gi + 1, bi + 1);
        let c111 = self.sample(ri + 1, gi + 1, bi + 1);

        let mut result = [0.0f32; 3];
        for i in 0..3 {
            let c00 = c000[i] * (1.0 - rf) + c100[i] * rf;
            let c01 = c001[i] * (1.0 - rf) + c101[i] * rf;
            let c10 = c010[i] * (1.0 - rf) + c110[i] * rf;
            let c11 = c011[i] * (1.0 - rf) + c111[i] * rf;

            let c0 = c00 * (1.0 - gf) + c10 * gf;
            let c1 = c01 * (1.0 - gf) + c11 * gf;

            result[i] = c0 * (1.0 - bf) + c1 * bf;
        }
        result
    }

    fn apply_tetrahedral(&self, rgb: [f32; 3]) -> [f32; 3] {
        let ([ri, gi, bi], [rf, gf, bf]) = self.locate(rgb);

        let c000 = self.sample(ri, gi, bi);
        let c100 = self.sample(ri + 1, gi, bi);
        let c010 = self.sample(ri, gi + 1, bi);
        let c110 = self.sample(ri + 1, gi + 1, bi);
        let c001 = self.sample(ri, gi, bi + 1);
        let c101 = self.sample(ri + 1, gi, bi + 1);
        let c011 = self.sample(ri, gi + 1, bi + 1);
        let c111 = self.sample(ri + 1, gi + 1, bi + 1);

        let mut result = [0.0f32; 3];
        for i in 0..3 {
            result[i] = if rf > gf {
                if gf > bf {
                    c000[i] + rf * (c100[i] - c000[i]) + gf * (c110[i] - c100[i]) + bf * (c111[i] - c110[i])
                } else if rf > bf {
                    c000[i] + rf * (c100[i] - c000[i]) + bf * (c101[i] - c100[i]) + gf * (c111[i] - c101[i])
                } else {
                    c000[i] + bf * (c001[i] - c000[i]) + rf * (c101[i] - c001[i]) + gf * (c111[i] - c101[i])
                }
            } else if gf > bf {
                if rf > bf {
                    c000[i] + gf * (c010[i] - c000[i]) + rf * (c110[i] - c010[i]) + bf * (c111[i] - c110[i])
                } else {
                    c000[i] + gf * (c010[i] - c000[i]) + bf * (c011[i] - c010[i]) + rf * (c111[i] - c011[i])
                }
            } else {
                c000[i] + bf * (c001[i] - c000[i]) + gf * (c011[i] - c001[i]) + rf * (c111[i] - c011[i])
            };
        }
        result
    }

    /// Builds an approximate inverse cube by numerical search.
    ///
    /// For every grid point of the output cube, a damped Newton iteration
    /// with a finite-difference Jacobian looks for the input that the forward
    /// table maps onto that grid color. Works for monotonic (bijective)
    /// tables whose outputs cover `[0, 1]`; other tables get a best-effort
    /// clamped answer.
    ///
    /// Fails with [`LutError::NotInvertible`] when the table's interpolation
    /// method has no inverse (see [`Lut3DInversion`]).
    pub fn invert(&self) -> LutResult<Self> {
        if self.inversion() == Lut3DInversion::Unsupported {
            return Err(LutError::NotInvertible(format!(
                "3D LUT with {} interpolation",
                self.interpolation.as_str()
            )));
        }

        const MAX_ITERS: usize = 30;
        const TOLERANCE: f32 = 1e-6;
        const DAMPING: f32 = 0.8;
        const DELTA: f32 = 1e-4;

        let size = self.grid_size;
        let n = (size - 1) as f32;
        let mut inverted = Vec::with_capacity(3 * self.entry_count());

        for bi in 0..size {
            for gi in 0..size {
                for ri in 0..size {
                    let target = [ri as f32 / n, gi as f32 / n, bi as f32 / n];
                    let mut guess = target;

                    for _ in 0..MAX_ITERS {
                        let eval = self.apply_tetrahedral(guess);
                        let err = [eval[0] - target[0], eval[1] - target[1], eval[2] - target[2]];
                        let err_mag = (err[0] * err[0] + err[1] * err[1] + err[2] * err[2]).sqrt();
                        if err_mag < TOLERANCE {
                            break;
                        }

                        let mut jacobian = [[0.0f32; 3]; 3];
                        for j in 0..3 {
                            let mut plus = guess;
                            plus[j] = (plus[j] + DELTA).min(1.0);
                            let step = plus[j] - guess[j];
                            if step <= 0.0 {
                                // At the upper edge, difference backwards.
                                let mut minus = guess;
                                minus[j] -= DELTA;
                                let eval_minus = self.apply_tetrahedral(minus);
                                for i in 0..3 {
                                    jacobian[i][j] = (eval[i] - eval_minus[i]) / DELTA;
                                }
                            } else {
                                let eval_plus = self.apply_tetrahedral(plus);
                                for i in 0..3 {
                                    jacobian[i][j] = (eval_plus[i] - eval[i]) / step;
                                }
                            }
                        }

                        let dx = solve_3x3(&jacobian, &[-err[0], -err[1], -err[2]]);
                        for c in 0..3 {
                            guess[c] = (guess[c] + DAMPING * dx[c]).clamp(0.0, 1.0);
                        }
                    }

                    inverted.extend_from_slice(&guess);
                }
            }
        }

        Ok(Self {
            grid_size: size,
            values: inverted,
            interpolation: self.interpolation,
            bit_depth: self.bit_depth,
        })
    }
}

/// Generates the canonical identity cube of edge `grid_size` as a flat
/// red-fastest RGB array.
///
/// A `grid_size` below 2, or one whose sample count overflows `usize`,
/// yields an empty array.
pub fn identity_grid(grid_size: usize) -> Vec<f32> {
    let Ok(count) = sample_count(grid_size) else {
        return Vec::new();
    };
    let n = (grid_size - 1) as f32;
    let mut data = Vec::with_capacity(count);
    for b in 0..grid_size {
        for g in 0..grid_size {
            for r in 0..grid_size {
                data.extend_from_slice(&[r as f32 / n, g as f32 / n, b as f32 / n]);
            }
        }
    }
    data
}

/// Solves 3x3 linear system Ax = b using Cramer's rule.
///
/// A singular system yields a zero step.
fn solve_3x3(a: &[[f32; 3]; 3], b: &[f32; 3]) -> [f32; 3] {
    let det = a[0][0] * (a[1][1] * a[2][2] - a[1][2] * a[2][1])
        - a[0][1] * (a[1][0] * a[2][2] - a[1][2] * a[2][0])
        + a[0][2] * (a[1][0] * a[2][1] - a[1][1] * a[2][0]);

    if det.abs() < 1e-10 {
        return [0.0, 0.0, 0.0];
    }

    let det_x = b[0] * (a[1][1] * a[2][2] - a[1][2] * a[2][1])
        - a[0][1] * (b[1] * a[2][2] - a[1][2] * b[2])
        + a[0][2] * (b[1] * a[2][1] - a[1][1] * b[2]);

    let det_y = a[0][0] * (b[1] * a[2][2] - a[1][2] * b[2])
        - b[0] * (a[1][0] * a[2][2] - a[1][2] * a[2][0])
        + a[0][2] * (a[1][0] * b[2] - b[1] * a[2][0]);

    let det_z = a[0][0] * (a[1][1] * b[2] - b[1] * a[2][1])
        - a[0][1] * (a[1][0] * b[2] - b[1] * a[2][0])
        + b[0] * (a[1][0] * a[2][1] - a[1][1] * a[2][0]);

    [det_x / det, det_y / det, det_z / det]
}

/// Number of samples a cube of edge `grid_size` holds.
fn sample_count(grid_size: usize) -> LutResult<usize> {
    if grid_size < 2 {
        return Err(LutError::InvalidSize(format!(
            "3D LUT grid size must be >= 2, got {grid_size}"
        )));
    }
    grid_size
        .checked_pow(3)
        .and_then(|n| n.checked_mul(3))
        .ok_or_else(|| LutError::InvalidSize(format!("3D LUT grid size {grid_size} is too large")))
}

fn check_shape(expected: usize, actual: usize) -> LutResult<()> {
    if expected != actual {
        return Err(LutError::ShapeMismatch { expected, actual });
    }
    Ok(())
}
