//! CPU backend.
//!
//! A finalized [`Op`](crate::Op) yields a [`CpuOp`]: an immutable evaluator
//! holding `Arc`-shared tables and no mutable state, so one evaluator can run
//! on many threads against disjoint buffers. A [`CpuProcessor`] runs the
//! evaluators of a whole chain in order.
//!
//! Buffers are packed interleaved `f32` pixels with 3 (RGB) or 4 (RGBA)
//! channels. Alpha passes through unchanged.
//!
//! # Example
//!
//! ```rust
//! use chroma_ops::{OpChain, TransformDirection, create_min_max_op};
//!
//! let mut chain = OpChain::new();
//! create_min_max_op(&mut chain, [0.0; 3], [2.0; 3], TransformDirection::Forward).unwrap();
//! chain.finalize().unwrap();
//!
//! let processor = chain.cpu_processor().unwrap();
//! let mut pixels = vec![1.0f32, 2.0, 0.0, 0.5];
//! processor.apply(&mut pixels, 4).unwrap();
//! assert_eq!(pixels, [0.5, 1.0, 0.0, 0.5]);
//! ```

pub mod fixed_function;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::data::{FixedFunctionData, Lut1DOpData, Lut3DOpData, MatrixData, RangeData};
use crate::{OpError, OpResult};

/// Pixels handed to one rayon task by [`CpuProcessor::apply_par`].
#[cfg(feature = "parallel")]
const PAR_CHUNK_PIXELS: usize = 4096;

/// Per-op CPU evaluator.
#[derive(Debug, Clone)]
pub enum CpuOp {
    /// Forward or inverse 1D table.
    Lut1D(Lut1DOpData),
    /// 3D table, inverse already resolved.
    Lut3D(Lut3DOpData),
    /// Closed-form function.
    FixedFunction(FixedFunctionData),
    /// Affine remap.
    Range(RangeData),
    /// Matrix with offset.
    Matrix(MatrixData),
}

impl CpuOp {
    /// Evaluates one RGB triple.
    #[inline]
    pub fn apply_rgb(&self, rgb: [f32; 3]) -> [f32; 3] {
        match self {
            CpuOp::Lut1D(d) => d.apply(rgb),
            CpuOp::Lut3D(d) => d.apply(rgb),
            CpuOp::FixedFunction(d) => {
                let mut px = rgb;
                fixed_function::apply(d, &mut px);
                px
            }
            CpuOp::Range(d) => d.apply(rgb),
            CpuOp::Matrix(d) => d.apply(rgb),
        }
    }

    /// Evaluates a packed buffer in place.
    pub fn apply(&self, pixels: &mut [f32], channels: usize) -> OpResult<()> {
        check_layout(pixels.len(), channels)?;
        self.apply_unchecked(pixels, channels);
        Ok(())
    }

    /// Evaluates `src` into `dst`. Both buffers must have the same layout.
    pub fn apply_to(&self, src: &[f32], dst: &mut [f32], channels: usize) -> OpResult<()> {
        check_pair(src, dst, channels)?;
        dst.copy_from_slice(src);
        self.apply_unchecked(dst, channels);
        Ok(())
    }

    fn apply_unchecked(&self, pixels: &mut [f32], channels: usize) {
        for px in pixels.chunks_exact_mut(channels) {
            let out = self.apply_rgb([px[0], px[1], px[2]]);
            px[..3].copy_from_slice(&out);
        }
    }
}

/// Evaluators of a finalized chain, applied in order.
#[derive(Debug, Clone, Default)]
pub struct CpuProcessor {
    ops: Vec<CpuOp>,
    cache_id: String,
}

impl CpuProcessor {
    /// Wraps evaluators together with the cache id of the chain they came from.
    pub fn new(ops: Vec<CpuOp>, cache_id: impl Into<String>) -> Self {
        Self {
            ops,
            cache_id: cache_id.into(),
        }
    }

    /// Evaluators in application order.
    pub fn ops(&self) -> &[CpuOp] {
        &self.ops
    }

    /// True when the processor leaves pixels untouched.
    pub fn is_noop(&self) -> bool {
        self.ops.is_empty()
    }

    /// Cache id of the source chain.
    pub fn cache_id(&self) -> &str {
        &self.cache_id
    }

    /// Evaluates one RGB triple through every op.
    #[inline]
    pub fn apply_rgb(&self, rgb: [f32; 3]) -> [f32; 3] {
        self.ops.iter().fold(rgb, |px, op| op.apply_rgb(px))
    }

    /// Evaluates a packed buffer in place.
    pub fn apply(&self, pixels: &mut [f32], channels: usize) -> OpResult<()> {
        check_layout(pixels.len(), channels)?;
        self.apply_unchecked(pixels, channels);
        Ok(())
    }

    /// Evaluates `src` into `dst`.
    pub fn apply_to(&self, src: &[f32], dst: &mut [f32], channels: usize) -> OpResult<()> {
        check_pair(src, dst, channels)?;
        dst.copy_from_slice(src);
        self.apply_unchecked(dst, channels);
        Ok(())
    }

    /// Evaluates a packed buffer in place, splitting it across rayon workers.
    #[cfg(feature = "parallel")]
    pub fn apply_par(&self, pixels: &mut [f32], channels: usize) -> OpResult<()> {
        check_layout(pixels.len(), channels)?;
        pixels
            .par_chunks_mut(PAR_CHUNK_PIXELS * channels)
            .for_each(|chunk| self.apply_unchecked(chunk, channels));
        Ok(())
    }

    fn apply_unchecked(&self, pixels: &mut [f32], channels: usize) {
        if self.ops.is_empty() {
            return;
        }
        for px in pixels.chunks_exact_mut(channels) {
            let out = self.apply_rgb([px[0], px[1], px[2]]);
            px[..3].copy_from_slice(&out);
        }
    }
}

fn check_layout(len: usize, channels: usize) -> OpResult<()> {
    if channels != 3 && channels != 4 {
        return Err(OpError::Buffer(format!(
            "channel count must be 3 or 4, got {channels}"
        )));
    }
    if len % channels != 0 {
        return Err(OpError::Buffer(format!(
            "buffer length {len} is not a multiple of {channels} channels"
        )));
    }
    Ok(())
}

fn check_pair(src: &[f32], dst: &[f32], channels: usize) -> OpResult<()> {
    check_layout(src.len(), channels)?;
    if src.len() != dst.len() {
        return Err(OpError::Buffer(format!(
            "source has {} values but destination has {}",
            src.len(),
            dst.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn halve() -> CpuOp {
        CpuOp::Range(RangeData::from_scale_offset([0.5; 3], [0.0; 3]))
    }

    #[test]
    fn alpha_passes_through() {
        let mut px = vec![1.0, 0.5, 0.25, 0.7, 2.0, 2.0, 2.0, 1.0];
        halve().apply(&mut px, 4).unwrap();
        assert_eq!(px, [0.5, 0.25, 0.125, 0.7, 1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn ragged_buffer_is_rejected() {
        let mut px = vec![0.0; 7];
        assert!(matches!(halve().apply(&mut px, 3), Err(OpError::Buffer(_))));
        assert!(matches!(halve().apply(&mut px, 2), Err(OpError::Buffer(_))));
    }

    #[test]
    fn apply_to_leaves_source() {
        let src = [1.0f32, 1.0, 1.0];
        let mut dst = [0.0f32; 3];
        halve().apply_to(&src, &mut dst, 3).unwrap();
        assert_eq!(src, [1.0, 1.0, 1.0]);
        assert_eq!(dst, [0.5, 0.5, 0.5]);

        let mut short = [0.0f32; 6];
        assert!(halve().apply_to(&src, &mut short, 3).is_err());
    }

    #[test]
    fn processor_runs_in_order() {
        let add = CpuOp::Range(RangeData::from_scale_offset([1.0; 3], [1.0; 3]));
        let p = CpuProcessor::new(vec![halve(), add.clone()], "x");
        assert_eq!(p.apply_rgb([2.0, 4.0, 6.0]), [2.0, 3.0, 4.0]);
        let q = CpuProcessor::new(vec![add, halve()], "y");
        assert_eq!(q.apply_rgb([2.0, 4.0, 6.0]), [1.5, 2.5, 3.5]);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_matches_serial() {
        let p = CpuProcessor::new(vec![halve()], "x");
        let src: Vec<f32> = (0..3 * 10_000).map(|i| (i % 97) as f32 / 97.0).collect();
        let mut serial = src.clone();
        let mut par = src;
        p.apply(&mut serial, 3).unwrap();
        p.apply_par(&mut par, 3).unwrap();
        assert_eq!(serial, par);
    }
}
