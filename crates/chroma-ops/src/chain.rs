//! Ordered op sequences.

use serde::{Deserialize, Serialize};

use crate::cpu::CpuProcessor;
use crate::gpu::GpuShaderDesc;
use crate::{Op, OpError, OpResult};

/// How aggressively [`OpChain::optimize`] rewrites a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    /// Keep every op as built.
    None,
    /// Drop identities, cancel adjacent inverse pairs and merge combinable
    /// neighbours. Never changes the result beyond float rounding: LUTs
    /// that are dropped leave their clamp behind.
    #[default]
    Lossless,
}

/// An ordered sequence of ops for one directional transform.
///
/// Append-only while being assembled; frozen by [`finalize`](Self::finalize).
#[derive(Debug, Clone, Default)]
pub struct OpChain {
    ops: Vec<Op>,
    finalized: bool,
}

impl OpChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an op.
    pub fn push(&mut self, op: Op) -> OpResult<()> {
        if self.finalized {
            return Err(OpError::contract(format!(
                "cannot append {} to a finalized op chain",
                op.kind()
            )));
        }
        self.ops.push(op);
        Ok(())
    }

    /// Appends every op of `other`, in order.
    pub fn extend(&mut self, other: OpChain) -> OpResult<()> {
        for op in other.ops {
            self.push(op)?;
        }
        Ok(())
    }

    /// Ops in application order.
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Number of ops.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True when the chain has no ops.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// True once [`finalize`](Self::finalize) has succeeded.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// True when every op is an identity.
    pub fn is_noop(&self) -> bool {
        self.ops.iter().all(Op::is_identity)
    }

    /// Runs one pass over adjacent ops.
    ///
    /// Each incoming op is compared against the last kept op: identities are
    /// dropped, an inverse pair cancels out, and combinable neighbours merge.
    /// Cancelling or merging exposes the previous op to the next incoming
    /// one, so nested pairs like `A B B⁻¹ A⁻¹` collapse completely.
    ///
    /// Identity LUTs become clamp range ops, and a cancelled LUT pair leaves
    /// the clamp its first op applied.
    pub fn optimize(&mut self, level: OptimizationLevel) -> OpResult<()> {
        if level == OptimizationLevel::None {
            return Ok(());
        }
        if self.finalized {
            return Err(OpError::contract("cannot optimize a finalized op chain"));
        }

        let before = self.ops.len();
        let mut kept: Vec<Op> = Vec::with_capacity(before);
        for op in self.ops.drain(..) {
            keep(&mut kept, op)?;
        }
        self.ops = kept;

        tracing::debug!(before, after = self.ops.len(), "optimized op chain");
        Ok(())
    }

    /// Finalizes every op and freezes the chain.
    pub fn finalize(&mut self) -> OpResult<()> {
        for op in &mut self.ops {
            op.finalize()?;
        }
        self.finalized = true;
        Ok(())
    }

    /// Concatenated cache ids of all ops.
    pub fn cache_id(&self) -> OpResult<String> {
        self.require_finalized()?;
        Ok(self
            .ops
            .iter()
            .filter_map(Op::cache_id)
            .collect::<Vec<_>>()
            .join(" "))
    }

    /// Builds a CPU processor running every op in order.
    pub fn cpu_processor(&self) -> OpResult<CpuProcessor> {
        let id = self.cache_id()?;
        let ops = self
            .ops
            .iter()
            .map(Op::cpu_kernel)
            .collect::<OpResult<Vec<_>>>()?;
        Ok(CpuProcessor::new(ops, id))
    }

    /// Appends every op's fragment to `desc`, in order.
    pub fn extract_gpu_shader_info(&self, desc: &mut GpuShaderDesc) -> OpResult<()> {
        self.require_finalized()?;
        for op in &self.ops {
            op.emit_gpu(desc)?;
        }
        Ok(())
    }

    fn require_finalized(&self) -> OpResult<()> {
        if self.finalized {
            Ok(())
        } else {
            Err(OpError::contract("op chain must be finalized before rendering"))
        }
    }
}

fn keep(kept: &mut Vec<Op>, op: Op) -> OpResult<()> {
    let op = op.identity_replacement().unwrap_or(op);
    if op.is_identity() {
        return Ok(());
    }
    let Some(last) = kept.last() else {
        kept.push(op);
        return Ok(());
    };
    if last.is_inverse_of(&op) {
        let residue = last.inverse_pair_residue();
        kept.pop();
        if let Some(residue) = residue {
            keep(kept, residue)?;
        }
    } else if last.can_combine_with(&op) {
        let merged = last.combine_with(&op)?;
        kept.pop();
        kept.extend(merged);
    } else {
        kept.push(op);
    }
    Ok(())
}

impl<'a> IntoIterator for &'a OpChain {
    type Item = &'a Op;
    type IntoIter = std::slice::Iter<'a, Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use approx::assert_abs_diff_eq;
    use chroma_lut::{Interpolation, Lut1D, Lut3D};

    use crate::TransformDirection;
    use crate::data::{
        FixedFunctionData, FixedFunctionStyle, Lut1DOpData, Lut3DOpData, OpData, OpKind, RangeData,
    };

    fn range(scale: f64, offset: f64) -> Op {
        Op::new(OpData::Range(RangeData::from_scale_offset([scale; 3], [offset; 3])))
    }

    fn ff(style: FixedFunctionStyle) -> Op {
        Op::new(OpData::FixedFunction(FixedFunctionData::new(style, vec![])))
    }

    #[test]
    fn nested_inverse_pairs_cancel() {
        let mut chain = OpChain::new();
        chain.push(ff(FixedFunctionStyle::XyzToXyy)).unwrap();
        chain.push(ff(FixedFunctionStyle::LinToPq)).unwrap();
        chain.push(ff(FixedFunctionStyle::PqToLin)).unwrap();
        chain.push(ff(FixedFunctionStyle::XyyToXyz)).unwrap();
        chain.optimize(OptimizationLevel::Lossless).unwrap();
        assert!(chain.is_empty());
    }

    #[test]
    fn ranges_merge_and_identities_drop() {
        let mut chain = OpChain::new();
        chain.push(range(2.0, 0.0)).unwrap();
        chain.push(range(1.0, 0.0)).unwrap();
        chain.push(range(3.0, 1.0)).unwrap();
        chain.push(ff(FixedFunctionStyle::LinToPq)).unwrap();
        chain.optimize(OptimizationLevel::Lossless).unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.ops()[0].kind(), OpKind::Range);
        assert_eq!(chain.ops()[1].kind(), OpKind::FixedFunction);
    }

    fn lut1d(lut: &Arc<Lut1D>, interpolation: Interpolation, direction: TransformDirection) -> Op {
        Op::new(OpData::Lut1D(Lut1DOpData::new(lut.clone(), interpolation, direction)))
    }

    fn outputs(chain: &OpChain, inputs: &[f32]) -> Vec<f32> {
        let mut chain = chain.clone();
        chain.finalize().unwrap();
        let processor = chain.cpu_processor().unwrap();
        inputs.iter().map(|&x| processor.apply_rgb([x; 3])[0]).collect()
    }

    fn assert_optimize_preserves(chain: OpChain, inputs: &[f32]) -> OpChain {
        let raw = outputs(&chain, inputs);
        let mut optimized = chain;
        optimized.optimize(OptimizationLevel::Lossless).unwrap();
        let opt = outputs(&optimized, inputs);
        for (a, b) in raw.iter().zip(&opt) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-5);
        }
        optimized
    }

    #[test]
    fn identity_lut_keeps_its_clamp() {
        let lut = Arc::new(Lut1D::identity(2).unwrap());
        let inputs = [-0.5, 0.0, 0.4, 0.6, 1.0, 1.5];

        let mut chain = OpChain::new();
        chain.push(lut1d(&lut, Interpolation::Linear, TransformDirection::Forward)).unwrap();
        let optimized = assert_optimize_preserves(chain, &inputs);
        assert_eq!(optimized.len(), 1);
        assert_eq!(optimized.ops()[0].kind(), OpKind::Range);
        assert!(!optimized.is_noop());
    }

    #[test]
    fn nearest_identity_lut_is_kept() {
        let lut = Arc::new(Lut1D::identity(2).unwrap());
        let mut chain = OpChain::new();
        chain.push(lut1d(&lut, Interpolation::Nearest, TransformDirection::Forward)).unwrap();
        let optimized = assert_optimize_preserves(chain, &[0.4, 0.6, 1.5]);
        assert_eq!(optimized.ops()[0].kind(), OpKind::Lut1D);
    }

    #[test]
    fn identity_lut3d_keeps_its_clamp() {
        let lut = Arc::new(Lut3D::identity(2).unwrap());
        let mut chain = OpChain::new();
        chain
            .push(Op::new(OpData::Lut3D(Lut3DOpData::new(
                lut,
                Interpolation::Tetrahedral,
                TransformDirection::Forward,
            ))))
            .unwrap();
        let optimized = assert_optimize_preserves(chain, &[-1.0, 0.25, 2.0]);
        assert_eq!(optimized.ops()[0].kind(), OpKind::Range);
    }

    #[test]
    fn lut_pair_leaves_a_clamp_that_merges() {
        let values = (0..5)
            .flat_map(|i| {
                let v = 0.1 + 0.8 * (i as f32 / 4.0).powi(2);
                [v, v, v]
            })
            .collect();
        let lut = Arc::new(Lut1D::from_values(5, values).unwrap());
        let inputs = [-0.5, 0.05, 0.3, 0.7, 0.95, 1.5];

        let mut chain = OpChain::new();
        chain.push(range(2.0, -0.5)).unwrap();
        chain.push(lut1d(&lut, Interpolation::Linear, TransformDirection::Forward)).unwrap();
        chain.push(lut1d(&lut, Interpolation::Linear, TransformDirection::Inverse)).unwrap();
        let optimized = assert_optimize_preserves(chain, &inputs);
        assert_eq!(optimized.len(), 1);

        let mut chain = OpChain::new();
        chain.push(lut1d(&lut, Interpolation::Linear, TransformDirection::Inverse)).unwrap();
        chain.push(lut1d(&lut, Interpolation::Linear, TransformDirection::Forward)).unwrap();
        let optimized = assert_optimize_preserves(chain, &inputs);
        let OpData::Range(clamp) = optimized.ops()[0].data() else {
            panic!("expected a clamp");
        };
        let (lower, upper) = clamp.clamp_bounds().unwrap();
        assert_abs_diff_eq!(lower[0], 0.1, epsilon = 1e-6);
        assert_abs_diff_eq!(upper[0], 0.9, epsilon = 1e-6);
    }

    #[test]
    fn level_none_keeps_everything() {
        let mut chain = OpChain::new();
        chain.push(range(1.0, 0.0)).unwrap();
        chain.push(range(1.0, 0.0)).unwrap();
        chain.optimize(OptimizationLevel::None).unwrap();
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn finalized_chain_is_frozen() {
        let mut chain = OpChain::new();
        chain.push(range(2.0, 0.0)).unwrap();
        assert!(chain.cache_id().is_err());
        chain.finalize().unwrap();
        assert!(matches!(chain.push(range(2.0, 0.0)), Err(OpError::ContractViolation(_))));
        assert!(chain.optimize(OptimizationLevel::Lossless).is_err());
        assert!(chain.cache_id().unwrap().starts_with("<RangeOp "));
    }

    #[test]
    fn identical_chains_share_cache_id() {
        let build = || {
            let mut chain = OpChain::new();
            chain.push(range(2.0, 0.5)).unwrap();
            chain.push(ff(FixedFunctionStyle::LinToPq)).unwrap();
            chain.finalize().unwrap();
            chain.cache_id().unwrap()
        };
        assert_eq!(build(), build());
    }
}
