//! The pipeline element.
//!
//! An [`Op`] wraps one [`OpData`] variant. It is mutable while a chain is
//! assembled and optimized, then [`finalize`](Op::finalize) validates the
//! payload, resolves derived state and fixes the cache id. Only finalized
//! ops can be rendered by either backend.

use chroma_lut::Interpolation;

use crate::cpu::CpuOp;
use crate::data::{OpData, OpKind, RangeData};
use crate::gpu::{self, GpuShaderDesc};
use crate::{OpError, OpResult, TransformDirection};

/// One color operation.
#[derive(Debug, Clone)]
pub struct Op {
    data: OpData,
    cache_id: Option<String>,
}

impl Op {
    /// Wraps op data. The op starts unfinalized.
    pub fn new(data: OpData) -> Self {
        Self {
            data,
            cache_id: None,
        }
    }

    /// Payload.
    pub fn data(&self) -> &OpData {
        &self.data
    }

    /// Variant discriminant.
    pub fn kind(&self) -> OpKind {
        self.data.kind()
    }

    /// Direction the payload is evaluated in. Affine ops have their
    /// direction folded into the coefficients and report Forward.
    pub fn direction(&self) -> TransformDirection {
        match &self.data {
            OpData::Lut1D(d) => d.direction(),
            OpData::Lut3D(d) => d.direction(),
            OpData::FixedFunction(d) => d.direction(),
            OpData::Range(_) | OpData::Matrix(_) => TransformDirection::Forward,
        }
    }

    /// True once [`finalize`](Self::finalize) has succeeded.
    pub fn is_finalized(&self) -> bool {
        self.cache_id.is_some()
    }

    /// Cache id, available after finalize.
    pub fn cache_id(&self) -> Option<&str> {
        self.cache_id.as_deref()
    }

    /// True when the op is guaranteed not to change any pixel. LUT ops never
    /// are: even an identity table clamps its input.
    pub fn is_identity(&self) -> bool {
        match &self.data {
            OpData::Lut1D(_) | OpData::Lut3D(_) => false,
            OpData::FixedFunction(d) => d.is_identity(),
            OpData::Range(d) => d.is_identity(),
            OpData::Matrix(d) => d.is_identity(),
        }
    }

    /// A clamp-to-`[0, 1]` range op standing in for a LUT op whose table is
    /// the identity. `None` for every other op.
    pub fn identity_replacement(&self) -> Option<Op> {
        let clamp_only = match &self.data {
            OpData::Lut1D(d) => d.is_clamp_only(),
            OpData::Lut3D(d) => d.is_clamp_only(),
            _ => false,
        };
        clamp_only.then(|| Op::new(OpData::Range(RangeData::clamp([0.0; 3], [1.0; 3]))))
    }

    /// What remains of this op followed by an op it
    /// [`is_inverse_of`](Self::is_inverse_of). LUT pairs leave a clamp.
    pub fn inverse_pair_residue(&self) -> Option<Op> {
        match &self.data {
            OpData::Lut1D(d) => Some(Op::new(OpData::Range(d.inverse_pair_clamp()))),
            OpData::Lut3D(d) => Some(Op::new(OpData::Range(d.inverse_pair_clamp()))),
            _ => None,
        }
    }

    /// True when both ops carry the same data variant.
    pub fn is_same_kind(&self, other: &Op) -> bool {
        self.kind() == other.kind()
    }

    /// True when `other` applied after `self` is the identity.
    pub fn is_inverse_of(&self, other: &Op) -> bool {
        match (&self.data, &other.data) {
            (OpData::Lut1D(a), OpData::Lut1D(b)) => a.is_inverse_of(b),
            (OpData::Lut3D(a), OpData::Lut3D(b)) => a.is_inverse_of(b),
            (OpData::FixedFunction(a), OpData::FixedFunction(b)) => a.is_inverse_of(b),
            (OpData::Range(a), OpData::Range(b)) => a.is_inverse_of(b),
            (OpData::Matrix(a), OpData::Matrix(b)) => a.is_inverse_of(b),
            _ => false,
        }
    }

    /// True when `other` can be merged into this op. Only range and matrix
    /// ops combine, and only with their own kind.
    pub fn can_combine_with(&self, other: &Op) -> bool {
        matches!(
            (&self.data, &other.data),
            (OpData::Range(_), OpData::Range(_)) | (OpData::Matrix(_), OpData::Matrix(_))
        )
    }

    /// Merges `self` followed by `other` into at most one op.
    ///
    /// Returns `Ok(None)` when the merged op is the identity. Calling this
    /// when [`can_combine_with`](Self::can_combine_with) is false is a
    /// contract violation.
    pub fn combine_with(&self, other: &Op) -> OpResult<Option<Op>> {
        let data = match (&self.data, &other.data) {
            (OpData::Range(a), OpData::Range(b)) => OpData::Range(a.compose(b)),
            (OpData::Matrix(a), OpData::Matrix(b)) => OpData::Matrix(a.compose(b)),
            _ => {
                return Err(OpError::contract(format!(
                    "{} cannot be combined with {}",
                    self.kind(),
                    other.kind()
                )));
            }
        };
        let op = Op::new(data);
        Ok((!op.is_identity()).then_some(op))
    }

    /// Changes the interpolation of a LUT op. Other ops ignore it.
    pub fn set_interpolation(&mut self, interpolation: Interpolation) -> OpResult<()> {
        if self.is_finalized() {
            return Err(OpError::contract(format!(
                "cannot change interpolation of finalized {}",
                self.kind()
            )));
        }
        match &mut self.data {
            OpData::Lut1D(d) => d.set_interpolation(interpolation),
            OpData::Lut3D(d) => d.set_interpolation(interpolation),
            _ => {}
        }
        Ok(())
    }

    /// Validates the payload, resolves derived state and computes the cache
    /// id. Calling it again returns the same id.
    pub fn finalize(&mut self) -> OpResult<&str> {
        if self.cache_id.is_none() {
            let payload = match &mut self.data {
                OpData::Lut1D(d) => {
                    d.validate()?;
                    d.cache_id()
                }
                OpData::Lut3D(d) => {
                    d.resolve()?;
                    d.cache_id()
                }
                OpData::FixedFunction(d) => {
                    d.validate()?;
                    d.cache_id()
                }
                OpData::Range(d) => {
                    d.validate()?;
                    d.cache_id()
                }
                OpData::Matrix(d) => {
                    d.validate()?;
                    d.cache_id()
                }
            };
            let id = format!("<{} {} >", self.kind(), payload);
            tracing::trace!(cache_id = %id, "finalized op");
            self.cache_id = Some(id);
        }
        Ok(self.cache_id.as_deref().unwrap_or_default())
    }

    fn require_finalized(&self, what: &str) -> OpResult<()> {
        if self.is_finalized() {
            Ok(())
        } else {
            Err(OpError::contract(format!(
                "{} must be finalized before {what}",
                self.kind()
            )))
        }
    }

    /// Builds the CPU evaluator.
    pub fn cpu_kernel(&self) -> OpResult<CpuOp> {
        self.require_finalized("building a CPU kernel")?;
        Ok(match &self.data {
            OpData::Lut1D(d) => CpuOp::Lut1D(d.clone()),
            OpData::Lut3D(d) => CpuOp::Lut3D(d.clone()),
            OpData::FixedFunction(d) => CpuOp::FixedFunction(d.clone()),
            OpData::Range(d) => CpuOp::Range(*d),
            OpData::Matrix(d) => CpuOp::Matrix(*d),
        })
    }

    /// Appends this op's fragment to the shader body.
    pub fn emit_gpu(&self, desc: &mut GpuShaderDesc) -> OpResult<()> {
        self.require_finalized("emitting shader code")?;
        let mut st = desc.new_text();
        st.line(format!("// {}", self.kind()));
        st.line("{");
        st.indent();
        match &self.data {
            OpData::Lut1D(d) => gpu::emit_lut1d(&mut st, desc, d),
            OpData::Lut3D(d) => gpu::emit_lut3d(&mut st, desc, d),
            OpData::FixedFunction(d) => gpu::emit_fixed_function(&mut st, desc, d),
            OpData::Range(d) => gpu::emit_range(&mut st, desc, d),
            OpData::Matrix(d) => gpu::emit_matrix(&mut st, desc, d),
        }
        st.dedent();
        st.line("}");
        desc.add_to_function_body(st.text());
        Ok(())
    }
}
