//! Range and matrix fragments.

use super::{GpuShaderDesc, GpuShaderText};
use crate::data::{MatrixData, RangeData};

pub(crate) fn emit_range(st: &mut GpuShaderText, desc: &mut GpuShaderDesc, data: &RangeData) {
    let scale = desc.add_vec3_constant("range_scale", data.scale().map(|v| v as f32));
    let offset = desc.add_vec3_constant("range_offset", data.offset().map(|v| v as f32));
    let px = desc.pixel_name().to_string();
    st.line(format!("{px}.rgb = {px}.rgb * {scale} + {offset};"));
    if let Some((lower, upper)) = data.clamp_bounds() {
        let lower = desc.add_vec3_constant("range_lower", lower.map(|v| v as f32));
        let upper = desc.add_vec3_constant("range_upper", upper.map(|v| v as f32));
        st.line(format!("{px}.rgb = clamp({px}.rgb, {lower}, {upper});"));
    }
}

pub(crate) fn emit_matrix(st: &mut GpuShaderText, desc: &mut GpuShaderDesc, data: &MatrixData) {
    let m = desc.add_mat3_constant("matrix", data.matrix().map(|row| row.map(|v| v as f32)));
    let offset = desc.add_vec3_constant("matrix_offset", data.offset().map(|v| v as f32));
    let px = desc.pixel_name();
    st.line(format!("{px}.rgb = {m} * {px}.rgb + {offset};"));
}
