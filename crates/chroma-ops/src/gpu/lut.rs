//! LUT fragments.
//!
//! 1D tables live in `length x 1` 2D textures, 3D tables in cube textures
//! with red along x. Samples are addressed at texel centers.

use chroma_lut::{Interpolation, inverse_search_steps};

use super::{GpuInterpolation, GpuShaderDesc, GpuShaderText, GpuTexture, GpuTextureType, float};
use crate::TransformDirection;
use crate::data::{Lut1DOpData, Lut3DOpData};

const CHANNELS: [char; 3] = ['r', 'g', 'b'];

pub(crate) fn emit_lut1d(st: &mut GpuShaderText, desc: &mut GpuShaderDesc, data: &Lut1DOpData) {
    let lut = data.lut();
    let n = lut.length();
    let inverse = data.direction() == TransformDirection::Inverse;
    let interpolation = if inverse || data.interpolation() == Interpolation::Nearest {
        GpuInterpolation::Nearest
    } else {
        GpuInterpolation::Linear
    };
    let name = desc.unique_name("lut1d");
    let sampler = desc.add_texture(GpuTexture {
        name,
        texture_type: GpuTextureType::Texture2D,
        width: n as u32,
        height: 1,
        depth: 1,
        data: lut.values().to_vec(),
        interpolation,
    });

    let tex = st.language().texture_2d();
    let px = desc.pixel_name().to_string();
    let nf = float(n as f32);

    if !inverse {
        let scale = float((n - 1) as f32 / n as f32);
        let offset = float(0.5 / n as f32);
        st.line(format!(
            "vec3 coords = clamp({px}.rgb, 0.0, 1.0) * {scale} + {offset};"
        ));
        for c in CHANNELS {
            st.line(format!(
                "{px}.{c} = {tex}({sampler}, vec2(coords.{c}, 0.5)).{c};"
            ));
        }
        return;
    }

    // Same bisection as the CPU evaluator, one channel at a time.
    let steps = inverse_search_steps(n);
    let last = float((n - 1) as f32);
    let fetch = |idx: &str, c: char| format!("{tex}({sampler}, vec2(({idx} + 0.5) / {nf}, 0.5)).{c}");
    for c in CHANNELS {
        st.line("{");
        st.indent();
        st.line(format!("float y = {px}.{c};"));
        st.line(format!("if (y <= {})", fetch("0.0", c)));
        st.line("{");
        st.indent();
        st.line(format!("{px}.{c} = 0.0;"));
        st.dedent();
        st.line("}");
        st.line(format!("else if (y >= {})", fetch(&last, c)));
        st.line("{");
        st.indent();
        st.line(format!("{px}.{c} = 1.0;"));
        st.dedent();
        st.line("}");
        st.line("else");
        st.line("{");
        st.indent();
        st.line("float lo = 0.0;");
        st.line(format!("float hi = {last};"));
        st.line(format!("for (int i = 0; i < {steps}; ++i)"));
        st.line("{");
        st.indent();
        st.line("if (hi - lo <= 1.0) break;");
        st.line("float mid = floor((lo + hi) * 0.5);");
        st.line(format!("if ({} <= y) lo = mid; else hi = mid;", fetch("mid", c)));
        st.dedent();
        st.line("}");
        st.line(format!("float v0 = {};", fetch("lo", c)));
        st.line(format!("float v1 = {};", fetch("lo + 1.0", c)));
        st.line("float t = (v1 > v0) ? (y - v0) / (v1 - v0) : 0.0;");
        st.line(format!("{px}.{c} = (lo + t) / {last};"));
        st.dedent();
        st.line("}");
        st.dedent();
        st.line("}");
    }
}

pub(crate) fn emit_lut3d(st: &mut GpuShaderText, desc: &mut GpuShaderDesc, data: &Lut3DOpData) {
    let lut = data.effective_lut();
    let n = lut.grid_size();
    let tetrahedral = data.interpolation() == Interpolation::Tetrahedral;
    let interpolation = match data.interpolation() {
        Interpolation::Linear => GpuInterpolation::Linear,
        Interpolation::Nearest | Interpolation::Tetrahedral => GpuInterpolation::Nearest,
    };
    let name = desc.unique_name("lut3d");
    let sampler = desc.add_texture(GpuTexture {
        name,
        texture_type: GpuTextureType::Texture3D,
        width: n as u32,
        height: n as u32,
        depth: n as u32,
        data: lut.values().to_vec(),
        interpolation,
    });

    let tex = st.language().texture_3d();
    let px = desc.pixel_name().to_string();
    let nf = float(n as f32);

    if !tetrahedral {
        let scale = float((n - 1) as f32 / n as f32);
        let offset = float(0.5 / n as f32);
        st.line(format!(
            "vec3 coords = clamp({px}.rgb, 0.0, 1.0) * {scale} + {offset};"
        ));
        st.line(format!("{px}.rgb = {tex}({sampler}, coords).rgb;"));
        return;
    }

    let fetch = |dr: u8, dg: u8, db: u8| {
        format!(
            "{tex}({sampler}, (base + vec3({dr}.0, {dg}.0, {db}.0) + 0.5) / {nf}).rgb"
        )
    };
    st.line(format!(
        "vec3 pos = clamp({px}.rgb, 0.0, 1.0) * {};",
        float((n - 1) as f32)
    ));
    st.line(format!("vec3 base = min(floor(pos), vec3({}));", float((n - 2) as f32)));
    st.line("vec3 f = pos - base;");
    for (var, (dr, dg, db)) in [
        ("v000", (0, 0, 0)),
        ("v100", (1, 0, 0)),
        ("v010", (0, 1, 0)),
        ("v110", (1, 1, 0)),
        ("v001", (0, 0, 1)),
        ("v101", (1, 0, 1)),
        ("v011", (0, 1, 1)),
        ("v111", (1, 1, 1)),
    ] {
        st.line(format!("vec3 {var} = {};", fetch(dr, dg, db)));
    }
    let branch = |st: &mut GpuShaderText, expr: &str| {
        st.line("{");
        st.indent();
        st.line(format!("{px}.rgb = {expr};"));
        st.dedent();
        st.line("}");
    };
    st.line("if (f.r > f.g)");
    st.line("{");
    st.indent();
    st.line("if (f.g > f.b)");
    branch(st, "v000 + f.r * (v100 - v000) + f.g * (v110 - v100) + f.b * (v111 - v110)");
    st.line("else if (f.r > f.b)");
    branch(st, "v000 + f.r * (v100 - v000) + f.b * (v101 - v100) + f.g * (v111 - v101)");
    st.line("else");
    branch(st, "v000 + f.b * (v001 - v000) + f.r * (v101 - v001) + f.g * (v111 - v101)");
    st.dedent();
    st.line("}");
    st.line("else if (f.g > f.b)");
    st.line("{");
    st.indent();
    st.line("if (f.r > f.b)");
    branch(st, "v000 + f.g * (v010 - v000) + f.r * (v110 - v010) + f.b * (v111 - v110)");
    st.line("else");
    branch(st, "v000 + f.g * (v010 - v000) + f.b * (v011 - v010) + f.r * (v111 - v011)");
    st.dedent();
    st.line("}");
    st.line("else");
    branch(st, "v000 + f.b * (v001 - v000) + f.g * (v011 - v001) + f.r * (v111 - v011)");
}
