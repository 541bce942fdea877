//! Fixed-function fragments, mirroring the CPU kernels.

use super::{GpuShaderDesc, GpuShaderText, float, vec3};
use crate::cpu::fixed_function::{AP1_LUMA, REC2100_LUMA, REC2100_MIN_LUM, luv, pq};
use crate::data::{FixedFunctionData, FixedFunctionStyle};

pub(crate) fn emit_fixed_function(
    st: &mut GpuShaderText,
    desc: &GpuShaderDesc,
    data: &FixedFunctionData,
) {
    use FixedFunctionStyle::*;
    let px = desc.pixel_name();
    let gamma = data.params().first().copied().unwrap_or(1.0) as f32;
    st.line(format!("vec3 px = {px}.rgb;"));
    match data.style() {
        AcesRedMod03Fwd => red_mod(st, 0.15, 1.909_859_3, false, true),
        AcesRedMod03Inv => red_mod(st, 0.15, 1.909_859_3, true, true),
        AcesRedMod10Fwd => red_mod(st, 0.18, 1.697_652_7, false, false),
        AcesRedMod10Inv => red_mod(st, 0.18, 1.697_652_7, true, false),
        AcesGlow03Fwd => glow(st, 0.075, 0.1, false),
        AcesGlow03Inv => glow(st, 0.075, 0.1, true),
        AcesGlow10Fwd => glow(st, 0.05, 0.08, false),
        AcesGlow10Inv => glow(st, 0.05, 0.08, true),
        AcesDarkToDim10Fwd => surround(st, AP1_LUMA, 0.9811, 1e-10, false),
        AcesDarkToDim10Inv => surround(st, AP1_LUMA, 1.019_264_1, 1e-10, false),
        Rec2100SurroundFwd => surround(st, REC2100_LUMA, gamma, REC2100_MIN_LUM, true),
        Rec2100SurroundInv => {
            surround(st, REC2100_LUMA, 1.0 / gamma, REC2100_MIN_LUM.powf(gamma), true)
        }
        XyzToXyy => {
            st.line("float d = px.x + px.y + px.z;");
            st.line("d = (d == 0.0) ? 0.0 : 1.0 / d;");
            st.line("px = vec3(px.x * d, px.y * d, px.y);");
        }
        XyyToXyz => {
            st.line("float d = (px.y == 0.0) ? 0.0 : 1.0 / px.y;");
            st.line("px = vec3(px.z * px.x * d, px.z, px.z * (1.0 - px.x - px.y) * d);");
        }
        XyzToUvy => {
            st.line("float d = px.x + 15.0 * px.y + 3.0 * px.z;");
            st.line("d = (d == 0.0) ? 0.0 : 1.0 / d;");
            st.line("px = vec3(4.0 * px.x * d, 9.0 * px.y * d, px.y);");
        }
        UvyToXyz => {
            st.line("float d = (px.y == 0.0) ? 0.0 : 1.0 / px.y;");
            st.line(
                "px = vec3(2.25 * px.z * px.x * d, px.z, \
                 0.75 * px.z * (4.0 - px.x - 6.6666667 * px.y) * d);",
            );
        }
        XyzToLuv => {
            st.line("float d = px.x + 15.0 * px.y + 3.0 * px.z;");
            st.line("d = (d == 0.0) ? 0.0 : 1.0 / d;");
            st.line("float u = 4.0 * px.x * d;");
            st.line("float v = 9.0 * px.y * d;");
            st.line(format!(
                "float l = (px.y <= {}) ? {} * px.y : 1.16 * pow(px.y, 1.0 / 3.0) - 0.16;",
                float(luv::Y_BREAK),
                float(luv::KAPPA)
            ));
            st.line(format!(
                "px = vec3(l, 13.0 * l * (u - {}), 13.0 * l * (v - {}));",
                float(luv::U_N),
                float(luv::V_N)
            ));
        }
        LuvToXyz => {
            st.line("float d = (px.x == 0.0) ? 0.0 : 1.0 / (13.0 * px.x);");
            st.line(format!("float u = px.y * d + {};", float(luv::U_N)));
            st.line(format!("float v = px.z * d + {};", float(luv::V_N)));
            st.line("float t = (px.x + 0.16) / 1.16;");
            st.line(format!(
                "float y = (px.x <= {}) ? px.x / {} : t * t * t;",
                float(luv::L_BREAK),
                float(luv::KAPPA)
            ));
            st.line("float dd = (v == 0.0) ? 0.0 : 0.25 / v;");
            st.line("px = vec3(9.0 * y * u * dd, y, y * (12.0 - 3.0 * u - 20.0 * v) * dd);");
        }
        LinToPq => {
            st.line(format!("vec3 y = pow(abs(px) * 0.01, vec3({}));", float(pq::M1)));
            st.line(format!(
                "vec3 n = pow(({} + {} * y) / (1.0 + {} * y), vec3({}));",
                float(pq::C1),
                float(pq::C2),
                float(pq::C3),
                float(pq::M2)
            ));
            st.line("px = mix(-n, n, step(0.0, px));");
        }
        PqToLin => {
            st.line(format!("vec3 x = pow(abs(px), vec3({}));", float(1.0 / pq::M2)));
            st.line(format!(
                "vec3 nits = 100.0 * pow(max(x - {}, 0.0) / ({} - {} * x), vec3({}));",
                float(pq::C1),
                float(pq::C2),
                float(pq::C3),
                float(1.0 / pq::M1)
            ));
            st.line("px = mix(-nits, nits, step(0.0, px));");
        }
    }
    st.line(format!("{px}.rgb = px;"));
}

fn sat_weight(st: &mut GpuShaderText, noise_limit: f32) {
    st.line("float hi = max(px.r, max(px.g, px.b));");
    st.line("float lo = min(px.r, min(px.g, px.b));");
    st.line(format!(
        "float sat = (max(hi, 1e-10) - max(lo, 1e-10)) / max(hi, {});",
        float(noise_limit)
    ));
}

fn red_mod(st: &mut GpuShaderText, one_minus_scale: f32, inv_width: f32, inverse: bool, keep_hue: bool) {
    let k = float(one_minus_scale);
    let pivot = float(0.03);
    st.line("float a = 2.0 * px.r - (px.g + px.b);");
    st.line("float b = 1.7320508 * (px.g - px.b);");
    st.line(format!("float knot = atan(b, a) * {} + 2.0;", float(inv_width)));
    st.line("float j = floor(knot);");
    st.line("float fH = 0.0;");
    st.line("if (j >= 0.0 && j < 4.0)");
    st.line("{");
    st.indent();
    st.line("float t = knot - j;");
    st.line(
        "vec4 cf = (j < 1.0) ? vec4(0.25, 0.0, 0.0, 0.0) \
         : (j < 2.0) ? vec4(-0.75, 0.75, 0.75, 0.25) \
         : (j < 3.0) ? vec4(0.75, -1.5, 0.0, 1.0) \
         : vec4(-0.25, 0.75, -0.75, 0.25);",
    );
    st.line("fH = cf.w + t * (cf.z + t * (cf.y + t * cf.x));");
    st.dedent();
    st.line("}");
    st.line("if (fH > 0.0)");
    st.line("{");
    st.indent();
    st.line("float red = px.r;");
    if inverse {
        st.line("float mn = min(px.g, px.b);");
        st.line(format!("float qa = fH * {k} - 1.0;"));
        st.line(format!("float qb = red - fH * ({pivot} + mn) * {k};"));
        st.line(format!("float qc = fH * {pivot} * mn * {k};"));
        st.line("float newRed = (-qb - sqrt(max(qb * qb - 4.0 * qa * qc, 0.0))) / (2.0 * qa);");
    } else {
        sat_weight(st, 1e-2);
        st.line(format!("float newRed = red + fH * sat * ({pivot} - red) * {k};"));
    }
    if keep_hue {
        st.line("if (px.g >= px.b)");
        st.line("{");
        st.indent();
        st.line("px.g = (px.g - px.b) / max(red - px.b, 1e-10) * (newRed - px.b) + px.b;");
        st.dedent();
        st.line("}");
        st.line("else");
        st.line("{");
        st.indent();
        st.line("px.b = (px.b - px.g) / max(red - px.g, 1e-10) * (newRed - px.g) + px.g;");
        st.dedent();
        st.line("}");
    }
    st.line("px.r = newRed;");
    st.dedent();
    st.line("}");
}

fn glow(st: &mut GpuShaderText, gain: f32, mid: f32, inverse: bool) {
    let two_mid = float(mid * 2.0);
    let low = float(mid * 2.0 / 3.0);
    let mid = float(mid);
    st.line(
        "float chroma = sqrt(max(px.b * (px.b - px.g) + px.g * (px.g - px.r) + px.r * (px.r - px.b), 0.0));",
    );
    st.line("float yc = (px.b + px.g + px.r + 1.75 * chroma) / 3.0;");
    sat_weight(st, 1e-2);
    st.line("float x = (sat - 0.4) * 5.0;");
    st.line("float sgn = (x < 0.0) ? -1.0 : 1.0;");
    st.line("float t = max(1.0 - 0.5 * sgn * x, 0.0);");
    st.line(format!("float gain = {} * (1.0 + sgn * (1.0 - t * t)) * 0.5;", float(gain)));
    if inverse {
        st.line(format!(
            "float g = (yc >= {two_mid}) ? 0.0 \
             : (yc <= (1.0 + gain) * {low}) ? -gain / (1.0 + gain) \
             : gain * ({mid} / yc - 0.5) / (gain * 0.5 - 1.0);"
        ));
    } else {
        st.line(format!(
            "float g = (yc >= {two_mid}) ? 0.0 : (yc <= {low}) ? gain : gain * ({mid} / yc - 0.5);"
        ));
    }
    st.line("px *= 1.0 + g;");
}

fn surround(st: &mut GpuShaderText, weights: [f32; 3], gamma: f32, min_lum: f32, mirror: bool) {
    let y = format!("dot(px, {})", vec3(weights));
    let y = if mirror { format!("abs({y})") } else { y };
    st.line(format!("float y = max({y}, {});", float(min_lum)));
    st.line(format!("px *= pow(y, {});", float(gamma - 1.0)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(style: FixedFunctionStyle, params: Vec<f64>) -> String {
        let desc = GpuShaderDesc::default();
        let mut st = desc.new_text();
        emit_fixed_function(&mut st, &desc, &FixedFunctionData::new(style, params));
        st.into_string()
    }

    #[test]
    fn every_style_writes_back() {
        for style in FixedFunctionStyle::ALL {
            let params = if style.param_count() == 1 { vec![0.9] } else { vec![] };
            let text = render(style, params);
            assert!(text.starts_with("    vec3 px = outColor.rgb;"), "{style}");
            assert!(text.trim_end().ends_with("outColor.rgb = px;"), "{style}");
        }
    }

    #[test]
    fn braces_balance() {
        for style in FixedFunctionStyle::ALL {
            let text = render(style, vec![1.5]);
            assert_eq!(text.matches('{').count(), text.matches('}').count(), "{style}");
        }
    }

    #[test]
    fn red_mod_03_restores_hue() {
        assert!(render(FixedFunctionStyle::AcesRedMod03Fwd, vec![]).contains("newRed - px.b"));
        assert!(!render(FixedFunctionStyle::AcesRedMod10Fwd, vec![]).contains("newRed - px.b"));
    }
}
