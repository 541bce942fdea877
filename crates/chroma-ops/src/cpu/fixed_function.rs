//! CPU kernels for fixed-function styles.
//!
//! All kernels operate on one RGB triple in place.

use crate::data::{FixedFunctionData, FixedFunctionStyle};

/// Applies a fixed-function style to one pixel.
pub fn apply(data: &FixedFunctionData, rgb: &mut [f32; 3]) {
    use FixedFunctionStyle::*;
    let gamma = data.params().first().copied().unwrap_or(1.0) as f32;
    match data.style() {
        AcesRedMod03Fwd => red_mod_03_fwd(rgb),
        AcesRedMod03Inv => red_mod_03_inv(rgb),
        AcesRedMod10Fwd => red_mod_10_fwd(rgb),
        AcesRedMod10Inv => red_mod_10_inv(rgb),
        AcesGlow03Fwd => glow_fwd(rgb, &GLOW_03),
        AcesGlow03Inv => glow_inv(rgb, &GLOW_03),
        AcesGlow10Fwd => glow_fwd(rgb, &GLOW_10),
        AcesGlow10Inv => glow_inv(rgb, &GLOW_10),
        AcesDarkToDim10Fwd => dark_to_dim(rgb, DARK_TO_DIM_GAMMA),
        AcesDarkToDim10Inv => dark_to_dim(rgb, DIM_TO_DARK_GAMMA),
        Rec2100SurroundFwd => rec2100_surround(rgb, gamma, REC2100_MIN_LUM),
        Rec2100SurroundInv => rec2100_surround(rgb, 1.0 / gamma, REC2100_MIN_LUM.powf(gamma)),
        XyzToXyy => *rgb = xyz_to_xyy(*rgb),
        XyyToXyz => *rgb = xyy_to_xyz(*rgb),
        XyzToUvy => *rgb = xyz_to_uvy(*rgb),
        UvyToXyz => *rgb = uvy_to_xyz(*rgb),
        XyzToLuv => *rgb = xyz_to_luv(*rgb),
        LuvToXyz => *rgb = luv_to_xyz(*rgb),
        LinToPq => rgb.iter_mut().for_each(|v| *v = lin_to_pq(*v)),
        PqToLin => rgb.iter_mut().for_each(|v| *v = pq_to_lin(*v)),
    }
}

// --- CIE chromaticity ---

fn xyz_to_xyy([x, y, z]: [f32; 3]) -> [f32; 3] {
    let d = x + y + z;
    let d = if d == 0.0 { 0.0 } else { 1.0 / d };
    [x * d, y * d, y]
}

fn xyy_to_xyz([x, y, lum]: [f32; 3]) -> [f32; 3] {
    let d = if y == 0.0 { 0.0 } else { 1.0 / y };
    [lum * x * d, lum, lum * (1.0 - x - y) * d]
}

fn xyz_to_uvy([x, y, z]: [f32; 3]) -> [f32; 3] {
    let d = x + 15.0 * y + 3.0 * z;
    let d = if d == 0.0 { 0.0 } else { 1.0 / d };
    [4.0 * x * d, 9.0 * y * d, y]
}

fn uvy_to_xyz([u, v, lum]: [f32; 3]) -> [f32; 3] {
    let d = if v == 0.0 { 0.0 } else { 1.0 / v };
    [
        (9.0 / 4.0) * lum * u * d,
        lum,
        (3.0 / 4.0) * lum * (4.0 - u - (20.0 / 3.0) * v) * d,
    ]
}

/// D65 white u'v' and the L* break points, L* normalized to `[0, 1]`.
pub(crate) mod luv {
    pub const U_N: f32 = 0.197_830_01;
    pub const V_N: f32 = 0.468_319_99;
    pub const Y_BREAK: f32 = 0.008_856_451_679;
    pub const L_BREAK: f32 = 0.08;
    pub const KAPPA: f32 = 9.032_963;
}

fn xyz_to_luv([x, y, z]: [f32; 3]) -> [f32; 3] {
    let d = x + 15.0 * y + 3.0 * z;
    let d = if d == 0.0 { 0.0 } else { 1.0 / d };
    let u = 4.0 * x * d;
    let v = 9.0 * y * d;
    let l = if y <= luv::Y_BREAK {
        luv::KAPPA * y
    } else {
        1.16 * y.cbrt() - 0.16
    };
    [l, 13.0 * l * (u - luv::U_N), 13.0 * l * (v - luv::V_N)]
}

fn luv_to_xyz([l, us, vs]: [f32; 3]) -> [f32; 3] {
    let d = if l == 0.0 { 0.0 } else { 1.0 / (13.0 * l) };
    let u = us * d + luv::U_N;
    let v = vs * d + luv::V_N;
    let y = if l <= luv::L_BREAK {
        l / luv::KAPPA
    } else {
        let t = (l + 0.16) / 1.16;
        t * t * t
    };
    let dd = if v == 0.0 { 0.0 } else { 0.25 / v };
    [9.0 * y * u * dd, y, y * (12.0 - 3.0 * u - 20.0 * v) * dd]
}

// --- ACES red modifier ---

struct RedMod {
    one_minus_scale: f32,
    pivot: f32,
    inv_width: f32,
    noise_limit: f32,
}

const RED_MOD_03: RedMod = RedMod {
    one_minus_scale: 0.15,
    pivot: 0.03,
    inv_width: 1.909_859_3,
    noise_limit: 1e-2,
};

const RED_MOD_10: RedMod = RedMod {
    one_minus_scale: 0.18,
    pivot: 0.03,
    inv_width: 1.697_652_7,
    noise_limit: 1e-2,
};

const HUE_BSPLINE: [[f32; 4]; 4] = [
    [0.25, 0.00, 0.00, 0.00],
    [-0.75, 0.75, 0.75, 0.25],
    [0.75, -1.50, 0.00, 1.00],
    [-0.25, 0.75, -0.75, 0.25],
];

fn sat_weight([r, g, b]: [f32; 3], noise_limit: f32) -> f32 {
    let lo = r.min(g.min(b));
    let hi = r.max(g.max(b));
    (hi.max(1e-10) - lo.max(1e-10)) / hi.max(noise_limit)
}

fn hue_weight([r, g, b]: [f32; 3], inv_width: f32) -> f32 {
    let a = 2.0 * r - (g + b);
    let bb = 3f32.sqrt() * (g - b);
    let knot = bb.atan2(a) * inv_width + 2.0;
    let j = knot.floor();
    if !(0.0..4.0).contains(&j) {
        return 0.0;
    }
    let t = knot - j;
    let c = &HUE_BSPLINE[j as usize];
    c[3] + t * (c[2] + t * (c[1] + t * c[0]))
}

/// Solves `red_out = red + fH * (red - min) / red * (pivot - red) * k` for red.
fn solve_red(red_out: f32, min_chan: f32, f_h: f32, p: &RedMod) -> f32 {
    let a = f_h * p.one_minus_scale - 1.0;
    let b = red_out - f_h * (p.pivot + min_chan) * p.one_minus_scale;
    let c = f_h * p.pivot * min_chan * p.one_minus_scale;
    let disc = (b * b - 4.0 * a * c).max(0.0);
    (-b - disc.sqrt()) / (2.0 * a)
}

fn red_mod_10_fwd(rgb: &mut [f32; 3]) {
    let p = &RED_MOD_10;
    let f_h = hue_weight(*rgb, p.inv_width);
    if f_h > 0.0 {
        let f_s = sat_weight(*rgb, p.noise_limit);
        rgb[0] += f_h * f_s * (p.pivot - rgb[0]) * p.one_minus_scale;
    }
}

fn red_mod_10_inv(rgb: &mut [f32; 3]) {
    let p = &RED_MOD_10;
    let f_h = hue_weight(*rgb, p.inv_width);
    if f_h > 0.0 {
        rgb[0] = solve_red(rgb[0], rgb[1].min(rgb[2]), f_h, p);
    }
}

// The 0.3 variant keeps hue by moving the middle channel with red.
fn restore_hue(rgb: &mut [f32; 3], old_red: f32, new_red: f32) {
    let [_, g, b] = *rgb;
    if g >= b {
        let fac = (g - b) / (old_red - b).max(1e-10);
        rgb[1] = fac * (new_red - b) + b;
    } else {
        let fac = (b - g) / (old_red - g).max(1e-10);
        rgb[2] = fac * (new_red - g) + g;
    }
    rgb[0] = new_red;
}

fn red_mod_03_fwd(rgb: &mut [f32; 3]) {
    let p = &RED_MOD_03;
    let f_h = hue_weight(*rgb, p.inv_width);
    if f_h > 0.0 {
        let f_s = sat_weight(*rgb, p.noise_limit);
        let red = rgb[0];
        let new_red = red + f_h * f_s * (p.pivot - red) * p.one_minus_scale;
        restore_hue(rgb, red, new_red);
    }
}

fn red_mod_03_inv(rgb: &mut [f32; 3]) {
    let p = &RED_MOD_03;
    let f_h = hue_weight(*rgb, p.inv_width);
    if f_h > 0.0 {
        let red = rgb[0];
        let new_red = solve_red(red, rgb[1].min(rgb[2]), f_h, p);
        restore_hue(rgb, red, new_red);
    }
}

// --- ACES glow ---

struct Glow {
    gain: f32,
    mid: f32,
    noise_limit: f32,
}

const GLOW_03: Glow = Glow {
    gain: 0.075,
    mid: 0.1,
    noise_limit: 1e-2,
};

const GLOW_10: Glow = Glow {
    gain: 0.05,
    mid: 0.08,
    noise_limit: 1e-2,
};

fn rgb_to_yc([r, g, b]: [f32; 3]) -> f32 {
    const RADIUS_WEIGHT: f32 = 1.75;
    let chroma = (b * (b - g) + g * (g - r) + r * (r - b)).max(0.0).sqrt();
    (b + g + r + RADIUS_WEIGHT * chroma) / 3.0
}

fn sigmoid_shaper(sat: f32) -> f32 {
    let x = (sat - 0.4) * 5.0;
    let sign = x.signum();
    let t = (1.0 - 0.5 * sign * x).max(0.0);
    (1.0 + sign * (1.0 - t * t)) * 0.5
}

fn glow_gain(rgb: [f32; 3], p: &Glow) -> (f32, f32) {
    let yc = rgb_to_yc(rgb);
    let s = sigmoid_shaper(sat_weight(rgb, p.noise_limit));
    (yc, p.gain * s)
}

fn glow_fwd(rgb: &mut [f32; 3], p: &Glow) {
    let (yc, gain) = glow_gain(*rgb, p);
    let out = if yc >= p.mid * 2.0 {
        0.0
    } else if yc <= p.mid * 2.0 / 3.0 {
        gain
    } else {
        gain * (p.mid / yc - 0.5)
    };
    rgb.iter_mut().for_each(|v| *v *= 1.0 + out);
}

fn glow_inv(rgb: &mut [f32; 3], p: &Glow) {
    let (yc, gain) = glow_gain(*rgb, p);
    let out = if yc >= p.mid * 2.0 {
        0.0
    } else if yc <= (1.0 + gain) * p.mid * 2.0 / 3.0 {
        -gain / (1.0 + gain)
    } else {
        gain * (p.mid / yc - 0.5) / (gain * 0.5 - 1.0)
    };
    rgb.iter_mut().for_each(|v| *v *= 1.0 + out);
}

// --- Surround corrections ---

const DARK_TO_DIM_GAMMA: f32 = 0.9811;
const DIM_TO_DARK_GAMMA: f32 = 1.019_264_1;

/// AP1 luminance weights.
pub(crate) const AP1_LUMA: [f32; 3] = [0.272_228_72, 0.674_081_77, 0.053_689_517];
/// Rec.2100 luminance weights.
pub(crate) const REC2100_LUMA: [f32; 3] = [0.2627, 0.6780, 0.0593];

fn luma(rgb: [f32; 3], w: [f32; 3]) -> f32 {
    w[0] * rgb[0] + w[1] * rgb[1] + w[2] * rgb[2]
}

fn dark_to_dim(rgb: &mut [f32; 3], gamma: f32) {
    let y = luma(*rgb, AP1_LUMA).max(1e-10);
    let k = y.powf(gamma - 1.0);
    rgb.iter_mut().for_each(|v| *v *= k);
}

pub(crate) const REC2100_MIN_LUM: f32 = 1e-4;

/// Rec.2100 surround with an effective gamma; the inverse passes `1 / gamma`.
fn rec2100_surround(rgb: &mut [f32; 3], gamma: f32, min_lum: f32) {
    let y = luma(*rgb, REC2100_LUMA).abs().max(min_lum);
    let k = y.powf(gamma - 1.0);
    rgb.iter_mut().for_each(|v| *v *= k);
}

// --- ST 2084 ---

pub(crate) mod pq {
    pub const M1: f32 = 0.159_301_76;
    pub const M2: f32 = 78.843_75;
    pub const C1: f32 = 0.835_937_5;
    pub const C2: f32 = 18.851_563;
    pub const C3: f32 = 18.6875;
}

/// Linear (1.0 = 100 nits) to PQ, mirrored around zero.
fn lin_to_pq(v: f32) -> f32 {
    let y = (v * 0.01).abs().powf(pq::M1);
    ((pq::C1 + pq::C2 * y) / (1.0 + pq::C3 * y)).powf(pq::M2).copysign(v)
}

/// PQ to linear (1.0 = 100 nits), mirrored around zero.
fn pq_to_lin(v: f32) -> f32 {
    let x = v.abs().powf(1.0 / pq::M2);
    let nits = ((x - pq::C1).max(0.0) / (pq::C2 - pq::C3 * x)).powf(1.0 / pq::M1);
    (100.0 * nits).copysign(v)
}
