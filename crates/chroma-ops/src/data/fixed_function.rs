//! Fixed-function op data: a closed set of named color functions.
//!
//! Each style comes in a forward/inverse pair. The parameter list is
//! style-dependent; only Rec.2100 surround takes one (the surround gamma).

use std::fmt;

use crate::{OpError, OpResult, TransformDirection};

/// Lower bound of the Rec.2100 surround gamma.
pub const REC2100_GAMMA_MIN: f64 = 0.01;
/// Upper bound of the Rec.2100 surround gamma.
pub const REC2100_GAMMA_MAX: f64 = 100.0;

/// Supported fixed-function styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FixedFunctionStyle {
    /// ACES 0.3/0.7 red modifier.
    #[default]
    AcesRedMod03Fwd,
    /// Inverse ACES 0.3/0.7 red modifier.
    AcesRedMod03Inv,
    /// ACES 1.0 red modifier.
    AcesRedMod10Fwd,
    /// Inverse ACES 1.0 red modifier.
    AcesRedMod10Inv,
    /// ACES 0.3/0.7 glow.
    AcesGlow03Fwd,
    /// Inverse ACES 0.3/0.7 glow.
    AcesGlow03Inv,
    /// ACES 1.0 glow.
    AcesGlow10Fwd,
    /// Inverse ACES 1.0 glow.
    AcesGlow10Inv,
    /// ACES 1.0 dark to dim surround.
    AcesDarkToDim10Fwd,
    /// ACES 1.0 dim to dark surround.
    AcesDarkToDim10Inv,
    /// Rec.2100 surround correction, one gamma parameter.
    Rec2100SurroundFwd,
    /// Inverse Rec.2100 surround correction.
    Rec2100SurroundInv,
    /// CIE XYZ to xyY.
    XyzToXyy,
    /// CIE xyY to XYZ.
    XyyToXyz,
    /// CIE XYZ to u'v'Y.
    XyzToUvy,
    /// CIE u'v'Y to XYZ.
    UvyToXyz,
    /// CIE XYZ to L*u*v*.
    XyzToLuv,
    /// CIE L*u*v* to XYZ.
    LuvToXyz,
    /// Linear (1.0 = 100 nits) to ST 2084 PQ.
    LinToPq,
    /// ST 2084 PQ to linear (1.0 = 100 nits).
    PqToLin,
}

impl FixedFunctionStyle {
    /// Every style, in declaration order.
    pub const ALL: [FixedFunctionStyle; 20] = [
        Self::AcesRedMod03Fwd,
        Self::AcesRedMod03Inv,
        Self::AcesRedMod10Fwd,
        Self::AcesRedMod10Inv,
        Self::AcesGlow03Fwd,
        Self::AcesGlow03Inv,
        Self::AcesGlow10Fwd,
        Self::AcesGlow10Inv,
        Self::AcesDarkToDim10Fwd,
        Self::AcesDarkToDim10Inv,
        Self::Rec2100SurroundFwd,
        Self::Rec2100SurroundInv,
        Self::XyzToXyy,
        Self::XyyToXyz,
        Self::XyzToUvy,
        Self::UvyToXyz,
        Self::XyzToLuv,
        Self::LuvToXyz,
        Self::LinToPq,
        Self::PqToLin,
    ];

    /// The paired inverse style.
    pub fn inverse(self) -> Self {
        use FixedFunctionStyle::*;
        match self {
            AcesRedMod03Fwd => AcesRedMod03Inv,
            AcesRedMod03Inv => AcesRedMod03Fwd,
            AcesRedMod10Fwd => AcesRedMod10Inv,
            AcesRedMod10Inv => AcesRedMod10Fwd,
            AcesGlow03Fwd => AcesGlow03Inv,
            AcesGlow03Inv => AcesGlow03Fwd,
            AcesGlow10Fwd => AcesGlow10Inv,
            AcesGlow10Inv => AcesGlow10Fwd,
            AcesDarkToDim10Fwd => AcesDarkToDim10Inv,
            AcesDarkToDim10Inv => AcesDarkToDim10Fwd,
            Rec2100SurroundFwd => Rec2100SurroundInv,
            Rec2100SurroundInv => Rec2100SurroundFwd,
            XyzToXyy => XyyToXyz,
            XyyToXyz => XyzToXyy,
            XyzToUvy => UvyToXyz,
            UvyToXyz => XyzToUvy,
            XyzToLuv => LuvToXyz,
            LuvToXyz => XyzToLuv,
            LinToPq => PqToLin,
            PqToLin => LinToPq,
        }
    }

    /// Direction of this style relative to its pair.
    pub fn direction(self) -> TransformDirection {
        use FixedFunctionStyle::*;
        match self {
            AcesRedMod03Inv | AcesRedMod10Inv | AcesGlow03Inv | AcesGlow10Inv
            | AcesDarkToDim10Inv | Rec2100SurroundInv | XyyToXyz | UvyToXyz | LuvToXyz
            | PqToLin => TransformDirection::Inverse,
            _ => TransformDirection::Forward,
        }
    }

    /// Style family name, shared by both directions.
    pub fn family_name(self) -> &'static str {
        use FixedFunctionStyle::*;
        match self {
            AcesRedMod03Fwd | AcesRedMod03Inv => "ACES_RedMod03",
            AcesRedMod10Fwd | AcesRedMod10Inv => "ACES_RedMod10",
            AcesGlow03Fwd | AcesGlow03Inv => "ACES_Glow03",
            AcesGlow10Fwd | AcesGlow10Inv => "ACES_Glow10",
            AcesDarkToDim10Fwd | AcesDarkToDim10Inv => "ACES_DarkToDim10",
            Rec2100SurroundFwd | Rec2100SurroundInv => "REC2100_Surround",
            XyzToXyy => "XYZ_TO_xyY",
            XyyToXyz => "xyY_TO_XYZ",
            XyzToUvy => "XYZ_TO_uvY",
            UvyToXyz => "uvY_TO_XYZ",
            XyzToLuv => "XYZ_TO_LUV",
            LuvToXyz => "LUV_TO_XYZ",
            LinToPq => "Lin_TO_PQ",
            PqToLin => "PQ_TO_Lin",
        }
    }

    /// Full style name, including the direction for paired families.
    pub fn name(self) -> String {
        use FixedFunctionStyle::*;
        match self {
            XyzToXyy | XyyToXyz | XyzToUvy | UvyToXyz | XyzToLuv | LuvToXyz | LinToPq
            | PqToLin => self.family_name().to_string(),
            _ => {
                let dir = match self.direction() {
                    TransformDirection::Inverse => "Inverse",
                    _ => "Forward",
                };
                format!("{} ({dir})", self.family_name())
            }
        }
    }

    /// Number of parameters the style requires.
    pub fn param_count(self) -> usize {
        match self {
            Self::Rec2100SurroundFwd | Self::Rec2100SurroundInv => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for FixedFunctionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Style tag plus ordered numeric parameters.
///
/// The default is the ACES 0.3 red modifier with no parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FixedFunctionData {
    style: FixedFunctionStyle,
    params: Vec<f64>,
}

impl FixedFunctionData {
    /// Creates fixed-function data. Call [`validate`](Self::validate) before use.
    pub fn new(style: FixedFunctionStyle, params: Vec<f64>) -> Self {
        Self { style, params }
    }

    /// Style tag.
    pub fn style(&self) -> FixedFunctionStyle {
        self.style
    }

    /// Parameters.
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    /// Replaces the style.
    pub fn set_style(&mut self, style: FixedFunctionStyle) {
        self.style = style;
    }

    /// Replaces the parameters.
    pub fn set_params(&mut self, params: Vec<f64>) {
        self.params = params;
    }

    /// Direction implied by the style.
    pub fn direction(&self) -> TransformDirection {
        self.style.direction()
    }

    /// Checks parameter count and bounds for the style.
    pub fn validate(&self) -> OpResult<()> {
        match self.style {
            FixedFunctionStyle::Rec2100SurroundFwd | FixedFunctionStyle::Rec2100SurroundInv => {
                if self.params.len() != 1 {
                    return Err(OpError::Validation(format!(
                        "The style '{}' must have one parameter but {} found.",
                        self.style.family_name(),
                        self.params.len()
                    )));
                }
                check_bounds(self.params[0], REC2100_GAMMA_MIN, REC2100_GAMMA_MAX)
            }
            style => {
                if !self.params.is_empty() {
                    return Err(OpError::Validation(format!(
                        "The style '{}' must have zero parameters but {} found.",
                        style.name(),
                        self.params.len()
                    )));
                }
                Ok(())
            }
        }
    }

    /// Returns the data for the paired inverse style, same parameters.
    pub fn inverse(&self) -> Self {
        Self {
            style: self.style.inverse(),
            params: self.params.clone(),
        }
    }

    /// True when `other` undoes `self`.
    ///
    /// Paired styles with equal parameters are inverses. Rec.2100 surround
    /// in the same direction is also the inverse when the gammas are
    /// reciprocal.
    pub fn is_inverse_of(&self, other: &FixedFunctionData) -> bool {
        if self.style.inverse() == other.style {
            return params_equal(&self.params, &other.params);
        }
        if self.style == other.style && self.style.family_name() == "REC2100_Surround" {
            if let (Some(a), Some(b)) = (self.params.first(), other.params.first()) {
                return self.params.len() == 1
                    && other.params.len() == 1
                    && (a * b - 1.0).abs() <= PARAM_TOLERANCE;
            }
        }
        false
    }

    /// True when the function is guaranteed to be a no-op.
    ///
    /// Only Rec.2100 surround with a gamma of 1 qualifies.
    pub fn is_identity(&self) -> bool {
        match self.style {
            FixedFunctionStyle::Rec2100SurroundFwd | FixedFunctionStyle::Rec2100SurroundInv => {
                matches!(self.params.as_slice(), [g] if (g - 1.0).abs() <= PARAM_TOLERANCE)
            }
            _ => false,
        }
    }

    /// Deterministic id of style and parameters.
    pub fn cache_id(&self) -> String {
        let mut id = self.style.name();
        for p in &self.params {
            id.push(' ');
            id.push_str(&p.to_string());
        }
        id
    }
}

const PARAM_TOLERANCE: f64 = 1e-9;

fn params_equal(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= PARAM_TOLERANCE)
}

fn check_bounds(value: f64, lower: f64, upper: f64) -> OpResult<()> {
    // NaN compares false both ways; +inf falls through to the upper bound.
    if value.is_nan() || value < lower {
        return Err(OpError::Validation(format!(
            "Parameter {value} is less than lower bound {lower}"
        )));
    }
    if value > upper {
        return Err(OpError::Validation(format!(
            "Parameter {value} is greater than upper bound {upper}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::FixedFunctionStyle::*;
    use super::*;

    #[test]
    fn red_mod_style() {
        let mut func = FixedFunctionData::default();
        assert_eq!(func.style(), AcesRedMod03Fwd);
        assert!(func.params().is_empty());
        func.validate().unwrap();
        let id03 = func.cache_id();

        func.set_style(AcesRedMod10Fwd);
        func.validate().unwrap();
        assert_ne!(id03, func.cache_id());

        let inv = func.inverse();
        assert_eq!(inv.style(), AcesRedMod10Inv);
        assert!(inv.params().is_empty());
        assert_ne!(func.cache_id(), inv.cache_id());

        func.set_params(vec![1.0]);
        let err = func.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "The style 'ACES_RedMod10 (Forward)' must have zero parameters but 1 found."
        );
    }

    #[test]
    fn dark_to_dim_style() {
        let mut func = FixedFunctionData::new(AcesDarkToDim10Fwd, vec![]);
        func.validate().unwrap();
        let inv = func.inverse();
        assert_eq!(inv.style(), AcesDarkToDim10Inv);
        assert_ne!(func.cache_id(), inv.cache_id());

        func.set_params(vec![1.0]);
        assert_eq!(
            func.validate().unwrap_err().to_string(),
            "The style 'ACES_DarkToDim10 (Forward)' must have zero parameters but 1 found."
        );
    }

    #[test]
    fn rec2100_surround_bounds() {
        let mut func = FixedFunctionData::new(Rec2100SurroundFwd, vec![2.0]);
        func.validate().unwrap();

        let inv = func.inverse();
        assert_eq!(inv.params(), func.params());
        assert_eq!(inv.style(), Rec2100SurroundInv);
        assert_ne!(func.cache_id(), inv.cache_id());
        assert_eq!(func, func.clone());
        assert_ne!(func, inv);

        func.set_params(vec![120.0]);
        assert_eq!(
            func.validate().unwrap_err().to_string(),
            "Parameter 120 is greater than upper bound 100"
        );

        func.set_params(vec![0.00001]);
        assert!(
            func.validate()
                .unwrap_err()
                .to_string()
                .contains("is less than lower bound 0.01")
        );

        func.set_params(vec![f64::NAN]);
        assert_eq!(
            func.validate().unwrap_err().to_string(),
            "Parameter NaN is less than lower bound 0.01"
        );
        func.set_params(vec![f64::INFINITY]);
        assert!(
            func.validate()
                .unwrap_err()
                .to_string()
                .contains("is greater than upper bound 100")
        );

        func.set_params(vec![2.0, 12.0]);
        assert_eq!(
            func.validate().unwrap_err().to_string(),
            "The style 'REC2100_Surround' must have one parameter but 2 found."
        );

        func.set_params(vec![]);
        assert_eq!(
            func.validate().unwrap_err().to_string(),
            "The style 'REC2100_Surround' must have one parameter but 0 found."
        );
    }

    #[test]
    fn is_inverse() {
        let f_s = FixedFunctionData::new(Rec2100SurroundFwd, vec![2.0]);
        let f_s_inv1 = FixedFunctionData::new(Rec2100SurroundFwd, vec![0.5]);
        let f_s_inv2 = FixedFunctionData::new(Rec2100SurroundInv, vec![2.0]);

        assert!(f_s.is_inverse_of(&f_s_inv1));
        assert!(f_s.is_inverse_of(&f_s_inv2));
        assert!(!f_s.is_inverse_of(&f_s));
        assert!(!f_s_inv1.is_inverse_of(&f_s_inv1));
        assert!(!f_s_inv2.is_inverse_of(&f_s_inv2));
        assert!(!f_s_inv1.is_inverse_of(&f_s_inv2));

        let f_g = FixedFunctionData::new(AcesGlow03Fwd, vec![]);
        let f_g_inv = FixedFunctionData::new(AcesGlow03Inv, vec![]);
        assert!(f_g.is_inverse_of(&f_g_inv));
        assert!(f_g_inv.is_inverse_of(&f_g));
        assert!(!f_g.is_inverse_of(&f_g));
        assert!(!f_g.is_inverse_of(&f_s));

        let f_r = FixedFunctionData::new(AcesRedMod03Fwd, vec![]);
        let f_r_inv = FixedFunctionData::new(AcesRedMod03Inv, vec![]);
        assert!(f_r.is_inverse_of(&f_r_inv));
        assert!(f_r_inv.is_inverse_of(&f_r));
        assert!(!f_r.is_inverse_of(&f_g));
    }

    #[test]
    fn every_style_pairs_back() {
        for style in FixedFunctionStyle::ALL {
            assert_eq!(style.inverse().inverse(), style);
            assert_ne!(style.inverse(), style);
            assert_ne!(style.direction(), style.inverse().direction());
        }
    }

    #[test]
    fn unit_gamma_is_identity() {
        assert!(FixedFunctionData::new(Rec2100SurroundFwd, vec![1.0]).is_identity());
        assert!(!FixedFunctionData::new(Rec2100SurroundFwd, vec![0.78]).is_identity());
        assert!(!FixedFunctionData::new(LinToPq, vec![]).is_identity());
    }
}
