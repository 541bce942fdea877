//! Transform direction algebra.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{OpError, OpResult};

/// Direction in which a transform is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformDirection {
    /// Apply as declared.
    #[default]
    Forward,
    /// Apply the algebraic inverse.
    Inverse,
    /// Unresolved; never executable.
    Unknown,
}

impl TransformDirection {
    /// Returns the opposite direction. Unknown stays unknown.
    #[inline]
    pub fn inverse(self) -> Self {
        match self {
            Self::Forward => Self::Inverse,
            Self::Inverse => Self::Forward,
            Self::Unknown => Self::Unknown,
        }
    }

    /// Returns false for [`TransformDirection::Unknown`].
    #[inline]
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }

    /// Composes `self` (outer) with a per-element `inner` direction.
    ///
    /// | outer   | inner   | result  |
    /// |---------|---------|---------|
    /// | Forward | X       | X       |
    /// | Inverse | Forward | Inverse |
    /// | Inverse | Inverse | Forward |
    /// | any     | Unknown | Unknown |
    /// | Unknown | any     | Unknown |
    #[inline]
    pub fn combine(self, inner: Self) -> Self {
        combine_directions(self, inner)
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Inverse => "inverse",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TransformDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composes an outer requested direction with an inner override.
pub fn combine_directions(outer: TransformDirection, inner: TransformDirection) -> TransformDirection {
    use TransformDirection::*;
    match (outer, inner) {
        (Unknown, _) | (_, Unknown) => Unknown,
        (Forward, x) => x,
        (Inverse, Forward) => Inverse,
        (Inverse, Inverse) => Forward,
    }
}

/// Combines two directions and fails with [`OpError::Direction`] when the
/// result is unknown. `what` names the thing being built.
pub fn resolve_direction(
    outer: TransformDirection,
    inner: TransformDirection,
    what: &str,
) -> OpResult<TransformDirection> {
    let dir = combine_directions(outer, inner);
    if !dir.is_known() {
        return Err(OpError::Direction(format!(
            "Cannot build {what}, unspecified transform direction."
        )));
    }
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::TransformDirection::*;
    use super::*;

    const ALL: [TransformDirection; 3] = [Forward, Inverse, Unknown];

    #[test]
    fn forward_is_neutral() {
        for x in ALL {
            assert_eq!(combine_directions(Forward, x), x);
        }
    }

    #[test]
    fn inverse_table() {
        assert_eq!(combine_directions(Inverse, Forward), Inverse);
        assert_eq!(combine_directions(Inverse, Inverse), Forward);
    }

    #[test]
    fn unknown_absorbs() {
        for x in ALL {
            assert_eq!(combine_directions(x, Unknown), Unknown);
            assert_eq!(combine_directions(Unknown, x), Unknown);
        }
    }

    #[test]
    fn method_matches_function() {
        for a in ALL {
            for b in ALL {
                assert_eq!(a.combine(b), combine_directions(a, b));
            }
        }
    }

    #[test]
    fn inverse_flips() {
        assert_eq!(Forward.inverse(), Inverse);
        assert_eq!(Inverse.inverse(), Forward);
        assert_eq!(Unknown.inverse(), Unknown);
    }

    #[test]
    fn resolve_rejects_unknown() {
        assert_eq!(resolve_direction(Inverse, Inverse, "op").unwrap(), Forward);
        let err = resolve_direction(Forward, Unknown, "file transform").unwrap_err();
        assert!(matches!(err, OpError::Direction(_)));
        assert!(err.to_string().contains("unspecified transform direction"));
    }
}
