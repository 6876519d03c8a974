//! Decision variables of the floorplanning MILP.

use std::fmt;
use std::str::FromStr;

/// A decision variable, keyed by 0-based global module indices.
///
/// Names render 1-based, matching the spec-file order: `x1`, `y1`, `z1`
/// (orientation of hard module 1), `w3` (width of soft module 3),
/// `xo_1_2`/`yo_1_2` (disjunction selectors of pair 1,2) and `Y` (chip side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Var {
    /// Left edge of a module.
    X(usize),
    /// Bottom edge of a module.
    Y(usize),
    /// Orientation of a hard module: 1 means rotated by 90°.
    Z(usize),
    /// Width of a soft module.
    W(usize),
    /// First disjunction selector of pair `(i, j)`, `i < j`.
    PairX(usize, usize),
    /// Second disjunction selector of pair `(i, j)`, `i < j`.
    PairY(usize, usize),
    /// Chip side length (the objective).
    ChipSide,
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Var::X(i) => write!(f, "x{}", i + 1),
            Var::Y(i) => write!(f, "y{}", i + 1),
            Var::Z(i) => write!(f, "z{}", i + 1),
            Var::W(i) => write!(f, "w{}", i + 1),
            Var::PairX(i, j) => write!(f, "xo_{}_{}", i + 1, j + 1),
            Var::PairY(i, j) => write!(f, "yo_{}_{}", i + 1, j + 1),
            Var::ChipSide => write!(f, "Y"),
        }
    }
}

impl FromStr for Var {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let index = |digits: &str| -> Result<usize, String> {
            match digits.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(n - 1),
                _ => Err(format!("invalid variable name `{s}`")),
            }
        };
        if s == "Y" {
            return Ok(Var::ChipSide);
        }
        for (prefix, pair_x) in [("xo_", true), ("yo_", false)] {
            if let Some(rest) = s.strip_prefix(prefix) {
                let (i, j) = rest
                    .split_once('_')
                    .ok_or_else(|| format!("invalid variable name `{s}`"))?;
                let (i, j) = (index(i)?, index(j)?);
                return Ok(if pair_x {
                    Var::PairX(i, j)
                } else {
                    Var::PairY(i, j)
                });
            }
        }
        let mut chars = s.chars();
        let head = chars.next();
        let rest = chars.as_str();
        match head {
            Some('x') => Ok(Var::X(index(rest)?)),
            Some('y') => Ok(Var::Y(index(rest)?)),
            Some('z') => Ok(Var::Z(index(rest)?)),
            Some('w') => Ok(Var::W(index(rest)?)),
            _ => Err(format!("invalid variable name `{s}`")),
        }
    }
}

/// Integrality of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VarKind {
    /// Real-valued within its bounds.
    Continuous,
    /// Restricted to `{0, 1}`.
    Binary,
}

/// Bounds and integrality of a variable.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarDomain {
    /// Inclusive lower bound.
    pub lower: f64,
    /// `f64::INFINITY` when unbounded above.
    pub upper: f64,
    pub kind: VarKind,
}

impl VarDomain {
    /// Continuous with lower bound zero and no upper bound.
    pub fn non_negative() -> Self {
        Self::continuous(0.0, f64::INFINITY)
    }

    pub fn continuous(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            kind: VarKind::Continuous,
        }
    }

    pub fn binary() -> Self {
        Self {
            lower: 0.0,
            upper: 1.0,
            kind: VarKind::Binary,
        }
    }

    pub fn is_binary(&self) -> bool {
        self.kind == VarKind::Binary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_one_based() {
        assert_eq!(Var::X(0).to_string(), "x1");
        assert_eq!(Var::W(11).to_string(), "w12");
        assert_eq!(Var::PairX(0, 11).to_string(), "xo_1_12");
        assert_eq!(Var::PairY(10, 11).to_string(), "yo_11_12");
        assert_eq!(Var::ChipSide.to_string(), "Y");
    }

    #[test]
    fn test_parse_names() {
        for var in [
            Var::X(3),
            Var::Y(0),
            Var::Z(7),
            Var::W(12),
            Var::PairX(1, 11),
            Var::PairY(11, 12),
            Var::ChipSide,
        ] {
            assert_eq!(var.to_string().parse::<Var>(), Ok(var));
        }
        assert!("x0".parse::<Var>().is_err());
        assert!("q1".parse::<Var>().is_err());
        assert!("xo_1".parse::<Var>().is_err());
        assert!("".parse::<Var>().is_err());
    }

    #[test]
    fn test_domains() {
        assert!(VarDomain::binary().is_binary());
        let d = VarDomain::non_negative();
        assert_eq!(d.lower, 0.0);
        assert!(d.upper.is_infinite());
    }
}
