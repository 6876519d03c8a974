//! Linear expressions and constraints over [`Var`]s.

use std::collections::BTreeMap;
use std::ops::{Add, Mul, Sub};

use super::variables::Var;

const ZERO_COEFFICIENT: f64 = 1e-12;

/// `Σ coefficient · var + constant`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearExpr {
    terms: BTreeMap<Var, f64>,
    constant: f64,
}

impl LinearExpr {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn constant(value: f64) -> Self {
        Self {
            terms: BTreeMap::new(),
            constant: value,
        }
    }

    /// A single variable with coefficient 1.
    pub fn var(var: Var) -> Self {
        Self::term(var, 1.0)
    }

    pub fn term(var: Var, coefficient: f64) -> Self {
        Self::zero().plus_term(var, coefficient)
    }

    /// Adds `coefficient · var`, dropping the term if it cancels out.
    pub fn plus_term(mut self, var: Var, coefficient: f64) -> Self {
        let c = self.terms.entry(var).or_insert(0.0);
        *c += coefficient;
        if c.abs() <= ZERO_COEFFICIENT {
            self.terms.remove(&var);
        }
        self
    }

    pub fn plus_constant(mut self, value: f64) -> Self {
        self.constant += value;
        self
    }

    pub fn add_inplace(&mut self, other: &LinearExpr) {
        self.constant += other.constant;
        for (var, c) in &other.terms {
            *self.terms.entry(*var).or_insert(0.0) += *c;
        }
        self.terms.retain(|_, c| c.abs() > ZERO_COEFFICIENT);
    }

    pub fn sub_inplace(&mut self, other: &LinearExpr) {
        self.constant -= other.constant;
        for (var, c) in &other.terms {
            *self.terms.entry(*var).or_insert(0.0) -= *c;
        }
        self.terms.retain(|_, c| c.abs() > ZERO_COEFFICIENT);
    }

    pub fn scale(&self, k: f64) -> Self {
        let mut e = Self::constant(self.constant * k);
        for (var, c) in &self.terms {
            e = e.plus_term(*var, c * k);
        }
        e
    }

    /// Non-zero terms in variable order.
    pub fn terms(&self) -> impl Iterator<Item = (Var, f64)> + '_ {
        self.terms.iter().map(|(v, c)| (*v, *c))
    }

    pub fn coefficient(&self, var: Var) -> f64 {
        self.terms.get(&var).copied().unwrap_or(0.0)
    }

    pub fn constant_term(&self) -> f64 {
        self.constant
    }

    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Value of the expression under a variable assignment.
    pub fn evaluate<F: Fn(Var) -> f64>(&self, value: F) -> f64 {
        self.terms
            .iter()
            .fold(self.constant, |acc, (v, c)| acc + c * value(*v))
    }
}

impl Add for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: LinearExpr) -> LinearExpr {
        self.add_inplace(&rhs);
        self
    }
}

impl Sub for LinearExpr {
    type Output = LinearExpr;

    fn sub(mut self, rhs: LinearExpr) -> LinearExpr {
        self.sub_inplace(&rhs);
        self
    }
}

impl Mul<f64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(self, k: f64) -> LinearExpr {
        self.scale(k)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sense {
    Le,
    Ge,
    Eq,
}

impl Sense {
    pub fn symbol(self) -> &'static str {
        match self {
            Sense::Le => "<=",
            Sense::Ge => ">=",
            Sense::Eq => "=",
        }
    }
}

/// `lhs sense rhs` with every variable on the left and the constant on the
/// right.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearConstraint {
    pub lhs: LinearExpr,
    pub sense: Sense,
    pub rhs: f64,
}

impl LinearConstraint {
    /// Normalizes `left sense right` by moving variables left and constants
    /// right.
    pub fn new(left: LinearExpr, sense: Sense, right: LinearExpr) -> Self {
        let mut lhs = left - right;
        let rhs = -lhs.constant;
        lhs.constant = 0.0;
        Self { lhs, sense, rhs }
    }

    /// Distance from violation: non-negative when satisfied.
    pub fn slack<F: Fn(Var) -> f64>(&self, value: F) -> f64 {
        let lhs = self.lhs.evaluate(value);
        match self.sense {
            Sense::Le => self.rhs - lhs,
            Sense::Ge => lhs - self.rhs,
            Sense::Eq => -(lhs - self.rhs).abs(),
        }
    }

    pub fn is_satisfied<F: Fn(Var) -> f64>(&self, value: F, tolerance: f64) -> bool {
        self.slack(value) >= -tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_keeps_both_sides() {
        let a = LinearExpr::var(Var::X(0));
        let b = LinearExpr::term(Var::X(1), 2.0);
        let c = a - b;
        assert_eq!(c.coefficient(Var::X(0)), 1.0);
        assert_eq!(c.coefficient(Var::X(1)), -2.0);
    }

    #[test]
    fn test_cancelled_terms_are_dropped() {
        let e = LinearExpr::constant(3.0).plus_term(Var::Z(0), 0.0);
        assert!(e.is_constant());
        let e = LinearExpr::var(Var::W(2)) - LinearExpr::var(Var::W(2));
        assert!(e.is_constant());
    }

    #[test]
    fn test_constraint_normalization() {
        // x1 + 3 <= x2 + 10 xo  ->  x1 - x2 - 10 xo <= -3
        let c = LinearConstraint::new(
            LinearExpr::var(Var::X(0)).plus_constant(3.0),
            Sense::Le,
            LinearExpr::var(Var::X(1)) + LinearExpr::term(Var::PairX(0, 1), 10.0),
        );
        assert_eq!(c.rhs, -3.0);
        assert_eq!(c.lhs.coefficient(Var::X(1)), -1.0);
        assert_eq!(c.lhs.coefficient(Var::PairX(0, 1)), -10.0);
        assert_eq!(c.lhs.constant_term(), 0.0);
    }

    #[test]
    fn test_slack() {
        let c = LinearConstraint::new(
            LinearExpr::var(Var::X(0)),
            Sense::Ge,
            LinearExpr::constant(2.0),
        );
        assert_eq!(c.slack(|_| 5.0), 3.0);
        assert!(!c.is_satisfied(|_| 1.0, 1e-9));
        let e = LinearExpr::term(Var::X(0), 2.0).plus_constant(1.0);
        assert_eq!(e.evaluate(|_| 4.0), 9.0);
        assert_eq!((e * 0.5).evaluate(|_| 4.0), 4.5);
    }
}
