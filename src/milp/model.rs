//! Assembled MILP model.

use std::collections::BTreeMap;

use super::linear::{LinearConstraint, LinearExpr};
use super::variables::{Var, VarDomain};
use crate::relax::{LinearRelaxation, RelaxationMode};
use crate::spec::ProblemInstance;

/// Kinds of the two modules in a non-overlap pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PairKind {
    /// Both modules hard.
    HardHard,
    /// A hard module and a soft one (hard indices come first).
    HardSoft,
    /// Both modules soft.
    SoftSoft,
}

impl PairKind {
    /// Label used in logs and LP row comments.
    pub fn label(self) -> &'static str {
        match self {
            PairKind::HardHard => "hard-hard",
            PairKind::HardSoft => "hard-soft",
            PairKind::SoftSoft => "soft-soft",
        }
    }
}

/// The four mutually exclusive placements of module `i` relative to `j`,
/// selected by the pair binaries `(xo, yo)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relation {
    /// `(0, 0)`: `x_i + w_i <= x_j`.
    LeftOf,
    /// `(1, 0)`: `x_i >= x_j + w_j`.
    RightOf,
    /// `(0, 1)`: `y_i + h_i <= y_j`.
    Below,
    /// `(1, 1)`: `y_i >= y_j + h_j`.
    Above,
}

impl Relation {
    /// Selector values `(xo, yo)` that make this relation the active one.
    pub fn selectors(self) -> (f64, f64) {
        match self {
            Relation::LeftOf => (0.0, 0.0),
            Relation::RightOf => (1.0, 0.0),
            Relation::Below => (0.0, 1.0),
            Relation::Above => (1.0, 1.0),
        }
    }

    /// Reads a relation back from (possibly noisy) selector values.
    pub fn from_selectors(xo: f64, yo: f64) -> Self {
        match (xo >= 0.5, yo >= 0.5) {
            (false, false) => Relation::LeftOf,
            (true, false) => Relation::RightOf,
            (false, true) => Relation::Below,
            (true, true) => Relation::Above,
        }
    }
}

/// The big-M disjunction keeping modules `i < j` apart.
///
/// `inequalities` are ordered as the relations they enforce: left-of,
/// right-of, below, above. Each is relaxed by `0`, `B` or `2B` depending on
/// the selector values, so exactly one of them binds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Disjunction {
    /// Lower global index of the pair.
    pub i: usize,
    /// Higher global index of the pair.
    pub j: usize,
    pub kind: PairKind,
    pub inequalities: [LinearConstraint; 4],
}

/// Which chip-side bound a bounding constraint enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChipAxis {
    /// Horizontal extent against `Y`.
    Width,
    /// Vertical extent against `Y`.
    Height,
}

/// `x_i + extent_i <= Y` (or the vertical counterpart) for one module.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChipConstraint {
    /// Global index of the bounded module.
    pub module: usize,
    pub axis: ChipAxis,
    pub constraint: LinearConstraint,
}

/// Where a constraint sits in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintRef {
    /// Inequality `k` (0..4) of disjunction `pair`.
    NonOverlap { pair: usize, k: usize },
    /// Position in the chip-bounding list.
    Chip { position: usize },
}

/// A variable bound, integrality or constraint that an assignment breaks.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// Value outside the variable's `[lower, upper]`.
    Bound { var: Var, value: f64 },
    /// Binary variable that is neither 0 nor 1.
    Integrality { var: Var, value: f64 },
    /// Constraint whose slack is below `-tolerance`.
    Constraint { at: ConstraintRef, slack: f64 },
}

/// The complete MILP: variables with domains, non-overlap disjunctions,
/// chip-bounding constraints and the objective `minimize Y`.
///
/// Built by [`ModelBuilder`](super::ModelBuilder); solving is left to a
/// [`MilpSolver`](crate::solver::MilpSolver).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MilpModel {
    pub(super) name: String,
    pub(super) instance: ProblemInstance,
    pub(super) mode: RelaxationMode,
    pub(super) relaxations: Vec<LinearRelaxation>,
    pub(super) bound: f64,
    pub(super) variables: BTreeMap<Var, VarDomain>,
    pub(super) disjunctions: Vec<Disjunction>,
    pub(super) chip_constraints: Vec<ChipConstraint>,
    pub(super) objective: LinearExpr,
}

impl MilpModel {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The instance the model was built from.
    pub fn instance(&self) -> &ProblemInstance {
        &self.instance
    }

    pub fn mode(&self) -> RelaxationMode {
        self.mode
    }

    /// Relaxations parallel to the instance's soft modules.
    pub fn relaxations(&self) -> &[LinearRelaxation] {
        &self.relaxations
    }

    /// The big-M constant, also the upper bound of `Y`.
    pub fn bound(&self) -> f64 {
        self.bound
    }

    pub fn module_count(&self) -> usize {
        self.instance.len()
    }

    pub fn variables(&self) -> &BTreeMap<Var, VarDomain> {
        &self.variables
    }

    pub fn disjunctions(&self) -> &[Disjunction] {
        &self.disjunctions
    }

    pub fn chip_constraints(&self) -> &[ChipConstraint] {
        &self.chip_constraints
    }

    /// The expression to minimize (the chip side `Y`).
    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    /// Every constraint: disjunction inequalities first, then chip bounds.
    pub fn constraints(&self) -> impl Iterator<Item = &LinearConstraint> + '_ {
        self.disjunctions
            .iter()
            .flat_map(|d| d.inequalities.iter())
            .chain(self.chip_constraints.iter().map(|c| &c.constraint))
    }

    pub fn constraint_count(&self) -> usize {
        4 * self.disjunctions.len() + self.chip_constraints.len()
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn binary_count(&self) -> usize {
        self.variables.values().filter(|d| d.is_binary()).count()
    }

    /// `(horizontal, vertical)` extent of module `index` as the model sees
    /// it, for a given orientation and soft width.
    ///
    /// `rotated` only applies to hard modules, `width` only to soft ones.
    pub fn extents(&self, index: usize, rotated: bool, width: f64) -> (f64, f64) {
        match self.instance.hard().get(index) {
            Some(m) if rotated => (m.height, m.width),
            Some(m) => (m.width, m.height),
            None => {
                let k = index - self.instance.hard_count();
                (width, self.relaxations[k].height_at(width))
            }
        }
    }

    /// Checks an assignment against every variable domain and constraint.
    ///
    /// Returns all violations beyond `tolerance`; an empty list means the
    /// assignment is feasible for this model.
    pub fn check<F: Fn(Var) -> f64>(&self, value: F, tolerance: f64) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (&var, domain) in &self.variables {
            let v = value(var);
            if v < domain.lower - tolerance || v > domain.upper + tolerance {
                violations.push(Violation::Bound { var, value: v });
            } else if domain.is_binary() && (v - v.round()).abs() > tolerance {
                violations.push(Violation::Integrality { var, value: v });
            }
        }
        for (pair, d) in self.disjunctions.iter().enumerate() {
            for (k, c) in d.inequalities.iter().enumerate() {
                let slack = c.slack(&value);
                if slack < -tolerance {
                    violations.push(Violation::Constraint {
                        at: ConstraintRef::NonOverlap { pair, k },
                        slack,
                    });
                }
            }
        }
        for (position, c) in self.chip_constraints.iter().enumerate() {
            let slack = c.constraint.slack(&value);
            if slack < -tolerance {
                violations.push(Violation::Constraint {
                    at: ConstraintRef::Chip { position },
                    slack,
                });
            }
        }
        violations
    }
}
