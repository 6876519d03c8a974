//! Assembly of the big-M floorplanning MILP.

use std::collections::BTreeMap;

use tracing::debug;

use super::linear::{LinearConstraint, LinearExpr, Sense};
use super::model::{ChipAxis, ChipConstraint, Disjunction, MilpModel, PairKind};
use super::variables::{Var, VarDomain};
use crate::bound::compute_bound;
use crate::error::{FloorplanError, Result};
use crate::relax::{derive_relaxation, LinearRelaxation, RelaxationMode};
use crate::spec::ProblemInstance;

/// Builds a [`MilpModel`] from a [`ProblemInstance`].
///
/// # Examples
///
/// ```
/// use u_floorplan::milp::ModelBuilder;
/// use u_floorplan::relax::RelaxationMode;
/// use u_floorplan::spec::parse;
///
/// let inst = parse("hard - 2\n2,3\n4,1\n\nsoft - 1\n6,0.5,2\n").unwrap();
/// let model = ModelBuilder::new(&inst)
///     .with_mode(RelaxationMode::Underestimate)
///     .build()
///     .unwrap();
/// assert_eq!(model.disjunctions().len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct ModelBuilder<'a> {
    instance: &'a ProblemInstance,
    mode: RelaxationMode,
    name: String,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(instance: &'a ProblemInstance) -> Self {
        Self {
            instance,
            mode: RelaxationMode::default(),
            name: format!("{}_blocks", instance.len()),
        }
    }

    /// Sets how soft-module heights are linearized.
    pub fn with_mode(mut self, mode: RelaxationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Assembles variables, constraints and objective.
    ///
    /// # Errors
    ///
    /// [`FloorplanError::Config`] if the instance has no modules.
    pub fn build(&self) -> Result<MilpModel> {
        let instance = self.instance;
        if instance.is_empty() {
            return Err(FloorplanError::Config(
                "cannot assemble a model for an instance with no modules".into(),
            ));
        }

        let relaxations: Vec<LinearRelaxation> = instance
            .envelopes()
            .iter()
            .map(|e| derive_relaxation(e, self.mode))
            .collect();
        let bound = compute_bound(instance);
        let n = instance.len();
        let h = instance.hard_count();

        let mut variables = BTreeMap::new();
        for i in 0..n {
            variables.insert(Var::X(i), VarDomain::non_negative());
            variables.insert(Var::Y(i), VarDomain::non_negative());
            if i < h {
                variables.insert(Var::Z(i), VarDomain::binary());
            } else {
                let env = &instance.envelopes()[i - h];
                variables.insert(Var::W(i), VarDomain::continuous(env.min_w, env.max_w));
            }
            for j in i + 1..n {
                variables.insert(Var::PairX(i, j), VarDomain::binary());
                variables.insert(Var::PairY(i, j), VarDomain::binary());
            }
        }
        variables.insert(Var::ChipSide, VarDomain::continuous(0.0, bound));

        let extents = Extents {
            instance,
            relaxations: &relaxations,
        };

        let mut disjunctions = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        let groups = [
            (PairKind::HardHard, 0..h, h),
            (PairKind::HardSoft, 0..h, n),
            (PairKind::SoftSoft, h..n, n),
        ];
        for (kind, rows, end) in groups {
            let before = disjunctions.len();
            for i in rows {
                let first = match kind {
                    PairKind::HardSoft => h,
                    _ => i + 1,
                };
                for j in first..end {
                    disjunctions.push(non_overlap(i, j, kind, &extents, bound));
                }
            }
            debug!(
                group = kind.label(),
                pairs = disjunctions.len() - before,
                "non-overlap group assembled"
            );
        }

        let chip = LinearExpr::var(Var::ChipSide);
        let mut chip_constraints = Vec::with_capacity(2 * n);
        for i in 0..n {
            chip_constraints.push(ChipConstraint {
                module: i,
                axis: ChipAxis::Width,
                constraint: LinearConstraint::new(
                    LinearExpr::var(Var::X(i)) + extents.horizontal(i),
                    Sense::Le,
                    chip.clone(),
                ),
            });
        }
        for i in 0..n {
            chip_constraints.push(ChipConstraint {
                module: i,
                axis: ChipAxis::Height,
                constraint: LinearConstraint::new(
                    LinearExpr::var(Var::Y(i)) + extents.vertical(i),
                    Sense::Le,
                    chip.clone(),
                ),
            });
        }

        debug!(
            modules = n,
            hard = h,
            soft = n - h,
            bound,
            variables = variables.len(),
            constraints = 4 * disjunctions.len() + chip_constraints.len(),
            "model assembled"
        );

        Ok(MilpModel {
            name: self.name.clone(),
            instance: instance.clone(),
            mode: self.mode,
            relaxations,
            bound,
            variables,
            disjunctions,
            chip_constraints,
            objective: chip,
        })
    }
}

/// Shorthand for `ModelBuilder::new(instance).with_mode(mode).build()`.
pub fn build_model(instance: &ProblemInstance, mode: RelaxationMode) -> Result<MilpModel> {
    ModelBuilder::new(instance).with_mode(mode).build()
}

/// Per-kind footprint expressions.
struct Extents<'a> {
    instance: &'a ProblemInstance,
    relaxations: &'a [LinearRelaxation],
}

impl Extents<'_> {
    /// Hard: `z·h + (1 − z)·w`. Soft: `w_i`.
    fn horizontal(&self, i: usize) -> LinearExpr {
        match self.instance.hard().get(i) {
            Some(m) => LinearExpr::constant(m.width).plus_term(Var::Z(i), m.height - m.width),
            None => LinearExpr::var(Var::W(i)),
        }
    }

    /// Hard: `z·w + (1 − z)·h`. Soft: `gradient·w_i + intercept`.
    fn vertical(&self, i: usize) -> LinearExpr {
        match self.instance.hard().get(i) {
            Some(m) => LinearExpr::constant(m.height).plus_term(Var::Z(i), m.width - m.height),
            None => {
                let r = &self.relaxations[i - self.instance.hard_count()];
                LinearExpr::constant(r.intercept).plus_term(Var::W(i), r.gradient)
            }
        }
    }
}

fn non_overlap(i: usize, j: usize, kind: PairKind, ext: &Extents<'_>, bound: f64) -> Disjunction {
    let x = |k| LinearExpr::var(Var::X(k));
    let y = |k| LinearExpr::var(Var::Y(k));
    let xo = LinearExpr::var(Var::PairX(i, j));
    let yo = LinearExpr::var(Var::PairY(i, j));
    let one = || LinearExpr::constant(1.0);

    let left_of = LinearConstraint::new(
        x(i) + ext.horizontal(i),
        Sense::Le,
        x(j) + (xo.clone() + yo.clone()) * bound,
    );
    let right_of = LinearConstraint::new(
        x(i) - ext.horizontal(j),
        Sense::Ge,
        x(j) - (one() - xo.clone() + yo.clone()) * bound,
    );
    let below = LinearConstraint::new(
        y(i) + ext.vertical(i),
        Sense::Le,
        y(j) + (one() + xo.clone() - yo.clone()) * bound,
    );
    let above = LinearConstraint::new(
        y(i) - ext.vertical(j),
        Sense::Ge,
        y(j) - (LinearExpr::constant(2.0) - xo - yo) * bound,
    );

    Disjunction {
        i,
        j,
        kind,
        inequalities: [left_of, right_of, below, above],
    }
}
