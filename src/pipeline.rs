//! One build-and-solve pass over a single instance.

use std::time::Instant;

use tracing::{info, warn};

use crate::error::{FloorplanError, Result, SolveStage};
use crate::layout::Layout;
use crate::milp::{MilpModel, ModelBuilder};
use crate::relax::RelaxationMode;
use crate::solver::{Assignment, MilpSolver, SolveOutcome, SolverConfig};
use crate::spec::ProblemInstance;

/// A solved model together with its extracted placement.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Where in the run this solve happened.
    pub stage: SolveStage,
    /// The model that was handed to the solver.
    pub model: MilpModel,
    /// Raw variable values returned by the solver.
    pub assignment: Assignment,
    /// Placement read out of `assignment`.
    pub layout: Layout,
}

impl Solution {
    /// The solved chip side, used as the bound of this solve.
    pub fn side(&self) -> f64 {
        self.layout.side
    }

    pub fn utilization(&self) -> f64 {
        self.layout.utilization
    }
}

/// Builds the model of `instance` under its default name and solves it.
pub fn solve_instance(
    instance: &ProblemInstance,
    mode: RelaxationMode,
    solver: &dyn MilpSolver,
    config: &SolverConfig,
    stage: SolveStage,
) -> Result<Solution> {
    let model = ModelBuilder::new(instance).with_mode(mode).build()?;
    solve_model(model, solver, config, stage)
}

/// Hands an assembled model to `solver` and extracts the placement.
///
/// Infeasible and timed-out outcomes come back as
/// [`FloorplanError::Unsolved`] tagged with `stage`.
pub fn solve_model(
    model: MilpModel,
    solver: &dyn MilpSolver,
    config: &SolverConfig,
    stage: SolveStage,
) -> Result<Solution> {
    config.validate().map_err(FloorplanError::Config)?;
    info!(
        %stage,
        model = model.name(),
        solver = solver.name(),
        modules = model.module_count(),
        variables = model.variable_count(),
        constraints = model.constraint_count(),
        "solving"
    );

    let started = Instant::now();
    let outcome = solver.solve(&model, config)?;
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match &outcome {
        SolveOutcome::Solved(a) => info!(
            %stage,
            side = a.objective,
            optimal = a.proven_optimal,
            elapsed_ms,
            "solved"
        ),
        SolveOutcome::Infeasible => warn!(%stage, elapsed_ms, "model is infeasible"),
        SolveOutcome::TimedOut => warn!(%stage, elapsed_ms, "time budget ran out without a solution"),
    }

    let assignment = outcome.into_result(stage)?;
    let layout = Layout::from_assignment(&model, &assignment);
    Ok(Solution {
        stage,
        model,
        assignment,
        layout,
    })
}
