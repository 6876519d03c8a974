//! Solver interface types.

use std::collections::BTreeMap;

use crate::error::{FloorplanError, Result, SolveStage, Termination};
use crate::milp::{MilpModel, Var};

/// Values assigned to the model's variables by a solver.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment {
    /// Objective value (the chip side).
    pub objective: f64,
    /// Variable values. Variables the solver did not report read as zero.
    pub values: BTreeMap<Var, f64>,
    /// Whether the solver proved the assignment optimal.
    pub proven_optimal: bool,
}

impl Assignment {
    /// An assignment not (yet) known to be optimal.
    pub fn new(objective: f64, values: BTreeMap<Var, f64>) -> Self {
        Self {
            objective,
            values,
            proven_optimal: false,
        }
    }

    pub fn with_proven_optimal(mut self, proven: bool) -> Self {
        self.proven_optimal = proven;
        self
    }

    /// Value of a variable, zero if absent.
    pub fn value(&self, var: Var) -> f64 {
        self.values.get(&var).copied().unwrap_or(0.0)
    }

    /// The assigned chip side `Y`.
    pub fn chip_side(&self) -> f64 {
        self.value(Var::ChipSide)
    }
}

/// The terminal outcome of one solver invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// A feasible assignment, optimal or best found within the budget.
    Solved(Assignment),
    /// The model has no feasible assignment.
    Infeasible,
    /// The budget ran out before any feasible assignment was found.
    TimedOut,
}

impl SolveOutcome {
    /// Whether the outcome carries an assignment.
    pub fn is_solved(&self) -> bool {
        matches!(self, SolveOutcome::Solved(_))
    }

    /// Turns a terminal outcome without assignment into
    /// [`FloorplanError::Unsolved`] tagged with `stage`.
    pub fn into_result(self, stage: SolveStage) -> Result<Assignment> {
        match self {
            SolveOutcome::Solved(a) => Ok(a),
            SolveOutcome::Infeasible => Err(FloorplanError::Unsolved {
                stage,
                status: Termination::Infeasible,
            }),
            SolveOutcome::TimedOut => Err(FloorplanError::Unsolved {
                stage,
                status: Termination::TimedOut,
            }),
        }
    }
}

/// Solver configuration.
///
/// # Examples
///
/// ```
/// use u_floorplan::solver::SolverConfig;
///
/// let config = SolverConfig::default().with_time_limit_ms(2_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// Wall-clock budget per solve, in milliseconds.
    pub time_limit_ms: u64,
    /// Number of worker threads the solver may use, where supported.
    pub num_workers: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 10_000,
            num_workers: 1,
        }
    }
}

impl SolverConfig {
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    /// Sets the budget in whole seconds, saturating at `u64::MAX` ms.
    pub fn with_time_limit_secs(self, secs: u64) -> Self {
        self.with_time_limit_ms(secs.saturating_mul(1000))
    }

    pub fn with_num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.time_limit_ms == 0 {
            return Err("time_limit_ms must be positive".into());
        }
        if self.num_workers == 0 {
            return Err("num_workers must be at least 1".into());
        }
        Ok(())
    }
}

/// A MILP solver the model can be handed to.
///
/// Implementations may wrap an external solver process or library, or
/// provide a heuristic. A solve returns exactly one terminal
/// [`SolveOutcome`]; `Err` is reserved for the adapter failing to run.
pub trait MilpSolver: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Solves the model within the configured budget.
    fn solve(&self, model: &MilpModel, config: &SolverConfig) -> Result<SolveOutcome>;
}
