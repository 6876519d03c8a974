//! Solver adapters.
//!
//! A [`MilpModel`](crate::milp::MilpModel) is handed to a [`MilpSolver`],
//! which reports one terminal [`SolveOutcome`]: an [`Assignment`], proven
//! infeasibility, or a timeout without a solution.
//!
//! # Adapters
//!
//! - [`ShelfSolver`]: built-in greedy shelf packing; always feasible, never
//!   claims optimality
//! - [`LpSolveCli`]: pipes the LP export to an external `lp_solve` process

mod lp_solve;
mod shelf;
mod types;

pub use lp_solve::LpSolveCli;
pub use shelf::ShelfSolver;
pub use types::{Assignment, MilpSolver, SolveOutcome, SolverConfig};
