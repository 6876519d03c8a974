//! Fixed-outline floorplanning as a mixed-integer linear program.
//!
//! Places hard modules (fixed rectangles, optionally rotated) and soft
//! modules (fixed area, bounded aspect ratio) without overlap inside the
//! smallest square chip:
//!
//! - **Spec text**: [`spec`] parses and renders the line-oriented
//!   `hard - N` / `soft - N` instance format.
//! - **Relaxation**: [`relax`] derives each soft module's width envelope
//!   and a linear stand-in for its `h = area / w` curve.
//! - **Bound**: [`bound`] computes the big-M constant, a valid upper bound
//!   on the chip side.
//! - **Model**: [`milp`] assembles the big-M disjunctive model and exports
//!   it as LP text.
//! - **Solvers**: [`solver`] defines the adapter interface, with a greedy
//!   shelf packer and an `lp_solve` process adapter.
//! - **Decomposition**: [`decompose`] runs successive augmentation for
//!   instances too large to solve in one piece.
//!
//! # Architecture
//!
//! Model assembly is pure and solver-agnostic: a [`milp::MilpModel`] is
//! built once from an immutable [`spec::ProblemInstance`] and handed to any
//! [`solver::MilpSolver`]. The [`artifacts`] layer owns all file I/O.
//!
//! # Example
//!
//! ```
//! use u_floorplan::pipeline::solve_instance;
//! use u_floorplan::relax::RelaxationMode;
//! use u_floorplan::solver::{ShelfSolver, SolverConfig};
//! use u_floorplan::spec::parse;
//! use u_floorplan::SolveStage;
//!
//! let instance = parse("hard - 2\n2,3\n4,1\n\nsoft - 1\n6,0.5,2\n").unwrap();
//! let solution = solve_instance(
//!     &instance,
//!     RelaxationMode::Underestimate,
//!     &ShelfSolver::new(),
//!     &SolverConfig::default(),
//!     SolveStage::Direct,
//! )
//! .unwrap();
//! assert!(solution.side() <= solution.model.bound());
//! ```

pub mod artifacts;
pub mod bound;
pub mod decompose;
pub mod error;
pub mod generate;
pub mod layout;
pub mod milp;
pub mod pipeline;
pub mod relax;
pub mod solver;
pub mod spec;

pub use error::{FloorplanError, Result, SolveStage, Termination};
