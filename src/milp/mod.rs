//! Mixed-integer linear model of the floorplanning problem.
//!
//! For every unordered module pair `i < j` exactly one of four relations
//! must hold: `i` left of, right of, below or above `j`. Two binaries per
//! pair select the relation, and the big-M constant `B` from
//! [`compute_bound`](crate::bound::compute_bound) slackens the three
//! inequalities that are not selected.
//!
//! # Key Components
//!
//! - **Variables**: [`Var`], [`VarDomain`]: positions, orientations, soft
//!   widths, pair selectors and the chip side
//! - **Expressions**: [`LinearExpr`], [`LinearConstraint`]
//! - **Model**: [`MilpModel`], assembled by [`ModelBuilder`]
//! - **Export**: [`lp_lines`] / [`to_lp_string`]: lp_solve LP text
//!
//! # References
//!
//! Sutanthavibul, Shragowitz & Rosen (1991), "An Analytical Approach to
//! Floorplan Design and Optimization"

mod builder;
mod export;
mod linear;
mod model;
mod variables;

pub use builder::{build_model, ModelBuilder};
pub use export::{lp_lines, to_lp_string};
pub use linear::{LinearConstraint, LinearExpr, Sense};
pub use model::{
    ChipAxis, ChipConstraint, ConstraintRef, Disjunction, MilpModel, PairKind, Relation,
    Violation,
};
pub use variables::{Var, VarDomain, VarKind};
