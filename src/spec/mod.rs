//! Module specifications.
//!
//! A [`ProblemInstance`] is an ordered sequence of hard modules followed by
//! an ordered sequence of soft modules, parsed from (and rendered back to)
//! the line-oriented spec text format.

mod parse;
mod types;

pub use parse::{parse, spec_lines, to_spec_text};
pub use types::{HardModule, Module, ModuleKind, ProblemInstance, SoftModule};
