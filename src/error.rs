//! Error types.
//!
//! Parsing and model-assembly problems are detected eagerly and reported
//! before anything reaches a solver. Terminal solver outcomes are carried
//! through unchanged together with the stage that produced them.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, FloorplanError>;

/// The point in a run at which a solve was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolveStage {
    /// Whole instance solved without decomposition.
    Direct,
    /// One chunk of a decomposed instance (0-based chunk index).
    Chunk(usize),
    /// The synthesized meta-module instance of a decomposed run.
    TopLevel,
}

impl fmt::Display for SolveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStage::Direct => write!(f, "direct"),
            SolveStage::Chunk(i) => write!(f, "chunk {}", i + 1),
            SolveStage::TopLevel => write!(f, "top-level"),
        }
    }
}

/// A solver outcome that carries no assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// The solver proved the model infeasible.
    Infeasible,
    /// The time budget ran out before any solution was found.
    TimedOut,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Infeasible => write!(f, "infeasible"),
            Termination::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Errors raised while parsing, assembling, solving or writing a floorplan.
#[derive(Debug, Error)]
pub enum FloorplanError {
    /// Malformed or count-mismatched spec text, or an empty instance.
    #[error("format error: {message}")]
    Format {
        /// 1-based source line, when the problem is tied to one.
        line: Option<usize>,
        message: String,
    },

    /// A configuration that cannot be executed.
    #[error("configuration error: {0}")]
    Config(String),

    /// A solve ended with a terminal outcome and no assignment.
    #[error("{stage} solve {status}")]
    Unsolved {
        /// Where in the run the solve happened.
        stage: SolveStage,
        /// Which terminal outcome the solver reported.
        status: Termination,
    },

    /// The solver adapter itself failed to run.
    #[error("solver adapter failed: {0}")]
    Solver(String),

    /// Reading or writing a working-area file failed.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        /// The file or directory being accessed.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FloorplanError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        FloorplanError::Format {
            line: None,
            message: message.into(),
        }
    }

    pub(crate) fn format_at(line: usize, message: impl Into<String>) -> Self {
        FloorplanError::Format {
            line: Some(line),
            message: format!("line {line}: {}", message.into()),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FloorplanError::Io {
            path: path.into(),
            source,
        }
    }
}
