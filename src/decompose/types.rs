//! Decomposition data types.

use std::ops::Range;

use crate::pipeline::Solution;
use crate::spec::ProblemInstance;

/// A contiguous run of modules solved as its own instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// 0-based position in chunk order.
    pub index: usize,
    /// Global module indices covered by the chunk.
    pub range: Range<usize>,
    /// The chunk's modules, re-indexed from zero.
    pub instance: ProblemInstance,
}

impl Chunk {
    /// Number of modules in the chunk.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Result of a successive-augmentation run.
#[derive(Debug, Clone)]
pub struct DecompositionResult {
    /// The planned chunks, in chunk order.
    pub chunks: Vec<Chunk>,
    /// One solution per chunk, in chunk order.
    pub chunk_solutions: Vec<Solution>,
    /// The meta-module instance: one square hard module per chunk.
    pub top_level: ProblemInstance,
    /// Solution of the meta-module instance.
    pub global: Solution,
    /// Top-level utilization times every chunk's utilization.
    pub utilization: f64,
}

impl DecompositionResult {
    /// Final chip side of the whole instance.
    pub fn side(&self) -> f64 {
        self.global.side()
    }

    /// Solved chip side of each chunk, in chunk order.
    pub fn chunk_bounds(&self) -> Vec<f64> {
        self.chunk_solutions.iter().map(Solution::side).collect()
    }
}
