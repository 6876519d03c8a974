//! Successive augmentation.
//!
//! Large instances are split into consecutive chunks of at most
//! `chunk_size` modules. Each chunk is solved on its own, its chip side
//! becomes a square hard meta-module, and the meta-modules are packed in a
//! final top-level solve. Relative positions across chunks are fixed by
//! this scheme; only the arrangement of the chunk squares is optimized.

mod config;
mod runner;
mod types;

pub use config::DecomposeConfig;
pub use runner::{partition, synthesize_top_level, Decomposer};
pub use types::{Chunk, DecompositionResult};
