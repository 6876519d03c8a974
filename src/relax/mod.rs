//! Soft-module envelopes and their linear relaxations.
//!
//! A soft module's true footprint curve `h = area / w` is not linear, so the
//! MILP works with a line fitted over the module's width envelope. Two
//! fits are available, see [`RelaxationMode`].

mod envelope;
mod relaxation;

pub use envelope::{derive_envelope, Envelope};
pub use relaxation::{derive_relaxation, LinearRelaxation, RelaxationMode};
