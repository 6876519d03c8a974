//! Global chip-side upper bound, used as the big-M constant.

use crate::spec::ProblemInstance;

/// Computes `B = Σ_hard max(w, h) + Σ_soft (max_w + max_h)`.
///
/// Stacking every module along one axis in its worst orientation fits in a
/// `B × B` square, so `B` bounds the optimal chip side and every coordinate
/// of an optimal placement. Recompute it for every instance, including the
/// meta-module instances produced by decomposition.
///
/// # Examples
///
/// ```
/// use u_floorplan::bound::compute_bound;
/// use u_floorplan::spec::{HardModule, ProblemInstance};
///
/// let inst = ProblemInstance::new(vec![HardModule::new(2.0, 3.0)], vec![]).unwrap();
/// assert_eq!(compute_bound(&inst), 3.0);
/// ```
pub fn compute_bound(instance: &ProblemInstance) -> f64 {
    let hard: f64 = instance.hard().iter().map(|m| m.max_side()).sum();
    let soft: f64 = instance
        .envelopes()
        .iter()
        .map(|e| e.max_w + e.max_h)
        .sum();
    hard + soft
}
