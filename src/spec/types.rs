//! Module and instance types.

use std::ops::Range;

use crate::error::{FloorplanError, Result};
use crate::relax::Envelope;

/// A fixed-shape rectangle that may be placed rotated by 90°.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HardModule {
    /// Unrotated width.
    pub width: f64,
    /// Unrotated height.
    pub height: f64,
}

impl HardModule {
    /// Creates a module; dimensions are validated by [`ProblemInstance::new`].
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A square module, used for the meta-modules of decomposition.
    pub fn square(side: f64) -> Self {
        Self::new(side, side)
    }

    /// Worst-case axis-aligned extent under either orientation.
    pub fn max_side(&self) -> f64 {
        self.width.max(self.height)
    }

    /// Footprint, the same under either orientation.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(format!("hard module width must be positive, got {}", self.width));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(format!("hard module height must be positive, got {}", self.height));
        }
        Ok(())
    }
}

/// A rectangle of fixed area whose aspect ratio (width / height) may vary
/// within `[min_aspect, max_aspect]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoftModule {
    /// Fixed footprint.
    pub area: f64,
    /// Lower bound on width / height.
    pub min_aspect: f64,
    /// Upper bound on width / height.
    pub max_aspect: f64,
}

impl SoftModule {
    /// Creates a module; values are validated by [`ProblemInstance::new`].
    pub fn new(area: f64, min_aspect: f64, max_aspect: f64) -> Self {
        Self {
            area,
            min_aspect,
            max_aspect,
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if !(self.area.is_finite() && self.area > 0.0) {
            return Err(format!("soft module area must be positive, got {}", self.area));
        }
        if !(self.min_aspect.is_finite() && self.min_aspect > 0.0) {
            return Err(format!(
                "soft module min aspect must be positive, got {}",
                self.min_aspect
            ));
        }
        if !self.max_aspect.is_finite() || self.max_aspect < self.min_aspect {
            return Err(format!(
                "soft module aspect range [{}, {}] is empty",
                self.min_aspect, self.max_aspect
            ));
        }
        Ok(())
    }
}

/// Either kind of module.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Module {
    /// A fixed rectangle.
    Hard(HardModule),
    /// A fixed-area, variable-aspect rectangle.
    Soft(SoftModule),
}

impl Module {
    pub fn kind(&self) -> ModuleKind {
        match self {
            Module::Hard(_) => ModuleKind::Hard,
            Module::Soft(_) => ModuleKind::Soft,
        }
    }
}

/// Which of the two module kinds a global index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModuleKind {
    Hard,
    Soft,
}

/// An ordered run of hard modules followed by an ordered run of soft modules.
///
/// Global module indices are 0-based here: `0..hard_count()` are hard and
/// `hard_count()..len()` are soft. Every constraint group and the chunk
/// boundaries of decomposition rely on this ordering. Soft-module envelopes
/// are derived once at construction and never recomputed.
///
/// # Examples
///
/// ```
/// use u_floorplan::spec::{HardModule, ProblemInstance, SoftModule};
///
/// let instance = ProblemInstance::new(
///     vec![HardModule::new(2.0, 3.0), HardModule::new(4.0, 1.0)],
///     vec![SoftModule::new(6.0, 0.5, 2.0)],
/// )
/// .unwrap();
/// assert_eq!(instance.len(), 3);
/// assert!(instance.is_soft(2));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "InstanceModules", into = "InstanceModules")
)]
pub struct ProblemInstance {
    hard: Vec<HardModule>,
    soft: Vec<SoftModule>,
    envelopes: Vec<Envelope>,
}

impl ProblemInstance {
    /// Creates an instance, validating every module.
    ///
    /// Empty instances are accepted here; parsing and model assembly each
    /// reject them with their own error.
    pub fn new(hard: Vec<HardModule>, soft: Vec<SoftModule>) -> Result<Self> {
        for (i, m) in hard.iter().enumerate() {
            m.validate()
                .map_err(|e| FloorplanError::format(format!("module {}: {e}", i + 1)))?;
        }
        for (k, m) in soft.iter().enumerate() {
            m.validate().map_err(|e| {
                FloorplanError::format(format!("module {}: {e}", hard.len() + k + 1))
            })?;
        }
        let envelopes = soft.iter().map(Envelope::of).collect();
        Ok(Self {
            hard,
            soft,
            envelopes,
        })
    }

    /// Builds an instance from modules in any order; hard modules keep
    /// their relative order and are moved ahead of the soft ones.
    pub fn from_modules(modules: impl IntoIterator<Item = Module>) -> Result<Self> {
        let mut hard = Vec::new();
        let mut soft = Vec::new();
        for m in modules {
            match m {
                Module::Hard(h) => hard.push(h),
                Module::Soft(s) => soft.push(s),
            }
        }
        Self::new(hard, soft)
    }

    pub fn hard(&self) -> &[HardModule] {
        &self.hard
    }

    pub fn soft(&self) -> &[SoftModule] {
        &self.soft
    }

    /// Envelopes parallel to [`soft`](Self::soft).
    pub fn envelopes(&self) -> &[Envelope] {
        &self.envelopes
    }

    pub fn hard_count(&self) -> usize {
        self.hard.len()
    }

    pub fn soft_count(&self) -> usize {
        self.soft.len()
    }

    /// Total number of modules.
    pub fn len(&self) -> usize {
        self.hard.len() + self.soft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_soft(&self, index: usize) -> bool {
        index >= self.hard.len()
    }

    pub fn kind(&self, index: usize) -> ModuleKind {
        if self.is_soft(index) {
            ModuleKind::Soft
        } else {
            ModuleKind::Hard
        }
    }

    /// The module at a global index, or `None` past the end.
    pub fn module(&self, index: usize) -> Option<Module> {
        if index < self.hard.len() {
            Some(Module::Hard(self.hard[index]))
        } else {
            self.soft.get(index - self.hard.len()).copied().map(Module::Soft)
        }
    }

    /// All modules in global index order.
    pub fn modules(&self) -> impl Iterator<Item = Module> + '_ {
        self.hard
            .iter()
            .copied()
            .map(Module::Hard)
            .chain(self.soft.iter().copied().map(Module::Soft))
    }

    /// The sub-instance covering a contiguous range of global indices,
    /// re-indexed from zero. The range is clipped to the instance.
    pub fn slice(&self, range: Range<usize>) -> Self {
        let h = self.hard.len();
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        let hard_range = start.min(h)..end.min(h);
        let soft_range = start.saturating_sub(h)..end.saturating_sub(h);
        Self {
            hard: self.hard[hard_range].to_vec(),
            soft: self.soft[soft_range.clone()].to_vec(),
            envelopes: self.envelopes[soft_range].to_vec(),
        }
    }

    /// Sum of the module footprints at their true areas.
    pub fn total_area(&self) -> f64 {
        self.hard.iter().map(HardModule::area).sum::<f64>()
            + self.soft.iter().map(|s| s.area).sum::<f64>()
    }
}

/// Serialized form of [`ProblemInstance`]: the module lists only.
/// Deserializing goes through [`ProblemInstance::new`], so modules are
/// validated and envelopes re-derived.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(not(feature = "serde"), allow(dead_code))]
struct InstanceModules {
    hard: Vec<HardModule>,
    soft: Vec<SoftModule>,
}

impl TryFrom<InstanceModules> for ProblemInstance {
    type Error = FloorplanError;

    fn try_from(modules: InstanceModules) -> Result<Self> {
        Self::new(modules.hard, modules.soft)
    }
}

impl From<ProblemInstance> for InstanceModules {
    fn from(instance: ProblemInstance) -> Self {
        Self {
            hard: instance.hard,
            soft: instance.soft,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProblemInstance {
        ProblemInstance::new(
            vec![HardModule::new(2.0, 3.0), HardModule::new(4.0, 1.0)],
            vec![SoftModule::new(6.0, 0.5, 2.0), SoftModule::new(9.0, 1.0, 1.0)],
        )
        .unwrap()
    }

    #[test]
    fn test_index_convention() {
        let inst = sample();
        assert_eq!(inst.hard_count(), 2);
        assert_eq!(inst.soft_count(), 2);
        assert_eq!(inst.kind(1), ModuleKind::Hard);
        assert_eq!(inst.kind(2), ModuleKind::Soft);
        assert_eq!(inst.module(3), Some(Module::Soft(SoftModule::new(9.0, 1.0, 1.0))));
        assert_eq!(inst.module(4), None);
        assert_eq!(inst.envelopes().len(), 2);
    }

    #[test]
    fn test_slice_across_boundary() {
        let inst = sample();
        let mid = inst.slice(1..3);
        assert_eq!(mid.hard(), &[HardModule::new(4.0, 1.0)]);
        assert_eq!(mid.soft(), &[SoftModule::new(6.0, 0.5, 2.0)]);
        assert_eq!(mid.envelopes(), &inst.envelopes()[..1]);

        let tail = inst.slice(3..10);
        assert_eq!(tail.hard_count(), 0);
        assert_eq!(tail.soft_count(), 1);
    }

    #[test]
    fn test_from_modules_reorders_kinds() {
        let inst = ProblemInstance::from_modules(vec![
            Module::Soft(SoftModule::new(4.0, 1.0, 2.0)),
            Module::Hard(HardModule::new(1.0, 2.0)),
            Module::Hard(HardModule::new(3.0, 2.0)),
        ])
        .unwrap();
        assert_eq!(inst.hard(), &[HardModule::new(1.0, 2.0), HardModule::new(3.0, 2.0)]);
        assert!(inst.is_soft(2));
    }

    #[test]
    fn test_rejects_invalid_modules() {
        assert!(ProblemInstance::new(vec![HardModule::new(0.0, 1.0)], vec![]).is_err());
        assert!(ProblemInstance::new(vec![], vec![SoftModule::new(-1.0, 1.0, 2.0)]).is_err());
        assert!(ProblemInstance::new(vec![], vec![SoftModule::new(4.0, 2.0, 1.0)]).is_err());
        assert!(ProblemInstance::new(vec![], vec![SoftModule::new(4.0, 0.0, 1.0)]).is_err());
    }

    #[test]
    fn test_module_lists_convert_through_validation() {
        let inst = sample();
        let modules = InstanceModules::from(inst.clone());
        assert_eq!(modules.soft.len(), 2);
        assert_eq!(ProblemInstance::try_from(modules).unwrap(), inst);

        let bad = InstanceModules {
            hard: vec![HardModule::new(1.0, 1.0)],
            soft: vec![SoftModule::new(4.0, 2.0, 1.0)],
        };
        assert!(matches!(
            ProblemInstance::try_from(bad),
            Err(FloorplanError::Format { .. })
        ));
    }

    #[test]
    fn test_total_area() {
        let inst = sample();
        assert!((inst.total_area() - (6.0 + 4.0 + 6.0 + 9.0)).abs() < 1e-12);
    }
}
