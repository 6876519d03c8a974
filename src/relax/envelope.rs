//! Feasible width/height ranges of soft modules.

use crate::spec::SoftModule;

/// Relative width span below which an envelope is treated as a single point.
pub(crate) const DEGENERATE_SPAN: f64 = 1e-12;

/// The feasible `[min_w, max_w]` × `[min_h, max_h]` box of a soft module.
///
/// Widths follow from `w = sqrt(area · aspect)` at the two aspect bounds;
/// heights are the true `area / w` at the opposite width extremes, so
/// `max_w · min_h == area == min_w · max_h`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Envelope {
    /// Area of the module.
    pub area: f64,
    /// Width at `min_aspect`.
    pub min_w: f64,
    /// Width at `max_aspect`.
    pub max_w: f64,
    /// Height at `max_w`.
    pub min_h: f64,
    /// Height at `min_w`.
    pub max_h: f64,
}

impl Envelope {
    /// Derives the envelope of a soft module.
    pub fn of(module: &SoftModule) -> Self {
        let area = module.area;
        let min_w = (area * module.min_aspect).sqrt();
        let max_w = (area * module.max_aspect).sqrt();
        Self {
            area,
            min_w,
            max_w,
            min_h: area / max_w,
            max_h: area / min_w,
        }
    }

    /// Whether the width range has collapsed to a single value.
    pub fn is_degenerate(&self) -> bool {
        self.max_w - self.min_w <= DEGENERATE_SPAN * self.max_w
    }

    /// Clips a width into `[min_w, max_w]`.
    pub fn clamp_width(&self, w: f64) -> f64 {
        w.clamp(self.min_w, self.max_w)
    }

    /// True height `area / w`.
    pub fn true_height(&self, w: f64) -> f64 {
        self.area / w
    }
}

/// Free-function form of [`Envelope::of`].
pub fn derive_envelope(module: &SoftModule) -> Envelope {
    Envelope::of(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_example_envelope() {
        let env = derive_envelope(&SoftModule::new(6.0, 0.5, 2.0));
        assert!((env.min_w - 3.0f64.sqrt()).abs() < 1e-12);
        assert!((env.max_w - 12.0f64.sqrt()).abs() < 1e-12);
        assert!((env.min_h - 6.0 / 12.0f64.sqrt()).abs() < 1e-12);
        assert!((env.max_h - 6.0 / 3.0f64.sqrt()).abs() < 1e-12);
        assert!(!env.is_degenerate());
    }

    #[test]
    fn test_degenerate_envelope() {
        let env = derive_envelope(&SoftModule::new(9.0, 1.0, 1.0));
        assert!(env.is_degenerate());
        assert_eq!(env.min_w, env.max_w);
        assert!((env.min_w - 3.0).abs() < 1e-12);
        assert_eq!(env.clamp_width(10.0), env.max_w);
    }

    proptest! {
        #[test]
        fn prop_envelope_invariants(
            area in 0.01f64..1.0e4,
            lo in 0.01f64..10.0,
            factor in 1.0f64..10.0,
        ) {
            let env = derive_envelope(&SoftModule::new(area, lo, lo * factor));
            prop_assert!(env.min_w > 0.0);
            prop_assert!(env.min_w <= env.max_w);
            prop_assert!(env.min_h <= env.max_h);
            let tol = 1e-9 * area;
            prop_assert!((env.max_w * env.min_h - area).abs() <= tol);
            prop_assert!((env.min_w * env.max_h - area).abs() <= tol);
        }
    }
}
