//! Linear relaxations of the soft-module hyperbola `h = area / w`.

use super::envelope::Envelope;

/// How a soft module's height is linearized over its width range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RelaxationMode {
    /// Tangent at `max_w`: never above the true height on the envelope.
    #[default]
    Underestimate,
    /// Chord through both envelope corners: never below the true height
    /// on the envelope, since `area / w` is convex.
    Secant,
}

/// `height ≈ gradient · width + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearRelaxation {
    /// Slope, negative for a non-degenerate envelope.
    pub gradient: f64,
    /// Height at zero width.
    pub intercept: f64,
}

impl LinearRelaxation {
    /// The tangent to `area / w` at `w`.
    fn tangent(area: f64, w: f64) -> Self {
        Self {
            gradient: -area / (w * w),
            intercept: 2.0 * area / w,
        }
    }

    /// Linearized height at width `w`.
    pub fn height_at(&self, w: f64) -> f64 {
        self.gradient * w + self.intercept
    }
}

/// Linearizes a soft module's height over its envelope.
///
/// A degenerate envelope (single permissible width) always gets the tangent
/// at that width, which passes exactly through `(w, area / w)`; the secant
/// would divide by a zero span.
pub fn derive_relaxation(envelope: &Envelope, mode: RelaxationMode) -> LinearRelaxation {
    if envelope.is_degenerate() {
        return LinearRelaxation::tangent(envelope.area, envelope.max_w);
    }
    match mode {
        RelaxationMode::Underestimate => LinearRelaxation::tangent(envelope.area, envelope.max_w),
        RelaxationMode::Secant => {
            let gradient = (envelope.max_h - envelope.min_h) / (envelope.min_w - envelope.max_w);
            LinearRelaxation {
                gradient,
                intercept: envelope.max_h - gradient * envelope.min_w,
            }
        }
    }
}
