//! Placement extraction from a solved model.

use crate::milp::{MilpModel, Var};
use crate::solver::Assignment;
use crate::spec::ModuleKind;

/// Selector values at or above this read as set.
const BINARY_THRESHOLD: f64 = 0.5;

/// One module's rectangle in the solved floorplan.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacedModule {
    /// 0-based global module index.
    pub index: usize,
    pub kind: ModuleKind,
    /// Left edge.
    pub x: f64,
    /// Bottom edge.
    pub y: f64,
    /// Horizontal extent as placed.
    pub width: f64,
    /// Vertical extent as placed (the linearized height for soft modules).
    pub height: f64,
    /// Hard modules only: placed with width and height swapped.
    pub rotated: bool,
}

impl PlacedModule {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y + self.height
    }
}

/// All placed modules of one solve inside the square chip.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layout {
    /// Chip side `Y`.
    pub side: f64,
    /// One entry per module, in global index order.
    pub modules: Vec<PlacedModule>,
    /// Module area over chip area.
    pub utilization: f64,
}

impl Layout {
    /// Reads positions, orientations and soft widths out of an assignment.
    ///
    /// Utilization uses the modules' true areas, so the linearized soft
    /// heights do not inflate or deflate it.
    pub fn from_assignment(model: &MilpModel, assignment: &Assignment) -> Self {
        let instance = model.instance();
        let side = assignment.chip_side();
        let modules = (0..model.module_count())
            .map(|i| {
                let kind = instance.kind(i);
                let rotated =
                    kind == ModuleKind::Hard && assignment.value(Var::Z(i)) >= BINARY_THRESHOLD;
                let (width, height) = model.extents(i, rotated, assignment.value(Var::W(i)));
                PlacedModule {
                    index: i,
                    kind,
                    x: assignment.value(Var::X(i)),
                    y: assignment.value(Var::Y(i)),
                    width,
                    height,
                    rotated,
                }
            })
            .collect();
        Self {
            side,
            modules,
            utilization: utilization(instance.total_area(), side),
        }
    }
}

fn utilization(area: f64, side: f64) -> f64 {
    if side > 0.0 {
        area / (side * side)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milp::build_model;
    use crate::relax::RelaxationMode;
    use crate::solver::{MilpSolver, ShelfSolver, SolveOutcome, SolverConfig};
    use crate::spec::parse;

    fn overlaps(a: &PlacedModule, b: &PlacedModule) -> bool {
        let eps = 1e-9;
        a.x + eps < b.right() && b.x + eps < a.right() && a.y + eps < b.top() && b.y + eps < a.top()
    }

    #[test]
    fn test_layout_from_shelf_solution() {
        let inst = parse("hard - 2\n2,3\n4,1\n\nsoft - 1\n6,0.5,2\n").unwrap();
        let model = build_model(&inst, RelaxationMode::Underestimate).unwrap();
        let SolveOutcome::Solved(a) = ShelfSolver::new()
            .solve(&model, &SolverConfig::default())
            .unwrap()
        else {
            panic!("shelf solver must solve");
        };
        let layout = Layout::from_assignment(&model, &a);

        assert_eq!(layout.modules.len(), 3);
        assert_eq!(layout.side, a.objective);
        assert_eq!(layout.modules[2].kind, ModuleKind::Soft);
        assert!(!layout.modules[2].rotated);
        for m in &layout.modules {
            assert!(m.right() <= layout.side + 1e-9, "{m:?} exceeds the chip");
            assert!(m.top() <= layout.side + 1e-9, "{m:?} exceeds the chip");
        }
        for (k, a) in layout.modules.iter().enumerate() {
            for b in &layout.modules[k + 1..] {
                assert!(!overlaps(a, b), "{a:?} overlaps {b:?}");
            }
        }
        let expected = 16.0 / (layout.side * layout.side);
        assert!((layout.utilization - expected).abs() < 1e-12);
        assert!(layout.utilization <= 1.0 + 1e-9);
    }

    #[test]
    fn test_rotation_rounds_at_half() {
        let inst = parse("hard - 1\n2,5\n").unwrap();
        let model = build_model(&inst, RelaxationMode::Underestimate).unwrap();
        let mut a = Assignment::new(5.0, Default::default());
        a.values.insert(Var::ChipSide, 5.0);
        a.values.insert(Var::Z(0), 0.51);
        let layout = Layout::from_assignment(&model, &a);
        assert!(layout.modules[0].rotated);
        assert_eq!((layout.modules[0].width, layout.modules[0].height), (5.0, 2.0));

        a.values.insert(Var::Z(0), 0.49);
        let layout = Layout::from_assignment(&model, &a);
        assert!(!layout.modules[0].rotated);
        assert_eq!((layout.modules[0].width, layout.modules[0].height), (2.0, 5.0));
    }

    #[test]
    fn test_zero_side_has_zero_utilization() {
        assert_eq!(utilization(4.0, 0.0), 0.0);
        assert_eq!(utilization(4.0, 4.0), 0.25);
    }
}
