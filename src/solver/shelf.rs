//! Greedy shelf-packing adapter.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::debug;

use super::types::{Assignment, MilpSolver, SolveOutcome, SolverConfig};
use crate::error::Result;
use crate::milp::{MilpModel, Relation, Var};

/// Width multipliers tried on top of `sqrt(total area)`.
const SHELF_STEPS: usize = 20;

/// A deterministic heuristic that packs modules onto horizontal shelves.
///
/// Hard modules lie on their longer side, soft modules take the width
/// closest to square inside their envelope, and modules are placed
/// tallest first (next-fit decreasing height) for a range of shelf widths;
/// the smallest resulting square wins. The pair selectors are derived from
/// the placement, so the returned assignment satisfies every constraint of
/// the model. It is feasible but not optimal and ignores the time budget.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShelfSolver;

impl ShelfSolver {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone, Copy)]
struct Footprint {
    rotated: bool,
    soft_width: f64,
    w: f64,
    h: f64,
}

struct Packing {
    x: Vec<f64>,
    y: Vec<f64>,
    shelf: Vec<usize>,
    side: f64,
}

impl MilpSolver for ShelfSolver {
    fn name(&self) -> &str {
        "shelf"
    }

    fn solve(&self, model: &MilpModel, _config: &SolverConfig) -> Result<SolveOutcome> {
        let instance = model.instance();
        let n = model.module_count();
        let hard_count = instance.hard_count();

        let footprints: Vec<Footprint> = (0..n)
            .map(|i| match instance.hard().get(i) {
                Some(m) => {
                    let rotated = m.height > m.width;
                    let (w, h) = model.extents(i, rotated, 0.0);
                    Footprint {
                        rotated,
                        soft_width: 0.0,
                        w,
                        h,
                    }
                }
                None => {
                    let env = &instance.envelopes()[i - hard_count];
                    let soft_width = env.clamp_width(env.area.sqrt());
                    let (w, h) = model.extents(i, false, soft_width);
                    Footprint {
                        rotated: false,
                        soft_width,
                        w,
                        h,
                    }
                }
            })
            .collect();

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            footprints[b]
                .h
                .partial_cmp(&footprints[a].h)
                .unwrap_or(Ordering::Equal)
                .then(a.cmp(&b))
        });

        let widest = footprints.iter().map(|f| f.w).fold(0.0, f64::max);
        let area: f64 = footprints.iter().map(|f| f.w * f.h).sum();
        let base = area.sqrt().max(widest);

        let mut best = pack(&order, &footprints, f64::INFINITY);
        for step in 0..=SHELF_STEPS {
            let limit = base * (1.0 + step as f64 * 0.1);
            let candidate = pack(&order, &footprints, limit);
            if candidate.side < best.side {
                best = candidate;
            }
        }
        debug!(modules = n, side = best.side, "shelf packing chosen");

        let mut values = BTreeMap::new();
        for (i, f) in footprints.iter().enumerate() {
            values.insert(Var::X(i), best.x[i]);
            values.insert(Var::Y(i), best.y[i]);
            if i < hard_count {
                values.insert(Var::Z(i), if f.rotated { 1.0 } else { 0.0 });
            } else {
                values.insert(Var::W(i), f.soft_width);
            }
        }
        for i in 0..n {
            for j in i + 1..n {
                let relation = match best.shelf[i].cmp(&best.shelf[j]) {
                    Ordering::Equal if best.x[i] <= best.x[j] => Relation::LeftOf,
                    Ordering::Equal => Relation::RightOf,
                    Ordering::Less => Relation::Below,
                    Ordering::Greater => Relation::Above,
                };
                let (xo, yo) = relation.selectors();
                values.insert(Var::PairX(i, j), xo);
                values.insert(Var::PairY(i, j), yo);
            }
        }
        values.insert(Var::ChipSide, best.side);

        Ok(SolveOutcome::Solved(Assignment::new(best.side, values)))
    }
}

/// Next-fit shelf packing in `order` with shelves at most `limit` wide
/// (a single module wider than `limit` still gets its own shelf).
fn pack(order: &[usize], footprints: &[Footprint], limit: f64) -> Packing {
    let n = footprints.len();
    let mut x = vec![0.0; n];
    let mut y = vec![0.0; n];
    let mut shelf = vec![0; n];

    let mut cursor = 0.0;
    let mut shelf_y = 0.0;
    let mut shelf_h: f64 = 0.0;
    let mut shelf_idx = 0;
    let mut used_w: f64 = 0.0;

    for &i in order {
        let f = &footprints[i];
        if cursor > 0.0 && cursor + f.w > limit {
            shelf_y += shelf_h;
            shelf_h = 0.0;
            cursor = 0.0;
            shelf_idx += 1;
        }
        x[i] = cursor;
        y[i] = shelf_y;
        shelf[i] = shelf_idx;
        cursor += f.w;
        shelf_h = shelf_h.max(f.h);
        used_w = used_w.max(cursor);
    }

    Packing {
        x,
        y,
        shelf,
        side: used_w.max(shelf_y + shelf_h),
    }
}
