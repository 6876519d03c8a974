//! Successive-augmentation execution.
//!
//! [`Decomposer`] orchestrates the two-level run:
//! partition, solve each chunk, synthesize meta-modules, solve the top level.

use tracing::{debug, info};

use super::config::DecomposeConfig;
use super::types::{Chunk, DecompositionResult};
use crate::error::{FloorplanError, Result, SolveStage};
use crate::milp::ModelBuilder;
use crate::pipeline::{solve_model, Solution};
use crate::relax::RelaxationMode;
use crate::solver::{MilpSolver, SolverConfig};
use crate::spec::{HardModule, ProblemInstance};

/// Splits an instance into consecutive chunks of at most `chunk_size`
/// modules, preserving global order (hard modules first).
///
/// The last chunk holds the remainder; a chunk may mix hard and soft
/// modules where the boundary falls inside it.
pub fn partition(instance: &ProblemInstance, chunk_size: usize) -> Result<Vec<Chunk>> {
    if chunk_size == 0 {
        return Err(FloorplanError::Config("chunk_size must be at least 1".into()));
    }
    let n = instance.len();
    Ok((0..n)
        .step_by(chunk_size)
        .enumerate()
        .map(|(index, start)| {
            let range = start..(start + chunk_size).min(n);
            Chunk {
                index,
                instance: instance.slice(range.clone()),
                range,
            }
        })
        .collect())
}

/// The meta-module instance: one square hard module of side `bound` per
/// chunk, in chunk order, and no soft modules.
pub fn synthesize_top_level(bounds: &[f64]) -> Result<ProblemInstance> {
    ProblemInstance::new(
        bounds.iter().map(|&b| HardModule::square(b)).collect(),
        Vec::new(),
    )
}

/// Runs successive augmentation with a given solver.
///
/// # Usage
///
/// ```
/// use u_floorplan::decompose::{DecomposeConfig, Decomposer};
/// use u_floorplan::solver::ShelfSolver;
/// use u_floorplan::spec::{HardModule, ProblemInstance};
///
/// let instance = ProblemInstance::new(vec![HardModule::new(2.0, 1.0); 15], vec![]).unwrap();
/// let solver = ShelfSolver::new();
/// let result = Decomposer::new(&solver)
///     .with_config(DecomposeConfig::default())
///     .run(&instance)
///     .unwrap();
/// assert_eq!(result.top_level.len(), 2);
/// ```
pub struct Decomposer<'a> {
    solver: &'a dyn MilpSolver,
    config: DecomposeConfig,
    solver_config: SolverConfig,
    mode: RelaxationMode,
}

impl<'a> Decomposer<'a> {
    pub fn new(solver: &'a dyn MilpSolver) -> Self {
        Self {
            solver,
            config: DecomposeConfig::default(),
            solver_config: SolverConfig::default(),
            mode: RelaxationMode::default(),
        }
    }

    pub fn with_config(mut self, config: DecomposeConfig) -> Self {
        self.config = config;
        self
    }

    /// Budget applied to every chunk solve and to the top-level solve.
    pub fn with_solver_config(mut self, config: SolverConfig) -> Self {
        self.solver_config = config;
        self
    }

    pub fn with_mode(mut self, mode: RelaxationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Validates the configuration against `instance` and partitions it.
    ///
    /// # Errors
    ///
    /// [`FloorplanError::Config`] if the configuration is invalid, the
    /// instance has fewer than `min_modules` modules, or it fits in a
    /// single chunk.
    pub fn plan(&self, instance: &ProblemInstance) -> Result<Vec<Chunk>> {
        self.config.validate().map_err(FloorplanError::Config)?;
        let n = instance.len();
        if n < self.config.min_modules {
            return Err(FloorplanError::Config(format!(
                "successive augmentation needs at least {} modules, instance has {n}",
                self.config.min_modules
            )));
        }
        if n <= self.config.chunk_size {
            return Err(FloorplanError::Config(format!(
                "{n} modules fit in a single chunk of {}, nothing to decompose",
                self.config.chunk_size
            )));
        }
        let chunks = partition(instance, self.config.chunk_size)?;
        debug!(modules = n, chunks = chunks.len(), chunk_size = self.config.chunk_size, "partitioned");
        Ok(chunks)
    }

    /// Solves every chunk, returning solutions in chunk order.
    ///
    /// The first chunk (by index) that ends infeasible or timed out aborts
    /// the run with its error.
    pub fn solve_chunks(&self, total: usize, chunks: &[Chunk]) -> Result<Vec<Solution>> {
        if self.config.parallel {
            return self.solve_chunks_parallel(total, chunks);
        }
        chunks
            .iter()
            .map(|chunk| self.solve_chunk(total, chunk))
            .collect()
    }

    /// Solves chunks concurrently.
    ///
    /// The first failure detected cancels chunks that have not started yet;
    /// solves already in flight run to completion. Among the chunks that did
    /// run, the lowest-index failure is returned, so a failing chunk skipped
    /// by the cancellation can be reported as a later one.
    #[cfg(feature = "parallel")]
    fn solve_chunks_parallel(&self, total: usize, chunks: &[Chunk]) -> Result<Vec<Solution>> {
        use rayon::prelude::*;
        use std::sync::atomic::{AtomicBool, Ordering};

        let cancelled = AtomicBool::new(false);
        let results: Vec<Option<Result<Solution>>> = chunks
            .par_iter()
            .map(|chunk| {
                if cancelled.load(Ordering::Relaxed) {
                    debug!(chunk = chunk.index + 1, "skipped after an earlier failure");
                    return None;
                }
                let result = self.solve_chunk(total, chunk);
                if result.is_err() {
                    cancelled.store(true, Ordering::Relaxed);
                }
                Some(result)
            })
            .collect();
        first_failure_in_order(results)
    }

    #[cfg(not(feature = "parallel"))]
    fn solve_chunks_parallel(&self, total: usize, chunks: &[Chunk]) -> Result<Vec<Solution>> {
        debug!("built without the `parallel` feature, solving chunks sequentially");
        chunks
            .iter()
            .map(|chunk| self.solve_chunk(total, chunk))
            .collect()
    }

    fn solve_chunk(&self, total: usize, chunk: &Chunk) -> Result<Solution> {
        debug!(
            chunk = chunk.index + 1,
            hard = chunk.instance.hard_count(),
            soft = chunk.instance.soft_count(),
            "solving chunk"
        );
        let model = ModelBuilder::new(&chunk.instance)
            .with_mode(self.mode)
            .with_name(format!("{total}_{}", chunk.index + 1))
            .build()?;
        solve_model(
            model,
            self.solver,
            &self.solver_config,
            SolveStage::Chunk(chunk.index),
        )
    }

    /// Partitions, solves every chunk, then solves the meta-module instance.
    pub fn run(&self, instance: &ProblemInstance) -> Result<DecompositionResult> {
        let chunks = self.plan(instance)?;
        self.execute(instance.len(), chunks)
    }

    /// Solves planned chunks of an instance of `n` modules, then the
    /// meta-module instance built from their sides.
    pub fn execute(&self, n: usize, chunks: Vec<Chunk>) -> Result<DecompositionResult> {
        let chunk_solutions = self.solve_chunks(n, &chunks)?;

        let bounds: Vec<f64> = chunk_solutions.iter().map(Solution::side).collect();
        let top_level = synthesize_top_level(&bounds)?;
        let model = ModelBuilder::new(&top_level)
            .with_mode(self.mode)
            .with_name(format!("{n}_blocks_sa"))
            .build()?;
        let global = solve_model(model, self.solver, &self.solver_config, SolveStage::TopLevel)?;

        let utilization = global.utilization()
            * chunk_solutions
                .iter()
                .map(Solution::utilization)
                .product::<f64>();
        info!(
            modules = n,
            chunks = chunks.len(),
            side = global.side(),
            utilization,
            "successive augmentation finished"
        );

        Ok(DecompositionResult {
            chunks,
            chunk_solutions,
            top_level,
            global,
            utilization,
        })
    }
}

/// Folds per-chunk results (`None` for a cancelled chunk) in chunk order:
/// the first error wins, otherwise all solutions are returned.
///
/// Chunks are only cancelled after a failure, so a `None` never stands
/// alone.
#[cfg_attr(not(feature = "parallel"), allow(dead_code))]
fn first_failure_in_order(results: Vec<Option<Result<Solution>>>) -> Result<Vec<Solution>> {
    let mut solutions = Vec::with_capacity(results.len());
    for result in results.into_iter().flatten() {
        solutions.push(result?);
    }
    Ok(solutions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Termination;
    use crate::milp::MilpModel;
    use crate::solver::{ShelfSolver, SolveOutcome};
    use crate::spec::{ModuleKind, SoftModule};
    use proptest::prelude::*;
    use std::sync::Mutex;

    fn instance(hard: usize, soft: usize) -> ProblemInstance {
        ProblemInstance::new(
            (0..hard)
                .map(|i| HardModule::new(1.0 + i as f64, 2.0))
                .collect(),
            (0..soft)
                .map(|i| SoftModule::new(10.0 + i as f64, 0.5, 2.0))
                .collect(),
        )
        .unwrap()
    }

    /// Delegates to the shelf solver except for one model name.
    struct FailOn {
        name: String,
        outcome: SolveOutcome,
        seen: Mutex<Vec<String>>,
    }

    impl FailOn {
        fn new(name: &str, outcome: SolveOutcome) -> Self {
            Self {
                name: name.to_string(),
                outcome,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl MilpSolver for FailOn {
        fn name(&self) -> &str {
            "fail-on"
        }

        fn solve(&self, model: &MilpModel, config: &SolverConfig) -> Result<SolveOutcome> {
            self.seen.lock().unwrap().push(model.name().to_string());
            if model.name() == self.name {
                return Ok(self.outcome.clone());
            }
            ShelfSolver::new().solve(model, config)
        }
    }

    #[test]
    fn test_partition_mixed_boundary() {
        let inst = instance(7, 8);
        let chunks = partition(&inst, 10).unwrap();
        assert_eq!(chunks.len(), 2);

        assert_eq!(chunks[0].range, 0..10);
        assert_eq!(chunks[0].instance.hard_count(), 7);
        assert_eq!(chunks[0].instance.soft_count(), 3);
        assert_eq!(chunks[0].instance.soft()[0], inst.soft()[0]);

        assert_eq!(chunks[1].range, 10..15);
        assert_eq!(chunks[1].instance.hard_count(), 0);
        assert_eq!(chunks[1].instance.soft_count(), 5);
        assert_eq!(chunks[1].instance.soft()[0], inst.soft()[3]);
    }

    #[test]
    fn test_partition_rejects_zero_chunk_size() {
        assert!(matches!(
            partition(&instance(3, 0), 0),
            Err(FloorplanError::Config(_))
        ));
    }

    #[test]
    fn test_synthesize_top_level() {
        let top = synthesize_top_level(&[4.5, 3.0]).unwrap();
        assert_eq!(top.hard_count(), 2);
        assert_eq!(top.soft_count(), 0);
        assert_eq!(top.hard()[0], HardModule::square(4.5));
        assert_eq!(top.hard()[1], HardModule::square(3.0));
    }

    #[test]
    fn test_plan_rejects_small_instances() {
        let solver = ShelfSolver::new();
        let decomposer = Decomposer::new(&solver);
        // Below the minimum module count.
        assert!(matches!(
            decomposer.plan(&instance(5, 4)),
            Err(FloorplanError::Config(_))
        ));
        // Exactly one chunk.
        assert!(matches!(
            decomposer.plan(&instance(5, 5)),
            Err(FloorplanError::Config(_))
        ));
        assert_eq!(decomposer.plan(&instance(5, 6)).unwrap().len(), 2);
    }

    #[test]
    fn test_run_with_shelf_solver() {
        let solver = ShelfSolver::new();
        let inst = instance(7, 8);
        let result = Decomposer::new(&solver).run(&inst).unwrap();

        assert_eq!(result.chunks.len(), 2);
        assert_eq!(result.chunk_solutions.len(), 2);
        assert_eq!(result.chunk_solutions[0].stage, SolveStage::Chunk(0));
        assert_eq!(result.chunk_solutions[1].model.name(), "15_2");
        assert_eq!(result.global.stage, SolveStage::TopLevel);
        assert_eq!(result.global.model.name(), "15_blocks_sa");

        assert_eq!(result.top_level.len(), 2);
        assert!(result
            .top_level
            .modules()
            .all(|m| m.kind() == ModuleKind::Hard));
        let bounds = result.chunk_bounds();
        for (m, b) in result.top_level.hard().iter().zip(&bounds) {
            assert_eq!((m.width, m.height), (*b, *b));
        }
        let widest = bounds.iter().copied().fold(0.0, f64::max);
        assert!(result.side() >= widest);

        let expected = result.global.utilization()
            * result.chunk_solutions[0].utilization()
            * result.chunk_solutions[1].utilization();
        assert!((result.utilization - expected).abs() < 1e-12);
        assert!(result.utilization > 0.0);
    }

    #[test]
    fn test_infeasible_chunk_halts_run() {
        let solver = FailOn::new("25_2", SolveOutcome::Infeasible);
        let err = Decomposer::new(&solver).run(&instance(12, 13)).unwrap_err();
        match err {
            FloorplanError::Unsolved { stage, status } => {
                assert_eq!(stage, SolveStage::Chunk(1));
                assert_eq!(status, Termination::Infeasible);
            }
            other => panic!("unexpected error {other:?}"),
        }
        // Sequential mode stops at the failing chunk.
        assert_eq!(*solver.seen.lock().unwrap(), vec!["25_1", "25_2"]);
    }

    #[test]
    fn test_timed_out_top_level_is_reported() {
        let solver = FailOn::new("15_blocks_sa", SolveOutcome::TimedOut);
        let err = Decomposer::new(&solver).run(&instance(7, 8)).unwrap_err();
        assert!(matches!(
            err,
            FloorplanError::Unsolved {
                stage: SolveStage::TopLevel,
                status: Termination::TimedOut
            }
        ));
    }

    #[test]
    fn test_parallel_flag_keeps_chunk_order() {
        let solver = ShelfSolver::new();
        let inst = instance(10, 25);
        let sequential = Decomposer::new(&solver).run(&inst).unwrap();
        let parallel = Decomposer::new(&solver)
            .with_config(DecomposeConfig::default().with_parallel(true))
            .run(&inst)
            .unwrap();
        assert_eq!(sequential.chunk_bounds(), parallel.chunk_bounds());
        assert_eq!(sequential.side(), parallel.side());
    }

    #[test]
    fn test_parallel_reports_lowest_failing_chunk() {
        let solver = FailOn::new("35_2", SolveOutcome::TimedOut);
        let err = Decomposer::new(&solver)
            .with_config(DecomposeConfig::default().with_parallel(true))
            .run(&instance(10, 25))
            .unwrap_err();
        assert!(matches!(
            err,
            FloorplanError::Unsolved {
                stage: SolveStage::Chunk(1),
                status: Termination::TimedOut
            }
        ));
    }

    #[test]
    fn test_cancelled_chunks_yield_lowest_ran_failure() {
        let chunk = &partition(&instance(3, 0), 10).unwrap()[0];
        let solver = ShelfSolver::new();
        let solved = || {
            crate::pipeline::solve_instance(
                &chunk.instance,
                RelaxationMode::Underestimate,
                &solver,
                &SolverConfig::default(),
                SolveStage::Chunk(0),
            )
        };
        let failed = |i: usize| -> Result<Solution> {
            Err(SolveOutcome::TimedOut
                .into_result(SolveStage::Chunk(i))
                .unwrap_err())
        };

        let err = first_failure_in_order(vec![Some(solved()), None, Some(failed(2)), Some(failed(3))])
            .unwrap_err();
        assert!(matches!(
            err,
            FloorplanError::Unsolved {
                stage: SolveStage::Chunk(2),
                ..
            }
        ));

        let all = first_failure_in_order(vec![Some(solved()), Some(solved())]).unwrap();
        assert_eq!(all.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_partition_is_complete(hard in 0usize..30, soft in 0usize..30, k in 1usize..15) {
            let inst = instance(hard, soft);
            let chunks = partition(&inst, k).unwrap();

            let sizes: usize = chunks.iter().map(Chunk::len).sum();
            prop_assert_eq!(sizes, hard + soft);
            prop_assert!(chunks.iter().all(|c| c.len() <= k && !c.is_empty()));
            for (i, c) in chunks.iter().enumerate() {
                prop_assert_eq!(c.index, i);
                prop_assert_eq!(c.instance.len(), c.len());
            }

            let rejoined: Vec<_> = chunks.iter().flat_map(|c| c.instance.modules()).collect();
            let original: Vec<_> = inst.modules().collect();
            prop_assert_eq!(rejoined, original);
        }
    }
}
