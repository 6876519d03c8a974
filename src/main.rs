use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use u_floorplan::artifacts::Workspace;
use u_floorplan::decompose::{DecomposeConfig, Decomposer};
use u_floorplan::generate::{generate, GeneratorConfig};
use u_floorplan::pipeline::{solve_instance, Solution};
use u_floorplan::relax::RelaxationMode;
use u_floorplan::solver::{LpSolveCli, MilpSolver, ShelfSolver, SolverConfig};
use u_floorplan::SolveStage;

#[derive(Parser, Debug)]
#[command(name = "u-floorplan", version, about = "Square-chip floorplanning via MILP")]
struct Cli {
    #[arg(
        long,
        global = true,
        default_value = ".",
        help = "Working directory holding spec_files/, results/ and lp_solve_files/"
    )]
    root: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Solve spec_files/<n>_block.ilp
    Solve {
        #[arg(short = 'n', long, default_value_t = 30, help = "Number of blocks")]
        num_blocks: usize,
        #[arg(long, value_enum, default_value_t = Relaxation::Underestimate)]
        relaxation: Relaxation,
        #[arg(long, default_value_t = false, help = "Decompose into chunks first")]
        successive_augmentation: bool,
        #[arg(long, default_value_t = 10, help = "Solver time budget per solve, in seconds")]
        runtime: u64,
        #[arg(long, default_value_t = 10)]
        chunk_size: usize,
        #[arg(long, default_value_t = false, help = "Solve chunks in parallel")]
        parallel: bool,
        #[arg(long, default_value_t = false, help = "Write the final model as lp_solve LP text")]
        lp_export: bool,
        #[arg(long, value_enum, default_value_t = Backend::Shelf)]
        solver: Backend,
        #[arg(long, default_value = "lp_solve")]
        lp_solve_bin: PathBuf,
    },
    /// Write a random instance to spec_files/<n>_block.ilp
    Generate {
        #[arg(short = 'n', long, default_value_t = 30)]
        num_blocks: usize,
        #[arg(long, help = "Number of hard modules (default: half)")]
        hard: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Relaxation {
    Underestimate,
    Secant,
}

impl From<Relaxation> for RelaxationMode {
    fn from(r: Relaxation) -> Self {
        match r {
            Relaxation::Underestimate => RelaxationMode::Underestimate,
            Relaxation::Secant => RelaxationMode::Secant,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Backend {
    Shelf,
    LpSolve,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("u_floorplan=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let workspace = Workspace::new(&cli.root);

    match cli.command {
        Commands::Solve {
            num_blocks,
            relaxation,
            successive_augmentation,
            runtime,
            chunk_size,
            parallel,
            lp_export,
            solver,
            lp_solve_bin,
        } => {
            let solver: Box<dyn MilpSolver> = match solver {
                Backend::Shelf => Box::new(ShelfSolver::new()),
                Backend::LpSolve => Box::new(LpSolveCli::new().with_program(lp_solve_bin)),
            };
            let solver_config = SolverConfig::default().with_time_limit_secs(runtime);
            let decompose = DecomposeConfig::default()
                .with_chunk_size(chunk_size)
                .with_parallel(parallel);
            solve(
                &workspace,
                num_blocks,
                relaxation.into(),
                successive_augmentation.then_some(decompose),
                solver.as_ref(),
                &solver_config,
                lp_export,
            )
        }
        Commands::Generate {
            num_blocks,
            hard,
            seed,
        } => {
            let hard = hard.unwrap_or(num_blocks / 2).min(num_blocks);
            let mut config = GeneratorConfig::default().with_counts(hard, num_blocks - hard);
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }
            let instance = generate(&config)?;
            let path = workspace
                .write_instance(num_blocks, &instance)
                .context("writing generated instance")?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn solve(
    workspace: &Workspace,
    n: usize,
    mode: RelaxationMode,
    decompose: Option<DecomposeConfig>,
    solver: &dyn MilpSolver,
    solver_config: &SolverConfig,
    lp_export: bool,
) -> Result<()> {
    let instance = workspace
        .read_instance(n)
        .with_context(|| format!("loading the {n}-block instance"))?;
    info!(
        hard = instance.hard_count(),
        soft = instance.soft_count(),
        solver = solver.name(),
        "instance loaded"
    );

    let decomposed = decompose.is_some();
    let (final_solution, utilization): (Solution, f64) = match decompose {
        Some(config) => {
            let decomposer = Decomposer::new(solver)
                .with_config(config)
                .with_mode(mode)
                .with_solver_config(solver_config.clone());
            let chunks = decomposer.plan(&instance)?;
            workspace.reset_augmentation_dir(n)?;
            workspace.write_chunks(n, &chunks)?;
            let result = decomposer.execute(n, chunks)?;
            for (i, b) in result.chunk_bounds().iter().enumerate() {
                println!("chunk {}: side {b}", i + 1);
            }
            workspace.write_top_level(n, &result.top_level)?;
            let utilization = result.utilization;
            (result.global, utilization)
        }
        None => {
            let solution =
                solve_instance(&instance, mode, solver, solver_config, SolveStage::Direct)?;
            let utilization = solution.utilization();
            (solution, utilization)
        }
    };

    let side = final_solution.side();
    let result_path = workspace.write_result(n, decomposed, side)?;
    println!("side {side}");
    println!("utilization {:.2}%", utilization * 100.0);
    println!("result written to {}", result_path.display());

    if lp_export {
        let path = workspace.write_lp(&final_solution.model)?;
        println!("LP model written to {}", path.display());
    }
    Ok(())
}
