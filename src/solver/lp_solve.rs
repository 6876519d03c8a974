//! Adapter for the `lp_solve` command-line solver.
//!
//! The model is exported in LP text and piped to `lp_solve -S4`, which
//! prints the objective value followed by one `name value` line per
//! variable. Improved solutions printed while the search runs overwrite
//! earlier ones, so the last printed solution is read back into an
//! [`Assignment`].

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use super::types::{Assignment, MilpSolver, SolveOutcome, SolverConfig};
use crate::error::{FloorplanError, Result};
use crate::milp::{to_lp_string, MilpModel, Var};

const INFEASIBLE_MARKER: &str = "This problem is infeasible";
const UNBOUNDED_MARKER: &str = "This problem is unbounded";
const OBJECTIVE_MARKER: &str = "Value of objective function:";
const VARIABLES_MARKER: &str = "Actual values of the variables:";
const CONSTRAINTS_MARKER: &str = "Actual values of the constraints:";

/// lp_solve exit code for a solution that is feasible but not proven optimal.
const EXIT_SUBOPTIMAL: i32 = 1;
/// lp_solve exit code when the time budget ran out.
const EXIT_TIMEOUT: i32 = 7;

/// Runs an `lp_solve` executable as a child process.
#[derive(Debug, Clone)]
pub struct LpSolveCli {
    program: PathBuf,
}

impl Default for LpSolveCli {
    fn default() -> Self {
        Self {
            program: PathBuf::from("lp_solve"),
        }
    }
}

impl LpSolveCli {
    /// Uses `lp_solve` from `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a specific executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl MilpSolver for LpSolveCli {
    fn name(&self) -> &str {
        "lp_solve"
    }

    fn solve(&self, model: &MilpModel, config: &SolverConfig) -> Result<SolveOutcome> {
        let timeout_secs = config.time_limit_ms.div_ceil(1000).max(1);
        let program = self.program.display().to_string();
        debug!(program = %program, timeout_secs, model = model.name(), "spawning lp_solve");

        let mut child = Command::new(&self.program)
            .arg("-S4")
            .arg("-timeout")
            .arg(timeout_secs.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| FloorplanError::Solver(format!("failed to start {program}: {e}")))?;

        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| FloorplanError::Solver(format!("{program}: stdin unavailable")))?;
            stdin
                .write_all(to_lp_string(model).as_bytes())
                .map_err(|e| FloorplanError::Solver(format!("{program}: writing model: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| FloorplanError::Solver(format!("{program}: {e}")))?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            warn!(program = %program, stderr = %stderr.trim(), "lp_solve wrote to stderr");
        }
        interpret(output.status.code(), &String::from_utf8_lossy(&output.stdout))
    }
}

/// Maps lp_solve's exit code and printed output to an outcome.
pub(crate) fn interpret(code: Option<i32>, stdout: &str) -> Result<SolveOutcome> {
    if stdout.contains(INFEASIBLE_MARKER) {
        return Ok(SolveOutcome::Infeasible);
    }
    if stdout.contains(UNBOUNDED_MARKER) {
        return Err(FloorplanError::Solver("lp_solve reports the model unbounded".into()));
    }
    match parse_solution(stdout)? {
        Some(assignment) => Ok(SolveOutcome::Solved(
            assignment.with_proven_optimal(code == Some(0)),
        )),
        None => match code {
            Some(EXIT_TIMEOUT) | Some(EXIT_SUBOPTIMAL) => Ok(SolveOutcome::TimedOut),
            other => Err(FloorplanError::Solver(format!(
                "lp_solve exited with {} and printed no solution",
                other.map_or_else(|| "a signal".to_string(), |c| format!("code {c}"))
            ))),
        },
    }
}

/// Reads the objective and variable block, `None` when no solution was printed.
fn parse_solution(stdout: &str) -> Result<Option<Assignment>> {
    let mut pending_objective = None;
    let mut objective = None;
    let mut values = BTreeMap::new();
    let mut in_variables = false;
    let mut saw_variables = false;

    for line in stdout.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(OBJECTIVE_MARKER) {
            pending_objective = Some(parse_number(rest.trim())?);
            continue;
        }
        // Each variable block is a complete solution and replaces the previous one.
        if line.starts_with(VARIABLES_MARKER) {
            values.clear();
            objective = pending_objective.take();
            in_variables = true;
            saw_variables = true;
            continue;
        }
        if line.starts_with(CONSTRAINTS_MARKER) {
            in_variables = false;
            continue;
        }
        if !in_variables || line.is_empty() {
            continue;
        }
        // Anything that is not a `name value` pair closes the block.
        let mut fields = line.split_whitespace();
        let (Some(name), Some(value), None) = (fields.next(), fields.next(), fields.next()) else {
            in_variables = false;
            continue;
        };
        let Ok(value) = value.parse::<f64>() else {
            in_variables = false;
            continue;
        };
        match name.parse::<Var>() {
            Ok(var) => {
                values.insert(var, value);
            }
            Err(e) => warn!(name, error = %e, "ignoring unknown variable in lp_solve output"),
        }
    }

    if !saw_variables {
        return Ok(None);
    }
    let objective = objective.unwrap_or_else(|| values.get(&Var::ChipSide).copied().unwrap_or(0.0));
    Ok(Some(Assignment::new(objective, values)))
}

fn parse_number(text: &str) -> Result<f64> {
    text.parse::<f64>()
        .map_err(|_| FloorplanError::Solver(format!("invalid number '{text}' in lp_solve output")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPTIMAL: &str = "
Value of objective function: 5.00000000

Actual values of the variables:
x1                              0
x2                              2
y1                              0
y2                              0
z1                              0
z2                              1
xo_1_2                          0
yo_1_2                          0
Y                               5

Actual values of the constraints:
R1                             -5
R2                              0
";

    #[test]
    fn test_parse_optimal_output() {
        let outcome = interpret(Some(0), OPTIMAL).unwrap();
        let SolveOutcome::Solved(a) = outcome else {
            panic!("expected a solution, got {outcome:?}");
        };
        assert!(a.proven_optimal);
        assert_eq!(a.objective, 5.0);
        assert_eq!(a.chip_side(), 5.0);
        assert_eq!(a.value(Var::X(1)), 2.0);
        assert_eq!(a.value(Var::Z(1)), 1.0);
        assert_eq!(a.value(Var::PairX(0, 1)), 0.0);
        // Constraint rows are not variables.
        assert_eq!(a.values.len(), 9);
    }

    #[test]
    fn test_suboptimal_output_is_not_proven() {
        let text = format!("\nThe model is sub-optimal. Only a faster solution was found.\n{OPTIMAL}");
        let SolveOutcome::Solved(a) = interpret(Some(1), &text).unwrap() else {
            panic!("expected a solution");
        };
        assert!(!a.proven_optimal);
    }

    #[test]
    fn test_last_improved_solution_wins() {
        let text = "
Improved solution being stored

Value of objective function: 9.00000000

Actual values of the variables:
x2                              4
Y                               9

Dual values with upper and lower limits:
R1                 0              -1e+30           1e+30

Value of objective function: 5.00000000

Actual values of the variables:
x2                              2
Y                               5
";
        let SolveOutcome::Solved(a) = interpret(Some(0), text).unwrap() else {
            panic!("expected a solution");
        };
        assert_eq!(a.objective, 5.0);
        assert_eq!(a.value(Var::X(1)), 2.0);
        assert_eq!(a.values.len(), 2);
    }

    #[test]
    fn test_superseded_solution_leaves_no_values_behind() {
        let text = "
Improved solution being stored

Value of objective function: 9.00000000

Actual values of the variables:
x2                              4
y1                              3
Y                               9

Improved solution being stored

Actual values of the variables:
x2                              2
Y                               5
";
        let SolveOutcome::Solved(a) = interpret(Some(0), text).unwrap() else {
            panic!("expected a solution");
        };
        assert_eq!(a.values.len(), 2);
        assert_eq!(a.value(Var::Y(0)), 0.0);
        assert_eq!(a.value(Var::X(1)), 2.0);
        // No objective line for the final block, so it falls back to Y.
        assert_eq!(a.objective, 5.0);
    }

    #[test]
    fn test_infeasible_output() {
        let outcome = interpret(Some(2), "\nThis problem is infeasible\n").unwrap();
        assert_eq!(outcome, SolveOutcome::Infeasible);
    }

    #[test]
    fn test_timeout_without_solution() {
        assert_eq!(interpret(Some(7), "\n").unwrap(), SolveOutcome::TimedOut);
    }

    #[test]
    fn test_unexpected_exit_is_adapter_error() {
        assert!(matches!(
            interpret(Some(3), "parse error on line 4\n"),
            Err(FloorplanError::Solver(_))
        ));
        assert!(matches!(
            interpret(None, ""),
            Err(FloorplanError::Solver(_))
        ));
    }

    #[test]
    fn test_unbounded_is_adapter_error() {
        assert!(matches!(
            interpret(Some(3), "\nThis problem is unbounded\n"),
            Err(FloorplanError::Solver(_))
        ));
    }

    #[test]
    fn test_missing_program_is_adapter_error() {
        let inst = crate::spec::parse("hard - 1\n1,1\n").unwrap();
        let model = crate::milp::build_model(&inst, Default::default()).unwrap();
        let solver = LpSolveCli::new().with_program("/nonexistent/lp_solve-binary");
        let err = solver.solve(&model, &SolverConfig::default()).unwrap_err();
        assert!(matches!(err, FloorplanError::Solver(_)));
    }
}
