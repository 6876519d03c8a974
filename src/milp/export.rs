//! LP text export in the lp_solve algebraic dialect.
//!
//! One statement per line, groups introduced by `/* ... */` comments:
//!
//! ```text
//! /* Objective function */
//! min: +Y;
//!
//! /* Non-overlap constraints hard-hard */
//! +x1 -x2 +z1 -13.9282032303 xo_1_2 -13.9282032303 yo_1_2 <= -2;
//! ...
//! bin z1, z2, xo_1_2, xo_1_3, xo_2_3, yo_1_2, yo_1_3, yo_2_3;
//! ```

use super::linear::{LinearConstraint, LinearExpr};
use super::model::{ChipAxis, MilpModel, PairKind};
use super::variables::Var;

/// Renders the model as LP statements, one per entry.
pub fn lp_lines(model: &MilpModel) -> Vec<String> {
    let mut lines = Vec::with_capacity(model.constraint_count() + 3 * model.variable_count() + 16);

    lines.push("/* Objective function */".to_string());
    lines.push(format!("min: {};", fmt_expr(model.objective())));

    for kind in [PairKind::HardHard, PairKind::HardSoft, PairKind::SoftSoft] {
        let mut group = model.disjunctions().iter().filter(|d| d.kind == kind).peekable();
        if group.peek().is_none() {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("/* Non-overlap constraints {} */", kind.label()));
        for d in group {
            for c in &d.inequalities {
                lines.push(fmt_constraint(c));
            }
        }
    }

    lines.push(String::new());
    lines.push("/* Variable bounds */".to_string());
    for (var, domain) in model.variables() {
        if domain.is_binary() {
            continue;
        }
        lines.push(format!("{var} >= {};", fmt_num(domain.lower)));
        if domain.upper.is_finite() {
            lines.push(format!("{var} <= {};", fmt_num(domain.upper)));
        }
    }

    for (axis, title) in [
        (ChipAxis::Width, "Chip width constraints"),
        (ChipAxis::Height, "Chip height constraints"),
    ] {
        lines.push(String::new());
        lines.push(format!("/* {title} */"));
        for c in model.chip_constraints().iter().filter(|c| c.axis == axis) {
            lines.push(fmt_constraint(&c.constraint));
        }
    }

    let binaries: Vec<String> = model
        .variables()
        .iter()
        .filter(|(_, d)| d.is_binary())
        .map(|(v, _)| v.to_string())
        .collect();
    if !binaries.is_empty() {
        lines.push(String::new());
        lines.push("/* Binary variables */".to_string());
        lines.push(format!("bin {};", binaries.join(", ")));
    }
    lines
}

/// [`lp_lines`] joined into a newline-terminated string.
pub fn to_lp_string(model: &MilpModel) -> String {
    let mut out = lp_lines(model).join("\n");
    out.push('\n');
    out
}

fn fmt_constraint(c: &LinearConstraint) -> String {
    format!("{} {} {};", fmt_expr(&c.lhs), c.sense.symbol(), fmt_num(c.rhs))
}

fn fmt_expr(e: &LinearExpr) -> String {
    let mut parts: Vec<String> = e.terms().map(|(v, c)| fmt_term(v, c)).collect();
    let constant = e.constant_term();
    if constant != 0.0 || parts.is_empty() {
        parts.push(fmt_signed(constant));
    }
    parts.join(" ")
}

fn fmt_term(var: Var, c: f64) -> String {
    if (c - 1.0).abs() < 1e-12 {
        format!("+{var}")
    } else if (c + 1.0).abs() < 1e-12 {
        format!("-{var}")
    } else {
        format!("{} {var}", fmt_signed(c))
    }
}

fn fmt_signed(v: f64) -> String {
    if v < 0.0 {
        format!("-{}", fmt_num(-v))
    } else {
        format!("+{}", fmt_num(v))
    }
}

/// Integers print without a fraction; other values keep ten decimals with
/// trailing zeros trimmed.
fn fmt_num(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 && v.abs() < 1e15 {
        let r = v.round();
        if r == 0.0 {
            return "0".to_string();
        }
        return format!("{}", r as i64);
    }
    let s = format!("{v:.10}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milp::build_model;
    use crate::relax::RelaxationMode;
    use crate::spec::{parse, HardModule, ProblemInstance};

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(3.0), "3");
        assert_eq!(fmt_num(-2.0), "-2");
        assert_eq!(fmt_num(-0.0), "0");
        assert_eq!(fmt_num(0.5), "0.5");
        assert_eq!(fmt_num(1.0 / 3.0), "0.3333333333");
    }

    #[test]
    fn test_fmt_expr_signs() {
        let e = LinearExpr::var(Var::X(0))
            .plus_term(Var::X(1), -1.0)
            .plus_term(Var::Z(0), 2.5);
        assert_eq!(fmt_expr(&e), "+x1 -x2 +2.5 z1");
        assert_eq!(fmt_expr(&LinearExpr::zero()), "+0");
    }

    #[test]
    fn test_example_export_sections() {
        let inst = parse("hard - 2\n2,3\n4,1\n\nsoft - 1\n6,0.5,2\n").unwrap();
        let model = build_model(&inst, RelaxationMode::Underestimate).unwrap();
        let lines = lp_lines(&model);

        assert_eq!(lines[0], "/* Objective function */");
        assert_eq!(lines[1], "min: +Y;");
        assert!(lines.contains(&"/* Non-overlap constraints hard-hard */".to_string()));
        assert!(lines.contains(&"/* Non-overlap constraints hard-soft */".to_string()));
        assert!(!lines.contains(&"/* Non-overlap constraints soft-soft */".to_string()));
        assert!(lines.contains(&"x1 >= 0;".to_string()));
        assert!(lines.contains(&"w3 >= 1.7320508076;".to_string()));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("bin z1, z2, xo_1_2, xo_1_3, xo_2_3, yo_1_2, yo_1_3, yo_2_3;")
        );

        let statements = lines.iter().filter(|l| l.ends_with(';')).count();
        // objective + 12 non-overlap + 6 chip + bin + bounds (x, y: 6; w: 2; Y: 2)
        assert_eq!(statements, 1 + 12 + 6 + 1 + 10);
    }

    #[test]
    fn test_first_hard_hard_inequality() {
        let inst =
            ProblemInstance::new(vec![HardModule::new(2.0, 3.0), HardModule::new(4.0, 1.0)], vec![])
                .unwrap();
        let model = build_model(&inst, RelaxationMode::Underestimate).unwrap();
        let text = to_lp_string(&model);
        // x1 + 2 + z1 <= x2 + 7 xo + 7 yo, B = 3 + 4
        assert!(
            text.contains("+x1 -x2 +z1 -7 xo_1_2 -7 yo_1_2 <= -2;"),
            "unexpected export:\n{text}"
        );
    }
}
