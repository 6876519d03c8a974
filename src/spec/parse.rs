//! Line-oriented spec text format.
//!
//! ```text
//! hard - 2
//! 2,3
//! 4,1
//!
//! soft - 1
//! 6,0.5,2
//! ```
//!
//! Either section may be omitted, but at least one must be present and
//! each declared count must match the data lines that follow it.

use std::str::FromStr;

use super::types::{HardModule, ModuleKind, ProblemInstance, SoftModule};
use crate::error::{FloorplanError, Result};

struct Section<'a> {
    kind: ModuleKind,
    declared: usize,
    header_line: usize,
    rows: Vec<(usize, &'a str)>,
}

/// Parses spec text into a [`ProblemInstance`].
///
/// # Errors
///
/// [`FloorplanError::Format`] when no section header is present, a section
/// appears twice, a declared count disagrees with its data lines, a data
/// line is malformed, or the instance ends up with no modules.
pub fn parse(text: &str) -> Result<ProblemInstance> {
    let mut sections: Vec<Section<'_>> = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((kind, declared)) = parse_header(line, line_no)? {
            if sections.iter().any(|s| s.kind == kind) {
                return Err(FloorplanError::format_at(
                    line_no,
                    format!("duplicate {} section", kind_name(kind)),
                ));
            }
            sections.push(Section {
                kind,
                declared,
                header_line: line_no,
                rows: Vec::new(),
            });
            continue;
        }
        match sections.last_mut() {
            Some(section) => section.rows.push((line_no, line)),
            None => {
                return Err(FloorplanError::format_at(
                    line_no,
                    "data line before any section header",
                ))
            }
        }
    }

    if sections.is_empty() {
        return Err(FloorplanError::format(
            "spec declares neither a hard nor a soft section",
        ));
    }

    let mut hard = Vec::new();
    let mut soft = Vec::new();
    for section in &sections {
        if section.rows.len() != section.declared {
            return Err(FloorplanError::format_at(
                section.header_line,
                format!(
                    "{} section declares {} modules but {} data lines follow",
                    kind_name(section.kind),
                    section.declared,
                    section.rows.len()
                ),
            ));
        }
        for &(line_no, row) in &section.rows {
            match section.kind {
                ModuleKind::Hard => {
                    let [w, h] = parse_fields::<2>(row, line_no)?;
                    hard.push(HardModule::new(w, h));
                }
                ModuleKind::Soft => {
                    let [a, lo, hi] = parse_fields::<3>(row, line_no)?;
                    soft.push(SoftModule::new(a, lo, hi));
                }
            }
        }
    }

    if hard.is_empty() && soft.is_empty() {
        return Err(FloorplanError::format("instance has no modules"));
    }
    ProblemInstance::new(hard, soft)
}

/// Renders an instance as spec text, one line per entry.
///
/// Empty sections are omitted. `parse` reproduces the instance exactly.
pub fn spec_lines(instance: &ProblemInstance) -> Vec<String> {
    let mut lines = Vec::with_capacity(instance.len() + 3);
    if instance.hard_count() > 0 || instance.is_empty() {
        lines.push(format!("hard - {}", instance.hard_count()));
        for m in instance.hard() {
            lines.push(format!("{},{}", m.width, m.height));
        }
    }
    if instance.soft_count() > 0 {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("soft - {}", instance.soft_count()));
        for m in instance.soft() {
            lines.push(format!("{},{},{}", m.area, m.min_aspect, m.max_aspect));
        }
    }
    lines
}

/// [`spec_lines`] joined into a newline-terminated string.
pub fn to_spec_text(instance: &ProblemInstance) -> String {
    let mut out = spec_lines(instance).join("\n");
    out.push('\n');
    out
}

impl FromStr for ProblemInstance {
    type Err = FloorplanError;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

fn parse_header(line: &str, line_no: usize) -> Result<Option<(ModuleKind, usize)>> {
    let prefix = line.get(..4).map(str::to_ascii_lowercase);
    let kind = match prefix.as_deref() {
        Some("hard") => ModuleKind::Hard,
        Some("soft") => ModuleKind::Soft,
        _ => return Ok(None),
    };
    let rest = line[4..].trim_start();
    let count = rest.strip_prefix('-').ok_or_else(|| {
        FloorplanError::format_at(line_no, "expected `-` after section name")
    })?;
    let count = count.trim();
    let declared = count.parse::<usize>().map_err(|_| {
        FloorplanError::format_at(line_no, format!("invalid module count `{count}`"))
    })?;
    Ok(Some((kind, declared)))
}

fn parse_fields<const N: usize>(row: &str, line_no: usize) -> Result<[f64; N]> {
    let fields: Vec<&str> = row.split(',').map(str::trim).collect();
    if fields.len() != N {
        return Err(FloorplanError::format_at(
            line_no,
            format!("expected {N} comma-separated values, found {}", fields.len()),
        ));
    }
    let mut out = [0.0; N];
    for (slot, field) in out.iter_mut().zip(&fields) {
        *slot = field.parse::<f64>().map_err(|_| {
            FloorplanError::format_at(line_no, format!("`{field}` is not a number"))
        })?;
    }
    Ok(out)
}

fn kind_name(kind: ModuleKind) -> &'static str {
    match kind {
        ModuleKind::Hard => "hard",
        ModuleKind::Soft => "soft",
    }
}
