//! On-disk working area.
//!
//! ```text
//! <root>/
//!   spec_files/<n>_block.ilp
//!   spec_files/successive_augmentation/<n>/<n>_<i>.ilp
//!   spec_files/successive_augmentation/<n>/<n>_blocks_sa.ilp
//!   results/<n>_sa_<true|false>_dimensions.txt
//!   lp_solve_files/<N>_blocks_constraints.lp
//! ```
//!
//! Every file is rendered to lines in memory first and written in a single
//! buffered pass.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::decompose::Chunk;
use crate::error::{FloorplanError, Result};
use crate::milp::{lp_lines, MilpModel};
use crate::spec::{parse, spec_lines, ProblemInstance};

/// Paths and file operations rooted at one directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn spec_dir(&self) -> PathBuf {
        self.root.join("spec_files")
    }

    /// Input spec file of an `n`-block instance.
    pub fn instance_path(&self, n: usize) -> PathBuf {
        self.spec_dir().join(format!("{n}_block.ilp"))
    }

    pub fn augmentation_dir(&self, n: usize) -> PathBuf {
        self.spec_dir()
            .join("successive_augmentation")
            .join(n.to_string())
    }

    /// Spec file of chunk `index` (0-based); file names count from 1.
    pub fn chunk_path(&self, n: usize, index: usize) -> PathBuf {
        self.augmentation_dir(n)
            .join(format!("{n}_{}.ilp", index + 1))
    }

    pub fn top_level_path(&self, n: usize) -> PathBuf {
        self.augmentation_dir(n).join(format!("{n}_blocks_sa.ilp"))
    }

    pub fn result_path(&self, n: usize, decomposed: bool) -> PathBuf {
        self.root
            .join("results")
            .join(format!("{n}_sa_{decomposed}_dimensions.txt"))
    }

    /// LP export of a model over `modules` modules.
    pub fn lp_path(&self, modules: usize) -> PathBuf {
        self.root
            .join("lp_solve_files")
            .join(format!("{modules}_blocks_constraints.lp"))
    }

    pub fn read_instance(&self, n: usize) -> Result<ProblemInstance> {
        read_spec_file(self.instance_path(n))
    }

    pub fn write_instance(&self, n: usize, instance: &ProblemInstance) -> Result<PathBuf> {
        let path = self.instance_path(n);
        write_lines(&path, &spec_lines(instance))?;
        Ok(path)
    }

    /// Removes and recreates the chunk directory of an `n`-block run.
    pub fn reset_augmentation_dir(&self, n: usize) -> Result<PathBuf> {
        let dir = self.augmentation_dir(n);
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|e| FloorplanError::io(&dir, e))?;
        }
        fs::create_dir_all(&dir).map_err(|e| FloorplanError::io(&dir, e))?;
        Ok(dir)
    }

    /// Writes one spec file per chunk, in chunk order.
    pub fn write_chunks(&self, n: usize, chunks: &[Chunk]) -> Result<Vec<PathBuf>> {
        chunks
            .iter()
            .map(|chunk| {
                let path = self.chunk_path(n, chunk.index);
                write_lines(&path, &spec_lines(&chunk.instance))?;
                Ok(path)
            })
            .collect()
    }

    pub fn write_top_level(&self, n: usize, top_level: &ProblemInstance) -> Result<PathBuf> {
        let path = self.top_level_path(n);
        write_lines(&path, &spec_lines(top_level))?;
        Ok(path)
    }

    /// Records the final chip side as `side,side`.
    pub fn write_result(&self, n: usize, decomposed: bool, side: f64) -> Result<PathBuf> {
        let path = self.result_path(n, decomposed);
        write_lines(&path, &[format!("{side},{side}")])?;
        Ok(path)
    }

    pub fn write_lp(&self, model: &MilpModel) -> Result<PathBuf> {
        let path = self.lp_path(model.module_count());
        write_lines(&path, &lp_lines(model))?;
        Ok(path)
    }
}

/// Reads and parses a spec file.
pub fn read_spec_file(path: impl AsRef<Path>) -> Result<ProblemInstance> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| FloorplanError::io(path, e))?;
    parse(&text)
}

/// Writes `lines`, each newline-terminated, creating parent directories.
pub fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| FloorplanError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| FloorplanError::io(path, e))?;
    let mut out = BufWriter::new(file);
    for line in lines {
        writeln!(out, "{line}").map_err(|e| FloorplanError::io(path, e))?;
    }
    out.flush().map_err(|e| FloorplanError::io(path, e))?;
    debug!(path = %path.display(), lines = lines.len(), "wrote file");
    Ok(())
}
