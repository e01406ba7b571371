//! # Tour Persistence
//!
//! Improved tours are handed to a [`TourWriter`] under one of two targets:
//! the final output file and the working file that is refreshed as the search
//! progresses. [`TsplibTourWriter`] writes the TSPLIB `TOUR` format to the
//! paths configured in the search options; [`MemoryTourWriter`] keeps the
//! writes in memory.

use std::fmt::Debug;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::engine::options::SearchOptions;
use crate::error::{Result, ResultExt};
use crate::problem::Cost;
use crate::tour::chain_order;

/// Where a tour is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TourTarget {
    /// The final named output file.
    Output,
    /// The working tour file.
    Working,
}

/// Sink for improved tours.
pub trait TourWriter: Debug + Send {
    /// Persists the tour given by `successors` under `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tour cannot be written.
    fn write_tour(
        &mut self,
        target: TourTarget,
        name: &str,
        successors: &[usize],
        cost: Cost,
    ) -> Result<()>;
}

/// Writes tours in the TSPLIB `TOUR` format.
///
/// A `$` in a configured path is replaced by the tour cost. Targets without a
/// path are skipped.
#[derive(Debug, Clone, Default)]
pub struct TsplibTourWriter {
    output: Option<PathBuf>,
    working: Option<PathBuf>,
}

impl TsplibTourWriter {
    pub fn new(output: Option<PathBuf>, working: Option<PathBuf>) -> Self {
        Self { output, working }
    }

    pub fn from_options(options: &SearchOptions) -> Self {
        Self::new(
            options.get_output_tour_file().map(Path::to_path_buf),
            options.get_tour_file().map(Path::to_path_buf),
        )
    }

    fn path(&self, target: TourTarget) -> Option<&Path> {
        match target {
            TourTarget::Output => self.output.as_deref(),
            TourTarget::Working => self.working.as_deref(),
        }
    }
}

/// Expands `$` in a path to the tour cost.
fn full_name(path: &Path, cost: Cost) -> PathBuf {
    let raw = path.to_string_lossy();
    if raw.contains('$') {
        PathBuf::from(raw.replace('$', &cost.to_string()))
    } else {
        path.to_path_buf()
    }
}

/// Writes `successors` as a TSPLIB tour, node ids 1-based and starting at node 1.
pub fn write_tsplib<W: Write>(
    out: &mut W,
    name: &str,
    successors: &[usize],
    cost: Cost,
) -> std::io::Result<()> {
    writeln!(out, "NAME : {}.{}.tour", name, cost)?;
    writeln!(out, "COMMENT : Length = {}", cost)?;
    writeln!(out, "TYPE : TOUR")?;
    writeln!(out, "DIMENSION : {}", successors.len())?;
    writeln!(out, "TOUR_SECTION")?;
    if !successors.is_empty() {
        for node in chain_order(successors, 0) {
            writeln!(out, "{}", node + 1)?;
        }
    }
    writeln!(out, "-1")?;
    writeln!(out, "EOF")?;
    Ok(())
}

impl TourWriter for TsplibTourWriter {
    fn write_tour(
        &mut self,
        target: TourTarget,
        name: &str,
        successors: &[usize],
        cost: Cost,
    ) -> Result<()> {
        let Some(path) = self.path(target) else {
            return Ok(());
        };
        let path = full_name(path, cost);
        let file = File::create(&path)
            .context(format!("Failed to create tour file {}", path.display()))?;
        let mut out = BufWriter::new(file);
        write_tsplib(&mut out, name, successors, cost)?;
        out.flush()?;
        Ok(())
    }
}

/// A tour handed to a [`MemoryTourWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TourRecord {
    pub target: TourTarget,
    pub name: String,
    pub successors: Vec<usize>,
    pub cost: Cost,
}

/// Keeps every written tour in memory. Clones share the same record list.
#[derive(Debug, Clone, Default)]
pub struct MemoryTourWriter {
    records: Arc<Mutex<Vec<TourRecord>>>,
}

impl MemoryTourWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All writes so far, oldest first.
    pub fn records(&self) -> Vec<TourRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl TourWriter for MemoryTourWriter {
    fn write_tour(
        &mut self,
        target: TourTarget,
        name: &str,
        successors: &[usize],
        cost: Cost,
    ) -> Result<()> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(TourRecord {
                target,
                name: name.to_string(),
                successors: successors.to_vec(),
                cost,
            });
        Ok(())
    }
}
