//! Report output model for benchmark runs.
//!
//! A [`BenchmarkReport`] freezes the tracker statistics together with the
//! verdict so a run can be compared later. Reports are written as JSON, either
//! to any writer or to a file under the working directory.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Component, Path};

use crate::format::format_time;
use crate::tracker::{BenchmarkStats, BenchmarkTracker, Strategy};

/// Machine-readable snapshot of a benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub stats: BenchmarkStats,
    pub winner: Option<Strategy>,
    /// Absolute difference of the average render times, milliseconds
    pub difference_ms: Option<f64>,
    pub theme_changes: usize,
}

impl BenchmarkReport {
    pub fn new(stats: BenchmarkStats, theme_changes: usize) -> Self {
        Self {
            winner: stats.winner(),
            difference_ms: stats.difference(),
            stats,
            theme_changes,
        }
    }

    pub fn from_tracker(tracker: &BenchmarkTracker, theme_changes: usize) -> Self {
        Self::new(tracker.get_stats(), theme_changes)
    }

    /// One-line verdict, e.g. `Store Context faster by 1.20ms`
    pub fn summary(&self) -> String {
        match (self.winner, self.difference_ms) {
            (Some(winner), Some(diff)) => format!("{} faster by {}", winner, format_time(diff)),
            _ => "not enough samples for both strategies".to_string(),
        }
    }

    /// Write the report as pretty JSON to `path`, creating parent
    /// directories. Only paths below the working directory are accepted.
    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        ensure_relative(path)?;
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        self.write_to_writer(&mut file)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn write_to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writeln!(writer)?;
        Ok(())
    }
}

fn ensure_relative(path: &Path) -> Result<()> {
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                bail!("report path {} leaves the working directory", path.display())
            }
            Component::RootDir | Component::Prefix(_) => {
                bail!("report path {} must be relative", path.display())
            }
        }
    }
    Ok(())
}
