//! Dataset loader
//!
//! Loads a set of run directories, validates that they all reference the
//! same scenario, and concatenates their episodes into one table.

use std::path::Path;

use tracing::{debug, info};

use super::{read_metrics, RunParams, RunRecord};
use crate::storage::EpisodeTable;
use crate::{Error, Result};

/// Metrics table file name inside a run directory.
pub const METRICS_FILE: &str = "metrics.csv";
/// Parameter document file name inside a run directory.
pub const PARAMS_FILE: &str = "params.yaml";

/// Every run of one analysis, combined.
#[derive(Debug, Clone)]
pub struct Dataset {
    runs: Vec<RunRecord>,
    scenario: String,
    table: EpisodeTable,
}

impl Dataset {
    /// Get the loaded runs, in load order.
    #[must_use]
    pub fn runs(&self) -> &[RunRecord] {
        &self.runs
    }

    /// Get the scenario shared by every run.
    #[must_use]
    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    /// Get the combined episode table.
    #[must_use]
    pub const fn table(&self) -> &EpisodeTable {
        &self.table
    }
}

/// Load one run directory.
///
/// # Errors
///
/// Returns [`Error::MissingRunFile`] if `metrics.csv` or `params.yaml` is
/// absent, or any parse error from either file.
pub fn load_run<P: AsRef<Path>>(data_dir: P, name: &str) -> Result<(RunRecord, EpisodeTable)> {
    let base = data_dir.as_ref().join(name);
    let metrics = base.join(METRICS_FILE);
    let params = base.join(PARAMS_FILE);

    for path in [&metrics, &params] {
        if !path.is_file() {
            return Err(Error::MissingRunFile { path: path.clone() });
        }
    }

    let params = RunParams::load(&params)?;
    let rows = read_metrics(&metrics, name, &params)?;
    let table = EpisodeTable::from_rows(&rows)?;
    let run = RunRecord::new(name, params, rows.len());
    debug!(
        run = name,
        scenario = run.scenario(),
        recorded_at = ?run.recorded_at(),
        episodes = rows.len(),
        "Loaded run"
    );

    Ok((run, table))
}

/// Load and combine several run directories.
///
/// # Errors
///
/// Returns error if `names` is empty, any run fails to load, or the runs
/// reference different scenarios. Nothing is returned on partial failure.
pub fn load_dataset<P, S>(data_dir: P, names: &[S]) -> Result<Dataset>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    if names.is_empty() {
        return Err(Error::InvalidInput("No run directories given".to_string()));
    }

    let mut runs = Vec::with_capacity(names.len());
    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        let (run, table) = load_run(data_dir.as_ref(), name.as_ref())?;
        runs.push(run);
        tables.push(table);
    }

    let scenario = runs[0].scenario().to_string();
    if let Some(other) = runs.iter().find(|r| r.scenario() != scenario) {
        return Err(Error::ScenarioMismatch {
            expected: scenario,
            found: other.scenario().to_string(),
            run: other.name().to_string(),
        });
    }

    let table = EpisodeTable::concat(&tables)?;
    info!(
        runs = runs.len(),
        episodes = table.num_rows(),
        scenario = %scenario,
        "Dataset loaded"
    );

    Ok(Dataset {
        runs,
        scenario,
        table,
    })
}
