//! Run Record - one simulator execution

use chrono::NaiveDateTime;

use super::RunParams;

/// Directory-name prefix written by the recorder: `DD-MM-YYYY_HH-MM-SS`.
const TIMESTAMP_FORMAT: &str = "%d-%m-%Y_%H-%M-%S";
const TIMESTAMP_LEN: usize = 19;

/// Run Record represents a single loaded run directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    name: String,
    params: RunParams,
    recorded_at: Option<NaiveDateTime>,
    episode_count: usize,
}

impl RunRecord {
    /// Create a run record.
    ///
    /// # Arguments
    ///
    /// * `name` - Run directory name
    /// * `params` - Parsed parameter document
    /// * `episode_count` - Rows in the run's metrics table
    #[must_use]
    pub fn new(name: impl Into<String>, params: RunParams, episode_count: usize) -> Self {
        let name = name.into();
        let recorded_at = parse_recorded_at(&name);
        Self {
            name,
            params,
            recorded_at,
            episode_count,
        }
    }

    /// Get the run directory name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the run parameters.
    #[must_use]
    pub const fn params(&self) -> &RunParams {
        &self.params
    }

    /// Get the scenario the run was executed on.
    #[must_use]
    pub fn scenario(&self) -> &str {
        &self.params.scenario_file
    }

    /// Get the recording time encoded in the directory name, if any.
    #[must_use]
    pub const fn recorded_at(&self) -> Option<NaiveDateTime> {
        self.recorded_at
    }

    /// Get the number of episodes in the run.
    #[must_use]
    pub const fn episode_count(&self) -> usize {
        self.episode_count
    }
}

fn parse_recorded_at(name: &str) -> Option<NaiveDateTime> {
    let prefix = name.get(..TIMESTAMP_LEN)?;
    NaiveDateTime::parse_from_str(prefix, TIMESTAMP_FORMAT).ok()
}
