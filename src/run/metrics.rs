//! Metrics table (`metrics.csv`)
//!
//! ```text
//! episode                 INT                         index of the episode
//! curvature               FLOAT[]    "[a, b, ...]"    (N - 2) menger curvatures
//! normalized_curvature    FLOAT[]    "[a, b, ...]"    (N - 2)
//! roughness               FLOAT[]    "[a, b, ...]"    (N - 2)
//! path_length_values      FLOAT[]    "[a, b, ...]"    (N - 1) step lengths
//! path_length             FLOAT                       complete path length
//! acceleration            FLOAT[]    JSON             (N - 1)
//! jerk                    FLOAT[]    JSON             (N - 2)
//! velocity                FLOAT[][]  JSON             (N) per-step velocity vector
//! collision_amount        INT                         collisions in the episode
//! collisions              INT[]      JSON             step index of each collision
//! path                    FLOAT[][]  JSON             (N - 1) positions
//! angle_over_length       FLOAT                       mean heading change
//! action_type             ENUM[]                      MOVE | STOP | ROTATE
//! time_diff               INT                         episode duration, ns
//! time                    INT[]      "[a, b, ...]"    ROS time of each step, ns
//! result                  ENUM                        TIMEOUT | GOAL_REACHED | COLLISION
//! ```
//!
//! Missing columns load as empty sequences or zero. Blank scalar cells load
//! as missing values: `NaN` for floats and null for integers.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::RunParams;
use crate::parse::{action_types, json_float_list, json_positions, json_speeds, string_to_float_list};
use crate::storage::EpisodeRow;
use crate::{Error, Result};

/// One CSV row before its text columns are converted.
#[derive(Debug, Deserialize)]
struct RawEpisode {
    episode: i64,
    #[serde(default)]
    curvature: String,
    #[serde(default)]
    normalized_curvature: String,
    #[serde(default)]
    roughness: String,
    #[serde(default)]
    path_length_values: String,
    #[serde(default = "zero")]
    path_length: Option<f64>,
    #[serde(default)]
    acceleration: String,
    #[serde(default)]
    jerk: String,
    #[serde(default)]
    velocity: String,
    #[serde(default = "zero")]
    collision_amount: Option<f64>,
    #[serde(default)]
    collisions: String,
    #[serde(default)]
    path: String,
    #[serde(default = "zero")]
    angle_over_length: Option<f64>,
    #[serde(default)]
    action_type: String,
    #[serde(default = "zero")]
    time_diff: Option<f64>,
    #[serde(default)]
    time: String,
    #[serde(default)]
    result: String,
}

/// Scalar of a column absent from the file.
#[allow(clippy::unnecessary_wraps)]
const fn zero() -> Option<f64> {
    Some(0.0)
}

impl RawEpisode {
    #[allow(clippy::cast_possible_truncation)]
    fn convert(self, run: &str, params: &RunParams) -> Result<EpisodeRow> {
        let result = match self.result.trim() {
            "" => None,
            value => Some(value.parse()?),
        };

        Ok(EpisodeRow {
            episode: self.episode,
            curvature: string_to_float_list(&self.curvature)?,
            normalized_curvature: string_to_float_list(&self.normalized_curvature)?,
            roughness: string_to_float_list(&self.roughness)?,
            path_length_values: string_to_float_list(&self.path_length_values)?,
            path_length: self.path_length.unwrap_or(f64::NAN),
            acceleration: json_float_list("acceleration", &self.acceleration)?,
            jerk: json_float_list("jerk", &self.jerk)?,
            velocity: json_speeds("velocity", &self.velocity)?,
            collision_amount: self.collision_amount.map(|v| v as i64),
            collisions: json_float_list("collisions", &self.collisions)?,
            path: json_positions("path", &self.path)?,
            angle_over_length: self.angle_over_length.unwrap_or(f64::NAN),
            action_type: action_types(&self.action_type)?,
            time_diff: self.time_diff.map(|v| v as i64),
            time: string_to_float_list(&self.time)?,
            result,
            run: run.to_string(),
            local_planner: params.local_planner.clone(),
            agent_name: params.agent_name.clone(),
            model: params.model.clone(),
            namespace: params.namespace.clone(),
        })
    }
}

/// Read a metrics file and tag every row with the run's metadata.
///
/// # Errors
///
/// Returns error if the file cannot be read, a row is malformed, or a
/// sequence column fails to parse. Parse errors name the offending line.
pub fn read_metrics<P: AsRef<Path>>(path: P, run: &str, params: &RunParams) -> Result<Vec<EpisodeRow>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut rows = Vec::new();

    for (line, record) in reader.deserialize::<RawEpisode>().enumerate() {
        let row = record?.convert(run, params).map_err(|e| match e {
            Error::Parse { column, message } => Error::Parse {
                column,
                message: format!("{message} (run {run}, data line {})", line + 1),
            },
            other => other,
        })?;
        rows.push(row);
    }

    debug!(run, rows = rows.len(), "Read metrics");
    Ok(rows)
}
