//! Episode table (Arrow columnar storage)
//!
//! Every run's metrics are converted into one `RecordBatch` with a fixed
//! schema, then concatenated into a single combined table. The table is
//! read-only after loading: queries build filtered copies through
//! `arrow::compute::filter_record_batch` and extract plain vectors for
//! plotting.
//!
//! Scalar columns are primitive arrays, per-timestep sequences are
//! `List<Float64>`, trajectories are `List<List<Float64>>`.

use std::collections::BTreeSet;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float64Array, Float64Builder, Int64Array, ListArray,
    ListBuilder, RecordBatch, StringArray, StringBuilder,
};
use arrow::compute;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};

use crate::keys::{ActionType, EpisodeResult, GroupColumn, ScalarColumn, SequenceColumn};
use crate::{Error, Result};

/// Column holding the episode index.
pub const EPISODE: &str = "episode";
/// Column holding per-step ROS timestamps (ns).
pub const TIME: &str = "time";
/// Column holding the trajectory positions.
pub const PATH: &str = "path";
/// Column holding the episode outcome.
pub const RESULT: &str = "result";
/// Column holding per-step action types.
pub const ACTION_TYPE: &str = "action_type";
/// Column holding collision step indices.
pub const COLLISIONS: &str = "collisions";

/// One parsed row of a metrics file, tagged with its run's metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EpisodeRow {
    /// Index of the episode within its run
    pub episode: i64,
    /// Menger curvatures
    pub curvature: Vec<f64>,
    /// Normalized curvatures
    pub normalized_curvature: Vec<f64>,
    /// Roughness values
    pub roughness: Vec<f64>,
    /// Distance travelled in each step
    pub path_length_values: Vec<f64>,
    /// Complete path length
    pub path_length: f64,
    /// Velocity differences
    pub acceleration: Vec<f64>,
    /// Acceleration differences
    pub jerk: Vec<f64>,
    /// Planar speed per step
    pub velocity: Vec<f64>,
    /// Number of collisions, `None` for a blank cell
    pub collision_amount: Option<i64>,
    /// Step indices of collisions
    pub collisions: Vec<f64>,
    /// Position per step (`[x, y, theta]`)
    pub path: Vec<Vec<f64>>,
    /// Mean heading change over the path
    pub angle_over_length: f64,
    /// Action per step
    pub action_type: Vec<ActionType>,
    /// Episode duration (ns), `None` for a blank cell
    pub time_diff: Option<i64>,
    /// ROS timestamp per step (ns)
    pub time: Vec<f64>,
    /// Episode outcome
    pub result: Option<EpisodeResult>,
    /// Run directory the row came from
    pub run: String,
    /// Local planner of the run
    pub local_planner: String,
    /// Agent of the run
    pub agent_name: String,
    /// Model of the run
    pub model: String,
    /// Robot namespace of the run
    pub namespace: String,
}

fn float_list() -> DataType {
    DataType::List(Arc::new(Field::new("item", DataType::Float64, true)))
}

/// Schema shared by every run's batch.
#[must_use]
pub fn episode_schema() -> SchemaRef {
    let mut fields = vec![Field::new(EPISODE, DataType::Int64, false)];
    for column in SequenceColumn::ALL {
        fields.push(Field::new(column.as_str(), float_list(), false));
    }
    fields.push(Field::new(TIME, float_list(), false));
    fields.push(Field::new(COLLISIONS, float_list(), false));
    fields.push(Field::new(
        PATH,
        DataType::List(Arc::new(Field::new("item", float_list(), true))),
        false,
    ));
    fields.push(Field::new(
        ACTION_TYPE,
        DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
        false,
    ));
    fields.push(Field::new(ScalarColumn::PathLength.as_str(), DataType::Float64, false));
    fields.push(Field::new(
        ScalarColumn::AngleOverLength.as_str(),
        DataType::Float64,
        false,
    ));
    fields.push(Field::new(ScalarColumn::TimeDiff.as_str(), DataType::Int64, true));
    fields.push(Field::new(
        ScalarColumn::CollisionAmount.as_str(),
        DataType::Int64,
        true,
    ));
    fields.push(Field::new(RESULT, DataType::Utf8, true));
    for group in GroupColumn::ALL {
        fields.push(Field::new(group.as_str(), DataType::Utf8, false));
    }
    Arc::new(Schema::new(fields))
}

/// Build one run's batch from parsed rows.
///
/// # Errors
///
/// Returns error if the assembled columns do not match [`episode_schema`].
pub fn rows_to_batch(rows: &[EpisodeRow]) -> Result<RecordBatch> {
    let mut columns: Vec<ArrayRef> = Vec::new();

    columns.push(Arc::new(Int64Array::from_iter_values(
        rows.iter().map(|r| r.episode),
    )));
    for column in SequenceColumn::ALL {
        columns.push(float_list_array(rows.iter().map(|r| sequence_of(r, *column))));
    }
    columns.push(float_list_array(rows.iter().map(|r| r.time.as_slice())));
    columns.push(float_list_array(rows.iter().map(|r| r.collisions.as_slice())));
    columns.push(path_array(rows));
    columns.push(action_array(rows));
    columns.push(Arc::new(Float64Array::from_iter_values(
        rows.iter().map(|r| r.path_length),
    )));
    columns.push(Arc::new(Float64Array::from_iter_values(
        rows.iter().map(|r| r.angle_over_length),
    )));
    columns.push(Arc::new(Int64Array::from_iter(rows.iter().map(|r| r.time_diff))));
    columns.push(Arc::new(Int64Array::from_iter(
        rows.iter().map(|r| r.collision_amount),
    )));
    columns.push(Arc::new(StringArray::from_iter(
        rows.iter().map(|r| r.result.map(EpisodeResult::as_str)),
    )));
    for group in GroupColumn::ALL {
        columns.push(Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| group_of(r, *group)),
        )));
    }

    Ok(RecordBatch::try_new(episode_schema(), columns)?)
}

fn sequence_of(row: &EpisodeRow, column: SequenceColumn) -> &[f64] {
    match column {
        SequenceColumn::Curvature => &row.curvature,
        SequenceColumn::NormalizedCurvature => &row.normalized_curvature,
        SequenceColumn::Roughness => &row.roughness,
        SequenceColumn::PathLengthValues => &row.path_length_values,
        SequenceColumn::Acceleration => &row.acceleration,
        SequenceColumn::Jerk => &row.jerk,
        SequenceColumn::Velocity => &row.velocity,
    }
}

fn group_of(row: &EpisodeRow, group: GroupColumn) -> &str {
    match group {
        GroupColumn::Namespace => &row.namespace,
        GroupColumn::LocalPlanner => &row.local_planner,
        GroupColumn::AgentName => &row.agent_name,
        GroupColumn::Model => &row.model,
        GroupColumn::Run => &row.run,
    }
}

fn float_list_array<'a>(values: impl Iterator<Item = &'a [f64]>) -> ArrayRef {
    let mut builder = ListBuilder::new(Float64Builder::new());
    for sequence in values {
        builder.values().append_slice(sequence);
        builder.append(true);
    }
    Arc::new(builder.finish())
}

fn path_array(rows: &[EpisodeRow]) -> ArrayRef {
    let mut builder = ListBuilder::new(ListBuilder::new(Float64Builder::new()));
    for row in rows {
        for position in &row.path {
            builder.values().values().append_slice(position);
            builder.values().append(true);
        }
        builder.append(true);
    }
    Arc::new(builder.finish())
}

fn action_array(rows: &[EpisodeRow]) -> ArrayRef {
    let mut builder = ListBuilder::new(StringBuilder::new());
    for row in rows {
        for action in &row.action_type {
            builder.values().append_value(action.as_str());
        }
        builder.append(true);
    }
    Arc::new(builder.finish())
}

/// Combined, read-only table of every loaded episode.
#[derive(Debug, Clone)]
pub struct EpisodeTable {
    batch: RecordBatch,
}

impl EpisodeTable {
    /// Wrap a batch, validating it against [`episode_schema`].
    ///
    /// # Errors
    ///
    /// Returns error on schema mismatch.
    pub fn new(batch: RecordBatch) -> Result<Self> {
        let expected = episode_schema();
        if batch.schema() != expected {
            return Err(Error::Storage(format!(
                "Schema mismatch: expected {expected:?}, got {:?}",
                batch.schema()
            )));
        }
        Ok(Self { batch })
    }

    /// Build a table directly from parsed rows.
    ///
    /// # Errors
    ///
    /// Returns error if the rows cannot be assembled into a batch.
    pub fn from_rows(rows: &[EpisodeRow]) -> Result<Self> {
        Self::new(rows_to_batch(rows)?)
    }

    /// Concatenate per-run tables into one.
    ///
    /// # Errors
    ///
    /// Returns error if no tables are given.
    pub fn concat(tables: &[Self]) -> Result<Self> {
        if tables.is_empty() {
            return Err(Error::InvalidInput("No episode tables to combine".to_string()));
        }
        let batches: Vec<RecordBatch> = tables.iter().map(|t| t.batch.clone()).collect();
        let combined = compute::concat_batches(&episode_schema(), &batches)
            .map_err(|e| Error::Storage(format!("Failed to combine batches: {e}")))?;
        Ok(Self { batch: combined })
    }

    /// Underlying Arrow batch.
    #[must_use]
    pub const fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Number of episodes.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Whether the table holds no episodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    fn column<T: Array + 'static>(&self, name: &str) -> Result<&T> {
        self.batch
            .column_by_name(name)
            .ok_or_else(|| Error::Storage(format!("Column not found: {name}")))?
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| Error::Storage(format!("Column {name} has an unexpected type")))
    }

    /// Episode indices.
    ///
    /// # Errors
    ///
    /// Returns error if the column is missing.
    pub fn episodes(&self) -> Result<Vec<i64>> {
        Ok(self.column::<Int64Array>(EPISODE)?.values().to_vec())
    }

    /// Values of a scalar column, widened to `f64`. Missing integers read as
    /// `NaN`.
    ///
    /// # Errors
    ///
    /// Returns error if the column is missing.
    #[allow(clippy::cast_precision_loss)]
    pub fn scalar(&self, column: ScalarColumn) -> Result<Vec<f64>> {
        let name = column.as_str();
        match column {
            ScalarColumn::PathLength | ScalarColumn::AngleOverLength => {
                Ok(self.column::<Float64Array>(name)?.values().to_vec())
            }
            ScalarColumn::TimeDiff | ScalarColumn::CollisionAmount => Ok(self
                .column::<Int64Array>(name)?
                .iter()
                .map(|v| v.map_or(f64::NAN, |v| v as f64))
                .collect()),
        }
    }

    /// Per-episode sequences of a sequence column.
    ///
    /// # Errors
    ///
    /// Returns error if the column is missing.
    pub fn sequence(&self, column: SequenceColumn) -> Result<Vec<Vec<f64>>> {
        self.float_lists(column.as_str())
    }

    /// Per-episode step timestamps.
    ///
    /// # Errors
    ///
    /// Returns error if the column is missing.
    pub fn times(&self) -> Result<Vec<Vec<f64>>> {
        self.float_lists(TIME)
    }

    fn float_lists(&self, name: &str) -> Result<Vec<Vec<f64>>> {
        let lists = self.column::<ListArray>(name)?;
        (0..lists.len())
            .map(|i| float_values(&lists.value(i), name))
            .collect()
    }

    /// Per-episode trajectories, one position vector per step.
    ///
    /// # Errors
    ///
    /// Returns error if the column is missing.
    pub fn paths(&self) -> Result<Vec<Vec<Vec<f64>>>> {
        let lists = self.column::<ListArray>(PATH)?;
        (0..lists.len())
            .map(|i| {
                let positions = lists.value(i);
                let positions = positions
                    .as_any()
                    .downcast_ref::<ListArray>()
                    .ok_or_else(|| Error::Storage("Path positions are not lists".to_string()))?;
                (0..positions.len())
                    .map(|j| float_values(&positions.value(j), PATH))
                    .collect()
            })
            .collect()
    }

    /// Per-episode action sequences.
    ///
    /// # Errors
    ///
    /// Returns error if the column is missing or holds an unknown action.
    pub fn action_types(&self) -> Result<Vec<Vec<ActionType>>> {
        let lists = self.column::<ListArray>(ACTION_TYPE)?;
        (0..lists.len())
            .map(|i| {
                let actions = lists.value(i);
                let actions = actions
                    .as_any()
                    .downcast_ref::<StringArray>()
                    .ok_or_else(|| Error::Storage("Action types are not strings".to_string()))?;
                actions.iter().flatten().map(str::parse).collect()
            })
            .collect()
    }

    /// Episode outcomes; `None` where the metrics file left it blank.
    ///
    /// # Errors
    ///
    /// Returns error if the column is missing or holds an unknown outcome.
    pub fn results(&self) -> Result<Vec<Option<EpisodeResult>>> {
        self.column::<StringArray>(RESULT)?
            .iter()
            .map(|value| value.map(str::parse).transpose())
            .collect()
    }

    /// Values of a grouping column.
    ///
    /// # Errors
    ///
    /// Returns error if the column is missing.
    pub fn groups(&self, group: GroupColumn) -> Result<Vec<String>> {
        Ok(self
            .column::<StringArray>(group.as_str())?
            .iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect())
    }

    /// Distinct values of a grouping column, sorted.
    ///
    /// # Errors
    ///
    /// Returns error if the column is missing.
    pub fn distinct(&self, group: GroupColumn) -> Result<Vec<String>> {
        let unique: BTreeSet<String> = self.groups(group)?.into_iter().collect();
        Ok(unique.into_iter().collect())
    }

    /// Keep the rows where `mask` is true.
    ///
    /// # Errors
    ///
    /// Returns error if the mask length differs from the row count.
    pub fn filter(&self, mask: Vec<bool>) -> Result<Self> {
        if mask.len() != self.num_rows() {
            return Err(Error::Storage(format!(
                "Filter mask has {} entries for {} rows",
                mask.len(),
                self.num_rows()
            )));
        }
        let mask = BooleanArray::from(mask);
        let batch = compute::filter_record_batch(&self.batch, &mask)
            .map_err(|e| Error::Storage(format!("Failed to apply filter: {e}")))?;
        Ok(Self { batch })
    }

    /// Rows of one episode index (across every run).
    ///
    /// # Errors
    ///
    /// Returns error if the episode column is missing.
    pub fn filter_episode(&self, episode: i64) -> Result<Self> {
        let mask = self.episodes()?.into_iter().map(|e| e == episode).collect();
        self.filter(mask)
    }

    /// Rows whose grouping column equals `value`.
    ///
    /// # Errors
    ///
    /// Returns error if the grouping column is missing.
    pub fn filter_group(&self, group: GroupColumn, value: &str) -> Result<Self> {
        let mask = self.groups(group)?.iter().map(|g| g == value).collect();
        self.filter(mask)
    }

    /// Rows whose outcome is one of `accepted`.
    ///
    /// # Errors
    ///
    /// Returns error if the result column is missing or malformed.
    pub fn filter_results(&self, accepted: &[EpisodeResult]) -> Result<Self> {
        let mask = self
            .results()?
            .into_iter()
            .map(|r| r.is_some_and(|r| accepted.contains(&r)))
            .collect();
        self.filter(mask)
    }
}

fn float_values(array: &ArrayRef, name: &str) -> Result<Vec<f64>> {
    let values = array
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| Error::Storage(format!("Column {name} does not hold floats")))?;
    Ok(values.values().to_vec())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::EpisodeRow;
    use crate::keys::{ActionType, EpisodeResult};

    pub(crate) fn row(namespace: &str, episode: i64, result: EpisodeResult) -> EpisodeRow {
        EpisodeRow {
            episode,
            curvature: vec![0.1, 0.2, 0.3],
            velocity: vec![1.0, 2.0],
            path: vec![vec![1.0, 2.0, 0.0], vec![3.0, 4.0, 0.0]],
            action_type: vec![ActionType::Move, ActionType::Stop],
            time: vec![0.0, 1e9, 2e9],
            time_diff: Some(2_000_000_000),
            collision_amount: Some(0),
            path_length: 3.5,
            result: Some(result),
            run: format!("run_{namespace}"),
            local_planner: "dwa".to_string(),
            agent_name: "agent".to_string(),
            model: "burger".to_string(),
            namespace: namespace.to_string(),
            ..EpisodeRow::default()
        }
    }
}
