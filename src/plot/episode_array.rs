//! Plots of per-timestep sequence columns
//!
//! A sequence column holds one array per episode. These functions either
//! expand the arrays of one episode into individual samples, or reduce each
//! array to a scalar with an [`Aggregator`] and plot one value per episode.

use tracing::debug;

use super::figure::{Figure, FigureBody, PlotTarget};
use super::{group_by, to_groups, to_series};
use crate::aggregate::Aggregator;
use crate::keys::{DistributionKind, GroupColumn, SequenceColumn};
use crate::storage::EpisodeTable;
use crate::{Error, Result};

/// Default subsampling stride of single-episode line plots.
pub const DEFAULT_STEP_SIZE: usize = 5;

/// Default episode of single-episode distribution plots.
pub const DEFAULT_EPISODE: i64 = 0;

/// Nanoseconds per second.
const NANOS: f64 = 1e9;

/// Align an episode's timestamps with one of its value sequences.
///
/// Timestamps are shifted to start at zero and converted to whole seconds
/// (truncating). Both sequences are cut to the value sequence's length and
/// then subsampled every `step` samples. Returns `(seconds, values)` pairs.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `step` is zero.
///
/// # Example
///
/// ```rust
/// use run_plotter::plot::episode_array::resize_time;
///
/// let time = [5e9, 6e9, 7.5e9, 9e9];
/// let values = [0.1, 0.2, 0.3];
/// let samples = resize_time(&time, &values, 2).unwrap();
/// assert_eq!(samples, vec![(0.0, 0.1), (2.0, 0.3)]);
/// ```
pub fn resize_time(time: &[f64], values: &[f64], step: usize) -> Result<Vec<(f64, f64)>> {
    if step == 0 {
        return Err(Error::InvalidInput("Step size must be at least 1".to_string()));
    }
    let Some(&t0) = time.first() else {
        return Ok(Vec::new());
    };
    Ok(time
        .iter()
        .zip(values)
        .step_by(step)
        .map(|(&t, &v)| (((t - t0) / NANOS).trunc(), v))
        .collect())
}

/// Line plot of one sequence column over elapsed seconds, one line per group.
///
/// With `episode` set only that episode index contributes, otherwise every
/// episode does. Samples of one group sharing a second are averaged.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `step_size` is zero, or a storage error
/// if a column is missing.
pub fn lineplot_for_single_episode(
    table: &EpisodeTable,
    column: SequenceColumn,
    step_size: usize,
    differentiate: GroupColumn,
    episode: Option<i64>,
    target: PlotTarget,
) -> Result<Figure> {
    if step_size == 0 {
        return Err(Error::InvalidInput("Step size must be at least 1".to_string()));
    }
    let subset = match episode {
        Some(episode) => table.filter_episode(episode)?,
        None => table.clone(),
    };

    let values = subset.sequence(column)?;
    let samples = subset
        .times()?
        .iter()
        .zip(&values)
        .map(|(time, values)| resize_time(time, values, step_size))
        .collect::<Result<Vec<_>>>()?;

    let grouped = group_by(subset.groups(differentiate)?, samples);
    let grouped = grouped
        .into_iter()
        .map(|(label, rows)| (label, rows.into_iter().flatten().collect()))
        .collect();
    let series = to_series(grouped);
    debug!(column = %column, lines = series.len(), "Built single-episode line plot");

    Ok(Figure::new(target, "time [s]", column.as_str(), FigureBody::Line(series)))
}

/// Distribution of one episode's samples of a sequence column, per group.
///
/// # Errors
///
/// Returns error if a column is missing.
pub fn distplot_for_single_episode(
    table: &EpisodeTable,
    column: SequenceColumn,
    episode: i64,
    kind: DistributionKind,
    differentiate: GroupColumn,
    target: PlotTarget,
) -> Result<Figure> {
    let subset = table.filter_episode(episode)?;
    let grouped = group_by(subset.groups(differentiate)?, subset.sequence(column)?);
    let grouped = grouped
        .into_iter()
        .map(|(label, rows)| (label, rows.concat()))
        .collect();

    Ok(Figure::new(
        target,
        differentiate.as_str(),
        column.as_str(),
        FigureBody::Distribution {
            kind,
            groups: to_groups(grouped),
        },
    ))
}

/// Reduce every episode's sequence to one value, keeping the row's group
/// label and episode index. Empty sequences are dropped.
fn aggregated_rows(
    table: &EpisodeTable,
    column: SequenceColumn,
    aggregate: Aggregator,
    differentiate: GroupColumn,
) -> Result<Vec<(String, i64, f64)>> {
    let labels = table.groups(differentiate)?;
    let episodes = table.episodes()?;
    let sequences = table.sequence(column)?;

    let rows: Vec<_> = labels
        .into_iter()
        .zip(episodes)
        .zip(&sequences)
        .filter_map(|((label, episode), sequence)| {
            aggregate.apply(sequence).map(|value| (label, episode, value))
        })
        .collect();
    debug!(
        column = %column,
        aggregate = %aggregate,
        kept = rows.len(),
        skipped = sequences.len() - rows.len(),
        "Aggregated sequences"
    );
    Ok(rows)
}

fn aggregated_label(column: SequenceColumn, aggregate: Aggregator) -> String {
    format!("{aggregate}({column})")
}

/// Distribution of per-episode aggregates of a sequence column, per group.
///
/// # Errors
///
/// Returns error if a column is missing.
pub fn distplot_for_aggregated(
    table: &EpisodeTable,
    column: SequenceColumn,
    aggregate: Aggregator,
    kind: DistributionKind,
    differentiate: GroupColumn,
    target: PlotTarget,
) -> Result<Figure> {
    let rows = aggregated_rows(table, column, aggregate, differentiate)?;
    let (labels, values): (Vec<String>, Vec<f64>) =
        rows.into_iter().map(|(label, _, value)| (label, value)).unzip();

    Ok(Figure::new(
        target,
        differentiate.as_str(),
        aggregated_label(column, aggregate),
        FigureBody::Distribution {
            kind,
            groups: to_groups(group_by(labels, values)),
        },
    ))
}

/// Per-episode aggregates of a sequence column over the episode index, one
/// line per group.
///
/// # Errors
///
/// Returns error if a column is missing.
#[allow(clippy::cast_precision_loss)]
pub fn lineplot_for_aggregated(
    table: &EpisodeTable,
    column: SequenceColumn,
    aggregate: Aggregator,
    differentiate: GroupColumn,
    target: PlotTarget,
) -> Result<Figure> {
    let rows = aggregated_rows(table, column, aggregate, differentiate)?;
    let (labels, points): (Vec<String>, Vec<(f64, f64)>) = rows
        .into_iter()
        .map(|(label, episode, value)| (label, (episode as f64, value)))
        .unzip();

    Ok(Figure::new(
        target,
        "episode",
        aggregated_label(column, aggregate),
        FigureBody::Line(to_series(group_by(labels, points))),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::EpisodeResult;
    use crate::storage::fixtures::row;
    use crate::storage::EpisodeRow;

    fn table() -> EpisodeTable {
        let mut empty = row("robot_b", 1, EpisodeResult::Timeout);
        empty.velocity.clear();
        let rows: Vec<EpisodeRow> = vec![
            row("robot_a", 0, EpisodeResult::GoalReached),
            row("robot_a", 1, EpisodeResult::GoalReached),
            row("robot_b", 0, EpisodeResult::Collision),
            empty,
        ];
        EpisodeTable::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_resize_time_truncates_to_values_and_strides() {
        let time: Vec<f64> = (0..10).map(|i| 100.0 + f64::from(i) * 0.5e9).collect();
        let values: Vec<f64> = (0..6).map(f64::from).collect();
        let samples = resize_time(&time, &values, 2).unwrap();
        assert_eq!(samples, vec![(0.0, 0.0), (1.0, 2.0), (2.0, 4.0)]);
    }

    #[test]
    fn test_resize_time_whole_seconds() {
        let t0 = 1_670_000_000e9;
        let time = [t0, t0 + 1e9, t0 + 2e9, t0 + 3e9];
        let seconds: Vec<f64> = resize_time(&time, &[7.0, 8.0, 9.0], 1)
            .unwrap()
            .into_iter()
            .map(|(t, _)| t)
            .collect();
        assert_eq!(seconds, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_resize_time_rejects_zero_step() {
        assert!(matches!(resize_time(&[0.0], &[1.0], 0), Err(Error::InvalidInput(_))));
        assert!(resize_time(&[], &[1.0], 1).unwrap().is_empty());
    }

    #[test]
    fn test_single_episode_lineplot_groups_and_averages() {
        let figure = lineplot_for_single_episode(
            &table(),
            SequenceColumn::Curvature,
            1,
            GroupColumn::Namespace,
            None,
            PlotTarget::new("Curvature", "curvature"),
        )
        .unwrap();
        let FigureBody::Line(series) = figure.body else {
            panic!("expected lines");
        };
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "robot_a");
        assert_eq!(series[0].points, vec![(0.0, 0.1), (1.0, 0.2), (2.0, 0.3)]);
    }

    #[test]
    fn test_single_episode_lineplot_rejects_zero_step() {
        let err = lineplot_for_single_episode(
            &table(),
            SequenceColumn::Velocity,
            0,
            GroupColumn::Namespace,
            Some(0),
            PlotTarget::new("Velocity", "velocity"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_single_episode_distribution_restricts_episode() {
        let figure = distplot_for_single_episode(
            &table(),
            SequenceColumn::Velocity,
            1,
            DistributionKind::Box,
            GroupColumn::Namespace,
            PlotTarget::new("Velocity", "velocity"),
        )
        .unwrap();
        let FigureBody::Distribution { kind, groups } = figure.body else {
            panic!("expected distribution");
        };
        assert_eq!(kind, DistributionKind::Box);
        assert_eq!(groups[0].values, vec![1.0, 2.0]);
        assert!(groups[1].values.is_empty());
    }

    #[test]
    fn test_aggregated_distribution_skips_empty_sequences() {
        let figure = distplot_for_aggregated(
            &table(),
            SequenceColumn::Velocity,
            Aggregator::Max,
            DistributionKind::Violin,
            GroupColumn::Namespace,
            PlotTarget::new("Max velocity", "max_velocity"),
        )
        .unwrap();
        assert_eq!(figure.y_label, "max(velocity)");
        let FigureBody::Distribution { groups, .. } = figure.body else {
            panic!("expected distribution");
        };
        assert_eq!(groups[0].values, vec![2.0, 2.0]);
        assert_eq!(groups[1].values, vec![2.0]);
    }

    #[test]
    fn test_aggregated_lineplot_uses_episode_axis() {
        let figure = lineplot_for_aggregated(
            &table(),
            SequenceColumn::Velocity,
            Aggregator::Mean,
            GroupColumn::Namespace,
            PlotTarget::new("Mean velocity", "mean_velocity"),
        )
        .unwrap();
        let FigureBody::Line(series) = figure.body else {
            panic!("expected lines");
        };
        assert_eq!(series[0].points, vec![(0.0, 1.5), (1.0, 1.5)]);
        assert_eq!(series[1].points, vec![(0.0, 1.5)]);
    }
}
