//! Plots of per-episode scalar columns

use std::collections::BTreeSet;

use super::figure::{Figure, FigureBody, Group, PlotTarget};
use super::{group_by, mean_by_x, to_groups, to_series};
use crate::keys::{CategoricalKind, DistributionKind, GroupColumn, ScalarColumn};
use crate::storage::EpisodeTable;
use crate::Result;

/// Scalar column over the episode index, one line or bar set per group.
///
/// Bars are grouped per episode; a group without a value for an episode
/// gets no bar there. Several values for the same group and episode (one
/// per run) are averaged.
///
/// # Errors
///
/// Returns error if a column is missing.
#[allow(clippy::cast_precision_loss)]
pub fn catplot_over_episodes(
    table: &EpisodeTable,
    column: ScalarColumn,
    kind: CategoricalKind,
    differentiate: GroupColumn,
    target: PlotTarget,
) -> Result<Figure> {
    let episodes = table.episodes()?;
    let points: Vec<(f64, f64)> = episodes
        .iter()
        .map(|&e| e as f64)
        .zip(table.scalar(column)?)
        .collect();
    let grouped = group_by(table.groups(differentiate)?, points);

    let body = match kind {
        CategoricalKind::Line => FigureBody::Line(to_series(grouped)),
        CategoricalKind::Bar => {
            let index: Vec<i64> = episodes.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
            let groups = grouped
                .into_iter()
                .map(|(label, points)| {
                    let means = mean_by_x(points);
                    let values = index
                        .iter()
                        .map(|&e| {
                            means
                                .iter()
                                .find(|p| p.0 == e as f64)
                                .map_or(f64::NAN, |p| p.1)
                        })
                        .collect();
                    Group { label, values }
                })
                .collect();
            FigureBody::Bars {
                categories: index.iter().map(ToString::to_string).collect(),
                groups,
            }
        }
    };

    Ok(Figure::new(target, "episode", column.as_str(), body))
}

/// Distribution of a scalar column across episodes, per group.
///
/// # Errors
///
/// Returns error if a column is missing.
pub fn distplot_over_episodes(
    table: &EpisodeTable,
    column: ScalarColumn,
    kind: DistributionKind,
    differentiate: GroupColumn,
    target: PlotTarget,
) -> Result<Figure> {
    let grouped = group_by(table.groups(differentiate)?, table.scalar(column)?);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::EpisodeResult;
    use crate::storage::fixtures::row;

    fn table() -> EpisodeTable {
        let mut a0 = row("robot_a", 0, EpisodeResult::GoalReached);
        a0.path_length = 2.0;
        let mut a1 = row("robot_a", 1, EpisodeResult::GoalReached);
        a1.path_length = 4.0;
        let mut b1 = row("robot_b", 1, EpisodeResult::Collision);
        b1.path_length = 6.0;
        EpisodeTable::from_rows(&[a0, a1, b1]).unwrap()
    }

    #[test]
    fn test_catplot_line() {
        let figure = catplot_over_episodes(
            &table(),
            ScalarColumn::PathLength,
            CategoricalKind::Line,
            GroupColumn::Namespace,
            PlotTarget::new("Path length", "path_length"),
        )
        .unwrap();
        let FigureBody::Line(series) = figure.body else {
            panic!("expected lines");
        };
        assert_eq!(series[0].points, vec![(0.0, 2.0), (1.0, 4.0)]);
        assert_eq!(series[1].points, vec![(1.0, 6.0)]);
    }

    #[test]
    fn test_catplot_bar_marks_missing_episodes() {
        let figure = catplot_over_episodes(
            &table(),
            ScalarColumn::PathLength,
            CategoricalKind::Bar,
            GroupColumn::Namespace,
            PlotTarget::new("Path length", "path_length"),
        )
        .unwrap();
        let FigureBody::Bars { categories, groups } = figure.body else {
            panic!("expected bars");
        };
        assert_eq!(categories, vec!["0", "1"]);
        assert_eq!(groups[0].values, vec![2.0, 4.0]);
        assert!(groups[1].values[0].is_nan());
        assert_eq!(groups[1].values[1], 6.0);
    }

    #[test]
    fn test_distplot_over_episodes() {
        let figure = distplot_over_episodes(
            &table(),
            ScalarColumn::TimeDiff,
            DistributionKind::Strip,
            GroupColumn::Run,
            PlotTarget::new("Time", "time"),
        )
        .unwrap();
        assert_eq!(figure.x_label, "run");
        let FigureBody::Distribution { groups, .. } = figure.body else {
            panic!("expected distribution");
        };
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "run_robot_a");
        assert_eq!(groups[0].values, vec![2e9, 2e9]);
    }
}
