//! Outcome counts

use tracing::debug;

use super::figure::{Figure, FigureBody, Group, PlotTarget};
use crate::keys::{EpisodeResult, GroupColumn};
use crate::storage::EpisodeTable;
use crate::Result;

/// Count episodes per outcome, one bar per group in each outcome category.
///
/// Categories are always `TIMEOUT`, `GOAL_REACHED`, `COLLISION` in that
/// order, including those with a zero count. Rows without an outcome are
/// not counted.
///
/// # Errors
///
/// Returns error if the table lacks the result or grouping column.
#[allow(clippy::cast_precision_loss)]
pub fn countplot_for_result(
    table: &EpisodeTable,
    differentiate: GroupColumn,
    target: PlotTarget,
) -> Result<Figure> {
    let results = table.results()?;
    let grouped = super::group_by(table.groups(differentiate)?, results);

    let categories: Vec<String> = EpisodeResult::ALL.iter().map(ToString::to_string).collect();
    let groups: Vec<Group> = grouped
        .into_iter()
        .map(|(label, results)| {
            let values = EpisodeResult::ALL
                .iter()
                .map(|outcome| results.iter().filter(|r| **r == Some(*outcome)).count() as f64)
                .collect();
            Group { label, values }
        })
        .collect();
    debug!(groups = groups.len(), "Counted outcomes");

    Ok(Figure::new(
        target,
        "result",
        "count",
        FigureBody::Bars { categories, groups },
    ))
}
