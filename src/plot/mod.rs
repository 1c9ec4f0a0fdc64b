//! Plot builders
//!
//! Each submodule is a set of free functions over the combined
//! [`EpisodeTable`](crate::storage::EpisodeTable) that return renderer
//! independent [`Figure`]s:
//!
//! - [`result`]: outcome counts
//! - [`episode_array`]: per-timestep sequence columns
//! - [`discrete`]: per-episode scalar columns
//! - [`path`]: trajectories over the scenario map
//!
//! [`render`] turns a figure into a PNG.

pub mod discrete;
pub mod episode_array;
pub mod figure;
pub mod path;
pub mod render;
pub mod result;
pub mod stats;

use std::collections::BTreeMap;

pub use figure::{Figure, FigureBody, PlotTarget};

use figure::{Group, Series};

/// Bucket values by their group label; labels come out sorted.
pub(crate) fn group_by<T>(
    labels: impl IntoIterator<Item = String>,
    values: impl IntoIterator<Item = T>,
) -> BTreeMap<String, Vec<T>> {
    let mut grouped: BTreeMap<String, Vec<T>> = BTreeMap::new();
    for (label, value) in labels.into_iter().zip(values) {
        grouped.entry(label).or_default().push(value);
    }
    grouped
}

/// Sort points by x and average the y values sharing an x.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean_by_x(mut points: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    points.retain(|p| p.0.is_finite() && p.1.is_finite());
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut merged: Vec<(f64, f64)> = Vec::new();
    let mut count = 0usize;
    for (x, y) in points {
        match merged.last_mut() {
            Some(last) if last.0 == x => {
                count += 1;
                last.1 += (y - last.1) / count as f64;
            }
            _ => {
                merged.push((x, y));
                count = 1;
            }
        }
    }
    merged
}

pub(crate) fn to_series(grouped: BTreeMap<String, Vec<(f64, f64)>>) -> Vec<Series> {
    grouped
        .into_iter()
        .map(|(label, points)| Series {
            label,
            points: mean_by_x(points),
        })
        .collect()
}

pub(crate) fn to_groups(grouped: BTreeMap<String, Vec<f64>>) -> Vec<Group> {
    grouped
        .into_iter()
        .map(|(label, values)| Group { label, values })
        .collect()
}
