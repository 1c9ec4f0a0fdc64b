//! Trajectories over the scenario map
//!
//! The visualizer loads the scenario and its map once, then overlays stored
//! trajectories in pixel space (see [`Calibration`](crate::map::Calibration)
//! for the transform). The last [`TRAILING_SAMPLES_DROPPED`] samples of
//! every trajectory are not drawn: they are recorded after the episode has
//! already been decided and jump back to the next start pose.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use super::figure::{CircleMarker, Figure, FigureBody, MapOverlay, PlotTarget, Series};
use crate::keys::{EpisodeResult, GroupColumn, ScalarColumn};
use crate::map::Map;
use crate::scenario::Scenario;
use crate::storage::EpisodeTable;
use crate::Result;

/// Samples removed from the end of every drawn trajectory.
pub const TRAILING_SAMPLES_DROPPED: usize = 10;

fn trimmed(path: &[Vec<f64>]) -> &[Vec<f64>] {
    &path[..path.len().saturating_sub(TRAILING_SAMPLES_DROPPED)]
}

/// Draws trajectories over one scenario's map.
#[derive(Debug, Clone)]
pub struct PathVisualizer {
    scenario: Scenario,
    map: Arc<Map>,
}

impl PathVisualizer {
    /// Create a visualizer from a parsed scenario and its map.
    #[must_use]
    pub fn new(scenario: Scenario, map: Map) -> Self {
        Self {
            scenario,
            map: Arc::new(map),
        }
    }

    /// Load `<scenarios_dir>/<scenario_file>` and the map it names from
    /// `maps_dir`.
    ///
    /// # Errors
    ///
    /// Returns error if the scenario, map descriptor or raster cannot be
    /// read.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        scenarios_dir: P,
        maps_dir: Q,
        scenario_file: &str,
    ) -> Result<Self> {
        let scenario = Scenario::load(scenarios_dir.as_ref().join(scenario_file))?;
        let map = Map::load(maps_dir, &scenario.map)?;
        debug!(scenario = scenario_file, map = %scenario.map, "Loaded path visualizer");
        Ok(Self::new(scenario, map))
    }

    /// Get the scenario.
    #[must_use]
    pub const fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Get the map.
    #[must_use]
    pub fn map(&self) -> &Map {
        &self.map
    }

    fn overlay(&self, paths: Vec<Series>, with_obstacles: bool) -> MapOverlay {
        let calibration = self.map.calibration();
        let obstacles = &self.scenario.obstacles;

        let (static_obstacles, dynamic_obstacles) = if with_obstacles {
            let markers = obstacles
                .static_obstacles
                .iter()
                .filter_map(|o| {
                    calibration.to_pixel(&o.pos).map(|center| CircleMarker {
                        center,
                        radius: calibration.meters_to_pixels(o.radius),
                    })
                })
                .collect();
            let loops = obstacles
                .dynamic_obstacles
                .iter()
                .map(|o| calibration.path_to_pixels(&o.closed_loop()))
                .collect();
            (markers, loops)
        } else {
            (Vec::new(), Vec::new())
        };

        MapOverlay {
            map: Arc::clone(&self.map),
            paths,
            static_obstacles,
            dynamic_obstacles,
            start: calibration.to_pixel(&self.scenario.robot.start),
            goal: calibration.to_pixel(&self.scenario.robot.goal),
        }
    }

    /// One figure per distinct value of `differentiate`, each showing that
    /// group's trajectories.
    ///
    /// Episodes whose result is not in `desired_results` are skipped; an
    /// empty list accepts every result. With `episode` set only that
    /// episode index is drawn.
    ///
    /// # Errors
    ///
    /// Returns error if a column is missing.
    pub fn episode_plots_for_groups(
        &self,
        table: &EpisodeTable,
        differentiate: GroupColumn,
        desired_results: &[EpisodeResult],
        episode: Option<i64>,
        with_obstacles: bool,
        target: &PlotTarget,
    ) -> Result<Vec<Figure>> {
        let calibration = self.map.calibration();
        let mut figures = Vec::new();

        for group in table.distinct(differentiate)? {
            let subset = table.filter_group(differentiate, &group)?;
            let episodes = subset.episodes()?;
            let results = subset.results()?;
            let paths = subset.paths()?;

            let mut series = Vec::new();
            for ((index, result), path) in episodes.into_iter().zip(results).zip(&paths) {
                if episode.is_some_and(|e| e != index) {
                    continue;
                }
                let accepted = desired_results.is_empty()
                    || result.is_some_and(|r| desired_results.contains(&r));
                if !accepted {
                    continue;
                }
                series.push(Series {
                    label: format!("Episode: {index}"),
                    points: calibration.path_to_pixels(trimmed(path)),
                });
            }

            debug!(group = %group, paths = series.len(), "Built episode overlay");
            figures.push(Figure::new(
                target.for_group(&group),
                "x [px]",
                "y [px]",
                FigureBody::Map(self.overlay(series, with_obstacles)),
            ));
        }
        Ok(figures)
    }

    /// One figure with the fastest successful trajectory of every group.
    ///
    /// Only `GOAL_REACHED` episodes are considered; per group the one with
    /// the smallest known `time_diff` is drawn (the first on ties). Groups without
    /// a successful episode are left out.
    ///
    /// # Errors
    ///
    /// Returns error if a column is missing.
    pub fn best_plots(
        &self,
        table: &EpisodeTable,
        differentiate: GroupColumn,
        with_obstacles: bool,
        target: PlotTarget,
    ) -> Result<Figure> {
        let calibration = self.map.calibration();
        let reached = table.filter_results(&[EpisodeResult::GoalReached])?;
        if reached.is_empty() {
            warn!("No episode reached its goal, best-path plot is empty");
        }

        let labels = reached.groups(differentiate)?;
        let times = reached.scalar(ScalarColumn::TimeDiff)?;
        let paths = reached.paths()?;

        let mut series = Vec::new();
        for group in reached.distinct(differentiate)? {
            let best = labels
                .iter()
                .zip(&times)
                .enumerate()
                .filter(|(_, (label, time))| **label == group && time.is_finite())
                .min_by(|a, b| a.1 .1.total_cmp(b.1 .1))
                .map(|(row, _)| row);
            if let Some(row) = best {
                series.push(Series {
                    label: group,
                    points: calibration.path_to_pixels(trimmed(&paths[row])),
                });
            }
        }

        Ok(Figure::new(
            target,
            "x [px]",
            "y [px]",
            FigureBody::Map(self.overlay(series, with_obstacles)),
        ))
    }
}
