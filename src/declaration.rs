//! Declaration documents
//!
//! A declaration lists the runs to compare and the plots to draw:
//!
//! ```yaml
//! datasets: [01-02-2023_10-00-00_dwa, 01-02-2023_11-00-00_teb]
//! show_plots: false
//! save_location: dwa_vs_teb
//! results:
//!   title: Outcomes
//!   save_name: results
//! aggregated_distribution:
//!   - data_key: velocity
//!     aggregate: mean
//!     plot_key: violin
//!     title: Mean velocity
//!     save_name: mean_velocity
//! create_best_plots:
//!   title: Fastest paths
//!   save_name: best_paths
//! ```
//!
//! Keys are closed enums and unknown fields are rejected, so a typo fails
//! while the document is read rather than halfway through plotting.

use std::path::Path;

use serde::Deserialize;

use crate::aggregate::Aggregator;
use crate::keys::{
    CategoricalKind, DistributionKind, EpisodeResult, GroupColumn, ScalarColumn, SequenceColumn,
};
use crate::plot::episode_array::{DEFAULT_EPISODE, DEFAULT_STEP_SIZE};
use crate::plot::PlotTarget;
use crate::{Error, Result};

const fn default_step_size() -> usize {
    DEFAULT_STEP_SIZE
}

const fn default_episode() -> i64 {
    DEFAULT_EPISODE
}

const fn default_true() -> bool {
    true
}

/// Implements `target()` for entries carrying `title` and `save_name`.
macro_rules! impl_target {
    ($($entry:ty),+ $(,)?) => {
        $(
            impl $entry {
                /// Title and output name of the plot.
                #[must_use]
                pub fn target(&self) -> PlotTarget {
                    PlotTarget::new(self.title.clone(), self.save_name.clone())
                }
            }
        )+
    };
}

/// Outcome count plot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResultsPlot {
    /// Caption
    pub title: String,
    /// File stem
    pub save_name: String,
    /// Grouping column
    #[serde(default)]
    pub differentiate: GroupColumn,
}

/// Sequence column over elapsed time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SingleEpisodeLine {
    /// Sequence column
    pub data_key: SequenceColumn,
    /// Caption
    pub title: String,
    /// File stem
    pub save_name: String,
    /// Subsampling stride
    #[serde(default = "default_step_size")]
    pub step_size: usize,
    /// Grouping column
    #[serde(default)]
    pub differentiate: GroupColumn,
    /// Episode to restrict to; every episode when absent
    #[serde(default)]
    pub episode: Option<i64>,
}

/// Samples of one episode's sequence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SingleEpisodeDistribution {
    /// Sequence column
    pub data_key: SequenceColumn,
    /// Caption
    pub title: String,
    /// File stem
    pub save_name: String,
    /// Episode index
    #[serde(default = "default_episode")]
    pub episode: i64,
    /// Renderer
    #[serde(default)]
    pub plot_key: DistributionKind,
    /// Grouping column
    #[serde(default)]
    pub differentiate: GroupColumn,
}

/// Per-episode aggregates of a sequence, as a distribution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregatedDistribution {
    /// Sequence column
    pub data_key: SequenceColumn,
    /// Reduction
    pub aggregate: Aggregator,
    /// Caption
    pub title: String,
    /// File stem
    pub save_name: String,
    /// Renderer
    #[serde(default)]
    pub plot_key: DistributionKind,
    /// Grouping column
    #[serde(default)]
    pub differentiate: GroupColumn,
}

/// Per-episode aggregates of a sequence over the episode index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregatedLine {
    /// Sequence column
    pub data_key: SequenceColumn,
    /// Reduction
    pub aggregate: Aggregator,
    /// Caption
    pub title: String,
    /// File stem
    pub save_name: String,
    /// Grouping column
    #[serde(default)]
    pub differentiate: GroupColumn,
}

/// Scalar column over the episode index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EpisodesCategorical {
    /// Scalar column
    pub data_key: ScalarColumn,
    /// Caption
    pub title: String,
    /// File stem
    pub save_name: String,
    /// Renderer
    #[serde(default)]
    pub plot_key: CategoricalKind,
    /// Grouping column
    #[serde(default)]
    pub differentiate: GroupColumn,
}

/// Scalar column as a distribution across episodes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EpisodesDistribution {
    /// Scalar column
    pub data_key: ScalarColumn,
    /// Caption
    pub title: String,
    /// File stem
    pub save_name: String,
    /// Renderer
    #[serde(default)]
    pub plot_key: DistributionKind,
    /// Grouping column
    #[serde(default)]
    pub differentiate: GroupColumn,
}

/// Trajectories over the map, one figure per group.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EpisodePlots {
    /// Caption (suffixed with the group)
    pub title: String,
    /// File stem (suffixed with the group)
    pub save_name: String,
    /// Outcomes to draw; every outcome when empty
    #[serde(default)]
    pub desired_results: Vec<EpisodeResult>,
    /// Episode to restrict to
    #[serde(default)]
    pub episode: Option<i64>,
    /// Grouping column
    #[serde(default)]
    pub differentiate: GroupColumn,
    /// Draw scenario obstacles
    #[serde(default = "default_true")]
    pub should_add_obstacles: bool,
}

/// Fastest successful trajectory per group on one map.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BestPlots {
    /// Caption
    pub title: String,
    /// File stem
    pub save_name: String,
    /// Grouping column
    #[serde(default)]
    pub differentiate: GroupColumn,
    /// Draw scenario obstacles
    #[serde(default = "default_true")]
    pub should_add_obstacles: bool,
}

impl_target!(
    ResultsPlot,
    SingleEpisodeLine,
    SingleEpisodeDistribution,
    AggregatedDistribution,
    AggregatedLine,
    EpisodesCategorical,
    EpisodesDistribution,
    EpisodePlots,
    BestPlots,
);

/// A parsed declaration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Declaration {
    /// Run directories to load
    #[serde(default)]
    pub datasets: Vec<String>,
    /// Show figures instead of saving them
    #[serde(default)]
    pub show_plots: bool,
    /// Subdirectory of the plots root to save into
    #[serde(default)]
    pub save_location: Option<String>,
    /// Outcome count plot
    #[serde(default)]
    pub results: Option<ResultsPlot>,
    /// Sequence-over-time line plots
    #[serde(default)]
    pub single_episode_line: Vec<SingleEpisodeLine>,
    /// Single-episode distribution plots
    #[serde(default)]
    pub single_episode_distribution: Vec<SingleEpisodeDistribution>,
    /// Aggregated distribution plots
    #[serde(default)]
    pub aggregated_distribution: Vec<AggregatedDistribution>,
    /// Aggregated line plots
    #[serde(default)]
    pub aggregated_line: Vec<AggregatedLine>,
    /// Scalar plots over the episode index
    #[serde(default)]
    pub all_episodes_categorical: Vec<EpisodesCategorical>,
    /// Scalar distribution plots
    #[serde(default)]
    pub all_episodes_distribution: Vec<EpisodesDistribution>,
    /// Per-group trajectory overlays
    #[serde(default)]
    pub episode_plots_for_namespaces: Option<EpisodePlots>,
    /// Best-path overlay
    #[serde(default)]
    pub create_best_plots: Option<BestPlots>,
}

impl Declaration {
    /// Parse a declaration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns error on malformed YAML, unknown fields or keys.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Read a declaration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read, or any parse
    /// error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read declaration {}: {e}", path.display()))
        })?;
        Self::parse(&content)
    }

    /// Whether any plot needs the scenario map.
    #[must_use]
    pub const fn needs_map(&self) -> bool {
        self.episode_plots_for_namespaces.is_some() || self.create_best_plots.is_some()
    }

    /// Number of plot entries (per-group overlays count once).
    #[must_use]
    pub fn entry_count(&self) -> usize {
        usize::from(self.results.is_some())
            + self.single_episode_line.len()
            + self.single_episode_distribution.len()
            + self.aggregated_distribution.len()
            + self.aggregated_line.len()
            + self.all_episodes_categorical.len()
            + self.all_episodes_distribution.len()
            + usize::from(self.episode_plots_for_namespaces.is_some())
            + usize::from(self.create_best_plots.is_some())
    }
}
