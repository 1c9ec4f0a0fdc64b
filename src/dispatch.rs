//! Declaration dispatcher
//!
//! Walks a [`Declaration`] in a fixed order and hands every figure to a
//! [`FigureSink`]:
//!
//! 1. outcome counts
//! 2. single-episode line plots
//! 3. single-episode distribution plots
//! 4. aggregated distribution plots
//! 5. aggregated line plots
//! 6. scalar plots over the episode index
//! 7. scalar distribution plots
//! 8. per-group trajectory overlays
//! 9. best-path overlay
//!
//! The first failing entry aborts the walk.

use tracing::info;

use crate::config::PlotterConfig;
use crate::declaration::Declaration;
use crate::output::FigureSink;
use crate::plot::path::PathVisualizer;
use crate::plot::{discrete, episode_array, result, Figure};
use crate::run::load_dataset;
use crate::storage::EpisodeTable;
use crate::{Error, Result};

/// Produce every figure of `declaration` from an already loaded table.
///
/// `visualizer` is only consulted by the trajectory overlays. Returns the
/// number of figures emitted.
///
/// # Errors
///
/// Returns the first plotting or sink error, or [`Error::Config`] before
/// anything is emitted if an overlay is declared without a visualizer.
pub fn dispatch<S: FigureSink + ?Sized>(
    declaration: &Declaration,
    table: &EpisodeTable,
    visualizer: Option<&PathVisualizer>,
    sink: &mut S,
) -> Result<usize> {
    if declaration.needs_map() && visualizer.is_none() {
        return Err(Error::Config(
            "Path overlays are declared but no map was loaded".to_string(),
        ));
    }

    let mut emitted = 0;
    let mut emit = |figure: Figure| -> Result<()> {
        sink.emit(figure)?;
        emitted += 1;
        Ok(())
    };

    if let Some(entry) = &declaration.results {
        emit(result::countplot_for_result(table, entry.differentiate, entry.target())?)?;
    }

    for entry in &declaration.single_episode_line {
        emit(
            episode_array::lineplot_for_single_episode(
                table,
                entry.data_key,
                entry.step_size,
                entry.differentiate,
                entry.episode,
                entry.target(),
            )?,
        )?;
    }

    for entry in &declaration.single_episode_distribution {
        emit(
            episode_array::distplot_for_single_episode(
                table,
                entry.data_key,
                entry.episode,
                entry.plot_key,
                entry.differentiate,
                entry.target(),
            )?,
        )?;
    }

    for entry in &declaration.aggregated_distribution {
        emit(
            episode_array::distplot_for_aggregated(
                table,
                entry.data_key,
                entry.aggregate,
                entry.plot_key,
                entry.differentiate,
                entry.target(),
            )?,
        )?;
    }

    for entry in &declaration.aggregated_line {
        emit(
            episode_array::lineplot_for_aggregated(
                table,
                entry.data_key,
                entry.aggregate,
                entry.differentiate,
                entry.target(),
            )?,
        )?;
    }

    for entry in &declaration.all_episodes_categorical {
        emit(
            discrete::catplot_over_episodes(
                table,
                entry.data_key,
                entry.plot_key,
                entry.differentiate,
                entry.target(),
            )?,
        )?;
    }

    for entry in &declaration.all_episodes_distribution {
        emit(
            discrete::distplot_over_episodes(
                table,
                entry.data_key,
                entry.plot_key,
                entry.differentiate,
                entry.target(),
            )?,
        )?;
    }

    if let (Some(entry), Some(visualizer)) = (&declaration.episode_plots_for_namespaces, visualizer) {
        for figure in visualizer.episode_plots_for_groups(
            table,
            entry.differentiate,
            &entry.desired_results,
            entry.episode,
            entry.should_add_obstacles,
            &entry.target(),
        )? {
            emit(figure)?;
        }
    }

    if let (Some(entry), Some(visualizer)) = (&declaration.create_best_plots, visualizer) {
        emit(
            visualizer.best_plots(
                table,
                entry.differentiate,
                entry.should_add_obstacles,
                entry.target(),
            )?,
        )?;
    }

    info!(figures = emitted, "Declaration processed");
    Ok(emitted)
}

/// Load the declared runs (and the scenario map when an overlay needs it),
/// then [`dispatch`].
///
/// # Errors
///
/// Returns any loading, plotting or sink error.
pub fn run_declaration<S: FigureSink + ?Sized>(
    declaration: &Declaration,
    config: &PlotterConfig,
    sink: &mut S,
) -> Result<usize> {
    let dataset = load_dataset(&config.data_dir, &declaration.datasets)?;

    let visualizer = if declaration.needs_map() {
        Some(PathVisualizer::load(
            &config.scenarios_dir,
            &config.maps_dir,
            dataset.scenario(),
        )?)
    } else {
        None
    };

    dispatch(declaration, dataset.table(), visualizer.as_ref(), sink)
}
