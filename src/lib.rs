//! # run-plotter: Columnar Analysis of Navigation Benchmark Runs
//!
//! run-plotter loads the per-episode metrics that a robot-navigation
//! simulator writes for every run, combines runs on the same scenario into
//! one Arrow table, and renders comparison plots declared in a YAML file.
//!
//! ## Pipeline
//!
//! - **Load**: `metrics.csv` + `params.yaml` per run directory, sequence
//!   columns parsed from text, rows tagged with planner, agent, model,
//!   namespace and run ([`run`])
//! - **Query**: filter and group the combined [`storage::EpisodeTable`],
//!   reduce sequences with SIMD [`aggregate::Aggregator`]s
//! - **Plot**: build renderer independent [`plot::Figure`]s ([`plot`])
//! - **Output**: render PNGs or keep figures in memory ([`output`])
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use run_plotter::config::PlotterConfig;
//! use run_plotter::declaration::Declaration;
//! use run_plotter::dispatch::run_declaration;
//! use run_plotter::output::MemorySink;
//!
//! let declaration = Declaration::load("plot_declarations/compare.yaml")?;
//! let mut sink = MemorySink::new();
//! let count = run_declaration(&declaration, &PlotterConfig::default(), &mut sink)?;
//! println!("{count} figures");
//! # Ok::<(), run_plotter::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod aggregate;
pub mod config;
pub mod declaration;
pub mod dispatch;
pub mod error;
pub mod keys;
pub mod map;
pub mod notify;
pub mod output;
pub mod parse;
pub mod plot;
pub mod run;
pub mod scenario;
pub mod storage;

pub use error::{Error, Result};
