//! Simulation runs
//!
//! A run is one simulator execution stored as a directory holding a
//! metrics table and a parameter document:
//!
//! ```text
//! data/
//! └── 03-12-2022_15-19-00_burger_0_0/
//!     ├── metrics.csv    one row per episode
//!     └── params.yaml    planner, agent, model, namespace, scenario_file
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use run_plotter::run::load_dataset;
//!
//! let dataset = load_dataset("data", &["run_a", "run_b"])?;
//! println!("{} episodes on {}", dataset.table().num_rows(), dataset.scenario());
//! # Ok::<(), run_plotter::Error>(())
//! ```

mod loader;
mod metrics;
mod params;
mod record;

pub use loader::{load_dataset, load_run, Dataset, METRICS_FILE, PARAMS_FILE};
pub use metrics::read_metrics;
pub use params::RunParams;
pub use record::RunRecord;
