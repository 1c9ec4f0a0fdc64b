//! Directory layout and environment configuration
//!
//! Defaults are relative to the working directory. Each directory can be
//! overridden from the environment; the binary applies CLI flags last.

use std::path::PathBuf;

use crate::{Error, Result};

/// Env var overriding [`PlotterConfig::data_dir`].
pub const DATA_DIR_ENV: &str = "RUN_PLOTTER_DATA_DIR";
/// Env var overriding [`PlotterConfig::declarations_dir`].
pub const DECLARATIONS_DIR_ENV: &str = "RUN_PLOTTER_DECLARATIONS_DIR";
/// Env var overriding [`PlotterConfig::scenarios_dir`].
pub const SCENARIOS_DIR_ENV: &str = "RUN_PLOTTER_SCENARIOS_DIR";
/// Env var overriding [`PlotterConfig::maps_dir`].
pub const MAPS_DIR_ENV: &str = "RUN_PLOTTER_MAPS_DIR";
/// Env var overriding [`PlotterConfig::plots_dir`].
pub const PLOTS_DIR_ENV: &str = "RUN_PLOTTER_PLOTS_DIR";
/// Env var that forces save mode when set to `1` or `true`.
pub const FORCE_SAVE_ENV: &str = "RUN_PLOTTER_SAVE";

/// Where inputs are read from and plots are written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotterConfig {
    /// Root of the run directories
    pub data_dir: PathBuf,
    /// Directory holding declaration documents
    pub declarations_dir: PathBuf,
    /// Directory holding scenario files
    pub scenarios_dir: PathBuf,
    /// Directory holding one subdirectory per map
    pub maps_dir: PathBuf,
    /// Root of saved plots
    pub plots_dir: PathBuf,
    /// Save even when a declaration asks to show
    pub force_save: bool,
}

impl Default for PlotterConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            declarations_dir: PathBuf::from("plot_declarations"),
            scenarios_dir: PathBuf::from("scenarios"),
            maps_dir: PathBuf::from("maps"),
            plots_dir: PathBuf::from("plots"),
            force_save: false,
        }
    }
}

impl PlotterConfig {
    /// Defaults overridden from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Defaults overridden through a variable lookup.
    #[must_use]
    pub fn from_env_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let dirs = [
            (DATA_DIR_ENV, &mut config.data_dir),
            (DECLARATIONS_DIR_ENV, &mut config.declarations_dir),
            (SCENARIOS_DIR_ENV, &mut config.scenarios_dir),
            (MAPS_DIR_ENV, &mut config.maps_dir),
            (PLOTS_DIR_ENV, &mut config.plots_dir),
        ];
        for (key, dir) in dirs {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *dir = PathBuf::from(value);
            }
        }
        config.force_save = lookup(FORCE_SAVE_ENV)
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true"));
        config
    }
}

/// Hosting workflow coordinates, needed for the completion signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Base URL of the workflow API
    pub api_base_url: String,
    /// Endpoint path that marks a task finished
    pub finish_endpoint: String,
    /// Task being completed
    pub task_id: String,
    /// Bearer token
    pub auth_token: String,
}

impl WorkflowConfig {
    /// Read the workflow variables from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first missing variable.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Read the workflow variables through a lookup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first missing variable.
    pub fn from_env_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::Config(format!("{key} is not set")))
        };
        Ok(Self {
            api_base_url: require("API_BASE_URL")?,
            finish_endpoint: require("FINISH_ENDPOINT")?,
            task_id: require("TASK_ID")?,
            auth_token: require("AUTH_TOKEN")?,
        })
    }
}
