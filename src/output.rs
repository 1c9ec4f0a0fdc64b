//! Figure sinks
//!
//! Whether a figure is displayed or persisted is decided once per
//! invocation and carried as an [`OutputSettings`] value. Plot functions never
//! consult process state; they hand finished [`Figure`]s to a [`FigureSink`].

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::plot::figure::Figure;
use crate::plot::render::render_to_file;
use crate::Result;

/// Subdirectory of the system temp dir used in show mode.
pub const SHOW_DIR: &str = "run-plotter";

/// Format of the default save subdirectory (`DD-MM-YYYY_HH-MM-SS`).
pub const SAVE_DIR_FORMAT: &str = "%d-%m-%Y_%H-%M-%S";

/// Where rendered figures go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Render to a scratch file and report its path
    Show,
    /// Write `<dir>/<save_name>.png`
    Save(PathBuf),
}

/// Output mode resolved from a declaration and the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    mode: OutputMode,
}

impl OutputSettings {
    /// Wrap an explicit mode.
    #[must_use]
    pub const fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    /// Resolve the mode from declaration flags.
    ///
    /// Saving happens when `show_plots` is false or `force_save` is set.
    /// The destination is `<plots_dir>/<save_location>`, or a subdirectory
    /// named after the current local time when no location is given.
    #[must_use]
    pub fn resolve(
        show_plots: bool,
        save_location: Option<&str>,
        plots_dir: &Path,
        force_save: bool,
    ) -> Self {
        if show_plots && !force_save {
            return Self::new(OutputMode::Show);
        }
        let folder = save_location.map_or_else(
            || chrono::Local::now().format(SAVE_DIR_FORMAT).to_string(),
            ToString::to_string,
        );
        Self::new(OutputMode::Save(plots_dir.join(folder)))
    }

    /// Get the mode.
    #[must_use]
    pub const fn mode(&self) -> &OutputMode {
        &self.mode
    }

    /// Create the destination directory in save mode.
    ///
    /// Failure is logged and otherwise ignored: the first figure written
    /// will report the underlying problem.
    pub fn prepare(&self) {
        if let OutputMode::Save(dir) = &self.mode {
            if let Err(e) = std::fs::create_dir_all(dir) {
                error!(dir = %dir.display(), error = %e, "Failed to create plot directory");
            }
        }
    }

    /// File a figure with the given stem is written to.
    #[must_use]
    pub fn file_for(&self, save_name: &str) -> PathBuf {
        let file = format!("{save_name}.png");
        match &self.mode {
            OutputMode::Show => std::env::temp_dir().join(SHOW_DIR).join(file),
            OutputMode::Save(dir) => dir.join(file),
        }
    }
}

/// Consumer of finished figures.
pub trait FigureSink {
    /// Take one figure.
    ///
    /// # Errors
    ///
    /// Returns error if the figure cannot be rendered or stored.
    fn emit(&mut self, figure: Figure) -> Result<()>;
}

/// Sink that renders PNG files according to [`OutputSettings`].
#[derive(Debug, Clone)]
pub struct OutputSink {
    settings: OutputSettings,
    written: Vec<PathBuf>,
}

impl OutputSink {
    /// Create a sink.
    #[must_use]
    pub const fn new(settings: OutputSettings) -> Self {
        Self {
            settings,
            written: Vec::new(),
        }
    }

    /// Files rendered so far.
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FigureSink for OutputSink {
    fn emit(&mut self, figure: Figure) -> Result<()> {
        let path = self.settings.file_for(figure.save_name());
        if let (OutputMode::Show, Some(parent)) = (self.settings.mode(), path.parent()) {
            std::fs::create_dir_all(parent)?;
        }
        render_to_file(&figure, &path)?;
        match self.settings.mode() {
            OutputMode::Show => info!(title = figure.title(), path = %path.display(), "Figure ready"),
            OutputMode::Save(_) => info!(title = figure.title(), path = %path.display(), "Figure saved"),
        }
        self.written.push(path);
        Ok(())
    }
}

/// Sink that keeps figures in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    figures: Vec<Figure>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Figures received, in order.
    #[must_use]
    pub fn figures(&self) -> &[Figure] {
        &self.figures
    }

    /// Take the received figures.
    #[must_use]
    pub fn into_figures(self) -> Vec<Figure> {
        self.figures
    }
}

impl FigureSink for MemorySink {
    fn emit(&mut self, figure: Figure) -> Result<()> {
        self.figures.push(figure);
        Ok(())
    }
}
