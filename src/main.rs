//! `run-plotter` command line
//!
//! ```text
//! run-plotter dwa_vs_teb.yaml --data-dir /srv/runs -v
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use run_plotter::config::{PlotterConfig, WorkflowConfig};
use run_plotter::declaration::Declaration;
use run_plotter::dispatch::run_declaration;
use run_plotter::notify::notify_completion;
use run_plotter::output::{OutputMode, OutputSettings, OutputSink};

#[derive(Debug, Parser)]
#[command(name = "run-plotter", version, about = "Plot navigation benchmark runs from a declaration file")]
struct Args {
    /// Declaration file, relative to the declarations directory
    declaration: PathBuf,

    /// Signal the hosting workflow once every plot is written
    #[arg(long)]
    workflow: bool,

    /// Root of the run directories
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory holding declaration files
    #[arg(long)]
    declarations_dir: Option<PathBuf>,

    /// Directory holding scenario files
    #[arg(long)]
    scenarios_dir: Option<PathBuf>,

    /// Directory holding map directories
    #[arg(long)]
    maps_dir: Option<PathBuf>,

    /// Root of saved plots
    #[arg(long)]
    plots_dir: Option<PathBuf>,

    /// Save plots even if the declaration asks to show them
    #[arg(long)]
    save: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> PlotterConfig {
        let mut config = PlotterConfig::from_env();
        let overrides = [
            (&self.data_dir, &mut config.data_dir),
            (&self.declarations_dir, &mut config.declarations_dir),
            (&self.scenarios_dir, &mut config.scenarios_dir),
            (&self.maps_dir, &mut config.maps_dir),
            (&self.plots_dir, &mut config.plots_dir),
        ];
        for (flag, dir) in overrides {
            if let Some(value) = flag {
                dir.clone_from(value);
            }
        }
        config.force_save |= self.save;
        config
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = args.config();
    let path = config.declarations_dir.join(&args.declaration);
    let declaration = Declaration::load(&path)
        .with_context(|| format!("Failed to load declaration {}", path.display()))?;
    if declaration.entry_count() == 0 {
        warn!(declaration = %path.display(), "Declaration requests no plots");
    }

    // Read before plotting so a misconfigured workflow fails fast
    let workflow = if args.workflow {
        Some(WorkflowConfig::from_env().context("Workflow mode needs the task environment")?)
    } else {
        None
    };

    let settings = OutputSettings::resolve(
        declaration.show_plots,
        declaration.save_location.as_deref(),
        &config.plots_dir,
        config.force_save,
    );
    settings.prepare();
    if let OutputMode::Save(dir) = settings.mode() {
        info!(dir = %dir.display(), "Saving plots");
    }

    let mut sink = OutputSink::new(settings);
    let count = run_declaration(&declaration, &config, &mut sink)
        .with_context(|| format!("Plotting {} failed", path.display()))?;
    info!(figures = count, files = sink.written().len(), "Done");

    if let Some(workflow) = workflow {
        notify_completion(&workflow).context("Failed to signal completion")?;
    }
    Ok(())
}
