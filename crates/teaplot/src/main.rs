mod app;
mod renderer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use teaplot_core::config::ViewerConfig;
use teaplot_core::logging;
use teaplot_graph::DataDocument;
use teaplot_winit::app::{App, run_app};

use crate::app::ViewerApp;

#[derive(Debug, Parser)]
#[command(name = "teaplot", version, about = "Animated viewer for TEACUP experiment data")]
struct Cli {
    /// Viewer configuration (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Graph data document (JSON) to plot at startup.
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Number of stacked graphs, overriding the config file.
    #[arg(short, long)]
    graphs: Option<usize>,

    /// Start in the perspective view.
    #[arg(long)]
    perspective: bool,

    /// Tracing filter directives, e.g. `teaplot_graph=debug`.
    #[arg(long)]
    log_filter: Option<String>,

    /// Serve puffin profiling data for puffin_viewer.
    #[cfg(feature = "profiling")]
    #[arg(long)]
    profile: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_with_filter(cli.log_filter.as_deref());

    #[cfg(feature = "profiling")]
    if cli.profile {
        use teaplot_core::profiling::{ProfilingBackend, init_profiling};
        init_profiling(ProfilingBackend::PuffinHttp);
    }

    let mut config = ViewerConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load viewer config")?;
    if let Some(graphs) = cli.graphs {
        config.graph_count = graphs;
    }
    if cli.perspective {
        config.perspective = true;
    }
    config.validate().context("Invalid viewer settings")?;

    let document = cli
        .data
        .as_deref()
        .map(DataDocument::load)
        .transpose()
        .context("Failed to load graph data")?;

    run_app(Box::new(move |ctx| {
        let app = ViewerApp::new(ctx, config, document)?;
        Ok(Box::new(app) as Box<dyn App>)
    }))
    .context("Viewer exited with an error")?;

    tracing::info!("Viewer closed");
    Ok(())
}
