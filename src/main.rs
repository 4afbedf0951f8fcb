mod app;
mod layout;
mod util;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::Parser;
use log::LevelFilter;
use nodescope::Settings;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Number of nodes in the generated graph.
    #[arg(long, default_value_t = 400)]
    nodes: usize,

    /// Number of edges in the generated graph.
    #[arg(long, default_value_t = 900)]
    edges: usize,

    /// JSON file with `graph`, `plotter` and `view` sections.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Prefix used for generated node labels.
    #[arg(long, default_value = "node")]
    seed_label: String,

    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    Settings::from_json(&text)
        .with_context(|| format!("failed to parse settings file {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    TermLogger::init(
        args.log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .context("failed to install logger")?;

    let settings = load_settings(args.settings.as_deref())?;
    let demo = app::DemoOptions {
        nodes: args.nodes,
        edges: args.edges,
        seed_label: args.seed_label.clone(),
    };
    log::info!(
        "starting viewer with {} nodes and {} edges",
        demo.nodes,
        demo.edges
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "nodescope",
        options,
        Box::new(move |cc| Ok(Box::new(app::GraphViewerApp::new(cc, demo, settings)))),
    )
    .map_err(|error| anyhow!("viewer terminated: {error}"))
}
