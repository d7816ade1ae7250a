//! Plate Viewer - terminal viewer and editor for multi-well plates
//!
//! Fetches a plate layout, draws it as a labeled grid of wells, and lets the
//! user move between wells and edit them from the keyboard.

mod config;
mod core;
mod data;
mod frontend;
mod labels;
mod network;

use crate::config::Config;
use crate::core::{AppCore, PlateGrid};
use crate::core::text_well::TextWell;
use crate::data::PlateLayout;
use crate::frontend::{Frontend, FrontendEvent, TuiFrontend};
use crate::network::{
    AnyLayoutSource, FileLayoutSource, HttpLayoutSource, LayoutFetch, LayoutMessage,
};
use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(ClapParser)]
#[command(name = "plate-viewer")]
#[command(about = "Terminal viewer and editor for multi-well plates", long_about = None)]
struct Cli {
    /// Plate to show
    #[arg(short, long, default_value_t = 1)]
    plate_id: u32,

    /// Layout server base URL (overrides connection.base_url)
    #[arg(short, long, value_name = "URL")]
    url: Option<String>,

    /// Read the layout from a JSON file instead of the server
    #[arg(long, value_name = "FILE", conflicts_with = "url")]
    file: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Custom data directory (default: ~/.plate-viewer)
    /// Can also be set via PLATE_VIEWER_DIR environment variable
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a plate layout JSON file
    ValidateLayout {
        /// Layout file to validate
        #[arg(value_name = "FILE")]
        layout: PathBuf,
    },
}

fn main() -> Result<()> {
    // TUI apps can't log to stdout, so we write to a file
    // (use RUST_LOG env var to control level, e.g. RUST_LOG=debug)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("plate-viewer.log")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false) // No color codes in log file
        .init();

    let cli = Cli::parse();

    if let Some(Commands::ValidateLayout { layout }) = &cli.command {
        if let Err(e) = validate_layout(layout) {
            eprintln!("✗ {:#}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    if let Some(data_dir) = &cli.data_dir {
        std::env::set_var(config::DIR_ENV_VAR, data_dir);
        tracing::info!("Using custom data directory: {:?}", data_dir);
    } else if let Ok(env_dir) = std::env::var(config::DIR_ENV_VAR) {
        tracing::info!("Using data directory from {}: {}", config::DIR_ENV_VAR, env_dir);
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    if let Some(url) = &cli.url {
        config.connection.base_url = url.clone();
    }

    let source = match &cli.file {
        Some(path) => AnyLayoutSource::File(FileLayoutSource::new(path)),
        None => AnyLayoutSource::Http(HttpLayoutSource::new(
            &config.connection.base_url,
            &config.connection.layout_path,
        )),
    };

    run_tui(config, cli.plate_id, source)
}

/// Parse a layout file and build its grid without a terminal
fn validate_layout(path: &Path) -> Result<()> {
    println!("Validating layout file: {:?}", path);
    let contents =
        std::fs::read_to_string(path).context(format!("Failed to read {:?}", path))?;
    let layout: PlateLayout =
        serde_json::from_str(&contents).context("Failed to parse plate layout")?;
    let grid = PlateGrid::build(&layout, |_| TextWell::new())?;

    let first = grid.row_label(0).unwrap_or_default();
    let last = grid.row_label(grid.rows() - 1).unwrap_or_default();
    println!("✓ Layout is valid");
    println!(
        "  {} rows ({}..{}) x {} columns, {} wells, {}",
        grid.rows(),
        first,
        last,
        grid.cols(),
        grid.len(),
        if grid.editable() { "editable" } else { "read-only" }
    );
    Ok(())
}

/// Run TUI frontend
fn run_tui(config: Config, plate_id: u32, source: AnyLayoutSource) -> Result<()> {
    // Use tokio runtime for the async layout fetch
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_run_tui(config, plate_id, source))
}

async fn async_run_tui(config: Config, plate_id: u32, source: AnyLayoutSource) -> Result<()> {
    use tokio::sync::mpsc;

    let (layout_tx, mut layout_rx) = mpsc::unbounded_channel::<LayoutMessage>();

    let poll_timeout = Duration::from_millis(config.ui.poll_timeout_ms);
    let mut app_core = AppCore::new(config, plate_id);

    let mut frontend = TuiFrontend::new()?;
    frontend.set_poll_timeout(poll_timeout);

    // The fetch is the only thing that runs off the event loop
    let fetch_handle = tokio::spawn(LayoutFetch::start(source, plate_id, layout_tx));

    let result = event_loop(&mut app_core, &mut frontend, &mut layout_rx);

    // Restore the terminal even if the loop failed
    frontend.cleanup()?;
    fetch_handle.abort();
    result
}

fn event_loop(
    app_core: &mut AppCore,
    frontend: &mut TuiFrontend,
    layout_rx: &mut tokio::sync::mpsc::UnboundedReceiver<LayoutMessage>,
) -> Result<()> {
    use crossterm::event::{MouseButton, MouseEventKind};

    while app_core.running {
        for event in frontend.poll_events()? {
            match event {
                FrontendEvent::Key { code, modifiers } => app_core.handle_key(code, modifiers),
                FrontendEvent::Mouse {
                    kind: MouseEventKind::Down(MouseButton::Left),
                    x,
                    y,
                    ..
                } => {
                    if let Some(pos) = frontend.well_at(x, y) {
                        app_core.focus_well(pos);
                    }
                }
                FrontendEvent::Mouse { .. } => {}
                FrontendEvent::Resize { width, height } => {
                    tracing::debug!(width, height, "Terminal resized");
                    app_core.needs_render = true;
                }
                FrontendEvent::Quit => app_core.quit(),
            }
        }

        while let Ok(msg) = layout_rx.try_recv() {
            app_core.handle_layout_message(msg);
        }

        if app_core.needs_render {
            frontend.render(app_core)?;
            app_core.needs_render = false;
        }
    }

    Ok(())
}
