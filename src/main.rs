mod app;
mod auth;
mod config;
mod error;
mod navigator;
mod notify;
mod schedule;
mod screens;
mod store;
mod task;
mod timer;
mod todo;
mod ui;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{enable_raw_mode, EnterAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{fs, io, panic, path::PathBuf};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::{
    app::App,
    config::{Config, CorruptFilePolicy},
    notify::LogScheduler,
    store::Stores,
};

/// To-do list with due dates and priorities, a countdown timer and a
/// free-text schedule.
#[derive(Parser)]
#[command(name = "student-todo", version, about)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding users.json, tasks.json, schedule.json and the log.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// What to do when a data file exists but cannot be parsed.
    #[arg(long, value_enum)]
    corrupt_files: Option<CorruptFilePolicy>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(policy) = cli.corrupt_files {
        config.corrupt_files = policy;
    }
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating data directory {}", config.data_dir.display()))?;

    let _log_guard = init_logging(&config);
    info!(data_dir = %config.data_dir.display(), "starting");

    let mut app = App::new(Stores::from_config(&config), Box::new(LogScheduler));

    // Panic messages print after the terminal is restored.
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        ui::restore_terminal();
        default_hook(info);
    }));

    // Terminal setup
    enable_raw_mode()?;
    let restore = ui::RestoreOnDrop(ui::restore_terminal);
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &mut app);
    drop(restore);

    if let Err(err) = result {
        error!(error = %err, "terminal loop failed");
        return Err(err.into());
    }
    info!(screen = ?app.screen(), "exiting");
    Ok(())
}

/// Logs go to a file; the terminal belongs to the UI.
fn init_logging(config: &Config) -> WorkerGuard {
    let appender = tracing_appender::rolling::never(&config.data_dir, &config.log_file);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    guard
}
