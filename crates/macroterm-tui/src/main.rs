//! macroterm - a terminal dashboard for the daily macro risk snapshot.
//!
//! The dashboard loads a static JSON snapshot through an offline cache
//! worker, so the last good snapshot stays viewable without a network.

mod app;
mod print;
mod ui;

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use macroterm_core::cache::CacheStorage;
use macroterm_core::config::{Config, ENV_BASE_URL, ENV_CACHE_VERSION};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file name inside the cache directory
const LOG_FILE: &str = "macroterm.log";

const USAGE: &str = "\
Usage: macroterm [OPTION]

  (none)           Run the dashboard
  --print          Load once and print the overview to stdout
  --clear-cache    Delete every offline cache store
  --write-config   Save the effective configuration to the config file
  -h, --help       Show this help";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Tui,
    Print,
    ClearCache,
    WriteConfig,
    Help,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Command> {
    let args: Vec<String> = args.into_iter().collect();
    match args.as_slice() {
        [] => Ok(Command::Tui),
        [flag] => match flag.as_str() {
            "--print" => Ok(Command::Print),
            "--clear-cache" => Ok(Command::ClearCache),
            "--write-config" => Ok(Command::WriteConfig),
            "-h" | "--help" => Ok(Command::Help),
            other => bail!("Unknown option: {}\n\n{}", other, USAGE),
        },
        _ => bail!("Expected at most one option\n\n{}", USAGE),
    }
}

/// Initialize the tracing subscriber for logging.
///
/// The dashboard owns the terminal, so it logs to a file in `log_dir`.
/// Without a directory, logs go to stderr. The returned guard flushes the
/// file writer on drop and must outlive the app.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

/// Load the config, falling back to defaults (plus env overrides) when the
/// file is unreadable.
fn load_config() -> (Config, Option<anyhow::Error>) {
    match Config::load() {
        Ok(config) => (config, None),
        Err(e) => {
            let mut config = Config::default();
            config.apply_overrides(
                std::env::var(ENV_BASE_URL).ok(),
                std::env::var(ENV_CACHE_VERSION).ok(),
            );
            (config, Some(e))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let command = parse_args(std::env::args().skip(1))?;
    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let (config, config_error) = load_config();

    let log_dir = match command {
        Command::Tui => config
            .cache_dir()
            .ok()
            .filter(|dir| std::fs::create_dir_all(dir).is_ok()),
        _ => None,
    };
    let _log_guard = init_tracing(log_dir.as_deref());

    if let Some(e) = config_error {
        warn!(error = %format!("{:#}", e), "Failed to load config, using defaults");
    }

    match command {
        Command::Print => print::print_overview(&config).await,
        Command::ClearCache => clear_cache(&config),
        Command::WriteConfig => {
            config.save()?;
            println!("Configuration saved");
            Ok(())
        }
        Command::Tui | Command::Help => run_tui(&config).await,
    }
}

fn clear_cache(config: &Config) -> Result<()> {
    let storage = CacheStorage::new(&config.cache_dir()?)?;
    let mut deleted = 0;
    for name in storage.keys()? {
        if storage.delete(&name)? {
            info!(cache = %name, "Deleted cache store");
            deleted += 1;
        }
    }
    println!("Deleted {} cache store(s)", deleted);
    Ok(())
}

async fn run_tui(config: &Config) -> Result<()> {
    info!(base_url = %config.base_url, cache = %config.cache_name(), "macroterm starting");

    // Create app before touching the terminal so setup errors print normally
    let mut app = App::new(config)?;
    app.start_worker();
    app.load();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app);
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("macroterm shutting down");
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
