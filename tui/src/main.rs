//! Databot TUI Entry Point
//!
//! Usage:
//!   databot-tui [OPTIONS]
//!
//! Options:
//!   --url <URL>          Assistant WebSocket endpoint
//!   --config <PATH>      Config file (default: ~/.config/databot/client.toml)
//!   --log-file <PATH>    Write logs to a file (the terminal is busy)

use std::fs::File;
use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use databot_core::{connect_session, load_config_from_path, ClientConfig, ConfigOverrides};
use databot_tui::greeting::greeting_now;
use databot_tui::{App, DisplayState};

/// Databot terminal client
#[derive(Parser, Debug)]
#[command(name = "databot-tui")]
#[command(about = "Chat with the databot assistant from your terminal")]
#[command(version)]
struct Args {
    /// Assistant WebSocket endpoint (ws:// or wss://), overrides DATABOT_URL
    #[arg(long)]
    url: Option<String>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Log to a file only; stdout belongs to the UI
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let config = load(&args)?;
    tracing::info!(source = %config.source(), url = %config.transport.url, "configuration loaded");

    // Check if we have a TTY before attempting initialization
    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: databot-tui requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means stdin or stdout is piped, or the session");
        eprintln!("is non-interactive (CI, ssh without -t).");
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&config, &mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Install the file subscriber; runs before any I/O task is spawned
fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    Ok(())
}

/// Config file, then environment, then command line
fn load(args: &Args) -> anyhow::Result<ClientConfig> {
    let mut config =
        load_config_from_path(args.config.clone()).context("Failed to load configuration")?;
    let mut overrides = ConfigOverrides::new();
    if let Some(url) = &args.url {
        overrides = overrides.with_url(url.clone());
    }
    overrides
        .apply(&mut config)
        .context("Invalid command line override")?;
    Ok(config)
}

async fn run_app(
    config: &ClientConfig,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> anyhow::Result<()> {
    let session = connect_session(config, DisplayState::new());
    let mut app = App::new(session, greeting_now());
    app.run(terminal).await
}
