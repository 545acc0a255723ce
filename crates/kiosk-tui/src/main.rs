//! Kiosk TUI entry point

use std::fs::OpenOptions;
use std::io;
use std::panic;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kiosk_tui::app::{EventHandler, TuiConfig, REDRAW_INTERVAL};
use kiosk_tui::auth::AccountBook;
use kiosk_tui::App;

#[tokio::main]
async fn main() -> Result<()> {
    // Set up panic hook to restore terminal on crash
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let config = TuiConfig::load();
    init_logging(&config)?;

    let result = run_app(config).await;

    if let Err(e) = &result {
        tracing::error!("Application error: {:#}", e);
    }

    result
}

/// Log to a file; stdout belongs to the terminal UI
fn init_logging(config: &TuiConfig) -> Result<()> {
    let path = config.log_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        )
        .with(
            EnvFilter::from_default_env()
                .add_directive("kiosk_tui=info".parse()?)
                .add_directive("kiosk_core=info".parse()?),
        )
        .init();

    Ok(())
}

async fn run_app(config: TuiConfig) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut events = EventHandler::new(REDRAW_INTERVAL);
    let result = match App::new(config, AccountBook::demo()?, events.page_sender()) {
        Ok(mut app) => app.run(&mut terminal, &mut events).await,
        Err(e) => Err(e.into()),
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
