//! `EventBoard`: terminal kanban board for event requests.
//!
//! Launches the TUI against a record store. Without a store URL the board
//! runs offline on built-in demo records. Configuration via CLI flags,
//! environment variables, or config file (`~/.config/eventboard/config.toml`).
//!
//! ```bash
//! # Offline demo mode
//! cargo run --bin eventboard
//!
//! # Connect to a store
//! cargo run --bin eventboard -- --store-url ws://127.0.0.1:9100/ws
//!
//! # Or via environment variables
//! EVENTBOARD_STORE_URL=ws://127.0.0.1:9100/ws cargo run --bin eventboard
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use eventboard::app::App;
use eventboard::config::{CliArgs, ClientConfig};
use eventboard::remote::RecordStore;
use eventboard::remote::memory::MemoryStore;
use eventboard::remote::ws::WsStore;
use eventboard::sync::{self, SyncCommand, SyncEvent};
use eventboard::ui;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(store_url = ?config.store_url, "eventboard starting");

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app.
    let result = match config.store_url.clone() {
        Some(url) => {
            let store = WsStore::new(url.clone(), config.connect_timeout);
            run_app(&mut terminal, Arc::new(store), url, &config).await
        }
        None => {
            let store = MemoryStore::demo();
            run_app(&mut terminal, Arc::new(store), "offline demo".to_string(), &config).await
        }
    };

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("eventboard exiting");
    result
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the terminal).
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("eventboard.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
async fn run_app<S: RecordStore + 'static>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    store: Arc<S>,
    store_label: String,
    config: &ClientConfig,
) -> io::Result<()> {
    let mut app = App::new(format!("{} ({store_label})", store.kind()), config.notice_timeout);

    let (cmd_tx, mut evt_rx) = sync::spawn_sync(store, config.to_sync_config());
    if cmd_tx.send(SyncCommand::Load).await.is_err() {
        tracing::error!("sync worker exited before the first load");
    }

    loop {
        // Step 1: Draw the UI frame.
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Step 2: Drain all pending SyncEvents (non-blocking).
        drain_sync_events(&mut app, &mut evt_rx);

        // Step 3: Expire notices.
        app.tick(Instant::now());

        // Step 4: Poll for terminal input events.
        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if let Some(cmd) = app.handle_key_event(key) {
                dispatch(&mut app, &cmd_tx, cmd);
            }
        }

        if app.should_quit {
            let _ = cmd_tx.try_send(SyncCommand::Shutdown);
            return Ok(());
        }
    }
}

/// Hand a command to the sync worker.
///
/// A persist that cannot be queued is settled as failed on the spot, so the
/// optimistic move is rolled back instead of staying in flight forever.
fn dispatch(app: &mut App, cmd_tx: &mpsc::Sender<SyncCommand>, cmd: SyncCommand) {
    let (error, cmd) = match cmd_tx.try_send(cmd) {
        Ok(()) => return,
        Err(mpsc::error::TrySendError::Full(cmd)) => {
            tracing::warn!("sync queue full");
            (eventboard::remote::StoreError::Rejected("too many pending saves".to_string()), cmd)
        }
        Err(mpsc::error::TrySendError::Closed(cmd)) => {
            tracing::error!("sync worker is gone");
            (eventboard::remote::StoreError::ConnectionClosed, cmd)
        }
    };
    match cmd {
        SyncCommand::Persist(ticket) => {
            app.handle_sync_event(SyncEvent::PersistFailed { ticket, error });
        }
        SyncCommand::Load => app.handle_sync_event(SyncEvent::LoadFailed(error)),
        SyncCommand::Shutdown => {}
    }
}

/// Drain all pending `SyncEvent`s from the receiver and apply them to the app.
fn drain_sync_events(app: &mut App, rx: &mut mpsc::Receiver<SyncEvent>) {
    while let Ok(event) = rx.try_recv() {
        app.handle_sync_event(event);
    }
}
