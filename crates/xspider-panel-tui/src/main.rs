use std::io;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ratatui::Terminal;
use ratatui::crossterm::event;
use ratatui::crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use xspider_panel_core::rpc::HttpTransport;
use xspider_panel_core::{EngineClient, ThemePreference, push, run_worker};

mod action;
mod app;
mod appearance;
mod config_file;
mod fields;
mod input;
mod theme;
mod view;

use app::App;

/// X-Spider control panel: drive the collection engine from the terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the engine bridge (default http://127.0.0.1:8765)
    #[arg(long)]
    engine_url: Option<String>,

    /// Queue poll interval while the engine runs, in milliseconds
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Theme to start with: light, dark or system
    #[arg(long)]
    theme: Option<ThemePreference>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Log to a daily rolling file; the terminal belongs to the UI.
fn init_logging(level: &str) -> Option<WorkerGuard> {
    let dir = dirs::cache_dir()?.join("xspider-panel").join("logs");
    std::fs::create_dir_all(&dir).ok()?;
    let appender = tracing_appender::rolling::daily(dir, "xspider-panel.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let _log_guard = init_logging(&args.log_level);

    // CLI flags > env vars > preferences file > defaults
    let overrides = config_file::Overrides {
        engine_url: args
            .engine_url
            .or_else(|| std::env::var("XSPIDER_ENGINE_URL").ok()),
        poll_interval_ms: args.poll_interval_ms,
        theme: args.theme,
    };
    let prefs = config_file::resolve(&config_file::load_config(), &overrides);
    tracing::info!(
        url = %prefs.engine_url,
        poll_ms = prefs.poll_interval.as_millis() as u64,
        theme = %prefs.theme,
        "starting panel"
    );

    let transport = Arc::new(HttpTransport::new(prefs.engine_url.clone())?);
    let client = EngineClient::new(transport.clone());
    let os_appearance = appearance::detect();

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    // Install panic hook that restores terminal before printing panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    let backend_terminal = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend_terminal)?;

    // Drain any stray input events (e.g. Enter keypress from launching the command)
    while event::poll(Duration::from_millis(50)).unwrap_or(false) {
        let _ = event::read();
    }

    let (event_tx, mut event_rx) = push::channel();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (os_tx, mut os_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    let mut app = App::new(prefs.theme, os_appearance);
    app.backend_cmd_tx = Some(cmd_tx);
    app.prefs_path = config_file::config_path();
    let size = terminal.size()?;
    app.update(action::Action::Resize(size.width, size.height));

    let worker = tokio::spawn(run_worker(
        client,
        cmd_rx,
        event_tx.clone(),
        prefs.poll_interval,
    ));
    let stream = transport.spawn_event_stream(event_tx, cancel.clone());
    let watcher = appearance::spawn_watcher(os_appearance, os_tx, cancel.clone());
    app.start();

    // Also handle Ctrl+C at the OS level for clean shutdown
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_for_signal.cancel();
        }
    });

    // Main event loop
    let tick_rate = Duration::from_millis(100);

    loop {
        terminal.draw(|f| app.view(f))?;

        tokio::select! {
            // Backend events (non-blocking drain)
            Some(backend_event) = event_rx.recv() => {
                app.handle_backend_event(backend_event);
                while let Ok(evt) = event_rx.try_recv() {
                    app.handle_backend_event(evt);
                }
            }
            Some(os) = os_rx.recv() => {
                app.update(action::Action::OsAppearance(os));
            }
            // Terminal input events
            _ = async {
                if event::poll(tick_rate).unwrap_or(false)
                    && let Ok(evt) = event::read()
                {
                    let action = input::map_event(&evt, &app.input_mode);
                    app.update(action);
                }
            } => {}
        }

        app.update(action::Action::Tick);

        if app.should_quit || cancel.is_cancelled() {
            break;
        }
    }

    cancel.cancel();
    // Dropping the sender ends the worker, which stops its poller.
    app.backend_cmd_tx = None;
    let _ = tokio::time::timeout(Duration::from_secs(1), worker).await;
    let _ = tokio::time::timeout(Duration::from_secs(1), stream).await;
    watcher.abort();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    tracing::info!("panel closed");

    Ok(())
}
