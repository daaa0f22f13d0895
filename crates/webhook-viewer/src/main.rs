mod poller;
mod source;
mod state;
mod theme;
mod ui;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use crossterm::{
    cursor::Show,
    event::EventStream,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use poller::{Poller, DEFAULT_POLL_INTERVAL_MS, MIN_POLL_INTERVAL};
use ratatui::{backend::CrosstermBackend, Terminal};
use source::{FeedSource, HttpFeedSource, DEFAULT_FEED_URL};
use std::{
    fs::OpenOptions,
    io,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use webhook_core::ViewSnapshot;

const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const UI_TICK_MS: u64 = 1_000;
const POLL_QUEUE_CAPACITY: usize = 16;

#[derive(Clone, Debug)]
struct Config {
    url: String,
    interval: Duration,
    timeout: Duration,
    log_file: Option<PathBuf>,
    debug: bool,
    once: bool,
}

#[derive(Parser, Debug)]
#[command(name = "webhook-viewer", about = "Live feed of repository webhook events")]
struct Args {
    /// Backend endpoint serving `{ webhooks, stats }`.
    #[arg(long, default_value = "")]
    url: String,
    #[arg(long)]
    interval_ms: Option<u64>,
    /// Per-request timeout.
    #[arg(long)]
    timeout_ms: Option<u64>,
    #[arg(long)]
    log_file: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    debug: bool,
    /// Fetch once, print the feed to stdout and exit.
    #[arg(long, default_value_t = false)]
    once: bool,
}

type Term = Terminal<CrosstermBackend<io::Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config(Args::parse());
    init_logging(&config);

    if config.once {
        return run_once(&config).await;
    }

    let source = Arc::new(
        HttpFeedSource::new(&config.url, config.timeout).context("building http client")?,
    );
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &config, source).await;
    restore_terminal(&mut terminal)?;
    result
}

async fn run_app(terminal: &mut Term, config: &Config, source: Arc<HttpFeedSource>) -> Result<()> {
    let mut app = state::App::new(source.label());
    let (poll_tx, mut poll_rx) = mpsc::channel(POLL_QUEUE_CAPACITY);
    let mut poller = Poller::start(source.clone(), config.interval, poll_tx.clone());
    let mut events = EventStream::new();
    let mut ui_ticker = tokio::time::interval(Duration::from_millis(UI_TICK_MS));

    loop {
        let now = Local::now();
        terminal.draw(|frame| ui::render(frame, &app, &now))?;

        tokio::select! {
            _ = ui_ticker.tick() => {}
            Some(outcome) = poll_rx.recv() => {
                app.apply_poll(outcome);
            }
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(event)) => app.handle_event(event),
                    Some(Err(err)) => return Err(err.into()),
                    None => break,
                }
            }
        }

        if app.take_refresh_request() {
            info!(event = "manual_refresh");
            poller.stop();
            poller = Poller::start(source.clone(), config.interval, poll_tx.clone());
        }
        if app.should_quit() {
            break;
        }
    }

    poller.stop();
    Ok(())
}

async fn run_once(config: &Config) -> Result<()> {
    let source = HttpFeedSource::new(&config.url, config.timeout)?;
    let feed = source
        .fetch()
        .await
        .with_context(|| format!("polling {}", config.url))?;
    let snapshot = ViewSnapshot::from_feed(feed);
    print!("{}", ui::plain_report(&snapshot, &Local::now()));
    Ok(())
}

fn setup_terminal() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Leave raw mode before the default hook prints the panic message.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = leave_terminal(&mut io::stdout());
        default_hook(info);
    }));

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Term) -> Result<()> {
    leave_terminal(terminal.backend_mut())?;
    terminal.show_cursor()?;
    Ok(())
}

fn leave_terminal(out: &mut impl io::Write) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(out, LeaveAlternateScreen, Show)
}

fn load_config(args: Args) -> Config {
    let url = resolve_string(&args.url, "WEBHOOK_VIEWER_URL", DEFAULT_FEED_URL);
    let interval_ms = resolve_u64(
        args.interval_ms,
        "WEBHOOK_VIEWER_INTERVAL_MS",
        DEFAULT_POLL_INTERVAL_MS,
    )
    .max(MIN_POLL_INTERVAL.as_millis() as u64);
    let timeout_ms = resolve_u64(args.timeout_ms, "WEBHOOK_VIEWER_TIMEOUT_MS", DEFAULT_TIMEOUT_MS);
    let log_file = args.log_file.or_else(|| {
        std::env::var("WEBHOOK_VIEWER_LOG_FILE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
    });
    Config {
        url,
        interval: Duration::from_millis(interval_ms),
        timeout: Duration::from_millis(timeout_ms.max(1)),
        log_file,
        debug: args.debug || env_true("WEBHOOK_VIEWER_DEBUG"),
        once: args.once,
    }
}

fn resolve_string(flag: &str, key: &str, default: &str) -> String {
    if !flag.trim().is_empty() {
        return flag.trim().to_string();
    }
    if let Ok(value) = std::env::var(key) {
        if !value.trim().is_empty() {
            return value.trim().to_string();
        }
    }
    default.to_string()
}

fn resolve_u64(flag: Option<u64>, key: &str, default: u64) -> u64 {
    flag.or_else(|| {
        std::env::var(key)
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
    })
    .unwrap_or(default)
}

fn env_true(key: &str) -> bool {
    match std::env::var(key) {
        Ok(value) => matches!(
            value.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => false,
    }
}

/// The TUI owns stdout, so logs go to a file when one is configured and are
/// dropped otherwise. `--once` logs to stderr.
fn init_logging(config: &Config) {
    let level = if config.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if config.once {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init();
        return;
    }

    let file = config.log_file.as_ref().and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(file),
            Err(err) => {
                eprintln!("log_file_error: {}: {err}", path.display());
                None
            }
        }
    });
    match file {
        Some(file) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .try_init();
        }
    }
}
