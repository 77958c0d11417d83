use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use minddocs_core::config::API_URL_ENV;
use minddocs_core::{ApiClient, Config, FileStore, KeyValueStore, MemoryStore, Route, Session};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod input;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "minddocs")]
#[command(version, about = "Terminal client for MindDocs AI: chat with, summarize, translate and extract from your PDFs")]
struct Cli {
    /// Backend base URL
    #[arg(long, env = API_URL_ENV)]
    api_url: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep the session token and theme in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Write logs here instead of the configured log file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging is not up yet; report a bad config file once it is.
    let (config, config_error) = match load_config(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let log_file = match cli.log_file.clone() {
        Some(path) => path,
        None => config.log_file()?,
    };
    let _log_guard = init_logging(&log_file)?;
    if let Some(e) = config_error {
        warn!(error = %e, "could not read config file, using defaults");
    }

    let session = Session::new(open_store(cli.ephemeral, FileStore::default_path()));

    let api_url = config.resolve_api_url(cli.api_url.as_deref());
    info!(api_url = %api_url, ephemeral = cli.ephemeral, "starting minddocs");
    let client = ApiClient::new(&api_url, session.tokens().clone());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let mut app = App::new(session, client, &config, events.sender());
    app.navigate(Route::Home);

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    info!("exiting");
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}

/// Token and theme storage: the file under the config directory, or memory
/// for `--ephemeral` runs and when there is no config directory.
fn open_store(ephemeral: bool, path: Option<PathBuf>) -> Arc<dyn KeyValueStore> {
    match path {
        _ if ephemeral => Arc::new(MemoryStore::new()),
        Some(path) => Arc::new(FileStore::open(path)),
        None => {
            warn!("no config directory found, session and theme will not be saved");
            Arc::new(MemoryStore::new())
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> minddocs_core::Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// File logger; the returned guard flushes pending lines on drop.
fn init_logging(path: &std::path::Path) -> Result<WorkerGuard> {
    let dir = path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(std::path::Path::new("."));
    fs::create_dir_all(dir).with_context(|| format!("creating log directory {}", dir.display()))?;
    let file_name = path.file_name().context("log file path has no file name")?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("minddocs=info,minddocs_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_persists_under_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("minddocs").join("storage.json");

        let store = open_store(false, Some(path.clone()));
        store.set("theme", "light").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_ephemeral_store_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let store = open_store(true, Some(path.clone()));
        store.set("theme", "light").unwrap();
        assert_eq!(store.get("theme").as_deref(), Some("light"));
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_config_dir_falls_back_to_memory() {
        let store = open_store(false, None);
        store.set("access_token", "tok").unwrap();
        assert_eq!(store.get("access_token").as_deref(), Some("tok"));
    }
}
