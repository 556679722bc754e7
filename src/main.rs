mod action;
mod app;
mod auth;
mod config;
mod devops;
mod effects;
mod error;
mod event;
mod fetch;
mod markdown;
mod theme;
mod tui;
mod types;
mod ui;
mod widgets;

use std::fs::{self, File, OpenOptions};
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::{Action, Tab};
use crate::app::App;
use crate::auth::Credential;
use crate::config::Config;
use crate::devops::{DevOps, Endpoints};
use crate::effects::SystemEffects;
use crate::event::Event;
use crate::fetch::Fetcher;
use crate::tui::EventHandler;

const TICK_RATE: Duration = Duration::from_millis(250);
const RENDER_RATE: Duration = Duration::from_millis(16); // ~60fps

/// Terminal dashboard for Azure DevOps work items and pull requests.
#[derive(Debug, Parser)]
#[command(name = "lazyaz", version)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tab shown at startup
    #[arg(long, value_enum, default_value_t = Tab::WorkItems)]
    tab: Tab,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_logging();

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let config = Config::load(cli.config.as_deref());
    let credential = Credential::from_env(&config.general.token_env);
    let devops = DevOps::new(
        credential,
        Duration::from_secs(config.general.request_timeout_secs),
    )?;
    let fetcher = Fetcher::new(
        Arc::new(devops),
        Endpoints::new(&config.azure),
        config.work_items.clone(),
    );

    let result = run(&config, cli.tab, fetcher).await;

    // Restore terminal
    tui::restore()?;

    result
}

/// The terminal belongs to the UI while it runs, so logs go to a file.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    match dirs::cache_dir().and_then(|dir| open_log(&dir)) {
        Some(file) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false),
            )
            .init(),
        None => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::sink))
            .init(),
    }
}

fn log_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join("lazyaz").join("lazyaz.log")
}

fn open_log(cache_dir: &Path) -> Option<File> {
    let path = log_path(cache_dir);
    fs::create_dir_all(path.parent()?).ok()?;
    OpenOptions::new().create(true).append(true).open(path).ok()
}

async fn run(
    config: &Config,
    tab: Tab,
    fetcher: Fetcher,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = tui::init()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let mut app = App::new(
        config,
        tab,
        fetcher,
        Box::new(SystemEffects::default()),
        action_tx.clone(),
    );
    let (width, height) = crossterm::terminal::size()?;
    app.update(Action::Resize(width, height));

    let mut events = EventHandler::new(TICK_RATE, RENDER_RATE);

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    match app.fatal.take() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_lives_under_cache_dir() {
        let dir = std::env::temp_dir().join(format!("lazyaz-log-{}", std::process::id()));
        assert_eq!(log_path(&dir), dir.join("lazyaz").join("lazyaz.log"));

        assert!(open_log(&dir).is_some());
        assert!(log_path(&dir).exists());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn spinner_ticks_four_times_a_second() {
        assert_eq!(TICK_RATE, Duration::from_millis(250));
        assert!(RENDER_RATE < TICK_RATE);
    }
}
