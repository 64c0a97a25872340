use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use chunkread_core::{logging, Config, FsRepository, PassageRepository, ReadingMode};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

mod app;
mod handler;
mod tui;
mod ui;

use app::{App, LoadRequest};
use tui::{AppEvent, EventHandler};

#[derive(Parser)]
#[command(name = "chunkread")]
#[command(about = "Read passages chunk by chunk, with translations on demand")]
#[command(version)]
struct Cli {
    /// Directory containing index.json and the passage files
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Open this passage directly instead of showing the list
    #[arg(short, long)]
    passage: Option<String>,

    /// Reading mode to open --passage in (chunk or full)
    #[arg(short, long, requires = "passage")]
    mode: Option<ReadingMode>,

    /// Allow chunk reading without tagging sentences first
    #[arg(long)]
    allow_unfiltered_chunk: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, config_error) = Config::load_or_default();
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    if cli.allow_unfiltered_chunk {
        config.chunk_mode_requires_selection = false;
    }

    // Logging is best effort; the reader works without it
    let _log_guard = logging::init(config.log_level.as_deref()).ok();
    if let Some(e) = config_error {
        warn!(error = %format!("{:#}", e), "Could not load config, using defaults");
    }

    let repo = FsRepository::new(config.data_dir());
    info!(data_dir = %repo.root().display(), "Starting chunkread");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let sender = events.sender();

    let mut app = App::new(&config);
    app.request_index();
    if let Some(id) = cli.passage.as_deref() {
        if let Some(mode) = cli.mode {
            app.session.request_mode(mode);
        }
        app.open_passage(id);
    }

    let result = run(&mut terminal, &mut app, &mut events, &repo, &sender).await;

    tui::restore()?;
    result
}

async fn run(
    terminal: &mut tui::Tui,
    app: &mut App,
    events: &mut EventHandler,
    repo: &FsRepository,
    sender: &UnboundedSender<AppEvent>,
) -> Result<()> {
    loop {
        dispatch(app.drain_requests(), repo, sender);

        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Start repository work on background tasks; results come back as events.
fn dispatch(requests: Vec<LoadRequest>, repo: &FsRepository, sender: &UnboundedSender<AppEvent>) {
    for request in requests {
        let repo = repo.clone();
        let tx = sender.clone();
        match request {
            LoadRequest::Index => {
                tokio::spawn(async move {
                    let result = repo.list_passages().await;
                    if tx.send(AppEvent::IndexLoaded(result)).is_err() {
                        warn!("Event loop closed before index load finished");
                    }
                });
            }
            LoadRequest::Passage(ticket) => {
                tokio::spawn(async move {
                    let result = repo.get_passage(ticket.passage_id()).await;
                    if tx.send(AppEvent::PassageLoaded { ticket, result }).is_err() {
                        warn!("Event loop closed before passage load finished");
                    }
                });
            }
        }
    }
}
