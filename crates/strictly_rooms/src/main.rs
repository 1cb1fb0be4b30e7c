//! Strictly Rooms - Unified CLI
//!
//! Runs the document store server or a terminal game.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command, PlayMode};
use std::path::Path;
use std::sync::Arc;
use strictly_rooms::terminal::{HELP, Input, parse_input, render};
use strictly_rooms::{
    DocumentStore, HttpStore, InMemoryStore, RetryingStore, RoomsConfig, Session, SyncManager,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,strictly_rooms=debug";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { host, port } => run_server(host, port).await,
        Command::Play {
            mode,
            room,
            name,
            config,
        } => run_play(mode, room, name, &config).await,
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Run the document store server
async fn run_server(host: String, port: u16) -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();

    info!("Starting Strictly Rooms document store");
    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;
    info!("Server ready at http://{}:{}/", host, port);

    strictly_rooms::serve(listener, InMemoryStore::new()).await?;
    Ok(())
}

/// Run a game in the terminal
async fn run_play(
    mode: PlayMode,
    room: Option<String>,
    name: Option<String>,
    config_path: &Path,
) -> Result<()> {
    // Log to a file so the board stays readable
    let log_file = std::fs::File::create("strictly_rooms.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .init();

    let config = RoomsConfig::load_or_default(config_path)?.with_env_overrides();
    let mut session = start_session(mode, room, name, &config).await?;
    info!(mode = session.mode().name(), "Session started");

    println!("{}", HELP);
    println!("{}", render(&session.snapshot(chrono::Utc::now())));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut poll = tokio::time::interval(config.poll_interval());
    let mut last_screen = String::new();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Ok(Input::Quit) => break,
                    Ok(Input::Help) => println!("{}", HELP),
                    Ok(Input::Refresh) => {
                        session.refresh().await;
                    }
                    Ok(Input::NewGame) => session.reset(chrono::Utc::now()),
                    Ok(Input::Play(mv)) => {
                        if let Err(e) = session.play(mv, chrono::Utc::now()).await {
                            println!("{}", e);
                        }
                    }
                    Err(e) => println!("{}", e),
                }
                last_screen.clear();
            }
            _ = poll.tick() => {
                session.tick(chrono::Utc::now()).await;
            }
        }

        let screen = render(&session.snapshot(chrono::Utc::now()));
        if screen != last_screen {
            println!("{}", screen);
            last_screen = screen;
        }
    }

    info!("Leaving game");
    Ok(())
}

#[instrument(skip(config))]
async fn start_session(
    mode: PlayMode,
    room: Option<String>,
    name: Option<String>,
    config: &RoomsConfig,
) -> Result<Session> {
    let turn_duration = config.turn_duration()?;
    let now = chrono::Utc::now();

    let session = match mode {
        PlayMode::Local => Session::local(config.player_names(), turn_duration, now),
        PlayMode::Ai => {
            let mut names = config.player_names();
            match config.ai_mark() {
                strictly_ultimate::Mark::X => names.x = "Computer".to_string(),
                strictly_ultimate::Mark::O => names.o = "Computer".to_string(),
            }
            Session::versus_ai(names, *config.ai_mark(), turn_duration, now)
        }
        PlayMode::Online => {
            let Some(url) = config.store_url() else {
                bail!(
                    "Online play needs a store URL; set store_url in the config or {}",
                    strictly_rooms::STORE_URL_ENV
                );
            };
            let Some(room) = room.filter(|r| !r.trim().is_empty()) else {
                bail!("Online play needs --room");
            };
            let store: Arc<dyn DocumentStore> = Arc::new(RetryingStore::new(
                HttpStore::new(url)?,
                config.retry_policy(),
            ));
            let name = match name {
                Some(name) => name,
                None => SyncManager::default_name(store.as_ref(), &room, &config.player_names())
                    .await
                    .context("Could not reach the room store")?,
            };
            Session::online(store, &room, &name, turn_duration, now)
                .await
                .inspect_err(|e| warn!(error = %e, "Could not join room"))?
        }
    };
    Ok(session)
}
