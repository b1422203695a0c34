use std::{
    io::{self, BufRead},
    path::PathBuf,
    sync::Arc,
    thread,
};

use anyhow::Result;
use clap::Parser;
use client_core::{
    Card, CardBuilder, HttpArenaClient, RenderFrame, SessionConfig, SessionController,
    SessionExit, UiCommand,
};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod input;
mod render;

use config::load_settings;
use input::{parse_line, TerminalCommand, HELP};

#[derive(Parser, Debug)]
#[command(about = "Vote between two candidates by swiping from the terminal")]
struct Args {
    /// Vote server, e.g. http://127.0.0.1:8000
    #[arg(long)]
    server_url: Option<String>,
    /// Tracing filter directive, e.g. "client_core=debug"
    #[arg(long)]
    log_filter: Option<String>,
    #[arg(long, default_value = "swipe.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (mut settings, settings_error) = load_settings(&args.config);
    if let Some(v) = args.server_url {
        settings.server_url = v;
    }
    if let Some(v) = args.log_filter {
        settings.log_filter = v;
    }

    let filter = EnvFilter::try_new(&settings.log_filter)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    if let Some(err) = settings_error {
        warn!("ignoring unreadable settings: {err:#}");
    }

    let base_url = settings.server_url()?;
    info!(server = %base_url, "starting swipe session");
    let client = Arc::new(HttpArenaClient::new(base_url.clone())?);
    let session = SessionController::new(SessionConfig::default(), client.clone(), client)
        .with_card_builder(CardBuilder::new(Some(base_url.clone())));

    let (command_tx, command_rx) = mpsc::channel(64);
    let (frame_tx, frame_rx) = watch::channel(session.frame());
    let printer = tokio::spawn(print_frames(frame_rx.clone()));
    spawn_command_reader(command_tx, frame_rx);
    println!("{HELP}");

    let exit = session.run(command_rx, frame_tx).await;
    if let Err(err) = printer.await {
        error!("frame printer stopped: {err}");
    }

    if exit == SessionExit::ViewResults {
        println!("results: {}", base_url.join("/results")?);
    }
    Ok(())
}

async fn print_frames(mut frames: watch::Receiver<RenderFrame>) {
    loop {
        let line = render::frame_line(&frames.borrow_and_update());
        println!("{line}");
        if frames.changed().await.is_err() {
            break;
        }
    }
}

/// Reads stdin on a plain thread so a pending read never holds up shutdown.
fn spawn_command_reader(commands: mpsc::Sender<UiCommand>, frames: watch::Receiver<RenderFrame>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let command = match parse_line(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(err) => {
                    eprintln!("{err}");
                    continue;
                }
            };
            match command {
                TerminalCommand::Quit => break,
                TerminalCommand::Help => {
                    println!("{HELP}");
                    continue;
                }
                _ => {}
            }

            let card = frames.borrow().card.as_ref().map(Card::id);
            let ui_commands = match command.into_ui_commands(card) {
                Ok(ui_commands) => ui_commands,
                Err(err) => {
                    eprintln!("{err}");
                    continue;
                }
            };
            for ui_command in ui_commands {
                if commands.blocking_send(ui_command).is_err() {
                    return;
                }
            }
        }
    });
}
