//! fora: terminal dashboard for interview theme analysis.
//!
//! Entry point for the `fora` binary. Wires together configuration (`config`),
//! the terminal lifecycle (`tui`), the unified event bus (`event`), background
//! service calls (`worker`), dashboard state (`app`) and rendering (`ui`).
//!
//! # Startup sequence
//!
//! 1. Parse flags and load the config file. Errors print to stderr and exit
//!    before the terminal is touched.
//! 2. Route `tracing` output to the log file.
//! 3. Build the HTTP client for the configured interview.
//! 4. `install_panic_hook()`, then `register_sigterm()`, then `init_tui()`.
//! 5. Spawn the event task and the initial results load.
//!
//! `restore_tui()` runs once after the event loop exits (quit key, SIGTERM,
//! channel close or a draw error). The panic hook covers unexpected panics.

mod app;
mod config;
mod event;
mod theme;
mod tui;
mod ui;
mod worker;

use std::fs::File;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use clap::Parser;
use fora_core::api::{AnalysisService, HttpAnalysisClient};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{Args, Config};
use crate::event::AppEvent;
use crate::ui::keybindings::{handle_key, handle_mouse, KeyAction};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load(Args::parse()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("fora: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config) {
        eprintln!("fora: cannot open log file {}: {err}", config.log_file.display());
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("fatal: {err}");
            eprintln!("fora: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(config: &Config) -> std::io::Result<()> {
    let log_file = File::create(&config.log_file)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fora=info,fora_core=info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .init();
    Ok(())
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let theme = theme::Theme::from_name(&config.theme);
    info!(base_url = %config.base_url, interview = %config.interview, "starting");

    let service: Arc<dyn AnalysisService> = Arc::new(HttpAnalysisClient::new(
        &config.base_url,
        config.interview.clone(),
        Arc::new(config.credentials),
    )?);
    let mut state = app::AppState::new(config.interview);

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm()?;
    let mut terminal = tui::init_tui()?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let tx = handler.tx;
    let mut rx = handler.rx;

    worker::spawn_all(&service, state.take_requests(), &tx);

    // Exits only via `break` so `restore_tui()` is always reached.
    let mut outcome: std::io::Result<()> = Ok(());
    'event_loop: loop {
        tokio::select! {
            // Heartbeat: a quiescent terminal would otherwise block in rx.recv()
            // and never see the SIGTERM flag.
            _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(AppEvent::Render) => {
                        if let Err(err) = terminal.draw(|frame| ui::render(frame, &mut state, &theme)) {
                            outcome = Err(err);
                            break 'event_loop;
                        }
                    }
                    Some(AppEvent::Key(key)) => {
                        if handle_key(key, &mut state) == KeyAction::Quit {
                            break 'event_loop;
                        }
                    }
                    Some(AppEvent::Mouse(mouse)) => {
                        handle_mouse(mouse, &mut state);
                    }
                    Some(AppEvent::Tick) => state.tick(),
                    Some(AppEvent::Api(result)) => state.apply_outcome(*result),
                    // ratatui picks up the new size from frame.area() on the next Render.
                    Some(AppEvent::Resize(width, height)) => debug!(width, height, "terminal resized"),
                    None => break 'event_loop,
                }
                worker::spawn_all(&service, state.take_requests(), &tx);
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    tui::restore_tui()?;
    info!("exiting");
    outcome?;
    Ok(())
}
