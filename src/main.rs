// lifeboard - terminal board client for missions, goals, and habits
//
// Architecture:
// - API worker (reqwest): executes board mutations and refetches state
// - Interaction layer: swipe-to-delete and drag-reorder gesture tracking
// - TUI (ratatui): renders the board and routes pointer/key events
// - mpsc channels connect the UI to the worker; every mutation is followed
//   by a snapshot that supersedes local provisional state

mod api;
mod cli;
mod config;
mod interaction;
mod logging;
mod theme;
mod tui;
mod util;
mod worker;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Config, LogRotation};
use logging::{BufferLayer, LogBuffer};
use theme::Theme;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Subcommands run and exit before any terminal setup
    if let Some(cli::Commands::Config {
        show,
        reset,
        edit,
        path,
    }) = &args.command
    {
        cli::handle_config(*show, *reset, *edit, *path);
        return Ok(());
    }

    // Config template helps users discover the options
    Config::ensure_config_exists();

    let mut config = Config::from_env();
    args.apply_to(&mut config);

    let log_buffer = LogBuffer::new();
    let _file_guard = init_tracing(&config, &log_buffer);

    // UI -> worker commands, worker -> UI events
    let (command_tx, command_rx) = mpsc::channel(64);
    let (event_tx, event_rx) = mpsc::channel(64);

    let (worker_handle, source_label) = if config.demo_mode {
        let handle = tokio::spawn(worker::run_demo(command_rx, event_tx));
        (handle, "demo".to_string())
    } else {
        let client = api::ApiClient::new(&config.base_url)?;
        let user_id = match config.user_id {
            Some(id) => id,
            None => client
                .me()
                .await
                .with_context(|| format!("Cannot resolve user against {}", config.base_url))?,
        };
        tracing::info!(user_id, base_url = %config.base_url, "connected to board API");
        let handle = tokio::spawn(worker::run(client, user_id, command_rx, event_tx));
        (handle, config.base_url.clone())
    };

    let mut app = tui::app::App::new(
        command_tx.clone(),
        log_buffer,
        Theme::named(&config.theme),
        source_label,
    );
    app.request_reload();

    if let Err(e) = tui::run_tui(app, event_rx).await {
        tracing::error!("TUI error: {e:?}");
    }

    // Closing the command channel lets the worker drain and exit
    drop(command_tx);
    let _ = worker_handle.await;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Initialize tracing. Stdout logging would tear through the alternate
/// screen, so events always go to the in-memory buffer; file logging is
/// layered on top when enabled. The returned guard must stay alive so
/// buffered file writes flush on exit.
fn init_tracing(
    config: &Config,
    log_buffer: &LogBuffer,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    // Precedence: RUST_LOG env var > config file > default "info"
    let default_filter = format!("lifeboard={}", config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    if !config.logging.file_enabled {
        tracing_subscriber::registry()
            .with(filter)
            .with(BufferLayer::new(log_buffer.clone()))
            .init();
        return None;
    }

    if let Err(e) = std::fs::create_dir_all(&config.logging.file_dir) {
        eprintln!(
            "Warning: Could not create log directory {:?}: {}",
            config.logging.file_dir, e
        );
        tracing_subscriber::registry()
            .with(filter)
            .with(BufferLayer::new(log_buffer.clone()))
            .init();
        return None;
    }

    let file_appender = match config.logging.file_rotation {
        LogRotation::Hourly => tracing_appender::rolling::hourly(
            &config.logging.file_dir,
            &config.logging.file_prefix,
        ),
        LogRotation::Daily => tracing_appender::rolling::daily(
            &config.logging.file_dir,
            &config.logging.file_prefix,
        ),
        LogRotation::Never => tracing_appender::rolling::never(
            &config.logging.file_dir,
            &config.logging.file_prefix,
        ),
    };
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(BufferLayer::new(log_buffer.clone()))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    Some(guard)
}
