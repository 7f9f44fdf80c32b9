use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use triage_core::{
    config::days, load_config, load_config_from_env, validate_config, Config, ConfigError,
    LogFormat,
};
use triage_server::{config_fingerprint, create_router, AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "triage")]
#[command(version, about = "Support ticket triage pipeline")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, env = "TRIAGE_CONFIG", default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Run the reconciliation job once and print the report
    Run,
    /// Delete dead-letter records older than the retention window
    Prune {
        /// Age threshold in days (defaults to dead_letter.retention_days)
        #[arg(long)]
        days: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = read_config(&cli.config)?;
    // Flushes the file writer when run() returns.
    let _log_guard = init_logging(&config)?;
    validate_config(&config).context("Configuration validation failed")?;

    info!(
        version = VERSION,
        config_hash = %config_fingerprint(&config),
        "Configuration loaded"
    );

    let state = Arc::new(AppState::from_config(config)?);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(state).await,
        Command::Run => {
            let report = state.job().run().await.context("Reconciliation failed")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Prune { days: d } => {
            let max_age = d.map(days).unwrap_or_else(|| state.config().dead_letter.retention());
            let removed = state
                .prune_dead_letters(max_age)
                .await
                .context("Failed to prune dead letters")?;
            println!("Removed {} dead-letter record(s)", removed);
            Ok(())
        }
    }
}

/// Load the config file, or defaults plus environment when it does not exist.
fn read_config(path: &Path) -> Result<Config> {
    match load_config(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) => {
            load_config_from_env().context("Failed to load config from environment")
        }
        Err(e) => Err(e).with_context(|| format!("Failed to load config from {:?}", path)),
    }
}

/// Logs go to stderr so `triage run` output stays parseable. With
/// `logging.file` set, JSON lines are also written to a daily-rotated file.
fn init_logging(config: &Config) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},tower_http=debug", config.logging.level))
    });

    let (file_layer, guard) = match &config.logging.file {
        Some(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("triage")
                .filename_suffix("log")
                .max_log_files(config.logging.max_files)
                .build(dir)
                .with_context(|| format!("Failed to open log directory {:?}", dir))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    match config.logging.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }

    Ok(guard)
}

async fn serve(state: Arc<AppState>) -> Result<()> {
    let config = state.config().clone();

    // Startup sweep
    if let Err(e) = state.prune_dead_letters(config.dead_letter.retention()).await {
        warn!(error = %e, "Dead-letter startup prune failed");
    }

    let prune_task = config.dead_letter.prune_interval().map(|interval| {
        let state = Arc::clone(&state);
        let retention = config.dead_letter.retention();
        info!(interval_secs = interval.as_secs(), "Periodic dead-letter prune enabled");
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick completes immediately; startup already pruned.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = state.prune_dead_letters(retention).await {
                    warn!(error = %e, "Periodic dead-letter prune failed");
                }
            }
        })
    });

    let app = create_router(Arc::clone(&state));

    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(task) = prune_task {
        task.abort();
    }
    info!("Server stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
