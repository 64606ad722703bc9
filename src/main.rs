use anyhow::{Context, Result};
use armx::config::{Config, ProxySettings};
use armx::server::{router, AppState};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Aggregation proxy for the Azure Resource Manager API
#[derive(Parser, Debug)]
#[command(name = "armx", version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "ARMX_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "ARMX_BIND")]
    bind: Option<String>,

    /// Management endpoint to use for every request, ignoring host rules
    #[arg(long, env = "ARMX_ENDPOINT")]
    endpoint: Option<String>,

    /// Config file (defaults to <config dir>/armx/config.json)
    #[arg(short, long, env = "ARMX_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (RUST_LOG takes precedence when set)
    #[arg(long, value_enum, default_value = "info", env = "ARMX_LOG_LEVEL")]
    log_level: LogLevel,

    /// Write logs to this file instead of stdout
    #[arg(long, env = "ARMX_LOG_FILE")]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(
    level: LogLevel,
    log_file: Option<&PathBuf>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match level.to_tracing_level() {
            Some(level) => EnvFilter::new(format!("armx={level},tower_http={level}")),
            None => return Ok(None),
        },
    };

    let (writer, guard) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {:?}", path))?;
            tracing_appender::non_blocking(file)
        }
        None => tracing_appender::non_blocking(std::io::stdout()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(log_file.is_none())
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    Ok(Some(guard))
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match args.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load(),
    };

    // CLI > config > default
    if args.port.is_some() {
        config.port = args.port;
    }
    if args.bind.is_some() {
        config.bind = args.bind.clone();
    }
    if args.endpoint.is_some() {
        config.endpoint = args.endpoint.clone();
    }

    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level, args.log_file.as_ref())?;
    tracing::info!("armx {} starting", armx::VERSION);

    let config = load_config(&args)?;
    let settings = ProxySettings::from_config(&config);
    tracing::info!(
        endpoint_override = ?settings.endpoint_override,
        rules = settings.endpoint_rules.len(),
        default_endpoint = %settings.default_endpoint,
        specless_providers = ?settings.specless_providers,
        "Configuration loaded"
    );

    let state = AppState::new(settings)?;
    let app = router(state);

    let addr = format!("{}:{}", config.effective_bind(), config.effective_port());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
