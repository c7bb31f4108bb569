//! ptt-collector - Prayer timetable collection service
//!
//! Collects monthly prayer timetables for London (JSON API), Birmingham and
//! Manchester (HTML tables), normalizes them and stores them in SQLite.
//!
//! - `serve` (default): HTTP API plus the monthly/weekly collection scheduler
//! - `collect <location>`: one collection run, result printed as JSON

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ptt_common::config::{database_path, resolve_root_folder, TomlConfig};
use ptt_common::{KnownLocation, Period};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ptt_collector::config::LayeredSecrets;
use ptt_collector::services::{ScheduleCoordinator, Sources};
use ptt_collector::AppState;

/// Command-line arguments for ptt-collector
#[derive(Parser, Debug)]
#[command(name = "ptt-collector")]
#[command(about = "Prayer timetable collection service")]
#[command(version)]
struct Args {
    /// TOML config file (default: <config dir>/prayer-timetable/config.toml)
    #[arg(short, long, env = "PTT_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides TOML `port`)
    #[arg(short, long, env = "PTT_PORT")]
    port: Option<u16>,

    /// Folder holding the database (overrides PTT_ROOT_FOLDER and TOML)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API and the collection scheduler
    Serve,
    /// Collect one month for one location and exit
    Collect {
        /// london, birmingham or manchester (or LDN, BIRM, MANC)
        location: KnownLocation,
        /// Defaults to the current year
        #[arg(long)]
        year: Option<i32>,
        /// Number or English name; defaults to the current month
        #[arg(long)]
        month: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, config_path) =
        TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // RUST_LOG takes precedence over the TOML level
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting ptt-collector v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Config: {}", path.display()),
        None => warn!("No config file found, using compiled defaults"),
    }

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
    let db_path = database_path(&root_folder);
    info!("Database: {}", db_path.display());

    let db_pool = ptt_common::db::init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let secrets = Arc::new(LayeredSecrets::new(db_pool.clone(), config.secrets.clone()));
    let sources = Sources::from_config(&config.sources, secrets)
        .context("Failed to create source adapters")?;
    let state = AppState::new(db_pool, sources);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(state, args.port.unwrap_or(config.port), config.scheduler.enabled).await,
        Command::Collect {
            location,
            year,
            month,
        } => collect_once(state, location, year, month).await,
    }
}

async fn serve(state: AppState, port: u16, scheduler_enabled: bool) -> Result<()> {
    let mut scheduler = if scheduler_enabled {
        let coordinator = Arc::new(ScheduleCoordinator::new(
            state.orchestrator.clone(),
            state.sources.clone(),
        ));
        Some(coordinator.start().await?)
    } else {
        info!("Scheduler disabled by configuration");
        None
    };

    let app = ptt_collector::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(scheduler) = scheduler.as_mut() {
        if let Err(e) = scheduler.shutdown().await {
            error!("Scheduler shutdown failed: {}", e);
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn collect_once(
    state: AppState,
    location: KnownLocation,
    year: Option<i32>,
    month: Option<String>,
) -> Result<()> {
    let current = Period::current();
    let period = match month {
        Some(month) => Period::parse(year.unwrap_or(current.year()), &month)?,
        None => Period::new(year.unwrap_or(current.year()), current.month())?,
    };

    let response = state.run_collection(location, period).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.is_success() {
        anyhow::bail!(
            "Collection for {} {} failed: {}",
            location,
            period,
            response.error.unwrap_or_default()
        );
    }
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
