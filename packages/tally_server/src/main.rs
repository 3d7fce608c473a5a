use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

mod addresses;
mod config;
mod handlers;
mod listener;
mod metrics;
mod routes;
mod state;
mod switcher;

use crate::config::{FeedSource, FileConfig, TallyConfig};
use crate::listener::{ListenerConfig, SnapshotListener};
use crate::metrics::ListenerStats;
use crate::state::TallyState;
use crate::switcher::SwitcherEvent;

/// Capacity of the switcher event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Serves the tally status of one switcher input over HTTP")]
struct Cli {
    /// Config file (missing file means defaults)
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Switcher input to monitor
    #[arg(short, long)]
    input: Option<u16>,

    /// Switcher event feed: a file path, or "-" for stdin
    #[arg(short, long)]
    feed: Option<String>,

    /// Port for the web server
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to
    #[arg(short = 'b', long)]
    host: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub tally: Arc<TallyState>,
    /// Listener counters for `/health`
    pub stats: Arc<ListenerStats>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let default_directive = if cli.debug {
        "tally=debug,tower_http=debug,info"
    } else {
        "tally=info,tower_http=info,warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .init();

    let config = resolve_config(&cli)?;
    run_server(config).await
}

/// Layer CLI flags over the file/env config.
fn resolve_config(cli: &Cli) -> Result<TallyConfig> {
    use figment::providers::Serialized;

    let mut figment = config::load_config(&cli.config);
    if let Some(input) = cli.input {
        figment = figment.merge(Serialized::default("switcher.input_id", input));
    }
    if let Some(feed) = &cli.feed {
        figment = figment.merge(Serialized::default("switcher.feed", feed));
    }
    if let Some(port) = cli.port {
        figment = figment.merge(Serialized::default("server.port", port));
    }
    if let Some(host) = &cli.host {
        figment = figment.merge(Serialized::default("server.host", host));
    }

    let file_config: FileConfig = figment
        .extract()
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    TallyConfig::from_file(&file_config)
}

/// Start pumping the switcher feed into the listener.
///
/// Stdin gets a dedicated OS thread since tokio's stdin reads on a blocking
/// pool worker that the runtime waits on at shutdown. Returns a task handle
/// only for feeds that can be aborted.
async fn start_feed(
    source: &FeedSource,
    tx: mpsc::Sender<SwitcherEvent>,
    stats: Arc<ListenerStats>,
) -> Result<Option<JoinHandle<()>>> {
    match source {
        FeedSource::Stdin => {
            switcher::spawn_stdin_feed(tx, stats).context("Failed to start stdin feed thread")?;
            Ok(None)
        }
        FeedSource::File(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open switcher feed: {}", path.display()))?;
            let handle = tokio::spawn(async move {
                if let Err(e) = switcher::pump_events(BufReader::new(file), tx, stats).await {
                    warn!("Switcher feed failed: {}", e);
                }
            });
            Ok(Some(handle))
        }
    }
}

async fn run_server(config: TallyConfig) -> Result<()> {
    info!("Starting tally for input {}", config.monitor.input);
    if let Some(address) = &config.switcher_address {
        info!("Switcher address: {}", address);
    }

    let host_addresses = addresses::discover_host_addresses();
    info!("Host addresses: {:?}", host_addresses);

    let tally = Arc::new(TallyState::new(
        config.monitor.input,
        host_addresses,
        config.rules.clone(),
    ));
    let stats = Arc::new(ListenerStats::new());

    // Listener is the only writer of the tally state
    let snapshot_listener = SnapshotListener::new(
        ListenerConfig {
            monitor: config.monitor,
            unknown_on_disconnect: config.unknown_on_disconnect,
        },
        tally.clone(),
        stats.clone(),
    );
    let (event_tx, listener_handle) =
        listener::spawn_listener(snapshot_listener, EVENT_CHANNEL_CAPACITY);

    let feed_handle = start_feed(&config.feed, event_tx, stats.clone()).await?;

    let app_state = AppState { tally, stats };
    let app = routes::build_router(app_state, config.static_dir.as_deref());
    if let Some(dir) = &config.static_dir {
        if dir.is_dir() {
            info!("Serving static assets from {}", dir.display());
        } else {
            warn!("Static asset directory {} not found", dir.display());
        }
    }

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    let actual_addr = listener.local_addr()?;

    info!("Tally listening on http://{}", actual_addr);
    info!("Endpoints:");
    info!("  GET /tally       - Current tally status");
    info!("  GET /health      - Switcher connection and listener counters");

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal, cleaning up...");
    };

    let server_result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error");

    if let Some(handle) = feed_handle {
        handle.abort();
    }
    listener_handle.abort();

    info!("Shutdown complete");
    server_result
}
