//! origin-gate
//!
//! A localhost HTTPS gateway that admits a request only when its bearer
//! token was issued to the origin the request comes from.
//!
//! # Architecture Overview
//!
//! ```text
//!     Host shell ── stdin/stdout ──▶ session::issuance ──▶ SessionStore
//!                                       (origin hint → token)   ▲
//!                                                               │
//!     Renderer request                                          │
//!     ─────────────▶ net::tls ─▶ http::server ─▶ auth::pipeline ┘
//!                                                    │
//!                                                    ▼
//!                                             routing::router ─▶ handlers
//!
//!     Cross-cutting: config, observability, lifecycle (signals, sweeper)
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::BufReader;

use origin_gate::config::validation::validate_config;
use origin_gate::config::{load_config, ConfigError, GatewayConfig};
use origin_gate::handlers::{default_routes, Engines};
use origin_gate::http::HttpServer;
use origin_gate::lifecycle::{handle_signals, reload_origins, Gateway, Shutdown, Signals};
use origin_gate::net::load_tls_config;
use origin_gate::observability::{init_logging, metrics};
use origin_gate::session::{SessionSweeper, SystemClock};

#[derive(Parser)]
#[command(name = "origin-gate")]
#[command(about = "Origin-gated authentication gateway for local clients", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "ORIGIN_GATE_CONFIG")]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(long)]
    bind: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run(args));

    // A pending stdin read would otherwise hold the runtime open.
    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    init_logging(&config.observability);
    tracing::info!("origin-gate v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        request_timeout_secs = config.timeouts.request_secs,
        config_file = ?args.config,
        "Configuration loaded"
    );

    let gateway = Gateway::new(&config, Arc::new(SystemClock));

    let tls = load_tls_config(
        Path::new(&config.listener.tls.cert_path),
        Path::new(&config.listener.tls.key_path),
    )
    .await
    .inspect_err(|e| tracing::error!(error = %e, "TLS material unavailable, refusing to start"))?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();

    let sweeper = SessionSweeper::new(
        Arc::clone(&gateway.sessions),
        Duration::from_secs(config.session.sweep_interval_secs),
    );
    tokio::spawn(sweeper.run(shutdown.subscribe()));

    if config.issuance.stdio {
        let issuer = gateway.issuer.clone();
        let rx = shutdown.subscribe();
        tokio::spawn(async move {
            let stdin = BufReader::new(tokio::io::stdin());
            if let Err(e) = issuer.serve_lines(stdin, tokio::io::stdout(), rx).await {
                tracing::error!(error = %e, "Issuance channel failed");
            }
        });
    }

    let signals = Signals::install()?;
    let matcher = Arc::clone(&gateway.matcher);
    let config_path = args.config.clone();
    tokio::spawn(handle_signals(signals, shutdown.clone(), move || {
        reload_origins(config_path.as_deref(), &matcher)
    }));

    let routes = default_routes(&Engines::default(), config.security.max_body_size);
    let server = HttpServer::new(config, &gateway, routes);
    let served = server.run(tls, shutdown.subscribe()).await;

    // Stop background tasks even if the server exited on its own.
    shutdown.trigger();
    served?;

    tracing::info!("Shutdown complete");
    Ok(())
}
