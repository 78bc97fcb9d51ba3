//! Apercus server - ZIP downloads of preview images.
//!
//! This binary reads the configuration, opens the telemetry log and starts
//! the HTTP server.

use std::net::SocketAddr;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use apercus_server::{
    config::Config,
    server::{create_router, RouterConfig},
    store::FsImageStore,
    telemetry::TelemetryRecorder,
    SelectionService,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    run_serve(config).await
}

async fn run_serve(config: Config) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Apercus server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Images: {}", config.images_dir.display());
    info!("  CGU: {}", config.cgu_dir.display());
    info!("  Front-end: {}", config.index_path().display());
    info!(
        "  Telemetry: {} (rotate at {} bytes, keep {})",
        config.telemetry_log.display(),
        config.telemetry_max_bytes,
        config.telemetry_backups
    );

    if !config.images_dir.is_dir() {
        warn!(
            "  Images directory {} does not exist - every matricule will be reported missing",
            config.images_dir.display()
        );
    }
    if !config.cgu_dir.is_dir() {
        warn!(
            "  CGU directory {} does not exist - archives will not include CGU documents",
            config.cgu_dir.display()
        );
    }

    let telemetry = match TelemetryRecorder::open(
        &config.telemetry_log,
        config.telemetry_max_bytes,
        config.telemetry_backups,
    ) {
        Ok(telemetry) => telemetry,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let store = FsImageStore::new(&config.images_dir, &config.cgu_dir);
    let service = SelectionService::new(store);
    let router = create_router(service, telemetry.clone(), build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try:");
    info!(
        "    curl -X POST http://{}/download-zip -H 'Content-Type: application/json' \\",
        addr
    );
    info!("         -d '{{\"matricules\": [\"123\"]}}' -o selection.zip");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    let served = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    if let Err(e) = telemetry.flush() {
        error!("Failed to flush telemetry log: {}", e);
    }

    if let Err(e) = served {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server stopped");
    ExitCode::SUCCESS
}

/// Resolve once Ctrl-C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "apercus_server=debug,tower_http=debug"
    } else {
        "apercus_server=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new().with_index_file(config.index_path());

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}
