use colored::Colorize;
use tracing::{error, info};

use crate::infrastructure::{build_config, ServiceProvider};
use crate::telemetry::initialize_telemetry;

pub fn run() {
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(x) => x,
        Err(e) => {
            return eprintln!("{}: {}", "Cannot build runtime".red(), e);
        }
    };
    runtime.block_on(async_run());
}

pub async fn async_run() {
    let config = match build_config() {
        Ok(x) => x,
        Err(e) => {
            return eprintln!("{}: {}", "Cannot build config".red(), e);
        }
    };
    if let Err(e) = initialize_telemetry(config.telemetry()) {
        return eprintln!("{}: {}", "Cannot build logger".red(), e);
    };
    let service_provider = match ServiceProvider::build(config).await {
        Ok(x) => x,
        Err(e) => {
            return eprintln!("{}: {:#}", "Cannot build Service Provider".red(), e);
        }
    };
    if let Err(e) = service_provider.start_consumers().await {
        return error!("Cannot start event consumers: {e:#}");
    }
    info!("Asset system started.");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Stopping services (ctrl-c handling).");
        }
        _ = terminate() => {
            info!("Stopping services (SIGTERM handling).");
        }
    }
    match service_provider.stop_consumers().await {
        Ok(()) => info!("Event consumers stopped."),
        Err(e) => error!("Event consumers stopped with error: {e:#}"),
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut s) => {
            s.recv().await;
        }
        Err(e) => {
            error!("Cannot listen for SIGTERM: {e}");
            std::future::pending::<()>().await
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await
}
