use tracing::{info, warn};

use crate::app::{AppContext, Result};
use crate::frontend::{self, FeedResponse};
use crate::scheduler::format_interval;

pub fn list_sites(ctx: &AppContext) -> Result<()> {
    if ctx.registry.is_empty() {
        println!("No sites configured");
        return Ok(());
    }

    for site in ctx.registry.iter() {
        println!("{} ({})\n  {}", site.id, site.name, site.url);
    }

    Ok(())
}

/// Serve one read through the cache. Prints the feed on success; the
/// response is returned either way so the caller can pick an exit code.
pub async fn get_feed(ctx: &AppContext, site: &str) -> FeedResponse {
    let response = frontend::respond(&ctx.cache, Some(site)).await;
    if response.is_success() {
        println!("{}", response.body);
    }
    response
}

pub async fn run(ctx: &AppContext) -> Result<()> {
    if ctx.registry.is_empty() {
        println!("No sites configured");
        return Ok(());
    }

    let scheduler = ctx.scheduler();
    println!(
        "Refreshing {} sites every {} (Ctrl+C to stop)",
        scheduler.site_ids().len(),
        format_interval(ctx.cache.ttl())
    );

    tokio::select! {
        _ = scheduler.run() => {}
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
            scheduler.stop();
        }
    }

    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {},
                _ = sigint.recv() => {},
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            warn!(error = %e, "Failed to set up signal handlers; falling back to Ctrl+C");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
