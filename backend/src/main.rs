use std::sync::Arc;

use anyhow::Context;
use backend::{
    catalog::{CatalogStore, load_catalog},
    chart_view::ChartViewStore,
    config::AppConfig,
    error::AppError,
    history::HistoryClient,
    logger::init_tracing,
    metrics::Counters,
    service::{RotationEvent, RotationService, RotationSettings},
};
use chart::FrameComposer;
use chrono::Utc;
use rotation::Catalog;
use tokio::sync::{broadcast, watch};

/// Loads the catalog file. A missing file starts the rotation idle instead of failing.
fn init_catalog(cfg: &AppConfig) -> anyhow::Result<CatalogStore> {
    let catalog = match load_catalog(&cfg.catalog_path) {
        Ok(c) => c,
        Err(AppError::CatalogIo { path, source }) if source.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path, "catalog file not found; starting with an empty catalog");
            Catalog::default()
        }
        Err(e) => return Err(e).context("failed to load catalog"),
    };

    tracing::info!(
        groups = catalog.groups().len(),
        items = catalog.flatten().len(),
        "catalog loaded"
    );

    Ok(CatalogStore::new(catalog))
}

/// Logs a summary of every newly published frame.
fn start_render_logger(view: ChartViewStore, width: f64, mut shutdown: watch::Receiver<bool>) {
    let mut versions = view.subscribe();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = versions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let version = *versions.borrow_and_update();

                    let snap = view.snapshot();
                    let Some(frame) = view.frame(Utc::now(), width) else {
                        continue;
                    };

                    tracing::info!(
                        version,
                        title = %frame.title,
                        delta = %frame.delta_label,
                        samples = frame.window.samples.len(),
                        ticks = ?frame.tick_labels,
                        error = ?snap.error.map(|e| e.message),
                        "chart frame rendered"
                    );
                }
                _ = shutdown.changed() => break,
            }
        }
    });
}

fn start_event_logger(mut events: broadcast::Receiver<RotationEvent>) {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(RotationEvent::Activated {
                    item,
                    generation,
                    reason,
                }) => {
                    tracing::info!(
                        item_id = item.item_id,
                        item_name = %item.item_name,
                        generation,
                        ?reason,
                        "active item changed"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "rotation event logger lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env().context("invalid configuration")?;
    init_tracing(cfg.json_logs);

    tracing::info!(
        backend_url = %cfg.backend_url,
        display_tz = %cfg.display_tz,
        "Starting price-history ticker..."
    );

    let catalog = init_catalog(&cfg)?;

    let client = HistoryClient::new(cfg.backend_url.clone(), cfg.fetch_timeout)
        .context("failed to build history client")?;

    let view = ChartViewStore::new(FrameComposer::new(
        cfg.window,
        cfg.display_tz,
        cfg.tick_policy,
    ));
    let counters = Counters::default();

    let service = RotationService::new(
        RotationSettings::from(&cfg),
        catalog,
        Arc::new(client),
        view.clone(),
        counters.clone(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    start_event_logger(service.subscribe());
    start_render_logger(view, cfg.render_width, shutdown_rx.clone());

    let rotation_task = tokio::spawn(service.run(shutdown_rx));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    shutdown_tx.send_replace(true);
    rotation_task.await.context("rotation task panicked")??;

    tracing::info!(counters = ?counters.snapshot(), "shutdown complete");

    Ok(())
}
