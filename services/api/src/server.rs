use crate::cli::ServeArgs;
use crate::infra::{seed_marketplace, AppState, OfflineTranslator};
use crate::routes::with_marketplace_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use expalink::config::AppConfig;
use expalink::error::AppError;
use expalink::marketplace::{InMemoryStore, MarketplaceService};
use expalink::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(MarketplaceService::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(OfflineTranslator),
        config.policy,
    ));
    let seeded = seed_marketplace(service.as_ref())?;
    info!(professionals = seeded, "marketplace seeded");

    let app = with_marketplace_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "expalink marketplace ready");

    axum::serve(listener, app).await?;
    Ok(())
}
