use crate::cli::ServeArgs;
use crate::infra::{in_memory_catalog, AppState};
use crate::routes::with_catalog_routes;
use crate::seed::seed_catalog;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use estate_catalog::config::AppConfig;
use estate_catalog::error::AppError;
use estate_catalog::telemetry;
use std::sync::atomic::Ordering;
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
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let catalog = in_memory_catalog(&config.catalog);
    if let Some(count) = args.seed {
        seed_catalog(&catalog, count)?;
    }

    let app = with_catalog_routes(Arc::new(catalog))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "real estate catalog ready");

    axum::serve(listener, app).await?;
    Ok(())
}
