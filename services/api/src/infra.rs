use estate_catalog::catalog::{CatalogService, InMemoryPropertyRepository};
use estate_catalog::config::CatalogConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type InMemoryCatalogService = CatalogService<InMemoryPropertyRepository>;

/// Catalog service over a fresh in-process store.
pub(crate) fn in_memory_catalog(config: &CatalogConfig) -> InMemoryCatalogService {
    CatalogService::new(Arc::new(InMemoryPropertyRepository::default()), config)
}
