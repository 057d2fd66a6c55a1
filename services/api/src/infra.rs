use job_tracker::error::AppError;
use job_tracker::workflows::recruitment::{seed_demo_data, InMemoryRecruitmentStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local store, optionally loaded with the demo records.
pub(crate) fn recruitment_store(seed: bool) -> Result<Arc<InMemoryRecruitmentStore>, AppError> {
    let store = Arc::new(InMemoryRecruitmentStore::default());
    if seed {
        seed_demo_data(store.as_ref())?;
    }
    Ok(store)
}
