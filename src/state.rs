use crate::config::Config;
use crate::constants::DEFAULT_PREVIEW_CHARS;
use crate::storage::{InMemoryLog, RecordStore};
use crate::types::PayloadPolicy;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application context handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub policy: PayloadPolicy,
    pub preview_chars: usize,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, policy: PayloadPolicy) -> Self {
        Self {
            store,
            policy,
            preview_chars: DEFAULT_PREVIEW_CHARS,
            metrics: None,
        }
    }

    /// Fresh, empty in-memory log
    pub fn in_memory(policy: PayloadPolicy) -> Self {
        Self::new(Arc::new(InMemoryLog::new()), policy)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::in_memory(config.ingest.non_json_policy)
            .with_preview_chars(config.ingest.preview_chars)
    }

    pub fn with_preview_chars(mut self, preview_chars: usize) -> Self {
        self.preview_chars = preview_chars;
        self
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}
