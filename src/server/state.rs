use std::sync::Arc;

use crate::fetch::HttpClient;
use crate::settings::Settings;

/// Shared by every request: settings and one pooled HTTP client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    http: Arc<dyn HttpClient>,
}

impl AppState {
    pub fn new(settings: Settings, http: Arc<dyn HttpClient>) -> Self {
        Self { inner: Arc::new(InnerState { settings, http }) }
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn http(&self) -> Arc<dyn HttpClient> {
        self.inner.http.clone()
    }
}
