use std::sync::Arc;

use crate::config::settings::AppConfig;
use crate::infrastructure::render::RenderBackend;
use crate::infrastructure::webhook::notifier::WebhookNotifier;
use crate::modules::jobs::repository::{InMemoryJobRegistry, JobRegistry};
use crate::workers::dispatcher::Dispatcher;
use crate::workers::render::RenderRunner;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<dyn JobRegistry>,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(registry: Arc<dyn JobRegistry>, dispatcher: Dispatcher) -> Self {
        Self {
            registry,
            dispatcher,
        }
    }

    /// Wire an in-memory registry, the webhook notifier and `backend` into a
    /// ready-to-serve state.
    pub fn from_config(
        config: &AppConfig,
        backend: Arc<dyn RenderBackend>,
    ) -> Result<Self, reqwest::Error> {
        let registry: Arc<dyn JobRegistry> = Arc::new(InMemoryJobRegistry::new());
        let notifier = Arc::new(WebhookNotifier::new(config.webhook())?);
        let runner = RenderRunner::new(Arc::clone(&registry), backend, notifier);
        let dispatcher = Dispatcher::new(Arc::clone(&registry), runner, config.worker_concurrency);

        Ok(Self::new(registry, dispatcher))
    }
}
