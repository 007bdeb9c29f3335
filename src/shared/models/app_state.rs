use std::sync::Arc;

use crate::{
    analytics::AnalyticsEngine, clock::Clock, settings::Settings, task_service::TaskService,
    task_store::TaskStore,
};

pub struct AppState {
    pub tasks: TaskService,
    pub analytics: AnalyticsEngine,
    pub store: Arc<dyn TaskStore>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(store: Arc<dyn TaskStore>, clock: Arc<dyn Clock>, settings: &Settings) -> Self {
        Self {
            tasks: TaskService::new(store.clone(), clock.clone())
                .with_limits(settings.default_list_limit, settings.max_list_limit),
            analytics: AnalyticsEngine::new(store.clone(), clock.clone()),
            store,
            clock,
        }
    }
}

pub type SharedState = Arc<AppState>;
