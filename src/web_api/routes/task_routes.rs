use axum::{
    routing::{get, post},
    Router,
};

use super::API_PREFIX;
use crate::{app_state::SharedState, task_controller::TaskController};

pub fn get_router(app_state: SharedState) -> Router {
    let tasks = format!("{}/tasks", API_PREFIX);
    Router::new()
        .route(tasks.as_str(), get(TaskController::list).post(TaskController::create))
        .route(format!("{}/sync", tasks).as_str(), post(TaskController::sync))
        .route(
            format!("{}/:id", tasks).as_str(),
            get(TaskController::get)
                .put(TaskController::update)
                .delete(TaskController::delete),
        )
        .with_state(app_state)
}
