use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    api_error::ApiError, app_state::SharedState, create_task_request::CreateTaskRequest,
    delete_task_response::DeleteTaskResponse, extract::ValidJson, sync_request::SyncRequest,
    sync_response::SyncResponse, task::Task, task_list_query::TaskListQuery,
    update_task_request::UpdateTaskRequest,
};

pub struct TaskController {}

impl TaskController {
    pub async fn list(
        State(state): State<SharedState>,
        Query(query): Query<TaskListQuery>) -> Result<Json<Vec<Task>>, ApiError> {
        Ok(Json(state.tasks.list(&query)?))
    }

    pub async fn create(
        State(state): State<SharedState>,
        ValidJson(body): ValidJson<CreateTaskRequest>) -> Result<Json<Task>, ApiError> {
        Ok(Json(state.tasks.create(body)?))
    }

    pub async fn get(
        State(state): State<SharedState>,
        Path(id): Path<String>) -> Result<Json<Task>, ApiError> {
        Ok(Json(state.tasks.get(&id)?))
    }

    pub async fn update(
        State(state): State<SharedState>,
        Path(id): Path<String>,
        ValidJson(body): ValidJson<UpdateTaskRequest>) -> Result<Json<Task>, ApiError> {
        Ok(Json(state.tasks.update(&id, body)?))
    }

    pub async fn delete(
        State(state): State<SharedState>,
        Path(id): Path<String>) -> Result<Json<DeleteTaskResponse>, ApiError> {
        Ok(Json(state.tasks.delete(&id)?))
    }

    pub async fn sync(
        State(state): State<SharedState>,
        ValidJson(body): ValidJson<SyncRequest>) -> Result<Json<SyncResponse>, ApiError> {
        Ok(Json(state.tasks.sync(body)?))
    }
}
