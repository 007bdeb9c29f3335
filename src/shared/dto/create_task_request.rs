use serde::Deserialize;

use crate::{iso_timestamp::IsoTimestamp, task_category::TaskCategory, task_priority::TaskPriority};

/// Body of `POST /api/tasks`. Enum values outside the allowed set fail
/// deserialization and never reach the service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    pub due_date: IsoTimestamp,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    #[serde(default)]
    pub notification_id: Option<String>,
}
