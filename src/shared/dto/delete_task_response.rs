use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTaskResponse {
    pub message: String,
    pub task_id: Uuid,
}

impl DeleteTaskResponse {
    pub fn new(task_id: Uuid) -> Self {
        Self {
            message: "Task deleted successfully".to_string(),
            task_id,
        }
    }
}
