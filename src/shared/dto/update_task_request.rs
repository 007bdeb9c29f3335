use serde::Deserialize;

/// Body of `PUT /api/tasks/:id`. Every field is optional; `priority` and
/// `category` stay raw strings so bad values surface as 400, not 422.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub completed: Option<bool>,
    pub notification_id: Option<String>,
}
