use serde::Deserialize;

/// Query string of `GET /api/tasks`, kept as text. Values that don't parse
/// are dropped instead of rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskListQuery {
    pub category: Option<String>,
    pub priority: Option<String>,
    pub completed: Option<String>,
    pub limit: Option<String>,
}
