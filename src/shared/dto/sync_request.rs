use serde::Deserialize;

use crate::{iso_timestamp::IsoTimestamp, task_category::TaskCategory, task_priority::TaskPriority};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub tasks: Vec<SyncTask>,
    #[serde(default)]
    pub last_sync_time: Option<String>,
}

/// A full task as a client holds it. `id` may be missing or not a UUID, in
/// which case the record gets a fresh one.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncTask {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    pub title: String,
    pub due_date: IsoTimestamp,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    #[serde(default)]
    pub completed: bool,
    pub created_at: IsoTimestamp,
    #[serde(default)]
    pub updated_at: Option<IsoTimestamp>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub notification_id: Option<String>,
}
