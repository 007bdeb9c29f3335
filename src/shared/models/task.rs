use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{iso_timestamp::IsoTimestamp, task_category::TaskCategory, task_priority::TaskPriority};

/// A stored task as clients see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub due_date: IsoTimestamp,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    pub completed: bool,
    pub created_at: IsoTimestamp,
    pub updated_at: Option<IsoTimestamp>,
    /// Reserved for multi-user support. Stored, never interpreted.
    pub user_id: Option<String>,
    pub notification_id: Option<String>,
}

/// Every task field except the id, which the store assigns on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDocument {
    pub title: String,
    pub due_date: IsoTimestamp,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    pub completed: bool,
    pub created_at: IsoTimestamp,
    pub updated_at: Option<IsoTimestamp>,
    pub user_id: Option<String>,
    pub notification_id: Option<String>,
}

impl TaskDocument {
    pub fn with_id(self, id: Uuid) -> Task {
        Task {
            id,
            title: self.title,
            due_date: self.due_date,
            priority: self.priority,
            category: self.category,
            completed: self.completed,
            created_at: self.created_at,
            updated_at: self.updated_at,
            user_id: self.user_id,
            notification_id: self.notification_id,
        }
    }
}

/// A partial field set for update-by-id. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub due_date: Option<IsoTimestamp>,
    pub priority: Option<TaskPriority>,
    pub category: Option<TaskCategory>,
    pub completed: Option<bool>,
    pub notification_id: Option<String>,
    pub updated_at: Option<IsoTimestamp>,
}

impl TaskChanges {
    /// True when no content field is set. `updated_at` alone doesn't count.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.completed.is_none()
            && self.notification_id.is_none()
    }

    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(due_date) = &self.due_date {
            task.due_date = due_date.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(notification_id) = &self.notification_id {
            task.notification_id = Some(notification_id.clone());
        }
        if let Some(updated_at) = &self.updated_at {
            task.updated_at = Some(updated_at.clone());
        }
    }
}
