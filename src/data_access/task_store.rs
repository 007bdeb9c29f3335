//! The document-store contract the task API is written against.
//!
//! Everything above this module talks to `dyn TaskStore`; the redb file
//! store and the in-memory store both implement it.

use std::{collections::BTreeMap, ops::RangeBounds};

use thiserror::Error;
use uuid::Uuid;

use crate::{
    iso_timestamp::TimeRange,
    task::{Task, TaskChanges, TaskDocument},
    task_category::TaskCategory,
    task_priority::TaskPriority,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redb: {0}")]
    Backend(String),
    #[error("codec: {0}")]
    Codec(String),
    #[error("a task with id {0} already exists")]
    DuplicateId(Uuid),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Codec(e.to_string())
    }
}

/// Exact-match and range conditions, all of which must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub category: Option<TaskCategory>,
    pub priority: Option<TaskPriority>,
    pub completed: Option<bool>,
    pub due_date: Option<TimeRange>,
    pub created_at: Option<TimeRange>,
}

impl TaskFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn due_within(mut self, range: TimeRange) -> Self {
        self.due_date = Some(range);
        self
    }

    pub fn created_within(mut self, range: TimeRange) -> Self {
        self.created_at = Some(range);
        self
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.category.map_or(true, |c| task.category == c)
            && self.priority.map_or(true, |p| task.priority == p)
            && self.completed.map_or(true, |c| task.completed == c)
            && self.due_date.as_ref().map_or(true, |r| r.contains(&task.due_date))
            && self.created_at.as_ref().map_or(true, |r| r.contains(&task.created_at))
    }
}

/// Result order for `find`. Only newest-first by `createdAt` is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
}

/// Fields the store can group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    Category,
    Priority,
}

/// One group of a group-by aggregate: how many records share `key` and how
/// many of those are completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTotals {
    pub key: String,
    pub total: u64,
    pub completed: u64,
}

/// Fields that can carry a secondary index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexField {
    CreatedAt,
    DueDate,
    Category,
    Priority,
    Completed,
}

impl IndexField {
    pub const ALL: [IndexField; 5] = [
        IndexField::CreatedAt,
        IndexField::DueDate,
        IndexField::Category,
        IndexField::Priority,
        IndexField::Completed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            IndexField::CreatedAt => "createdAt",
            IndexField::DueDate => "dueDate",
            IndexField::Category => "category",
            IndexField::Priority => "priority",
            IndexField::Completed => "completed",
        }
    }

    pub fn from_name(name: &str) -> Option<IndexField> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// The index key a task files under for this field.
    pub fn key_of(self, task: &Task) -> String {
        match self {
            IndexField::CreatedAt => task.created_at.to_string(),
            IndexField::DueDate => task.due_date.to_string(),
            IndexField::Category => task.category.to_string(),
            IndexField::Priority => task.priority.to_string(),
            IndexField::Completed => task.completed.to_string(),
        }
    }
}

/// The operations the API needs from a document store.
///
/// Implementations serialize concurrent writers themselves. Nothing here is
/// transactional across calls.
pub trait TaskStore: Send + Sync {
    /// Insert a document under `id`, or a fresh id when `None`.
    /// Fails with `DuplicateId` if `id` is taken.
    fn insert_one(&self, id: Option<Uuid>, document: TaskDocument) -> Result<Task, StoreError>;

    /// Matching records in `createdAt` order, at most `limit` of them.
    fn find(
        &self,
        filter: &TaskFilter,
        order: SortOrder,
        limit: Option<usize>,
    ) -> Result<Vec<Task>, StoreError>;

    fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError>;

    /// Apply `changes` and return the record as it now stands, or `None` if
    /// no record has this id.
    fn update_by_id(&self, id: Uuid, changes: &TaskChanges) -> Result<Option<Task>, StoreError>;

    /// Returns whether a record was removed.
    fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Remove every record, returning how many there were.
    fn delete_all(&self) -> Result<u64, StoreError>;

    fn count(&self, filter: &TaskFilter) -> Result<u64, StoreError>;

    /// Group every record by `field`, summing totals and completions.
    /// Groups come back sorted by key.
    fn group_totals(&self, field: GroupField) -> Result<Vec<GroupTotals>, StoreError>;

    /// Make sure secondary indexes exist for `fields`. Idempotent.
    fn ensure_indexes(&self, fields: &[IndexField]) -> Result<(), StoreError>;

    /// Cheap round trip proving the store is reachable.
    fn ping(&self) -> Result<(), StoreError>;
}

pub(crate) fn sort_and_limit(tasks: &mut Vec<Task>, order: SortOrder, limit: Option<usize>) {
    match order {
        SortOrder::NewestFirst => tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
    if let Some(limit) = limit {
        tasks.truncate(limit);
    }
}

pub(crate) fn group_tasks<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    field: GroupField,
) -> Vec<GroupTotals> {
    let mut groups: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    for task in tasks {
        let key = match field {
            GroupField::Category => task.category.to_string(),
            GroupField::Priority => task.priority.to_string(),
        };
        let entry = groups.entry(key).or_default();
        entry.0 += 1;
        if task.completed {
            entry.1 += 1;
        }
    }
    groups
        .into_iter()
        .map(|(key, (total, completed))| GroupTotals { key, total, completed })
        .collect()
}
