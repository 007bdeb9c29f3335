//! Request-level task operations over a `TaskStore`.
//!
//! Owns the validation that serde can't express (blank titles, malformed ids,
//! empty updates) and stamps `createdAt` / `updatedAt` from the injected clock.

use std::{collections::HashSet, sync::Arc};

use thiserror::Error;
use uuid::Uuid;

use crate::{
    clock::Clock,
    create_task_request::CreateTaskRequest,
    delete_task_response::DeleteTaskResponse,
    iso_timestamp::IsoTimestamp,
    sync_request::SyncRequest,
    sync_response::SyncResponse,
    task::{Task, TaskChanges, TaskDocument},
    task_category::TaskCategory,
    task_list_query::TaskListQuery,
    task_priority::TaskPriority,
    task_store::{SortOrder, StoreError, TaskFilter, TaskStore},
    update_task_request::UpdateTaskRequest,
    validation::{FieldError, InvalidEnumValue},
};

pub const DEFAULT_LIST_LIMIT: usize = 100;
pub const MAX_LIST_LIMIT: usize = 1000;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("invalid task id {0:?}")]
    InvalidId(String),
    #[error("no fields to update")]
    EmptyUpdate,
    #[error(transparent)]
    InvalidValue(#[from] InvalidEnumValue),
    #[error("task {0} not found")]
    NotFound(Uuid),
    #[error("failed to {action}: {source}")]
    Store {
        action: &'static str,
        #[source]
        source: StoreError,
    },
}

fn store_failure(action: &'static str) -> impl FnOnce(StoreError) -> TaskError {
    move |source| TaskError::Store { action, source }
}

pub fn parse_task_id(raw: &str) -> Result<Uuid, TaskError> {
    Uuid::parse_str(raw).map_err(|_| TaskError::InvalidId(raw.to_string()))
}

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
    default_limit: usize,
    max_limit: usize,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            default_limit: DEFAULT_LIST_LIMIT,
            max_limit: MAX_LIST_LIMIT,
        }
    }

    /// Override the list limits. The default is clamped into `1..=max`.
    pub fn with_limits(mut self, default_limit: usize, max_limit: usize) -> Self {
        self.max_limit = max_limit.max(1);
        self.default_limit = default_limit.clamp(1, self.max_limit);
        self
    }

    fn now(&self) -> IsoTimestamp {
        IsoTimestamp::from_naive(self.clock.now())
    }

    pub fn create(&self, request: CreateTaskRequest) -> Result<Task, TaskError> {
        let mut errors = Vec::new();
        if request.title.trim().is_empty() {
            errors.push(FieldError::new("title", "must not be empty"));
        }
        if request.due_date.is_blank() {
            errors.push(FieldError::new("dueDate", "must not be empty"));
        }
        if !errors.is_empty() {
            return Err(TaskError::Validation(errors));
        }

        let now = self.now();
        let document = TaskDocument {
            title: request.title,
            due_date: request.due_date,
            priority: request.priority,
            category: request.category,
            completed: false,
            created_at: now.clone(),
            updated_at: Some(now),
            user_id: None,
            notification_id: request.notification_id,
        };
        let task = self
            .store
            .insert_one(None, document)
            .map_err(store_failure("create task"))?;
        tracing::debug!(id = %task.id, "task created");
        Ok(task)
    }

    pub fn list(&self, query: &TaskListQuery) -> Result<Vec<Task>, TaskError> {
        let filter = TaskFilter {
            category: query.category.as_deref().and_then(|c| c.parse().ok()),
            priority: query.priority.as_deref().and_then(|p| p.parse().ok()),
            completed: query.completed.as_deref().and_then(parse_flag),
            ..TaskFilter::all()
        };
        let limit = self.resolve_limit(query.limit.as_deref());

        self.store
            .find(&filter, SortOrder::NewestFirst, Some(limit))
            .map_err(store_failure("list tasks"))
    }

    fn resolve_limit(&self, raw: Option<&str>) -> usize {
        match raw.and_then(|l| l.trim().parse::<i64>().ok()) {
            Some(limit) if limit > 0 => usize::try_from(limit)
                .unwrap_or(self.max_limit)
                .min(self.max_limit),
            _ => self.default_limit,
        }
    }

    pub fn get(&self, raw_id: &str) -> Result<Task, TaskError> {
        let id = parse_task_id(raw_id)?;
        self.store
            .find_by_id(id)
            .map_err(store_failure("load task"))?
            .ok_or(TaskError::NotFound(id))
    }

    pub fn update(&self, raw_id: &str, request: UpdateTaskRequest) -> Result<Task, TaskError> {
        let id = parse_task_id(raw_id)?;

        let mut errors = Vec::new();
        if request.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
            errors.push(FieldError::new("title", "must not be empty"));
        }
        if request.due_date.as_deref().is_some_and(|due| due.trim().is_empty()) {
            errors.push(FieldError::new("dueDate", "must not be empty"));
        }
        if !errors.is_empty() {
            return Err(TaskError::Validation(errors));
        }

        let mut changes = TaskChanges {
            title: request.title,
            due_date: request.due_date.map(IsoTimestamp::new),
            priority: request.priority.as_deref().map(str::parse::<TaskPriority>).transpose()?,
            category: request.category.as_deref().map(str::parse::<TaskCategory>).transpose()?,
            completed: request.completed,
            notification_id: request.notification_id,
            updated_at: None,
        };
        if changes.is_empty() {
            return Err(TaskError::EmptyUpdate);
        }
        changes.updated_at = Some(self.now());

        self.store
            .update_by_id(id, &changes)
            .map_err(store_failure("update task"))?
            .ok_or(TaskError::NotFound(id))
    }

    pub fn delete(&self, raw_id: &str) -> Result<DeleteTaskResponse, TaskError> {
        let id = parse_task_id(raw_id)?;
        if self.store.delete_by_id(id).map_err(store_failure("delete task"))? {
            Ok(DeleteTaskResponse::new(id))
        } else {
            Err(TaskError::NotFound(id))
        }
    }

    /// Replace the whole collection with `request.tasks`.
    ///
    /// The batch is checked first, so a rejected sync leaves the store as it
    /// was. After that the wipe and the re-inserts are separate store calls:
    /// readers can see an empty collection and two syncs can interleave.
    pub fn sync(&self, request: SyncRequest) -> Result<SyncResponse, TaskError> {
        let ids = check_sync_batch(&request)?;
        let now = self.now();

        let removed = self.store.delete_all().map_err(store_failure("clear tasks"))?;

        let mut tasks = Vec::with_capacity(request.tasks.len());
        for (incoming, id) in request.tasks.into_iter().zip(ids) {
            let document = TaskDocument {
                title: incoming.title,
                due_date: incoming.due_date,
                priority: incoming.priority,
                category: incoming.category,
                completed: incoming.completed,
                created_at: incoming.created_at,
                updated_at: Some(now.clone()),
                user_id: incoming.user_id,
                notification_id: incoming.notification_id,
            };
            let task = self
                .store
                .insert_one(id, document)
                .map_err(store_failure("insert synced task"))?;
            tasks.push(task);
        }

        tracing::info!(
            removed,
            inserted = tasks.len(),
            last_sync_time = request.last_sync_time.as_deref().unwrap_or("-"),
            "tasks synced"
        );
        Ok(SyncResponse {
            tasks,
            conflicts: Vec::new(),
            sync_time: now,
        })
    }
}

/// Accepts the usual spellings of a boolean query flag.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Ids to insert under, one per incoming task. Blank titles and a valid id
/// named twice are rejected.
fn check_sync_batch(request: &SyncRequest) -> Result<Vec<Option<Uuid>>, TaskError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut ids = Vec::with_capacity(request.tasks.len());

    for (index, task) in request.tasks.iter().enumerate() {
        if task.title.trim().is_empty() {
            errors.push(FieldError::new(format!("tasks[{index}].title"), "must not be empty"));
        }
        let id = task.id.as_deref().and_then(|raw| Uuid::parse_str(raw).ok());
        if let Some(id) = id {
            if !seen.insert(id) {
                errors.push(FieldError::new(format!("tasks[{index}].id"), "duplicate id in batch"));
            }
        }
        ids.push(id);
    }

    if errors.is_empty() {
        Ok(ids)
    } else {
        Err(TaskError::Validation(errors))
    }
}
