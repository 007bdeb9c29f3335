use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, Ordering},
        RwLock, RwLockReadGuard, RwLockWriteGuard,
    },
};

use uuid::Uuid;

use crate::{
    task::{Task, TaskChanges, TaskDocument},
    task_store::{
        group_tasks, sort_and_limit, GroupField, GroupTotals, IndexField, SortOrder, StoreError,
        TaskFilter, TaskStore,
    },
};

/// Process-local task store. Backs the `memory` store mode and the tests.
#[derive(Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<HashMap<Uuid, Task>>,
    indexes: RwLock<HashSet<IndexField>>,
    offline: AtomicBool,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate losing the connection: every call fails until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Fields `ensure_indexes` has been asked for.
    #[cfg(test)]
    pub(crate) fn indexed_fields(&self) -> Vec<IndexField> {
        self.indexes
            .read()
            .map(|set| IndexField::ALL.into_iter().filter(|f| set.contains(f)).collect())
            .unwrap_or_default()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is offline".into()));
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, Task>>, StoreError> {
        self.check_online()?;
        self.tasks.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, Task>>, StoreError> {
        self.check_online()?;
        self.tasks.write().map_err(|_| poisoned())
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("task map lock poisoned".into())
}

impl TaskStore for InMemoryTaskStore {
    fn insert_one(&self, id: Option<Uuid>, document: TaskDocument) -> Result<Task, StoreError> {
        let mut tasks = self.write()?;
        let id = id.unwrap_or_else(Uuid::new_v4);
        if tasks.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        let task = document.with_id(id);
        tasks.insert(id, task.clone());
        Ok(task)
    }

    fn find(
        &self,
        filter: &TaskFilter,
        order: SortOrder,
        limit: Option<usize>,
    ) -> Result<Vec<Task>, StoreError> {
        let mut found: Vec<Task> = self
            .read()?
            .values()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect();
        sort_and_limit(&mut found, order, limit);
        Ok(found)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(self.read()?.get(&id).cloned())
    }

    fn update_by_id(&self, id: Uuid, changes: &TaskChanges) -> Result<Option<Task>, StoreError> {
        let mut tasks = self.write()?;
        Ok(tasks.get_mut(&id).map(|task| {
            changes.apply_to(task);
            task.clone()
        }))
    }

    fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.write()?.remove(&id).is_some())
    }

    fn delete_all(&self) -> Result<u64, StoreError> {
        let mut tasks = self.write()?;
        let removed = tasks.len() as u64;
        tasks.clear();
        Ok(removed)
    }

    fn count(&self, filter: &TaskFilter) -> Result<u64, StoreError> {
        Ok(self.read()?.values().filter(|task| filter.matches(task)).count() as u64)
    }

    fn group_totals(&self, field: GroupField) -> Result<Vec<GroupTotals>, StoreError> {
        Ok(group_tasks(self.read()?.values(), field))
    }

    fn ensure_indexes(&self, fields: &[IndexField]) -> Result<(), StoreError> {
        self.check_online()?;
        let mut indexes = self.indexes.write().map_err(|_| poisoned())?;
        indexes.extend(fields.iter().copied());
        Ok(())
    }

    fn ping(&self) -> Result<(), StoreError> {
        self.check_online()
    }
}
