//! Task documents in a redb file.
//!
//! Each task is one JSON document in `tasks`, keyed by its 16 id bytes.
//! Secondary indexes are multimap tables from a field's string value to task
//! ids; `task_indexes` records which ones exist. Every write keeps the
//! registered indexes in step inside the same transaction.

use std::{path::Path, sync::Arc};
#[cfg(feature = "profile")]
use std::time::Instant;

use redb::{
    Database, MultimapTableDefinition, ReadTransaction, ReadableTable, TableDefinition,
    WriteTransaction,
};
use uuid::Uuid;

use crate::{
    iso_timestamp::TimeRange,
    task::{Task, TaskChanges, TaskDocument},
    task_store::{
        group_tasks, sort_and_limit, GroupField, GroupTotals, IndexField, SortOrder, StoreError,
        TaskFilter, TaskStore,
    },
};

const TASKS_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("tasks");
const INDEX_REGISTRY: TableDefinition<&str, u8> = TableDefinition::new("task_indexes");

const CREATED_AT_INDEX: MultimapTableDefinition<&str, &[u8]> =
    MultimapTableDefinition::new("task_idx_created_at");
const DUE_DATE_INDEX: MultimapTableDefinition<&str, &[u8]> =
    MultimapTableDefinition::new("task_idx_due_date");
const CATEGORY_INDEX: MultimapTableDefinition<&str, &[u8]> =
    MultimapTableDefinition::new("task_idx_category");
const PRIORITY_INDEX: MultimapTableDefinition<&str, &[u8]> =
    MultimapTableDefinition::new("task_idx_priority");
const COMPLETED_INDEX: MultimapTableDefinition<&str, &[u8]> =
    MultimapTableDefinition::new("task_idx_completed");

type IndexDefinition = MultimapTableDefinition<'static, &'static str, &'static [u8]>;

fn index_definition(field: IndexField) -> IndexDefinition {
    match field {
        IndexField::CreatedAt => CREATED_AT_INDEX,
        IndexField::DueDate => DUE_DATE_INDEX,
        IndexField::Category => CATEGORY_INDEX,
        IndexField::Priority => PRIORITY_INDEX,
        IndexField::Completed => COMPLETED_INDEX,
    }
}

/// Thin handle to the redb file. Cloneable (Arc inside).
#[derive(Clone)]
pub struct DataContext {
    db: Arc<Database>,
}

impl DataContext {
    /// Open (or create) the database at `path` and make sure the base
    /// tables exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path)?;

        let txn = db.begin_write()?;
        {
            let _ = txn.open_table(TASKS_TABLE)?;
            let _ = txn.open_table(INDEX_REGISTRY)?;
        }
        txn.commit()?;

        Ok(DataContext { db: Arc::new(db) })
    }

    /// Indexes that exist and are being maintained.
    #[cfg(test)]
    pub(crate) fn registered_indexes(&self) -> Result<Vec<IndexField>, StoreError> {
        let txn = self.db.begin_read()?;
        let registry = txn.open_table(INDEX_REGISTRY)?;
        collect_registered(&registry)
    }

    fn timed<T>(
        &self,
        operation: &'static str,
        run: impl FnOnce() -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        #[cfg(feature = "profile")]
        let started = Instant::now();
        let result = run();
        #[cfg(feature = "profile")]
        tracing::debug!(
            operation,
            elapsed_us = started.elapsed().as_micros() as u64,
            "store operation finished"
        );
        #[cfg(not(feature = "profile"))]
        let _ = operation;
        result
    }

    fn load_matching(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let txn = self.db.begin_read()?;
        let registered = {
            let registry = txn.open_table(INDEX_REGISTRY)?;
            collect_registered(&registry)?
        };
        let tasks = txn.open_table(TASKS_TABLE)?;

        let mut matching = Vec::new();
        match plan_lookup(filter, &registered) {
            Some(lookup) => {
                let mut ids = candidate_ids(&txn, &lookup)?;
                ids.sort();
                ids.dedup();
                for id in ids {
                    if let Some(data) = tasks.get(id.as_bytes().as_slice())? {
                        let task = decode(data.value())?;
                        if filter.matches(&task) {
                            matching.push(task);
                        }
                    }
                }
            }
            None => {
                for entry in tasks.iter()? {
                    let (_, value) = entry?;
                    let task = decode(value.value())?;
                    if filter.matches(&task) {
                        matching.push(task);
                    }
                }
            }
        }
        Ok(matching)
    }
}

impl TaskStore for DataContext {
    fn insert_one(&self, id: Option<Uuid>, document: TaskDocument) -> Result<Task, StoreError> {
        self.timed("insert_one", || {
            let txn = self.db.begin_write()?;
            let registered = registered_in(&txn)?;
            let task = {
                let mut tasks = txn.open_table(TASKS_TABLE)?;
                let id = id.unwrap_or_else(Uuid::new_v4);
                if tasks.get(id.as_bytes().as_slice())?.is_some() {
                    return Err(StoreError::DuplicateId(id));
                }
                let task = document.with_id(id);
                let bytes = serde_json::to_vec(&task)?;
                tasks.insert(task.id.as_bytes().as_slice(), bytes.as_slice())?;
                task
            };
            index_task(&txn, &registered, &task)?;
            txn.commit()?;
            Ok(task)
        })
    }

    fn find(
        &self,
        filter: &TaskFilter,
        order: SortOrder,
        limit: Option<usize>,
    ) -> Result<Vec<Task>, StoreError> {
        self.timed("find", || {
            let mut tasks = self.load_matching(filter)?;
            sort_and_limit(&mut tasks, order, limit);
            Ok(tasks)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        self.timed("find_by_id", || {
            let txn = self.db.begin_read()?;
            let tasks = txn.open_table(TASKS_TABLE)?;
            match tasks.get(id.as_bytes().as_slice())? {
                Some(data) => Ok(Some(decode(data.value())?)),
                None => Ok(None),
            }
        })
    }

    fn update_by_id(&self, id: Uuid, changes: &TaskChanges) -> Result<Option<Task>, StoreError> {
        self.timed("update_by_id", || {
            let txn = self.db.begin_write()?;
            let registered = registered_in(&txn)?;
            let (before, after) = {
                let mut tasks = txn.open_table(TASKS_TABLE)?;
                let before = match tasks.get(id.as_bytes().as_slice())? {
                    Some(data) => decode(data.value())?,
                    None => return Ok(None),
                };
                let mut after = before.clone();
                changes.apply_to(&mut after);
                let bytes = serde_json::to_vec(&after)?;
                tasks.insert(id.as_bytes().as_slice(), bytes.as_slice())?;
                (before, after)
            };
            unindex_task(&txn, &registered, &before)?;
            index_task(&txn, &registered, &after)?;
            txn.commit()?;
            Ok(Some(after))
        })
    }

    fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        self.timed("delete_by_id", || {
            let txn = self.db.begin_write()?;
            let registered = registered_in(&txn)?;
            let removed = {
                let mut tasks = txn.open_table(TASKS_TABLE)?;
                let removed = tasks.remove(id.as_bytes().as_slice())?;
                match removed {
                    Some(data) => decode(data.value())?,
                    None => return Ok(false),
                }
            };
            unindex_task(&txn, &registered, &removed)?;
            txn.commit()?;
            Ok(true)
        })
    }

    fn delete_all(&self) -> Result<u64, StoreError> {
        self.timed("delete_all", || {
            let txn = self.db.begin_write()?;
            let registered = registered_in(&txn)?;
            let removed = {
                let tasks = txn.open_table(TASKS_TABLE)?;
                let mut count = 0u64;
                for entry in tasks.iter()? {
                    entry?;
                    count += 1;
                }
                count
            };

            // Dropping and recreating is cheaper than removing row by row.
            txn.delete_table(TASKS_TABLE)?;
            let _ = txn.open_table(TASKS_TABLE)?;
            for field in registered {
                txn.delete_multimap_table(index_definition(field))?;
                let _ = txn.open_multimap_table(index_definition(field))?;
            }
            txn.commit()?;
            Ok(removed)
        })
    }

    fn count(&self, filter: &TaskFilter) -> Result<u64, StoreError> {
        self.timed("count", || Ok(self.load_matching(filter)?.len() as u64))
    }

    fn group_totals(&self, field: GroupField) -> Result<Vec<GroupTotals>, StoreError> {
        self.timed("group_totals", || {
            let tasks = self.load_matching(&TaskFilter::all())?;
            Ok(group_tasks(&tasks, field))
        })
    }

    fn ensure_indexes(&self, fields: &[IndexField]) -> Result<(), StoreError> {
        self.timed("ensure_indexes", || {
            let txn = self.db.begin_write()?;
            let mut created = Vec::new();
            {
                let mut registry = txn.open_table(INDEX_REGISTRY)?;
                let registered = collect_registered(&registry)?;
                let tasks = txn.open_table(TASKS_TABLE)?;

                for &field in fields {
                    if registered.contains(&field) || created.contains(&field) {
                        continue;
                    }
                    // Backfill from the records already on disk.
                    let mut index = txn.open_multimap_table(index_definition(field))?;
                    for entry in tasks.iter()? {
                        let (_, value) = entry?;
                        let task = decode(value.value())?;
                        index.insert(field.key_of(&task).as_str(), task.id.as_bytes().as_slice())?;
                    }
                    registry.insert(field.name(), 1u8)?;
                    created.push(field);
                }
            }
            txn.commit()?;

            if !created.is_empty() {
                let names: Vec<_> = created.iter().map(|f| f.name()).collect();
                tracing::debug!(?names, "created task indexes");
            }
            Ok(())
        })
    }

    fn ping(&self) -> Result<(), StoreError> {
        let txn = self.db.begin_read()?;
        let _ = txn.open_table(TASKS_TABLE)?;
        Ok(())
    }
}

// ── Index helpers ──────────────────────────────────────────────

enum Lookup {
    Exact(IndexField, String),
    Range(IndexField, TimeRange),
}

/// Pick one registered index that narrows `filter`, preferring exact matches.
fn plan_lookup(filter: &TaskFilter, registered: &[IndexField]) -> Option<Lookup> {
    let indexed = |field: IndexField| registered.contains(&field);

    if let Some(category) = filter.category.filter(|_| indexed(IndexField::Category)) {
        return Some(Lookup::Exact(IndexField::Category, category.to_string()));
    }
    if let Some(priority) = filter.priority.filter(|_| indexed(IndexField::Priority)) {
        return Some(Lookup::Exact(IndexField::Priority, priority.to_string()));
    }
    if let Some(completed) = filter.completed.filter(|_| indexed(IndexField::Completed)) {
        return Some(Lookup::Exact(IndexField::Completed, completed.to_string()));
    }
    if let Some(range) = filter.due_date.as_ref().filter(|_| indexed(IndexField::DueDate)) {
        return Some(Lookup::Range(IndexField::DueDate, range.clone()));
    }
    if let Some(range) = filter.created_at.as_ref().filter(|_| indexed(IndexField::CreatedAt)) {
        return Some(Lookup::Range(IndexField::CreatedAt, range.clone()));
    }
    None
}

fn candidate_ids(txn: &ReadTransaction, lookup: &Lookup) -> Result<Vec<Uuid>, StoreError> {
    let mut ids = Vec::new();
    match lookup {
        Lookup::Exact(field, key) => {
            let index = txn.open_multimap_table(index_definition(*field))?;
            for value in index.get(key.as_str())? {
                ids.push(decode_id(value?.value())?);
            }
        }
        Lookup::Range(field, range) => {
            let index = txn.open_multimap_table(index_definition(*field))?;
            for entry in index.range::<&str>(range.as_str_bounds())? {
                let (_, values) = entry?;
                for value in values {
                    ids.push(decode_id(value?.value())?);
                }
            }
        }
    }
    Ok(ids)
}

fn registered_in(txn: &WriteTransaction) -> Result<Vec<IndexField>, StoreError> {
    let registry = txn.open_table(INDEX_REGISTRY)?;
    collect_registered(&registry)
}

fn collect_registered(
    registry: &impl ReadableTable<&'static str, u8>,
) -> Result<Vec<IndexField>, StoreError> {
    let mut fields = Vec::new();
    for entry in registry.iter()? {
        let (name, _) = entry?;
        if let Some(field) = IndexField::from_name(name.value()) {
            fields.push(field);
        }
    }
    Ok(fields)
}

fn index_task(txn: &WriteTransaction, fields: &[IndexField], task: &Task) -> Result<(), StoreError> {
    for &field in fields {
        let mut index = txn.open_multimap_table(index_definition(field))?;
        index.insert(field.key_of(task).as_str(), task.id.as_bytes().as_slice())?;
    }
    Ok(())
}

fn unindex_task(txn: &WriteTransaction, fields: &[IndexField], task: &Task) -> Result<(), StoreError> {
    for &field in fields {
        let mut index = txn.open_multimap_table(index_definition(field))?;
        index.remove(field.key_of(task).as_str(), task.id.as_bytes().as_slice())?;
    }
    Ok(())
}

fn decode(bytes: &[u8]) -> Result<Task, StoreError> {
    Ok(serde_json::from_slice(bytes)?)
}

fn decode_id(bytes: &[u8]) -> Result<Uuid, StoreError> {
    Uuid::from_slice(bytes).map_err(|e| StoreError::Codec(e.to_string()))
}

// redb 2.x has many error types. Blanket them all into StoreError::Backend.
macro_rules! from_redb {
    ($($t:ty),*) => {
        $(impl From<$t> for StoreError {
            fn from(e: $t) -> Self { StoreError::Backend(e.to_string()) }
        })*
    };
}

from_redb!(
    redb::Error,
    redb::DatabaseError,
    redb::TableError,
    redb::TransactionError,
    redb::StorageError,
    redb::CommitError
);

// ── Tests ──────────────────────────────────────────────────────
