//! In-memory [`StorageProvider`].
//!
//! Tables are `BTreeMap`s so scans come out in id order without sorting.
//! Clones share the same underlying tables, which lets several models (or
//! several registry rebuilds) see one store.

use crate::storage::{DocumentKey, ModelTable, StorageError, StorageProvider};
use log::trace;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

type Table = BTreeMap<String, Value>;

#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    tables: Arc<RwLock<HashMap<ModelTable, Table>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table and document counts, for tests and debugging.
    pub async fn stats(&self) -> StorageStats {
        let tables = self.tables.read().await;
        StorageStats {
            tables: tables.values().filter(|table| !table.is_empty()).count(),
            documents: tables.values().map(BTreeMap::len).sum(),
        }
    }
}

impl StorageProvider for InMemoryStorage {
    type Error = StorageError;

    async fn put(&self, key: DocumentKey, document: Value) -> Result<Value, Self::Error> {
        if !document.is_object() {
            return Err(StorageError::not_an_object(&key, &document));
        }
        trace!("put {}", key);
        self.tables
            .write()
            .await
            .entry(key.table().clone())
            .or_default()
            .insert(key.id().to_string(), document.clone());
        Ok(document)
    }

    async fn get(&self, key: DocumentKey) -> Result<Option<Value>, Self::Error> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(key.table())
            .and_then(|table| table.get(key.id()))
            .cloned())
    }

    async fn delete(&self, key: DocumentKey) -> Result<bool, Self::Error> {
        let mut tables = self.tables.write().await;
        let removed = tables
            .get_mut(key.table())
            .is_some_and(|table| table.remove(key.id()).is_some());
        if removed {
            trace!("deleted {}", key);
        }
        Ok(removed)
    }

    async fn scan(&self, table: &ModelTable) -> Result<Vec<Value>, Self::Error> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .map(|documents| documents.values().cloned().collect())
            .unwrap_or_default())
    }
}

/// Snapshot of what an [`InMemoryStorage`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageStats {
    /// Tables holding at least one document
    pub tables: usize,
    pub documents: usize,
}
