//! Document storage for model instances.
//!
//! A [`StorageProvider`] keeps JSON documents in per-model tables addressed by
//! [`ModelTable`] (`domain/Model`) and an instance id. It has no notion of
//! fields, validation or queries; [`crate::models::MemoryModelCruds`] layers
//! those on top.
//!
//! ```rust
//! use layers_mcp_server::storage::{InMemoryStorage, ModelTable, StorageProvider};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let storage = InMemoryStorage::new();
//! let books = ModelTable::new("library", "Book");
//!
//! storage.put(books.key("b-1"), json!({"id": "b-1", "title": "Dune"})).await.unwrap();
//! assert_eq!(storage.scan(&books).await.unwrap().len(), 1);
//! assert!(storage.delete(books.key("b-1")).await.unwrap());
//! # });
//! ```

pub mod errors;
pub mod in_memory;

pub use errors::StorageError;
pub use in_memory::{InMemoryStorage, StorageStats};

use serde_json::Value;
use std::fmt;
use std::future::Future;

/// The table holding every instance of one model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelTable {
    domain: String,
    model: String,
}

impl ModelTable {
    pub fn new(domain: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            model: model.into(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Address of one instance in this table.
    pub fn key(&self, id: impl Into<String>) -> DocumentKey {
        DocumentKey {
            table: self.clone(),
            id: id.into(),
        }
    }
}

impl fmt::Display for ModelTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.domain, self.model)
    }
}

/// Address of one stored instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    table: ModelTable,
    id: String,
}

impl DocumentKey {
    pub fn table(&self) -> &ModelTable {
        &self.table
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.table, self.id)
    }
}

/// Persistence for model instance documents.
///
/// Create and update are one operation: `put` replaces whatever is stored at
/// the key. Absence is not an error here; `get` yields `None` and `delete`
/// yields `false`.
pub trait StorageProvider: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store an object document and return it.
    fn put(
        &self,
        key: DocumentKey,
        document: Value,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send;

    fn get(
        &self,
        key: DocumentKey,
    ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send;

    /// Remove a document. Returns whether it existed.
    fn delete(&self, key: DocumentKey) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Every document of a table, ordered by id.
    fn scan(
        &self,
        table: &ModelTable,
    ) -> impl Future<Output = Result<Vec<Value>, Self::Error>> + Send;
}
