//! Model CRUD backed by a [`StorageProvider`].

use crate::error::{ModelError, ModelResult, ModelValidationError};
use crate::models::cruds::{ModelCrudsInterface, ModelInstance, SearchResult};
use crate::models::definition::ModelDefinition;
use crate::models::query::SearchQuery;
use crate::storage::{InMemoryStorage, ModelTable, StorageProvider};
use async_trait::async_trait;
use log::{debug, trace};
use serde_json::Value;
use std::collections::BTreeMap;

/// CRUD operations for one model, stored in its own `domain/Model` table.
///
/// # Examples
///
/// ```rust
/// use layers_mcp_server::models::{FieldDefinition, FieldKind, MemoryModelCruds, ModelCrudsInterface, ModelDefinition};
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let books = MemoryModelCruds::new(
///     ModelDefinition::new("library", "Book")
///         .with_field(FieldDefinition::new("title", FieldKind::text()).required()),
/// );
/// let saved = books.save(json!({"title": "Dune"})).await.unwrap();
/// let id = saved.get("id").and_then(|id| id.as_str()).unwrap().to_string();
/// assert!(books.retrieve(&id).await.unwrap().is_some());
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MemoryModelCruds<S: StorageProvider = InMemoryStorage> {
    definition: ModelDefinition,
    storage: S,
}

impl MemoryModelCruds<InMemoryStorage> {
    /// Store instances in a private in-memory storage.
    pub fn new(definition: ModelDefinition) -> Self {
        Self::with_storage(definition, InMemoryStorage::new())
    }
}

impl<S: StorageProvider> MemoryModelCruds<S> {
    /// Store instances in the given storage, which may be shared between models.
    pub fn with_storage(definition: ModelDefinition, storage: S) -> Self {
        Self {
            definition,
            storage,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn table(&self) -> ModelTable {
        ModelTable::new(self.definition.domain(), self.definition.name())
    }

    fn storage_error(error: S::Error) -> ModelError {
        ModelError::Storage(error.to_string())
    }

    /// Validate and assign a primary key.
    fn prepare(&self, mut data: Value) -> ModelResult<(String, Value)> {
        self.definition.validate(&data)?;
        let id = self.definition.ensure_primary_key(&mut data).ok_or_else(|| {
            ModelValidationError::single(
                self.definition.name(),
                "",
                "Instance data must be an object",
            )
        })?;
        Ok((id, data))
    }

    async fn store(&self, id: String, data: Value) -> ModelResult<ModelInstance> {
        let stored = self
            .storage
            .put(self.table().key(id), data)
            .await
            .map_err(Self::storage_error)?;
        Ok(ModelInstance::new(stored))
    }
}

#[async_trait]
impl<S: StorageProvider> ModelCrudsInterface for MemoryModelCruds<S> {
    fn definition(&self) -> &ModelDefinition {
        &self.definition
    }

    async fn save(&self, data: Value) -> ModelResult<ModelInstance> {
        let (id, data) = self.prepare(data)?;
        debug!("Saving {} instance {}", self.definition.model_type(), id);
        self.store(id, data).await
    }

    async fn retrieve(&self, id: &str) -> ModelResult<Option<ModelInstance>> {
        let data = self
            .storage
            .get(self.table().key(id))
            .await
            .map_err(Self::storage_error)?;
        Ok(data.map(ModelInstance::new))
    }

    async fn delete(&self, id: &str) -> ModelResult<()> {
        let existed = self
            .storage
            .delete(self.table().key(id))
            .await
            .map_err(Self::storage_error)?;
        if !existed {
            return Err(ModelError::NotFound {
                model: self.definition.name().to_string(),
                id: id.to_string(),
            });
        }
        debug!("Deleted {} instance {}", self.definition.model_type(), id);
        Ok(())
    }

    async fn search(&self, query: &SearchQuery) -> ModelResult<SearchResult> {
        query.validate()?;
        let candidates = self
            .storage
            .scan(&self.table())
            .await
            .map_err(Self::storage_error)?;
        trace!(
            "Searching {} over {} instances",
            self.definition.model_type(),
            candidates.len()
        );

        let (instances, page) = query.apply(candidates)?;
        Ok(SearchResult {
            instances: instances.into_iter().map(ModelInstance::new).collect(),
            page,
        })
    }

    async fn bulk_insert(&self, items: Vec<Value>) -> ModelResult<Vec<ModelInstance>> {
        let mut prepared = Vec::with_capacity(items.len());
        let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (index, item) in items.into_iter().enumerate() {
            match self.prepare(item) {
                Ok(entry) => prepared.push(entry),
                Err(ModelError::Validation(validation)) => {
                    for (key, messages) in validation.keys_to_errors {
                        let key = if key.is_empty() {
                            index.to_string()
                        } else {
                            format!("{}.{}", index, key)
                        };
                        errors.entry(key).or_default().extend(messages);
                    }
                }
                Err(other) => return Err(other),
            }
        }
        if !errors.is_empty() {
            return Err(ModelValidationError::new(self.definition.name(), errors).into());
        }

        let mut saved = Vec::with_capacity(prepared.len());
        for (id, data) in prepared {
            saved.push(self.store(id, data).await?);
        }
        debug!(
            "Bulk inserted {} {} instances",
            saved.len(),
            self.definition.model_type()
        );
        Ok(saved)
    }

    async fn bulk_delete(&self, ids: &[String]) -> ModelResult<()> {
        for id in ids {
            self.storage
                .delete(self.table().key(id.clone()))
                .await
                .map_err(Self::storage_error)?;
        }
        Ok(())
    }
}
