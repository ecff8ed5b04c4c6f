//! The CRUD surface a model exposes to the tool layer.

use crate::error::ModelResult;
use crate::models::definition::ModelDefinition;
use crate::models::query::SearchQuery;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// One stored instance of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelInstance {
    data: Value,
}

impl ModelInstance {
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Read a single property.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Plain JSON projection of the instance.
    pub fn to_obj(&self) -> Value {
        self.data.clone()
    }

    pub fn into_obj(self) -> Value {
        self.data
    }
}

impl From<ModelInstance> for Value {
    fn from(instance: ModelInstance) -> Self {
        instance.data
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    pub instances: Vec<ModelInstance>,
    /// Cursor for the next page, absent on the last page
    pub page: Option<Value>,
}

impl SearchResult {
    /// `{"instances": [...], "page"?: cursor}`
    pub fn to_obj(&self) -> Value {
        let mut object = Map::new();
        object.insert(
            "instances".to_string(),
            Value::Array(self.instances.iter().map(ModelInstance::to_obj).collect()),
        );
        if let Some(page) = &self.page {
            object.insert("page".to_string(), page.clone());
        }
        Value::Object(object)
    }
}

/// CRUD operations of one model.
///
/// Implementations validate data against their [`ModelDefinition`] and report
/// failures as [`crate::error::ModelError::Validation`].
#[async_trait]
pub trait ModelCrudsInterface: Send + Sync {
    /// The model's definition.
    fn definition(&self) -> &ModelDefinition;

    /// Create or replace an instance. Returns the stored instance.
    async fn save(&self, data: Value) -> ModelResult<ModelInstance>;

    /// Fetch an instance by primary key.
    async fn retrieve(&self, id: &str) -> ModelResult<Option<ModelInstance>>;

    /// Delete an instance by primary key.
    async fn delete(&self, id: &str) -> ModelResult<()>;

    async fn search(&self, query: &SearchQuery) -> ModelResult<SearchResult>;

    /// Validate every item, then save them all.
    async fn bulk_insert(&self, items: Vec<Value>) -> ModelResult<Vec<ModelInstance>>;

    /// Delete several instances. Missing ids are skipped.
    async fn bulk_delete(&self, ids: &[String]) -> ModelResult<()>;
}

/// Plain projection of an operation result for the tool layer.
pub fn instances_to_obj(instances: &[ModelInstance]) -> Value {
    json!(instances.iter().map(ModelInstance::to_obj).collect::<Vec<_>>())
}
