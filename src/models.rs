//! Data models exposed through the model CRUD tools.
//!
//! A model is described by a [`ModelDefinition`] (typed fields, primary key,
//! description) and served by an implementation of [`ModelCrudsInterface`].
//! [`MemoryModelCruds`] is the bundled implementation; it validates instances
//! against their definition and persists them through a
//! [`crate::storage::StorageProvider`].
//!
//! Models are addressed on the tool surface by their model type,
//! `"<domain>/<ModelName>"` (see [`parse_model_type`]).

pub mod cruds;
pub mod definition;
pub mod memory;
pub mod query;

pub use cruds::{ModelCrudsInterface, ModelInstance, SearchResult, instances_to_obj};
pub use definition::{
    DEFAULT_PRIMARY_KEY, FieldDefinition, FieldKind, MODEL_TYPE_SEPARATOR, ModelDefinition,
    parse_model_type,
};
pub use memory::MemoryModelCruds;
pub use query::{
    BooleanLink, EqualitySymbol, PropertyOptions, PropertyStatement, QueryToken, SearchQuery,
    SortOrder, SortStatement, ValueType,
};
