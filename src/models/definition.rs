//! Model definitions and field-level validation.

use crate::error::ModelValidationError;
use crate::schema::{JsonType, SchemaDescription};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Default primary key field name.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Separator between domain and model name in a model type.
pub const MODEL_TYPE_SEPARATOR: char = '/';

/// The value type of a model field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldKind {
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<i64>,
    },
    Number,
    Boolean,
    /// RFC 3339 timestamp
    Datetime,
    Uuid,
    /// Arbitrary JSON
    Json,
    Enum { choices: Vec<String> },
    Array { items: Box<FieldKind> },
    /// Primary key of another model, referenced by model type
    ForeignKey { model_type: String },
}

impl FieldKind {
    pub fn text() -> Self {
        Self::Text { max_length: None }
    }

    pub fn integer() -> Self {
        Self::Integer {
            minimum: None,
            maximum: None,
        }
    }

    pub fn enumeration<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum {
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }

    pub fn array(items: FieldKind) -> Self {
        Self::Array {
            items: Box::new(items),
        }
    }

    pub fn foreign_key(model_type: impl Into<String>) -> Self {
        Self::ForeignKey {
            model_type: model_type.into(),
        }
    }

    /// Wire schema for values of this kind.
    pub fn json_schema(&self) -> SchemaDescription {
        match self {
            FieldKind::Text { max_length } => {
                let description = SchemaDescription::of_type(JsonType::String);
                match max_length {
                    Some(max_length) => {
                        description.describe(format!("At most {} characters", max_length))
                    }
                    None => description,
                }
            }
            FieldKind::Integer { minimum, maximum } => SchemaDescription {
                minimum: minimum.map(Into::into),
                maximum: maximum.map(Into::into),
                ..SchemaDescription::of_type(JsonType::Integer)
            },
            FieldKind::Number => SchemaDescription::of_type(JsonType::Number),
            FieldKind::Boolean => SchemaDescription::of_type(JsonType::Boolean),
            FieldKind::Datetime => SchemaDescription {
                format: Some("date-time".to_string()),
                ..SchemaDescription::of_type(JsonType::String)
            },
            FieldKind::Uuid => SchemaDescription {
                format: Some("uuid".to_string()),
                ..SchemaDescription::of_type(JsonType::String)
            },
            FieldKind::Json => SchemaDescription::default(),
            FieldKind::Enum { choices } => SchemaDescription {
                enum_values: Some(choices.iter().cloned().map(Value::String).collect()),
                ..SchemaDescription::of_type(JsonType::String)
            },
            FieldKind::Array { items } => SchemaDescription {
                items: Some(Box::new(items.json_schema())),
                ..SchemaDescription::of_type(JsonType::Array)
            },
            FieldKind::ForeignKey { model_type } => SchemaDescription {
                any_of: Some(vec![
                    SchemaDescription::of_type(JsonType::String),
                    SchemaDescription::of_type(JsonType::Integer),
                ]),
                ..SchemaDescription::default()
            }
            .describe(format!("Primary key of a {} instance", model_type)),
        }
    }

    /// Check one value, pushing messages under `path`.
    fn check(&self, value: &Value, path: &str, errors: &mut BTreeMap<String, Vec<String>>) {
        let message = match self {
            FieldKind::Text { max_length } => match value.as_str() {
                None => Some("Must be a string".to_string()),
                Some(text) => max_length
                    .filter(|max_length| text.chars().count() > *max_length)
                    .map(|max_length| format!("Must be at most {} characters", max_length)),
            },
            FieldKind::Integer { minimum, maximum } => match value.as_i64() {
                None => Some("Must be an integer".to_string()),
                Some(number) => {
                    if let Some(minimum) = minimum.filter(|minimum| number < *minimum) {
                        Some(format!("Must be at least {}", minimum))
                    } else {
                        maximum
                            .filter(|maximum| number > *maximum)
                            .map(|maximum| format!("Must be at most {}", maximum))
                    }
                }
            },
            FieldKind::Number => (!value.is_number()).then(|| "Must be a number".to_string()),
            FieldKind::Boolean => (!value.is_boolean()).then(|| "Must be a boolean".to_string()),
            FieldKind::Datetime => {
                let valid = value
                    .as_str()
                    .is_some_and(|text| chrono::DateTime::parse_from_rfc3339(text).is_ok());
                (!valid).then(|| "Must be an RFC 3339 date-time string".to_string())
            }
            FieldKind::Uuid => {
                let valid = value
                    .as_str()
                    .is_some_and(|text| uuid::Uuid::parse_str(text).is_ok());
                (!valid).then(|| "Must be a UUID".to_string())
            }
            FieldKind::Json => None,
            FieldKind::Enum { choices } => {
                let valid = value
                    .as_str()
                    .is_some_and(|text| choices.iter().any(|choice| choice == text));
                (!valid).then(|| format!("Must be one of: {}", choices.join(", ")))
            }
            FieldKind::Array { items } => match value.as_array() {
                None => Some("Must be an array".to_string()),
                Some(elements) => {
                    for (index, element) in elements.iter().enumerate() {
                        items.check(element, &format!("{}.{}", path, index), errors);
                    }
                    None
                }
            },
            FieldKind::ForeignKey { .. } => {
                let valid = value.is_string() || value.is_i64() || value.is_u64();
                (!valid).then(|| "Must be a string or integer key".to_string())
            }
        };
        if let Some(message) = message {
            errors.entry(path.to_string()).or_default().push(message);
        }
    }
}

/// One field of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn json_schema(&self) -> SchemaDescription {
        let schema = self.kind.json_schema();
        match &self.description {
            Some(description) => schema.describe(description.clone()),
            None => schema,
        }
    }
}

/// Definition of a data model: its name, owning domain and fields.
///
/// Every model has a primary key field, added automatically as an optional
/// text field named `id` unless one is declared explicitly. Saving an instance
/// without a primary key generates a UUID for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDefinition {
    name: String,
    domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    primary_key: String,
    fields: Vec<FieldDefinition>,
}

impl ModelDefinition {
    pub fn new(domain: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            description: None,
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
            fields: vec![
                FieldDefinition::new(DEFAULT_PRIMARY_KEY, FieldKind::text()).describe("Primary key"),
            ],
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Use another field as the primary key. The default `id` field is dropped.
    pub fn with_primary_key(mut self, field: FieldDefinition) -> Self {
        self.fields.retain(|existing| existing.name != self.primary_key);
        self.primary_key = field.name.clone();
        self.fields.insert(0, field);
        self
    }

    /// Add a field, replacing any field of the same name.
    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        match self.fields.iter_mut().find(|existing| existing.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// `"<domain>/<name>"`, the identifier model tools are scoped by.
    pub fn model_type(&self) -> String {
        format!("{}{}{}", self.domain, MODEL_TYPE_SEPARATOR, self.name)
    }

    /// Wire schema of an instance.
    pub fn json_schema(&self) -> SchemaDescription {
        let schema = SchemaDescription::object(self.fields.iter().map(|field| {
            (
                field.name.clone(),
                field.json_schema(),
                field.required && field.name != self.primary_key,
            )
        }));
        match &self.description {
            Some(description) => schema.describe(description.clone()),
            None => schema,
        }
    }

    /// Validate instance data field by field.
    ///
    /// Missing or `null` optional fields are accepted; unknown properties are
    /// rejected. Messages are keyed by field name (`"tags.1"` inside arrays, `""`
    /// when the data is not an object).
    pub fn validate(&self, data: &Value) -> Result<(), ModelValidationError> {
        let Some(object) = data.as_object() else {
            return Err(ModelValidationError::single(
                self.name.clone(),
                "",
                "Instance data must be an object",
            ));
        };

        let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for field in &self.fields {
            match object.get(&field.name) {
                None | Some(Value::Null) => {
                    if field.required && field.name != self.primary_key {
                        errors
                            .entry(field.name.clone())
                            .or_default()
                            .push("Required".to_string());
                    }
                }
                Some(value) => field.kind.check(value, &field.name, &mut errors),
            }
        }
        for key in object.keys() {
            if self.field(key).is_none() {
                errors
                    .entry(key.clone())
                    .or_default()
                    .push("Unknown property".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ModelValidationError::new(self.name.clone(), errors))
        }
    }

    /// Summary used by discovery tools.
    pub fn summary(&self) -> Value {
        json!({
            "modelType": self.model_type(),
            "description": self.description,
        })
    }

    /// Ensure `data` carries a primary key, generating a UUID when absent.
    ///
    /// Returns the key as a string. Non-object data is left untouched and
    /// yields `None`.
    pub fn ensure_primary_key(&self, data: &mut Value) -> Option<String> {
        let object: &mut Map<String, Value> = data.as_object_mut()?;
        match object.get(&self.primary_key) {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => {
                let id = uuid::Uuid::new_v4().to_string();
                object.insert(self.primary_key.clone(), Value::String(id.clone()));
                Some(id)
            }
        }
    }
}

/// Split a model type into `(domain, model)`.
///
/// The split happens at the last separator so scoped domain names such as
/// `@acme/billing` keep their own slash.
pub fn parse_model_type(model_type: &str) -> Option<(&str, &str)> {
    let (domain, model) = model_type.rsplit_once(MODEL_TYPE_SEPARATOR)?;
    if domain.is_empty() || model.is_empty() {
        None
    } else {
        Some((domain, model))
    }
}
