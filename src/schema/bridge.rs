//! Conversion between native schema nodes and wire descriptions.
//!
//! [`to_description`] is total and faithful: every [`SchemaNode`] has exactly one
//! [`SchemaDescription`]. [`to_schema_node`] reads caller-declared JSON Schema and
//! is best-effort: numeric bounds are dropped and anything it does not recognize
//! becomes a permissive node. Neither direction fails.

use super::description::{AdditionalProperties, JsonType, SchemaDescription, number_from_f64};
use super::node::{SchemaKind, SchemaNode, StringFormat};
use log::trace;
use serde_json::{Map, Value};

/// Describe a native schema node in wire form.
pub fn to_description(node: &SchemaNode) -> SchemaDescription {
    let mut described = match node.kind() {
        SchemaKind::Optional(inner) | SchemaKind::Default(inner, _) => to_description(inner),
        SchemaKind::Nullable(inner) => {
            let mut described = to_description(inner);
            described.nullable = Some(true);
            described
        }
        SchemaKind::String(checks) => SchemaDescription {
            format: checks.format.map(|f| f.as_str().to_string()),
            ..SchemaDescription::of_type(JsonType::String)
        },
        SchemaKind::Number(checks) => SchemaDescription {
            minimum: checks.minimum.and_then(number_from_f64),
            maximum: checks.maximum.and_then(number_from_f64),
            multiple_of: checks.multiple_of.and_then(number_from_f64),
            ..SchemaDescription::of_type(if checks.integer {
                JsonType::Integer
            } else {
                JsonType::Number
            })
        },
        SchemaKind::Boolean => SchemaDescription::of_type(JsonType::Boolean),
        SchemaKind::Literal(value) => literal_description(value),
        SchemaKind::Enum(values) => enum_description(values),
        SchemaKind::Array(items) => SchemaDescription {
            items: Some(Box::new(to_description(items))),
            ..SchemaDescription::of_type(JsonType::Array)
        },
        SchemaKind::Record(values) => SchemaDescription {
            additional_properties: Some(AdditionalProperties::Schema(Box::new(to_description(
                values,
            )))),
            ..SchemaDescription::of_type(JsonType::Object)
        },
        SchemaKind::Object(fields) => SchemaDescription::object(
            fields
                .iter()
                .map(|(name, field)| (name.clone(), to_description(field), !field.is_optional())),
        ),
        SchemaKind::Union(members) => SchemaDescription {
            any_of: Some(members.iter().map(to_description).collect()),
            ..SchemaDescription::default()
        },
        SchemaKind::Intersection(members) => SchemaDescription {
            all_of: Some(members.iter().map(to_description).collect()),
            ..SchemaDescription::default()
        },
        SchemaKind::Void => SchemaDescription::of_type(JsonType::Null),
        SchemaKind::Any => SchemaDescription::default(),
    };

    // The innermost description wins; wrappers only fill a gap.
    if described.description.is_none() {
        described.description = node.description().map(str::to_string);
    }
    described
}

fn literal_description(value: &Value) -> SchemaDescription {
    let json_type = match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => {
            Some(JsonType::of(value))
        }
        _ => None,
    };
    SchemaDescription {
        json_type,
        const_value: Some(value.clone()),
        ..SchemaDescription::default()
    }
}

fn enum_description(values: &[Value]) -> SchemaDescription {
    if !values.is_empty() && values.iter().all(Value::is_string) {
        return SchemaDescription {
            enum_values: Some(values.to_vec()),
            ..SchemaDescription::of_type(JsonType::String)
        };
    }
    match values {
        [single] => literal_description(single),
        _ => SchemaDescription {
            any_of: Some(values.iter().map(literal_description).collect()),
            ..SchemaDescription::default()
        },
    }
}

/// Build a native node from a caller-declared JSON Schema.
///
/// Anything that is not a JSON object (including boolean schemas) yields
/// [`SchemaNode::any`].
pub fn to_schema_node(schema: &Value) -> SchemaNode {
    let Some(object) = schema.as_object() else {
        trace!("Non-object schema fragment treated as permissive: {}", schema);
        return SchemaNode::any();
    };

    let mut node = convert(object);
    if object.get("nullable").and_then(Value::as_bool) == Some(true) {
        node = node.nullable();
    }
    if node.description().is_none() {
        if let Some(description) = object.get("description").and_then(Value::as_str) {
            node = node.describe(description);
        }
    }
    node
}

/// Convenience wrapper for typed descriptions.
pub fn description_to_schema_node(description: &SchemaDescription) -> SchemaNode {
    to_schema_node(&description.to_value())
}

fn convert(object: &Map<String, Value>) -> SchemaNode {
    for combinator in ["anyOf", "oneOf"] {
        if let Some(members) = non_empty_array(object, combinator) {
            return collapse_union(members.iter().map(to_schema_node).collect());
        }
    }

    if let Some(members) = object.get("allOf").and_then(Value::as_array) {
        let mut converted: Vec<SchemaNode> = members.iter().map(to_schema_node).collect();
        return match converted.len() {
            0 => SchemaNode::any(),
            1 => converted.remove(0),
            _ => SchemaNode::intersection(converted),
        };
    }

    if let Some(value) = object.get("const") {
        return SchemaNode::literal(value.clone());
    }

    let enum_values = non_empty_array(object, "enum");

    match object.get("type") {
        Some(Value::String(json_type)) => convert_typed(json_type, object, enum_values),
        Some(Value::Array(types)) => collapse_union(
            types
                .iter()
                .filter_map(Value::as_str)
                .map(|json_type| convert_typed(json_type, object, enum_values))
                .collect(),
        ),
        _ if object.contains_key("properties") => convert_object(object),
        _ => enum_or_any(enum_values, false),
    }
}

fn convert_typed(
    json_type: &str,
    object: &Map<String, Value>,
    enum_values: Option<&Vec<Value>>,
) -> SchemaNode {
    match json_type {
        "string" => match enum_values {
            Some(values) => enum_node(values, true),
            None => match object
                .get("format")
                .and_then(Value::as_str)
                .and_then(StringFormat::parse)
            {
                Some(StringFormat::DateTime) => SchemaNode::datetime(),
                None => SchemaNode::string(),
            },
        },
        "number" => enum_or(enum_values, SchemaNode::number()),
        "integer" => enum_or(enum_values, SchemaNode::integer()),
        "boolean" => enum_or(enum_values, SchemaNode::boolean()),
        "array" => SchemaNode::array(
            object
                .get("items")
                .map(to_schema_node)
                .unwrap_or_else(SchemaNode::any),
        ),
        "object" => convert_object(object),
        "null" => SchemaNode::void(),
        other => {
            trace!("Unrecognized schema type '{}' treated as permissive", other);
            enum_or_any(enum_values, false)
        }
    }
}

fn convert_object(object: &Map<String, Value>) -> SchemaNode {
    let Some(properties) = object.get("properties").and_then(Value::as_object) else {
        return match object.get("additionalProperties") {
            Some(schema @ Value::Object(_)) => SchemaNode::record(to_schema_node(schema)),
            _ => SchemaNode::record(SchemaNode::any()),
        };
    };

    let required: Vec<&str> = object
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    SchemaNode::object(properties.iter().map(|(name, schema)| {
        let field = to_schema_node(schema);
        let field = if required.contains(&name.as_str()) {
            field
        } else {
            field.optional()
        };
        (name.clone(), field)
    }))
}

fn enum_or(enum_values: Option<&Vec<Value>>, base: SchemaNode) -> SchemaNode {
    match enum_values {
        Some(values) => enum_node(values, false),
        None => base,
    }
}

fn enum_or_any(enum_values: Option<&Vec<Value>>, base_is_string: bool) -> SchemaNode {
    match enum_values {
        Some(values) => enum_node(values, base_is_string),
        None => SchemaNode::any(),
    }
}

fn enum_node(values: &[Value], base_is_string: bool) -> SchemaNode {
    if base_is_string && values.iter().all(Value::is_string) {
        return SchemaNode::enumeration(values.iter().cloned());
    }
    collapse_union(values.iter().cloned().map(SchemaNode::literal).collect())
}

fn collapse_union(mut members: Vec<SchemaNode>) -> SchemaNode {
    match members.len() {
        0 => SchemaNode::any(),
        1 => members.remove(0),
        _ => SchemaNode::union(members),
    }
}

fn non_empty_array<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Vec<Value>> {
    object
        .get(key)
        .and_then(Value::as_array)
        .filter(|values| !values.is_empty())
}
