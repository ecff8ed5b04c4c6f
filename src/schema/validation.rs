//! Value validation against native schema nodes.
//!
//! Errors are collected per location rather than stopping at the first failure,
//! keyed by dot-path (`""` for the root, `"items.0.name"` for nested values).

use super::node::{NumberChecks, SchemaKind, SchemaNode, StringFormat};
use crate::error::ModelValidationError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Validation messages keyed by value path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl SchemaErrors {
    fn push(&mut self, path: &str, message: impl Into<String>) {
        self.errors
            .entry(path.to_string())
            .or_default()
            .push(message.into());
    }

    fn extend(&mut self, other: SchemaErrors) {
        for (path, messages) in other.errors {
            self.errors.entry(path).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages keyed by path.
    pub fn keys_to_errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    /// Convert into a model validation error for the named model or tool.
    pub fn into_validation_error(self, model_name: impl Into<String>) -> ModelValidationError {
        ModelValidationError::new(model_name, self.errors)
    }
}

impl SchemaNode {
    /// Validate a value against this schema.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaErrors> {
        let mut errors = SchemaErrors::default();
        check(self, value, "", &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Whether the value satisfies this schema.
    pub fn accepts(&self, value: &Value) -> bool {
        self.validate(value).is_ok()
    }

    /// Whether an enclosing object may leave this field out entirely.
    fn accepts_missing(&self) -> bool {
        match self.kind() {
            SchemaKind::Optional(_) | SchemaKind::Default(_, _) | SchemaKind::Void => true,
            SchemaKind::Any => true,
            SchemaKind::Nullable(inner) => inner.accepts_missing(),
            _ => false,
        }
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// JSON equality that treats `1` and `1.0` as the same number.
pub(crate) fn json_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| json_equal(x, y)))
        }
        _ => left == right,
    }
}

fn check(node: &SchemaNode, value: &Value, path: &str, errors: &mut SchemaErrors) {
    match node.kind() {
        SchemaKind::Optional(inner) | SchemaKind::Default(inner, _) => {
            check(inner, value, path, errors)
        }
        SchemaKind::Nullable(inner) => {
            if !value.is_null() {
                check(inner, value, path, errors)
            }
        }
        SchemaKind::Any => {}
        SchemaKind::Void => {
            if !value.is_null() {
                errors.push(path, format!("Expected no value, received {}", type_name(value)));
            }
        }
        SchemaKind::String(checks) => match value.as_str() {
            None => errors.push(path, format!("Expected string, received {}", type_name(value))),
            Some(text) => {
                if checks.format == Some(StringFormat::DateTime)
                    && chrono::DateTime::parse_from_rfc3339(text).is_err()
                {
                    errors.push(path, "Invalid datetime");
                }
            }
        },
        SchemaKind::Number(checks) => match value.as_f64() {
            None => errors.push(path, format!("Expected number, received {}", type_name(value))),
            Some(number) => check_number(checks, value, number, path, errors),
        },
        SchemaKind::Boolean => {
            if !value.is_boolean() {
                errors.push(path, format!("Expected boolean, received {}", type_name(value)));
            }
        }
        SchemaKind::Literal(expected) => {
            if !json_equal(expected, value) {
                errors.push(path, format!("Invalid literal value, expected {}", expected));
            }
        }
        SchemaKind::Enum(options) => {
            if !options.iter().any(|option| json_equal(option, value)) {
                let options: Vec<String> = options.iter().map(Value::to_string).collect();
                errors.push(
                    path,
                    format!("Invalid enum value. Expected one of {}", options.join(" | ")),
                );
            }
        }
        SchemaKind::Array(items) => match value.as_array() {
            None => errors.push(path, format!("Expected array, received {}", type_name(value))),
            Some(elements) => {
                for (index, element) in elements.iter().enumerate() {
                    check(items, element, &join(path, &index.to_string()), errors);
                }
            }
        },
        SchemaKind::Object(fields) => match value.as_object() {
            None => errors.push(path, format!("Expected object, received {}", type_name(value))),
            Some(object) => {
                for (name, field) in fields {
                    let field_path = join(path, name);
                    match object.get(name) {
                        Some(field_value) => check(field, field_value, &field_path, errors),
                        None if field.accepts_missing() => {}
                        None => errors.push(&field_path, "Required"),
                    }
                }
            }
        },
        SchemaKind::Record(values) => match value.as_object() {
            None => errors.push(path, format!("Expected object, received {}", type_name(value))),
            Some(object) => {
                for (key, entry) in object {
                    check(values, entry, &join(path, key), errors);
                }
            }
        },
        SchemaKind::Union(members) => {
            let matched = members.iter().any(|member| {
                let mut member_errors = SchemaErrors::default();
                check(member, value, path, &mut member_errors);
                member_errors.is_empty()
            });
            if !matched {
                errors.push(path, "Invalid input: no union member matched");
            }
        }
        SchemaKind::Intersection(members) => {
            for member in members {
                let mut member_errors = SchemaErrors::default();
                check(member, value, path, &mut member_errors);
                errors.extend(member_errors);
            }
        }
    }
}

fn check_number(
    checks: &NumberChecks,
    value: &Value,
    number: f64,
    path: &str,
    errors: &mut SchemaErrors,
) {
    let integral = value.is_i64() || value.is_u64() || number.fract() == 0.0;
    if checks.integer && !integral {
        errors.push(path, "Expected integer, received float");
    }
    if let Some(minimum) = checks.minimum {
        if number < minimum {
            errors.push(path, format!("Number must be greater than or equal to {}", minimum));
        }
    }
    if let Some(maximum) = checks.maximum {
        if number > maximum {
            errors.push(path, format!("Number must be less than or equal to {}", maximum));
        }
    }
    if let Some(step) = checks.multiple_of {
        if step != 0.0 {
            let quotient = number / step;
            if (quotient - quotient.round()).abs() > 1e-9 {
                errors.push(path, format!("Number must be a multiple of {}", step));
            }
        }
    }
}
