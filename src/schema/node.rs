//! Native schema nodes.
//!
//! [`SchemaNode`] is a closed tagged union describing a validation schema. Any
//! adapter for a concrete validation library produces this representation; the
//! bridge never inspects anything beyond these variants.

use serde_json::Value;

/// A native validation schema with an optional human-readable description.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    kind: SchemaKind,
    description: Option<String>,
}

/// The shape of a [`SchemaNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// Any string, optionally constrained to a format
    String(StringChecks),
    /// Any number, optionally integral and bounded
    Number(NumberChecks),
    /// `true` or `false`
    Boolean,
    /// Exactly one JSON value
    Literal(Value),
    /// One of a fixed set of values
    Enum(Vec<Value>),
    /// Homogeneous array
    Array(Box<SchemaNode>),
    /// Object with named fields, in declaration order
    Object(Vec<(String, SchemaNode)>),
    /// String-keyed map with homogeneous values
    Record(Box<SchemaNode>),
    /// Value matching at least one member
    Union(Vec<SchemaNode>),
    /// Value matching every member
    Intersection(Vec<SchemaNode>),
    /// Inner schema or `null`
    Nullable(Box<SchemaNode>),
    /// Inner schema or absent
    Optional(Box<SchemaNode>),
    /// Inner schema, with a value substituted when absent
    Default(Box<SchemaNode>, Value),
    /// No value (`undefined`/`void`)
    Void,
    /// Anything
    Any,
}

/// Checks attached to a string schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringChecks {
    /// Required string format
    pub format: Option<StringFormat>,
}

/// Supported string formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    /// RFC 3339 timestamp
    DateTime,
}

impl StringFormat {
    /// JSON Schema `format` keyword for this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            StringFormat::DateTime => "date-time",
        }
    }

    /// Parse a JSON Schema `format` keyword.
    pub fn parse(format: &str) -> Option<Self> {
        match format {
            "date-time" => Some(StringFormat::DateTime),
            _ => None,
        }
    }
}

/// Checks attached to a number schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberChecks {
    /// Only integral values are accepted
    pub integer: bool,
    /// Inclusive lower bound
    pub minimum: Option<f64>,
    /// Inclusive upper bound
    pub maximum: Option<f64>,
    /// Values must be a multiple of this step
    pub multiple_of: Option<f64>,
}

impl SchemaNode {
    /// Create a node of the given kind with no description.
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            description: None,
        }
    }

    pub fn string() -> Self {
        Self::new(SchemaKind::String(StringChecks::default()))
    }

    /// String holding an RFC 3339 timestamp.
    pub fn datetime() -> Self {
        Self::new(SchemaKind::String(StringChecks {
            format: Some(StringFormat::DateTime),
        }))
    }

    pub fn number() -> Self {
        Self::new(SchemaKind::Number(NumberChecks::default()))
    }

    pub fn integer() -> Self {
        Self::new(SchemaKind::Number(NumberChecks {
            integer: true,
            ..NumberChecks::default()
        }))
    }

    pub fn boolean() -> Self {
        Self::new(SchemaKind::Boolean)
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Self::new(SchemaKind::Literal(value.into()))
    }

    /// Enumeration of allowed values.
    pub fn enumeration<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(SchemaKind::Enum(values.into_iter().map(Into::into).collect()))
    }

    pub fn array(items: SchemaNode) -> Self {
        Self::new(SchemaKind::Array(Box::new(items)))
    }

    /// Object with the given fields, kept in iteration order.
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, SchemaNode)>,
        K: Into<String>,
    {
        Self::new(SchemaKind::Object(
            fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn record(values: SchemaNode) -> Self {
        Self::new(SchemaKind::Record(Box::new(values)))
    }

    pub fn union(members: Vec<SchemaNode>) -> Self {
        Self::new(SchemaKind::Union(members))
    }

    pub fn intersection(members: Vec<SchemaNode>) -> Self {
        Self::new(SchemaKind::Intersection(members))
    }

    pub fn void() -> Self {
        Self::new(SchemaKind::Void)
    }

    pub fn any() -> Self {
        Self::new(SchemaKind::Any)
    }

    /// Attach a description to this node.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn optional(self) -> Self {
        Self::new(SchemaKind::Optional(Box::new(self)))
    }

    pub fn nullable(self) -> Self {
        Self::new(SchemaKind::Nullable(Box::new(self)))
    }

    /// Make the node optional with a fallback value.
    pub fn with_default(self, value: impl Into<Value>) -> Self {
        Self::new(SchemaKind::Default(Box::new(self), value.into()))
    }

    /// Inclusive lower bound. No effect on non-number nodes.
    pub fn min(mut self, minimum: f64) -> Self {
        if let SchemaKind::Number(checks) = &mut self.kind {
            checks.minimum = Some(minimum);
        }
        self
    }

    /// Inclusive upper bound. No effect on non-number nodes.
    pub fn max(mut self, maximum: f64) -> Self {
        if let SchemaKind::Number(checks) = &mut self.kind {
            checks.maximum = Some(maximum);
        }
        self
    }

    /// Step constraint. No effect on non-number nodes.
    pub fn multiple_of(mut self, step: f64) -> Self {
        if let SchemaKind::Number(checks) = &mut self.kind {
            checks.multiple_of = Some(step);
        }
        self
    }

    pub fn kind(&self) -> &SchemaKind {
        &self.kind
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether an enclosing object may omit this field.
    ///
    /// Optional and defaulted nodes may be omitted, as may a nullable wrapper
    /// around either.
    pub fn is_optional(&self) -> bool {
        match &self.kind {
            SchemaKind::Optional(_) | SchemaKind::Default(_, _) => true,
            SchemaKind::Nullable(inner) => inner.is_optional(),
            _ => false,
        }
    }

    /// Strip optional, default and nullable wrappers.
    pub fn unwrapped(&self) -> &SchemaNode {
        match &self.kind {
            SchemaKind::Optional(inner)
            | SchemaKind::Default(inner, _)
            | SchemaKind::Nullable(inner) => inner.unwrapped(),
            _ => self,
        }
    }
}
