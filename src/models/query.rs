//! Search query language for model instances.
//!
//! A query is a flat list of property statements joined by `"AND"`/`"OR"`
//! links, evaluated strictly left to right without precedence. Two adjacent
//! statements with no link between them are joined with AND.
//!
//! ```json
//! {
//!   "query": [
//!     {"type": "property", "key": "genre", "value": "fiction"},
//!     "OR",
//!     {"type": "property", "key": "pages", "value": 500, "valueType": "number", "equalitySymbol": ">"}
//!   ],
//!   "sort": {"key": "title", "order": "asc"},
//!   "take": 10
//! }
//! ```

use crate::error::{ModelError, ModelResult};
use crate::schema::validation::json_equal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::cmp::Ordering;

/// Boolean link between two statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BooleanLink {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

/// Comparison applied by a property statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EqualitySymbol {
    #[default]
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
}

/// How the statement value should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Boolean,
    Date,
    Object,
}

/// String matching options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyOptions {
    pub case_sensitive: bool,
    pub starts_with: bool,
    pub ends_with: bool,
}

/// Statement kind tag. Only property statements exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementType {
    #[default]
    Property,
}

/// Compare one instance property against a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyStatement {
    #[serde(rename = "type", default)]
    pub statement_type: StatementType,
    pub key: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equality_symbol: Option<EqualitySymbol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<PropertyOptions>,
}

impl PropertyStatement {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            statement_type: StatementType::Property,
            key: key.into(),
            value: value.into(),
            value_type: None,
            equality_symbol: None,
            options: None,
        }
    }

    pub fn with_symbol(mut self, symbol: EqualitySymbol) -> Self {
        self.equality_symbol = Some(symbol);
        self
    }

    pub fn with_options(mut self, options: PropertyOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Whether an instance (as plain data) satisfies this statement.
    pub fn matches(&self, data: &Value) -> bool {
        let actual = data.get(&self.key).unwrap_or(&Value::Null);
        match self.equality_symbol.unwrap_or_default() {
            EqualitySymbol::Eq => self.equals(actual),
            symbol => match self.compare(actual) {
                None => false,
                Some(ordering) => match symbol {
                    EqualitySymbol::Lt => ordering == Ordering::Less,
                    EqualitySymbol::Lte => ordering != Ordering::Greater,
                    EqualitySymbol::Gt => ordering == Ordering::Greater,
                    EqualitySymbol::Gte => ordering != Ordering::Less,
                    EqualitySymbol::Eq => ordering == Ordering::Equal,
                },
            },
        }
    }

    fn equals(&self, actual: &Value) -> bool {
        match (actual, &self.value) {
            (Value::String(actual), Value::String(expected)) => {
                let options = self.options.unwrap_or_default();
                let (actual, expected) = if options.case_sensitive {
                    (actual.clone(), expected.clone())
                } else {
                    (actual.to_lowercase(), expected.to_lowercase())
                };
                match (options.starts_with, options.ends_with) {
                    (true, true) => actual.contains(&expected),
                    (true, false) => actual.starts_with(&expected),
                    (false, true) => actual.ends_with(&expected),
                    (false, false) => actual == expected,
                }
            }
            (actual, expected) => json_equal(actual, expected),
        }
    }

    /// Order of the instance value relative to the statement value.
    fn compare(&self, actual: &Value) -> Option<Ordering> {
        if self.value_type == Some(ValueType::Date) {
            return compare_dates(actual, &self.value);
        }
        compare_values(actual, &self.value)
    }
}

fn compare_dates(left: &Value, right: &Value) -> Option<Ordering> {
    let left = chrono::DateTime::parse_from_rfc3339(left.as_str()?).ok()?;
    let right = chrono::DateTime::parse_from_rfc3339(right.as_str()?).ok()?;
    Some(left.cmp(&right))
}

/// Ordering between two values of the same JSON type.
fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => left.as_f64()?.partial_cmp(&right.as_f64()?),
        (Value::String(left), Value::String(right)) => Some(left.cmp(right)),
        (Value::Bool(left), Value::Bool(right)) => Some(left.cmp(right)),
        _ => None,
    }
}

/// One element of a query list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryToken {
    Link(BooleanLink),
    Property(PropertyStatement),
}

/// Sort direction. `dsc` is the wire name for descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Dsc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortStatement {
    pub key: String,
    #[serde(default)]
    pub order: SortOrder,
}

/// A search over the instances of one model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub query: Vec<QueryToken>,
    /// Maximum number of instances to return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortStatement>,
    /// Cursor returned by a previous search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<Value>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query from tool arguments.
    pub fn from_value(value: Value) -> ModelResult<Self> {
        let query: SearchQuery =
            serde_json::from_value(value).map_err(|error| ModelError::InvalidQuery {
                message: error.to_string(),
            })?;
        query.validate()?;
        Ok(query)
    }

    pub fn with_statement(mut self, statement: PropertyStatement) -> Self {
        self.query.push(QueryToken::Property(statement));
        self
    }

    pub fn with_link(mut self, link: BooleanLink) -> Self {
        self.query.push(QueryToken::Link(link));
        self
    }

    pub fn take(mut self, take: usize) -> Self {
        self.take = Some(take);
        self
    }

    pub fn sort_by(mut self, key: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(SortStatement {
            key: key.into(),
            order,
        });
        self
    }

    /// Reject links that do not sit between two statements.
    pub fn validate(&self) -> ModelResult<()> {
        let mut previous_was_link = true;
        for (index, token) in self.query.iter().enumerate() {
            match token {
                QueryToken::Link(_) if previous_was_link => {
                    return Err(ModelError::InvalidQuery {
                        message: format!("Boolean link at position {} has no left operand", index),
                    });
                }
                QueryToken::Link(_) => previous_was_link = true,
                QueryToken::Property(_) => previous_was_link = false,
            }
        }
        if previous_was_link && !self.query.is_empty() {
            return Err(ModelError::InvalidQuery {
                message: "Query ends with a boolean link".to_string(),
            });
        }
        Ok(())
    }

    /// Whether an instance satisfies the statement list. An empty list matches
    /// everything.
    pub fn matches(&self, data: &Value) -> bool {
        let mut result: Option<bool> = None;
        let mut pending = BooleanLink::And;
        for token in &self.query {
            match token {
                QueryToken::Link(link) => pending = *link,
                QueryToken::Property(statement) => {
                    let matched = statement.matches(data);
                    result = Some(match (result, pending) {
                        (None, _) => matched,
                        (Some(previous), BooleanLink::And) => previous && matched,
                        (Some(previous), BooleanLink::Or) => previous || matched,
                    });
                    pending = BooleanLink::And;
                }
            }
        }
        result.unwrap_or(true)
    }

    /// Offset encoded in the page cursor.
    pub fn offset(&self) -> ModelResult<usize> {
        match &self.page {
            None | Some(Value::Null) => Ok(0),
            Some(Value::Number(number)) => number
                .as_u64()
                .map(|offset| offset as usize)
                .ok_or_else(|| invalid_page(&json!(number))),
            Some(Value::String(text)) => text.parse().map_err(|_| invalid_page(&json!(text))),
            Some(other) => Err(invalid_page(other)),
        }
    }

    /// Filter, sort and paginate plain instance data.
    ///
    /// Returns the selected page and the cursor of the next one, if any.
    pub fn apply(&self, mut candidates: Vec<Value>) -> ModelResult<(Vec<Value>, Option<Value>)> {
        self.validate()?;
        candidates.retain(|data| self.matches(data));

        if let Some(sort) = &self.sort {
            candidates.sort_by(|left, right| {
                sort_ordering(
                    left.get(&sort.key).unwrap_or(&Value::Null),
                    right.get(&sort.key).unwrap_or(&Value::Null),
                    sort.order,
                )
            });
        }

        let offset = self.offset()?;
        let total = candidates.len();
        let page: Vec<Value> = candidates
            .into_iter()
            .skip(offset)
            .take(self.take.unwrap_or(usize::MAX))
            .collect();
        let next = offset + page.len();
        let cursor = (self.take.is_some() && next < total).then(|| Value::String(next.to_string()));
        Ok((page, cursor))
    }
}

fn invalid_page(page: &Value) -> ModelError {
    ModelError::InvalidQuery {
        message: format!("Invalid page cursor: {}", page),
    }
}

/// Position of a JSON type in sort order. Null (or missing) is last.
fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Bool(_) => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Array(_) => 3,
        Value::Object(_) => 4,
        Value::Null => 5,
    }
}

/// Total order over arbitrary values: grouped by JSON type, then by value
/// within the type. Missing values come last in either direction.
fn sort_ordering(left: &Value, right: &Value, order: SortOrder) -> Ordering {
    match (left.is_null(), right.is_null()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    let ordering = type_rank(left).cmp(&type_rank(right)).then_with(|| {
        compare_values(left, right).unwrap_or_else(|| left.to_string().cmp(&right.to_string()))
    });
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Dsc => ordering.reverse(),
    }
}
