//! Test data for the Book model and search queries.

use serde_json::{Value, json};

pub fn book(id: &str, title: &str, author: &str, pages: i64) -> Value {
    json!({ "id": id, "title": title, "author": author, "pages": pages })
}

/// Five books with distinct titles and page counts.
pub fn catalog() -> Vec<Value> {
    vec![
        book("b1", "Dune", "Frank Herbert", 412),
        book("b2", "Emma", "Jane Austen", 474),
        book("b3", "Ubik", "Philip K. Dick", 202),
        book("b4", "Dune Messiah", "Frank Herbert", 256),
        book("b5", "Beloved", "Toni Morrison", 324),
    ]
}

/// A search query with a single property statement.
pub fn statement(key: &str, value: Value) -> Value {
    json!({ "type": "property", "key": key, "value": value })
}
