//! Unit tests for the core building blocks
//!
//! These tests exercise individual components through the public API, mostly
//! as properties over generated inputs.
//!
//! ## Organization
//!
//! - [`schema_bridge`] - Native/wire schema conversion
//! - [`visibility`] - Hide rule resolution
//! - [`envelope`] - Response envelope formatting
//! - [`context`] - Cross-call context merging

pub mod context;
pub mod envelope;
pub mod schema_bridge;
pub mod visibility;
