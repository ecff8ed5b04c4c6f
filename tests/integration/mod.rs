//! End-to-end tests through the tool surface
//!
//! Every test builds a server from the shared fixture in [`crate::common`] and
//! talks to it the way an agent would: by tool name and JSON arguments, or
//! over an MCP session.
//!
//! ## Organization
//!
//! - [`feature_tools`] - Domain and feature discovery, execution and context
//! - [`model_tools`] - Model discovery and CRUD
//! - [`start_here`] - The system overview tool
//! - [`stdio_session`] - MCP sessions driven by an SDK client and by raw lines

pub mod feature_tools;
pub mod model_tools;
pub mod start_here;
pub mod stdio_session;
