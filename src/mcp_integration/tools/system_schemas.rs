//! System tool definitions.

use super::{builtin, names, no_arguments};
use crate::mcp_integration::core::{ServerState, ToolDescriptor};
use crate::mcp_integration::handlers::handle_start_here;

/// START_HERE: overview of the system and how to use its tools.
pub fn start_here_tool(state: &ServerState) -> ToolDescriptor {
    builtin(
        state,
        names::START_HERE,
        "Start here. Describes this system and how to discover and use its domains, features and models.",
        no_arguments(),
        handle_start_here,
    )
}
