//! Server configuration.
//!
//! [`McpServerConfig`] is plain data: it can be built in code or deserialized
//! from the host application's JSON configuration (camelCase keys, every field
//! optional).
//!
//! ```rust
//! use layers_mcp_server::config::McpServerConfig;
//!
//! let config = McpServerConfig::from_json(r#"{
//!     "name": "bookstore",
//!     "version": "1.2.0",
//!     "hideComponents": {"domains": ["internal"]},
//!     "logging": {"requestLogLevel": "debug"},
//!     "startHere": {"includeDomains": true}
//! }"#).unwrap();
//!
//! assert_eq!(config.name, "bookstore");
//! assert_eq!(config.logging.request_log_level, log::Level::Debug);
//! assert!(config.stateless);
//! ```

use crate::error::{McpError, McpResult};
use crate::visibility::HideComponents;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct McpServerConfig {
    /// Server name reported to clients and in START_HERE
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    /// Rebuild the tool registry for every call instead of once per session
    pub stateless: bool,
    pub hide_components: HideComponents,
    pub logging: LoggingConfig,
    pub start_here: StartHereConfig,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            name: "layers-mcp-server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: None,
            stateless: true,
            hide_components: HideComponents::default(),
            logging: LoggingConfig::default(),
            start_here: StartHereConfig::default(),
        }
    }
}

impl McpServerConfig {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> McpResult<Self> {
        let config: McpServerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_hide_components(mut self, hide_components: HideComponents) -> Self {
        self.hide_components = hide_components;
        self
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    pub fn with_start_here(mut self, start_here: StartHereConfig) -> Self {
        self.start_here = start_here;
        self
    }

    pub fn stateful(mut self) -> Self {
        self.stateless = false;
        self
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> McpResult<()> {
        if self.name.trim().is_empty() {
            return Err(McpError::InvalidConfiguration {
                message: "name must not be empty".to_string(),
            });
        }
        if let Some(path) = self
            .hide_components
            .paths
            .iter()
            .find(|path| path.is_empty() || path.split('.').any(str::is_empty))
        {
            return Err(McpError::InvalidConfiguration {
                message: format!("invalid hide path '{}'", path),
            });
        }
        Ok(())
    }
}

/// Levels for the per-call request and response log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    pub request_log_level: log::Level,
    pub response_log_level: log::Level,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            request_log_level: log::Level::Info,
            response_log_level: log::Level::Info,
        }
    }
}

/// Content of the START_HERE tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartHereConfig {
    /// Overrides the server name in the overview
    pub name: Option<String>,
    /// Overrides the server description in the overview
    pub description: Option<String>,
    /// Omit the built-in guidance on how to navigate the tools
    pub hide_default_system_entries: bool,
    /// List visible domains in the overview
    pub include_domains: bool,
    /// List visible features under each domain (implies domains)
    pub include_features: bool,
    pub examples_of_use: Vec<ExampleOfUse>,
}

/// A worked example shown by START_HERE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleOfUse {
    pub name: String,
    pub description: String,
    /// Tool calls that make up the example, in order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<Value>>,
}

impl ExampleOfUse {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            tool_calls: None,
        }
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<Value>) -> Self {
        self.tool_calls = Some(tool_calls);
        self
    }
}
