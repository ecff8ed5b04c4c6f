//! Per-call logging decorator.
//!
//! [`decorate`] wraps a tool so that each call gets a fresh `requestId`
//! correlation id, has its caller context merged and stripped from the
//! arguments, and is logged before and after the handler runs. The envelope
//! returned by the handler is passed through untouched.

use crate::config::LoggingConfig;
use crate::context::{ContextMerger, LogId};
use crate::envelope::Envelope;
use crate::mcp_integration::core::{ToolCall, ToolDescriptor};
use log::{Level, log};
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;

/// Extracts the data logged for a request.
pub type RequestLogData = Arc<dyn Fn(&ToolCall) -> Value + Send + Sync>;

/// Extracts the data logged for a response.
pub type ResponseLogData = Arc<dyn Fn(&Envelope) -> Value + Send + Sync>;

/// How calls are logged.
#[derive(Clone)]
pub struct LogOptions {
    pub request_level: Level,
    pub response_level: Level,
    pub request_data: Option<RequestLogData>,
    pub response_data: Option<ResponseLogData>,
}

impl fmt::Debug for LogOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogOptions")
            .field("request_level", &self.request_level)
            .field("response_level", &self.response_level)
            .field("request_data", &self.request_data.is_some())
            .field("response_data", &self.response_data.is_some())
            .finish()
    }
}

impl Default for LogOptions {
    fn default() -> Self {
        Self::from_config(&LoggingConfig::default())
    }
}

impl LogOptions {
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            request_level: config.request_log_level,
            response_level: config.response_log_level,
            request_data: None,
            response_data: None,
        }
    }
}

fn default_request_data(call: &ToolCall) -> Value {
    json!({
        "path": call.extras.request_info.path,
        "arguments": call.arguments,
    })
}

fn default_response_data(envelope: &Envelope) -> Value {
    json!({
        "isError": envelope.is_error(),
        "text": envelope.text(),
    })
}

/// Wrap a tool with context merging and request/response logging.
pub fn decorate(tool: ToolDescriptor, options: &LogOptions) -> ToolDescriptor {
    let inner = tool.handler();
    let name = tool.name().to_string();
    let options = options.clone();

    let handler = move |call: ToolCall| {
        let inner = Arc::clone(&inner);
        let name = name.clone();
        let options = options.clone();
        async move {
            let request_id = LogId::request_id();
            let ToolCall {
                mut arguments,
                extras,
                ..
            } = call;
            if arguments.is_null() {
                arguments = json!({});
            }
            let context =
                ContextMerger::merge_arguments(&mut arguments, &extras, &[request_id.clone()]);
            let call = ToolCall {
                arguments,
                extras,
                context,
            };

            let request_data = match &options.request_data {
                Some(extract) => extract(&call),
                None => default_request_data(&call),
            };
            log!(
                options.request_level,
                "[{}] {} request: {}",
                request_id.value(),
                name,
                request_data
            );

            let envelope = inner.handle(call).await;

            let response_data = match &options.response_data {
                Some(extract) => extract(&envelope),
                None => default_response_data(&envelope),
            };
            log!(
                options.response_level,
                "[{}] {} response: {}",
                request_id.value(),
                name,
                response_data
            );
            envelope
        }
    };
    tool.with_handler(Arc::new(handler))
}
