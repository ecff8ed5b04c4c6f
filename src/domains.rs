//! Domain and feature registry.
//!
//! A [`Domain`] groups the features (callable business functions) and models of
//! one capability area. Features are classified once, when they are registered:
//! an [`Feature::Annotated`] feature carries native argument and return schemas
//! and gets its arguments validated before every call, while a
//! [`Feature::Plain`] feature is described with permissive schemas.
//!
//! # Examples
//!
//! ```rust
//! use layers_mcp_server::context::CrossCallContext;
//! use layers_mcp_server::domains::{Domain, DomainRegistry, Feature, FeatureSchema};
//! use layers_mcp_server::schema::SchemaNode;
//! use serde_json::{Value, json};
//!
//! let greet = Feature::annotated(
//!     FeatureSchema::new(
//!         SchemaNode::object([("name", SchemaNode::string())]),
//!         SchemaNode::string(),
//!     )
//!     .describe("Greets someone"),
//!     |args: Value, _context: CrossCallContext| async move {
//!         Ok(json!(format!("Hello, {}", args["name"].as_str().unwrap_or("stranger"))))
//!     },
//! );
//!
//! let mut registry = DomainRegistry::new();
//! registry
//!     .register(Domain::new("people").with_feature("greet", greet))
//!     .unwrap();
//! assert!(registry.feature("people", "greet").is_some());
//! ```

use crate::context::CrossCallContext;
use crate::error::{McpError, McpResult, ToolResult};
use crate::models::ModelCrudsInterface;
use crate::schema::{SchemaDescription, SchemaNode, to_description};
use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A callable feature body.
#[async_trait]
pub trait FeatureFunction: Send + Sync {
    async fn call(&self, args: Value, context: CrossCallContext) -> ToolResult<Value>;
}

#[async_trait]
impl<F, Fut> FeatureFunction for F
where
    F: Fn(Value, CrossCallContext) -> Fut + Send + Sync,
    Fut: Future<Output = ToolResult<Value>> + Send + 'static,
{
    async fn call(&self, args: Value, context: CrossCallContext) -> ToolResult<Value> {
        (self)(args, context).await
    }
}

/// Native schemas attached to an annotated feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    /// Schema of the arguments object
    pub args: SchemaNode,
    /// Schema of the returned value
    pub returns: SchemaNode,
    pub description: Option<String>,
}

impl FeatureSchema {
    pub fn new(args: SchemaNode, returns: SchemaNode) -> Self {
        Self {
            args,
            returns,
            description: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A registered feature.
#[derive(Clone)]
pub enum Feature {
    /// Feature with native argument and return schemas
    Annotated {
        schema: FeatureSchema,
        func: Arc<dyn FeatureFunction>,
    },
    /// Feature without schemas
    Plain {
        description: Option<String>,
        func: Arc<dyn FeatureFunction>,
    },
}

impl fmt::Debug for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Annotated { schema, .. } => f
                .debug_struct("Annotated")
                .field("schema", schema)
                .finish_non_exhaustive(),
            Feature::Plain { description, .. } => f
                .debug_struct("Plain")
                .field("description", description)
                .finish_non_exhaustive(),
        }
    }
}

impl Feature {
    pub fn annotated<F: FeatureFunction + 'static>(schema: FeatureSchema, func: F) -> Self {
        Self::Annotated {
            schema,
            func: Arc::new(func),
        }
    }

    pub fn plain<F: FeatureFunction + 'static>(func: F) -> Self {
        Self::Plain {
            description: None,
            func: Arc::new(func),
        }
    }

    /// Set the description of a plain feature. Annotated features take theirs
    /// from [`FeatureSchema`].
    pub fn describe(self, description: impl Into<String>) -> Self {
        match self {
            Feature::Plain { func, .. } => Feature::Plain {
                description: Some(description.into()),
                func,
            },
            Feature::Annotated { schema, func } => Feature::Annotated {
                schema: schema.describe(description),
                func,
            },
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Feature::Annotated { schema, .. } => schema.description.as_deref(),
            Feature::Plain { description, .. } => description.as_deref(),
        }
    }

    pub fn is_annotated(&self) -> bool {
        matches!(self, Feature::Annotated { .. })
    }

    /// Wire schema of the arguments. Plain features accept any object.
    pub fn input_description(&self) -> SchemaDescription {
        match self {
            Feature::Annotated { schema, .. } => to_description(&schema.args),
            Feature::Plain { .. } => SchemaDescription::open_object(),
        }
    }

    /// Wire schema of the result. Plain features may return anything.
    pub fn output_description(&self) -> SchemaDescription {
        match self {
            Feature::Annotated { schema, .. } => to_description(&schema.returns),
            Feature::Plain { .. } => SchemaDescription::default(),
        }
    }

    /// Run the feature. Arguments of annotated features are validated first;
    /// `name` is reported as the model name of a validation failure.
    pub async fn invoke(
        &self,
        name: &str,
        args: Value,
        context: CrossCallContext,
    ) -> ToolResult<Value> {
        match self {
            Feature::Annotated { schema, func } => {
                if let Err(errors) = schema.args.validate(&args) {
                    debug!("Arguments rejected for feature '{}'", name);
                    return Err(errors.into_validation_error(name).into());
                }
                func.call(args, context).await
            }
            Feature::Plain { func, .. } => func.call(args, context).await,
        }
    }
}

/// A named group of features and models.
#[derive(Clone, Default)]
pub struct Domain {
    name: String,
    description: Option<String>,
    features: Vec<(String, Feature)>,
    models: Vec<Arc<dyn ModelCrudsInterface>>,
}

impl fmt::Debug for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Domain")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("features", &self.feature_names().collect::<Vec<_>>())
            .field(
                "models",
                &self
                    .models
                    .iter()
                    .map(|model| model.definition().name().to_string())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Domain {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a feature. A later feature with the same name replaces the earlier one
    /// in place.
    pub fn with_feature(mut self, name: impl Into<String>, feature: Feature) -> Self {
        let name = name.into();
        match self.features.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = feature,
            None => self.features.push((name, feature)),
        }
        self
    }

    pub fn with_model<M: ModelCrudsInterface + 'static>(self, model: M) -> Self {
        self.with_shared_model(Arc::new(model))
    }

    pub fn with_shared_model(mut self, model: Arc<dyn ModelCrudsInterface>) -> Self {
        self.models.push(model);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Features in registration order.
    pub fn features(&self) -> impl Iterator<Item = (&str, &Feature)> {
        self.features
            .iter()
            .map(|(name, feature)| (name.as_str(), feature))
    }

    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|(name, _)| name.as_str())
    }

    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.features
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, feature)| feature)
    }

    /// Models in registration order.
    pub fn models(&self) -> &[Arc<dyn ModelCrudsInterface>] {
        &self.models
    }

    pub fn model(&self, name: &str) -> Option<&Arc<dyn ModelCrudsInterface>> {
        self.models
            .iter()
            .find(|model| model.definition().name() == name)
    }
}

/// All domains known to a server, in registration order.
#[derive(Debug, Clone, Default)]
pub struct DomainRegistry {
    domains: Vec<Domain>,
}

impl DomainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a domain. Names must be unique, and every model must be
    /// defined in the domain it is registered under.
    pub fn register(&mut self, domain: Domain) -> McpResult<()> {
        if self.domain(domain.name()).is_some() {
            return Err(McpError::DuplicateDomain(domain.name().to_string()));
        }
        for model in domain.models() {
            let definition = model.definition();
            if definition.domain() != domain.name() {
                return Err(McpError::InvalidConfiguration {
                    message: format!(
                        "model {} belongs to domain '{}' but was registered under '{}'",
                        definition.model_type(),
                        definition.domain(),
                        domain.name()
                    ),
                });
            }
        }
        self.domains.push(domain);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_domain(mut self, domain: Domain) -> McpResult<Self> {
        self.register(domain)?;
        Ok(self)
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn domain(&self, name: &str) -> Option<&Domain> {
        self.domains.iter().find(|domain| domain.name() == name)
    }

    pub fn feature(&self, domain: &str, feature: &str) -> Option<&Feature> {
        self.domain(domain).and_then(|domain| domain.feature(feature))
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}
