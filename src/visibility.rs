//! Hierarchical hide rules over domains, features, models and operations.
//!
//! Paths are dot-joined segments:
//!
//! | Path | Hides |
//! |---|---|
//! | `billing` | the whole domain |
//! | `billing.createInvoice` | one feature |
//! | `billing.cruds` | every model in the domain |
//! | `billing.cruds.Invoice` | one model |
//! | `billing.cruds.Invoice.delete` | one operation of a model |
//!
//! A path is hidden when it or any ancestor is hidden. Listing tools and
//! execution tools consult the same [`VisibilityResolver::is_hidden`] predicate,
//! so nothing hidden from discovery is reachable by direct execution.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Path segment under which a domain's models live.
pub const MODELS_CONTAINER: &str = "cruds";

/// The framework's own bootstrap domains. Always hidden.
pub const SYSTEM_DOMAINS: &[&str] = &["@layers/core", "@layers/data", "@layers/mcp"];

/// Hide rules as configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HideComponents {
    /// Dot-paths to hide
    pub paths: Vec<String>,
    /// Domains to hide entirely
    pub domains: Vec<String>,
    /// Hide every model of every domain
    pub all_models: bool,
}

impl HideComponents {
    pub fn with_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains.extend(domains.into_iter().map(Into::into));
        self
    }

    pub fn with_all_models(mut self, all_models: bool) -> Self {
        self.all_models = all_models;
        self
    }
}

/// Evaluates hide rules. Built once per server configuration; read-only after.
#[derive(Debug, Clone)]
pub struct VisibilityResolver {
    hidden_paths: HashSet<String>,
    hidden_domains: HashSet<String>,
    all_models_hidden: bool,
}

impl VisibilityResolver {
    pub fn new(rules: &HideComponents) -> Self {
        let hidden_domains = rules
            .domains
            .iter()
            .cloned()
            .chain(SYSTEM_DOMAINS.iter().map(|domain| domain.to_string()))
            .collect();
        Self {
            hidden_paths: rules.paths.iter().cloned().collect(),
            hidden_domains,
            all_models_hidden: rules.all_models,
        }
    }

    /// Whether every model of every domain is hidden.
    pub fn all_models_hidden(&self) -> bool {
        self.all_models_hidden
    }

    /// Whether the path, or any ancestor of it, is hidden.
    ///
    /// The empty path is never hidden.
    pub fn is_hidden<S: AsRef<str>>(&self, path: &[S]) -> bool {
        let Some(domain) = path.first() else {
            return false;
        };
        if self.hidden_domains.contains(domain.as_ref()) {
            return true;
        }
        if self.all_models_hidden
            && path.get(1).is_some_and(|segment| segment.as_ref() == MODELS_CONTAINER)
        {
            return true;
        }

        let mut prefix = String::new();
        for segment in path {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment.as_ref());
            if self.hidden_paths.contains(&prefix) {
                return true;
            }
        }
        false
    }

    pub fn is_domain_hidden(&self, domain: &str) -> bool {
        self.is_hidden(&[domain])
    }

    pub fn is_feature_hidden(&self, domain: &str, feature: &str) -> bool {
        self.is_hidden(&[domain, feature])
    }

    /// Whether the domain's model container is hidden.
    pub fn are_models_hidden(&self, domain: &str) -> bool {
        self.is_hidden(&[domain, MODELS_CONTAINER])
    }

    pub fn is_model_hidden(&self, domain: &str, model: &str) -> bool {
        self.is_hidden(&[domain, MODELS_CONTAINER, model])
    }

    pub fn is_operation_hidden(&self, domain: &str, model: &str, operation: &str) -> bool {
        self.is_hidden(&[domain, MODELS_CONTAINER, model, operation])
    }
}

impl Default for VisibilityResolver {
    fn default() -> Self {
        Self::new(&HideComponents::default())
    }
}
