pub mod dispatch;

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::AppConfig;
use crate::protocol::openai_chat::{OpenAiModel, OpenAiModelList};

/// Which branch of alias resolution produced the upstream model id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The requested name is a configured alias.
    Alias,
    /// The requested name is already an upstream id present in the table.
    Passthrough,
    /// Nothing matched; the configured default id is used.
    Default,
}

/// Result of resolving a requested model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedModel<'a> {
    pub upstream_model: &'a str,
    pub resolution: Resolution,
}

/// Read-only alias table built once at startup.
#[derive(Debug, Clone)]
pub struct ModelRouter {
    /// Aliases in configured order, for model listing.
    aliases: Vec<Arc<str>>,
    alias_index: FxHashMap<Arc<str>, Arc<str>>,
    upstream_ids: FxHashSet<Arc<str>>,
    default_model: Arc<str>,
}

impl ModelRouter {
    /// Build a `ModelRouter` from the application configuration.
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        let mut aliases = Vec::with_capacity(config.models.aliases.len());
        let mut alias_index = FxHashMap::default();
        let mut upstream_ids = FxHashSet::default();

        for entry in &config.models.aliases {
            let alias: Arc<str> = Arc::from(entry.alias.as_str());
            let upstream: Arc<str> = Arc::from(entry.upstream.as_str());
            if alias_index
                .insert(Arc::clone(&alias), Arc::clone(&upstream))
                .is_none()
            {
                aliases.push(alias);
            }
            upstream_ids.insert(upstream);
        }

        Self {
            aliases,
            alias_index,
            upstream_ids,
            default_model: Arc::from(config.models.default_model.as_str()),
        }
    }

    /// Resolve a client-facing model name to an upstream model id.
    ///
    /// Exactly one branch applies: a known alias maps to its id, a raw upstream id
    /// already in the table passes through, anything else falls back to the default.
    #[must_use]
    pub fn resolve<'a>(&'a self, requested: &'a str) -> ResolvedModel<'a> {
        if let Some(upstream) = self.alias_index.get(requested) {
            return ResolvedModel {
                upstream_model: upstream,
                resolution: Resolution::Alias,
            };
        }
        if self.upstream_ids.contains(requested) {
            return ResolvedModel {
                upstream_model: requested,
                resolution: Resolution::Passthrough,
            };
        }
        ResolvedModel {
            upstream_model: &self.default_model,
            resolution: Resolution::Default,
        }
    }

    #[must_use]
    pub fn aliases(&self) -> &[Arc<str>] {
        &self.aliases
    }

    /// Render the alias table as an `OpenAI` model list.
    #[must_use]
    pub fn model_list(&self, created: u64, owned_by: &str) -> OpenAiModelList {
        OpenAiModelList {
            object: "list".to_string(),
            data: self
                .aliases
                .iter()
                .map(|alias| OpenAiModel {
                    id: alias.to_string(),
                    object: "model".to_string(),
                    created,
                    owned_by: owned_by.to_string(),
                })
                .collect(),
        }
    }
}
