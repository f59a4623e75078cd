//! Generation with guaranteed fallback.

use std::sync::Arc;

use taskforge_core::generation::{
    build_prompt, fallback_drafts, parse_drafts, GenerationSource, TaskDraft,
};

use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::gemini::GeminiClient;
use crate::model::TaskModel;

/// Outcome of one generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub drafts: Vec<TaskDraft>,
    pub source: GenerationSource,
    /// Raw model reply, or the serialized fallback list.
    pub raw: String,
}

/// Turns a project description into task drafts.
///
/// Cheap to clone; the model is shared behind an `Arc`.
#[derive(Clone)]
pub struct TaskGenerator {
    model: Option<Arc<dyn TaskModel>>,
}

impl TaskGenerator {
    pub fn new(model: Arc<dyn TaskModel>) -> Self {
        Self { model: Some(model) }
    }

    /// A generator with no model configured: always returns the fallback list.
    pub fn fallback_only() -> Self {
        Self { model: None }
    }

    /// Build from configuration: a Gemini-backed generator when an API key is
    /// set, otherwise [`TaskGenerator::fallback_only`].
    pub fn from_config(config: &GenerationConfig) -> Result<Self, GenerationError> {
        Ok(match GeminiClient::from_config(config)? {
            Some(client) => Self::new(Arc::new(client)),
            None => Self::fallback_only(),
        })
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Generate drafts for `description`. Calls the model at most once and
    /// never fails: any error yields the fixed fallback list.
    pub async fn generate(&self, description: &str) -> Generated {
        let Some(model) = &self.model else {
            tracing::debug!("No task model configured, using fallback tasks");
            return Self::fallback(description);
        };

        match Self::attempt(model.as_ref(), description).await {
            Ok(generated) => generated,
            Err(e) => {
                tracing::warn!(model = model.name(), error = %e, "Task generation failed, using fallback tasks");
                Self::fallback(description)
            }
        }
    }

    async fn attempt(model: &dyn TaskModel, description: &str) -> Result<Generated, GenerationError> {
        let prompt = build_prompt(description);
        let raw = model.complete(&prompt).await?;
        let parsed = parse_drafts(&raw)?;

        if parsed.clamped_priorities > 0 || parsed.discarded > 0 {
            tracing::warn!(
                model = model.name(),
                clamped = parsed.clamped_priorities,
                discarded = parsed.discarded,
                "Repaired model output"
            );
        }
        tracing::info!(model = model.name(), count = parsed.drafts.len(), "Generated tasks");

        Ok(Generated {
            drafts: parsed.drafts,
            source: GenerationSource::Model,
            raw,
        })
    }

    fn fallback(description: &str) -> Generated {
        let drafts = fallback_drafts(description);
        let raw = serde_json::to_string(&drafts).unwrap_or_default();
        Generated {
            drafts,
            source: GenerationSource::Fallback,
            raw,
        }
    }
}
