//! Request pipeline: classify, parse, orchestrate, format

use tracing::{debug, warn};

use crate::classifier::Classifier;
use crate::directive;
use crate::format::format_response;
use crate::hub::ToolHub;
use crate::orchestrator::Orchestrator;
use crate::resolve::Prompter;

/// Owns the tool hub and classifier for the lifetime of the process
pub struct Assistant {
    hub: ToolHub,
    classifier: Box<dyn Classifier>,
    region: String,
}

impl Assistant {
    pub fn new(hub: ToolHub, classifier: Box<dyn Classifier>, region: impl Into<String>) -> Self {
        Self {
            hub,
            classifier,
            region: region.into(),
        }
    }

    pub fn hub(&self) -> &ToolHub {
        &self.hub
    }

    /// Process one user request to completion and return the display text.
    /// Never fails: every error ends up in the returned text.
    pub async fn process(&self, prompt: &str, prompter: &mut dyn Prompter) -> String {
        let raw = match self
            .classifier
            .classify(prompt, self.hub.capabilities())
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("Classifier failed: {}", e);
                return format!("LLM error: {}", e);
            }
        };
        debug!("Classifier output: {:?}", raw);

        let classification = directive::parse(&raw);
        if classification.is_direct_answer() {
            return raw;
        }

        let bag = Orchestrator::new(&self.hub, self.region.as_str())
            .execute(&classification, prompt, prompter)
            .await;
        format_response(&bag, &raw)
    }

    /// Disconnect every tool server
    pub async fn shutdown(&mut self) {
        self.hub.shutdown().await;
    }
}
