//! LLM classifier
//!
//! Asks a model to map a user prompt onto the directive vocabulary. The
//! model sees the discovered tool capabilities and answers either with
//! directive tokens or with a short natural-language reply.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::config::{LlmBackend, LlmConfig};
use crate::directive::Directive;
use crate::error::ClassifierError;
use crate::hub::Capability;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Turns a user prompt into raw directive text
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        prompt: &str,
        capabilities: &[Capability],
    ) -> Result<String, ClassifierError>;
}

/// Build the system prompt from discovered capabilities
pub fn build_system_prompt(capabilities: &[Capability]) -> String {
    let mut prompt = String::from("You are a cloud assistant with access to these tools:\n");

    if capabilities.is_empty() {
        prompt.push_str("(no tool servers are connected)\n");
    }
    for capability in capabilities {
        prompt.push_str(&format!("\n[{}]\n", capability.server));
        for summary in capability.summaries() {
            prompt.push_str(&format!("- {}\n", summary));
        }
    }

    prompt.push_str("\nWhen tools are needed, respond only with the matching tokens:\n");
    for directive in Directive::ALL {
        prompt.push_str(&format!("- {}: {}\n", directive.token(), directive.usage()));
    }
    prompt.push_str(
        "\nCombine tokens when several apply, separated by spaces. \
         If no tool is needed, answer the question directly and concisely \
         without any token.",
    );
    prompt
}

/// Build the classifier selected by `config`
pub fn from_config(
    config: &LlmConfig,
    timeout: Duration,
) -> Result<Box<dyn Classifier>, ClassifierError> {
    match config.backend {
        LlmBackend::Anthropic => Ok(Box::new(AnthropicClassifier::new(config, timeout)?)),
        LlmBackend::Command => Ok(Box::new(CommandClassifier::new(
            &config.command,
            config.args.clone(),
        ))),
    }
}

/// Anthropic Messages API
pub struct AnthropicClassifier {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl AnthropicClassifier {
    /// Create a classifier, reading the API key from the configured env var
    pub fn new(config: &LlmConfig, timeout: Duration) -> Result<Self, ClassifierError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ClassifierError::ApiKeyNotFound(config.api_key_env.clone()))?;

        Self::with_key(config, api_key, timeout)
    }

    pub fn with_key(
        config: &LlmConfig,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, ClassifierError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl MessagesResponse {
    fn text(&self) -> Result<String, ClassifierError> {
        let text = self
            .content
            .iter()
            .filter(|c| c.block_type == "text")
            .filter_map(|c| c.text.as_deref())
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(ClassifierError::InvalidResponse(
                "no text content in response".to_string(),
            ));
        }
        Ok(text)
    }
}

#[async_trait]
impl Classifier for AnthropicClassifier {
    async fn classify(
        &self,
        prompt: &str,
        capabilities: &[Capability],
    ) -> Result<String, ClassifierError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: build_system_prompt(capabilities),
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(ClassifierError::Provider(format!("{}: {}", status, message)));
        }

        let parsed: MessagesResponse = serde_json::from_str(&text)
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;
        let answer = parsed.text()?;
        debug!("Classifier replied: {}", answer);
        Ok(answer)
    }
}

/// External LLM command line tool, e.g. `claude -p {prompt}`
pub struct CommandClassifier {
    command: String,
    args: Vec<String>,
}

impl CommandClassifier {
    pub fn new(command: &str, args: Vec<String>) -> Self {
        Self {
            command: command.to_string(),
            args,
        }
    }

    /// Arguments with `{prompt}` substituted
    fn render_args(&self, full_prompt: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace("{prompt}", full_prompt))
            .collect()
    }
}

#[async_trait]
impl Classifier for CommandClassifier {
    async fn classify(
        &self,
        prompt: &str,
        capabilities: &[Capability],
    ) -> Result<String, ClassifierError> {
        let full_prompt = format!(
            "{}\n\nUser request: {}",
            build_system_prompt(capabilities),
            prompt
        );

        let output = Command::new(&self.command)
            .args(self.render_args(&full_prompt))
            .output()
            .await
            .map_err(|e| ClassifierError::Command(format!("{}: {}", self.command, e)))?;

        if !output.status.success() {
            return Err(ClassifierError::Command(format!(
                "{} exited with status: {}",
                self.command, output.status
            )));
        }

        let answer = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if answer.is_empty() {
            return Err(ClassifierError::InvalidResponse(format!(
                "{} produced no output",
                self.command
            )));
        }
        debug!("Classifier replied: {}", answer);
        Ok(answer)
    }
}
