//! MCP payload types
//!
//! The parts of tool listings and tool results cloudq reads. The wire
//! protocol itself is handled by `rmcp`; results are re-read into these
//! types so stub gateways and the HTTP gateway share one shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// MCP Tool Definition as advertised by a server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub input_schema: Option<Value>,
}

impl Tool {
    /// `name: description` line used when describing capabilities
    pub fn summary(&self) -> String {
        match self.description.as_deref().or(self.title.as_deref()) {
            Some(desc) => format!("{}: {}", self.name, desc),
            None => self.name.clone(),
        }
    }
}

/// One content item of a tool result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: "text".to_string(),
            text: Some(text.into()),
        }
    }
}

/// MCP Tool Result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    #[serde(default)]
    pub content: Vec<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::text(text)],
            is_error: None,
        }
    }

    /// Concatenated text of all text content items
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|c| c.content_type == "text")
            .filter_map(|c| c.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }

    /// Servers report failures in-band: either the flag or an "Error" prefix
    pub fn is_failure(&self) -> bool {
        self.is_error.unwrap_or(false) || self.text().trim_start().starts_with("Error")
    }
}
