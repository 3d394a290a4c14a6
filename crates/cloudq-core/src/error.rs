//! Error types shared across cloudq
//!
//! Gateway and classifier errors describe what went wrong talking to a
//! collaborator. `DirectiveError` is the taxonomy the orchestrator records in
//! the result bag; nothing in it is allowed to escape a request.

use thiserror::Error;

/// Errors raised by a tool endpoint gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection to '{server}' failed: {reason}")]
    Connection { server: String, reason: String },

    #[error("Server '{0}' is not connected")]
    NotConnected(String),

    #[error("No server provides tool '{0}'")]
    UnknownTool(String),

    #[error("{0}")]
    Tool(String),

    #[error("Malformed response from '{server}': {reason}")]
    Malformed { server: String, reason: String },
}

impl GatewayError {
    pub fn connection(server: &str, reason: impl ToString) -> Self {
        Self::Connection {
            server: server.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(server: &str, reason: impl ToString) -> Self {
        Self::Malformed {
            server: server.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Errors raised by an LLM classifier
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API key not found in ${0}")]
    ApiKeyNotFound(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Backend command failed: {0}")]
    Command(String),
}

/// Per-directive failures recorded in the result bag
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    #[error("{0}")]
    Connection(String),

    #[error("{0}")]
    Tool(String),

    #[error("Invalid name '{0}': use 3-63 lowercase letters, digits or hyphens, not starting or ending with a hyphen")]
    Validation(String),

    #[error("{0}")]
    MissingPrerequisite(String),

    #[error("{0}")]
    InputUnavailable(String),

    #[error("{0}")]
    Malformed(String),
}

impl DirectiveError {
    /// Short category name, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::Tool(_) => "tool",
            Self::Validation(_) => "validation",
            Self::MissingPrerequisite(_) => "missing_prerequisite",
            Self::InputUnavailable(_) => "input_unavailable",
            Self::Malformed(_) => "malformed",
        }
    }
}

impl From<GatewayError> for DirectiveError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Connection { .. } | GatewayError::NotConnected(_) => {
                Self::Connection(err.to_string())
            }
            GatewayError::UnknownTool(_) | GatewayError::Tool(_) => Self::Tool(err.to_string()),
            GatewayError::Malformed { .. } => Self::Malformed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_mapping() {
        let err: DirectiveError = GatewayError::NotConnected("ec2".to_string()).into();
        assert_eq!(err.kind(), "connection");
        assert_eq!(err.to_string(), "Server 'ec2' is not connected");

        let err: DirectiveError = GatewayError::Tool("Error: AccessDenied".to_string()).into();
        assert_eq!(err, DirectiveError::Tool("Error: AccessDenied".to_string()));

        let err: DirectiveError = GatewayError::malformed("s3", "missing content").into();
        assert_eq!(err.kind(), "malformed");
    }

    #[test]
    fn test_validation_message() {
        let err = DirectiveError::Validation("My_Bucket".to_string());
        assert!(err.to_string().contains("My_Bucket"));
    }
}
