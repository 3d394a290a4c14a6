//! Tool endpoint gateway
//!
//! Uniform `invoke(operation, arguments)` over a remote tool server. The
//! gateway must be connected before first use and is disconnected once at
//! shutdown. There are no retries: a failed call surfaces immediately.

use async_trait::async_trait;
use rmcp::model::{CallToolRequestParam, ClientInfo, Implementation};
use rmcp::service::{RunningService, ServiceError};
use rmcp::transport::StreamableHttpClientTransport;
use rmcp::{RoleClient, ServiceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ServerEndpoint;
use crate::error::GatewayError;
use crate::protocol::{Tool, ToolResult};

/// Successful output of a tool call
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub server: String,
    pub text: String,
}

impl ToolOutput {
    /// Decode the text as a JSON payload
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        serde_json::from_str(&self.text).map_err(|e| GatewayError::malformed(&self.server, e))
    }
}

/// A remote tool server
#[async_trait]
pub trait ToolGateway: Send + Sync {
    /// Server name, as used by the router
    fn name(&self) -> &str;

    fn is_connected(&self) -> bool;

    async fn connect(&mut self) -> Result<(), GatewayError>;

    async fn list_tools(&self) -> Result<Vec<Tool>, GatewayError>;

    async fn invoke(
        &self,
        operation: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolOutput, GatewayError>;

    async fn disconnect(&mut self) -> Result<(), GatewayError>;
}

/// Turn a raw tool result into output or a tool error
pub fn into_output(server: &str, result: ToolResult) -> Result<ToolOutput, GatewayError> {
    let text = result.text();
    if result.is_failure() {
        return Err(GatewayError::Tool(text));
    }
    Ok(ToolOutput {
        server: server.to_string(),
        text,
    })
}

type McpClient = RunningService<RoleClient, ClientInfo>;

/// The client only exists once the handshake has completed
enum Connection {
    Idle,
    Connected(McpClient),
    Closed,
}

/// MCP over streamable HTTP
pub struct HttpGateway {
    name: String,
    url: String,
    timeout: Duration,
    connection: Connection,
}

impl HttpGateway {
    pub fn new(endpoint: &ServerEndpoint, timeout: Duration) -> Result<Self, GatewayError> {
        if endpoint.url.is_empty() {
            return Err(GatewayError::connection(&endpoint.name, "empty server URL"));
        }

        Ok(Self {
            name: endpoint.name.clone(),
            url: endpoint.url.clone(),
            timeout,
            connection: Connection::Idle,
        })
    }

    fn client(&self) -> Result<&McpClient, GatewayError> {
        match &self.connection {
            Connection::Connected(client) => Ok(client),
            _ => Err(GatewayError::NotConnected(self.name.clone())),
        }
    }

    fn client_info() -> ClientInfo {
        ClientInfo {
            client_info: Implementation {
                name: "cloudq".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Bound one round trip by the request timeout
    async fn timed<T>(
        &self,
        call: impl Future<Output = Result<T, ServiceError>>,
    ) -> Result<T, GatewayError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(ServiceError::McpError(e))) => {
                Err(GatewayError::Tool(format!("Error: {}", e.message)))
            }
            Ok(Err(e)) => Err(GatewayError::connection(&self.name, e)),
            Err(_) => Err(GatewayError::connection(
                &self.name,
                format!("no response within {}s", self.timeout.as_secs()),
            )),
        }
    }

    /// Re-read an rmcp model value as one of our own payload types
    fn convert<T: Serialize, U: DeserializeOwned>(&self, value: &T) -> Result<U, GatewayError> {
        serde_json::to_value(value)
            .and_then(serde_json::from_value)
            .map_err(|e| GatewayError::malformed(&self.name, e))
    }
}

#[async_trait]
impl ToolGateway for HttpGateway {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_connected(&self) -> bool {
        matches!(self.connection, Connection::Connected(_))
    }

    async fn connect(&mut self) -> Result<(), GatewayError> {
        match self.connection {
            Connection::Connected(_) => return Ok(()),
            Connection::Closed => return Err(GatewayError::NotConnected(self.name.clone())),
            Connection::Idle => {}
        }

        let transport = StreamableHttpClientTransport::from_uri(self.url.as_str());
        let handshake = Self::client_info().serve(transport);
        let client = match tokio::time::timeout(self.timeout, handshake).await {
            Ok(Ok(client)) => client,
            Ok(Err(e)) => return Err(GatewayError::connection(&self.name, e)),
            Err(_) => {
                return Err(GatewayError::connection(
                    &self.name,
                    format!("handshake timed out after {}s", self.timeout.as_secs()),
                ))
            }
        };

        debug!("Connected to {} at {}", self.name, self.url);
        self.connection = Connection::Connected(client);
        Ok(())
    }

    async fn list_tools(&self) -> Result<Vec<Tool>, GatewayError> {
        let client = self.client()?;
        let tools = self.timed(client.peer().list_all_tools()).await?;
        tools.iter().map(|tool| self.convert(tool)).collect()
    }

    async fn invoke(
        &self,
        operation: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolOutput, GatewayError> {
        let client = self.client()?;
        let request = CallToolRequestParam {
            name: Cow::Owned(operation.to_string()),
            arguments: Some(arguments),
        };

        debug!("{} -> {}", self.name, operation);
        let result = self.timed(client.peer().call_tool(request)).await?;
        let result: ToolResult = self.convert(&result)?;
        into_output(&self.name, result)
    }

    async fn disconnect(&mut self) -> Result<(), GatewayError> {
        let previous = std::mem::replace(&mut self.connection, Connection::Closed);
        if let Connection::Connected(client) = previous {
            if let Err(e) = client.cancel().await {
                warn!("Failed to close session on {}: {}", self.name, e);
            }
        }
        Ok(())
    }
}
