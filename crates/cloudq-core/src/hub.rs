//! Tool hub - process-wide set of connected tool servers
//!
//! Opened once at startup and closed once at shutdown. A server that fails
//! to connect stays down for the whole run; calls routed to it fail with
//! `NotConnected`.

use anyhow::Result;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::catalog;
use crate::config::Config;
use crate::error::GatewayError;
use crate::gateway::{HttpGateway, ToolGateway, ToolOutput};
use crate::protocol::Tool;
use crate::router::Router;

/// Tools discovered on one server
#[derive(Debug, Clone)]
pub struct Capability {
    pub server: String,
    pub tools: Vec<Tool>,
}

impl Capability {
    pub fn summaries(&self) -> Vec<String> {
        self.tools.iter().map(Tool::summary).collect()
    }
}

/// Outcome of connecting one server
#[derive(Debug)]
pub struct ConnectReport {
    pub server: String,
    pub result: Result<usize, GatewayError>,
}

/// Registry of tool gateways plus the router in front of them
pub struct ToolHub {
    gateways: Vec<Box<dyn ToolGateway>>,
    router: Router,
    capabilities: Vec<Capability>,
}

impl ToolHub {
    pub fn new(gateways: Vec<Box<dyn ToolGateway>>, router: Router) -> Self {
        Self {
            gateways,
            router,
            capabilities: Vec::new(),
        }
    }

    /// Build HTTP gateways for every configured server
    pub fn from_config(config: &Config) -> Result<Self> {
        let endpoints = config.endpoints()?;
        let router = Router::from_endpoints(&endpoints);
        let mut gateways: Vec<Box<dyn ToolGateway>> = Vec::new();
        for endpoint in &endpoints {
            gateways.push(Box::new(HttpGateway::new(endpoint, config.request_timeout())?));
        }
        Ok(Self::new(gateways, router))
    }

    /// Connect every server and discover its tools.
    /// Failures are reported, not raised: other servers stay usable.
    pub async fn connect_all(&mut self) -> Vec<ConnectReport> {
        let mut reports = Vec::new();
        self.capabilities.clear();

        for gateway in self.gateways.iter_mut() {
            let server = gateway.name().to_string();

            if let Err(e) = gateway.connect().await {
                warn!("Failed to connect to {}: {}", server, e);
                reports.push(ConnectReport {
                    server,
                    result: Err(e),
                });
                continue;
            }

            let tools = match gateway.list_tools().await {
                Ok(tools) => tools,
                Err(e) => {
                    warn!("Connected to {} but tool discovery failed: {}", server, e);
                    catalog::get(&server)
                        .map(|definition| definition.known_tools())
                        .unwrap_or_default()
                }
            };

            for tool in &tools {
                if !self.router.register(&tool.name, &server) {
                    debug!("Tool {} on {} shadowed by an earlier server", tool.name, server);
                }
            }

            info!("Connected to {} ({} tools)", server, tools.len());
            reports.push(ConnectReport {
                server: server.clone(),
                result: Ok(tools.len()),
            });
            self.capabilities.push(Capability { server, tools });
        }

        reports
    }

    /// Tools discovered at connect time, per connected server
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn connected_count(&self) -> usize {
        self.gateways.iter().filter(|g| g.is_connected()).count()
    }

    /// Invoke a tool on whichever server provides it
    pub async fn invoke(
        &self,
        tool: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolOutput, GatewayError> {
        let server = self
            .router
            .find_server(tool)
            .ok_or_else(|| GatewayError::UnknownTool(tool.to_string()))?;

        let gateway = self
            .gateways
            .iter()
            .find(|g| g.name() == server)
            .ok_or_else(|| GatewayError::NotConnected(server.to_string()))?;

        debug!("Routing {} to {}", tool, server);
        gateway.invoke(tool, arguments).await
    }

    /// Disconnect every server. Errors are logged; shutdown always completes.
    pub async fn shutdown(&mut self) {
        for gateway in self.gateways.iter_mut() {
            if let Err(e) = gateway.disconnect().await {
                warn!("Error disconnecting {}: {}", gateway.name(), e);
            }
        }
        self.capabilities.clear();
    }
}
