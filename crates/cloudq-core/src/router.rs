//! Tool router - maps tool names to the server that provides them
//!
//! Lets the orchestrator call a tool without knowing which server hosts it.

use std::collections::HashMap;

use crate::config::ServerEndpoint;

/// Router for tool invocations
#[derive(Debug, Default, Clone)]
pub struct Router {
    /// Map from tool name to server name
    tool_map: HashMap<String, String>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed routes from the configured endpoints
    pub fn from_endpoints(endpoints: &[ServerEndpoint]) -> Self {
        let mut router = Self::new();
        for endpoint in endpoints {
            for tool in &endpoint.tools {
                router.register(tool, &endpoint.name);
            }
        }
        router
    }

    /// Route a tool to a server. A tool already claimed by another server keeps its first route.
    pub fn register(&mut self, tool: &str, server: &str) -> bool {
        match self.tool_map.get(tool) {
            Some(existing) if existing != server => false,
            _ => {
                self.tool_map.insert(tool.to_string(), server.to_string());
                true
            }
        }
    }

    /// Find which server provides a tool
    pub fn find_server(&self, tool_name: &str) -> Option<&str> {
        self.tool_map.get(tool_name).map(|s| s.as_str())
    }
}
