//! Configuration loading for cloudq
//!
//! Read once at startup: TOML file, then environment overrides. Server
//! entries merge over the built-in catalog, so an empty file yields a
//! working setup against the default local ports.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::{self, BUILTIN_SERVERS};

/// cloudq configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Provider region passed to region-aware tools
    #[serde(default = "default_region")]
    pub region: String,

    /// Tool server request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// LLM classifier settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Per-server overrides and additional servers
    #[serde(default)]
    pub servers: BTreeMap<String, ServerConfig>,
}

fn default_region() -> String {
    "ap-southeast-1".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: default_region(),
            request_timeout: default_request_timeout(),
            llm: LlmConfig::default(),
            servers: BTreeMap::new(),
        }
    }
}

/// Which classifier implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// Anthropic Messages API over HTTP
    Anthropic,
    /// External LLM command line tool
    Command,
}

impl std::str::FromStr for LlmBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "anthropic" => Ok(Self::Anthropic),
            "command" => Ok(Self::Command),
            other => bail!("Unknown LLM backend: {} (expected anthropic or command)", other),
        }
    }
}

/// LLM classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_backend")]
    pub backend: LlmBackend,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Command for the `command` backend
    #[serde(default = "default_command")]
    pub command: String,

    /// Arguments (use {prompt} as placeholder)
    #[serde(default = "default_command_args")]
    pub args: Vec<String>,
}

fn default_backend() -> LlmBackend {
    LlmBackend::Anthropic
}

fn default_model() -> String {
    "claude-3-haiku-20240307".to_string()
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    300
}

fn default_temperature() -> f32 {
    0.3
}

fn default_command() -> String {
    "claude".to_string()
}

fn default_command_args() -> Vec<String> {
    vec!["-p".to_string(), "{prompt}".to_string()]
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            command: default_command(),
            args: default_command_args(),
        }
    }
}

/// Server-specific configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub path: Option<String>,

    /// Tools this server provides, before discovery
    #[serde(default)]
    pub tools: Vec<String>,
}

/// A fully resolved server address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoint {
    pub name: String,
    pub url: String,
    pub tools: Vec<String>,
}

impl Config {
    /// Load from `path`, or from the default location when none is given.
    /// A missing default file means defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Config::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse config from {:?}", path))
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cloudq")
            .join("config.toml")
    }

    /// Apply environment overrides: `AWS_REGION` and `CLOUDQ_<SERVER>_PORT`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(region) = lookup("AWS_REGION").filter(|r| !r.trim().is_empty()) {
            self.region = region.trim().to_string();
        }

        let mut names: Vec<String> = BUILTIN_SERVERS.iter().map(|s| s.name.to_string()).collect();
        names.extend(self.servers.keys().cloned());
        names.sort();
        names.dedup();

        for name in names {
            let key = format!("CLOUDQ_{}_PORT", name.to_uppercase().replace('-', "_"));
            if let Some(port) = lookup(&key).and_then(|p| p.trim().parse::<u16>().ok()) {
                self.servers.entry(name).or_default().port = Some(port);
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Resolve every server (built-in first, then extra configured ones)
    pub fn endpoints(&self) -> Result<Vec<ServerEndpoint>> {
        let mut endpoints = Vec::new();

        for builtin in BUILTIN_SERVERS {
            let overrides = self.servers.get(builtin.name).cloned().unwrap_or_default();
            let port = overrides.port.unwrap_or(builtin.default_port);
            let mut tools = builtin.tool_names();
            tools.extend(overrides.tools.iter().cloned());
            endpoints.push(ServerEndpoint {
                name: builtin.name.to_string(),
                url: build_url(overrides.host.as_deref(), port, overrides.path.as_deref()),
                tools,
            });
        }

        for (name, server) in &self.servers {
            if catalog::get(name).is_some() {
                continue;
            }
            let port = server
                .port
                .with_context(|| format!("Server '{}' has no port configured", name))?;
            endpoints.push(ServerEndpoint {
                name: name.clone(),
                url: build_url(server.host.as_deref(), port, server.path.as_deref()),
                tools: server.tools.clone(),
            });
        }

        Ok(endpoints)
    }
}

fn build_url(host: Option<&str>, port: u16, path: Option<&str>) -> String {
    let host = host.unwrap_or("localhost");
    let path = path.unwrap_or("/mcp");
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    format!("http://{}:{}{}", host, port, path)
}
