//! Test doubles: stub gateways, scripted input, canned classifier

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::classifier::Classifier;
use crate::config::Config;
use crate::error::{ClassifierError, DirectiveError, GatewayError};
use crate::gateway::{into_output, ToolGateway, ToolOutput};
use crate::hub::{Capability, ToolHub};
use crate::protocol::{Tool, ToolResult};
use crate::resolve::{LiveSet, Prompter};
use crate::router::Router;

pub const INSTANCES_JSON: &str = r#"{"zone":"ap-southeast-1","count":2,"instances":[
    {"id":"i-0a1","name":"web","state":"running","type":"t3.micro","zone":"ap-southeast-1a"},
    {"id":"i-0b2","name":"db","state":"stopped","type":"t3.large","zone":"ap-southeast-1b"}]}"#;

pub const BUCKETS_JSON: &str = r#"{"bucketCount":2,"buckets":[
    {"name":"reports","creationDate":"2024-03-01T10:00:00.000Z"},
    {"name":"logs-archive","creationDate":"2024-05-12T08:30:00.000Z"}]}"#;

pub const EXPORT_JSON: &str = r#"{"filePath":"/srv/output/ec2-export.xlsx","base64":"UEsDBBQAAAAI"}"#;

/// One recorded tool invocation
#[derive(Debug, Clone)]
pub struct Call {
    pub server: String,
    pub tool: String,
    pub arguments: Map<String, Value>,
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

/// Names of the tools called, in order
pub fn called_tools(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().iter().map(|c| c.tool.clone()).collect()
}

/// Calls of one tool
pub fn calls_of(log: &CallLog, tool: &str) -> Vec<Call> {
    log.lock().unwrap().iter().filter(|c| c.tool == tool).cloned().collect()
}

/// Gateway that answers from canned text and records every call
pub struct StubGateway {
    name: String,
    connected: bool,
    fail_connect: bool,
    fail_discovery: bool,
    tools: Vec<Tool>,
    replies: Mutex<HashMap<String, VecDeque<String>>>,
    log: CallLog,
}

impl StubGateway {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            connected: false,
            fail_connect: false,
            fail_discovery: false,
            tools: Vec::new(),
            replies: Mutex::new(HashMap::new()),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_tool(mut self, tool: &str) -> Self {
        self.tools.push(Tool {
            name: tool.to_string(),
            title: None,
            description: Some("stub tool".to_string()),
            input_schema: None,
        });
        self
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    /// Connects, but tool listing fails
    pub fn failing_discovery(mut self) -> Self {
        self.fail_discovery = true;
        self
    }

    /// Always answer `tool` with `text`
    pub fn respond(self, tool: &str, text: &str) -> Self {
        self.respond_seq(tool, &[text])
    }

    /// Answer successive calls in order; the last reply repeats
    pub fn respond_seq(self, tool: &str, texts: &[&str]) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(tool.to_string(), texts.iter().map(|t| t.to_string()).collect());
        self
    }

    /// Share a call log across several stubs
    pub fn with_log(mut self, log: &CallLog) -> Self {
        self.log = Arc::clone(log);
        self
    }
}

#[async_trait]
impl ToolGateway for StubGateway {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn connect(&mut self) -> Result<(), GatewayError> {
        if self.fail_connect {
            return Err(GatewayError::connection(&self.name, "connection refused"));
        }
        self.connected = true;
        Ok(())
    }

    async fn list_tools(&self) -> Result<Vec<Tool>, GatewayError> {
        if !self.connected {
            return Err(GatewayError::NotConnected(self.name.clone()));
        }
        if self.fail_discovery {
            return Err(GatewayError::malformed(&self.name, "tools/list unsupported"));
        }
        Ok(self.tools.clone())
    }

    async fn invoke(
        &self,
        operation: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolOutput, GatewayError> {
        if !self.connected {
            return Err(GatewayError::NotConnected(self.name.clone()));
        }

        self.log.lock().unwrap().push(Call {
            server: self.name.clone(),
            tool: operation.to_string(),
            arguments,
        });

        let text = {
            let mut replies = self.replies.lock().unwrap();
            let queue = replies.get_mut(operation);
            match queue {
                Some(q) if q.len() > 1 => q.pop_front(),
                Some(q) => q.front().cloned(),
                None => None,
            }
        };

        let text = text.unwrap_or_else(|| format!("Error: no stub reply for {}", operation));
        into_output(&self.name, ToolResult::success(text))
    }

    async fn disconnect(&mut self) -> Result<(), GatewayError> {
        self.connected = false;
        Ok(())
    }
}

/// Hub over stubs, routed like the built-in catalog, already connected
pub async fn connected_hub(gateways: Vec<StubGateway>) -> ToolHub {
    let endpoints = Config::default().endpoints().unwrap();
    let router = Router::from_endpoints(&endpoints);
    let mut hub = ToolHub::new(
        gateways
            .into_iter()
            .map(|g| Box::new(g) as Box<dyn ToolGateway>)
            .collect(),
        router,
    );
    hub.connect_all().await;
    hub
}

/// Prompter that replays scripted answers, then reports closed input
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub questions: Vec<String>,
    pub messages: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn closed() -> Self {
        Self::default()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str) -> Option<String> {
        self.questions.push(question.to_string());
        self.answers.pop_front()
    }

    fn tell(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// Live set yielding scripted snapshots; the last one repeats
pub struct StaticSet {
    snapshots: Mutex<VecDeque<Vec<String>>>,
    fetches: AtomicUsize,
}

impl StaticSet {
    pub fn new(snapshots: Vec<Vec<&str>>) -> Self {
        Self {
            snapshots: Mutex::new(
                snapshots
                    .into_iter()
                    .map(|s| s.into_iter().map(String::from).collect())
                    .collect(),
            ),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LiveSet for StaticSet {
    async fn fetch(&self) -> Result<Vec<String>, DirectiveError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let mut snapshots = self.snapshots.lock().unwrap();
        let current = if snapshots.len() > 1 {
            snapshots.pop_front()
        } else {
            snapshots.front().cloned()
        };
        Ok(current.unwrap_or_default())
    }
}

/// Classifier returning a fixed reply
pub struct CannedClassifier {
    reply: Result<String, String>,
}

impl CannedClassifier {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            reply: Err(reason.to_string()),
        }
    }
}

#[async_trait]
impl Classifier for CannedClassifier {
    async fn classify(
        &self,
        _prompt: &str,
        _capabilities: &[Capability],
    ) -> Result<String, ClassifierError> {
        self.reply.clone().map_err(ClassifierError::Provider)
    }
}
