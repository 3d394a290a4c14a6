//! Server catalog - the tool servers cloudq knows how to talk to

use crate::protocol::Tool;

/// Tool names the orchestrator invokes
pub mod tools {
    pub const LIST_INSTANCES: &str = "listEC2";
    pub const LIST_BUCKETS: &str = "listS3";
    pub const CREATE_BUCKET: &str = "createBucket";
    pub const PUT_OBJECT: &str = "PutDataInS3";
    pub const WRITE_SPREADSHEET: &str = "writeExcel";
}

/// Built-in tool server definitions
pub static BUILTIN_SERVERS: &[ServerDefinition] = &[
    ServerDefinition {
        name: "ec2",
        default_port: 3001,
        tools: &[ToolDefinition {
            name: tools::LIST_INSTANCES,
            description: "List EC2 instances in specified AWS zone",
        }],
    },
    ServerDefinition {
        name: "s3",
        default_port: 3002,
        tools: &[
            ToolDefinition {
                name: tools::LIST_BUCKETS,
                description: "List S3 buckets and their objects",
            },
            ToolDefinition {
                name: tools::CREATE_BUCKET,
                description: "Create a new S3 bucket",
            },
            ToolDefinition {
                name: tools::PUT_OBJECT,
                description: "Upload base64 content as an object in a bucket",
            },
        ],
    },
    ServerDefinition {
        name: "files",
        default_port: 3003,
        tools: &[ToolDefinition {
            name: tools::WRITE_SPREADSHEET,
            description: "Create Excel file with provided data",
        }],
    },
];

/// A known tool server
#[derive(Debug, Clone)]
pub struct ServerDefinition {
    pub name: &'static str,
    pub default_port: u16,
    pub tools: &'static [ToolDefinition],
}

/// A tool a server is known to provide
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
}

impl ServerDefinition {
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name.to_string()).collect()
    }

    /// The catalog's own description of the server's tools
    pub fn known_tools(&self) -> Vec<Tool> {
        self.tools
            .iter()
            .map(|t| Tool {
                name: t.name.to_string(),
                title: None,
                description: Some(t.description.to_string()),
                input_schema: None,
            })
            .collect()
    }
}

/// Look up a built-in server by name
pub fn get(name: &str) -> Option<&'static ServerDefinition> {
    BUILTIN_SERVERS.iter().find(|s| s.name == name)
}
