//! CLI argument parsing for cloudq

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cloudq")]
#[command(about = "Ask about your cloud resources in plain language")]
#[command(version)]
#[command(after_help = "\
EXAMPLES:
    cloudq \"Show me EC2 instances\"
    cloudq \"list s3 buckets and save to excel\"
    cloudq --backend command \"create a bucket called team-assets\"
    cloudq                      (interactive mode)

TOOL SERVERS:
    ec2     http://localhost:3001/mcp
    s3      http://localhost:3002/mcp
    files   http://localhost:3003/mcp

CONFIGURATION:
    ~/.config/cloudq/config.toml

    region = \"ap-southeast-1\"

    [llm]
    backend = \"anthropic\"
    model = \"claude-3-haiku-20240307\"

    [servers.s3]
    port = 4002")]
pub struct Cli {
    /// The request to run (if not provided, enters interactive mode)
    #[arg(trailing_var_arg = true, num_args = 0..)]
    pub prompt_parts: Vec<String>,

    /// Config file (default: ~/.config/cloudq/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the provider region
    #[arg(short = 'r', long)]
    pub region: Option<String>,

    /// Override the LLM backend (anthropic, command)
    #[arg(short = 'b', long)]
    pub backend: Option<String>,

    /// Suppress banner and connection status
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Debug logging on stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// The combined one-shot prompt, if any
    pub fn prompt(&self) -> Option<String> {
        let prompt = self.prompt_parts.join(" ");
        let prompt = prompt.trim();
        if prompt.is_empty() {
            None
        } else {
            Some(prompt.to_string())
        }
    }
}
