//! cloudq - natural-language front end for cloud resource tools
//!
//! Connects to the ec2, s3 and files MCP servers, asks an LLM which tools a
//! request needs, runs them and prints the combined result.
//!
//! # Examples
//!
//! ```bash
//! cloudq "Show me EC2 instances"
//! cloudq "list ec2 and save to excel"
//! cloudq
//! ```

mod cli;
mod prompter;
mod repl;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::DefaultEditor;
use tokio::runtime::{Builder, Runtime};
use tracing_subscriber::EnvFilter;

use cloudq_core::classifier;
use cloudq_core::config::LlmBackend;
use cloudq_core::hub::ConnectReport;
use cloudq_core::{Assistant, Config, ToolHub};

use crate::cli::Cli;
use crate::prompter::LinePrompter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(region) = &cli.region {
        config.region = region.clone();
    }
    if let Some(backend) = &cli.backend {
        config.llm.backend = backend.parse::<LlmBackend>()?;
    }

    let classifier = classifier::from_config(&config.llm, config.request_timeout())
        .context("Failed to set up the LLM classifier")?;

    // One request at a time; directives never run concurrently
    let rt = Builder::new_current_thread().enable_all().build()?;

    let mut hub = ToolHub::from_config(&config)?;
    let reports = rt.block_on(hub.connect_all());
    if !cli.quiet {
        print_reports(&reports);
    }

    let mut assistant = Assistant::new(hub, classifier, config.region.clone());

    let result = match cli.prompt() {
        Some(prompt) => run_oneshot(&rt, &assistant, &prompt),
        None => repl::run(&cli, &rt, &assistant),
    };

    rt.block_on(assistant.shutdown());
    result
}

/// Logs go to stderr so stdout stays the conversation
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("cloudq=debug,cloudq_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_reports(reports: &[ConnectReport]) {
    for report in reports {
        match &report.result {
            Ok(count) => eprintln!(
                "{} Connected to {} ({} tools)",
                "✓".green(),
                report.server,
                count
            ),
            Err(e) => eprintln!("{} {}", "✗".red(), e),
        }
    }
}

fn run_oneshot(rt: &Runtime, assistant: &Assistant, prompt: &str) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    let mut prompter = LinePrompter::new(&mut editor);
    let answer = rt.block_on(assistant.process(prompt, &mut prompter));
    println!("{}", answer);
    Ok(())
}
