//! Interactive REPL for cloudq

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use tokio::runtime::Runtime;

use cloudq_core::Assistant;

use crate::cli::Cli;
use crate::prompter::LinePrompter;

/// What a REPL line asks for
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Quit,
    Help,
    Tools,
    Request(&'a str),
}

impl<'a> Line<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let command = match line.to_lowercase().as_str() {
            "quit" | "exit" => Line::Quit,
            "help" | "?" => Line::Help,
            "tools" => Line::Tools,
            _ => Line::Request(line),
        };
        Some(command)
    }
}

fn history_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cloudq")
        .join("history.txt")
}

/// Run the read loop until quit, exit or Ctrl-D
pub fn run(cli: &Cli, rt: &Runtime, assistant: &Assistant) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let history_path = history_path();
    let _ = rl.load_history(&history_path);

    if !cli.quiet {
        print_banner();
    }

    loop {
        match rl.readline(&format!("{} ", ">".cyan())) {
            Ok(input) => {
                let Some(line) = Line::parse(&input) else {
                    continue;
                };

                match line {
                    Line::Quit => break,
                    Line::Help => print_help(),
                    Line::Tools => print_tools(assistant),
                    Line::Request(request) => {
                        let _ = rl.add_history_entry(request);
                        let mut prompter = LinePrompter::new(&mut rl);
                        let answer = rt.block_on(assistant.process(request, &mut prompter));
                        println!();
                        println!("{}", answer);
                        println!();
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C - cancel current input
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D - exit
                break;
            }
            Err(err) => {
                eprintln!("{} {:?}", "Error:".red(), err);
                break;
            }
        }
    }

    if let Some(parent) = history_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = rl.save_history(&history_path);

    Ok(())
}

fn print_banner() {
    println!();
    println!(
        "{} Type your questions or {} to exit.",
        "cloudq ready!".bold(),
        "quit".cyan()
    );
    println!(
        "{}",
        "Try: \"Show me EC2 instances\", \"List S3 buckets\", \"Show EC2 and save to Excel\"".dimmed()
    );
    println!();
}

fn print_help() {
    println!();
    println!("{}", "cloudq Commands".bold());
    println!("{}", "=".repeat(15).dimmed());
    println!();
    println!("  {}   - Exit and disconnect tool servers", "quit, exit".cyan());
    println!("  {}      - Show this help", "help, ?".cyan());
    println!("  {}        - List discovered tools", "tools".cyan());
    println!();
    println!("  {}       - Cancel current input or a pending question", "Ctrl-C".dimmed());
    println!("  {}       - Exit", "Ctrl-D".dimmed());
    println!();
    println!("Anything else is sent to the assistant.");
    println!();
}

fn print_tools(assistant: &Assistant) {
    let capabilities = assistant.hub().capabilities();
    if capabilities.is_empty() {
        println!("{}", "No tool servers connected".dimmed());
        return;
    }
    for capability in capabilities {
        println!("{}", capability.server.bold());
        for summary in capability.summaries() {
            println!("  {}", summary);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_is_case_insensitive() {
        assert_eq!(Line::parse("quit"), Some(Line::Quit));
        assert_eq!(Line::parse("  QUIT \n"), Some(Line::Quit));
        assert_eq!(Line::parse("Exit"), Some(Line::Quit));
    }

    #[test]
    fn test_commands() {
        assert_eq!(Line::parse("?"), Some(Line::Help));
        assert_eq!(Line::parse("tools"), Some(Line::Tools));
        assert_eq!(Line::parse("   "), None);
    }

    #[test]
    fn test_requests_are_trimmed() {
        assert_eq!(
            Line::parse("  quit listing my buckets "),
            Some(Line::Request("quit listing my buckets"))
        );
    }
}
