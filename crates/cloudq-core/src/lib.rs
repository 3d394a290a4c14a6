//! cloudq core - natural-language front end for cloud resource tools
//!
//! A user prompt is classified by an LLM into a small vocabulary of
//! directives, which the orchestrator executes against remote MCP tool
//! servers (instances, buckets, spreadsheet export) before the results are
//! formatted back into text.

pub mod assistant;
pub mod bag;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod directive;
pub mod error;
pub mod format;
pub mod gateway;
pub mod hub;
pub mod orchestrator;
pub mod protocol;
pub mod resolve;
pub mod resources;
pub mod router;

#[cfg(test)]
pub(crate) mod testing;

pub use assistant::Assistant;
pub use bag::ResultBag;
pub use classifier::Classifier;
pub use config::Config;
pub use directive::{Classification, Directive};
pub use error::{ClassifierError, DirectiveError, GatewayError};
pub use hub::ToolHub;
pub use resolve::Prompter;
