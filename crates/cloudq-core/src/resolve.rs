//! Parameter resolution
//!
//! Resolves a required name (bucket to create, bucket to upload into) from
//! the user's own prompt first, then interactively. Names the LLM proposed
//! are only ever offered as a suggestion.

use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::directive::{trim_token, Directive};
use crate::error::DirectiveError;

/// Lowercase alphanumerics and hyphens, 3-63 chars, no leading/trailing hyphen
pub const NAME_PATTERN: &str = r"^[a-z0-9][a-z0-9-]{1,61}[a-z0-9]$";

/// Words that look like names but are part of the request itself
const STOP_WORDS: &[&str] = &[
    "a", "about", "all", "also", "an", "and", "any", "aws", "bucket", "buckets", "call", "called",
    "can", "create", "data", "ec2", "excel", "export", "file", "files", "for", "from", "give",
    "into", "instance", "instances", "it", "list", "make", "me", "my", "name", "named", "new",
    "now", "object", "objects", "of", "on", "please", "put", "s3", "save", "sheet", "show",
    "spreadsheet", "that", "the", "then", "this", "to", "upload", "want", "with", "xlsx", "you",
];

fn name_regex() -> &'static Regex {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    NAME_RE.get_or_init(|| Regex::new(NAME_PATTERN).expect("name pattern compiles"))
}

/// Check a candidate name against the naming pattern
pub fn is_valid_name(candidate: &str) -> bool {
    name_regex().is_match(candidate)
}

/// Validate a candidate, returning it on success
pub fn validate_name(candidate: &str) -> Result<&str, DirectiveError> {
    if is_valid_name(candidate) {
        Ok(candidate)
    } else {
        Err(DirectiveError::Validation(candidate.to_string()))
    }
}

/// All plausible names in the user's prompt, in order of appearance
pub fn prompt_candidates(prompt: &str) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();
    for word in prompt.split_whitespace().map(trim_token) {
        if !is_valid_name(word) || STOP_WORDS.contains(&word) || Directive::is_echo(word) {
            continue;
        }
        if !candidates.iter().any(|c| c == word) {
            candidates.push(word.to_string());
        }
    }
    candidates
}

/// The name the user unambiguously gave: the only candidate in the prompt
pub fn user_candidate(prompt: &str) -> Option<String> {
    let mut candidates = prompt_candidates(prompt).into_iter();
    match (candidates.next(), candidates.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

/// Source of interactive answers
pub trait Prompter {
    /// Ask a question. `None` means input is closed or was cancelled.
    fn ask(&mut self, question: &str) -> Option<String>;

    /// Show an informational line
    fn tell(&mut self, message: &str);
}

/// A live set of names an answer must belong to
#[async_trait]
pub trait LiveSet: Send + Sync {
    async fn fetch(&self) -> Result<Vec<String>, DirectiveError>;
}

/// Resolve the name of a resource to create.
///
/// The user's own candidate wins. Otherwise the user is always asked, even
/// when the LLM proposed a name (`suggestion`). An empty answer aborts; an
/// invalid one re-prompts.
pub fn resolve_new_name(
    user_prompt: &str,
    suggestion: Option<&str>,
    prompter: &mut dyn Prompter,
) -> Result<String, DirectiveError> {
    if let Some(candidate) = user_candidate(user_prompt) {
        debug!("Using name from prompt: {}", candidate);
        return Ok(candidate);
    }

    let question = match suggestion.filter(|s| is_valid_name(s)) {
        Some(s) => format!("Please provide a unique S3 bucket name (suggested: {}): ", s),
        None => "Please provide a unique S3 bucket name (e.g., my-bucket-1234): ".to_string(),
    };

    loop {
        let answer = prompter.ask(&question).ok_or_else(|| {
            DirectiveError::InputUnavailable("No input available for the bucket name".to_string())
        })?;
        let answer = answer.trim();

        if answer.is_empty() {
            return Err(DirectiveError::InputUnavailable(
                "Bucket name is required to create a bucket.".to_string(),
            ));
        }

        match validate_name(answer) {
            Ok(name) => return Ok(name.to_string()),
            Err(e) => prompter.tell(&e.to_string()),
        }
    }
}

/// Resolve a name that must exist in `live`.
///
/// The set is fetched before the first check and again after every answer,
/// so a bucket created elsewhere in the meantime is accepted.
pub async fn resolve_existing(
    user_prompt: &str,
    live: &dyn LiveSet,
    prompter: &mut dyn Prompter,
) -> Result<String, DirectiveError> {
    let mut available = live.fetch().await?;

    if let Some(found) = prompt_candidates(user_prompt)
        .into_iter()
        .find(|c| available.contains(c))
    {
        debug!("Using existing name from prompt: {}", found);
        return Ok(found);
    }

    loop {
        let question = if available.is_empty() {
            prompter.tell("No buckets found.");
            "No buckets found. Please create one first or enter a valid existing bucket name: "
        } else {
            prompter.tell(&format!("Available buckets: {}", available.join(", ")));
            "Enter a valid bucket name from the list above: "
        };

        let answer = prompter.ask(question).ok_or_else(|| {
            DirectiveError::InputUnavailable("No input available to choose a bucket".to_string())
        })?;
        let answer = answer.trim().to_string();

        available = live.fetch().await?;
        if !answer.is_empty() && available.contains(&answer) {
            return Ok(answer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedPrompter, StaticSet};

    #[test]
    fn test_valid_names() {
        for name in ["abc", "my-bucket-1234", "0ad", "a".repeat(63).as_str()] {
            assert!(is_valid_name(name), "{} should be valid", name);
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in [
            "ab",
            "My-Bucket",
            "my_bucket",
            "-abc",
            "abc-",
            "a b c",
            "",
            "a".repeat(64).as_str(),
        ] {
            assert!(!is_valid_name(name), "{} should be invalid", name);
            assert!(validate_name(name).is_err());
        }
    }

    #[test]
    fn test_prompt_candidates_filter_stop_words() {
        assert_eq!(
            prompt_candidates("create a bucket named sales-data-2024 please"),
            vec!["sales-data-2024".to_string()]
        );
        assert!(prompt_candidates("create a bucket").is_empty());
        assert!(prompt_candidates("Show me EC2 instances").is_empty());
        assert!(prompt_candidates("create CREATE_S3 bucket").is_empty());
    }

    #[test]
    fn test_user_candidate_ambiguity() {
        assert_eq!(user_candidate("create bucket reports"), Some("reports".to_string()));
        assert_eq!(user_candidate("create bucket for finance called finance-2024"), None);
        assert_eq!(user_candidate("create a bucket named sales in us-east-1"), None);
        assert_eq!(user_candidate("create bucket reports archive"), None);
        assert_eq!(user_candidate("create bucket logs-a logs-b"), None);
    }

    #[test]
    fn test_new_name_from_prompt_skips_question() {
        let mut prompter = ScriptedPrompter::new(Vec::<&str>::new());
        let name =
            resolve_new_name("create bucket team-assets", Some("llm-name"), &mut prompter).unwrap();
        assert_eq!(name, "team-assets");
        assert!(prompter.questions.is_empty());
    }

    #[test]
    fn test_new_name_asks_even_with_llm_suggestion() {
        let mut prompter = ScriptedPrompter::new(["my-bucket-1234"]);
        let name = resolve_new_name("create a bucket", Some("llm-name"), &mut prompter).unwrap();
        assert_eq!(name, "my-bucket-1234");
        assert_eq!(prompter.questions.len(), 1);
        assert!(prompter.questions[0].contains("suggested: llm-name"));
    }

    #[test]
    fn test_new_name_empty_answer_aborts() {
        let mut prompter = ScriptedPrompter::new(["   "]);
        let err = resolve_new_name("create a bucket", None, &mut prompter).unwrap_err();
        assert_eq!(
            err,
            DirectiveError::InputUnavailable(
                "Bucket name is required to create a bucket.".to_string()
            )
        );
        assert_eq!(prompter.questions.len(), 1);
    }

    #[test]
    fn test_new_name_invalid_answer_reprompts() {
        let mut prompter = ScriptedPrompter::new(["Bad_Name", "good-name"]);
        let name = resolve_new_name("create a bucket", None, &mut prompter).unwrap();
        assert_eq!(name, "good-name");
        assert_eq!(prompter.questions.len(), 2);
        assert!(prompter.messages[0].contains("Bad_Name"));
    }

    #[test]
    fn test_new_name_closed_input() {
        let mut prompter = ScriptedPrompter::closed();
        let err = resolve_new_name("create a bucket", None, &mut prompter).unwrap_err();
        assert_eq!(err.kind(), "input_unavailable");
    }

    #[tokio::test]
    async fn test_existing_from_prompt() {
        let live = StaticSet::new(vec![vec!["alpha-1", "reports"]]);
        let mut prompter = ScriptedPrompter::new(Vec::<&str>::new());
        let name = resolve_existing("upload it to reports", &live, &mut prompter).await.unwrap();
        assert_eq!(name, "reports");
        assert_eq!(live.fetches(), 1);
        assert!(prompter.questions.is_empty());
    }

    #[tokio::test]
    async fn test_existing_refetches_every_answer() {
        // The bucket only shows up on the third listing
        let live = StaticSet::new(vec![
            vec!["alpha-1"],
            vec!["alpha-1"],
            vec!["alpha-1", "fresh-bucket"],
        ]);
        let mut prompter = ScriptedPrompter::new(["fresh-bucket", "fresh-bucket"]);
        let name = resolve_existing("upload the file", &live, &mut prompter).await.unwrap();
        assert_eq!(name, "fresh-bucket");
        assert_eq!(live.fetches(), 3);
        assert_eq!(prompter.questions.len(), 2);
        assert!(prompter.messages[0].contains("alpha-1"));
    }

    #[tokio::test]
    async fn test_existing_closed_input() {
        let live = StaticSet::new(vec![vec![]]);
        let mut prompter = ScriptedPrompter::closed();
        let err = resolve_existing("upload", &live, &mut prompter).await.unwrap_err();
        assert_eq!(err.kind(), "input_unavailable");
        assert_eq!(prompter.messages, vec!["No buckets found.".to_string()]);
    }
}
