//! Directive parsing
//!
//! Turns raw LLM output into a structured classification: the set of
//! recognized directive tokens plus any literal parameters it carried.
//! Recognition is plain substring membership; no fuzzy matching.

use std::collections::{BTreeSet, HashMap};

use crate::resolve::is_valid_name;

/// Parameter key for a bucket name found in the LLM output
pub const PARAM_BUCKET: &str = "bucket";

/// A recognized control token
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Directive {
    /// Fetch compute instances
    ListInstances,
    /// Fetch storage buckets
    ListBuckets,
    /// Create a named bucket
    CreateBucket,
    /// Export fetched data to a spreadsheet
    Export,
    /// Upload the exported spreadsheet to a bucket
    Upload,
}

/// Execution phase; the orchestrator runs phases in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Fetch,
    Create,
    Derive,
    Publish,
}

impl Directive {
    pub const ALL: [Directive; 5] = [
        Directive::ListInstances,
        Directive::ListBuckets,
        Directive::CreateBucket,
        Directive::Export,
        Directive::Upload,
    ];

    /// The token the LLM emits
    pub fn token(&self) -> &'static str {
        match self {
            Directive::ListInstances => "USE_EC2",
            Directive::ListBuckets => "USE_S3",
            Directive::CreateBucket => "CREATE_S3",
            Directive::Export => "USE_EXCEL",
            Directive::Upload => "PutObjectInS3",
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            Directive::ListInstances | Directive::ListBuckets => Phase::Fetch,
            Directive::CreateBucket => Phase::Create,
            Directive::Export => Phase::Derive,
            Directive::Upload => Phase::Publish,
        }
    }

    /// When to emit the token, for the classifier prompt
    pub fn usage(&self) -> &'static str {
        match self {
            Directive::ListInstances => "the user wants EC2 instance data",
            Directive::ListBuckets => "the user wants S3 bucket data",
            Directive::CreateBucket => {
                "the user wants to create an S3 bucket (append the name if the user gave one)"
            }
            Directive::Export => "the user wants Excel/file output",
            Directive::Upload => "the user wants to put a file or data into a bucket",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.token() == token)
    }

    /// True if `word` echoes a directive token (case-insensitive)
    pub fn is_echo(word: &str) -> bool {
        Self::ALL.iter().any(|d| d.token().eq_ignore_ascii_case(word)) || word.starts_with("USE_")
    }
}

impl std::fmt::Display for Directive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Unordered set of directives; membership is all that matters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveSet(BTreeSet<Directive>);

impl DirectiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, directive: Directive) -> bool {
        self.0.contains(&directive)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Directives belonging to one phase
    pub fn in_phase(&self, phase: Phase) -> impl Iterator<Item = Directive> + '_ {
        self.0.iter().copied().filter(move |d| d.phase() == phase)
    }
}

impl FromIterator<Directive> for DirectiveSet {
    fn from_iter<I: IntoIterator<Item = Directive>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Structured result of parsing LLM output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub directives: DirectiveSet,
    pub params: HashMap<String, String>,
    /// The raw LLM text, used verbatim when no directive is present
    pub raw: String,
}

impl Classification {
    /// No directive recognized: the raw text is a direct answer
    pub fn is_direct_answer(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(|s| s.as_str())
    }
}

/// Parse raw LLM output
pub fn parse(text: &str) -> Classification {
    let directives: DirectiveSet = Directive::ALL
        .into_iter()
        .filter(|d| text.contains(d.token()))
        .collect();

    let mut params = HashMap::new();
    if !directives.is_empty() {
        if let Some(bucket) = extract_literal(text) {
            params.insert(PARAM_BUCKET.to_string(), bucket);
        }
    }

    Classification {
        directives,
        params,
        raw: text.to_string(),
    }
}

/// First non-directive token that is a valid resource name
fn extract_literal(text: &str) -> Option<String> {
    text.split_whitespace()
        .map(trim_token)
        .filter(|t| !t.is_empty() && !Directive::is_echo(t))
        .find(|t| is_valid_name(t))
        .map(String::from)
}

/// Strip quotes and trailing punctuation around a word
pub(crate) fn trim_token(word: &str) -> &str {
    word.trim_matches(|c: char| {
        matches!(c, '"' | '\'' | '`' | ',' | '.' | ';' | ':' | '!' | '?' | '(' | ')' | '[' | ']')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_directives_is_direct_answer() {
        let text = "An S3 bucket is a container for objects.";
        let c = parse(text);
        assert!(c.is_direct_answer());
        assert_eq!(c.raw, text);
        assert!(c.params.is_empty());
    }

    #[test]
    fn test_membership_ignores_order() {
        let a = parse("USE_EXCEL USE_EC2");
        let b = parse("USE_EC2 USE_EXCEL");
        assert_eq!(a.directives, b.directives);
        assert!(a.directives.contains(Directive::ListInstances));
        assert!(a.directives.contains(Directive::Export));
        assert_eq!(a.directives.len(), 2);
    }

    #[test]
    fn test_create_with_name() {
        let c = parse("CREATE_S3 quarterly-reports-2024");
        assert!(c.directives.contains(Directive::CreateBucket));
        assert_eq!(c.param(PARAM_BUCKET), Some("quarterly-reports-2024"));
    }

    #[test]
    fn test_directive_echo_is_not_a_name() {
        let c = parse("CREATE_S3");
        assert_eq!(c.param(PARAM_BUCKET), None);

        let c = parse("CREATE_S3 \"My_Bucket\"");
        assert_eq!(c.param(PARAM_BUCKET), None);
    }

    #[test]
    fn test_quoted_name_is_trimmed() {
        let c = parse("CREATE_S3 'logs-archive',");
        assert_eq!(c.param(PARAM_BUCKET), Some("logs-archive"));
    }

    #[test]
    fn test_phases() {
        let set: DirectiveSet = Directive::ALL.into_iter().collect();
        let fetch: Vec<Directive> = set.in_phase(Phase::Fetch).collect();
        assert_eq!(fetch, vec![Directive::ListInstances, Directive::ListBuckets]);
        assert_eq!(Directive::Upload.phase(), Phase::Publish);
        assert!(Phase::Create < Phase::Derive);
    }

    #[test]
    fn test_tokens_round_trip() {
        for d in Directive::ALL {
            assert_eq!(Directive::from_token(d.token()), Some(d));
        }
        assert!(Directive::is_echo("putobjectins3"));
        assert!(!Directive::is_echo("reports"));
    }
}
