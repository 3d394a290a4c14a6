//! Result bag - per-request accumulator of directive outputs
//!
//! One slot per result kind. Created fresh for every request and dropped
//! once formatted.

use crate::directive::Directive;
use crate::error::DirectiveError;
use crate::resources::{BucketListing, ExportArtifact, InstanceListing, ListingKind};

/// Output of the export step
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub kind: ListingKind,
    /// Human-readable confirmation
    pub message: String,
    /// Present when the tool returned the generated file
    pub artifact: Option<ExportArtifact>,
}

/// A failure recorded against a directive (or the request as a whole)
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub directive: Option<Directive>,
    pub error: DirectiveError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultBag {
    pub instances: Option<InstanceListing>,
    pub buckets: Option<BucketListing>,
    pub export: Option<ExportOutcome>,
    pub upload: Option<String>,
    pub creation: Option<String>,
    pub errors: Vec<Failure>,
}

impl ResultBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_none()
            && self.buckets.is_none()
            && self.export.is_none()
            && self.upload.is_none()
            && self.creation.is_none()
            && self.errors.is_empty()
    }

    pub fn artifact(&self) -> Option<&ExportArtifact> {
        self.export.as_ref().and_then(|e| e.artifact.as_ref())
    }

    pub fn record_error(&mut self, directive: Option<Directive>, error: DirectiveError) {
        self.errors.push(Failure { directive, error });
    }

    pub fn failed(&self, directive: Directive) -> bool {
        self.errors.iter().any(|f| f.directive == Some(directive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bag() {
        let bag = ResultBag::new();
        assert!(bag.is_empty());
        assert!(bag.artifact().is_none());
    }

    #[test]
    fn test_errors_are_scoped() {
        let mut bag = ResultBag::new();
        bag.record_error(
            Some(Directive::Export),
            DirectiveError::Tool("Error: disk full".to_string()),
        );
        assert!(!bag.is_empty());
        assert!(bag.failed(Directive::Export));
        assert!(!bag.failed(Directive::Upload));
    }

    #[test]
    fn test_export_without_artifact() {
        let mut bag = ResultBag::new();
        bag.export = Some(ExportOutcome {
            kind: ListingKind::Buckets,
            message: "Excel file created successfully: /tmp/s3-export.xlsx".to_string(),
            artifact: None,
        });
        assert!(bag.artifact().is_none());
    }
}
