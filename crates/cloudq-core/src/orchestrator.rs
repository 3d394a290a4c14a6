//! Directive orchestrator
//!
//! Runs one request's directives phase by phase (fetch, create, derive,
//! publish) against the tool hub. Every directive is attempted at most once
//! and its failure is recorded in the result bag; nothing escapes `execute`.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::bag::{ExportOutcome, ResultBag};
use crate::catalog::tools;
use crate::directive::{Classification, Directive, Phase, PARAM_BUCKET};
use crate::error::DirectiveError;
use crate::hub::ToolHub;
use crate::resolve::{resolve_existing, resolve_new_name, LiveSet, Prompter};
use crate::resources::{BucketListing, ExportArtifact, InstanceListing, ListingKind};

const PHASES: [Phase; 4] = [Phase::Fetch, Phase::Create, Phase::Derive, Phase::Publish];

/// Executes classified directives for one request at a time
pub struct Orchestrator<'a> {
    hub: &'a ToolHub,
    region: String,
}

impl<'a> Orchestrator<'a> {
    pub fn new(hub: &'a ToolHub, region: impl Into<String>) -> Self {
        Self {
            hub,
            region: region.into(),
        }
    }

    /// Run every directive in `classification` and collect the results
    pub async fn execute(
        &self,
        classification: &Classification,
        user_prompt: &str,
        prompter: &mut dyn Prompter,
    ) -> ResultBag {
        let mut bag = ResultBag::new();

        for phase in PHASES {
            for directive in classification.directives.in_phase(phase) {
                let outcome = match directive {
                    Directive::ListInstances => self.list_instances(&mut bag).await,
                    Directive::ListBuckets => self.list_buckets(&mut bag).await,
                    Directive::CreateBucket => {
                        self.create_bucket(classification, user_prompt, prompter, &mut bag)
                            .await
                    }
                    Directive::Export => self.export(&mut bag).await,
                    Directive::Upload => {
                        self.upload(classification, user_prompt, prompter, &mut bag)
                            .await
                    }
                };

                if let Err(e) = outcome {
                    warn!("{} failed ({}): {}", directive, e.kind(), e);
                    bag.record_error(Some(directive), e);
                }
            }
        }

        bag
    }

    async fn list_instances(&self, bag: &mut ResultBag) -> Result<(), DirectiveError> {
        info!("Listing instances in {}", self.region);
        let output = self
            .hub
            .invoke(tools::LIST_INSTANCES, arguments(json!({ "zone": self.region })))
            .await?;
        let listing: InstanceListing = output.parse()?;
        debug!("Fetched {} instances", listing.instances.len());
        bag.instances = Some(listing);
        Ok(())
    }

    async fn list_buckets(&self, bag: &mut ResultBag) -> Result<(), DirectiveError> {
        info!("Listing buckets");
        let output = self.hub.invoke(tools::LIST_BUCKETS, Map::new()).await?;
        let listing: BucketListing = output.parse()?;
        debug!("Fetched {} buckets", listing.buckets.len());
        bag.buckets = Some(listing);
        Ok(())
    }

    async fn create_bucket(
        &self,
        classification: &Classification,
        user_prompt: &str,
        prompter: &mut dyn Prompter,
        bag: &mut ResultBag,
    ) -> Result<(), DirectiveError> {
        let name = resolve_new_name(user_prompt, classification.param(PARAM_BUCKET), prompter)?;

        info!("Creating bucket {} in {}", name, self.region);
        let output = self
            .hub
            .invoke(
                tools::CREATE_BUCKET,
                arguments(json!({ "bucketName": name, "region": self.region })),
            )
            .await?;
        bag.creation = Some(output.text);
        Ok(())
    }

    async fn export(&self, bag: &mut ResultBag) -> Result<(), DirectiveError> {
        let outcome = self.write_export(bag).await?;
        match outcome {
            Some(outcome) => bag.export = Some(outcome),
            None => debug!("Nothing fetched, skipping export"),
        }
        Ok(())
    }

    /// Write the fetched listing to a spreadsheet. Instances win over buckets.
    /// Returns `None` when nothing was fetched.
    async fn write_export(&self, bag: &ResultBag) -> Result<Option<ExportOutcome>, DirectiveError> {
        let (kind, data) = match (&bag.instances, &bag.buckets) {
            (Some(listing), _) => (ListingKind::Instances, to_value(listing)?),
            (None, Some(listing)) => (ListingKind::Buckets, to_value(listing)?),
            (None, None) => return Ok(None),
        };

        info!("Exporting {} listing", kind.as_str());
        let output = self
            .hub
            .invoke(
                tools::WRITE_SPREADSHEET,
                arguments(json!({
                    "filename": kind.export_filename(),
                    "data": data,
                    "sheetName": kind.sheet_title(),
                })),
            )
            .await?;

        let outcome = match output.parse::<ExportArtifact>() {
            Ok(artifact) => ExportOutcome {
                kind,
                message: format!("Excel file created: {}", artifact.file_path),
                artifact: Some(artifact),
            },
            Err(_) => ExportOutcome {
                kind,
                message: output.text,
                artifact: None,
            },
        };
        Ok(Some(outcome))
    }

    async fn upload(
        &self,
        classification: &Classification,
        user_prompt: &str,
        prompter: &mut dyn Prompter,
        bag: &mut ResultBag,
    ) -> Result<(), DirectiveError> {
        if classification.directives.contains(Directive::Export) && bag.failed(Directive::Export) {
            return Err(DirectiveError::MissingPrerequisite(
                "Upload skipped because the Excel export failed.".to_string(),
            ));
        }

        if bag.artifact().is_none() {
            let synthesized = self.write_export(bag).await?;
            if let Some(outcome) = synthesized {
                debug!("Synthesized export for upload");
                bag.export = Some(outcome);
            }
        }

        let artifact = bag.artifact().cloned().ok_or_else(|| {
            DirectiveError::MissingPrerequisite(
                "No Excel data available to upload. Please include USE_EXCEL to generate the file first."
                    .to_string(),
            )
        })?;

        let live = LiveBuckets { hub: self.hub };
        let bucket = resolve_existing(user_prompt, &live, prompter).await?;
        let key = artifact.upload_key();

        info!("Uploading {} to bucket {}", key, bucket);
        let output = self
            .hub
            .invoke(
                tools::PUT_OBJECT,
                arguments(json!({
                    "bucketName": bucket,
                    "key": key,
                    "contentBase64": artifact.content_base64,
                })),
            )
            .await?;
        bag.upload = Some(output.text);
        Ok(())
    }
}

/// Bucket names as currently listed by the storage server
struct LiveBuckets<'a> {
    hub: &'a ToolHub,
}

#[async_trait]
impl<'a> LiveSet for LiveBuckets<'a> {
    async fn fetch(&self) -> Result<Vec<String>, DirectiveError> {
        let output = self.hub.invoke(tools::LIST_BUCKETS, Map::new()).await?;
        let listing: BucketListing = output.parse()?;
        Ok(listing.names())
    }
}

fn arguments(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn to_value<T: serde::Serialize>(payload: &T) -> Result<Value, DirectiveError> {
    serde_json::to_value(payload).map_err(|e| DirectiveError::Malformed(e.to_string()))
}
