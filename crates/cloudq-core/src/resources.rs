//! Resource descriptors returned by data-bearing tools

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A compute instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, rename = "type")]
    pub instance_type: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub public_ip: Option<String>,
    #[serde(default)]
    pub private_ip: Option<String>,
}

/// Payload of the instance listing tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceListing {
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub instances: Vec<Instance>,
}

/// A storage bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub name: String,
    #[serde(default)]
    pub creation_date: Option<DateTime<Utc>>,
}

/// Payload of the bucket listing tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketListing {
    #[serde(default)]
    pub bucket_count: usize,
    #[serde(default)]
    pub buckets: Vec<Bucket>,
}

impl BucketListing {
    pub fn names(&self) -> Vec<String> {
        self.buckets.iter().map(|b| b.name.clone()).collect()
    }
}

/// Which fetched listing an export was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Instances,
    Buckets,
}

impl ListingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingKind::Instances => "ec2",
            ListingKind::Buckets => "s3",
        }
    }

    /// Generated file name, without extension
    pub fn export_filename(&self) -> String {
        format!("{}-export", self.as_str())
    }

    pub fn sheet_title(&self) -> &'static str {
        match self {
            ListingKind::Instances => "EC2 Instances",
            ListingKind::Buckets => "S3 Buckets",
        }
    }
}

/// A generated file and its encoded contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportArtifact {
    pub file_path: String,
    #[serde(rename = "base64")]
    pub content_base64: String,
}

impl ExportArtifact {
    /// Object key for upload: the base file name
    pub fn upload_key(&self) -> String {
        self.file_path
            .rsplit(|c| c == '/' || c == '\\')
            .next()
            .filter(|k| !k.is_empty())
            .unwrap_or("output.xlsx")
            .to_string()
    }
}
