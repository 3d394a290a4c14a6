//! Result formatting
//!
//! Renders a result bag as display text. Sections appear in a fixed order:
//! instances, buckets, export, upload, creation, errors.

use crate::bag::{Failure, ResultBag};
use crate::resources::{BucketListing, Instance, InstanceListing};

const UNKNOWN: &str = "unknown";

/// Format `bag`, or return `fallback` unchanged when the bag is empty
pub fn format_response(bag: &ResultBag, fallback: &str) -> String {
    if bag.is_empty() {
        return fallback.to_string();
    }

    let mut sections: Vec<String> = Vec::new();

    if let Some(listing) = &bag.instances {
        sections.push(format_instances(listing));
    }
    if let Some(listing) = &bag.buckets {
        sections.push(format_buckets(listing));
    }
    if let Some(export) = &bag.export {
        sections.push(export.message.clone());
    }
    if let Some(message) = &bag.upload {
        sections.push(message.clone());
    }
    if let Some(message) = &bag.creation {
        sections.push(message.clone());
    }
    if !bag.errors.is_empty() {
        sections.push(
            bag.errors
                .iter()
                .map(format_failure)
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }

    sections.join("\n\n")
}

fn format_instances(listing: &InstanceListing) -> String {
    let header = if listing.zone.is_empty() {
        "EC2 Instances:".to_string()
    } else {
        format!("EC2 Instances in {}:", listing.zone)
    };

    let mut lines = vec![header];
    if listing.instances.is_empty() {
        lines.push("(none)".to_string());
    }
    lines.extend(listing.instances.iter().map(format_instance));
    lines.join("\n")
}

fn format_instance(instance: &Instance) -> String {
    format!(
        "- {} ({}): {} - {}",
        instance.name.as_deref().unwrap_or("unnamed"),
        instance.id.as_deref().unwrap_or(UNKNOWN),
        instance.state.as_deref().unwrap_or(UNKNOWN),
        instance.instance_type.as_deref().unwrap_or(UNKNOWN),
    )
}

fn format_buckets(listing: &BucketListing) -> String {
    let mut lines = vec![format!("S3 Buckets ({}):", listing.buckets.len())];
    if listing.buckets.is_empty() {
        lines.push("(none)".to_string());
    }
    for bucket in &listing.buckets {
        let created = bucket
            .creation_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| UNKNOWN.to_string());
        lines.push(format!("- {} (created: {})", bucket.name, created));
    }
    lines.join("\n")
}

fn format_failure(failure: &Failure) -> String {
    match failure.directive {
        Some(directive) => format!("Error [{}]: {}", directive, failure.error),
        None => format!("Error: {}", failure.error),
    }
}
