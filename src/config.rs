//! Configuration module for docmerge.
//!
//! This module defines the settings surface the engine consumes from its
//! host, the per-call output settings, and the document metadata value
//! type. It handles:
//! - Deserialization of persisted host settings (unknown options ignored)
//! - Validation of setting combinations
//! - Application of defaults
//! - Normalization of metadata fields

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::error::MergeError;

/// Metadata to set on the output document.
///
/// All fields are optional; empty or whitespace-only values are treated
/// as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocMetadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
}

impl DocMetadata {
    /// Create metadata from optional strings, trimming whitespace.
    pub fn new(title: Option<String>, author: Option<String>, subject: Option<String>) -> Self {
        let to_string_opt = |opt: Option<String>| {
            opt.filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
        };

        Self {
            title: to_string_opt(title),
            author: to_string_opt(author),
            subject: to_string_opt(subject),
        }
    }

    /// Check if any metadata fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.subject.is_none()
    }
}

/// Desired output for one merge call.
///
/// The file name may be extension-less or carry a mismatched extension;
/// the orchestrator appends or corrects it for the resolved format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSpec {
    /// Desired output file name.
    pub file_name: String,

    /// Metadata applied to the produced document.
    #[serde(default)]
    pub metadata: DocMetadata,
}

impl OutputSpec {
    /// Create an output spec.
    pub fn new(file_name: impl Into<String>, metadata: DocMetadata) -> Self {
        Self {
            file_name: file_name.into(),
            metadata,
        }
    }

    /// Derive an output spec from the persisted host settings.
    pub fn from_config(config: &MergeConfig) -> Self {
        Self {
            file_name: config.output_file_name.clone(),
            metadata: config.pdf_metadata.clone(),
        }
    }
}

/// Engine configuration threaded in by the host.
///
/// Persistence and hydration of these settings is the host's concern;
/// the engine only reads them. Unknown options in the serialized form
/// are ignored, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MergeConfig {
    /// Whether mixed-format batches may be handed to a conversion
    /// collaborator instead of being rejected.
    pub conversion_enabled: bool,

    /// Maximum accepted input file size, in megabytes.
    #[serde(rename = "maxFileSizeMB")]
    pub max_file_size_mb: u32,

    /// Default output file name (without extension).
    pub output_file_name: String,

    /// Default metadata for produced documents.
    pub pdf_metadata: DocMetadata,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            conversion_enabled: false,
            max_file_size_mb: 50,
            output_file_name: "merged".to_string(),
            pdf_metadata: DocMetadata {
                title: Some("Merged Document".to_string()),
                author: Some("docmerge".to_string()),
                subject: None,
            },
        }
    }
}

impl MergeConfig {
    /// Hydrate a configuration from its persisted JSON form.
    ///
    /// Hosts typically persist a superset of these settings; unrecognized
    /// keys are ignored and missing keys fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::InvalidConfig`] when the document is not
    /// valid JSON or a recognized key has the wrong shape.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| MergeError::invalid_config(e.to_string()))
    }

    /// Validate the configuration.
    ///
    /// Checks for logical inconsistencies.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The size limit is zero
    /// - The output file name is blank
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size_mb == 0 {
            bail!("maxFileSizeMB must be at least 1");
        }

        if self.output_file_name.trim().is_empty() {
            bail!("Output file name cannot be blank");
        }

        Ok(())
    }

    /// The configured size limit in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb as u64 * 1024 * 1024
    }
}
