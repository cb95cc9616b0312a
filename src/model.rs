//! Core data model for merge batches.
//!
//! A merge call takes an ordered slice of [`DocumentRef`]s and produces a
//! [`MergeOutput`]. The engine borrows the batch for the duration of one
//! call and retains nothing afterwards; every type here is plain data so
//! it can be marshaled across the worker boundary.

use serde::{Deserialize, Serialize};

/// Supported input/output document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocFormat {
    /// Portable Document Format.
    Pdf,
    /// Office Open XML word-processing document.
    Docx,
}

impl DocFormat {
    /// MIME type of documents in this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Canonical file extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }

    /// Resolve a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }
}

/// One input file queued for merging.
///
/// Created at ingestion time and destroyed when the host removes it from
/// the batch; `id` is opaque, stable for the lifetime of the batch, and
/// never reused. `format` and the provenance fields are immutable once
/// set; `name` may be edited by the user before merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    /// Opaque unique identifier assigned at ingestion.
    pub id: String,

    /// Display name, also used to derive output-relevant names.
    pub name: String,

    /// Declared document format. The engine trusts this field and never
    /// re-inspects content to second-guess it.
    pub format: DocFormat,

    /// Size of `content` in bytes.
    pub size_bytes: u64,

    /// Last-modified timestamp, milliseconds since the Unix epoch.
    pub last_modified: u64,

    /// Raw document bytes.
    pub content: Vec<u8>,

    /// Number of pages, resolved lazily at ingestion (PDF only).
    /// `None` means unknown, not zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,

    /// Ordered 1-based page selection (PDF only). Order and duplicates
    /// are caller intent and are preserved verbatim into the output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_pages: Option<Vec<u32>>,
}

impl DocumentRef {
    /// Create a document reference with provenance derived from `content`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        format: DocFormat,
        content: Vec<u8>,
        last_modified: u64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            format,
            size_bytes: content.len() as u64,
            last_modified,
            content,
            page_count: None,
            selected_pages: None,
        }
    }

    /// The page selection this file contributes to the output: the stored
    /// selection verbatim if present, otherwise all pages `1..=actual`.
    pub fn effective_selection(&self, actual_pages: u32) -> Vec<u32> {
        match &self.selected_pages {
            Some(pages) => pages.clone(),
            None => (1..=actual_pages).collect(),
        }
    }
}

/// Result of a successful merge, ready for the host to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutput {
    /// The merged document bytes.
    pub bytes: Vec<u8>,

    /// Output file name with the correct extension.
    pub filename: String,

    /// MIME type matching the output format.
    pub mime_type: String,
}
