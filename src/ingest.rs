//! Ingestion-side helpers.
//!
//! The host's file picker performs its own MIME/size screening before a
//! file reaches the engine; these helpers exist so hosts without such a
//! layer can build [`DocumentRef`]s correctly. The engine itself only
//! re-validates the structural assumptions it depends on (page counts vs.
//! selections) at merge time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::MergeConfig;
use crate::error::{MergeError, Result};
use crate::model::{DocFormat, DocumentRef};

static NEXT_FILE_ID: AtomicU64 = AtomicU64::new(0);

/// Screen a candidate file against the caller-declared limits.
///
/// Checks, in order: a supported extension, the size limit, and
/// non-emptiness. Returns the format the extension declares.
///
/// # Errors
///
/// Returns [`MergeError::UnsupportedFormat`], [`MergeError::FileTooLarge`]
/// or [`MergeError::EmptyFile`], all recoverable: the caller can drop
/// the file and continue.
pub fn screen(name: &str, size_bytes: u64, max_file_size_mb: u32) -> Result<DocFormat> {
    let format = format_from_name(name).ok_or_else(|| MergeError::UnsupportedFormat {
        name: name.to_string(),
    })?;

    let limit_bytes = max_file_size_mb as u64 * 1024 * 1024;
    if size_bytes > limit_bytes {
        return Err(MergeError::FileTooLarge {
            name: name.to_string(),
            size_bytes,
            limit_bytes,
        });
    }

    if size_bytes == 0 {
        return Err(MergeError::EmptyFile {
            name: name.to_string(),
        });
    }

    Ok(format)
}

/// Build a [`DocumentRef`] from raw file bytes.
///
/// Detects the format from the file extension, falling back to content
/// magic for extension-less names. For PDFs the page count is probed
/// eagerly; a failed probe leaves `page_count` unknown rather than
/// failing ingestion, and a successful probe seeds a full-range page
/// selection.
///
/// # Errors
///
/// Returns the same screening errors as [`screen`].
pub fn ingest_file(
    name: &str,
    content: Vec<u8>,
    last_modified: u64,
    config: &MergeConfig,
) -> Result<DocumentRef> {
    let format = detect_format(name, &content).ok_or_else(|| MergeError::UnsupportedFormat {
        name: name.to_string(),
    })?;

    let size_bytes = content.len() as u64;
    let limit_bytes = config.max_file_size_bytes();
    if size_bytes > limit_bytes {
        return Err(MergeError::FileTooLarge {
            name: name.to_string(),
            size_bytes,
            limit_bytes,
        });
    }
    if size_bytes == 0 {
        return Err(MergeError::EmptyFile {
            name: name.to_string(),
        });
    }

    let page_count = match format {
        DocFormat::Pdf => probe_page_count(&content, name),
        DocFormat::Docx => None,
    };

    // Seed the selection with every page; the user narrows it from there.
    let selected_pages = page_count.map(|pages| (1..=pages).collect());

    Ok(DocumentRef {
        id: generate_file_id(),
        name: sanitize_file_name(name),
        format,
        size_bytes,
        last_modified,
        content,
        page_count,
        selected_pages,
    })
}

/// Resolve a format from the file extension alone.
fn format_from_name(name: &str) -> Option<DocFormat> {
    name.rsplit_once('.')
        .and_then(|(_, ext)| DocFormat::from_extension(ext))
}

/// Resolve a format from the extension, falling back to content magic.
fn detect_format(name: &str, content: &[u8]) -> Option<DocFormat> {
    if let Some(format) = format_from_name(name) {
        return Some(format);
    }
    if content.starts_with(b"%PDF-") {
        return Some(DocFormat::Pdf);
    }
    if content.starts_with(b"PK\x03\x04") {
        return Some(DocFormat::Docx);
    }
    None
}

/// Count the pages of a PDF, or `None` when the document cannot be read.
fn probe_page_count(content: &[u8], name: &str) -> Option<u32> {
    match lopdf::Document::load_mem(content) {
        Ok(doc) => Some(doc.get_pages().len() as u32),
        Err(e) => {
            tracing::warn!(file = %name, error = %e, "could not resolve page count");
            None
        }
    }
}

/// Produce an opaque identifier, unique for the process lifetime.
pub fn generate_file_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let seq = NEXT_FILE_ID.fetch_add(1, Ordering::Relaxed);
    format!("file_{millis}_{seq}")
}

/// Replace characters that are unsafe in output filenames.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if (c as u32) < 0x20 => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
