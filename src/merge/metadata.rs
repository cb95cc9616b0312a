//! PDF metadata management.
//!
//! This module handles the output document's Info dictionary:
//! - Title, Author, Subject from the caller's output spec
//! - Fixed Creator and Producer stamps
//! - Creation and modification dates set to the time of the merge

use lopdf::{Dictionary, Document, Object};
use std::time::SystemTime;

use crate::config::DocMetadata;
use crate::error::{MergeError, Result};

/// Creator/Producer stamp written into every merged document.
const PRODUCER: &str = "docmerge";

/// Manager for PDF metadata.
pub struct MetadataManager;

impl MetadataManager {
    /// Create a new metadata manager.
    pub fn new() -> Self {
        Self
    }

    /// Apply metadata to a merged document.
    ///
    /// Title, Author and Subject are set only when present in `metadata`;
    /// the Creator/Producer stamps and the creation/modification dates
    /// are always written.
    ///
    /// # Errors
    ///
    /// Returns an error if the Info dictionary cannot be created.
    pub fn apply(&self, doc: &mut Document, metadata: &DocMetadata) -> Result<()> {
        // Get or create Info dictionary
        let info_id = if let Ok(info_ref) = doc.trailer.get(b"Info").and_then(|i| i.as_reference())
        {
            info_ref
        } else {
            let new_info_id = doc.new_object_id();
            doc.trailer.set("Info", Object::Reference(new_info_id));
            new_info_id
        };

        if doc.get_object(info_id).is_err() {
            doc.objects
                .insert(info_id, Object::Dictionary(Dictionary::new()));
        }

        let info_dict = if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(info_id) {
            dict
        } else {
            return Err(MergeError::other("Failed to create Info dictionary"));
        };

        if let Some(ref title) = metadata.title {
            info_dict.set(
                "Title",
                Object::String(title.as_bytes().to_vec(), lopdf::StringFormat::Literal),
            );
        }

        if let Some(ref author) = metadata.author {
            info_dict.set(
                "Author",
                Object::String(author.as_bytes().to_vec(), lopdf::StringFormat::Literal),
            );
        }

        if let Some(ref subject) = metadata.subject {
            info_dict.set(
                "Subject",
                Object::String(subject.as_bytes().to_vec(), lopdf::StringFormat::Literal),
            );
        }

        info_dict.set(
            "Creator",
            Object::String(PRODUCER.as_bytes().to_vec(), lopdf::StringFormat::Literal),
        );
        info_dict.set(
            "Producer",
            Object::String(PRODUCER.as_bytes().to_vec(), lopdf::StringFormat::Literal),
        );

        let date_str = format_pdf_date(SystemTime::now());
        info_dict.set(
            "CreationDate",
            Object::String(date_str.as_bytes().to_vec(), lopdf::StringFormat::Literal),
        );
        info_dict.set(
            "ModDate",
            Object::String(date_str.as_bytes().to_vec(), lopdf::StringFormat::Literal),
        );

        Ok(())
    }

    /// Read metadata back from a document's Info dictionary.
    pub fn read(&self, doc: &Document) -> DocMetadata {
        let info_dict =
            if let Ok(info_ref) = doc.trailer.get(b"Info").and_then(|i| i.as_reference()) {
                if let Ok(Object::Dictionary(dict)) = doc.get_object(info_ref) {
                    dict
                } else {
                    return DocMetadata::default();
                }
            } else {
                return DocMetadata::default();
            };

        let title = Self::get_string_field(info_dict, b"Title");
        let author = Self::get_string_field(info_dict, b"Author");
        let subject = Self::get_string_field(info_dict, b"Subject");

        DocMetadata::new(title, author, subject)
    }

    /// Check if a document has an Info dictionary.
    pub fn has_metadata(&self, doc: &Document) -> bool {
        doc.trailer.has(b"Info")
    }

    fn get_string_field(dict: &Dictionary, key: &[u8]) -> Option<String> {
        dict.get(key).ok().and_then(|obj| {
            if let Object::String(bytes, _) = obj {
                String::from_utf8(bytes.clone()).ok()
            } else {
                None
            }
        })
    }
}

impl Default for MetadataManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a SystemTime as a PDF date string.
///
/// PDF date format: D:YYYYMMDDHHmmSSZ
fn format_pdf_date(time: SystemTime) -> String {
    use std::time::UNIX_EPOCH;

    let duration = time.duration_since(UNIX_EPOCH).unwrap_or_default();

    let secs = duration.as_secs();

    // Approximate calendar math is acceptable here; the field is
    // informational.
    let year = 1970 + (secs / 31_556_926);
    let remainder = secs % 31_556_926;
    let month = 1 + (remainder / 2_629_743).min(11);
    let day_remainder = remainder % 2_629_743;
    let day = 1 + (day_remainder / 86_400).min(30);
    let time_remainder = day_remainder % 86_400;
    let hour = time_remainder / 3_600;
    let min = (time_remainder % 3_600) / 60;
    let sec = time_remainder % 60;

    format!(
        "D:{:04}{:02}{:02}{:02}{:02}{:02}Z",
        year, month, day, hour, min, sec
    )
}
