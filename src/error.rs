//! Error types for docmerge.
//!
//! This module defines all error types that can occur during a merge
//! operation. Errors are designed to be informative and actionable,
//! providing clear context about what went wrong and how to fix it.
//!
//! # Error Categories
//!
//! - **Resolver Errors**: Invalid page or range expressions
//! - **Batch Errors**: Empty, single-file, or mixed-format batches
//! - **Processing Errors**: A specific input file failed during merging
//! - **Ingestion Errors**: Files rejected before entering a batch

use std::fmt;

/// Result type alias for docmerge operations.
pub type Result<T> = std::result::Result<T, MergeError>;

/// Main error type for docmerge operations.
///
/// All errors in docmerge use this type, which provides detailed context
/// about what went wrong and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// A single page number in a range expression is invalid.
    InvalidPage {
        /// The offending token from the expression.
        token: String,
        /// Number of pages in the document being addressed.
        max_pages: u32,
    },

    /// A `start-end` range in a range expression is invalid.
    InvalidRange {
        /// The offending token from the expression.
        token: String,
        /// Number of pages in the document being addressed.
        max_pages: u32,
    },

    /// The batch submitted for merging contains no files.
    EmptyBatch,

    /// The batch contains fewer files than a merge requires.
    InsufficientFiles {
        /// Number of files actually submitted.
        count: usize,
    },

    /// The batch mixes PDF and DOCX entries and conversion is disabled.
    MixedFormat,

    /// Conversion was requested but the collaborator is absent or failed.
    ConversionFailed {
        /// Details about the failure.
        reason: String,
    },

    /// A specific input file failed to load or process during the merge.
    FileProcessing {
        /// Display name of the offending file.
        name: String,
        /// Reason for the failure.
        reason: String,
    },

    /// The file is neither a PDF nor a DOCX document.
    UnsupportedFormat {
        /// Display name of the rejected file.
        name: String,
    },

    /// The file contains no bytes.
    EmptyFile {
        /// Display name of the rejected file.
        name: String,
    },

    /// The file exceeds the caller-declared size limit.
    FileTooLarge {
        /// Display name of the rejected file.
        name: String,
        /// Actual size in bytes.
        size_bytes: u64,
        /// Configured limit in bytes.
        limit_bytes: u64,
    },

    /// Invalid configuration.
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// The operation was cancelled by disposing its worker.
    Cancelled,

    /// Generic error with a custom message.
    Other {
        /// Error message.
        message: String,
    },
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPage { token, max_pages } => {
                write!(
                    f,
                    "Invalid page '{token}': page numbers must be between 1 and {max_pages}"
                )
            }
            Self::InvalidRange { token, max_pages } => {
                write!(
                    f,
                    "Invalid range '{token}': expected 'start-end' with \
                     1 <= start <= end <= {max_pages}"
                )
            }
            Self::EmptyBatch => {
                write!(f, "No files to merge")
            }
            Self::InsufficientFiles { count } => {
                write!(
                    f,
                    "At least 2 files are required for merging (got {count})"
                )
            }
            Self::MixedFormat => {
                write!(f, "Mixed file types require conversion to be enabled")
            }
            Self::ConversionFailed { reason } => {
                write!(f, "Format conversion failed: {reason}")
            }
            Self::FileProcessing { name, reason } => {
                write!(f, "Failed to process {name}: {reason}")
            }
            Self::UnsupportedFormat { name } => {
                write!(
                    f,
                    "Unsupported file type: {name}\n  \
                     Only PDF and DOCX files are supported"
                )
            }
            Self::EmptyFile { name } => {
                write!(f, "File is empty: {name}")
            }
            Self::FileTooLarge {
                name,
                size_bytes,
                limit_bytes,
            } => {
                write!(
                    f,
                    "File size exceeds {} MB limit: {name} ({size_bytes} bytes)",
                    limit_bytes / (1024 * 1024)
                )
            }
            Self::InvalidConfig { message } => {
                write!(f, "Invalid configuration: {message}")
            }
            Self::Cancelled => {
                write!(f, "Operation cancelled")
            }
            Self::Other { message } => {
                write!(f, "{message}")
            }
        }
    }
}

impl std::error::Error for MergeError {}

impl From<lopdf::Error> for MergeError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl MergeError {
    /// Create an InvalidPage error.
    pub fn invalid_page(token: impl Into<String>, max_pages: u32) -> Self {
        Self::InvalidPage {
            token: token.into(),
            max_pages,
        }
    }

    /// Create an InvalidRange error.
    pub fn invalid_range(token: impl Into<String>, max_pages: u32) -> Self {
        Self::InvalidRange {
            token: token.into(),
            max_pages,
        }
    }

    /// Create a ConversionFailed error.
    pub fn conversion_failed(reason: impl Into<String>) -> Self {
        Self::ConversionFailed {
            reason: reason.into(),
        }
    }

    /// Create a FileProcessing error naming the offending file.
    pub fn file_processing(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FileProcessing {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable (the caller can re-prompt).
    ///
    /// Returns true for resolver and ingestion errors, where fixing the
    /// input and retrying is expected.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidPage { .. }
                | Self::InvalidRange { .. }
                | Self::UnsupportedFormat { .. }
                | Self::EmptyFile { .. }
                | Self::FileTooLarge { .. }
        )
    }

    /// Check if this error aborts the whole merge call.
    ///
    /// Fatal errors are surfaced to the caller verbatim and never retried
    /// automatically.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::EmptyBatch
                | Self::InsufficientFiles { .. }
                | Self::MixedFormat
                | Self::ConversionFailed { .. }
                | Self::FileProcessing { .. }
                | Self::Cancelled
        )
    }
}
