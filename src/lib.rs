//! docmerge - Combine PDF and DOCX documents into a single file.
//!
//! This library merges an ordered batch of in-memory documents into one
//! output byte stream, entirely inside the host process. It supports:
//!
//! - Per-file page selection for PDFs, with order and duplicates preserved
//! - A pluggable DOCX content strategy
//! - Incremental, monotonic progress reporting
//! - All-or-nothing failure semantics (no partial output, ever)
//! - Optional background execution with coarse-grained cancellation
//!
//! # Examples
//!
//! ## Basic Merge
//!
//! ```no_run
//! use docmerge::{DocMetadata, MergeConfig, MergeService, OutputSpec, ProgressCallback};
//!
//! # async fn example(files: Vec<docmerge::DocumentRef>) -> Result<(), Box<dyn std::error::Error>> {
//! let service = MergeService::new(MergeConfig::default());
//! let spec = OutputSpec::new(
//!     "merged",
//!     DocMetadata::new(Some("Merged Document".to_string()), None, None),
//! );
//!
//! let on_progress: &ProgressCallback = &|event| {
//!     println!("{:>3.0}% {}", event.percent, event.status);
//! };
//!
//! let output = service.merge_files(&files, &spec, Some(on_progress)).await?;
//!
//! println!("Produced {} ({} bytes)", output.filename, output.bytes.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Using Individual Components
//!
//! ```
//! use docmerge::pages;
//!
//! let selection = pages::parse("1-3, 5", 10)?;
//! assert_eq!(selection, vec![1, 2, 3, 5]);
//! assert_eq!(pages::format(&selection), "1-3, 5");
//! # Ok::<(), docmerge::MergeError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod ingest;
pub mod merge;
pub mod model;
pub mod pages;
pub mod progress;
pub mod service;
pub mod utils;
pub mod worker;

// Re-export commonly used types
pub use config::{DocMetadata, MergeConfig, OutputSpec};
pub use error::{MergeError, Result};
pub use model::{DocFormat, DocumentRef, MergeOutput};
pub use progress::{ProgressCallback, ProgressEvent};
pub use service::{BatchConverter, MergeService};
pub use worker::{MergeWorker, WorkerEvent};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
