//! Format mergers.
//!
//! One merger exists per output format, behind the [`FormatMerger`]
//! capability trait. The orchestrator resolves a batch to a single format
//! and selects the matching variant; mergers never branch per file.

pub mod docx;
pub mod metadata;
pub mod pdf;

pub use docx::{ContentStrategy, DocxMerger, PlaceholderContent};
pub use metadata::MetadataManager;
pub use pdf::PdfMerger;

use crate::config::OutputSpec;
use crate::error::Result;
use crate::model::{DocFormat, DocumentRef};
use crate::progress::ProgressCallback;
use futures::future::BoxFuture;

/// Capability interface shared by all format mergers.
///
/// A merger consumes an ordered batch of same-format files and produces
/// one output byte stream, reporting progress along the way. The
/// signature is uniform across formats so the orchestrator can dispatch
/// without knowing merger internals.
pub trait FormatMerger: Send + Sync {
    /// The output format this merger produces.
    fn format(&self) -> DocFormat;

    /// Merge `files` into a single byte stream.
    ///
    /// `files` must all carry this merger's format; the orchestrator
    /// guarantees that before dispatching. Progress callbacks are
    /// best-effort and optional.
    fn merge<'a>(
        &'a self,
        files: &'a [DocumentRef],
        spec: &'a OutputSpec,
        on_progress: Option<&'a ProgressCallback>,
    ) -> BoxFuture<'a, Result<Vec<u8>>>;
}

/// Select the merger variant for a resolved batch format.
pub fn merger_for(format: DocFormat) -> Box<dyn FormatMerger> {
    match format {
        DocFormat::Pdf => Box::new(PdfMerger::new()),
        DocFormat::Docx => Box::new(DocxMerger::new()),
    }
}
