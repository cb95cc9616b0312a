//! Merge orchestration.
//!
//! [`MergeService`] is the single entry point callers use: it classifies
//! the batch, enforces merge preconditions, dispatches to the right
//! format merger, and normalizes the output filename and MIME type. Each
//! call is stateless with respect to prior calls; the service keeps no
//! mutable state beyond an optionally spawned background worker.

use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;

use crate::config::{MergeConfig, OutputSpec};
use crate::error::{MergeError, Result};
use crate::merge::merger_for;
use crate::model::{DocFormat, DocumentRef, MergeOutput};
use crate::progress::ProgressCallback;
use crate::worker::MergeWorker;

/// Conversion collaborator for mixed-format batches.
///
/// The engine does not convert between formats itself. When conversion is
/// enabled, a mixed batch is handed to this collaborator, which must
/// return a homogeneous batch together with its resolved format. What
/// "converting" means is entirely the collaborator's contract.
pub trait BatchConverter: Send + Sync {
    /// Convert a mixed batch into a single-format batch.
    fn convert<'a>(
        &'a self,
        files: &'a [DocumentRef],
    ) -> BoxFuture<'a, Result<(Vec<DocumentRef>, DocFormat)>>;
}

/// Orchestrates merge operations.
///
/// # Examples
///
/// ```no_run
/// use docmerge::{DocumentRef, MergeConfig, MergeService, OutputSpec};
///
/// # async fn example(files: Vec<DocumentRef>) -> Result<(), Box<dyn std::error::Error>> {
/// let service = MergeService::new(MergeConfig::default());
/// let spec = OutputSpec::new("merged", Default::default());
///
/// let output = service.merge_files(&files, &spec, None).await?;
/// println!("Produced {} ({} bytes)", output.filename, output.bytes.len());
/// # Ok(())
/// # }
/// ```
pub struct MergeService {
    config: MergeConfig,
    converter: Option<Box<dyn BatchConverter>>,
    worker: Mutex<Option<Arc<MergeWorker>>>,
}

impl MergeService {
    /// Create a service without a conversion collaborator.
    pub fn new(config: MergeConfig) -> Self {
        Self {
            config,
            converter: None,
            worker: Mutex::new(None),
        }
    }

    /// Create a service with a conversion collaborator for mixed batches.
    pub fn with_converter(config: MergeConfig, converter: Box<dyn BatchConverter>) -> Self {
        Self {
            config,
            converter: Some(converter),
            worker: Mutex::new(None),
        }
    }

    /// The configuration this service was created with.
    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Merge an ordered batch into a single output document.
    ///
    /// Preconditions are checked in order, each yielding a distinct fatal
    /// error: an empty batch, a single-file batch, then a mixed-format
    /// batch (unless conversion is enabled and a collaborator is
    /// configured). The batch is borrowed only for the duration of the
    /// call and nothing is retained afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::EmptyBatch`], [`MergeError::InsufficientFiles`],
    /// [`MergeError::MixedFormat`], [`MergeError::ConversionFailed`], or
    /// whatever the selected merger surfaces (typically
    /// [`MergeError::FileProcessing`]). No partial output is ever
    /// produced.
    pub async fn merge_files(
        &self,
        files: &[DocumentRef],
        spec: &OutputSpec,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<MergeOutput> {
        if files.is_empty() {
            return Err(MergeError::EmptyBatch);
        }

        if files.len() == 1 {
            return Err(MergeError::InsufficientFiles { count: 1 });
        }

        match classify(files) {
            Some(format) => self.dispatch(files, format, spec, on_progress).await,
            None => {
                if !self.config.conversion_enabled {
                    return Err(MergeError::MixedFormat);
                }

                let converter = self.converter.as_ref().ok_or_else(|| {
                    MergeError::conversion_failed(
                        "conversion is enabled but no converter is configured",
                    )
                })?;

                let (converted, format) = converter.convert(files).await.map_err(|e| match e {
                    MergeError::ConversionFailed { .. } => e,
                    other => MergeError::conversion_failed(other.to_string()),
                })?;

                if classify(&converted) != Some(format) {
                    return Err(MergeError::conversion_failed(
                        "converter returned a mixed batch",
                    ));
                }

                self.dispatch(&converted, format, spec, on_progress).await
            }
        }
    }

    /// Run [`merge_files`](Self::merge_files) on the service's background
    /// worker instead of the caller's task.
    ///
    /// The worker is spawned lazily on first use and reused afterwards;
    /// only plain bytes and metadata cross the boundary. Mixed-format
    /// batches are not supported on this path: conversion collaborators
    /// stay on the caller's side of the channel.
    pub async fn merge_files_offloaded(
        &self,
        files: &[DocumentRef],
        spec: &OutputSpec,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<MergeOutput> {
        let worker = self.worker_handle();
        worker.merge(files.to_vec(), spec.clone(), on_progress).await
    }

    /// Release the service's background resources.
    ///
    /// Terminates the owned worker, if any. Safe to call at any point,
    /// including mid-operation: the in-flight call resolves to
    /// [`MergeError::Cancelled`] and no further progress callbacks are
    /// delivered. The service itself remains usable for inline merges.
    pub fn dispose(&self) {
        if let Some(worker) = self.worker.lock().unwrap().take() {
            worker.dispose();
        }
    }

    fn worker_handle(&self) -> Arc<MergeWorker> {
        let mut slot = self.worker.lock().unwrap();
        match &*slot {
            Some(worker) if !worker.is_disposed() => Arc::clone(worker),
            _ => {
                let worker = Arc::new(MergeWorker::spawn(self.config.clone()));
                *slot = Some(Arc::clone(&worker));
                worker
            }
        }
    }

    async fn dispatch(
        &self,
        files: &[DocumentRef],
        format: DocFormat,
        spec: &OutputSpec,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<MergeOutput> {
        tracing::info!(files = files.len(), ?format, "starting merge");

        let merger = merger_for(format);
        let bytes = merger.merge(files, spec, on_progress).await?;

        let filename = normalize_file_name(&spec.file_name, format);
        tracing::info!(%filename, size = bytes.len(), "merge complete");

        Ok(MergeOutput {
            bytes,
            filename,
            mime_type: format.mime_type().to_string(),
        })
    }
}

/// Resolve the single format of a batch; `None` means mixed.
fn classify(files: &[DocumentRef]) -> Option<DocFormat> {
    let mut formats = files.iter().map(|f| f.format);
    let first = formats.next()?;
    formats.all(|f| f == first).then_some(first)
}

/// Append the correct extension for `format`, or correct a recognized but
/// mismatched one. Unrecognized suffixes are part of the name.
fn normalize_file_name(name: &str, format: DocFormat) -> String {
    let trimmed = name.trim();
    let lower = trimmed.to_ascii_lowercase();
    let target = format.extension();

    if lower.ends_with(&format!(".{target}")) {
        return trimmed.to_string();
    }

    for other in [DocFormat::Pdf, DocFormat::Docx] {
        let ext = format!(".{}", other.extension());
        if lower.ends_with(&ext) {
            let stem = &trimmed[..trimmed.len() - ext.len()];
            return format!("{stem}.{target}");
        }
    }

    format!("{trimmed}.{target}")
}
