//! PDF merge implementation.
//!
//! Builds one output document from an ordered batch of in-memory PDFs.
//! Each input contributes the pages named by its selection, in selection
//! order; a page selected twice is duplicated in the output. Object ids
//! are renumbered per source so the assembled document never collides.

use lopdf::{Document, Object, ObjectId, dictionary};
use std::collections::{BTreeMap, BTreeSet};

use crate::config::OutputSpec;
use crate::error::{MergeError, Result};
use crate::merge::FormatMerger;
use crate::merge::metadata::MetadataManager;
use crate::model::{DocFormat, DocumentRef};
use crate::progress::{ProgressCallback, ProgressReporter};
use futures::future::BoxFuture;

/// PDF format merger.
///
/// # Examples
///
/// ```no_run
/// use docmerge::merge::{FormatMerger, PdfMerger};
/// use docmerge::{DocumentRef, OutputSpec};
///
/// # async fn example(files: Vec<DocumentRef>) -> Result<(), Box<dyn std::error::Error>> {
/// let merger = PdfMerger::new();
/// let spec = OutputSpec::new("merged", Default::default());
/// let bytes = merger.merge(&files, &spec, None).await?;
/// # Ok(())
/// # }
/// ```
pub struct PdfMerger;

impl PdfMerger {
    /// Create a new PDF merger.
    pub fn new() -> Self {
        Self
    }

    async fn merge_impl(
        &self,
        files: &[DocumentRef],
        spec: &OutputSpec,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<u8>> {
        if files.is_empty() {
            return Err(MergeError::EmptyBatch);
        }

        let mut progress = ProgressReporter::new(on_progress);
        progress.report(0.0, "Starting merge...");

        let mut output = Document::with_version("1.7");
        let pages_root_id = output.new_object_id();
        let mut page_refs: Vec<ObjectId> = Vec::new();

        let total = files.len();
        for (index, file) in files.iter().enumerate() {
            progress.report_file(
                index as f32 / total as f32 * 80.0,
                format!("Processing {}...", file.name),
                &file.name,
            );

            self.append_file(&mut output, &mut page_refs, file)?;

            progress.report(
                (index + 1) as f32 / total as f32 * 80.0,
                format!("Processed {}", file.name),
            );

            // Keep the host responsive between files.
            tokio::task::yield_now().await;
        }

        progress.report(90.0, "Finalizing PDF...");

        let bytes = finalize(output, pages_root_id, page_refs, spec)?;

        progress.report(100.0, "Merge completed!");

        Ok(bytes)
    }

    /// Load one source document and append its selected pages.
    fn append_file(
        &self,
        output: &mut Document,
        page_refs: &mut Vec<ObjectId>,
        file: &DocumentRef,
    ) -> Result<()> {
        // A selection that contradicts the page count resolved at
        // ingestion is rejected, never clamped.
        if let (Some(declared), Some(selection)) = (file.page_count, &file.selected_pages) {
            if let Some(&bad) = selection.iter().find(|&&p| p < 1 || p > declared) {
                return Err(MergeError::file_processing(
                    &file.name,
                    format!("selected page {bad} is out of range (document has {declared} pages)"),
                ));
            }
        }

        let mut source = Document::load_mem(&file.content)
            .map_err(|e| MergeError::file_processing(&file.name, e.to_string()))?;

        source.renumber_objects_with(output.max_id + 1);
        output.max_id = source.max_id;

        let source_pages: BTreeMap<u32, ObjectId> = source.get_pages();
        let actual_pages = source_pages.len() as u32;

        output.objects.extend(std::mem::take(&mut source.objects));

        for page_num in file.effective_selection(actual_pages) {
            let Some(&page_id) = source_pages.get(&page_num) else {
                // The count was unknown at ingestion; a stale selection
                // entry is skipped rather than failing the whole merge.
                tracing::warn!(
                    file = %file.name,
                    page = page_num,
                    actual_pages,
                    "selected page not present in document, skipping"
                );
                continue;
            };

            let appended = if page_refs.contains(&page_id) {
                // Re-selecting a page duplicates it: clone the page
                // object under a fresh id so both copies are real pages.
                let cloned = output.objects.get(&page_id).cloned().ok_or_else(|| {
                    MergeError::file_processing(&file.name, format!("page {page_num} has no object"))
                })?;
                let clone_id = output.new_object_id();
                output.objects.insert(clone_id, cloned);
                clone_id
            } else {
                page_id
            };

            page_refs.push(appended);
        }

        Ok(())
    }
}

impl Default for PdfMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatMerger for PdfMerger {
    fn format(&self) -> DocFormat {
        DocFormat::Pdf
    }

    fn merge<'a>(
        &'a self,
        files: &'a [DocumentRef],
        spec: &'a OutputSpec,
        on_progress: Option<&'a ProgressCallback>,
    ) -> BoxFuture<'a, Result<Vec<u8>>> {
        Box::pin(self.merge_impl(files, spec, on_progress))
    }
}

/// Assemble the page tree and catalog, stamp metadata, and serialize.
fn finalize(
    mut output: Document,
    pages_root_id: ObjectId,
    page_refs: Vec<ObjectId>,
    spec: &OutputSpec,
) -> Result<Vec<u8>> {
    let mut reparented = BTreeSet::new();
    for &page_id in &page_refs {
        if !reparented.insert(page_id) {
            continue;
        }
        if let Ok(Object::Dictionary(dict)) = output.get_object_mut(page_id) {
            dict.set("Parent", Object::Reference(pages_root_id));
        }
    }

    let kids: Vec<Object> = page_refs.iter().map(|&id| Object::Reference(id)).collect();
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_refs.len() as i64,
    };
    output
        .objects
        .insert(pages_root_id, Object::Dictionary(pages_dict));

    let catalog_id = output.new_object_id();
    let catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_root_id,
    };
    output.objects.insert(catalog_id, Object::Dictionary(catalog));
    output.trailer.set("Root", catalog_id);

    MetadataManager::new().apply(&mut output, &spec.metadata)?;

    output.compress();

    let mut buffer = Vec::new();
    output
        .save_to(&mut buffer)
        .map_err(|e| MergeError::other(format!("Failed to save merged PDF: {e}")))?;

    Ok(buffer)
}
