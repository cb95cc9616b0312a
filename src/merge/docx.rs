//! DOCX merge implementation.
//!
//! Produces one OOXML word-processing package from an ordered batch of
//! DOCX inputs. Content generation is pluggable: the engine ships a
//! deterministic placeholder strategy that renders each file's name and
//! size, and a real content-splicing strategy can be swapped in without
//! touching the orchestration or progress contract. Each input's block is
//! structurally isolated in its own section for exactly that reason.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::{Cursor, Write as _};
use std::time::SystemTime;

use crate::config::{DocMetadata, OutputSpec};
use crate::error::{MergeError, Result};
use crate::merge::FormatMerger;
use crate::model::{DocFormat, DocumentRef};
use crate::progress::{ProgressCallback, ProgressReporter};
use crate::utils::format_file_size;
use futures::future::BoxFuture;

/// Creator stamp written into the package core properties.
const PRODUCER: &str = "docmerge";

/// WordprocessingML main namespace.
const WPML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

/// XML writer type handed to content strategies.
pub type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Emphasis applied to a placeholder run.
enum RunStyle {
    Bold,
    Italic,
    Plain,
}

/// Content-generation strategy for one input file.
///
/// Implementations write the body paragraphs for a single input into the
/// shared `word/document.xml` writer. The merger wraps every block in its
/// own document section, so a strategy never has to care about its
/// neighbours.
pub trait ContentStrategy: Send + Sync {
    /// Write the body paragraphs representing `file`.
    fn write_block(&self, xml: &mut XmlWriter, file: &DocumentRef) -> Result<()>;
}

/// Default strategy: a deterministic placeholder block per input.
///
/// Renders the file name (emphasized) and its size. Stands in for true
/// content extraction, which is out of scope for the engine.
pub struct PlaceholderContent;

impl ContentStrategy for PlaceholderContent {
    fn write_block(&self, xml: &mut XmlWriter, file: &DocumentRef) -> Result<()> {
        write_paragraph(
            xml,
            &format!("Content from: {}", file.name),
            RunStyle::Bold,
        )?;
        write_paragraph(
            xml,
            &format!("File size: {}", format_file_size(file.size_bytes)),
            RunStyle::Italic,
        )?;
        write_paragraph(
            xml,
            "Note: full DOCX content merging is not implemented; this block stands in for the source document.",
            RunStyle::Plain,
        )?;
        write_empty_paragraph(xml)?;
        write_empty_paragraph(xml)?;
        Ok(())
    }
}

/// DOCX format merger.
///
/// Mirrors the PDF merger's progress schedule exactly, so callers cannot
/// tell which merger ran except by the output format.
pub struct DocxMerger {
    strategy: Box<dyn ContentStrategy>,
}

impl DocxMerger {
    /// Create a merger with the placeholder content strategy.
    pub fn new() -> Self {
        Self {
            strategy: Box::new(PlaceholderContent),
        }
    }

    /// Create a merger with a custom content strategy.
    pub fn with_strategy(strategy: Box<dyn ContentStrategy>) -> Self {
        Self { strategy }
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
        progress.report(0.0, "Starting DOCX merge...");

        let mut xml = Writer::new(Cursor::new(Vec::new()));
        emit(&mut xml, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

        let mut document = BytesStart::new("w:document");
        document.push_attribute(("xmlns:w", WPML_NS));
        emit(&mut xml, Event::Start(document))?;
        emit(&mut xml, Event::Start(BytesStart::new("w:body")))?;

        let total = files.len();
        for (index, file) in files.iter().enumerate() {
            progress.report_file(
                index as f32 / total as f32 * 80.0,
                format!("Processing {}...", file.name),
                &file.name,
            );

            self.strategy.write_block(&mut xml, file).map_err(|e| match e {
                MergeError::FileProcessing { .. } => e,
                other => MergeError::file_processing(&file.name, other.to_string()),
            })?;

            // Close this input's section. The last block is closed by the
            // body-level section properties instead.
            if index + 1 < total {
                write_section_break(&mut xml)?;
            }

            progress.report(
                (index + 1) as f32 / total as f32 * 80.0,
                format!("Processed {}", file.name),
            );

            tokio::task::yield_now().await;
        }

        write_section_properties(&mut xml)?;
        emit(&mut xml, Event::End(BytesEnd::new("w:body")))?;
        emit(&mut xml, Event::End(BytesEnd::new("w:document")))?;

        progress.report(90.0, "Finalizing DOCX...");

        let document_xml = xml.into_inner().into_inner();
        let bytes = package(&document_xml, &spec.metadata)?;

        progress.report(100.0, "Merge completed!");

        Ok(bytes)
    }
}

impl Default for DocxMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatMerger for DocxMerger {
    fn format(&self) -> DocFormat {
        DocFormat::Docx
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

fn emit(xml: &mut XmlWriter, event: Event<'_>) -> Result<()> {
    xml.write_event(event)
        .map_err(|e| MergeError::other(format!("Failed to write document XML: {e}")))
}

fn write_paragraph(xml: &mut XmlWriter, text: &str, style: RunStyle) -> Result<()> {
    emit(xml, Event::Start(BytesStart::new("w:p")))?;
    emit(xml, Event::Start(BytesStart::new("w:r")))?;

    match style {
        RunStyle::Bold => {
            emit(xml, Event::Start(BytesStart::new("w:rPr")))?;
            emit(xml, Event::Empty(BytesStart::new("w:b")))?;
            let mut size = BytesStart::new("w:sz");
            size.push_attribute(("w:val", "24"));
            emit(xml, Event::Empty(size))?;
            emit(xml, Event::End(BytesEnd::new("w:rPr")))?;
        }
        RunStyle::Italic => {
            emit(xml, Event::Start(BytesStart::new("w:rPr")))?;
            emit(xml, Event::Empty(BytesStart::new("w:i")))?;
            emit(xml, Event::End(BytesEnd::new("w:rPr")))?;
        }
        RunStyle::Plain => {}
    }

    let mut text_elem = BytesStart::new("w:t");
    text_elem.push_attribute(("xml:space", "preserve"));
    emit(xml, Event::Start(text_elem))?;
    emit(xml, Event::Text(BytesText::new(text)))?;
    emit(xml, Event::End(BytesEnd::new("w:t")))?;

    emit(xml, Event::End(BytesEnd::new("w:r")))?;
    emit(xml, Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

fn write_empty_paragraph(xml: &mut XmlWriter) -> Result<()> {
    emit(xml, Event::Empty(BytesStart::new("w:p")))
}

/// A paragraph-level section break: ends the current section.
fn write_section_break(xml: &mut XmlWriter) -> Result<()> {
    emit(xml, Event::Start(BytesStart::new("w:p")))?;
    emit(xml, Event::Start(BytesStart::new("w:pPr")))?;
    emit(xml, Event::Start(BytesStart::new("w:sectPr")))?;
    let mut kind = BytesStart::new("w:type");
    kind.push_attribute(("w:val", "continuous"));
    emit(xml, Event::Empty(kind))?;
    emit(xml, Event::End(BytesEnd::new("w:sectPr")))?;
    emit(xml, Event::End(BytesEnd::new("w:pPr")))?;
    emit(xml, Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

/// Body-level section properties closing the final section.
fn write_section_properties(xml: &mut XmlWriter) -> Result<()> {
    emit(xml, Event::Start(BytesStart::new("w:sectPr")))?;
    let mut kind = BytesStart::new("w:type");
    kind.push_attribute(("w:val", "continuous"));
    emit(xml, Event::Empty(kind))?;
    emit(xml, Event::End(BytesEnd::new("w:sectPr")))
}

/// Build `docProps/core.xml` from the output metadata.
fn core_properties_xml(metadata: &DocMetadata) -> Result<Vec<u8>> {
    let mut xml = Writer::new(Cursor::new(Vec::new()));
    emit(&mut xml, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut root = BytesStart::new("cp:coreProperties");
    root.push_attribute((
        "xmlns:cp",
        "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
    ));
    root.push_attribute(("xmlns:dc", "http://purl.org/dc/elements/1.1/"));
    root.push_attribute(("xmlns:dcterms", "http://purl.org/dc/terms/"));
    root.push_attribute(("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"));
    emit(&mut xml, Event::Start(root))?;

    let title = metadata.title.as_deref().unwrap_or("Merged Document");
    write_text_element(&mut xml, "dc:title", title)?;
    write_text_element(&mut xml, "dc:creator", PRODUCER)?;
    if let Some(ref subject) = metadata.subject {
        write_text_element(&mut xml, "dc:subject", subject)?;
    }

    let stamp = format_w3c_date(SystemTime::now());
    for elem in ["dcterms:created", "dcterms:modified"] {
        let mut start = BytesStart::new(elem);
        start.push_attribute(("xsi:type", "dcterms:W3CDTF"));
        emit(&mut xml, Event::Start(start))?;
        emit(&mut xml, Event::Text(BytesText::new(&stamp)))?;
        emit(&mut xml, Event::End(BytesEnd::new(elem)))?;
    }

    emit(&mut xml, Event::End(BytesEnd::new("cp:coreProperties")))?;
    Ok(xml.into_inner().into_inner())
}

fn write_text_element(xml: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    emit(xml, Event::Start(BytesStart::new(name)))?;
    emit(xml, Event::Text(BytesText::new(text)))?;
    emit(xml, Event::End(BytesEnd::new(name)))
}

/// Assemble the OOXML package.
fn package(document_xml: &[u8], metadata: &DocMetadata) -> Result<Vec<u8>> {
    let pkg_err = |e: zip::result::ZipError| {
        MergeError::other(format!("Failed to assemble DOCX package: {e}"))
    };
    let io_err =
        |e: std::io::Error| MergeError::other(format!("Failed to assemble DOCX package: {e}"));

    let mut archive = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    archive
        .start_file("[Content_Types].xml", options)
        .map_err(pkg_err)?;
    archive
        .write_all(CONTENT_TYPES_XML.as_bytes())
        .map_err(io_err)?;

    archive.start_file("_rels/.rels", options).map_err(pkg_err)?;
    archive
        .write_all(PACKAGE_RELS_XML.as_bytes())
        .map_err(io_err)?;

    archive
        .start_file("docProps/core.xml", options)
        .map_err(pkg_err)?;
    archive
        .write_all(&core_properties_xml(metadata)?)
        .map_err(io_err)?;

    archive
        .start_file("word/document.xml", options)
        .map_err(pkg_err)?;
    archive.write_all(document_xml).map_err(io_err)?;

    let cursor = archive.finish().map_err(pkg_err)?;
    Ok(cursor.into_inner())
}

/// Format a SystemTime as a W3C datetime string (UTC).
fn format_w3c_date(time: SystemTime) -> String {
    use std::time::UNIX_EPOCH;

    let duration = time.duration_since(UNIX_EPOCH).unwrap_or_default();

    let secs = duration.as_secs();

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
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year, month, day, hour, min, sec
    )
}
