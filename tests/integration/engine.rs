//! End-to-end merges through the orchestrator.

use docmerge::{DocMetadata, MergeConfig, MergeService, OutputSpec};
use lopdf::Document;
use std::io::Read;

use crate::common::{docx_ref, page_texts, pdf_ref, recorder};

fn service() -> MergeService {
    MergeService::new(MergeConfig::default())
}

fn spec() -> OutputSpec {
    OutputSpec::new("merged", DocMetadata::default())
}

#[tokio::test]
async fn test_merge_two_three_page_pdfs() {
    let files = vec![pdf_ref("a.pdf", 3, "DocA"), pdf_ref("b.pdf", 3, "DocB")];

    let output = service().merge_files(&files, &spec(), None).await.unwrap();

    assert_eq!(output.filename, "merged.pdf");
    assert_eq!(output.mime_type, "application/pdf");

    let doc = Document::load_mem(&output.bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 6);

    let texts = page_texts(&output.bytes);
    assert_eq!(
        texts,
        vec![
            "DocA-Page-1",
            "DocA-Page-2",
            "DocA-Page-3",
            "DocB-Page-1",
            "DocB-Page-2",
            "DocB-Page-3"
        ]
    );
}

#[tokio::test]
async fn test_reversed_selection_order_is_preserved() {
    let mut first = pdf_ref("a.pdf", 3, "DocA");
    first.selected_pages = Some(vec![2, 1]);
    let files = vec![first, pdf_ref("b.pdf", 1, "DocB")];

    let output = service().merge_files(&files, &spec(), None).await.unwrap();

    assert_eq!(
        page_texts(&output.bytes),
        vec!["DocA-Page-2", "DocA-Page-1", "DocB-Page-1"]
    );
}

#[tokio::test]
async fn test_duplicate_selection_is_preserved() {
    let mut first = pdf_ref("a.pdf", 2, "DocA");
    first.selected_pages = Some(vec![2, 2]);
    let files = vec![first, pdf_ref("b.pdf", 1, "DocB")];

    let output = service().merge_files(&files, &spec(), None).await.unwrap();

    assert_eq!(
        page_texts(&output.bytes),
        vec!["DocA-Page-2", "DocA-Page-2", "DocB-Page-1"]
    );
}

#[tokio::test]
async fn test_metadata_round_trips() {
    let files = vec![pdf_ref("a.pdf", 1, "DocA"), pdf_ref("b.pdf", 1, "DocB")];
    let spec = OutputSpec::new(
        "annual-report",
        DocMetadata::new(
            Some("Annual Report".to_string()),
            Some("Finance".to_string()),
            Some("FY26".to_string()),
        ),
    );

    let output = service().merge_files(&files, &spec, None).await.unwrap();

    let doc = Document::load_mem(&output.bytes).unwrap();
    let manager = docmerge::merge::MetadataManager::new();
    let read_back = manager.read(&doc);
    assert_eq!(read_back.title, Some("Annual Report".to_string()));
    assert_eq!(read_back.author, Some("Finance".to_string()));
    assert_eq!(read_back.subject, Some("FY26".to_string()));
}

#[tokio::test]
async fn test_output_survives_a_save_and_reload() {
    let files = vec![pdf_ref("a.pdf", 2, "DocA"), pdf_ref("b.pdf", 2, "DocB")];

    let output = service().merge_files(&files, &spec(), None).await.unwrap();

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join(&output.filename);
    std::fs::write(&path, &output.bytes).unwrap();

    let doc = Document::load(&path).unwrap();
    assert_eq!(doc.get_pages().len(), 4);
}

#[tokio::test]
async fn test_docx_merge_produces_a_package() {
    let files = vec![docx_ref("notes.docx", 512), docx_ref("minutes.docx", 2048)];

    let output = service().merge_files(&files, &spec(), None).await.unwrap();

    assert_eq!(output.filename, "merged.docx");
    assert_eq!(
        output.mime_type,
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(output.bytes)).unwrap();
    let mut document = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut document)
        .unwrap();

    assert!(document.contains("Content from: notes.docx"));
    assert!(document.contains("Content from: minutes.docx"));
}

#[tokio::test]
async fn test_progress_contract_holds_for_both_mergers() {
    for files in [
        vec![pdf_ref("a.pdf", 1, "DocA"), pdf_ref("b.pdf", 1, "DocB")],
        vec![docx_ref("a.docx", 64), docx_ref("b.docx", 64)],
    ] {
        let (events, callback) = recorder();

        service()
            .merge_files(&files, &spec(), Some(&callback))
            .await
            .unwrap();

        let events = events.lock().unwrap();
        assert!(!events.is_empty());
        assert_eq!(events.first().unwrap().percent, 0.0);
        assert_eq!(events.last().unwrap().percent, 100.0);
        assert!(
            events
                .windows(2)
                .all(|pair| pair[0].percent <= pair[1].percent)
        );
    }
}

#[tokio::test]
async fn test_failure_produces_no_output() {
    let good = pdf_ref("a.pdf", 1, "DocA");
    let bad = docmerge::DocumentRef::new(
        "file_bad",
        "broken.pdf",
        docmerge::DocFormat::Pdf,
        b"garbage".to_vec(),
        0,
    );

    let err = service()
        .merge_files(&[good, bad], &spec(), None)
        .await
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("broken.pdf"));
}
