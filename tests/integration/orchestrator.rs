//! Orchestrator preconditions, configuration, and worker lifecycle.

use std::sync::Arc;

use docmerge::worker::{MergeJob, MergeWorker, WorkerEvent};
use docmerge::{MergeConfig, MergeError, MergeService, OutputSpec};

use crate::common::{docx_ref, pdf_ref, recorder};

fn spec() -> OutputSpec {
    OutputSpec::new("merged", Default::default())
}

#[tokio::test]
async fn test_empty_batch_fails() {
    let service = MergeService::new(MergeConfig::default());
    let err = service.merge_files(&[], &spec(), None).await.unwrap_err();
    assert!(matches!(err, MergeError::EmptyBatch));
}

#[tokio::test]
async fn test_single_file_fails() {
    let service = MergeService::new(MergeConfig::default());
    let files = vec![pdf_ref("a.pdf", 1, "DocA")];

    let err = service.merge_files(&files, &spec(), None).await.unwrap_err();
    assert!(matches!(err, MergeError::InsufficientFiles { .. }));
}

#[tokio::test]
async fn test_mixed_batch_fails_with_conversion_disabled() {
    let service = MergeService::new(MergeConfig::default());
    let files = vec![pdf_ref("a.pdf", 1, "DocA"), docx_ref("b.docx", 64)];

    let err = service.merge_files(&files, &spec(), None).await.unwrap_err();
    assert!(matches!(err, MergeError::MixedFormat));
}

#[tokio::test]
async fn test_mismatched_extension_is_corrected() {
    let service = MergeService::new(MergeConfig::default());
    let files = vec![pdf_ref("a.pdf", 1, "DocA"), pdf_ref("b.pdf", 1, "DocB")];
    let spec = OutputSpec::new("report.docx", Default::default());

    let output = service.merge_files(&files, &spec, None).await.unwrap();
    assert_eq!(output.filename, "report.pdf");
}

#[tokio::test]
async fn test_settings_flow_from_persisted_json() {
    // Hosts persist a superset of engine settings; unknown keys must not
    // get in the way.
    let json = r#"{
        "theme": "dark",
        "accentColor": "cyan",
        "outputFileName": "bundle",
        "maxFileSizeMB": 25,
        "pdfMetadata": { "title": "Bundle", "author": "Ops" }
    }"#;
    let config = MergeConfig::from_json(json).unwrap();
    config.validate().unwrap();

    let spec = OutputSpec::from_config(&config);
    let service = MergeService::new(config);
    let files = vec![pdf_ref("a.pdf", 1, "DocA"), pdf_ref("b.pdf", 1, "DocB")];

    let output = service.merge_files(&files, &spec, None).await.unwrap();
    assert_eq!(output.filename, "bundle.pdf");

    let doc = lopdf::Document::load_mem(&output.bytes).unwrap();
    let read_back = docmerge::merge::MetadataManager::new().read(&doc);
    assert_eq!(read_back.title, Some("Bundle".to_string()));
    assert_eq!(read_back.author, Some("Ops".to_string()));
}

#[tokio::test]
async fn test_offloaded_merge_matches_inline_contract() {
    let service = MergeService::new(MergeConfig::default());
    let files = vec![pdf_ref("a.pdf", 2, "DocA"), pdf_ref("b.pdf", 1, "DocB")];

    let (events, callback) = recorder();
    let output = service
        .merge_files_offloaded(&files, &spec(), Some(&callback))
        .await
        .unwrap();

    assert_eq!(output.filename, "merged.pdf");
    let doc = lopdf::Document::load_mem(&output.bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 3);

    let events = events.lock().unwrap();
    assert_eq!(events.first().unwrap().percent, 0.0);
    assert_eq!(events.last().unwrap().percent, 100.0);
}

#[tokio::test]
async fn test_service_dispose_releases_worker_without_crashing() {
    let service = MergeService::new(MergeConfig::default());
    let files = vec![docx_ref("a.docx", 64), docx_ref("b.docx", 64)];

    service
        .merge_files_offloaded(&files, &spec(), None)
        .await
        .unwrap();

    service.dispose();
    service.dispose(); // idempotent

    // The service stays usable; a later call simply gets a fresh worker.
    let output = service
        .merge_files_offloaded(&files, &spec(), None)
        .await
        .unwrap();
    assert_eq!(output.filename, "merged.docx");
}

#[tokio::test]
async fn test_disposal_of_queued_job_fires_no_events() {
    let worker = MergeWorker::spawn(MergeConfig::default());

    // Queue a job but dispose before the worker task ever runs; on this
    // single-threaded test runtime the task is not polled until awaited.
    let mut events = worker
        .submit(MergeJob {
            files: vec![docx_ref("a.docx", 64), docx_ref("b.docx", 64)],
            spec: spec(),
        })
        .unwrap();

    worker.dispose();

    assert!(events.recv().await.is_none());
}

#[tokio::test]
async fn test_dispose_mid_operation_rejects_in_flight_call() {
    let worker = Arc::new(MergeWorker::spawn(MergeConfig::default()));

    let runner = Arc::clone(&worker);
    let in_flight = tokio::spawn(async move {
        runner
            .merge(
                vec![docx_ref("a.docx", 64), docx_ref("b.docx", 64)],
                OutputSpec::new("merged", Default::default()),
                None,
            )
            .await
    });

    worker.dispose();

    let result = in_flight.await.unwrap();
    assert!(matches!(result, Err(MergeError::Cancelled)));
}

#[tokio::test]
async fn test_worker_events_marshal_as_plain_data() {
    let event = WorkerEvent::Failed {
        message: "Failed to process broken.pdf: invalid file header".to_string(),
    };

    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("\"type\":\"failed\""));

    let back: WorkerEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(back, event);
}
