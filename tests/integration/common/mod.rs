//! Integration test helpers.
//!
//! Fixtures are built programmatically with lopdf so the suite never
//! depends on binary files being present.

use std::sync::{Arc, Mutex};

use docmerge::progress::{ProgressCallback, ProgressEvent};
use docmerge::{DocFormat, DocumentRef};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Build a simple PDF with `num_pages` pages of identifiable text.
pub fn sample_pdf(num_pages: u32, content_prefix: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let catalog_id = doc.new_object_id();

    let mut page_ids = Vec::new();
    for page_num in 0..num_pages {
        let page_id = doc.new_object_id();
        let content_id = doc.new_object_id();

        let content = format!(
            "BT /F1 12 Tf 50 700 Td ({}-Page-{}) Tj ET",
            content_prefix,
            page_num + 1
        );
        doc.objects.insert(
            content_id,
            Object::Stream(Stream::new(Dictionary::new(), content.into_bytes())),
        );

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(pages_id));
        page_dict.set("Contents", Object::Reference(content_id));
        page_dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        );

        doc.objects.insert(page_id, Object::Dictionary(page_dict));
        page_ids.push(Object::Reference(page_id));
    }

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set("Count", Object::Integer(num_pages as i64));
    pages_dict.set("Kids", Object::Array(page_ids));
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog_dict = Dictionary::new();
    catalog_dict.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog_dict.set("Pages", Object::Reference(pages_id));
    doc.objects
        .insert(catalog_id, Object::Dictionary(catalog_dict));

    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// A PDF document reference with a resolved page count.
pub fn pdf_ref(name: &str, pages: u32, prefix: &str) -> DocumentRef {
    let content = sample_pdf(pages, prefix);
    let mut doc = DocumentRef::new(format!("file_{name}"), name, DocFormat::Pdf, content, 0);
    doc.page_count = Some(pages);
    doc
}

/// A DOCX document reference carrying opaque bytes.
pub fn docx_ref(name: &str, size: usize) -> DocumentRef {
    DocumentRef::new(
        format!("file_{name}"),
        name,
        DocFormat::Docx,
        vec![0u8; size],
        0,
    )
}

/// Extract the text fragment of every page, in page order.
pub fn page_texts(bytes: &[u8]) -> Vec<String> {
    let mut doc = Document::load_mem(bytes).unwrap();
    doc.decompress();
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    page_ids
        .iter()
        .map(|&id| {
            let content = doc.get_page_content(id).unwrap();
            let text = String::from_utf8_lossy(&content);
            let start = text.find('(').unwrap();
            let end = text.find(')').unwrap();
            text[start + 1..end].to_string()
        })
        .collect()
}

/// A progress callback that records every event it sees.
pub fn recorder() -> (Arc<Mutex<Vec<ProgressEvent>>>, Box<ProgressCallback>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let callback: Box<ProgressCallback> = Box::new(move |event| sink.lock().unwrap().push(event));
    (events, callback)
}
