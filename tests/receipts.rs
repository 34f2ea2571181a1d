//! Integration tests for the receipt indexer.
//!
//! The LLM is replaced by a scripted `CompletionClient`, so these run
//! offline. Most tests also swap in a fake `TextExtractor` keyed by file
//! name; one test goes through the real PDF extractor on a lopdf-generated
//! document.

use async_trait::async_trait;
use docbatch::{
    build_index, BatchProgressCallback, CompletionClient, CompletionRequest, DocumentError,
    IndexConfig, IndexError, TextExtractor, UNKNOWN,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Replies with the canned text whose key appears in the prompt.
struct ScriptedClient {
    replies: Vec<(&'static str, Result<String, DocumentError>)>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn new(replies: Vec<(&'static str, Result<String, DocumentError>)>) -> Arc<Self> {
        Arc::new(Self {
            replies,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, DocumentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .iter()
            .find(|(key, _)| request.user.contains(key))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| Ok("I cannot help with that.".to_string()))
    }
}

/// Returns fixed text per file name; unknown names fail extraction.
struct MapExtractor(HashMap<&'static str, &'static str>);

impl TextExtractor for MapExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, DocumentError> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        self.0
            .get(name)
            .map(|t| t.to_string())
            .ok_or_else(|| DocumentError::TextExtraction {
                detail: format!("no fixture for {name}"),
            })
    }
}

fn touch(dir: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), b"%PDF-1.4 fixture").unwrap();
    }
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .unwrap();
    rdr.records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect()
}

fn config(client: Arc<ScriptedClient>, extractor: MapExtractor) -> IndexConfig {
    IndexConfig::builder()
        .client(client)
        .extractor(Arc::new(extractor))
        .build()
        .unwrap()
}

const HOTEL_REPLY: &str = r#"{"total_amount": "$1,234.56", "currency": "USD", "transaction_date": "2024-03-02", "descriptive_details": "Hotel, two nights"}"#;

// ── Row accounting ───────────────────────────────────────────────────────────

#[tokio::test]
async fn one_row_per_document_in_name_order() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    touch(src.path(), &["b_hotel.pdf", "a_blank.pdf", "c_chatty.PDF", "notes.txt"]);

    let client = ScriptedClient::new(vec![("HOTEL", Ok(HOTEL_REPLY.to_string()))]);
    let extractor = MapExtractor(HashMap::from([
        ("a_blank.pdf", "   \n\t"),
        ("b_hotel.pdf", "GRAND HOTEL total 1,234.56"),
        ("c_chatty.PDF", "some other receipt"),
    ]));
    let dest = out.path().join("index.csv");

    let stats = build_index(src.path(), &dest, &config(client.clone(), extractor))
        .await
        .unwrap();

    assert_eq!(stats.total_documents, 3);
    assert_eq!(stats.rows_written, 3);
    assert_eq!(stats.parsed_documents, 1);
    assert_eq!(stats.empty_documents, 1);
    assert_eq!(stats.failed_documents, 1);

    let rows = read_rows(&dest);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], ["a_blank.pdf", UNKNOWN, UNKNOWN, UNKNOWN, UNKNOWN]);
    assert_eq!(
        rows[1],
        ["b_hotel.pdf", "1234.56", "USD", "2024-03-02", "Hotel, two nights"]
    );
    assert_eq!(rows[2], ["c_chatty.PDF", UNKNOWN, UNKNOWN, UNKNOWN, UNKNOWN]);

    // The blank document never reached the model.
    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn failures_become_placeholder_rows() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    touch(src.path(), &["broken.pdf", "offline.pdf", "weird.pdf"]);

    let client = ScriptedClient::new(vec![
        (
            "OFFLINE",
            Err(DocumentError::LlmFailed {
                detail: "connection refused".into(),
            }),
        ),
        ("WEIRD", Ok(r#"Sure! {"total_amount": "abc", "currency": null}"#.to_string())),
    ]);
    let extractor = MapExtractor(HashMap::from([
        ("offline.pdf", "OFFLINE receipt"),
        ("weird.pdf", "WEIRD receipt"),
    ]));
    let dest = out.path().join("index.csv");

    let stats = build_index(src.path(), &dest, &config(client, extractor))
        .await
        .unwrap();
    assert_eq!(stats.rows_written, 3);

    let rows = read_rows(&dest);
    assert_eq!(rows[0], ["broken.pdf", UNKNOWN, UNKNOWN, UNKNOWN, UNKNOWN]);
    assert_eq!(rows[1], ["offline.pdf", UNKNOWN, UNKNOWN, UNKNOWN, UNKNOWN]);
    // Parsed object with unusable values: every field still falls back.
    assert_eq!(rows[2], ["weird.pdf", UNKNOWN, UNKNOWN, UNKNOWN, UNKNOWN]);
}

#[tokio::test]
async fn rerun_overwrites_destination() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    touch(src.path(), &["r1.pdf", "r2.pdf"]);
    let dest = out.path().join("index.csv");

    for _ in 0..2 {
        let client = ScriptedClient::new(vec![]);
        let extractor = MapExtractor(HashMap::from([("r1.pdf", "x"), ("r2.pdf", "y")]));
        build_index(src.path(), &dest, &config(client, extractor))
            .await
            .unwrap();
    }

    assert_eq!(read_rows(&dest).len(), 2);
}

// ── Fatal preconditions ──────────────────────────────────────────────────────

#[tokio::test]
async fn missing_source_is_fatal_and_writes_nothing() {
    let out = TempDir::new().unwrap();
    let dest = out.path().join("index.csv");
    let client = ScriptedClient::new(vec![]);

    let err = build_index(
        out.path().join("nope"),
        &dest,
        &config(client, MapExtractor(HashMap::new())),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, IndexError::SourceNotFound { .. }));
    assert!(!dest.exists());
}

#[tokio::test]
async fn empty_source_is_fatal_and_writes_nothing() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    touch(src.path(), &["readme.txt"]);
    let dest = out.path().join("index.csv");
    let client = ScriptedClient::new(vec![]);

    let err = build_index(src.path(), &dest, &config(client, MapExtractor(HashMap::new())))
        .await
        .unwrap_err();

    assert!(matches!(err, IndexError::NoDocuments { .. }));
    assert!(!dest.exists());
}

#[tokio::test]
async fn existing_destination_survives_a_fatal_error() {
    let out = TempDir::new().unwrap();
    let dest = out.path().join("index.csv");
    std::fs::write(&dest, "keep me\n").unwrap();
    let client = ScriptedClient::new(vec![]);

    build_index(
        out.path().join("nope"),
        &dest,
        &config(client, MapExtractor(HashMap::new())),
    )
    .await
    .unwrap_err();

    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "keep me\n");
}

// ── Progress ─────────────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingCallback {
    events: Mutex<Vec<String>>,
}

impl BatchProgressCallback for RecordingCallback {
    fn on_batch_start(&self, total: usize) {
        self.events.lock().unwrap().push(format!("start {total}"));
    }
    fn on_item_complete(&self, index: usize, total: usize, name: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("ok {index}/{total} {name}"));
    }
    fn on_item_error(&self, index: usize, total: usize, name: &str, _error: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("err {index}/{total} {name}"));
    }
    fn on_batch_complete(&self, total: usize, success_count: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("done {success_count}/{total}"));
    }
}

#[tokio::test]
async fn progress_reports_each_document() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    touch(src.path(), &["a.pdf", "b.pdf"]);

    let cb = Arc::new(RecordingCallback::default());
    let config = IndexConfig::builder()
        .client(ScriptedClient::new(vec![("HOTEL", Ok(HOTEL_REPLY.to_string()))]))
        .extractor(Arc::new(MapExtractor(HashMap::from([("a.pdf", "HOTEL")]))))
        .progress_callback(cb.clone())
        .build()
        .unwrap();

    build_index(src.path(), out.path().join("i.csv"), &config)
        .await
        .unwrap();

    let events = cb.events.lock().unwrap().clone();
    assert_eq!(
        events,
        ["start 2", "ok 1/2 a.pdf", "err 2/2 b.pdf", "done 1/2"]
    );
}

// ── Real PDF extraction ──────────────────────────────────────────────────────

/// Generate a one-page PDF with a Helvetica text run using lopdf.
fn make_pdf(text: &str) -> Vec<u8> {
    use lopdf::dictionary;
    use lopdf::{Document, Object, Stream};

    let mut doc = Document::with_version("1.4");
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let content = format!("BT /F1 12 Tf 100 700 Td ({text}) Tj ET");
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        },
    });
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    });
    if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
        dict.set("Parent", pages_id);
    }
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

#[tokio::test]
async fn real_pdf_text_reaches_the_model() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    std::fs::write(src.path().join("hotel.pdf"), make_pdf("HOTEL TOTAL 1234.56")).unwrap();

    let client = ScriptedClient::new(vec![("HOTEL", Ok(HOTEL_REPLY.to_string()))]);
    let config = IndexConfig::builder().client(client.clone()).build().unwrap();
    let dest = out.path().join("index.csv");

    let stats = build_index(src.path(), &dest, &config).await.unwrap();

    assert_eq!(stats.parsed_documents, 1);
    assert_eq!(client.calls(), 1);
    assert_eq!(read_rows(&dest)[0][1], "1234.56");
}
