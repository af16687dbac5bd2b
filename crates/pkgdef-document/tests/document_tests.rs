use pkgdef_document::{Document, DocumentOptions, ReprocessPolicy};
use pkgdef_syntax::{ErrorCode, ItemType, split_lines};
use std::sync::Arc;
use tokio::runtime::Builder;

const VALID: &str = "[$RootKey$\\Test]\n\"Count\"=dword:00000001\n";
const INVALID: &str = "[$RootKey$\\Test]\n\"Count\"=dword:1\n";

async fn process(doc: &Document) {
    if let Some(pass) = doc.process_async() {
        pass.await.expect("pass task");
    }
}

#[tokio::test]
async fn test_nothing_published_before_first_pass() {
    let doc = Document::from_text(VALID);

    assert_eq!(doc.generation(), 0);
    assert!(doc.items().is_empty());
    assert!(doc.is_valid());
    assert!(!doc.is_processing());
}

#[tokio::test]
async fn test_pass_publishes_items_and_entries() {
    let doc = Document::from_text(INVALID);
    process(&doc).await;

    assert_eq!(doc.generation(), 1);
    assert_eq!(doc.entries().len(), 1);
    assert!(!doc.is_valid());
    assert!(doc.items()[3].has_error(ErrorCode::PL009));
    assert!(!doc.is_processing());
}

#[tokio::test]
async fn test_unchanged_content_is_a_no_op() {
    let doc = Document::from_text(VALID);
    process(&doc).await;
    let before = doc.current();

    process(&doc).await;
    doc.update_lines(split_lines(VALID));
    process(&doc).await;

    assert!(Arc::ptr_eq(&before, &doc.current()));
    assert_eq!(doc.generation(), 1);
}

#[tokio::test]
async fn test_update_lines_does_not_process() {
    let doc = Document::from_text(VALID);
    process(&doc).await;

    doc.update_lines(split_lines(INVALID));
    assert!(doc.is_valid());
    assert_eq!(doc.text(), INVALID);

    process(&doc).await;
    assert!(!doc.is_valid());
    assert_eq!(doc.generation(), 2);
}

#[tokio::test]
async fn test_processed_is_sent_after_swap() {
    let doc = Document::from_text(VALID);
    let mut events = doc.subscribe();

    process(&doc).await;

    let processed = events.recv().await.expect("notification");
    assert_eq!(processed.generation, 1);
    assert!(Arc::ptr_eq(&processed.document, &doc.current()));
    assert!(events.try_recv().is_none());
}

#[tokio::test]
async fn test_second_request_during_pass_is_not_started() {
    let doc = Document::from_text(VALID);

    let first = doc.process_async().expect("first pass starts");
    assert!(doc.is_processing());
    assert!(doc.process_async().is_none());

    first.await.expect("pass task");
    assert!(!doc.is_processing());
}

#[tokio::test]
async fn test_coalesced_request_catches_up() {
    let doc = Document::with_options(
        split_lines(VALID),
        DocumentOptions::default().with_reprocess(ReprocessPolicy::Coalesce),
    );

    let first = doc.process_async().expect("first pass starts");
    tokio::task::yield_now().await;
    let second = doc.buffer_changed(split_lines(INVALID));

    assert!(second.is_none());

    first.await.expect("pass task");

    assert_eq!(doc.generation(), 2);
    assert!(!doc.is_valid());
    assert!(!doc.is_processing());
}

#[tokio::test]
async fn test_drop_policy_discards_request() {
    let doc = Document::with_options(
        split_lines(VALID),
        DocumentOptions::default().with_reprocess(ReprocessPolicy::Drop),
    );

    let first = doc.process_async().expect("first pass starts");
    assert!(doc.buffer_changed(split_lines(INVALID)).is_none());
    first.await.expect("pass task");

    assert!(!doc.is_processing());
    // A fresh request is accepted once the pass is over.
    process(&doc).await;
    assert!(!doc.is_valid());
}

#[tokio::test]
async fn test_find_item_from_position() {
    let doc = Document::from_text(VALID);
    process(&doc).await;

    let item = doc.find_item_from_position(4).expect("item");
    assert_eq!(item.item_type, ItemType::ReferenceName);
    assert_eq!(item.text, "RootKey");

    let entry = doc.entry_at(4).expect("entry");
    assert_eq!(entry.properties.len(), 1);
}

#[tokio::test]
async fn test_close_detaches() {
    let doc = Document::from_text(VALID);
    let mut events = doc.subscribe();
    process(&doc).await;
    assert!(events.recv().await.is_some());

    doc.close();
    assert!(doc.is_closed());
    assert!(events.recv().await.is_none());

    doc.update_lines(split_lines(INVALID));
    assert!(doc.process_async().is_none());
    assert_eq!(doc.text(), VALID);
    assert_eq!(doc.generation(), 1);
}

#[tokio::test]
async fn test_buffer_changed_from_event_thread() {
    let doc = Document::from_text(VALID);
    let host = doc.clone();

    let pass = std::thread::spawn(move || host.buffer_changed(split_lines(INVALID)))
        .join()
        .expect("event thread");
    pass.expect("pass starts").await.expect("pass task");

    assert_eq!(doc.generation(), 1);
    assert!(!doc.is_valid());
    assert!(!doc.is_processing());
}

#[test]
fn test_request_without_runtime_is_not_started() {
    let doc = Document::from_text(VALID);

    assert!(doc.process_async().is_none());
    assert!(!doc.is_processing());

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");
    runtime.block_on(process(&doc));
    assert_eq!(doc.generation(), 1);
}

#[test]
fn test_with_runtime_spawns_on_given_runtime() {
    let runtime = Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("runtime");
    let doc = Document::with_runtime(
        split_lines(INVALID),
        DocumentOptions::default(),
        runtime.handle().clone(),
    );

    let pass = doc.process_async().expect("pass starts");
    runtime.block_on(pass).expect("pass task");

    assert_eq!(doc.generation(), 1);
    assert!(!doc.is_valid());
}

#[test]
fn test_snapshot_is_processed_synchronously() {
    let doc = Document::snapshot(split_lines(INVALID));

    assert_eq!(doc.generation(), 1);
    assert!(!doc.is_valid());
    assert_eq!(doc.current().reports()[0].code, ErrorCode::PL009);
}
