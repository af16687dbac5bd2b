use pkgdef_syntax::{CompletionContext, Entry, ParseItem, ParsedDocument, content_hash, parse};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::broadcast;
use tokio::runtime::Handle;
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info, warn};

use crate::config::{DocumentOptions, ReprocessPolicy};

/// Sent to subscribers after a pass has been published.
#[derive(Debug, Clone)]
pub struct Processed {
    /// Increases by one with every published pass.
    pub generation: u64,
    pub document: Arc<ParsedDocument>,
}

/// A pkgdef document kept in sync with a changing line buffer.
///
/// Cloning is cheap; clones share the same state. Passes run on the tokio
/// runtime, at most one at a time per document. Readers always see a whole
/// snapshot: a pass builds a new [`ParsedDocument`] and swaps it in.
#[derive(Clone)]
pub struct Document {
    inner: Arc<DocumentInner>,
}

struct DocumentInner {
    options: DocumentOptions,
    /// Runtime passes are spawned on; `None` when built outside of one.
    runtime: Option<Handle>,
    lines: RwLock<Arc<Vec<String>>>,
    published: RwLock<Arc<ParsedDocument>>,
    /// Hash of the lines behind `published`; `None` before the first pass.
    parsed_hash: Mutex<Option<u64>>,
    generation: AtomicU64,
    processing: AtomicBool,
    pending: AtomicBool,
    closed: AtomicBool,
    events: Mutex<Option<broadcast::Sender<Processed>>>,
}

impl Document {
    /// A live document. Nothing is parsed until a pass is requested.
    pub fn new(lines: Vec<String>) -> Self {
        Self::with_options(lines, DocumentOptions::default())
    }

    /// Passes run on the tokio runtime the document is created in, if any.
    pub fn with_options(lines: Vec<String>, options: DocumentOptions) -> Self {
        Self::build(lines, options, Handle::try_current().ok())
    }

    /// A live document whose passes run on `runtime`, so processing can be
    /// requested from threads outside of it.
    pub fn with_runtime(lines: Vec<String>, options: DocumentOptions, runtime: Handle) -> Self {
        Self::build(lines, options, Some(runtime))
    }

    fn build(lines: Vec<String>, options: DocumentOptions, runtime: Option<Handle>) -> Self {
        let (events, _) = broadcast::channel(options.channel_capacity.max(1));
        Self {
            inner: Arc::new(DocumentInner {
                options,
                runtime,
                lines: RwLock::new(Arc::new(lines)),
                published: RwLock::new(Arc::new(ParsedDocument::default())),
                parsed_hash: Mutex::new(None),
                generation: AtomicU64::new(0),
                processing: AtomicBool::new(false),
                pending: AtomicBool::new(false),
                closed: AtomicBool::new(false),
                events: Mutex::new(Some(events)),
            }),
        }
    }

    /// A one-shot document, parsed on the calling thread before returning.
    pub fn snapshot(lines: Vec<String>) -> Self {
        let document = Self::new(lines);
        let lines = document.lines();
        let hash = content_hash(&lines);
        document.inner.publish(parse(&lines), hash);
        document
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(pkgdef_syntax::split_lines(text))
    }

    pub fn options(&self) -> &DocumentOptions {
        &self.inner.options
    }

    pub fn lines(&self) -> Arc<Vec<String>> {
        self.inner.lines()
    }

    pub fn text(&self) -> String {
        self.lines().concat()
    }

    /// Replaces the working lines. Does not start a pass.
    pub fn update_lines(&self, lines: Vec<String>) {
        if self.is_closed() {
            return;
        }
        *self
            .inner
            .lines
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(lines);
    }

    /// Entry point for buffer change notifications: stores the new lines
    /// and requests a pass.
    pub fn buffer_changed(&self, lines: Vec<String>) -> Option<JoinHandle<()>> {
        self.update_lines(lines);
        self.process_async()
    }

    /// Requests a pass and returns immediately.
    ///
    /// Returns the handle of the worker that was started, or `None` when a
    /// pass is already running (the request is then coalesced or dropped per
    /// [`ReprocessPolicy`]), the document is closed, or there is no runtime
    /// to run on. May be called from any thread.
    pub fn process_async(&self) -> Option<JoinHandle<()>> {
        if self.is_closed() {
            return None;
        }

        let Some(runtime) = self
            .inner
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
        else {
            warn!("no tokio runtime available, pass not started");
            return None;
        };

        self.inner.pending.store(true, Ordering::SeqCst);
        if self.inner.processing.swap(true, Ordering::SeqCst) {
            match self.inner.options.reprocess {
                ReprocessPolicy::Coalesce => debug!("pass in flight, request coalesced"),
                ReprocessPolicy::Drop => debug!("pass in flight, request dropped"),
            }
            return None;
        }

        let inner = Arc::clone(&self.inner);
        Some(runtime.spawn(run_passes(inner)))
    }

    /// The most recently published snapshot.
    pub fn current(&self) -> Arc<ParsedDocument> {
        self.inner.current()
    }

    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    pub fn is_processing(&self) -> bool {
        self.inner.processing.load(Ordering::SeqCst)
    }

    pub fn is_valid(&self) -> bool {
        self.current().is_valid()
    }

    pub fn items(&self) -> Vec<ParseItem> {
        self.current().items().to_vec()
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.current().entries().to_vec()
    }

    pub fn find_item_from_position(&self, offset: usize) -> Option<ParseItem> {
        self.current().find_item_from_position(offset).cloned()
    }

    /// The entry whose key or properties cover `offset`.
    pub fn entry_at(&self, offset: usize) -> Option<Entry> {
        self.current().entry_at(offset).cloned()
    }

    pub fn completion_context(&self, offset: usize) -> CompletionContext {
        self.current().completion_context(offset)
    }

    /// Receives a [`Processed`] notification for every later pass.
    pub fn subscribe(&self) -> Subscription {
        let receiver = self
            .inner
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(broadcast::Sender::subscribe);
        Subscription { receiver }
    }

    /// Detaches from the buffer. Later updates and requests are ignored, a
    /// running pass does not publish, and subscriptions end.
    pub fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        info!(generation = self.generation(), "pkgdef document closed");
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

impl DocumentInner {
    fn lines(&self) -> Arc<Vec<String>> {
        Arc::clone(&self.lines.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn current(&self) -> Arc<ParsedDocument> {
        Arc::clone(&self.published.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn is_unchanged(&self, hash: u64) -> bool {
        *self.parsed_hash.lock().unwrap_or_else(PoisonError::into_inner) == Some(hash)
    }

    fn publish(&self, parsed: ParsedDocument, hash: u64) {
        if self.closed.load(Ordering::SeqCst) {
            debug!("document closed, discarding pass");
            return;
        }

        let parsed = Arc::new(parsed);
        *self.published.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&parsed);
        *self.parsed_hash.lock().unwrap_or_else(PoisonError::into_inner) = Some(hash);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        debug!(
            generation,
            items = parsed.items().len(),
            entries = parsed.entries().len(),
            errors = parsed.error_count(),
            "pkgdef pass published"
        );

        if let Some(events) = self.events.lock().unwrap_or_else(PoisonError::into_inner).as_ref() {
            // No receivers is fine.
            let _ = events.send(Processed {
                generation,
                document: parsed,
            });
        }
    }
}

async fn run_passes(inner: Arc<DocumentInner>) {
    loop {
        inner.pending.store(false, Ordering::SeqCst);

        let lines = inner.lines();
        let hash = content_hash(&lines);
        if inner.is_unchanged(hash) {
            debug!("content unchanged, skipping pass");
        } else {
            match task::spawn_blocking(move || parse(&lines)).await {
                Ok(parsed) => inner.publish(parsed, hash),
                Err(e) => error!(error = %e, "pkgdef pass failed, keeping previous snapshot"),
            }
        }

        inner.processing.store(false, Ordering::SeqCst);

        let again = inner.options.reprocess == ReprocessPolicy::Coalesce
            && inner.pending.load(Ordering::SeqCst)
            && !inner.closed.load(Ordering::SeqCst);
        if !again || inner.processing.swap(true, Ordering::SeqCst) {
            break;
        }
        debug!("running coalesced pass");
    }
}

/// A handle on a document's `Processed` notifications.
///
/// Dropping it unsubscribes.
pub struct Subscription {
    receiver: Option<broadcast::Receiver<Processed>>,
}

impl Subscription {
    /// Waits for the next notification. Returns `None` once the document is
    /// closed. Notifications missed by a slow subscriber are skipped.
    pub async fn recv(&mut self) -> Option<Processed> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(processed) => return Some(processed),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "subscriber lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    self.receiver = None;
                    return None;
                }
            }
        }
    }

    /// Returns a pending notification without waiting.
    pub fn try_recv(&mut self) -> Option<Processed> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.try_recv() {
                Ok(processed) => return Some(processed),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}
