//! # Pkgdef Document
//!
//! Keeps a parsed, validated model of a pkgdef buffer in sync with its text.
//!
//! A [`Document`] owns the current lines and the last published
//! [`ParsedDocument`](pkgdef_syntax::ParsedDocument). Requesting a pass
//! returns immediately; the tokenize → organize → validate work runs on the
//! tokio blocking pool and the result replaces the published snapshot in one
//! swap. A pass is skipped when the line content hash matches the last one
//! parsed, and at most one pass runs per document at a time.
//!
//! ```rust,no_run
//! use pkgdef_document::Document;
//!
//! # async fn demo() {
//! let doc = Document::from_text("[$RootKey$\\Test]\n\"Count\"=dword:00000001\n");
//! let mut events = doc.subscribe();
//!
//! if let Some(pass) = doc.process_async() {
//!     pass.await.ok();
//! }
//! let processed = events.recv().await;
//! assert!(processed.is_some_and(|p| p.document.is_valid()));
//! # }
//! ```

pub mod config;
mod document;

pub use config::{DocumentOptions, ReprocessPolicy};
pub use document::{Document, Processed, Subscription};
