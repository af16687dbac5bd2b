//! # Pkgdef Syntax
//!
//! Lexer, semantic organizer, and validator for pkgdef registry files.
//!
//! ## Overview
//!
//! A pkgdef file declares registry keys and the values written under them:
//!
//! ```text
//! ; comment
//! #include "other.pkgdef"
//! [$RootKey$\Languages\File Extensions\.pkgdef]
//! @="{5dd0bb59-7076-4c59-88d3-de36931f63f0}"
//! "Priority"=dword:00000064
//! ```
//!
//! This crate turns such text into a flat sequence of typed items, groups
//! them into entries, and attaches rule violations:
//!
//! ```text
//! Lines
//!     ↓
//! Lexer (tokenize)
//!     ↓
//! Vec<ParseItem>
//!     ↓
//! Organizer (organize)
//!     ↓
//! Vec<Entry>
//!     ↓
//! Validator (validate)
//!     ↓
//! ParsedDocument
//! ```
//!
//! ## Example
//!
//! ```rust
//! use pkgdef_syntax::{parse, split_lines, ErrorCode};
//!
//! let lines = split_lines("[$RootKey$\\Test]\n\"Count\"=dword:123\n");
//! let doc = parse(&lines);
//!
//! assert_eq!(doc.entries().len(), 1);
//! assert!(!doc.is_valid());
//! assert_eq!(doc.reports()[0].code, ErrorCode::PL009);
//! ```
//!
//! Malformed input never fails: unclassifiable lines become
//! [`ItemType::Unknown`] items and every violation is recorded as an
//! [`Error`] on the item it concerns.

pub mod error;
pub mod item;
pub mod lexer;
pub mod organizer;
pub mod parsed;
pub mod validator;
pub mod variables;

pub use error::{Category, Error, ErrorCode, ErrorDescriptor, ErrorReport, Severity, Span};
pub use item::{Entry, ItemId, ItemType, ParseItem, Property, Reference};
pub use lexer::{split_lines, tokenize};
pub use organizer::organize;
pub use parsed::{CompletionContext, ParsedDocument, content_hash, parse};
pub use validator::validate;
