//! Structural understanding of pkgdef registry files.
//!
//! Re-exports the syntax pipeline from `pkgdef-syntax` and the live
//! document from `pkgdef-document`.

use std::path::Path;

pub use pkgdef_document::{Document, DocumentOptions, Processed, ReprocessPolicy, Subscription};
pub use pkgdef_syntax::{
    Category, CompletionContext, Entry, Error, ErrorCode, ErrorReport, ItemId, ItemType,
    ParseItem, ParsedDocument, Property, Reference, Severity, Span, parse, split_lines, variables,
};

/// File extensions handled by this crate.
pub const EXTENSIONS: [&str; 2] = ["pkgdef", "pkgundef"];

/// True when `path` has a pkgdef extension, ignoring case.
pub fn is_pkgdef_path(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

pub mod prelude {
    pub use crate::{Document, ErrorCode, ParsedDocument, parse, split_lines};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_pkgdef_paths() {
        assert!(is_pkgdef_path("ext/Package.pkgdef"));
        assert!(is_pkgdef_path("Package.PkgUndef"));
        assert!(!is_pkgdef_path("Package.reg"));
        assert!(!is_pkgdef_path("pkgdef"));
    }
}
