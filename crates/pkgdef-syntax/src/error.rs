//! Spans, the rule catalog, and the errors attached to parse items.
//!
//! Every rule has a stable code (`PL001` ... `PL011`) that consumers may
//! branch on. The catalog is a static table; nothing here is mutated after
//! startup.

use std::fmt;
use std::str::FromStr;

/// Half-open character range `[start, end)` into the document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end: end.max(start) }
    }

    pub fn with_len(start: usize, len: usize) -> Self {
        Self { start, end: start + len }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when `offset` lies inside the span, or on its end for empty spans.
    pub fn contains(&self, offset: usize) -> bool {
        if self.is_empty() {
            return offset == self.start;
        }
        offset >= self.start && offset < self.end
    }

    /// True when `offset` lies inside the span or directly after its last character.
    pub fn touches(&self, offset: usize) -> bool {
        offset >= self.start && offset <= self.end
    }

    pub fn merge(&self, other: &Span) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// How loudly an error should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Suggestion,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Suggestion => "suggestion",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an error belongs in an error list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    SyntaxError,
    Warning,
    Suggestion,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::SyntaxError => "syntax error",
            Category::Warning => "warning",
            Category::Suggestion => "suggestion",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable rule identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorCode {
    /// Line could not be classified.
    PL001,
    /// Registry key is missing its closing `]`.
    PL002,
    /// Registry key uses `/` as a path delimiter.
    PL003,
    /// Default value marker written as `"@"`.
    PL004,
    /// Unquoted property name, or value missing its closing quote.
    PL005,
    /// Reference to a variable outside the predefined catalog.
    PL006,
    /// Reference missing its closing `$`.
    PL007,
    /// Registry key repeated in the same document.
    PL008,
    /// `dword:` value is not 8 hex digits.
    PL009,
    /// `qword:` value is not 16 hex digits.
    PL010,
    /// `hex:` value is not a list of two-digit hex bytes.
    PL011,
}

/// Static description of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorDescriptor {
    pub code: ErrorCode,
    /// Message template. `{0}` marks the single substitution slot.
    pub template: &'static str,
    pub severity: Severity,
    pub category: Category,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 11] = [
        ErrorCode::PL001,
        ErrorCode::PL002,
        ErrorCode::PL003,
        ErrorCode::PL004,
        ErrorCode::PL005,
        ErrorCode::PL006,
        ErrorCode::PL007,
        ErrorCode::PL008,
        ErrorCode::PL009,
        ErrorCode::PL010,
        ErrorCode::PL011,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::PL001 => "PL001",
            ErrorCode::PL002 => "PL002",
            ErrorCode::PL003 => "PL003",
            ErrorCode::PL004 => "PL004",
            ErrorCode::PL005 => "PL005",
            ErrorCode::PL006 => "PL006",
            ErrorCode::PL007 => "PL007",
            ErrorCode::PL008 => "PL008",
            ErrorCode::PL009 => "PL009",
            ErrorCode::PL010 => "PL010",
            ErrorCode::PL011 => "PL011",
        }
    }

    pub fn descriptor(&self) -> ErrorDescriptor {
        let (template, severity, category) = match self {
            ErrorCode::PL001 => (
                "Unknown token at this location",
                Severity::Error,
                Category::SyntaxError,
            ),
            ErrorCode::PL002 => (
                "Unclosed registry key entry. Add the missing ] character",
                Severity::Error,
                Category::SyntaxError,
            ),
            ErrorCode::PL003 => (
                "Use the backslash character as delimiter instead of forward slash",
                Severity::Error,
                Category::SyntaxError,
            ),
            ErrorCode::PL004 => (
                "To set a registry key's default value, use '@' without quotes",
                Severity::Warning,
                Category::Warning,
            ),
            ErrorCode::PL005 => (
                "Value names must be enclosed in double quotes and strings must end with a closing quote",
                Severity::Error,
                Category::SyntaxError,
            ),
            ErrorCode::PL006 => (
                "The variable \"{0}\" doesn't exist",
                Severity::Warning,
                Category::Warning,
            ),
            ErrorCode::PL007 => (
                "Variables must begin and end with the $ character",
                Severity::Error,
                Category::SyntaxError,
            ),
            ErrorCode::PL008 => (
                "There is already a {0} key in this document. Consider merging the two",
                Severity::Suggestion,
                Category::Suggestion,
            ),
            ErrorCode::PL009 => (
                "Invalid dword value. It must be exactly 8 hexadecimal digits",
                Severity::Error,
                Category::SyntaxError,
            ),
            ErrorCode::PL010 => (
                "Invalid qword value. It must be exactly 16 hexadecimal digits",
                Severity::Error,
                Category::SyntaxError,
            ),
            ErrorCode::PL011 => (
                "Invalid hex value. It must be a comma-separated list of two-digit hexadecimal bytes",
                Severity::Error,
                Category::SyntaxError,
            ),
        };

        ErrorDescriptor {
            code: *self,
            template,
            severity,
            category,
        }
    }

    pub fn severity(&self) -> Severity {
        self.descriptor().severity
    }

    pub fn category(&self) -> Category {
        self.descriptor().category
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not a known rule code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCode(pub String);

impl fmt::Display for UnknownCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown rule code '{}'", self.0)
    }
}

impl std::error::Error for UnknownCode {}

impl FromStr for ErrorCode {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCode(wanted.to_string()))
    }
}

/// A rule violation attached to an item or reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
}

impl Error {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.descriptor().template.to_string(),
        }
    }

    /// Fills the template's `{0}` slot with `arg`.
    pub fn with_arg(code: ErrorCode, arg: &str) -> Self {
        Self {
            code,
            message: code.descriptor().template.replace("{0}", arg),
        }
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn category(&self) -> Category {
        self.code.category()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

/// An error resolved to its location, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
    pub severity: Severity,
    pub category: Category,
    pub span: Span,
    /// Zero-based line.
    pub line: usize,
    /// Zero-based character column.
    pub column: usize,
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} {}: {}",
            self.line + 1,
            self.column + 1,
            self.severity,
            self.code,
            self.message
        )
    }
}
