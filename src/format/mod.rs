//! Format-string dialect mini-parsers.
//!
//! The committer re-parses every extracted string against the dialects of the
//! active scanner family to decide whether it should carry a format flag in
//! the catalog. A string counts as a format string only if it contains at
//! least one real (argument-consuming) directive; a stray `%` alone never
//! forces translators to escape things.

mod c;
mod python;
mod python_brace;

pub use c::CFormatParser;
pub use python::PythonFormatParser;
pub use python_brace::PythonBraceFormatParser;

/// Number of known dialects across all scanner families.
pub const NDIALECTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatDialect {
    C,
    Python,
    PythonBrace,
}

impl FormatDialect {
    /// Index into per-message classification arrays.
    pub const fn index(self) -> usize {
        match self {
            Self::C => 0,
            Self::Python => 1,
            Self::PythonBrace => 2,
        }
    }

    /// Dialect name as it appears in flag specs and PO flag comments,
    /// without the `-format` suffix.
    pub const fn name(self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Python => "python",
            Self::PythonBrace => "python-brace",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "c" => Some(Self::C),
            "python" => Some(Self::Python),
            "python-brace" => Some(Self::PythonBrace),
            _ => None,
        }
    }

    pub const ALL: [FormatDialect; NDIALECTS] =
        [Self::C, Self::Python, Self::PythonBrace];
}

/// What a successful dialect parse learned about a string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatDescriptor {
    /// Count of argument-consuming directives (`%%`, `{{` and friends do
    /// not count).
    pub directives: usize,
}

/// Why a string is not valid in some dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    pub reason: String,
}

impl FormatError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reason)
    }
}

pub trait FormatDialectParser {
    fn dialect(&self) -> FormatDialect;

    /// Parse `text` as a format string of this dialect. `Err` means the
    /// string is not valid in the dialect; `Ok` with zero directives means
    /// valid but carrying nothing worth flagging.
    fn parse(&self, text: &str) -> Result<FormatDescriptor, FormatError>;
}

/// Parser registry, keyed by dialect.
pub fn parser_for(dialect: FormatDialect) -> &'static dyn FormatDialectParser {
    match dialect {
        FormatDialect::C => &CFormatParser,
        FormatDialect::Python => &PythonFormatParser,
        FormatDialect::PythonBrace => &PythonBraceFormatParser,
    }
}

/// Convenience for the committer's heuristic: does `text` parse in
/// `dialect` with at least one real directive?
pub fn looks_like_format(dialect: FormatDialect, text: &str) -> bool {
    parser_for(dialect)
        .parse(text)
        .map(|d| d.directives > 0)
        .unwrap_or(false)
}
