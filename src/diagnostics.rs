//! Structured diagnostics keyed by source position.
//!
//! Everything recoverable the engine encounters lands here as an `Issue`;
//! scanning never stops for them. Fatal conditions (undecodable source
//! bytes) travel as `anyhow::Error` instead and abort the run.

use std::{cmp::Ordering, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    UnterminatedLiteral,
    InvalidEscape,
    InvalidCodePoint,
    MalformedKeywordSpec,
    MalformedFlagSpec,
    AmbiguousArguments,
    MissingContextSeparator,
    PluralContextMismatch,
    EmptyMsgid,
    UnknownEncoding,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::UnterminatedLiteral => write!(f, "unterminated-literal"),
            Category::InvalidEscape => write!(f, "invalid-escape"),
            Category::InvalidCodePoint => write!(f, "invalid-code-point"),
            Category::MalformedKeywordSpec => write!(f, "malformed-keyword-spec"),
            Category::MalformedFlagSpec => write!(f, "malformed-flag-spec"),
            Category::AmbiguousArguments => write!(f, "ambiguous-arguments"),
            Category::MissingContextSeparator => write!(f, "missing-context-separator"),
            Category::PluralContextMismatch => write!(f, "plural-context-mismatch"),
            Category::EmptyMsgid => write!(f, "empty-msgid"),
            Category::UnknownEncoding => write!(f, "unknown-encoding"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub file: Option<String>,
    pub line: Option<usize>,
    pub message: String,
    pub severity: Severity,
    pub category: Category,
}

impl Issue {
    pub fn warning(
        category: Category,
        file: impl Into<String>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: Some(file.into()),
            line: Some(line),
            message: message.into(),
            severity: Severity::Warning,
            category,
        }
    }

    /// Warning with no source position (malformed CLI specs).
    pub fn option_warning(category: Category, message: impl Into<String>) -> Self {
        Self {
            file: None,
            line: None,
            message: message.into(),
            severity: Severity::Warning,
            category,
        }
    }
}

impl Ord for Issue {
    fn cmp(&self, other: &Self) -> Ordering {
        // Sort by file (None first: option problems precede file problems),
        // then line, then message for deterministic output.
        match (&self.file, &other.file) {
            (Some(a), Some(b)) => a
                .cmp(b)
                .then_with(|| self.line.cmp(&other.line))
                .then_with(|| self.message.cmp(&other.message)),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => self
                .category
                .cmp(&other.category)
                .then_with(|| self.message.cmp(&other.message)),
        }
    }
}

impl PartialOrd for Issue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Run-wide diagnostics sink.
#[derive(Debug, Default)]
pub struct Diagnostics {
    issues: Vec<Issue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn warn(
        &mut self,
        category: Category,
        file: &str,
        line: usize,
        message: impl Into<String>,
    ) {
        self.push(Issue::warning(category, file, line, message));
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}
