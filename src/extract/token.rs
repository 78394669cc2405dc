//! High-level token model shared by every language scanner.
//!
//! Each scanner runs its own lexing phase pipeline internally, but what the
//! extraction driver consumes is this small closed token set: a symbol that
//! may be a configured keyword, balance punctuation, a decoded string
//! literal, anything else, or end of input.

use std::rc::Rc;

use serde::Serialize;

/// A source position (logical file name and 1-based line number).
///
/// The file name is the *logical* one: `#line` directives in C rewrite it
/// without touching the real path handed to the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcePos {
    pub file: String,
    pub line: usize,
}

impl SourcePos {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl std::fmt::Display for SourcePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// How a string literal was written in the source.
///
/// Concatenation of adjacent literals keeps the *first* literal's escape
/// style, so a `R"(...)"` segment glued onto a `"..."` head stays `AnsiC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeKind {
    /// Raw literal, no escape processing (C++ raw strings, Python r-strings).
    None,
    /// Backslash escapes in the ANSI C family (`\n`, octal, `\x`).
    AnsiC,
    /// ANSI C escapes plus `\uXXXX` / `\UXXXXXXXX` code-point escapes.
    Unicode,
}

/// A decoded string literal as handed to the extraction driver.
///
/// `text` is canonical UTF-8; all escape interpretation and source-encoding
/// conversion already happened in the scanner's tokenization stage. The
/// comment reference is the ledger snapshot that was adjacent when the
/// literal started.
#[derive(Debug, Clone)]
pub struct LiteralString {
    pub text: String,
    pub pos: SourcePos,
    pub escape: EscapeKind,
    pub comment: Option<Rc<Vec<String>>>,
}

impl LiteralString {
    pub fn new(text: String, pos: SourcePos, escape: EscapeKind) -> Self {
        Self {
            text,
            pos,
            escape,
            comment: None,
        }
    }
}

/// One high-level token.
#[derive(Debug, Clone)]
pub enum XgToken {
    /// Identifier; the driver decides whether it is a configured keyword.
    Symbol(String),
    /// Any opening delimiter that starts a balanced group: `(`, `[`, `{`.
    LParen,
    /// Any closing delimiter: `)`, `]`, `}`.
    RParen,
    Comma,
    /// `:` in selector-call syntax; plain punctuation elsewhere.
    Colon,
    String(LiteralString),
    /// Anything the driver does not care about beyond resetting its state.
    Other,
    /// Terminal; repeated reads keep returning it.
    Eof,
}
