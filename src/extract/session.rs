//! Per-run, per-file scanner state.
//!
//! Everything the original design kept in process-wide mutable globals
//! (current file and line, source encoding, pending comments) lives in an
//! explicit session threaded through the scanner and driver. The keyword and
//! flag tables are built once and borrowed immutably.

use crate::diagnostics::{Category, Diagnostics};
use crate::extract::accumulator::SourceEncoding;
use crate::extract::comments::{CommentFilter, CommentLedger};
use crate::extract::flags::FlagTable;
use crate::extract::keywords::KeywordTable;
use crate::extract::token::SourcePos;
use crate::scanners::ScannerFamily;

/// Run-level options shared by every file scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// `--extract-all`: commit every string literal, bypassing keywords.
    pub extract_all: bool,
    pub comment_filter: CommentFilter,
    pub encoding: SourceEncoding,
    /// `--trigraphs`: enable the C pre-processing substitution stage.
    pub trigraphs: bool,
}

pub struct ScanSession<'a> {
    /// Path as given by the caller, for opening and error reporting.
    pub real_file: String,
    /// Name messages are attributed to; `#line` directives rewrite it.
    pub logical_file: String,
    /// Current logical line, 1-based, maintained by the scanner phases.
    pub line: usize,
    /// Active source encoding; a Python coding comment may switch it.
    pub encoding: SourceEncoding,
    pub family: ScannerFamily,
    pub keywords: &'a KeywordTable,
    pub flags: &'a FlagTable,
    pub options: &'a ScanOptions,
    pub ledger: CommentLedger,
    pub diagnostics: &'a mut Diagnostics,
}

impl<'a> ScanSession<'a> {
    pub fn new(
        real_file: &str,
        logical_file: &str,
        family: ScannerFamily,
        keywords: &'a KeywordTable,
        flags: &'a FlagTable,
        options: &'a ScanOptions,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            real_file: real_file.to_string(),
            logical_file: logical_file.to_string(),
            line: 1,
            encoding: options.encoding,
            family,
            keywords,
            flags,
            options,
            ledger: CommentLedger::new(),
            diagnostics,
        }
    }

    pub fn pos(&self) -> SourcePos {
        SourcePos::new(self.logical_file.clone(), self.line)
    }

    pub fn warn_here(&mut self, category: Category, message: impl Into<String>) {
        let file = self.logical_file.clone();
        let line = self.line;
        self.diagnostics.warn(category, &file, line, message);
    }

    pub fn warn_at(&mut self, category: Category, pos: &SourcePos, message: impl Into<String>) {
        self.diagnostics
            .warn(category, &pos.file, pos.line, message);
    }
}
