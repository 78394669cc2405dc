//! Comment ledger: source comments eligible to attach to the next message.
//!
//! Scanners feed every stripped comment line in here together with the line
//! it ended on; the tokenizer records the line of every non-comment token.
//! A string literal picks up the buffered comments only if no non-comment
//! line intervened since the last comment line. The ledger always captures
//! text because `xgettext:` pragma comments take effect regardless of
//! `--add-comments`; the filter is applied when translator comments are
//! committed.

use std::rc::Rc;

/// Which comments survive into the output (`--add-comments`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CommentFilter {
    /// No `--add-comments`: pragmas only, no translator comments.
    #[default]
    None,
    /// `--add-comments` without a tag: keep every adjacent comment.
    All,
    /// `--add-comments=TAG`: keep the run starting at the first line that
    /// begins with TAG.
    Tag(String),
}

impl CommentFilter {
    /// The translator comments that pass this filter, in order.
    pub fn apply(&self, lines: &[String]) -> Vec<String> {
        match self {
            CommentFilter::None => Vec::new(),
            CommentFilter::All => lines.to_vec(),
            CommentFilter::Tag(tag) => match lines.iter().position(|l| l.starts_with(tag.as_str()))
            {
                Some(start) => lines[start..].to_vec(),
                None => Vec::new(),
            },
        }
    }
}

#[derive(Debug, Default)]
pub struct CommentLedger {
    lines: Option<Rc<Vec<String>>>,
    pub last_comment_line: usize,
    pub last_non_comment_line: usize,
}

impl CommentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one comment line, trimmed of leading/trailing spaces and tabs,
    /// tagged with the line the comment ended on.
    pub fn add(&mut self, text: &str, end_line: usize) {
        self.last_comment_line = end_line;
        let trimmed = text.trim_matches([' ', '\t']);
        match self.lines.as_mut() {
            Some(rc) => Rc::make_mut(rc).push(trimmed.to_string()),
            None => self.lines = Some(Rc::new(vec![trimmed.to_string()])),
        }
    }

    /// Record that a non-comment token appeared on `line`.
    pub fn note_token(&mut self, line: usize) {
        self.last_non_comment_line = line;
    }

    /// The comments currently attachable, shared by reference.
    pub fn current(&self) -> Option<Rc<Vec<String>>> {
        self.lines.as_ref().map(Rc::clone)
    }

    /// True if a non-comment line broke adjacency since the last comment.
    /// A comment ending on line N still covers tokens on line N+1, so only
    /// a token beyond that detaches it.
    pub fn is_stale(&self) -> bool {
        self.last_non_comment_line > self.last_comment_line + 1
    }

    /// Drop buffered comments; the adjacency counters survive.
    pub fn reset(&mut self) {
        self.lines = None;
    }
}
