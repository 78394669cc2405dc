//! The message catalog: every extracted message, in discovery order.
//!
//! The committer deduplicates by `(context, id)`; positions and comments of
//! repeated extractions merge into the existing entry. Sorting is a concern
//! of downstream tools, not of this store.

pub mod json;
pub mod po;

use std::collections::HashMap;

use crate::extract::token::SourcePos;
use crate::format::{FormatDialect, NDIALECTS};
use crate::extract::flags::FlagDecl;

/// One extracted message.
#[derive(Debug, Clone)]
pub struct Message {
    pub context: Option<String>,
    pub id: String,
    pub plural_id: Option<String>,
    pub positions: Vec<SourcePos>,
    pub comments: Vec<String>,
    /// Per-dialect classification, indexed by `FormatDialect::index()`.
    pub format: [FlagDecl; NDIALECTS],
    pub is_fuzzy: bool,
    /// `Some(false)` after an `xgettext: no-wrap` pragma.
    pub wrap: Option<bool>,
    /// Numeric argument range from an `xgettext: range:` pragma.
    pub range: Option<(u32, u32)>,
}

impl Message {
    fn new(context: Option<String>, id: String) -> Self {
        Self {
            context,
            id,
            plural_id: None,
            positions: Vec::new(),
            comments: Vec::new(),
            format: [FlagDecl::Undecided; NDIALECTS],
            is_fuzzy: false,
            wrap: None,
            range: None,
        }
    }

    /// PO flag-comment entries for this message (`c-format`, `no-wrap`, ...),
    /// in a fixed order.
    pub fn flag_names(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if self.is_fuzzy {
            flags.push("fuzzy".to_string());
        }
        for dialect in FormatDialect::ALL {
            match self.format[dialect.index()] {
                FlagDecl::Yes | FlagDecl::Possible => {
                    flags.push(format!("{}-format", dialect.name()));
                }
                FlagDecl::No => flags.push(format!("no-{}-format", dialect.name())),
                FlagDecl::Undecided | FlagDecl::Impossible => {}
            }
        }
        if self.wrap == Some(false) {
            flags.push("no-wrap".to_string());
        }
        if let Some((min, max)) = self.range {
            flags.push(format!("range: {}..{}", min, max));
        }
        flags
    }
}

/// Append-only message store with `(context, id)` lookup.
#[derive(Debug, Default)]
pub struct Catalog {
    messages: Vec<Message>,
    index: HashMap<(Option<String>, String), usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the message for `(context, id)` or append a fresh one. Returns
    /// its handle and whether it already existed.
    pub fn lookup_or_insert(&mut self, context: Option<String>, id: String) -> (usize, bool) {
        let key = (context.clone(), id.clone());
        if let Some(&idx) = self.index.get(&key) {
            return (idx, true);
        }
        let idx = self.messages.len();
        self.messages.push(Message::new(context, id));
        self.index.insert(key, idx);
        (idx, false)
    }

    pub fn get(&self, idx: usize) -> &Message {
        &self.messages[idx]
    }

    pub fn get_mut(&mut self, idx: usize) -> &mut Message {
        &mut self.messages[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
