//! xpo - translatable string extractor
//!
//! xpo scans C/C++ and Python sources for calls to translation keywords
//! (`gettext`, `ngettext`, `_`, ...) and collects their string arguments into
//! a message catalog, written as a PO template or JSON. Comments adjacent to
//! a call, `xgettext:` pragma comments, and format-string flags all travel
//! with the extracted messages.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `scanners`: Per-language lexing pipelines and the language registry
//! - `extract`: The extraction engine driving the scanners
//! - `format`: Format-string dialect recognizers
//! - `catalog`: The message catalog and its PO/JSON serializations
//! - `diagnostics`: Structured warnings collected during a run

pub mod catalog;
pub mod cli;
pub mod diagnostics;
pub mod extract;
pub mod format;
pub mod reporter;
pub mod scanners;
