//! Language scanners and their registry.
//!
//! Every language implements `LanguageScanner` as its own chain of lexing
//! phases ending in the shared high-level token set the driver consumes.
//! The registry maps language names and file extensions to scanner
//! constructors, default keywords, and built-in format flags.

pub mod c;
pub mod python;
pub mod stream;

use std::io::Read;

use anyhow::Result;

use crate::extract::flags::NSLOTS;
use crate::extract::session::{ScanOptions, ScanSession};
use crate::extract::token::XgToken;
use crate::format::FormatDialect;

/// One scanner: a lexing pipeline producing high-level tokens.
pub trait LanguageScanner {
    /// Produce the next token. Recoverable lexical problems are reported to
    /// the session's diagnostics and a best-effort token is returned; `Err`
    /// is reserved for fatal conditions (I/O, undecodable source bytes).
    fn next_token(&mut self, session: &mut ScanSession<'_>) -> Result<XgToken>;
}

/// Scanner families share format-dialect slots: a flag context carries up to
/// `NSLOTS` slots whose meaning depends on the family scanning the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScannerFamily {
    C,
    Python,
}

impl ScannerFamily {
    pub const ALL: [ScannerFamily; 2] = [Self::C, Self::Python];

    /// The dialects this family's flag slots refer to, by slot index.
    pub fn dialect_slots(self) -> [Option<FormatDialect>; NSLOTS] {
        match self {
            Self::C => [Some(FormatDialect::C), None, None],
            Self::Python => [
                Some(FormatDialect::Python),
                Some(FormatDialect::PythonBrace),
                None,
            ],
        }
    }

    /// Slot index of `dialect` within this family, if the family knows it.
    pub fn slot_of(self, dialect: FormatDialect) -> Option<usize> {
        self.dialect_slots()
            .iter()
            .position(|d| *d == Some(dialect))
    }
}

/// Registry entry for one supported language.
pub struct LanguageEntry {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
    pub family: ScannerFamily,
    /// Keyword specs installed unless the user suppressed defaults.
    pub default_keywords: &'static [&'static str],
    /// Built-in `--flag` specs for the standard library of the language.
    pub default_flags: &'static [&'static str],
}

impl LanguageEntry {
    pub fn scanner(&self, source: Box<dyn Read>, options: &ScanOptions) -> Box<dyn LanguageScanner> {
        match self.family {
            ScannerFamily::C => Box::new(c::CScanner::new(source, options.trigraphs)),
            ScannerFamily::Python => Box::new(python::PythonScanner::new(source)),
        }
    }
}

static LANGUAGES: &[LanguageEntry] = &[
    LanguageEntry {
        name: "c",
        extensions: &[
            "c", "h", "cc", "cpp", "cxx", "c++", "hh", "hpp", "hxx", "inl",
        ],
        family: ScannerFamily::C,
        default_keywords: &[
            "gettext:1",
            "dgettext:2",
            "dcgettext:2",
            "ngettext:1,2",
            "dngettext:2,3",
            "dcngettext:2,3",
            "pgettext:1c,2",
            "dpgettext:2c,3",
            "dcpgettext:2c,3",
            "npgettext:1c,2,3",
            "dnpgettext:2c,3,4",
            "dcnpgettext:2c,3,4",
            "gettext_noop:1",
        ],
        default_flags: &[
            "gettext:1:pass-c-format",
            "dgettext:2:pass-c-format",
            "dcgettext:2:pass-c-format",
            "ngettext:1:pass-c-format",
            "ngettext:2:pass-c-format",
            "dngettext:2:pass-c-format",
            "dngettext:3:pass-c-format",
            "gettext_noop:1:pass-c-format",
            "printf:1:c-format",
            "fprintf:2:c-format",
            "sprintf:2:c-format",
            "snprintf:3:c-format",
            "asprintf:2:c-format",
            "error:3:c-format",
            "error_at_line:5:c-format",
        ],
    },
    LanguageEntry {
        name: "python",
        extensions: &["py", "pyi"],
        family: ScannerFamily::Python,
        default_keywords: &[
            "gettext:1",
            "ugettext:1",
            "dgettext:2",
            "ngettext:1,2",
            "ungettext:1,2",
            "dngettext:2,3",
            "pgettext:1c,2",
            "npgettext:1c,2,3",
            "_:1",
        ],
        default_flags: &[
            "gettext:1:pass-python-format",
            "ugettext:1:pass-python-format",
            "ngettext:1:pass-python-format",
            "ngettext:2:pass-python-format",
            "ungettext:1:pass-python-format",
            "ungettext:2:pass-python-format",
            "_:1:pass-python-format",
        ],
    },
];

pub fn all_languages() -> &'static [LanguageEntry] {
    LANGUAGES
}

pub fn by_name(name: &str) -> Option<&'static LanguageEntry> {
    let wanted = name.to_ascii_lowercase();
    LANGUAGES.iter().find(|l| l.name == wanted)
}

pub fn by_extension(extension: &str) -> Option<&'static LanguageEntry> {
    let wanted = extension.to_ascii_lowercase();
    LANGUAGES
        .iter()
        .find(|l| l.extensions.iter().any(|e| *e == wanted))
}
