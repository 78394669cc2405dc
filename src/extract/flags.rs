//! Format-string flag contexts.
//!
//! A flag context says, for one argument position, whether the string sitting
//! there is itself a format string of some dialect. Each scanner family
//! exposes up to three dialect slots; `--flag keyword:argnum:dialect-format`
//! declares a slot, `pass-dialect-format` marks it inherited from the
//! enclosing call instead.

use std::collections::HashMap;

use crate::format::FormatDialect;

pub const NSLOTS: usize = 3;

/// Declared format status of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagDecl {
    #[default]
    Undecided,
    Yes,
    No,
    Possible,
    Impossible,
}

/// One slot: the declared value plus whether it is inherited (`pass-`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotFlag {
    pub declared: FlagDecl,
    pub inherited: bool,
}

/// Flag state for one argument position across all dialect slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagContext {
    pub slots: [SlotFlag; NSLOTS],
}

impl FlagContext {
    pub const fn null() -> Self {
        Self {
            slots: [SlotFlag {
                declared: FlagDecl::Undecided,
                inherited: false,
            }; NSLOTS],
        }
    }

    /// Resolve inheritance against the enclosing call's context: every
    /// `pass-` slot takes the outer declared value, everything else keeps
    /// its own.
    pub fn inherited_from(self, outer: FlagContext) -> FlagContext {
        let mut result = self;
        for (slot, outer_slot) in result.slots.iter_mut().zip(outer.slots.iter()) {
            if slot.inherited {
                slot.declared = outer_slot.declared;
                slot.inherited = false;
            }
        }
        result
    }

    pub fn declared(&self, slot: usize) -> FlagDecl {
        self.slots[slot].declared
    }
}

/// Flag contexts for one keyword, ordered by argument number.
#[derive(Debug, Clone, Default)]
pub struct FlagContextList {
    entries: Vec<(usize, FlagContext)>,
}

impl FlagContextList {
    fn entry_mut(&mut self, argnum: usize) -> &mut FlagContext {
        let pos = self.entries.partition_point(|(n, _)| *n < argnum);
        if self.entries.get(pos).map(|(n, _)| *n) != Some(argnum) {
            self.entries.insert(pos, (argnum, FlagContext::null()));
        }
        &mut self.entries[pos].1
    }
}

/// Cursor over a `FlagContextList`, advanced once per argument position.
/// Yields the null context once positions run out, forever on a missing
/// list.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlagCursor<'a> {
    list: Option<&'a FlagContextList>,
    argnum: usize,
    index: usize,
}

impl<'a> FlagCursor<'a> {
    pub fn null() -> Self {
        Self::default()
    }

    pub fn over(list: Option<&'a FlagContextList>) -> Self {
        Self {
            list,
            argnum: 0,
            index: 0,
        }
    }

    /// Context for the next argument position.
    pub fn advance(&mut self) -> FlagContext {
        self.argnum += 1;
        let Some(list) = self.list else {
            return FlagContext::null();
        };
        match list.entries.get(self.index) {
            Some((n, ctx)) if *n == self.argnum => {
                self.index += 1;
                *ctx
            }
            _ => FlagContext::null(),
        }
    }
}

/// Keyword -> flag context list for one scanner family.
#[derive(Debug, Clone, Default)]
pub struct FlagTable {
    map: HashMap<String, FlagContextList>,
}

impl FlagTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, keyword: &str) -> Option<&FlagContextList> {
        self.map.get(keyword)
    }

    /// Declare `keyword`'s argument `argnum` as a format string in `slot`.
    pub fn insert(&mut self, keyword: &str, argnum: usize, slot: usize, flag: SlotFlag) {
        debug_assert!(slot < NSLOTS);
        let ctx = self
            .map
            .entry(keyword.to_string())
            .or_default()
            .entry_mut(argnum);
        ctx.slots[slot] = flag;
    }
}

/// A parsed `--flag` spec: `KEYWORD:ARGNUM:[pass-]DIALECT-format`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    pub keyword: String,
    pub argnum: usize,
    pub dialect: FormatDialect,
    pub pass: bool,
}

/// Errors a `--flag` spec can fail with; all recoverable (the spec is just
/// skipped with a warning).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagSpecError {
    MissingColons,
    BadArgnum,
    UnknownDialect(String),
}

impl std::fmt::Display for FlagSpecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColons => {
                write!(f, "expected KEYWORD:ARGNUM:[pass-]DIALECT-format")
            }
            Self::BadArgnum => write!(f, "argument number must be a positive integer"),
            Self::UnknownDialect(d) => write!(f, "unknown format dialect '{}'", d),
        }
    }
}

/// Parse a `--flag` spec. The keyword part is delimited by the *last* two
/// colons, so keyword names containing colons (Lisp, Tcl) survive.
pub fn parse_flag_spec(spec: &str) -> Result<FlagSpec, FlagSpecError> {
    let last = spec.rfind(':').ok_or(FlagSpecError::MissingColons)?;
    let mid = spec[..last].rfind(':').ok_or(FlagSpecError::MissingColons)?;
    let keyword = &spec[..mid];
    if keyword.is_empty() {
        return Err(FlagSpecError::MissingColons);
    }
    let argnum: usize = spec[mid + 1..last]
        .parse()
        .ok()
        .filter(|n| *n > 0)
        .ok_or(FlagSpecError::BadArgnum)?;

    let mut dialect_name = &spec[last + 1..];
    let pass = if let Some(rest) = dialect_name.strip_prefix("pass-") {
        dialect_name = rest;
        true
    } else {
        false
    };
    let dialect = dialect_name
        .strip_suffix("-format")
        .and_then(FormatDialect::from_name)
        .ok_or_else(|| FlagSpecError::UnknownDialect(dialect_name.to_string()))?;

    Ok(FlagSpec {
        keyword: keyword.to_string(),
        argnum,
        dialect,
        pass,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_flag() {
        let spec = parse_flag_spec("error_at_line:3:c-format").unwrap();
        assert_eq!(spec.keyword, "error_at_line");
        assert_eq!(spec.argnum, 3);
        assert_eq!(spec.dialect, FormatDialect::C);
        assert!(!spec.pass);
    }

    #[test]
    fn parses_pass_flag() {
        let spec = parse_flag_spec("gettext:1:pass-python-format").unwrap();
        assert_eq!(spec.dialect, FormatDialect::Python);
        assert!(spec.pass);
    }

    #[test]
    fn keyword_may_contain_colons() {
        let spec = parse_flag_spec("format:translate:2:python-brace-format").unwrap();
        assert_eq!(spec.keyword, "format:translate");
        assert_eq!(spec.argnum, 2);
        assert_eq!(spec.dialect, FormatDialect::PythonBrace);
    }

    #[test]
    fn rejects_bad_argnum() {
        assert_eq!(
            parse_flag_spec("kw:0:c-format").unwrap_err(),
            FlagSpecError::BadArgnum
        );
        assert_eq!(
            parse_flag_spec("kw:x:c-format").unwrap_err(),
            FlagSpecError::BadArgnum
        );
    }

    #[test]
    fn rejects_unknown_dialect() {
        assert!(matches!(
            parse_flag_spec("kw:1:fortran-format").unwrap_err(),
            FlagSpecError::UnknownDialect(_)
        ));
    }

    #[test]
    fn rejects_missing_colons() {
        assert_eq!(
            parse_flag_spec("c-format").unwrap_err(),
            FlagSpecError::MissingColons
        );
    }

    #[test]
    fn cursor_walks_argument_positions() {
        let mut table = FlagTable::new();
        table.insert(
            "printf",
            1,
            0,
            SlotFlag {
                declared: FlagDecl::Yes,
                inherited: false,
            },
        );
        let list = table.lookup("printf").unwrap();
        let mut cursor = FlagCursor::over(Some(list));
        assert_eq!(cursor.advance().declared(0), FlagDecl::Yes);
        assert_eq!(cursor.advance().declared(0), FlagDecl::Undecided);
        assert_eq!(cursor.advance(), FlagContext::null());
    }

    #[test]
    fn null_cursor_yields_null_forever() {
        let mut cursor = FlagCursor::null();
        for _ in 0..4 {
            assert_eq!(cursor.advance(), FlagContext::null());
        }
    }

    #[test]
    fn inheritance_copies_outer_declared_value() {
        let mut inner = FlagContext::null();
        inner.slots[0] = SlotFlag {
            declared: FlagDecl::Undecided,
            inherited: true,
        };
        let mut outer = FlagContext::null();
        outer.slots[0].declared = FlagDecl::Yes;
        let resolved = inner.inherited_from(outer);
        assert_eq!(resolved.declared(0), FlagDecl::Yes);
        assert!(!resolved.slots[0].inherited);
    }
}
