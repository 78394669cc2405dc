//! Keyword call-shape table.
//!
//! A keyword spec like `npgettext:1c,2,3` says which argument positions of a
//! call carry the context, singular and plural strings. One keyword can hold
//! several alternative shapes (`ngettext:1,2` next to `ngettext:1`); the
//! arglist parser tries them all and resolves on call completion.

use std::collections::HashMap;

/// One accepted calling convention for a keyword.
///
/// `None` in an argnum slot means the position is not requested at all,
/// which is distinct from "requested and already filled" during parsing
/// (see `SlotState` in the arglist module).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallShape {
    /// Argument position of the msgid.
    pub argnum1: Option<usize>,
    /// Argument position of the msgid_plural.
    pub argnum2: Option<usize>,
    /// Argument position of the msgctxt.
    pub argnumc: Option<usize>,
    /// The argnum1 string embeds a `"ctxt|msgid"` GNOME-glib context.
    pub glib_context1: bool,
    /// Same for the argnum2 string.
    pub glib_context2: bool,
    /// Exact total argument count required, if constrained.
    pub argtotal: Option<usize>,
    /// Auto-extracted comments attached to every message from this shape.
    pub extra_comments: Vec<String>,
}

impl CallShape {
    /// The shape a bare keyword (or a malformed spec) degrades to:
    /// argument 1 is the msgid, nothing else.
    pub fn default_shape() -> Self {
        Self {
            argnum1: Some(1),
            argnum2: None,
            argnumc: None,
            glib_context1: false,
            glib_context2: false,
            argtotal: None,
            extra_comments: Vec::new(),
        }
    }

    /// Shape equality for insertion purposes ignores the comment list.
    fn same_convention(&self, other: &Self) -> bool {
        self.argnum1 == other.argnum1
            && self.argnum2 == other.argnum2
            && self.argnumc == other.argnumc
            && self.glib_context1 == other.glib_context1
            && self.glib_context2 == other.glib_context2
            && self.argtotal == other.argtotal
    }
}

/// All accepted shapes for one keyword, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallShapes {
    pub alternatives: Vec<CallShape>,
}

/// Keyword name -> call shapes, built once per run and immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct KeywordTable {
    map: HashMap<String, CallShapes>,
}

impl KeywordTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, name: &str) -> Option<&CallShapes> {
        self.map.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Insert one shape for `keyword`. If an equal convention is already
    /// present its auto-comment list is replaced, not duplicated; otherwise
    /// the shape is appended as a new alternative.
    pub fn insert(&mut self, keyword: &str, shape: CallShape) {
        let shapes = self.map.entry(keyword.to_string()).or_default();
        if let Some(existing) = shapes
            .alternatives
            .iter_mut()
            .find(|a| a.same_convention(&shape))
        {
            existing.extra_comments = shape.extra_comments;
        } else {
            shapes.alternatives.push(shape);
        }
    }

    /// Parse and insert a full `--keyword` spec. Returns `false` when the
    /// spec was malformed and degraded to the default shape, so the caller
    /// can warn.
    pub fn insert_spec(&mut self, spec: &str) -> bool {
        let (name, shape, wellformed) = split_keywordspec(spec);
        if !name.is_empty() {
            self.insert(name, shape);
        }
        wellformed
    }
}

/// Parse a keyword spec `keyword[:part[,part...]]` where each part is a
/// number (optionally suffixed `c` = context, `g` = glib embedded context,
/// `t` = total count) or a `"quoted"` auto-comment.
///
/// Scans from the right. A second positional number displaces the previous
/// argnum1 to argnum2; a third, a repeated `c`/`t`, or any non-conforming
/// character aborts and the whole spec degrades to the default shape with
/// the entire string as the keyword name. The third return value reports
/// whether the spec parsed cleanly.
pub fn split_keywordspec(spec: &str) -> (&str, CallShape, bool) {
    let bytes = spec.as_bytes();
    let mut p = bytes.len();

    let mut argnum1: Option<usize> = None;
    let mut argnum2: Option<usize> = None;
    let mut argnumc: Option<usize> = None;
    let mut glib1 = false;
    let mut glib2 = false;
    let mut argtotal: Option<usize> = None;
    let mut xcomments: Vec<String> = Vec::new();

    let degraded = (spec, CallShape::default_shape(), spec.find(':').is_none());

    while p > 0 {
        let last = bytes[p - 1];
        if last.is_ascii_digit()
            || ((last == b'c' || last == b'g' || last == b't')
                && p >= 2
                && bytes[p - 2].is_ascii_digit())
        {
            let contextp = last == b'c';
            let glibp = last == b'g';
            let totalp = last == b't';
            let digits_end = if contextp || glibp || totalp { p - 1 } else { p };
            let mut digits_start = digits_end;
            while digits_start > 0 && bytes[digits_start - 1].is_ascii_digit() {
                digits_start -= 1;
            }
            if digits_start == 0
                || (bytes[digits_start - 1] != b',' && bytes[digits_start - 1] != b':')
            {
                return degraded;
            }
            let Ok(arg) = spec[digits_start..digits_end].parse::<usize>() else {
                return degraded;
            };
            if arg == 0 {
                return degraded;
            }
            if contextp {
                if argnumc.is_some() {
                    return degraded;
                }
                argnumc = Some(arg);
            } else if totalp {
                if argtotal.is_some() {
                    return degraded;
                }
                argtotal = Some(arg);
            } else {
                if argnum2.is_some() {
                    return degraded;
                }
                argnum2 = argnum1;
                glib2 = glib1;
                argnum1 = Some(arg);
                glib1 = glibp;
            }
            p = digits_start - 1;
        } else if last == b'"' {
            let Some(open) = spec[..p - 1].rfind('"') else {
                return degraded;
            };
            if open == 0 || (bytes[open - 1] != b',' && bytes[open - 1] != b':') {
                return degraded;
            }
            xcomments.push(spec[open + 1..p - 1].to_string());
            p = open - 1;
        } else {
            return degraded;
        }

        if bytes[p] == b':' {
            // Parts were collected right-to-left; restore textual order.
            xcomments.reverse();
            let shape = CallShape {
                argnum1: argnum1.or(Some(1)),
                argnum2,
                argnumc,
                glib_context1: glib1,
                glib_context2: glib2,
                argtotal,
                extra_comments: xcomments,
            };
            return (&spec[..p], shape, true);
        }
        // bytes[p] == b',': continue with the part to the left.
    }

    degraded
}
