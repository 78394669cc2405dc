//! Committing resolved calls into the catalog.
//!
//! `remember_a_message` deduplicates by `(context, id)`, merges comments,
//! and settles the per-dialect format classification from three inputs:
//! the flag context the argument sat in, any `xgettext:` pragma comment,
//! and a heuristic re-parse of the string itself.

use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::Catalog;
use crate::diagnostics::Category;
use crate::extract::arglist::CapturedString;
use crate::extract::flags::FlagDecl;
use crate::extract::session::ScanSession;
use crate::format::{self, FormatDialect};

// Matches a pragma line like "xgettext: no-c-format, fuzzy".
static PRAGMA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*xgettext:\s*(.*)$").unwrap());

// The range item carries a space, so it is cut out of the pragma body
// before the remaining items are split.
static RANGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"range:\s*(\d+)\s*\.\.\s*(\d+)").unwrap());

/// Effects of the `xgettext:` pragma lines attached to one message.
#[derive(Debug, Default)]
struct Pragma {
    format: Vec<(FormatDialect, FlagDecl)>,
    fuzzy: bool,
    wrap: Option<bool>,
    range: Option<(u32, u32)>,
}

fn parse_pragma_items(text: &str, pragma: &mut Pragma) {
    for item in text.split([',', ' ']).filter(|s| !s.is_empty()) {
        match item {
            "fuzzy" => pragma.fuzzy = true,
            "wrap" => pragma.wrap = Some(true),
            "no-wrap" => pragma.wrap = Some(false),
            _ => {
                let Some(body) = item.strip_suffix("-format") else {
                    continue;
                };
                let (decl, name) = if let Some(rest) = body.strip_prefix("no-") {
                    (FlagDecl::No, rest)
                } else if let Some(rest) = body.strip_prefix("possible-") {
                    (FlagDecl::Possible, rest)
                } else if let Some(rest) = body.strip_prefix("impossible-") {
                    (FlagDecl::Impossible, rest)
                } else {
                    (FlagDecl::Yes, body)
                };
                if let Some(dialect) = FormatDialect::from_name(name) {
                    pragma.format.push((dialect, decl));
                }
            }
        }
    }
}

/// Split comment lines into translator comments and pragma effects.
fn sift_comments(lines: &[String]) -> (Vec<String>, Pragma) {
    let mut kept = Vec::new();
    let mut pragma = Pragma::default();
    for line in lines {
        if let Some(caps) = PRAGMA_REGEX.captures(line) {
            let mut body = caps[1].trim().to_string();
            if let Some(range_caps) = RANGE_REGEX.captures(&body) {
                if let (Ok(min), Ok(max)) = (range_caps[1].parse(), range_caps[2].parse()) {
                    pragma.range = Some((min, max));
                }
                let span = range_caps.get(0).unwrap().range();
                body.replace_range(span, "");
            }
            parse_pragma_items(&body, &mut pragma);
        } else {
            kept.push(line.clone());
        }
    }
    (kept, pragma)
}

/// Later information refines earlier: explicit declarations beat the
/// heuristic `Possible`, which beats `Undecided`; conflicting explicit
/// declarations keep the first.
fn merge_decl(old: FlagDecl, new: FlagDecl) -> FlagDecl {
    use FlagDecl::*;
    match (old, new) {
        (Undecided, n) => n,
        (o, Undecided) => o,
        (Possible, n @ (Yes | No | Impossible)) => n,
        (o, _) => o,
    }
}

/// Classification of one string in one dialect, before merging.
fn classify(decl: FlagDecl, dialect: FormatDialect, text: &str) -> FlagDecl {
    match decl {
        FlagDecl::Undecided | FlagDecl::Possible => {
            // Heuristic: only a string with at least one real directive is
            // worth flagging; a stray '%' alone is not.
            if format::looks_like_format(dialect, text) {
                FlagDecl::Possible
            } else {
                decl
            }
        }
        explicit => explicit,
    }
}

/// Commit one message. Returns its catalog handle, or `None` when the
/// message is not extractable (the empty msgid is reserved for the header).
pub fn remember_a_message(
    session: &mut ScanSession<'_>,
    catalog: &mut Catalog,
    context: Option<String>,
    captured: CapturedString,
) -> Option<usize> {
    if captured.text.is_empty() {
        session.warn_at(
            Category::EmptyMsgid,
            &captured.pos,
            "empty msgid; it is reserved by GNU gettext for the header entry",
        );
        return None;
    }

    let (handle, _existed) = catalog.lookup_or_insert(context, captured.text.clone());

    // Comments first: the pragma may force the format classification.
    let comment_lines: Vec<String> = captured
        .comment
        .as_ref()
        .map(|rc| rc.as_ref().clone())
        .unwrap_or_default();
    let (translator_comments, pragma) = sift_comments(&comment_lines);
    let translator_comments = session.options.comment_filter.apply(&translator_comments);

    {
        let message = catalog.get_mut(handle);
        for (slot, dialect) in session.family.dialect_slots().iter().enumerate() {
            let Some(dialect) = dialect else { continue };
            let decl = classify(
                captured.flag_context.declared(slot),
                *dialect,
                &captured.text,
            );
            let idx = dialect.index();
            message.format[idx] = merge_decl(message.format[idx], decl);
        }
        for (dialect, decl) in &pragma.format {
            message.format[dialect.index()] = *decl;
        }
        if pragma.fuzzy {
            message.is_fuzzy = true;
        }
        if pragma.wrap.is_some() {
            message.wrap = pragma.wrap;
        }
        if pragma.range.is_some() {
            message.range = pragma.range;
        }

        // Append translator comments unless the run is an exact repeat of
        // the tail already stored (the same literal re-extracted with the
        // same comment).
        if !translator_comments.is_empty() {
            let tail_start = message.comments.len().saturating_sub(translator_comments.len());
            if message.comments[tail_start..] != translator_comments[..] {
                message.comments.extend(translator_comments);
            }
        }

        message.positions.push(captured.pos);
    }

    session.ledger.reset();
    Some(handle)
}

/// Attach a plural form; the first one wins, later candidates are dropped.
pub fn remember_a_message_plural(
    session: &mut ScanSession<'_>,
    catalog: &mut Catalog,
    handle: usize,
    plural: CapturedString,
) {
    let family = session.family;
    let message = catalog.get_mut(handle);
    if message.plural_id.is_some() {
        return;
    }
    for (slot, dialect) in family.dialect_slots().iter().enumerate() {
        let Some(dialect) = dialect else { continue };
        let decl = classify(plural.flag_context.declared(slot), *dialect, &plural.text);
        let idx = dialect.index();
        message.format[idx] = merge_decl(message.format[idx], decl);
    }
    message.plural_id = Some(plural.text);
}

/// Commit one bare string literal (`--extract-all` mode), bypassing the
/// arglist parser.
pub fn remember_literal_directly(
    session: &mut ScanSession<'_>,
    catalog: &mut Catalog,
    captured: CapturedString,
) {
    let _ = remember_a_message(session, catalog, None, captured);
}
