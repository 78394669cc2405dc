//! The extraction driver: a recursive-descent consumer of high-level tokens.
//!
//! One call frame per balanced group. The frame remembers whether the last
//! symbol was a configured keyword; an opening delimiter recurses with a
//! fresh arglist parser seeded from that keyword's shapes, commas advance
//! the argument index, and string literals are offered to the enclosing
//! call's parser (or committed directly in `--extract-all` mode).

use anyhow::Result;

use crate::catalog::Catalog;
use crate::extract::arglist::{ArglistParser, CapturedString};
use crate::extract::committer::remember_literal_directly;
use crate::extract::flags::{FlagContext, FlagCursor};
use crate::extract::session::ScanSession;
use crate::extract::token::XgToken;
use crate::scanners::LanguageScanner;

/// Scan one file to completion. The top-level loop restarts after every
/// stray closing delimiter, so unbalanced files never abort the scan.
pub fn extract_file(
    scanner: &mut dyn LanguageScanner,
    session: &mut ScanSession<'_>,
    catalog: &mut Catalog,
) -> Result<()> {
    loop {
        let eof = extract_balanced(
            scanner,
            session,
            catalog,
            FlagContext::null(),
            FlagCursor::null(),
            ArglistParser::inert(),
        )?;
        if eof {
            return Ok(());
        }
    }
}

/// Consume tokens until the current balanced group closes. Returns `true`
/// on end of input, `false` on a closing delimiter.
fn extract_balanced<'a>(
    scanner: &mut dyn LanguageScanner,
    session: &mut ScanSession<'a>,
    catalog: &mut Catalog,
    outer_context: FlagContext,
    mut context_cursor: FlagCursor<'a>,
    mut parser: ArglistParser,
) -> Result<bool> {
    let keywords = session.keywords;
    let flags = session.flags;

    let mut arg = 1usize;
    // KeywordSeen state: the candidate shapes of the last symbol.
    let mut next_keyword: Option<String> = None;
    let mut next_shapes = None;
    let mut next_cursor = FlagCursor::null();
    // Selector text accumulated for the ':' rule (Objective-C style).
    let mut selector = String::new();
    let mut inner_context = context_cursor.advance().inherited_from(outer_context);

    loop {
        match scanner.next_token(session)? {
            XgToken::Symbol(name) => {
                next_shapes = keywords.lookup(&name);
                next_keyword = next_shapes.is_some().then(|| name.clone());
                next_cursor = FlagCursor::over(flags.lookup(&name));
                selector = name;
            }
            XgToken::LParen => {
                let nested = ArglistParser::new(next_keyword.as_deref(), next_shapes);
                if extract_balanced(scanner, session, catalog, inner_context, next_cursor, nested)?
                {
                    parser.done(arg, session, catalog);
                    return Ok(true);
                }
                next_keyword = None;
                next_shapes = None;
                next_cursor = FlagCursor::null();
            }
            XgToken::RParen => {
                parser.done(arg, session, catalog);
                return Ok(false);
            }
            XgToken::Comma => {
                arg += 1;
                inner_context = context_cursor.advance().inherited_from(outer_context);
                next_keyword = None;
                next_shapes = None;
                next_cursor = FlagCursor::null();
            }
            XgToken::Colon => {
                // Selector-call syntax: the flag context of "selector:" takes
                // over before the usual state reset.
                if !selector.is_empty() {
                    selector.push(':');
                    if let Some(list) = flags.lookup(&selector) {
                        next_cursor = FlagCursor::over(Some(list));
                    }
                }
                next_keyword = None;
                next_shapes = None;
            }
            XgToken::String(literal) => {
                if session.options.extract_all {
                    let captured = CapturedString {
                        text: literal.text,
                        pos: literal.pos,
                        escape: literal.escape,
                        comment: literal.comment,
                        flag_context: inner_context,
                    };
                    remember_literal_directly(session, catalog, captured);
                } else {
                    parser.remember_literal(arg, &literal, inner_context);
                }
                next_keyword = None;
                next_shapes = None;
                next_cursor = FlagCursor::null();
                selector.clear();
            }
            XgToken::Other => {
                next_keyword = None;
                next_shapes = None;
                next_cursor = FlagCursor::null();
                selector.clear();
            }
            XgToken::Eof => {
                parser.done(arg, session, catalog);
                return Ok(true);
            }
        }
    }
}
