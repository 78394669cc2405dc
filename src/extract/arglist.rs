//! Per-call argument-list matching.
//!
//! When the driver sees `keyword(`, it opens an `ArglistParser` holding one
//! `PartialCall` per call-shape alternative of that keyword. String
//! arguments fill the slots whose position they hit; on the closing
//! delimiter the complete alternatives compete and the winner is committed.

use std::rc::Rc;

use crate::catalog::Catalog;
use crate::diagnostics::Category;
use crate::extract::committer::{remember_a_message, remember_a_message_plural};
use crate::extract::flags::FlagContext;
use crate::extract::keywords::CallShapes;
use crate::extract::session::ScanSession;
use crate::extract::token::{EscapeKind, LiteralString, SourcePos};

/// One argument slot of a partial call.
///
/// `Unrequested` (the shape never asked for this slot) and `Filled` both
/// mean "nothing left to wait for", but the completion check needs them to
/// stay distinct from a still-`Pending` position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Unrequested,
    Pending(usize),
    Filled,
}

impl SlotState {
    fn from_argnum(argnum: Option<usize>) -> Self {
        match argnum {
            Some(n) => Self::Pending(n),
            None => Self::Unrequested,
        }
    }

    fn matches(self, argnum: usize) -> bool {
        self == Self::Pending(argnum)
    }

    /// No more chances once the current argument index has passed the
    /// requested position.
    fn decided_at(self, argnum: usize) -> bool {
        match self {
            Self::Pending(n) => n <= argnum,
            _ => true,
        }
    }

    fn is_pending(self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

/// A string captured into a slot, with everything the committer needs.
#[derive(Debug, Clone)]
pub struct CapturedString {
    pub text: String,
    pub pos: SourcePos,
    pub escape: EscapeKind,
    pub comment: Option<Rc<Vec<String>>>,
    pub flag_context: FlagContext,
}

impl CapturedString {
    fn from_literal(literal: &LiteralString, flag_context: FlagContext) -> Self {
        Self {
            text: literal.text.clone(),
            pos: literal.pos.clone(),
            escape: literal.escape,
            comment: literal.comment.clone(),
            flag_context,
        }
    }
}

/// Progress of one call-shape alternative against the open call.
#[derive(Debug, Clone)]
pub struct PartialCall {
    argnumc: SlotState,
    argnum1: SlotState,
    argnum2: SlotState,
    glib_context1: bool,
    glib_context2: bool,
    argtotal: Option<usize>,
    msgctxt: Option<CapturedString>,
    msgid: Option<CapturedString>,
    msgid_plural: Option<CapturedString>,
    xcomments: Vec<String>,
}

impl PartialCall {
    fn has_pending(&self) -> bool {
        self.argnumc.is_pending() || self.argnum1.is_pending() || self.argnum2.is_pending()
    }

    fn complete(&self, argnum: usize) -> bool {
        !self.has_pending() && self.argtotal.is_none_or(|total| total == argnum)
    }

    fn decided(&self, argnum: usize) -> bool {
        (self.argnumc.decided_at(argnum)
            && self.argnum1.decided_at(argnum)
            && self.argnum2.decided_at(argnum))
            || self.argtotal.is_some_and(|total| total < argnum)
    }
}

/// The per-call state machine. With no recognized keyword it has zero
/// alternatives and silently swallows whatever it is fed.
#[derive(Debug)]
pub struct ArglistParser {
    keyword: Option<String>,
    alternatives: Vec<PartialCall>,
}

impl ArglistParser {
    pub fn new(keyword: Option<&str>, shapes: Option<&CallShapes>) -> Self {
        let alternatives = shapes
            .map(|s| {
                s.alternatives
                    .iter()
                    .map(|shape| PartialCall {
                        argnumc: SlotState::from_argnum(shape.argnumc),
                        argnum1: SlotState::from_argnum(shape.argnum1),
                        argnum2: SlotState::from_argnum(shape.argnum2),
                        glib_context1: shape.glib_context1,
                        glib_context2: shape.glib_context2,
                        argtotal: shape.argtotal,
                        msgctxt: None,
                        msgid: None,
                        msgid_plural: None,
                        xcomments: shape.extra_comments.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            keyword: keyword.map(str::to_string),
            alternatives,
        }
    }

    pub fn inert() -> Self {
        Self::new(None, None)
    }

    /// Offer a literal at argument position `argnum` to every alternative.
    /// A literal no alternative claims is dropped.
    pub fn remember_literal(
        &mut self,
        argnum: usize,
        literal: &LiteralString,
        flag_context: FlagContext,
    ) {
        for alt in &mut self.alternatives {
            if alt.argnumc.matches(argnum) {
                alt.msgctxt = Some(CapturedString::from_literal(literal, flag_context));
                alt.argnumc = SlotState::Filled;
            }
            if alt.argnum1.matches(argnum) {
                alt.msgid = Some(CapturedString::from_literal(literal, flag_context));
                alt.argnum1 = SlotState::Filled;
            }
            if alt.argnum2.matches(argnum) {
                alt.msgid_plural = Some(CapturedString::from_literal(literal, flag_context));
                alt.argnum2 = SlotState::Filled;
            }
        }
    }

    /// True once no alternative can change its outcome anymore, i.e. every
    /// remaining slot position has been passed or the argument budget is
    /// exhausted.
    pub fn decided(&self, argnum: usize) -> bool {
        self.alternatives.iter().all(|alt| alt.decided(argnum))
    }

    /// Closing delimiter seen at argument position `argnum`: resolve the
    /// best complete alternative and commit it.
    pub fn done(mut self, argnum: usize, session: &mut ScanSession<'_>, catalog: &mut Catalog) {
        if self.alternatives.is_empty() {
            return;
        }

        let mut best: Option<usize> = None;
        let mut ambiguous = false;
        for tier in 0..3 {
            for (i, alt) in self.alternatives.iter().enumerate() {
                if !alt.complete(argnum) {
                    continue;
                }
                let eligible = match tier {
                    0 => alt.msgctxt.is_some() && alt.msgid.is_some() && alt.msgid_plural.is_some(),
                    1 => {
                        alt.msgid.is_some()
                            && (alt.msgctxt.is_some() || alt.msgid_plural.is_some())
                    }
                    _ => alt.msgid.is_some(),
                };
                if eligible {
                    if best.is_some() {
                        ambiguous = true;
                    } else {
                        best = Some(i);
                    }
                }
            }
            if best.is_some() {
                break;
            }
        }

        let Some(best) = best else { return };
        let alt = self.alternatives.swap_remove(best);
        let keyword = self.keyword.as_deref().unwrap_or("");

        if ambiguous {
            let pos = alt
                .msgid
                .as_ref()
                .map(|m| m.pos.clone())
                .unwrap_or_else(|| session.pos());
            session.warn_at(
                Category::AmbiguousArguments,
                &pos,
                format!("ambiguous argument specification for keyword '{}'", keyword),
            );
        }

        let Some(mut msgid) = alt.msgid else { return };
        let mut context = alt.msgctxt.map(|c| c.text);
        let mut plural = alt.msgid_plural;

        // GNOME glib style: the context rides inside the string as
        // "ctxt|msgid". An explicit context argument wins over it.
        let mut glib_context: Option<String> = None;
        if alt.glib_context1 {
            match split_glib_context(&msgid.text) {
                Some((ctx, rest)) => {
                    glib_context = Some(ctx.to_string());
                    msgid.text = rest.to_string();
                }
                None => session.warn_at(
                    Category::MissingContextSeparator,
                    &msgid.pos,
                    format!("missing context for keyword '{}'", keyword),
                ),
            }
        }
        if alt.glib_context2
            && let Some(p) = plural.as_mut()
        {
            match split_glib_context(&p.text) {
                Some((ctx, rest)) => {
                    if alt.glib_context1
                        && glib_context.as_deref().is_some_and(|g| g != ctx)
                    {
                        session.warn_at(
                            Category::PluralContextMismatch,
                            &p.pos,
                            format!(
                                "context mismatch between singular and plural form for keyword '{}'",
                                keyword
                            ),
                        );
                    }
                    p.text = rest.to_string();
                }
                None => session.warn_at(
                    Category::MissingContextSeparator,
                    &p.pos,
                    format!("missing context for keyword '{}'", keyword),
                ),
            }
        }
        if context.is_none() {
            context = glib_context;
        }

        let Some(handle) = remember_a_message(session, catalog, context, msgid) else {
            return;
        };
        if let Some(plural) = plural {
            remember_a_message_plural(session, catalog, handle, plural);
        }

        let message = catalog.get_mut(handle);
        for xcomment in alt.xcomments {
            if !message.comments.iter().any(|c| *c == xcomment) {
                message.comments.push(xcomment);
            }
        }
    }
}

fn split_glib_context(text: &str) -> Option<(&str, &str)> {
    text.split_once('|')
}
