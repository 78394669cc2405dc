//! C/C++ scanner: the richest instantiation of the lexing phase pipeline.
//!
//! Phases, innermost first:
//! 1. line-ending normalization (CR, LF, CRLF -> `\n`), line counting
//! 2. continuation elision (backslash-newline deleted)
//! 3. optional trigraph substitution (`--trigraphs`)
//! 4. comment stripping, feeding the comment ledger
//! 5. tokenization with escape decoding through the string accumulator
//! 6. preprocessor directives: `#line` rewrites the logical position, every
//!    other directive is discarded; both reset the comment ledger
//! 7. implicit concatenation of adjacent string literals
//!
//! String literal contents are read below the comment-stripping phase, so
//! `/*` inside a string never opens a comment.

use std::io::Read;

use anyhow::{Result, anyhow};

use crate::diagnostics::Category;
use crate::extract::accumulator::StringAccumulator;
use crate::extract::session::ScanSession;
use crate::extract::token::{EscapeKind, LiteralString, SourcePos, XgToken};
use crate::scanners::stream::ByteStream;
use crate::scanners::LanguageScanner;

/// Primitive token of the C pipeline, before the high-level mapping.
#[derive(Debug)]
enum CToken {
    Name(String),
    String(LiteralString),
    Punct(u8),
    Other,
    Eof,
}

pub struct CScanner {
    stream: ByteStream,
    trigraphs: bool,
    phase1_pushback: Vec<u8>,
    phase2_pushback: Vec<u8>,
    phase3_pushback: Vec<u8>,
    phase4_pushback: Vec<u8>,
    token_pushback: Option<CToken>,
    at_line_start: bool,
}

impl CScanner {
    pub fn new(source: Box<dyn Read>, trigraphs: bool) -> Self {
        Self {
            stream: ByteStream::new(source),
            trigraphs,
            phase1_pushback: Vec::new(),
            phase2_pushback: Vec::new(),
            phase3_pushback: Vec::new(),
            phase4_pushback: Vec::new(),
            token_pushback: None,
            at_line_start: true,
        }
    }

    // Phase 1: normalize line endings, count lines.
    fn phase1(&mut self, session: &mut ScanSession<'_>) -> Result<Option<u8>> {
        let b = match self.phase1_pushback.pop() {
            Some(b) => Some(b),
            None => match self.stream.next()? {
                Some(b'\r') => {
                    match self.stream.next()? {
                        Some(b'\n') | None => {}
                        Some(other) => self.stream.unread(other),
                    }
                    Some(b'\n')
                }
                other => other,
            },
        };
        if b == Some(b'\n') {
            session.line += 1;
        }
        Ok(b)
    }

    fn phase1_unget(&mut self, b: u8, session: &mut ScanSession<'_>) {
        if b == b'\n' {
            session.line -= 1;
        }
        self.phase1_pushback.push(b);
    }

    // Phase 2: delete backslash-newline. The elided newline already bumped
    // the line counter in phase 1, which is exactly what position tracking
    // needs.
    fn phase2(&mut self, session: &mut ScanSession<'_>) -> Result<Option<u8>> {
        if let Some(b) = self.phase2_pushback.pop() {
            return Ok(Some(b));
        }
        loop {
            match self.phase1(session)? {
                Some(b'\\') => match self.phase1(session)? {
                    Some(b'\n') => continue,
                    Some(other) => {
                        self.phase1_unget(other, session);
                        return Ok(Some(b'\\'));
                    }
                    None => return Ok(Some(b'\\')),
                },
                other => return Ok(other),
            }
        }
    }

    fn phase2_unget(&mut self, b: u8) {
        self.phase2_pushback.push(b);
    }

    // Phase 3: trigraph substitution, a pure character layer toggled by
    // --trigraphs.
    fn phase3(&mut self, session: &mut ScanSession<'_>) -> Result<Option<u8>> {
        if let Some(b) = self.phase3_pushback.pop() {
            return Ok(Some(b));
        }
        let c = self.phase2(session)?;
        if !self.trigraphs || c != Some(b'?') {
            return Ok(c);
        }
        match self.phase2(session)? {
            Some(b'?') => {}
            Some(other) => {
                self.phase2_unget(other);
                return Ok(Some(b'?'));
            }
            None => return Ok(Some(b'?')),
        }
        let c3 = self.phase2(session)?;
        let mapped = c3.and_then(|c3| match c3 {
            b'=' => Some(b'#'),
            b'(' => Some(b'['),
            b')' => Some(b']'),
            b'<' => Some(b'{'),
            b'>' => Some(b'}'),
            b'/' => Some(b'\\'),
            b'\'' => Some(b'^'),
            b'!' => Some(b'|'),
            b'-' => Some(b'~'),
            _ => None,
        });
        match (c3, mapped) {
            (_, Some(m)) => Ok(Some(m)),
            (Some(c3), None) => {
                self.phase2_unget(c3);
                self.phase2_unget(b'?');
                Ok(Some(b'?'))
            }
            (None, None) => {
                self.phase2_unget(b'?');
                Ok(Some(b'?'))
            }
        }
    }

    fn phase3_unget(&mut self, b: u8) {
        self.phase3_pushback.push(b);
    }

    // Phase 4: strip comments, capturing their text. A block comment
    // becomes a single space, a line comment its terminating newline.
    fn phase4(&mut self, session: &mut ScanSession<'_>) -> Result<Option<u8>> {
        if let Some(b) = self.phase4_pushback.pop() {
            return Ok(Some(b));
        }
        let c = self.phase3(session)?;
        if c != Some(b'/') {
            return Ok(c);
        }
        match self.phase3(session)? {
            Some(b'*') => {
                self.read_block_comment(session)?;
                Ok(Some(b' '))
            }
            Some(b'/') => {
                self.read_line_comment(session)?;
                Ok(Some(b'\n'))
            }
            Some(other) => {
                self.phase3_unget(other);
                Ok(Some(b'/'))
            }
            None => Ok(Some(b'/')),
        }
    }

    fn phase4_unget(&mut self, b: u8) {
        self.phase4_pushback.push(b);
    }

    fn stash_comment_line(
        &mut self,
        session: &mut ScanSession<'_>,
        bytes: &mut Vec<u8>,
        end_line: usize,
    ) -> Result<()> {
        let mut accumulator = StringAccumulator::new(session.encoding);
        for b in bytes.drain(..) {
            accumulator.push_byte(b);
        }
        let text = accumulator
            .finish()
            .map_err(|e| self.fatal(session, e.to_string()))?;
        session.ledger.add(&text, end_line);
        Ok(())
    }

    fn read_line_comment(&mut self, session: &mut ScanSession<'_>) -> Result<()> {
        let mut bytes = Vec::new();
        loop {
            match self.phase3(session)? {
                None => {
                    let line = session.line;
                    return self.stash_comment_line(session, &mut bytes, line);
                }
                Some(b'\n') => {
                    // The newline already advanced the counter.
                    let line = session.line - 1;
                    return self.stash_comment_line(session, &mut bytes, line);
                }
                Some(b) => bytes.push(b),
            }
        }
    }

    fn read_block_comment(&mut self, session: &mut ScanSession<'_>) -> Result<()> {
        let mut bytes = Vec::new();
        loop {
            match self.phase3(session)? {
                None => {
                    let line = session.line;
                    return self.stash_comment_line(session, &mut bytes, line);
                }
                Some(b'*') => match self.phase3(session)? {
                    Some(b'/') => {
                        let line = session.line;
                        return self.stash_comment_line(session, &mut bytes, line);
                    }
                    Some(other) => {
                        bytes.push(b'*');
                        self.phase3_unget(other);
                    }
                    None => {
                        bytes.push(b'*');
                    }
                },
                Some(b'\n') => {
                    let line = session.line - 1;
                    self.stash_comment_line(session, &mut bytes, line)?;
                }
                Some(b) => bytes.push(b),
            }
        }
    }

    fn fatal(&self, session: &ScanSession<'_>, message: String) -> anyhow::Error {
        anyhow!("{}:{}: {}", session.logical_file, session.line, message)
    }

    fn encoding_fatal(
        &self,
        session: &ScanSession<'_>,
        error: crate::extract::accumulator::EncodingError,
    ) -> anyhow::Error {
        self.fatal(session, error.to_string())
    }

    // Phase 6: `#` at the beginning of a line. `#line NUM "file"` and
    // `# NUM "file"` rewrite the logical position; everything else is
    // discarded. Every directive resets the comment ledger because it
    // breaks comment-to-keyword adjacency.
    fn handle_directive(&mut self, session: &mut ScanSession<'_>) -> Result<()> {
        let mut bytes = Vec::new();
        loop {
            match self.phase4(session)? {
                None | Some(b'\n') => break,
                Some(b) => bytes.push(b),
            }
        }
        session.ledger.reset();

        let text = String::from_utf8_lossy(&bytes);
        let mut rest = text.trim();
        if let Some(after) = rest.strip_prefix("line") {
            rest = after.trim_start();
        }
        let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits_end == 0 {
            return Ok(());
        }
        let Ok(line) = rest[..digits_end].parse::<usize>() else {
            return Ok(());
        };
        session.line = line;
        let tail = rest[digits_end..].trim_start();
        if let Some(stripped) = tail.strip_prefix('"')
            && let Some(end) = stripped.find('"')
        {
            session.logical_file = stripped[..end].to_string();
        }
        Ok(())
    }

    fn read_identifier(
        &mut self,
        first: u8,
        session: &mut ScanSession<'_>,
    ) -> Result<String> {
        let mut name = String::new();
        name.push(first as char);
        loop {
            match self.phase4(session)? {
                Some(b) if b == b'_' || b == b'$' || b.is_ascii_alphanumeric() => {
                    name.push(b as char);
                }
                Some(other) => {
                    self.phase4_unget(other);
                    break;
                }
                None => break,
            }
        }
        Ok(name)
    }

    // C preprocessing numbers: greedy, sign allowed after an exponent char.
    fn skip_number(&mut self, session: &mut ScanSession<'_>) -> Result<()> {
        let mut prev_exponent = false;
        loop {
            match self.phase4(session)? {
                Some(b) if b.is_ascii_alphanumeric() || b == b'.' || b == b'_' => {
                    prev_exponent = matches!(b, b'e' | b'E' | b'p' | b'P');
                }
                Some(b'+' | b'-') if prev_exponent => prev_exponent = false,
                Some(other) => {
                    self.phase4_unget(other);
                    return Ok(());
                }
                None => return Ok(()),
            }
        }
    }

    /// Decode one string or character literal. Content is read at the
    /// phase-3 layer so comment delimiters inside it stay inert.
    fn read_literal(
        &mut self,
        quote: u8,
        what: &str,
        session: &mut ScanSession<'_>,
    ) -> Result<String> {
        let start_line = session.line;
        let mut accumulator = StringAccumulator::new(session.encoding);
        loop {
            match self.phase3(session)? {
                None => {
                    let file = session.logical_file.clone();
                    session.diagnostics.warn(
                        Category::UnterminatedLiteral,
                        &file,
                        start_line,
                        format!("unterminated {}", what),
                    );
                    break;
                }
                Some(b'\n') => {
                    let file = session.logical_file.clone();
                    session.diagnostics.warn(
                        Category::UnterminatedLiteral,
                        &file,
                        start_line,
                        format!("unterminated {}", what),
                    );
                    self.phase3_unget(b'\n');
                    break;
                }
                Some(b) if b == quote => break,
                Some(b'\\') => self.read_escape(&mut accumulator, session)?,
                Some(b) => accumulator.push_byte(b),
            }
        }
        accumulator
            .finish()
            .map_err(|e| self.fatal(session, e.to_string()))
    }

    fn read_escape(
        &mut self,
        accumulator: &mut StringAccumulator,
        session: &mut ScanSession<'_>,
    ) -> Result<()> {
        match self.phase3(session)? {
            None => {
                session.warn_here(Category::InvalidEscape, "backslash at end of input");
                Ok(())
            }
            Some(b'n') => accumulator.push_char('\n').map_err(|e| self.encoding_fatal(session, e)),
            Some(b't') => accumulator.push_char('\t').map_err(|e| self.encoding_fatal(session, e)),
            Some(b'r') => accumulator.push_char('\r').map_err(|e| self.encoding_fatal(session, e)),
            Some(b'a') => accumulator.push_char('\x07').map_err(|e| self.encoding_fatal(session, e)),
            Some(b'b') => accumulator.push_char('\x08').map_err(|e| self.encoding_fatal(session, e)),
            Some(b'f') => accumulator.push_char('\x0C').map_err(|e| self.encoding_fatal(session, e)),
            Some(b'v') => accumulator.push_char('\x0B').map_err(|e| self.encoding_fatal(session, e)),
            Some(b @ (b'\\' | b'\'' | b'"' | b'?')) => accumulator
                .push_char(b as char)
                .map_err(|e| self.encoding_fatal(session, e)),
            Some(b @ b'0'..=b'7') => {
                let mut value = (b - b'0') as u32;
                for _ in 0..2 {
                    match self.phase3(session)? {
                        Some(d @ b'0'..=b'7') => value = value * 8 + (d - b'0') as u32,
                        Some(other) => {
                            self.phase3_unget(other);
                            break;
                        }
                        None => break,
                    }
                }
                if value > 0xFF {
                    session.warn_here(
                        Category::InvalidEscape,
                        format!("octal escape \\{:o} out of byte range", value),
                    );
                    value &= 0xFF;
                }
                accumulator.push_byte(value as u8);
                Ok(())
            }
            Some(b'x') => {
                let mut value: u32 = 0;
                let mut digits = 0;
                loop {
                    match self.phase3(session)? {
                        Some(d) if d.is_ascii_hexdigit() => {
                            value = value.saturating_mul(16) + (d as char).to_digit(16).unwrap();
                            digits += 1;
                        }
                        Some(other) => {
                            self.phase3_unget(other);
                            break;
                        }
                        None => break,
                    }
                }
                if digits == 0 {
                    session.warn_here(Category::InvalidEscape, "\\x with no hex digits");
                    accumulator.push_byte(b'x');
                } else {
                    if value > 0xFF {
                        session.warn_here(
                            Category::InvalidEscape,
                            format!("hex escape \\x{:x} out of byte range", value),
                        );
                        value &= 0xFF;
                    }
                    accumulator.push_byte(value as u8);
                }
                Ok(())
            }
            Some(b'u') => {
                match self.read_hex_exact(4, session)? {
                    Some(value) => accumulator
                        .push_unit(value as u16)
                        .map_err(|e| self.encoding_fatal(session, e))?,
                    None => {
                        session.warn_here(Category::InvalidEscape, "incomplete \\u escape");
                        accumulator.push_byte(b'u');
                    }
                }
                Ok(())
            }
            Some(b'U') => {
                match self.read_hex_exact(8, session)? {
                    Some(value) => {
                        if !accumulator
                            .push_scalar(value)
                            .map_err(|e| self.encoding_fatal(session, e))?
                        {
                            session.warn_here(
                                Category::InvalidCodePoint,
                                format!("\\U{:08X} is not a Unicode scalar value", value),
                            );
                        }
                    }
                    None => {
                        session.warn_here(Category::InvalidEscape, "incomplete \\U escape");
                        accumulator.push_byte(b'U');
                    }
                }
                Ok(())
            }
            Some(other) => {
                session.warn_here(
                    Category::InvalidEscape,
                    format!("unknown escape sequence '\\{}'", other as char),
                );
                accumulator.push_byte(other);
                Ok(())
            }
        }
    }

    fn read_hex_exact(
        &mut self,
        count: usize,
        session: &mut ScanSession<'_>,
    ) -> Result<Option<u32>> {
        let mut value: u32 = 0;
        for _ in 0..count {
            match self.phase3(session)? {
                Some(d) if d.is_ascii_hexdigit() => {
                    value = value * 16 + (d as char).to_digit(16).unwrap();
                }
                Some(other) => {
                    self.phase3_unget(other);
                    return Ok(None);
                }
                None => return Ok(None),
            }
        }
        Ok(Some(value))
    }

    /// C++11 raw string: `R"delim(...)delim"`, no escape processing.
    fn read_raw_string(&mut self, session: &mut ScanSession<'_>) -> Result<String> {
        let start_line = session.line;
        let mut delim = Vec::new();
        loop {
            match self.phase3(session)? {
                Some(b'(') => break,
                Some(b) if delim.len() < 16 && !matches!(b, b' ' | b')' | b'\\' | b'\n') => {
                    delim.push(b);
                }
                _ => {
                    let file = session.logical_file.clone();
                    session.diagnostics.warn(
                        Category::UnterminatedLiteral,
                        &file,
                        start_line,
                        "invalid raw string delimiter",
                    );
                    return Ok(String::new());
                }
            }
        }

        let mut accumulator = StringAccumulator::new(session.encoding);
        loop {
            match self.phase3(session)? {
                None => {
                    let file = session.logical_file.clone();
                    session.diagnostics.warn(
                        Category::UnterminatedLiteral,
                        &file,
                        start_line,
                        "unterminated raw string literal",
                    );
                    break;
                }
                Some(b')') => {
                    let mut candidate = Vec::new();
                    let mut matched = true;
                    for &d in &delim {
                        match self.phase3(session)? {
                            Some(x) if x == d => candidate.push(x),
                            Some(other) => {
                                self.phase3_unget(other);
                                matched = false;
                                break;
                            }
                            None => {
                                matched = false;
                                break;
                            }
                        }
                    }
                    if matched {
                        match self.phase3(session)? {
                            Some(b'"') => break,
                            Some(other) => {
                                self.phase3_unget(other);
                                matched = false;
                            }
                            None => matched = false,
                        }
                    }
                    if !matched {
                        for &x in candidate.iter().rev() {
                            self.phase3_unget(x);
                        }
                        accumulator.push_byte(b')');
                    }
                }
                Some(b) => accumulator.push_byte(b),
            }
        }
        accumulator
            .finish()
            .map_err(|e| self.fatal(session, e.to_string()))
    }

    /// Wrap decoded literal text into a token, attaching adjacent comments.
    fn string_token(
        &mut self,
        text: String,
        line: usize,
        escape: EscapeKind,
        session: &mut ScanSession<'_>,
    ) -> CToken {
        if session.ledger.is_stale() {
            session.ledger.reset();
        }
        let mut literal =
            LiteralString::new(text, SourcePos::new(session.logical_file.clone(), line), escape);
        literal.comment = session.ledger.current();
        session.ledger.note_token(line);
        CToken::String(literal)
    }

    /// Literal following a prefix identifier (`L"..."`, `u8R"(...)"`).
    fn try_prefixed_literal(
        &mut self,
        name: &str,
        session: &mut ScanSession<'_>,
    ) -> Result<Option<CToken>> {
        let raw = matches!(name, "R" | "u8R" | "uR" | "UR" | "LR");
        let wide = matches!(name, "L" | "u" | "u8" | "U");
        if !raw && !wide {
            return Ok(None);
        }
        match self.phase4(session)? {
            Some(b'"') if raw => {
                let line = session.line;
                let text = self.read_raw_string(session)?;
                Ok(Some(self.string_token(text, line, EscapeKind::None, session)))
            }
            Some(b'"') => {
                let line = session.line;
                let text = self.read_literal(b'"', "string literal", session)?;
                Ok(Some(self.string_token(text, line, EscapeKind::Unicode, session)))
            }
            Some(b'\'') if wide => {
                self.read_literal(b'\'', "character literal", session)?;
                session.ledger.note_token(session.line);
                Ok(Some(CToken::Other))
            }
            Some(other) => {
                self.phase4_unget(other);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Phase 5/6: one primitive token.
    fn next_basic(&mut self, session: &mut ScanSession<'_>) -> Result<CToken> {
        loop {
            match self.phase4(session)? {
                None => return Ok(CToken::Eof),
                Some(b'\n') => self.at_line_start = true,
                Some(b' ' | b'\t' | 0x0B | 0x0C) => {}
                Some(b'#') if self.at_line_start => self.handle_directive(session)?,
                Some(b) if b == b'_' || b == b'$' || b.is_ascii_alphabetic() => {
                    self.at_line_start = false;
                    let name = self.read_identifier(b, session)?;
                    if let Some(token) = self.try_prefixed_literal(&name, session)? {
                        return Ok(token);
                    }
                    session.ledger.note_token(session.line);
                    return Ok(CToken::Name(name));
                }
                Some(b) if b.is_ascii_digit() => {
                    self.at_line_start = false;
                    self.skip_number(session)?;
                    session.ledger.note_token(session.line);
                    return Ok(CToken::Other);
                }
                Some(b'"') => {
                    self.at_line_start = false;
                    let line = session.line;
                    let text = self.read_literal(b'"', "string literal", session)?;
                    return Ok(self.string_token(text, line, EscapeKind::Unicode, session));
                }
                Some(b'\'') => {
                    self.at_line_start = false;
                    self.read_literal(b'\'', "character literal", session)?;
                    session.ledger.note_token(session.line);
                    return Ok(CToken::Other);
                }
                Some(b) => {
                    self.at_line_start = false;
                    session.ledger.note_token(session.line);
                    return Ok(CToken::Punct(b));
                }
            }
        }
    }

    fn next_ctoken(&mut self, session: &mut ScanSession<'_>) -> Result<CToken> {
        match self.token_pushback.take() {
            Some(token) => Ok(token),
            None => self.next_basic(session),
        }
    }
}

impl LanguageScanner for CScanner {
    fn next_token(&mut self, session: &mut ScanSession<'_>) -> Result<XgToken> {
        let token = self.next_ctoken(session)?;

        // Phase 7: adjacent string literals concatenate; the merged token
        // keeps the first literal's position, comment and escape style.
        let token = if let CToken::String(mut literal) = token {
            loop {
                match self.next_ctoken(session)? {
                    CToken::String(next) => literal.text.push_str(&next.text),
                    other => {
                        self.token_pushback = Some(other);
                        break;
                    }
                }
            }
            CToken::String(literal)
        } else {
            token
        };

        Ok(match token {
            CToken::Name(name) => XgToken::Symbol(name),
            CToken::String(literal) => XgToken::String(literal),
            CToken::Punct(b'(' | b'[' | b'{') => XgToken::LParen,
            CToken::Punct(b')' | b']' | b'}') => XgToken::RParen,
            CToken::Punct(b',') => XgToken::Comma,
            CToken::Punct(b':') => XgToken::Colon,
            CToken::Punct(_) | CToken::Other => XgToken::Other,
            CToken::Eof => XgToken::Eof,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::catalog::Catalog;
    use crate::diagnostics::Diagnostics;
    use crate::extract::comments::CommentFilter;
    use crate::extract::driver::extract_file;
    use crate::extract::flags::{FlagDecl, FlagTable, parse_flag_spec};
    use crate::extract::keywords::KeywordTable;
    use crate::extract::session::{ScanOptions, ScanSession};
    use crate::format::FormatDialect;
    use crate::scanners::ScannerFamily;

    struct Run {
        catalog: Catalog,
        diagnostics: Diagnostics,
    }

    fn run_with(source: &str, keyword_specs: &[&str], options: ScanOptions) -> Run {
        let mut keywords = KeywordTable::new();
        for spec in keyword_specs {
            keywords.insert_spec(spec);
        }
        let mut flags = FlagTable::new();
        for spec in [
            "gettext:1:pass-c-format",
            "ngettext:1:pass-c-format",
            "ngettext:2:pass-c-format",
            "printf:1:c-format",
        ] {
            let parsed = parse_flag_spec(spec).unwrap();
            let slot = ScannerFamily::C.slot_of(parsed.dialect).unwrap();
            flags.insert(
                &parsed.keyword,
                parsed.argnum,
                slot,
                crate::extract::flags::SlotFlag {
                    declared: if parsed.pass {
                        FlagDecl::Undecided
                    } else {
                        FlagDecl::Yes
                    },
                    inherited: parsed.pass,
                },
            );
        }
        let mut diagnostics = Diagnostics::new();
        let mut catalog = Catalog::new();
        {
            let mut session = ScanSession::new(
                "test.c",
                "test.c",
                ScannerFamily::C,
                &keywords,
                &flags,
                &options,
                &mut diagnostics,
            );
            let mut scanner = CScanner::new(
                Box::new(Cursor::new(source.as_bytes().to_vec())),
                options.trigraphs,
            );
            extract_file(&mut scanner, &mut session, &mut catalog).unwrap();
        }
        Run {
            catalog,
            diagnostics,
        }
    }

    fn run(source: &str, keyword_specs: &[&str]) -> Run {
        run_with(
            source,
            keyword_specs,
            ScanOptions {
                comment_filter: CommentFilter::All,
                ..ScanOptions::default()
            },
        )
    }

    fn ids(run: &Run) -> Vec<&str> {
        run.catalog.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn extracts_simple_call() {
        let run = run(r#"int main() { puts(gettext("Hello, world!")); }"#, &["gettext:1"]);
        assert_eq!(ids(&run), vec!["Hello, world!"]);
        assert_eq!(run.catalog.get(0).positions[0].line, 1);
    }

    #[test]
    fn nested_calls_extract_both_messages() {
        let run = run(
            r#"f(g("a"), "b");"#,
            &["f:2", "g:1"],
        );
        assert_eq!(ids(&run), vec!["a", "b"]);
    }

    #[test]
    fn argument_positions_respect_nesting() {
        // The comma inside g() must not advance f's argument counter.
        let run = run(r#"f(g("x", "y"), "b");"#, &["f:2", "g:2"]);
        assert_eq!(ids(&run), vec!["y", "b"]);
    }

    #[test]
    fn plural_call_extracts_pair() {
        let run = run(
            r#"printf(ngettext("%d file", "%d files", n), n);"#,
            &["ngettext:1,2"],
        );
        assert_eq!(ids(&run), vec!["%d file"]);
        let msg = run.catalog.get(0);
        assert_eq!(msg.plural_id.as_deref(), Some("%d files"));
        // ngettext's pass- flag inherits printf's c-format declaration.
        assert_eq!(msg.format[FormatDialect::C.index()], FlagDecl::Yes);
    }

    #[test]
    fn adjacent_literals_concatenate() {
        let run = run(
            "gettext(\"Hello, \"\n        \"world!\");",
            &["gettext:1"],
        );
        assert_eq!(ids(&run), vec!["Hello, world!"]);
        assert_eq!(run.catalog.get(0).positions[0].line, 1);
    }

    #[test]
    fn comment_directly_above_attaches() {
        let run = run(
            "/* TRANSLATORS: greeting */\ngettext(\"hi\");",
            &["gettext:1"],
        );
        assert_eq!(run.catalog.get(0).comments, vec!["TRANSLATORS: greeting"]);
    }

    #[test]
    fn comment_separated_by_code_detaches() {
        let run = run(
            "// greeting\nint x = 1;\ngettext(\"hi\");",
            &["gettext:1"],
        );
        assert!(run.catalog.get(0).comments.is_empty());
    }

    #[test]
    fn line_directive_rewrites_position() {
        let run = run(
            "#line 100 \"orig.c\"\ngettext(\"located\");",
            &["gettext:1"],
        );
        let pos = &run.catalog.get(0).positions[0];
        assert_eq!(pos.file, "orig.c");
        assert_eq!(pos.line, 100);
    }

    #[test]
    fn directive_resets_pending_comment() {
        let run = run(
            "// note\n#define X 1\ngettext(\"hi\");",
            &["gettext:1"],
        );
        assert!(run.catalog.get(0).comments.is_empty());
    }

    #[test]
    fn line_continuation_joins_tokens() {
        let run = run("get\\\ntext(\"joined\");", &["gettext:1"]);
        assert_eq!(ids(&run), vec!["joined"]);
        // The literal sits on line 2 of the source.
        assert_eq!(run.catalog.get(0).positions[0].line, 2);
    }

    #[test]
    fn escapes_decode() {
        let run = run(r#"gettext("tab\there\n\x41\101");"#, &["gettext:1"]);
        assert_eq!(ids(&run), vec!["tab\there\nAA"]);
    }

    #[test]
    fn unicode_escapes_and_surrogate_pairs() {
        let run = run(
            r#"gettext("é 😀 \U0001F600");"#,
            &["gettext:1"],
        );
        assert_eq!(ids(&run), vec!["é \u{1F600} \u{1F600}"]);
    }

    #[test]
    fn lone_surrogate_becomes_replacement_with_warning_free_salvage() {
        let run = run(r#"gettext("\uD800!");"#, &["gettext:1"]);
        assert_eq!(ids(&run), vec!["\u{FFFD}!"]);
    }

    #[test]
    fn raw_string_keeps_backslashes() {
        let run = run(r##"gettext(R"(a\nb)");"##, &["gettext:1"]);
        assert_eq!(ids(&run), vec![r"a\nb"]);
    }

    #[test]
    fn raw_string_with_delimiter() {
        let run = run(r##"gettext(R"xx(quote )" inside)xx");"##, &["gettext:1"]);
        assert_eq!(ids(&run), vec![r#"quote )" inside"#]);
    }

    #[test]
    fn unterminated_literal_warns_and_continues() {
        let run = run(
            "gettext(\"broken\ngettext(\"ok\");",
            &["gettext:1"],
        );
        assert!(ids(&run).contains(&"ok"));
        assert!(
            run.diagnostics
                .issues()
                .iter()
                .any(|i| i.category == Category::UnterminatedLiteral)
        );
    }

    #[test]
    fn unbalanced_parens_do_not_abort() {
        let run = run(
            ")));\ngettext(\"after the wreckage\");",
            &["gettext:1"],
        );
        assert_eq!(ids(&run), vec!["after the wreckage"]);
    }

    #[test]
    fn char_literals_are_ignored() {
        let run = run(r#"if (c == 'x') gettext("kept");"#, &["gettext:1"]);
        assert_eq!(ids(&run), vec!["kept"]);
    }

    #[test]
    fn comment_delimiters_inside_strings_are_inert() {
        let run = run(r#"gettext("not /* a */ comment // really");"#, &["gettext:1"]);
        assert_eq!(ids(&run), vec!["not /* a */ comment // really"]);
    }

    #[test]
    fn trigraphs_only_with_option() {
        let source = r#"gettext("??(bracket??)");"#;
        let plain = run(source, &["gettext:1"]);
        assert_eq!(ids(&plain), vec!["??(bracket??)"]);

        let tri = run_with(
            source,
            &["gettext:1"],
            ScanOptions {
                trigraphs: true,
                ..ScanOptions::default()
            },
        );
        assert_eq!(ids(&tri), vec!["[bracket]"]);
    }

    #[test]
    fn extract_all_commits_every_string() {
        let run = run_with(
            r#"foo("one"); bar("two");"#,
            &[],
            ScanOptions {
                extract_all: true,
                ..ScanOptions::default()
            },
        );
        assert_eq!(ids(&run), vec!["one", "two"]);
    }

    #[test]
    fn pass_flag_inherits_into_nested_argument() {
        // printf's first argument is declared c-format; gettext passes the
        // declaration through to its own first argument.
        let run = run(
            r#"printf(gettext("no directives"), x);"#,
            &["gettext:1"],
        );
        let msg = run.catalog.get(0);
        assert_eq!(msg.format[FormatDialect::C.index()], FlagDecl::Yes);
    }

    #[test]
    fn context_call_extracts_msgctxt() {
        let run = run(
            r#"pgettext("menu", "Open");"#,
            &["pgettext:1c,2"],
        );
        let msg = run.catalog.get(0);
        assert_eq!(msg.context.as_deref(), Some("menu"));
        assert_eq!(msg.id, "Open");
    }

    #[test]
    fn crlf_input_counts_lines_once() {
        let run = run("\r\n\r\ngettext(\"third line\");\r\n", &["gettext:1"]);
        assert_eq!(run.catalog.get(0).positions[0].line, 3);
    }
}
