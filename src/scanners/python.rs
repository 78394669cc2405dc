//! Python scanner.
//!
//! A slimmer instantiation of the phase pipeline than the C one: line-ending
//! normalization, then direct tokenization. `#` comments feed the ledger and
//! the PEP 263 coding declaration, string literals carry Python's prefix and
//! triple-quote grammar, and both implicit adjacency and `+` concatenate
//! string literals.

use std::io::Read;
use std::sync::LazyLock;

use anyhow::{Result, anyhow};
use regex::Regex;

use crate::diagnostics::Category;
use crate::extract::accumulator::{SourceEncoding, StringAccumulator};
use crate::extract::session::ScanSession;
use crate::extract::token::{EscapeKind, LiteralString, SourcePos, XgToken};
use crate::scanners::stream::ByteStream;
use crate::scanners::LanguageScanner;

/// PEP 263: `coding[:=] NAME` in a comment on line 1 or 2.
static CODING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"coding[:=]\s*([-A-Za-z0-9_.]+)").unwrap());

#[derive(Debug)]
enum PyToken {
    Name(String),
    String(LiteralString),
    Punct(u8),
    Other,
    Eof,
}

/// Shape of one string literal's prefix.
#[derive(Debug, Clone, Copy)]
struct Prefix {
    raw: bool,
}

fn parse_prefix(name: &str) -> Option<Prefix> {
    if name.is_empty() || name.len() > 2 {
        return None;
    }
    let mut raw = false;
    for c in name.chars() {
        match c.to_ascii_lowercase() {
            'r' => raw = true,
            'b' | 'u' | 'f' => {}
            _ => return None,
        }
    }
    Some(Prefix { raw })
}

pub struct PythonScanner {
    stream: ByteStream,
    char_pushback: Vec<u8>,
    token_pushback: Vec<PyToken>,
}

impl PythonScanner {
    pub fn new(source: Box<dyn Read>) -> Self {
        Self {
            stream: ByteStream::new(source),
            char_pushback: Vec::new(),
            token_pushback: Vec::new(),
        }
    }

    fn next_char(&mut self, session: &mut ScanSession<'_>) -> Result<Option<u8>> {
        let b = match self.char_pushback.pop() {
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

    fn unget_char(&mut self, b: u8, session: &mut ScanSession<'_>) {
        if b == b'\n' {
            session.line -= 1;
        }
        self.char_pushback.push(b);
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

    /// `#` comment to end of line. Lines 1 and 2 are checked for a PEP 263
    /// coding declaration, which switches the session encoding for the rest
    /// of the file.
    fn read_comment(&mut self, session: &mut ScanSession<'_>) -> Result<()> {
        let comment_line = session.line;
        let mut bytes = Vec::new();
        loop {
            match self.next_char(session)? {
                None | Some(b'\n') => break,
                Some(b) => bytes.push(b),
            }
        }
        let mut accumulator = StringAccumulator::new(session.encoding);
        for b in bytes {
            accumulator.push_byte(b);
        }
        let text = accumulator
            .finish()
            .map_err(|e| self.fatal(session, e.to_string()))?;

        if comment_line <= 2
            && let Some(captures) = CODING_REGEX.captures(&text)
        {
            let name = &captures[1];
            match SourceEncoding::from_name(name) {
                Some(encoding) => session.encoding = encoding,
                None => {
                    let file = session.logical_file.clone();
                    session.diagnostics.warn(
                        Category::UnknownEncoding,
                        &file,
                        comment_line,
                        format!("unsupported source encoding '{}'", name),
                    );
                }
            }
        }
        session.ledger.add(&text, comment_line);
        Ok(())
    }

    fn read_identifier(&mut self, first: u8, session: &mut ScanSession<'_>) -> Result<String> {
        let mut name = String::new();
        name.push(first as char);
        loop {
            match self.next_char(session)? {
                Some(b) if b == b'_' || b.is_ascii_alphanumeric() => name.push(b as char),
                Some(other) => {
                    self.unget_char(other, session);
                    break;
                }
                None => break,
            }
        }
        Ok(name)
    }

    fn skip_number(&mut self, session: &mut ScanSession<'_>) -> Result<()> {
        let mut prev_exponent = false;
        loop {
            match self.next_char(session)? {
                Some(b) if b.is_ascii_alphanumeric() || b == b'.' || b == b'_' => {
                    prev_exponent = matches!(b, b'e' | b'E');
                }
                Some(b'+' | b'-') if prev_exponent => prev_exponent = false,
                Some(other) => {
                    self.unget_char(other, session);
                    return Ok(());
                }
                None => return Ok(()),
            }
        }
    }

    fn read_hex_exact(
        &mut self,
        count: usize,
        session: &mut ScanSession<'_>,
    ) -> Result<Option<u32>> {
        let mut collected = Vec::new();
        let mut value: u32 = 0;
        for _ in 0..count {
            match self.next_char(session)? {
                Some(d) if d.is_ascii_hexdigit() => {
                    value = value * 16 + (d as char).to_digit(16).unwrap();
                    collected.push(d);
                }
                Some(other) => {
                    self.unget_char(other, session);
                    for &c in collected.iter().rev() {
                        self.unget_char(c, session);
                    }
                    return Ok(None);
                }
                None => {
                    for &c in collected.iter().rev() {
                        self.unget_char(c, session);
                    }
                    return Ok(None);
                }
            }
        }
        Ok(Some(value))
    }

    /// Python escape grammar. Unlike C, an unrecognized escape silently
    /// keeps both the backslash and the character.
    fn read_escape(
        &mut self,
        accumulator: &mut StringAccumulator,
        session: &mut ScanSession<'_>,
    ) -> Result<()> {
        match self.next_char(session)? {
            None => {
                accumulator.push_byte(b'\\');
                Ok(())
            }
            Some(b'\n') => Ok(()),
            Some(b'n') => accumulator.push_char('\n').map_err(|e| self.encoding_fatal(session, e)),
            Some(b't') => accumulator.push_char('\t').map_err(|e| self.encoding_fatal(session, e)),
            Some(b'r') => accumulator.push_char('\r').map_err(|e| self.encoding_fatal(session, e)),
            Some(b'a') => accumulator.push_char('\x07').map_err(|e| self.encoding_fatal(session, e)),
            Some(b'b') => accumulator.push_char('\x08').map_err(|e| self.encoding_fatal(session, e)),
            Some(b'f') => accumulator.push_char('\x0C').map_err(|e| self.encoding_fatal(session, e)),
            Some(b'v') => accumulator.push_char('\x0B').map_err(|e| self.encoding_fatal(session, e)),
            Some(b @ (b'\\' | b'\'' | b'"')) => {
                accumulator.push_char(b as char).map_err(|e| self.encoding_fatal(session, e))
            }
            Some(b @ b'0'..=b'7') => {
                let mut value = (b - b'0') as u32;
                for _ in 0..2 {
                    match self.next_char(session)? {
                        Some(d @ b'0'..=b'7') => value = value * 8 + (d - b'0') as u32,
                        Some(other) => {
                            self.unget_char(other, session);
                            break;
                        }
                        None => break,
                    }
                }
                accumulator.push_byte((value & 0xFF) as u8);
                Ok(())
            }
            Some(b'x') => match self.read_hex_exact(2, session)? {
                Some(value) => {
                    accumulator.push_byte(value as u8);
                    Ok(())
                }
                None => {
                    accumulator.push_byte(b'\\');
                    accumulator.push_byte(b'x');
                    Ok(())
                }
            },
            Some(b'u') => match self.read_hex_exact(4, session)? {
                Some(value) => accumulator
                    .push_unit(value as u16)
                    .map_err(|e| self.encoding_fatal(session, e)),
                None => {
                    accumulator.push_byte(b'\\');
                    accumulator.push_byte(b'u');
                    Ok(())
                }
            },
            Some(b'U') => match self.read_hex_exact(8, session)? {
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
                    Ok(())
                }
                None => {
                    accumulator.push_byte(b'\\');
                    accumulator.push_byte(b'U');
                    Ok(())
                }
            },
            Some(other) => {
                accumulator.push_byte(b'\\');
                accumulator.push_byte(other);
                Ok(())
            }
        }
    }

    /// One string literal. The opening quote has been consumed; `triple`
    /// says whether the delimiter is tripled.
    fn read_string(
        &mut self,
        quote: u8,
        triple: bool,
        prefix: Prefix,
        session: &mut ScanSession<'_>,
    ) -> Result<String> {
        let start_line = session.line;
        let mut accumulator = StringAccumulator::new(session.encoding);
        loop {
            match self.next_char(session)? {
                None => {
                    let file = session.logical_file.clone();
                    session.diagnostics.warn(
                        Category::UnterminatedLiteral,
                        &file,
                        start_line,
                        "unterminated string literal",
                    );
                    break;
                }
                Some(b'\n') if !triple => {
                    let file = session.logical_file.clone();
                    session.diagnostics.warn(
                        Category::UnterminatedLiteral,
                        &file,
                        start_line,
                        "unterminated string literal",
                    );
                    self.unget_char(b'\n', session);
                    break;
                }
                Some(b) if b == quote => {
                    if !triple {
                        break;
                    }
                    // Need two more quotes to close a triple-quoted string.
                    match self.next_char(session)? {
                        Some(q2) if q2 == quote => match self.next_char(session)? {
                            Some(q3) if q3 == quote => break,
                            Some(other) => {
                                self.unget_char(other, session);
                                accumulator.push_byte(quote);
                                accumulator.push_byte(quote);
                            }
                            None => {
                                accumulator.push_byte(quote);
                                accumulator.push_byte(quote);
                            }
                        },
                        Some(other) => {
                            self.unget_char(other, session);
                            accumulator.push_byte(quote);
                        }
                        None => accumulator.push_byte(quote),
                    }
                }
                Some(b'\\') if prefix.raw => {
                    // Raw strings keep the backslash but it still guards
                    // the following character from ending the literal.
                    accumulator.push_byte(b'\\');
                    match self.next_char(session)? {
                        Some(b) => accumulator.push_byte(b),
                        None => {}
                    }
                }
                Some(b'\\') => self.read_escape(&mut accumulator, session)?,
                Some(b) => accumulator.push_byte(b),
            }
        }
        accumulator
            .finish()
            .map_err(|e| self.fatal(session, e.to_string()))
    }

    fn finish_string(
        &mut self,
        text: String,
        line: usize,
        prefix: Prefix,
        session: &mut ScanSession<'_>,
    ) -> PyToken {
        if session.ledger.is_stale() {
            session.ledger.reset();
        }
        let escape = if prefix.raw {
            EscapeKind::None
        } else {
            EscapeKind::Unicode
        };
        let mut literal =
            LiteralString::new(text, SourcePos::new(session.logical_file.clone(), line), escape);
        literal.comment = session.ledger.current();
        session.ledger.note_token(line);
        PyToken::String(literal)
    }

    /// Consume a string literal starting at its first quote character.
    fn lex_string(
        &mut self,
        quote: u8,
        prefix: Prefix,
        session: &mut ScanSession<'_>,
    ) -> Result<PyToken> {
        let line = session.line;
        let triple = match self.next_char(session)? {
            Some(q2) if q2 == quote => match self.next_char(session)? {
                Some(q3) if q3 == quote => true,
                Some(other) => {
                    // An empty literal followed by `other`.
                    self.unget_char(other, session);
                    return Ok(self.finish_string(String::new(), line, prefix, session));
                }
                None => return Ok(self.finish_string(String::new(), line, prefix, session)),
            },
            Some(other) => {
                self.unget_char(other, session);
                false
            }
            None => {
                let file = session.logical_file.clone();
                session.diagnostics.warn(
                    Category::UnterminatedLiteral,
                    &file,
                    line,
                    "unterminated string literal",
                );
                return Ok(self.finish_string(String::new(), line, prefix, session));
            }
        };
        let text = self.read_string(quote, triple, prefix, session)?;
        Ok(self.finish_string(text, line, prefix, session))
    }

    fn next_basic(&mut self, session: &mut ScanSession<'_>) -> Result<PyToken> {
        loop {
            match self.next_char(session)? {
                None => return Ok(PyToken::Eof),
                Some(b' ' | b'\t' | b'\n' | 0x0B | 0x0C) => {}
                Some(b'\\') => match self.next_char(session)? {
                    // Explicit line joining.
                    Some(b'\n') => {}
                    Some(other) => {
                        self.unget_char(other, session);
                        session.ledger.note_token(session.line);
                        return Ok(PyToken::Other);
                    }
                    None => return Ok(PyToken::Other),
                },
                Some(b'#') => self.read_comment(session)?,
                Some(b @ (b'"' | b'\'')) => {
                    return self.lex_string(b, Prefix { raw: false }, session);
                }
                Some(b) if b == b'_' || b.is_ascii_alphabetic() => {
                    let name = self.read_identifier(b, session)?;
                    if let Some(prefix) = parse_prefix(&name) {
                        match self.next_char(session)? {
                            Some(q @ (b'"' | b'\'')) => {
                                return self.lex_string(q, prefix, session);
                            }
                            Some(other) => self.unget_char(other, session),
                            None => {}
                        }
                    }
                    session.ledger.note_token(session.line);
                    return Ok(PyToken::Name(name));
                }
                Some(b) if b.is_ascii_digit() => {
                    self.skip_number(session)?;
                    session.ledger.note_token(session.line);
                    return Ok(PyToken::Other);
                }
                Some(b) => {
                    session.ledger.note_token(session.line);
                    return Ok(PyToken::Punct(b));
                }
            }
        }
    }

    fn next_pytoken(&mut self, session: &mut ScanSession<'_>) -> Result<PyToken> {
        match self.token_pushback.pop() {
            Some(token) => Ok(token),
            None => self.next_basic(session),
        }
    }
}

impl LanguageScanner for PythonScanner {
    fn next_token(&mut self, session: &mut ScanSession<'_>) -> Result<XgToken> {
        let token = self.next_pytoken(session)?;

        // Concatenation stage: implicit adjacency and the `+` operator both
        // merge string literals; the merged token keeps the first literal's
        // position, comment and escape style.
        let token = if let PyToken::String(mut literal) = token {
            loop {
                match self.next_pytoken(session)? {
                    PyToken::String(next) => literal.text.push_str(&next.text),
                    PyToken::Punct(b'+') => match self.next_pytoken(session)? {
                        PyToken::String(next) => literal.text.push_str(&next.text),
                        other => {
                            self.token_pushback.push(other);
                            self.token_pushback.push(PyToken::Punct(b'+'));
                            break;
                        }
                    },
                    other => {
                        self.token_pushback.push(other);
                        break;
                    }
                }
            }
            PyToken::String(literal)
        } else {
            token
        };

        Ok(match token {
            PyToken::Name(name) => XgToken::Symbol(name),
            PyToken::String(literal) => XgToken::String(literal),
            PyToken::Punct(b'(' | b'[' | b'{') => XgToken::LParen,
            PyToken::Punct(b')' | b']' | b'}') => XgToken::RParen,
            PyToken::Punct(b',') => XgToken::Comma,
            PyToken::Punct(b':') => XgToken::Colon,
            PyToken::Punct(_) | PyToken::Other => XgToken::Other,
            PyToken::Eof => XgToken::Eof,
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
    use crate::extract::flags::FlagTable;
    use crate::extract::keywords::KeywordTable;
    use crate::extract::session::{ScanOptions, ScanSession};
    use crate::scanners::ScannerFamily;

    struct Run {
        catalog: Catalog,
        diagnostics: Diagnostics,
    }

    fn run_bytes(source: &[u8], keyword_specs: &[&str]) -> Run {
        let mut keywords = KeywordTable::new();
        for spec in keyword_specs {
            keywords.insert_spec(spec);
        }
        let flags = FlagTable::new();
        let options = ScanOptions {
            comment_filter: CommentFilter::All,
            ..ScanOptions::default()
        };
        let mut diagnostics = Diagnostics::new();
        let mut catalog = Catalog::new();
        {
            let mut session = ScanSession::new(
                "test.py",
                "test.py",
                ScannerFamily::Python,
                &keywords,
                &flags,
                &options,
                &mut diagnostics,
            );
            let mut scanner = PythonScanner::new(Box::new(Cursor::new(source.to_vec())));
            extract_file(&mut scanner, &mut session, &mut catalog).unwrap();
        }
        Run {
            catalog,
            diagnostics,
        }
    }

    fn run(source: &str, keyword_specs: &[&str]) -> Run {
        run_bytes(source.as_bytes(), keyword_specs)
    }

    fn ids(run: &Run) -> Vec<&str> {
        run.catalog.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn extracts_underscore_call() {
        let run = run(r#"print(_("Hello"))"#, &["_:1"]);
        assert_eq!(ids(&run), vec!["Hello"]);
    }

    #[test]
    fn single_and_double_quotes() {
        let run = run("_('one')\n_(\"two\")", &["_:1"]);
        assert_eq!(ids(&run), vec!["one", "two"]);
    }

    #[test]
    fn triple_quoted_string_spans_lines() {
        let run = run("_(\"\"\"first\nsecond\"\"\")", &["_:1"]);
        assert_eq!(ids(&run), vec!["first\nsecond"]);
        assert_eq!(run.catalog.get(0).positions[0].line, 1);
    }

    #[test]
    fn empty_literal_is_not_a_triple_delimiter() {
        let run = run("_(\"\")\n_(\"kept\")", &["_:1"]);
        // The empty msgid is dropped with a warning, "kept" survives.
        assert_eq!(ids(&run), vec!["kept"]);
        assert!(
            run.diagnostics
                .issues()
                .iter()
                .any(|i| i.category == Category::EmptyMsgid)
        );
    }

    #[test]
    fn raw_string_keeps_backslashes() {
        let run = run(r#"_(r"a\nb")"#, &["_:1"]);
        assert_eq!(ids(&run), vec![r"a\nb"]);
    }

    #[test]
    fn escapes_decode() {
        let run = run(r#"_("tab\there\n\x41é")"#, &["_:1"]);
        assert_eq!(ids(&run), vec!["tab\there\nAé"]);
    }

    #[test]
    fn unknown_escape_is_kept_verbatim() {
        let run = run(r#"_("\q\d")"#, &["_:1"]);
        assert_eq!(ids(&run), vec![r"\q\d"]);
        assert!(run.diagnostics.is_empty());
    }

    #[test]
    fn implicit_concatenation() {
        let run = run("_(\"Hello, \"\n  \"world!\")", &["_:1"]);
        assert_eq!(ids(&run), vec!["Hello, world!"]);
    }

    #[test]
    fn plus_concatenation() {
        let run = run(r#"_("Hello, " + "world!")"#, &["_:1"]);
        assert_eq!(ids(&run), vec!["Hello, world!"]);
    }

    #[test]
    fn plus_with_non_string_does_not_merge() {
        let run = run(r#"_("count: " + n)"#, &["_:1"]);
        assert_eq!(ids(&run), vec!["count: "]);
    }

    #[test]
    fn f_string_treated_as_plain_literal() {
        let run = run(r#"_(f"total {n}")"#, &["_:1"]);
        assert_eq!(ids(&run), vec!["total {n}"]);
    }

    #[test]
    fn comment_directly_above_attaches() {
        let run = run("# TRANSLATORS: greeting\n_(\"hi\")", &["_:1"]);
        assert_eq!(run.catalog.get(0).comments, vec!["TRANSLATORS: greeting"]);
    }

    #[test]
    fn comment_separated_by_code_detaches() {
        let run = run("# greeting\nx = 1\n_(\"hi\")", &["_:1"]);
        assert!(run.catalog.get(0).comments.is_empty());
    }

    #[test]
    fn plural_call() {
        let run = run(
            r#"ngettext("%d file", "%d files", n)"#,
            &["ngettext:1,2"],
        );
        assert_eq!(ids(&run), vec!["%d file"]);
        assert_eq!(run.catalog.get(0).plural_id.as_deref(), Some("%d files"));
    }

    #[test]
    fn coding_comment_switches_encoding() {
        let mut source = Vec::new();
        source.extend_from_slice(b"# -*- coding: iso-8859-1 -*-\n");
        source.extend_from_slice(b"_(\"caf\xe9\")\n");
        let run = run_bytes(&source, &["_:1"]);
        assert_eq!(ids(&run), vec!["café"]);
    }

    #[test]
    fn unknown_coding_warns_and_keeps_default() {
        let run = run("# coding: koi8-r\n_(\"plain\")", &["_:1"]);
        assert_eq!(ids(&run), vec!["plain"]);
        assert!(
            run.diagnostics
                .issues()
                .iter()
                .any(|i| i.category == Category::UnknownEncoding)
        );
    }

    #[test]
    fn coding_comment_after_line_two_is_ignored() {
        let run = run("x = 1\ny = 2\n# coding: koi8-r\n_(\"ok\")", &["_:1"]);
        assert_eq!(ids(&run), vec!["ok"]);
        assert!(run.diagnostics.is_empty());
    }

    #[test]
    fn unterminated_string_warns_and_continues() {
        let run = run("_(\"broken\n_(\"ok\")", &["_:1"]);
        assert!(ids(&run).contains(&"ok"));
        assert!(
            run.diagnostics
                .issues()
                .iter()
                .any(|i| i.category == Category::UnterminatedLiteral)
        );
    }

    #[test]
    fn explicit_line_join_is_transparent_for_comments() {
        // The backslash-newline join produces no token, so a comment above
        // stays attached across it.
        let run = run("# note\n_(\\\n\"hi\")", &["_:1"]);
        assert_eq!(run.catalog.get(0).comments, vec!["note"]);
    }

    #[test]
    fn string_in_subscript_context() {
        let run = run(r#"d[_("key")] = 1"#, &["_:1"]);
        assert_eq!(ids(&run), vec!["key"]);
    }
}
