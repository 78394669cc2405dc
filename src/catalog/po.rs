//! PO template emission.
//!
//! Write-only: merging and parsing of existing catalogs belong to dedicated
//! PO tooling. Strings are emitted on one logical line with escapes, never
//! wrapped, and the header carries no timestamp so output is reproducible.

use std::io::{self, Write};

use super::Catalog;

/// Escape a string for a PO `msgid "..."` line.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Write the whole catalog as a PO template.
pub fn write_po(catalog: &Catalog, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "# SOME DESCRIPTIVE TITLE.")?;
    writeln!(
        out,
        "# This file is distributed under the same license as the PACKAGE package."
    )?;
    writeln!(out, "# FIRST AUTHOR <EMAIL@ADDRESS>, YEAR.")?;
    writeln!(out, "#")?;
    writeln!(out, "#, fuzzy")?;
    writeln!(out, "msgid \"\"")?;
    writeln!(out, "msgstr \"\"")?;
    writeln!(out, "\"Project-Id-Version: PACKAGE VERSION\\n\"")?;
    writeln!(out, "\"Report-Msgid-Bugs-To: \\n\"")?;
    writeln!(out, "\"MIME-Version: 1.0\\n\"")?;
    writeln!(out, "\"Content-Type: text/plain; charset=UTF-8\\n\"")?;
    writeln!(out, "\"Content-Transfer-Encoding: 8bit\\n\"")?;

    for message in catalog.iter() {
        writeln!(out)?;
        for comment in &message.comments {
            writeln!(out, "#. {}", comment)?;
        }
        if !message.positions.is_empty() {
            let refs: Vec<String> = message
                .positions
                .iter()
                .map(|p| format!("{}:{}", p.file, p.line))
                .collect();
            writeln!(out, "#: {}", refs.join(" "))?;
        }
        let flags = message.flag_names();
        if !flags.is_empty() {
            writeln!(out, "#, {}", flags.join(", "))?;
        }
        if let Some(ctx) = &message.context {
            writeln!(out, "msgctxt \"{}\"", escape(ctx))?;
        }
        writeln!(out, "msgid \"{}\"", escape(&message.id))?;
        match &message.plural_id {
            Some(plural) => {
                writeln!(out, "msgid_plural \"{}\"", escape(plural))?;
                writeln!(out, "msgstr[0] \"\"")?;
                writeln!(out, "msgstr[1] \"\"")?;
            }
            None => writeln!(out, "msgstr \"\"")?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::token::SourcePos;
    use pretty_assertions::assert_eq;

    fn render(catalog: &Catalog) -> String {
        let mut buf = Vec::new();
        write_po(catalog, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn escapes_special_characters() {
        assert_eq!(escape("a\"b\\c\nd\te"), "a\\\"b\\\\c\\nd\\te");
    }

    #[test]
    fn renders_singular_entry() {
        let mut catalog = Catalog::new();
        let (idx, _) = catalog.lookup_or_insert(None, "Hello".into());
        catalog
            .get_mut(idx)
            .positions
            .push(SourcePos::new("main.c", 3));
        catalog.get_mut(idx).comments.push("greeting".into());
        let text = render(&catalog);
        assert!(text.contains("#. greeting\n#: main.c:3\nmsgid \"Hello\"\nmsgstr \"\"\n"));
    }

    #[test]
    fn renders_plural_and_context() {
        let mut catalog = Catalog::new();
        let (idx, _) = catalog.lookup_or_insert(Some("mail".into()), "%d file".into());
        catalog.get_mut(idx).plural_id = Some("%d files".into());
        let text = render(&catalog);
        assert!(text.contains(
            "msgctxt \"mail\"\nmsgid \"%d file\"\nmsgid_plural \"%d files\"\nmsgstr[0] \"\"\nmsgstr[1] \"\"\n"
        ));
    }

    #[test]
    fn header_is_deterministic() {
        let first = render(&Catalog::new());
        let second = render(&Catalog::new());
        assert_eq!(first, second);
        assert!(first.starts_with("# SOME DESCRIPTIVE TITLE."));
    }
}
