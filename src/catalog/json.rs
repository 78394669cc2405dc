//! JSON catalog emission (`--output-format json`).

use std::io::{self, Write};

use serde::Serialize;

use super::{Catalog, Message};
use crate::extract::token::SourcePos;

#[derive(Serialize)]
struct MessageRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    plural_id: Option<&'a str>,
    positions: &'a [SourcePos],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    comments: &'a [String],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    flags: Vec<String>,
}

impl<'a> From<&'a Message> for MessageRecord<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            context: message.context.as_deref(),
            id: &message.id,
            plural_id: message.plural_id.as_deref(),
            positions: &message.positions,
            comments: &message.comments,
            flags: message.flag_names(),
        }
    }
}

/// Write the catalog as a pretty-printed JSON array, discovery order.
pub fn write_json(catalog: &Catalog, out: &mut impl Write) -> io::Result<()> {
    let records: Vec<MessageRecord<'_>> = catalog.iter().map(MessageRecord::from).collect();
    serde_json::to_writer_pretty(&mut *out, &records)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_records_with_flags() {
        let mut catalog = Catalog::new();
        let (idx, _) = catalog.lookup_or_insert(Some("menu".into()), "Open".into());
        catalog
            .get_mut(idx)
            .positions
            .push(SourcePos::new("ui.c", 10));
        let mut buf = Vec::new();
        write_json(&catalog, &mut buf).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed[0]["context"], "menu");
        assert_eq!(parsed[0]["id"], "Open");
        assert_eq!(parsed[0]["positions"][0]["file"], "ui.c");
        assert_eq!(parsed[0]["positions"][0]["line"], 10);
        assert!(parsed[0].get("plural_id").is_none());
    }
}
