//! Minimal python-brace-format (`str.format`) recognizer.

use super::{FormatDescriptor, FormatDialect, FormatDialectParser, FormatError};

pub struct PythonBraceFormatParser;

impl FormatDialectParser for PythonBraceFormatParser {
    fn dialect(&self) -> FormatDialect {
        FormatDialect::PythonBrace
    }

    fn parse(&self, text: &str) -> Result<FormatDescriptor, FormatError> {
        let bytes = text.as_bytes();
        let mut i = 0;
        let mut desc = FormatDescriptor::default();

        while i < bytes.len() {
            match bytes[i] {
                b'{' if bytes.get(i + 1) == Some(&b'{') => i += 2,
                b'}' if bytes.get(i + 1) == Some(&b'}') => i += 2,
                b'{' => {
                    i = parse_field(bytes, i + 1)?;
                    desc.directives += 1;
                }
                b'}' => {
                    return Err(FormatError::new("single '}' without matching '{'"));
                }
                _ => i += 1,
            }
        }

        Ok(desc)
    }
}

/// Parse one replacement field body starting just after `{`; returns the
/// index just after the closing `}`.
fn parse_field(bytes: &[u8], mut i: usize) -> Result<usize, FormatError> {
    // Field name: identifier or index, with .attr / [element] chains.
    while i < bytes.len() {
        match bytes[i] {
            b'}' => return Ok(i + 1),
            b'!' => {
                i += 1;
                match bytes.get(i) {
                    Some(b'r') | Some(b's') | Some(b'a') => i += 1,
                    _ => return Err(FormatError::new("invalid conversion in replacement field")),
                }
                return finish_field(bytes, i);
            }
            b':' => return finish_field(bytes, i),
            b'[' => {
                let close = bytes[i..]
                    .iter()
                    .position(|&b| b == b']')
                    .ok_or_else(|| FormatError::new("unterminated '[' in replacement field"))?;
                i += close + 1;
            }
            b'{' => return Err(FormatError::new("nested '{' in field name")),
            _ => i += 1,
        }
    }
    Err(FormatError::new("unterminated replacement field"))
}

/// Consume an optional `:format-spec` (which may itself nest one level of
/// `{...}`) up to the closing `}`.
fn finish_field(bytes: &[u8], mut i: usize) -> Result<usize, FormatError> {
    if bytes.get(i) == Some(&b':') {
        i += 1;
        let mut depth = 0usize;
        while i < bytes.len() {
            match bytes[i] {
                b'{' => {
                    depth += 1;
                    i += 1;
                }
                b'}' if depth > 0 => {
                    depth -= 1;
                    i += 1;
                }
                b'}' => return Ok(i + 1),
                _ => i += 1,
            }
        }
        return Err(FormatError::new("unterminated replacement field"));
    }
    match bytes.get(i) {
        Some(b'}') => Ok(i + 1),
        _ => Err(FormatError::new("unterminated replacement field")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directives(text: &str) -> Result<usize, FormatError> {
        PythonBraceFormatParser.parse(text).map(|d| d.directives)
    }

    #[test]
    fn counts_fields() {
        assert_eq!(directives("{} and {name}").unwrap(), 2);
    }

    #[test]
    fn attribute_and_index_access() {
        assert_eq!(directives("{user.name} {items[0]}").unwrap(), 2);
    }

    #[test]
    fn conversion_and_spec() {
        assert_eq!(directives("{value!r:>{width}}").unwrap(), 1);
    }

    #[test]
    fn doubled_braces_are_escapes() {
        assert_eq!(directives("{{literal}}").unwrap(), 0);
    }

    #[test]
    fn lone_close_brace_fails() {
        assert!(directives("oops }").is_err());
    }

    #[test]
    fn unterminated_field_fails() {
        assert!(directives("{name").is_err());
    }
}
