//! Minimal python-format (%-style) recognizer.

use super::{FormatDescriptor, FormatDialect, FormatDialectParser, FormatError};

pub struct PythonFormatParser;

const CONVERSIONS: &[u8] = b"diouxXeEfFgGcrsa";

impl FormatDialectParser for PythonFormatParser {
    fn dialect(&self) -> FormatDialect {
        FormatDialect::Python
    }

    fn parse(&self, text: &str) -> Result<FormatDescriptor, FormatError> {
        let bytes = text.as_bytes();
        let mut i = 0;
        let mut desc = FormatDescriptor::default();

        while i < bytes.len() {
            if bytes[i] != b'%' {
                i += 1;
                continue;
            }
            i += 1;
            if i >= bytes.len() {
                return Err(FormatError::new("string ends in the middle of a directive"));
            }
            if bytes[i] == b'%' {
                i += 1;
                continue;
            }

            // Optional mapping key: %(name)s.
            if bytes[i] == b'(' {
                let close = bytes[i..]
                    .iter()
                    .position(|&b| b == b')')
                    .ok_or_else(|| FormatError::new("unterminated mapping key"))?;
                i += close + 1;
            }

            while i < bytes.len() && matches!(bytes[i], b'-' | b'+' | b' ' | b'#' | b'0') {
                i += 1;
            }
            if bytes.get(i) == Some(&b'*') {
                i += 1;
            } else {
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
            }
            if bytes.get(i) == Some(&b'.') {
                i += 1;
                if bytes.get(i) == Some(&b'*') {
                    i += 1;
                } else {
                    while i < bytes.len() && bytes[i].is_ascii_digit() {
                        i += 1;
                    }
                }
            }
            if matches!(bytes.get(i), Some(b'h') | Some(b'l') | Some(b'L')) {
                i += 1;
            }

            match bytes.get(i) {
                Some(c) if CONVERSIONS.contains(c) => {
                    desc.directives += 1;
                    i += 1;
                }
                Some(c) => {
                    return Err(FormatError::new(format!(
                        "invalid conversion specifier '{}'",
                        *c as char
                    )));
                }
                None => {
                    return Err(FormatError::new("string ends in the middle of a directive"));
                }
            }
        }

        Ok(desc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directives(text: &str) -> Result<usize, FormatError> {
        PythonFormatParser.parse(text).map(|d| d.directives)
    }

    #[test]
    fn counts_named_and_positional() {
        assert_eq!(directives("%(count)d of %s").unwrap(), 2);
    }

    #[test]
    fn double_percent_is_not_a_directive() {
        assert_eq!(directives("%%").unwrap(), 0);
    }

    #[test]
    fn repr_conversion_is_valid() {
        assert_eq!(directives("value: %r").unwrap(), 1);
    }

    #[test]
    fn unterminated_mapping_key_fails() {
        assert!(directives("%(name").is_err());
    }

    #[test]
    fn invalid_conversion_fails() {
        assert!(directives("%q").is_err());
    }
}
