//! Minimal c-format recognizer, enough for the extraction heuristic.

use super::{FormatDescriptor, FormatDialect, FormatDialectParser, FormatError};

pub struct CFormatParser;

const CONVERSIONS: &[u8] = b"diouxXeEfFgGaAcspnCSm";

impl FormatDialectParser for CFormatParser {
    fn dialect(&self) -> FormatDialect {
        FormatDialect::C
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

            // Optional POSIX argument position: digits followed by '$'.
            let digits_end = skip_digits(bytes, i);
            if digits_end > i && bytes.get(digits_end) == Some(&b'$') {
                i = digits_end + 1;
            }

            while i < bytes.len() && matches!(bytes[i], b'-' | b'+' | b' ' | b'#' | b'0' | b'\'' | b'I')
            {
                i += 1;
            }

            // Width: digits or '*' (itself optionally position-numbered).
            if bytes.get(i) == Some(&b'*') {
                i += 1;
                let d = skip_digits(bytes, i);
                if d > i && bytes.get(d) == Some(&b'$') {
                    i = d + 1;
                }
            } else {
                i = skip_digits(bytes, i);
            }

            if bytes.get(i) == Some(&b'.') {
                i += 1;
                if bytes.get(i) == Some(&b'*') {
                    i += 1;
                    let d = skip_digits(bytes, i);
                    if d > i && bytes.get(d) == Some(&b'$') {
                        i = d + 1;
                    }
                } else {
                    i = skip_digits(bytes, i);
                }
            }

            // Length modifier.
            match bytes.get(i) {
                Some(b'h') => {
                    i += 1;
                    if bytes.get(i) == Some(&b'h') {
                        i += 1;
                    }
                }
                Some(b'l') => {
                    i += 1;
                    if bytes.get(i) == Some(&b'l') {
                        i += 1;
                    }
                }
                Some(b'L') | Some(b'q') | Some(b'j') | Some(b'z') | Some(b'Z') | Some(b't') => {
                    i += 1;
                }
                _ => {}
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

fn skip_digits(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directives(text: &str) -> Result<usize, FormatError> {
        CFormatParser.parse(text).map(|d| d.directives)
    }

    #[test]
    fn counts_simple_conversions() {
        assert_eq!(directives("%d files in %s").unwrap(), 2);
    }

    #[test]
    fn double_percent_is_not_a_directive() {
        assert_eq!(directives("100%% done").unwrap(), 0);
    }

    #[test]
    fn full_specifier_syntax() {
        assert_eq!(directives("%2$-08.3llf and %1$*d").unwrap(), 2);
    }

    #[test]
    fn glibc_m_counts() {
        assert_eq!(directives("open failed: %m").unwrap(), 1);
    }

    #[test]
    fn invalid_conversion_is_an_error() {
        assert!(directives("hello %y").is_err());
    }

    #[test]
    fn trailing_percent_is_an_error() {
        assert!(directives("50%").is_err());
    }
}
