//! Mixed-encoding string accumulator.
//!
//! String literals arrive as an arbitrary interleaving of raw source bytes
//! (whatever sat between the quotes) and explicit code points or UTF-16 units
//! produced by escape sequences. The accumulator folds that mix into one
//! canonical UTF-8 string: raw bytes are buffered and decoded through the
//! active source encoding, UTF-16 surrogate halves are paired, and anything
//! unpairable becomes U+FFFD.

use std::fmt;

/// Source encodings accepted by `--from-code`.
///
/// Charset negotiation beyond these is deliberately not part of the engine;
/// see DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceEncoding {
    Ascii,
    #[default]
    Utf8,
    Latin1,
}

impl SourceEncoding {
    /// Parse a `--from-code` argument. Names are matched case-insensitively
    /// with `-`/`_` treated alike.
    pub fn from_name(name: &str) -> Option<Self> {
        let folded: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match folded.as_str() {
            "ascii" | "usascii" => Some(Self::Ascii),
            "utf8" => Some(Self::Utf8),
            "iso88591" | "latin1" => Some(Self::Latin1),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Ascii => "ASCII",
            Self::Utf8 => "UTF-8",
            Self::Latin1 => "ISO-8859-1",
        }
    }
}

/// A byte sequence that cannot be decoded under the active source encoding.
///
/// This is the one fatal error class of the engine: without a usable
/// `--from-code` there is no sensible salvage for the rest of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingError {
    pub encoding: SourceEncoding,
    pub bytes: Vec<u8>,
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid or incomplete {} byte sequence: ",
            self.encoding.name()
        )?;
        for (i, b) in self.bytes.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "0x{:02X}", b)?;
        }
        write!(f, " (try specifying --from-code)")
    }
}

impl std::error::Error for EncodingError {}

const fn is_high_surrogate(unit: u16) -> bool {
    unit >= 0xD800 && unit <= 0xDBFF
}

const fn is_low_surrogate(unit: u16) -> bool {
    unit >= 0xDC00 && unit <= 0xDFFF
}

/// Accepts a Unicode scalar value, i.e. excludes the surrogate range.
pub const fn is_valid_scalar(v: u32) -> bool {
    v <= 0x10_FFFF && !(v >= 0xD800 && v <= 0xDFFF)
}

/// Builds one UTF-8 string from mixed raw-byte / code-point input.
///
/// Invariant: pending raw bytes and a pending high surrogate never coexist.
/// Appending a code point flushes pending bytes first; appending a raw byte
/// flushes a pending surrogate first (as U+FFFD, since an unpaired surrogate
/// is invalid on its own).
#[derive(Debug)]
pub struct StringAccumulator {
    out: String,
    pending_bytes: Vec<u8>,
    pending_surrogate: Option<u16>,
    encoding: SourceEncoding,
}

impl StringAccumulator {
    pub fn new(encoding: SourceEncoding) -> Self {
        Self {
            out: String::new(),
            pending_bytes: Vec::new(),
            pending_surrogate: None,
            encoding,
        }
    }

    /// Append one raw source byte.
    pub fn push_byte(&mut self, b: u8) {
        self.flush_surrogate();
        self.pending_bytes.push(b);
    }

    /// Append an already-decoded code point (from an escape like `\n` or
    /// `\UXXXXXXXX`). Fails only if buffered raw bytes turn out undecodable.
    pub fn push_char(&mut self, c: char) -> Result<(), EncodingError> {
        self.flush_bytes()?;
        self.flush_surrogate();
        self.out.push(c);
        Ok(())
    }

    /// Append one UTF-16 code unit (from a `\uXXXX` escape), pairing
    /// surrogate halves. A lone or mismatched half becomes U+FFFD.
    pub fn push_unit(&mut self, unit: u16) -> Result<(), EncodingError> {
        self.flush_bytes()?;
        if is_high_surrogate(unit) {
            self.flush_surrogate();
            self.pending_surrogate = Some(unit);
        } else if is_low_surrogate(unit) {
            match self.pending_surrogate.take() {
                Some(high) => {
                    let v = 0x10000
                        + (((high as u32) - 0xD800) << 10)
                        + ((unit as u32) - 0xDC00);
                    // Pair arithmetic cannot leave the scalar range.
                    self.out.push(char::from_u32(v).unwrap_or('\u{FFFD}'));
                }
                None => self.out.push('\u{FFFD}'),
            }
        } else {
            self.flush_surrogate();
            // A BMP unit outside the surrogate range is a scalar.
            self.out.push(char::from_u32(unit as u32).unwrap_or('\u{FFFD}'));
        }
        Ok(())
    }

    /// Append a full scalar value, or U+FFFD if `v` is not one. Returns
    /// whether the value was valid so the caller can warn.
    pub fn push_scalar(&mut self, v: u32) -> Result<bool, EncodingError> {
        self.flush_bytes()?;
        self.flush_surrogate();
        match char::from_u32(v).filter(|_| is_valid_scalar(v)) {
            Some(c) => {
                self.out.push(c);
                Ok(true)
            }
            None => {
                self.out.push('\u{FFFD}');
                Ok(false)
            }
        }
    }

    /// Finish the literal, flushing whatever is still pending.
    pub fn finish(mut self) -> Result<String, EncodingError> {
        self.flush_bytes()?;
        self.flush_surrogate();
        Ok(self.out)
    }

    fn flush_surrogate(&mut self) {
        if self.pending_surrogate.take().is_some() {
            self.out.push('\u{FFFD}');
        }
    }

    fn flush_bytes(&mut self) -> Result<(), EncodingError> {
        if self.pending_bytes.is_empty() {
            return Ok(());
        }
        let bytes = std::mem::take(&mut self.pending_bytes);
        match self.encoding {
            SourceEncoding::Ascii => {
                if let Some(&bad) = bytes.iter().find(|b| !b.is_ascii()) {
                    return Err(EncodingError {
                        encoding: self.encoding,
                        bytes: vec![bad],
                    });
                }
                // Pure ASCII is valid UTF-8 as-is.
                self.out.push_str(std::str::from_utf8(&bytes).unwrap_or(""));
            }
            SourceEncoding::Utf8 => match std::str::from_utf8(&bytes) {
                Ok(s) => self.out.push_str(s),
                Err(e) => {
                    let at = e.valid_up_to();
                    return Err(EncodingError {
                        encoding: self.encoding,
                        bytes: bytes[at..].iter().take(4).copied().collect(),
                    });
                }
            },
            SourceEncoding::Latin1 => {
                // Every Latin-1 byte maps 1:1 onto U+0000..U+00FF.
                self.out.extend(bytes.iter().map(|&b| b as char));
            }
        }
        Ok(())
    }
}
