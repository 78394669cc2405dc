//! Sequential byte input with pushback.
//!
//! The extractor contract forbids seeking: scanners read forward one byte at
//! a time and may push a bounded number of bytes back. That is all this
//! wrapper offers.

use std::io::{self, Read};

const CHUNK: usize = 8192;

pub struct ByteStream {
    inner: Box<dyn Read>,
    buf: Vec<u8>,
    pos: usize,
    pushback: Vec<u8>,
    eof: bool,
}

impl ByteStream {
    pub fn new(inner: Box<dyn Read>) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            pos: 0,
            pushback: Vec::new(),
            eof: false,
        }
    }

    /// Next byte, or `None` at end of input (idempotent).
    pub fn next(&mut self) -> io::Result<Option<u8>> {
        if let Some(b) = self.pushback.pop() {
            return Ok(Some(b));
        }
        if self.pos >= self.buf.len() {
            if self.eof {
                return Ok(None);
            }
            self.buf.resize(CHUNK, 0);
            let n = self.inner.read(&mut self.buf)?;
            self.buf.truncate(n);
            self.pos = 0;
            if n == 0 {
                self.eof = true;
                return Ok(None);
            }
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(Some(b))
    }

    /// Push one byte back; it is returned by the next `next` call.
    pub fn unread(&mut self, byte: u8) {
        self.pushback.push(byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn stream(bytes: &[u8]) -> ByteStream {
        ByteStream::new(Box::new(Cursor::new(bytes.to_vec())))
    }

    #[test]
    fn reads_in_order_and_eof_is_idempotent() {
        let mut s = stream(b"ab");
        assert_eq!(s.next().unwrap(), Some(b'a'));
        assert_eq!(s.next().unwrap(), Some(b'b'));
        assert_eq!(s.next().unwrap(), None);
        assert_eq!(s.next().unwrap(), None);
    }

    #[test]
    fn pushback_is_lifo() {
        let mut s = stream(b"c");
        s.unread(b'b');
        s.unread(b'a');
        assert_eq!(s.next().unwrap(), Some(b'a'));
        assert_eq!(s.next().unwrap(), Some(b'b'));
        assert_eq!(s.next().unwrap(), Some(b'c'));
    }
}
