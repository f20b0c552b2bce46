//! Growable byte buffer with append and front-consume.
//!
//! # Design
//! The request serializer, the response parser and the JSON assembler all
//! work on `ByteBuffer`. Unread bytes live in `data[start..]`: `read` only
//! advances `start`, and the consumed prefix is dropped once it passes
//! `COMPACT_THRESHOLD` and makes up at least half of the storage (or for free
//! when everything has been consumed). Growth is fallible so allocation
//! failures surface as `BufferError` instead of aborting.

use std::fmt::{self, Write as _};

use crate::error::BufferError;

const COMPACT_THRESHOLD: usize = 4096;

/// Owned, contiguous, growable byte region with a read offset.
#[derive(Debug, Default, Clone)]
pub struct ByteBuffer {
    data: Vec<u8>,
    start: usize,
}

impl ByteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty buffer with room for at least `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Result<Self, BufferError> {
        let mut buffer = Self::new();
        buffer.reserve(capacity)?;
        Ok(buffer)
    }

    /// Number of unread bytes.
    pub fn len(&self) -> usize {
        self.data.len() - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes the buffer can hold, unread bytes included, without reallocating.
    pub fn capacity(&self) -> usize {
        self.data.capacity() - self.start
    }

    /// The unread bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.start..]
    }

    /// Guarantee room for `additional` more bytes.
    ///
    /// Grows to `max(2 * len, len + additional)`. Never shrinks.
    pub fn reserve(&mut self, additional: usize) -> Result<(), BufferError> {
        let needed = self
            .len()
            .checked_add(additional)
            .ok_or(BufferError::AllocationFailed { requested: usize::MAX })?;
        if needed <= self.capacity() {
            return Ok(());
        }

        self.compact();
        if needed <= self.data.capacity() {
            return Ok(());
        }

        let target = needed.max(self.data.len().saturating_mul(2));
        self.data
            .try_reserve_exact(target - self.data.len())
            .map_err(|_| BufferError::AllocationFailed { requested: target })
    }

    /// Append raw bytes. Empty input is a no-op.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.reserve(bytes.len())?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Append formatted text, e.g. `buf.print(format_args!("{n}\r\n"))`.
    ///
    /// The text is measured first, then rendered into reserved space. If the
    /// formatting itself fails the buffer is left as it was.
    pub fn print(&mut self, args: fmt::Arguments<'_>) -> Result<(), BufferError> {
        let mut counter = Counter(0);
        counter.write_fmt(args).map_err(|_| BufferError::Format)?;
        self.reserve(counter.0)?;

        let mark = self.data.len();
        let rendered = Sink(&mut self.data).write_fmt(args);
        if rendered.is_err() {
            self.data.truncate(mark);
            return Err(BufferError::Format);
        }
        Ok(())
    }

    /// Consume `n` bytes from the front.
    pub fn read(&mut self, n: usize) -> Result<(), BufferError> {
        let available = self.len();
        if n > available {
            return Err(BufferError::Underflow {
                requested: n,
                available,
            });
        }
        self.advance(n);
        Ok(())
    }

    /// Take the next `\r\n`-terminated line, without its terminator.
    ///
    /// Returns `None` (consuming nothing) when no complete line is buffered.
    pub fn read_line(&mut self) -> Option<Vec<u8>> {
        let unread = self.as_slice();
        let end = unread.windows(2).position(|w| w == b"\r\n")?;
        let line = unread[..end].to_vec();
        self.advance(end + 2);
        Some(line)
    }

    /// Drop every unread byte.
    pub fn clear(&mut self) {
        self.data.clear();
        self.start = 0;
    }

    /// Take the unread bytes out of the buffer.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.compact();
        self.data
    }

    fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.len());
        self.start += n;
        if self.start == self.data.len() {
            self.clear();
        } else if self.start >= COMPACT_THRESHOLD && self.start * 2 >= self.data.len() {
            self.compact();
        }
    }

    fn compact(&mut self) {
        if self.start > 0 {
            self.data.drain(..self.start);
            self.start = 0;
        }
    }
}

struct Counter(usize);

impl fmt::Write for Counter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

struct Sink<'a>(&'a mut Vec<u8>);

impl fmt::Write for Sink<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl fmt::Display for Broken {
        fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn oversized_reserve_fails_and_keeps_contents() {
        let mut buf = ByteBuffer::new();
        buf.write(b"abc").unwrap();
        let err = buf.reserve(usize::MAX - 10).unwrap_err();
        assert!(matches!(err, BufferError::AllocationFailed { .. }), "{err:?}");
        assert_eq!(buf.as_slice(), b"abc");

        buf.write(b"d").unwrap();
        assert_eq!(buf.as_slice(), b"abcd");
    }

    #[test]
    fn reserve_length_overflow_is_an_allocation_error() {
        let mut buf = ByteBuffer::new();
        buf.write(b"abc").unwrap();
        assert_eq!(
            buf.reserve(usize::MAX),
            Err(BufferError::AllocationFailed { requested: usize::MAX })
        );
        assert_eq!(buf.as_slice(), b"abc");
    }

    #[test]
    fn with_capacity_reports_allocation_failure() {
        let err = ByteBuffer::with_capacity(usize::MAX).unwrap_err();
        assert!(matches!(err, BufferError::AllocationFailed { .. }));
    }

    #[test]
    fn new_buffer_is_empty() {
        let buf = ByteBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.as_slice(), b"");
    }

    #[test]
    fn read_leaves_the_remaining_suffix() {
        let data = b"HTTP/1.0 200 OK\r\n";
        for k in 0..=data.len() {
            let mut buf = ByteBuffer::new();
            buf.write(data).unwrap();
            buf.read(k).unwrap();
            assert_eq!(buf.as_slice(), &data[k..], "k = {k}");
            assert_eq!(buf.len(), data.len() - k);
        }
    }

    #[test]
    fn read_past_end_is_rejected() {
        let mut buf = ByteBuffer::new();
        buf.write(b"abc").unwrap();
        let err = buf.read(4).unwrap_err();
        assert_eq!(err, BufferError::Underflow { requested: 4, available: 3 });
        assert_eq!(buf.as_slice(), b"abc");
    }

    #[test]
    fn empty_write_is_a_noop() {
        let mut buf = ByteBuffer::new();
        buf.write(b"").unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 0);
    }

    #[test]
    fn reserve_never_shrinks() {
        let mut buf = ByteBuffer::with_capacity(64).unwrap();
        let before = buf.capacity();
        buf.reserve(1).unwrap();
        assert!(buf.capacity() >= before);
        buf.reserve(0).unwrap();
        assert!(buf.capacity() >= before);
    }

    #[test]
    fn growth_at_least_doubles() {
        let mut buf = ByteBuffer::with_capacity(100).unwrap();
        buf.write(&[7u8; 100]).unwrap();
        buf.reserve(1).unwrap();
        assert!(buf.capacity() >= 200);
        buf.reserve(1000).unwrap();
        assert!(buf.capacity() >= 1100);
    }

    #[test]
    fn print_appends_formatted_text() {
        let mut buf = ByteBuffer::new();
        buf.print(format_args!("{} {} HTTP/1.0\r\n", "GET", "/index")).unwrap();
        buf.print(format_args!("Content-Length: {}\r\n", 0)).unwrap();
        assert_eq!(buf.as_slice(), b"GET /index HTTP/1.0\r\nContent-Length: 0\r\n");
    }

    #[test]
    fn failed_print_leaves_buffer_unchanged() {
        let mut buf = ByteBuffer::new();
        buf.write(b"keep").unwrap();
        let err = buf.print(format_args!("x{}", Broken)).unwrap_err();
        assert_eq!(err, BufferError::Format);
        assert_eq!(buf.as_slice(), b"keep");
    }

    #[test]
    fn read_line_waits_for_terminator() {
        let mut buf = ByteBuffer::new();
        buf.write(b"Server: x\r").unwrap();
        assert_eq!(buf.read_line(), None);
        assert_eq!(buf.len(), 10);

        buf.write(b"\n\r\nrest").unwrap();
        assert_eq!(buf.read_line().unwrap(), b"Server: x");
        assert_eq!(buf.read_line().unwrap(), b"");
        assert_eq!(buf.read_line(), None);
        assert_eq!(buf.as_slice(), b"rest");
    }

    #[test]
    fn compaction_preserves_unread_bytes() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        let mut buf = ByteBuffer::new();
        buf.write(&data).unwrap();
        buf.read(12_000).unwrap();
        assert_eq!(buf.as_slice(), &data[12_000..]);

        buf.write(b"tail").unwrap();
        let mut expected = data[12_000..].to_vec();
        expected.extend_from_slice(b"tail");
        assert_eq!(buf.into_vec(), expected);
    }

    #[test]
    fn consuming_everything_resets_offset() {
        let mut buf = ByteBuffer::new();
        buf.write(b"abc").unwrap();
        buf.read(3).unwrap();
        assert!(buf.is_empty());
        buf.write(b"de").unwrap();
        assert_eq!(buf.as_slice(), b"de");
    }
}
