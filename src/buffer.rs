use crate::{Error, Result};

/// Capacity of the read window when nothing else is configured.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Bounded byte window between a stream and the request parser.
///
/// Bytes are read into the spare tail, the parser is shown the filled
/// prefix, and whatever it consumed is slid out from the front so the
/// unconsumed remainder always starts at offset zero.
#[derive(Debug)]
pub struct ReadBuffer {
    buf: Vec<u8>,
    len: usize,
    max_size: usize,
}

impl ReadBuffer {
    /// A window that never grows past `size` bytes.
    pub fn new(size: usize) -> Self {
        Self::with_limit(size, size)
    }

    /// A window starting at `size` bytes that may double up to `max_size`.
    pub fn with_limit(size: usize, max_size: usize) -> Self {
        let size = size.max(1);
        Self {
            buf: vec![0; size],
            len: 0,
            max_size: max_size.max(size),
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.buf.len()
    }

    /// Bytes read but not yet consumed.
    pub fn filled(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Free space at the tail of the window, growing it first if it is full.
    ///
    /// Fails with [`Error::BufferFull`] when the window is full and already
    /// at its limit.
    pub fn spare_mut(&mut self) -> Result<&mut [u8]> {
        if self.is_full() {
            self.grow()?;
        }
        Ok(&mut self.buf[self.len..])
    }

    /// Marks `n` bytes of the spare tail as filled.
    pub fn advance(&mut self, n: usize) {
        debug_assert!(self.len + n <= self.buf.len());
        self.len = (self.len + n).min(self.buf.len());
    }

    /// Drops `n` bytes from the front and slides the remainder left.
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.len);
        if n == 0 {
            return;
        }
        self.buf.copy_within(n..self.len, 0);
        self.len -= n;
    }

    fn grow(&mut self) -> Result<()> {
        let current = self.buf.len();
        if current >= self.max_size {
            return Err(Error::BufferFull(current));
        }
        let new_size = current.saturating_mul(2).min(self.max_size);
        log::debug!("growing read buffer from {current} to {new_size} bytes");
        self.buf.resize(new_size, 0);
        Ok(())
    }
}

impl Default for ReadBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE)
    }
}

#[test]
fn test_read_buffer_slide() {
    let mut buffer = ReadBuffer::new(8);
    let spare = buffer.spare_mut().unwrap();
    assert_eq!(spare.len(), 8);
    spare[..5].copy_from_slice(b"hello");
    buffer.advance(5);
    assert_eq!(buffer.filled(), b"hello");

    buffer.consume(2);
    assert_eq!(buffer.filled(), b"llo");
    assert_eq!(buffer.spare_mut().unwrap().len(), 5);

    buffer.consume(10);
    assert!(buffer.is_empty());
}

#[test]
fn test_read_buffer_full() {
    let mut buffer = ReadBuffer::new(4);
    buffer.spare_mut().unwrap().copy_from_slice(b"abcd");
    buffer.advance(4);
    assert!(buffer.is_full());
    assert!(matches!(buffer.spare_mut(), Err(Error::BufferFull(4))));
}

#[test]
fn test_read_buffer_grow() {
    let mut buffer = ReadBuffer::with_limit(4, 10);
    buffer.spare_mut().unwrap().copy_from_slice(b"abcd");
    buffer.advance(4);
    assert_eq!(buffer.spare_mut().unwrap().len(), 4);
    assert_eq!(buffer.capacity(), 8);
    buffer.advance(4);
    assert_eq!(buffer.spare_mut().unwrap().len(), 2);
    assert_eq!(buffer.capacity(), 10);
    buffer.advance(2);
    assert!(matches!(buffer.spare_mut(), Err(Error::BufferFull(10))));
    assert_eq!(&buffer.filled()[..4], b"abcd");
}
