//! Fixed-capacity single-buffer engine.
//!
//! One byte array serves both roles: read staging (filled by a refill,
//! drained through `cursor`) and write staging (appended at `len`, drained
//! by a flush). The roles are mutually exclusive; the owning stream's
//! last-operation flag gates which interpretation is valid, and every role
//! transition passes through `reset`.
//!
//! Invariants: `cursor <= len <= capacity`; capacity is fixed at creation
//! and never resized.

/// Default buffer capacity.
pub const BUF_SIZE: usize = 4096;

/// Single staging buffer with explicit length and read cursor.
#[derive(Debug)]
pub struct StreamBuffer {
    data: Vec<u8>,
    /// Valid bytes: available to consume (read role) or pending flush
    /// (write role).
    len: usize,
    /// Next unconsumed byte. Read role only; writes always append at `len`.
    cursor: usize,
}

impl StreamBuffer {
    /// Create a buffer with the given fixed capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity.max(1)],
            len: 0,
            cursor: 0,
        }
    }

    /// Buffer capacity.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of valid bytes currently held.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no valid bytes are held.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Discard all staged state (length and cursor to zero).
    pub fn reset(&mut self) {
        self.len = 0;
        self.cursor = 0;
    }

    // -----------------------------------------------------------------------
    // Read role
    // -----------------------------------------------------------------------

    /// True when every staged byte has been consumed and a refill is due.
    pub fn exhausted(&self) -> bool {
        self.cursor >= self.len
    }

    /// The full-capacity slice a refill reads into.
    pub fn fill_target(&mut self) -> &mut [u8] {
        &mut self.data[..]
    }

    /// Record a refill of `n` bytes: cursor back to the start, `n` valid.
    pub fn adopt(&mut self, n: usize) {
        debug_assert!(n <= self.data.len());
        self.cursor = 0;
        self.len = n;
    }

    /// Consume the next staged byte, or `None` when exhausted.
    pub fn next_byte(&mut self) -> Option<u8> {
        if self.exhausted() {
            return None;
        }
        let byte = self.data[self.cursor];
        self.cursor += 1;
        Some(byte)
    }

    // -----------------------------------------------------------------------
    // Write role
    // -----------------------------------------------------------------------

    /// True when the write stage holds a full capacity's worth of bytes.
    pub fn is_full(&self) -> bool {
        self.len == self.data.len()
    }

    /// Append one byte at `len`. Returns `false` when full; the stream
    /// flushes before appending, so a full buffer here is an internal bug.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.data[self.len] = byte;
        self.len += 1;
        true
    }

    /// Bytes pending flush.
    pub fn pending(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Drop the first `n` pending bytes after a partial flush, compacting
    /// the unflushed remainder to the front so a retry resumes where the
    /// fault hit.
    pub fn drop_flushed(&mut self, n: usize) {
        debug_assert!(n <= self.len);
        let n = n.min(self.len);
        self.data.copy_within(n..self.len, 0);
        self.len -= n;
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_buffer_is_exhausted_and_empty() {
        let buf = StreamBuffer::new(16);
        assert!(buf.exhausted());
        assert!(buf.is_empty());
        assert!(!buf.is_full());
        assert_eq!(buf.capacity(), 16);
    }

    #[test]
    fn test_adopt_then_drain() {
        let mut buf = StreamBuffer::new(16);
        buf.fill_target()[..5].copy_from_slice(b"hello");
        buf.adopt(5);
        assert!(!buf.exhausted());
        let mut out = Vec::new();
        while let Some(b) = buf.next_byte() {
            out.push(b);
        }
        assert_eq!(&out, b"hello");
        assert!(buf.exhausted());
    }

    #[test]
    fn test_push_until_full() {
        let mut buf = StreamBuffer::new(4);
        for b in 0..4u8 {
            assert!(buf.push(b));
        }
        assert!(buf.is_full());
        assert!(!buf.push(99));
        assert_eq!(buf.pending(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_drop_flushed_compacts_remainder() {
        let mut buf = StreamBuffer::new(8);
        for b in b"abcdef" {
            buf.push(*b);
        }
        buf.drop_flushed(4);
        assert_eq!(buf.pending(), b"ef");
        // Retry path: the remainder can be extended and flushed again.
        buf.push(b'g');
        assert_eq!(buf.pending(), b"efg");
    }

    #[test]
    fn test_reset_clears_both_roles() {
        let mut buf = StreamBuffer::new(8);
        buf.fill_target()[..3].copy_from_slice(b"xyz");
        buf.adopt(3);
        let _ = buf.next_byte();
        buf.reset();
        assert!(buf.exhausted());
        assert!(buf.is_empty());
        assert!(buf.pending().is_empty());
    }

    #[test]
    fn test_role_transition_through_reset() {
        let mut buf = StreamBuffer::new(8);
        buf.fill_target()[..4].copy_from_slice(b"data");
        buf.adopt(4);
        let _ = buf.next_byte();
        // Switching to the write role always goes through reset, so stale
        // read bytes never show up as pending writes.
        buf.reset();
        buf.push(b'!');
        assert_eq!(buf.pending(), b"!");
    }
}
