//! Receive-side byte buffer with an explicit read cursor.
//!
//! Transport chunks are appended at the tail; the decoder consumes from the
//! head by advancing the read cursor. Consumed bytes stay in place until
//! [`RecvBuffer::compact`] moves the unread region back to offset 0.

/// Growable byte buffer that tracks a read position.
///
/// Bytes before the read position have been consumed; bytes at or after it
/// are still pending. Compaction reclaims the consumed prefix without
/// reallocating.
#[derive(Debug, Default)]
pub struct RecvBuffer {
    data: Vec<u8>,
    read_pos: usize,
}

impl RecvBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            read_pos: 0,
        }
    }

    /// Create an empty buffer with the given initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            read_pos: 0,
        }
    }

    /// Returns the number of bytes available to read.
    #[inline]
    pub fn readable(&self) -> usize {
        self.data.len() - self.read_pos
    }

    /// Returns true if there is no data to read.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.read_pos == self.data.len()
    }

    /// Returns a slice of the readable data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.read_pos..]
    }

    /// Returns the size of the consumed prefix (the read position).
    #[inline]
    pub fn consumed(&self) -> usize {
        self.read_pos
    }

    /// Returns the total capacity of the underlying allocation.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Advances the read position, consuming data.
    ///
    /// # Panics
    /// Panics if `n` exceeds the readable bytes.
    #[inline]
    pub fn consume(&mut self, n: usize) {
        assert!(n <= self.readable(), "consume exceeds readable bytes");
        self.read_pos += n;
    }

    /// Compacts the buffer by moving unread data to the start.
    ///
    /// This reclaims space from consumed data without allocating.
    pub fn compact(&mut self) {
        if self.read_pos == 0 {
            return;
        }

        let len = self.data.len();
        self.data.copy_within(self.read_pos..len, 0);
        self.data.truncate(len - self.read_pos);
        self.read_pos = 0;
    }

    /// Discards all data and rewinds the read position, keeping the
    /// allocation for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
        self.read_pos = 0;
    }

    /// Appends bytes after the readable region, growing as needed.
    #[inline]
    pub fn extend_from_slice(&mut self, chunk: &[u8]) {
        self.data.extend_from_slice(chunk);
    }
}
