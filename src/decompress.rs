//! Decompression capability used for compressed message payloads.

use bytes::Bytes;

use crate::status::Status;

/// Bounded decompression of a single message payload.
///
/// The deframing layer borrows this capability: it never constructs a
/// decompressor and never tears one down. Whoever constructed the
/// decompressor must call [`Decompressor::end`] once the stream is done
/// with it. One instance may be reused across messages within a stream.
pub trait Decompressor {
    /// Decompress `input`, producing at most `limit` output bytes.
    ///
    /// Implementations must refuse to produce more than `limit` bytes and
    /// return `Status::resource_exhausted` in that case. Any other failure
    /// (corrupt or truncated input) surfaces as the implementation's own
    /// status and is passed to the caller unchanged.
    fn decompress(&mut self, input: &[u8], limit: usize) -> Result<Bytes, Status>;

    /// Release resources held by the decompressor.
    ///
    /// Must be called by the owner before the decompressor is dropped.
    fn end(&mut self);
}
