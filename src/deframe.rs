//! Stateful reassembly of gRPC messages from transport chunks.

use bytes::Bytes;

use crate::buffer::RecvBuffer;
use crate::decompress::Decompressor;
use crate::frame::FrameDecoder;
use crate::status::Status;

/// Consumed prefixes smaller than this are never worth a memmove.
const COMPACTION_THRESHOLD: usize = 1024;

/// Reassembles gRPC messages from arbitrarily chunked bytes.
///
/// One deframer serves one stream. The transport appends chunks as they
/// arrive; the RPC layer drains complete messages. Chunk boundaries need
/// not align with message boundaries.
///
/// The internal buffer holds a read cursor rather than discarding consumed
/// bytes eagerly. The consumed prefix is reclaimed once it exceeds both a
/// fixed floor (1024 bytes) and half the buffer's capacity, which keeps the
/// bytes moved per message amortised O(1) under steady-state streaming
/// while leaving small or mostly-unread buffers alone.
pub struct Deframer {
    decoder: FrameDecoder,
    buffer: RecvBuffer,
}

impl Default for Deframer {
    fn default() -> Self {
        Self::from_decoder(FrameDecoder::new())
    }
}

impl Deframer {
    /// Create a deframer with the given payload size limit and no
    /// decompressor.
    pub fn new(max_payload_size: usize) -> Self {
        Self::from_decoder(FrameDecoder::with_max_payload_size(max_payload_size))
    }

    /// Create a deframer that dispatches compressed messages to
    /// `decompressor`.
    pub fn with_decompressor(max_payload_size: usize, decompressor: Box<dyn Decompressor>) -> Self {
        let mut decoder = FrameDecoder::with_max_payload_size(max_payload_size);
        decoder.set_decompressor(decompressor);
        Self::from_decoder(decoder)
    }

    fn from_decoder(decoder: FrameDecoder) -> Self {
        Self {
            decoder,
            buffer: RecvBuffer::new(),
        }
    }

    /// Append a chunk received from the transport. Never fails.
    pub fn append(&mut self, chunk: &[u8]) {
        if self.buffer.is_empty() {
            // Everything buffered has been consumed; rewind and reuse the
            // allocation.
            self.buffer.clear();
        } else {
            let consumed = self.buffer.consumed();
            if consumed > COMPACTION_THRESHOLD && consumed > self.buffer.capacity() / 2 {
                self.buffer.compact();
            }
        }

        self.buffer.extend_from_slice(chunk);
    }

    /// Try to produce the next complete message.
    ///
    /// Returns `Ok(None)` when the buffer is empty or holds only part of a
    /// message. Errors propagate verbatim from the decoder and are fatal
    /// for the stream: gRPC framing has no resynchronisation point.
    pub fn decode_next(&mut self) -> Result<Option<Bytes>, Status> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        self.decoder.decode(&mut self.buffer)
    }

    /// Decode messages into `sink` until no complete message remains.
    pub fn drain_into(&mut self, sink: &mut Vec<Bytes>) -> Result<(), Status> {
        while let Some(message) = self.decode_next()? {
            sink.push(message);
        }
        Ok(())
    }

    /// Check if there is any buffered data awaiting decode.
    pub fn has_buffered_data(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Get the amount of buffered data awaiting decode.
    pub fn buffered_len(&self) -> usize {
        self.buffer.readable()
    }

    /// Get the capacity of the internal buffer.
    pub fn buffer_capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Mutable access to the decompressor, if configured.
    pub fn decompressor_mut(&mut self) -> Option<&mut dyn Decompressor> {
        self.decoder.decompressor_mut()
    }
}
