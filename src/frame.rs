//! gRPC message framing.
//!
//! Messages are length-prefixed on the wire:
//! - 1 byte: compression flag (0 = uncompressed, 1 = compressed)
//! - 4 bytes: payload length (big-endian u32)
//! - N bytes: payload

use bytes::{BufMut, Bytes, BytesMut};

use crate::buffer::RecvBuffer;
use crate::decompress::Decompressor;
use crate::status::Status;

/// Size of the gRPC message header (1 byte flag + 4 bytes length).
pub const HEADER_SIZE: usize = 5;

/// Default maximum payload size (4MB, matches the gRPC default).
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 4 * 1024 * 1024;

/// Encode a message into gRPC wire format.
///
/// Returns the encoded message with the length prefix.
pub fn encode_message(data: &[u8]) -> Bytes {
    encode_message_with_compression(data, false)
}

/// Encode a message with explicit compression flag.
pub fn encode_message_with_compression(data: &[u8], compressed: bool) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + data.len());

    buf.put_u8(if compressed { 1 } else { 0 });
    buf.put_u32(data.len() as u32);
    buf.put_slice(data);

    buf.freeze()
}

/// Single-step decoder for gRPC messages.
///
/// Attempts to parse exactly one message at the buffer's read cursor.
/// Carries no per-message state; the mutable state is the buffer owned by
/// the caller.
pub struct FrameDecoder {
    max_payload_size: usize,
    decompressor: Option<Box<dyn Decompressor>>,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Create a decoder with the default payload size limit and no
    /// decompressor.
    pub fn new() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            decompressor: None,
        }
    }

    /// Create a decoder with the given payload size limit.
    pub fn with_max_payload_size(max_payload_size: usize) -> Self {
        Self {
            max_payload_size,
            decompressor: None,
        }
    }

    /// Set the decompressor used for messages with the compression flag.
    pub fn set_decompressor(&mut self, decompressor: Box<dyn Decompressor>) {
        self.decompressor = Some(decompressor);
    }

    /// Get the configured payload size limit.
    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }

    /// Mutable access to the decompressor, if configured.
    ///
    /// The owner uses this to reach the decompressor for teardown; the
    /// decoder never calls [`Decompressor::end`] itself.
    pub fn decompressor_mut(&mut self) -> Option<&mut (dyn Decompressor + '_)> {
        match &mut self.decompressor {
            Some(d) => Some(d.as_mut()),
            None => None,
        }
    }

    /// Try to decode one message at the buffer's read cursor.
    ///
    /// Returns `Ok(Some(payload))` with the (decompressed) payload and the
    /// cursor advanced past the message, or `Ok(None)` if more data is
    /// needed, with the cursor exactly where it was. The declared length is
    /// checked against the limit before the payload bytes are required, so
    /// an oversized message fails without waiting for (or allocating) its
    /// payload.
    pub fn decode(&mut self, buf: &mut RecvBuffer) -> Result<Option<Bytes>, Status> {
        let readable = buf.as_slice();
        if readable.len() < HEADER_SIZE {
            return Ok(None);
        }

        // Flag values other than 1 are treated as uncompressed; algorithm
        // selection lives in the grpc-encoding header, not in this byte.
        let compressed = readable[0] == 1;
        let length = u32::from_be_bytes([readable[1], readable[2], readable[3], readable[4]])
            as usize;

        if length > self.max_payload_size {
            return Err(Status::resource_exhausted(format!(
                "message length {} exceeds maximum payload size {}",
                length, self.max_payload_size
            )));
        }

        if readable.len() < HEADER_SIZE + length {
            return Ok(None);
        }

        let payload = Bytes::copy_from_slice(&readable[HEADER_SIZE..HEADER_SIZE + length]);
        buf.consume(HEADER_SIZE + length);

        if !compressed {
            return Ok(Some(payload));
        }

        match self.decompressor.as_mut() {
            None => Err(Status::internal(
                "compressed message received but no decompressor is configured",
            )),
            Some(decompressor) => decompressor
                .decompress(&payload, self.max_payload_size)
                .map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Code;

    /// Decompressor that reverses its input, recording the limit it saw.
    struct Reverser {
        last_limit: std::rc::Rc<std::cell::Cell<usize>>,
    }

    impl Reverser {
        fn new() -> Self {
            Self {
                last_limit: Default::default(),
            }
        }
    }

    impl Decompressor for Reverser {
        fn decompress(&mut self, input: &[u8], limit: usize) -> Result<Bytes, Status> {
            self.last_limit.set(limit);
            let mut out = input.to_vec();
            out.reverse();
            Ok(Bytes::from(out))
        }

        fn end(&mut self) {}
    }

    /// Decompressor that always fails with its own status.
    struct Corrupt;

    impl Decompressor for Corrupt {
        fn decompress(&mut self, _input: &[u8], _limit: usize) -> Result<Bytes, Status> {
            Err(Status::new(Code::DataLoss, "corrupt deflate stream"))
        }

        fn end(&mut self) {}
    }

    fn buffer_with(data: &[u8]) -> RecvBuffer {
        let mut buf = RecvBuffer::new();
        buf.extend_from_slice(data);
        buf
    }

    #[test]
    fn test_encode_empty_message() {
        let encoded = encode_message(&[]);
        assert_eq!(&encoded[..], &[0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_encode_message() {
        let data = b"hello world";
        let encoded = encode_message(data);

        assert_eq!(encoded.len(), HEADER_SIZE + data.len());
        assert_eq!(encoded[0], 0);
        assert_eq!(
            u32::from_be_bytes([encoded[1], encoded[2], encoded[3], encoded[4]]),
            data.len() as u32
        );
        assert_eq!(&encoded[HEADER_SIZE..], data);
    }

    #[test]
    fn test_encode_compressed() {
        let encoded = encode_message_with_compression(b"test", true);
        assert_eq!(encoded[0], 1);
    }

    #[test]
    fn test_decode_complete_message() {
        let mut buf = buffer_with(&encode_message(b"hello world"));
        let mut decoder = FrameDecoder::new();

        let payload = decoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&payload[..], b"hello world");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_empty_message() {
        let mut buf = buffer_with(&[0, 0, 0, 0, 0]);
        let mut decoder = FrameDecoder::new();

        let payload = decoder.decode(&mut buf).unwrap().unwrap();
        assert!(payload.is_empty());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_incomplete_header_leaves_cursor() {
        let mut buf = buffer_with(&[0, 0, 0]);
        let mut decoder = FrameDecoder::new();

        assert!(decoder.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.consumed(), 0);
        assert_eq!(buf.readable(), 3);
    }

    #[test]
    fn test_decode_incomplete_payload_leaves_cursor() {
        let encoded = encode_message(b"hello");
        let mut buf = buffer_with(&encoded[..7]);
        let mut decoder = FrameDecoder::new();

        assert!(decoder.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.consumed(), 0);
        assert_eq!(buf.readable(), 7);
    }

    #[test]
    fn test_decode_message_too_large() {
        // Header declares 11 bytes against a limit of 10; the payload has
        // not arrived and must not be needed for the check.
        let mut buf = buffer_with(&[0, 0, 0, 0, 0x0b]);
        let mut decoder = FrameDecoder::with_max_payload_size(10);

        let err = decoder.decode(&mut buf).unwrap_err();
        assert_eq!(err.code(), Code::ResourceExhausted);
        assert!(err.message().contains("11"));
        assert!(err.message().contains("10"));
        // Cursor has not advanced past the header.
        assert_eq!(buf.consumed(), 0);
    }

    #[test]
    fn test_decode_at_exact_limit() {
        let mut buf = buffer_with(&encode_message(b"0123456789"));
        let mut decoder = FrameDecoder::with_max_payload_size(10);

        let payload = decoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&payload[..], b"0123456789");
    }

    #[test]
    fn test_decode_compressed_without_decompressor() {
        let mut buf = buffer_with(&encode_message_with_compression(b"abc", true));
        let mut decoder = FrameDecoder::new();

        let err = decoder.decode(&mut buf).unwrap_err();
        assert_eq!(err.code(), Code::Internal);
    }

    #[test]
    fn test_decode_compressed_with_decompressor() {
        let mut buf = buffer_with(&encode_message_with_compression(b"abc", true));
        let mut decoder = FrameDecoder::with_max_payload_size(64);
        decoder.set_decompressor(Box::new(Reverser::new()));

        let payload = decoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&payload[..], b"cba");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_passes_limit_to_decompressor() {
        let reverser = Reverser::new();
        let last_limit = reverser.last_limit.clone();

        let mut buf = buffer_with(&encode_message_with_compression(b"xy", true));
        let mut decoder = FrameDecoder::with_max_payload_size(123);
        decoder.set_decompressor(Box::new(reverser));

        decoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(last_limit.get(), 123);
    }

    #[test]
    fn test_decode_decompressor_error_passthrough() {
        let mut buf = buffer_with(&encode_message_with_compression(b"abc", true));
        let mut decoder = FrameDecoder::new();
        decoder.set_decompressor(Box::new(Corrupt));

        let err = decoder.decode(&mut buf).unwrap_err();
        assert_eq!(err.code(), Code::DataLoss);
        assert_eq!(err.message(), "corrupt deflate stream");
    }

    #[test]
    fn test_decode_reserved_flag_treated_as_uncompressed() {
        let mut data = encode_message(b"raw").to_vec();
        data[0] = 2;
        let mut buf = buffer_with(&data);
        let mut decoder = FrameDecoder::new();

        let payload = decoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&payload[..], b"raw");
    }

    #[test]
    fn test_decode_multiple_messages() {
        let mut data = encode_message(b"first").to_vec();
        data.extend_from_slice(&encode_message(b"second"));
        let mut buf = buffer_with(&data);
        let mut decoder = FrameDecoder::new();

        assert_eq!(&decoder.decode(&mut buf).unwrap().unwrap()[..], b"first");
        assert_eq!(&decoder.decode(&mut buf).unwrap().unwrap()[..], b"second");
        assert!(decoder.decode(&mut buf).unwrap().is_none());
    }
}
