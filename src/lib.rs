//! Incremental deframing of gRPC length-prefixed messages.
//!
//! A transport delivers bytes in arbitrary chunks (HTTP/2 DATA frame
//! payloads, socket reads); the RPC layer above expects whole messages.
//! This crate sits between the two: [`Deframer`] accumulates chunks per
//! stream and yields complete message payloads, enforcing the payload size
//! limit before allocating and dispatching compressed payloads to an
//! externally owned [`Decompressor`].
//!
//! Messages are framed as:
//!
//! ```text
//! +---------------+-------------------------------+
//! |   Flag (8)    |          Length (32)          |
//! +---------------+-------------------------------+
//! |               Message Payload (0...)        ...
//! +-----------------------------------------------+
//! ```
//!
//! Flag 0 means uncompressed, 1 means compressed; the length is a
//! big-endian u32 counting payload bytes.
//!
//! # Example
//!
//! ```rust
//! use grpc_deframe::{Deframer, encode_message};
//!
//! let mut deframer = Deframer::default();
//!
//! let wire = encode_message(b"hello");
//! deframer.append(&wire[..3]); // chunk boundaries are arbitrary
//! assert!(deframer.decode_next().unwrap().is_none());
//!
//! deframer.append(&wire[3..]);
//! let message = deframer.decode_next().unwrap().unwrap();
//! assert_eq!(&message[..], b"hello");
//! ```
//!
//! Errors are gRPC [`Status`] values: a declared length over the limit is
//! `RESOURCE_EXHAUSTED`, a compressed message without a configured
//! decompressor is `INTERNAL`, and decompressor failures pass through
//! unchanged. Any error is fatal for the stream.

mod buffer;
mod decompress;
mod deframe;
mod frame;
mod status;

pub use buffer::RecvBuffer;
pub use decompress::Decompressor;
pub use deframe::Deframer;
pub use frame::{
    DEFAULT_MAX_PAYLOAD_SIZE, FrameDecoder, HEADER_SIZE, encode_message,
    encode_message_with_compression,
};
pub use status::{Code, Status};
