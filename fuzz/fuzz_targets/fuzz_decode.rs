#![no_main]

use grpc_deframe::{FrameDecoder, RecvBuffer, encode_message};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut buf = RecvBuffer::new();
    buf.extend_from_slice(data);
    let mut decoder = FrameDecoder::new();

    // Decode message(s) from the raw input
    loop {
        match decoder.decode(&mut buf) {
            Ok(Some(message)) => {
                // Roundtrip: the decoded payload must re-encode cleanly
                let reencoded = encode_message(&message);
                assert!(reencoded.len() >= 5);

                let mut rebuf = RecvBuffer::new();
                rebuf.extend_from_slice(&reencoded);
                if let Ok(Some(redecoded)) = decoder.decode(&mut rebuf) {
                    assert_eq!(message, redecoded);
                }
            }
            Ok(None) => {
                // Need more data
                break;
            }
            Err(_) => {
                // Oversize declaration - terminal for the stream
                break;
            }
        }
    }
});
