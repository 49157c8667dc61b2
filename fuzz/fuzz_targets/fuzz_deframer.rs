#![no_main]

use grpc_deframe::Deframer;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut deframer = Deframer::default();
    let mut sink = Vec::new();

    // Feed data in chunks to exercise incremental reassembly
    let chunk_size = if data.len() > 10 { data.len() / 3 } else { 1 };

    for chunk in data.chunks(chunk_size.max(1)) {
        deframer.append(chunk);

        if deframer.drain_into(&mut sink).is_err() {
            // Framing errors are terminal for the stream
            return;
        }
    }

    // Buffer state stays consistent across chunkings
    let _ = deframer.has_buffered_data();
    let _ = deframer.buffered_len();
});
