#![no_main]

use libfuzzer_sys::fuzz_target;
use taleweave_multiplayer::protocol::ServerFrame;

fuzz_target!(|data: &[u8]| {
    // Byte path, including serde_json's UTF-8 validation.
    let _ = serde_json::from_slice::<ServerFrame>(data);

    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(ServerFrame::Ack(ack)) = serde_json::from_str::<ServerFrame>(s) {
            // Rejection text must always be produced without panicking.
            let _ = ack.into_result();
        }
    }
});
