#![no_main]

use libfuzzer_sys::fuzz_target;
use taleweave_multiplayer::protocol::ClientFrame;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    // Anything that parses as a client frame must serialize back.
    if let Ok(frame) = serde_json::from_str::<ClientFrame>(s) {
        let json = serde_json::to_string(&frame).expect("re-serialize client frame");
        let _ = frame.message.kind();
        assert!(serde_json::from_str::<ClientFrame>(&json).is_ok());
    }
});
