#![no_main]

use autoassign_core::context::resolve;
use autoassign_core::EventPayload;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(payload) = EventPayload::from_json(text) {
            if let Ok(context) = resolve(&payload, 0) {
                assert!(!context.owner.is_empty());
                assert!(!context.repo.is_empty());
            }
            let _ = resolve(&payload, 1);
        }
    }
});
