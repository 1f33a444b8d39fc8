#![no_main]

use autoassign_core::config::{parse_assignments, parse_bool, parse_int};
use autoassign_core::WeightedName;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(list) = parse_assignments(text) {
            for entry in &list {
                assert!(!entry.name.is_empty());
                assert!(!entry.name.contains(','));
            }
            // Bounded so huge weights do not stall the run
            let _ = WeightedName::expand(&list).take(10_000).count();
        }

        let _ = parse_int::<u32>(text, 0);
        let _ = parse_bool(text, true);
    }
});
