#![no_main]

use autoassign_core::context::parse_issue_url;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(url) = std::str::from_utf8(data) {
        if let Ok((owner, repo, number)) = parse_issue_url(url) {
            assert!(!owner.is_empty());
            assert!(!repo.is_empty());
            assert!(number > 0);
        }
    }
});
