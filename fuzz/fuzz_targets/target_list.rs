#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(targets) = webswarm::http::parse_targets(input) {
            debug_assert!(!targets.is_empty());
            for url in &targets {
                debug_assert!(!url.contains('\r'));
                debug_assert_eq!(url.trim(), url);
            }
        }
    }
});
