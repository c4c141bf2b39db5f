#![no_main]

use libfuzzer_sys::fuzz_target;
use webswarm::metrics::{OutcomeRecord, summarize};

fuzz_target!(|data: &[u8]| {
    if let Ok(batch) = serde_json::from_slice::<Vec<OutcomeRecord>>(data) {
        let summary = summarize(&batch);
        debug_assert_eq!(summary.ok_count + summary.err_count, summary.total);
        debug_assert!(summary.err_percent_x100 <= 10_000);
    }
});
