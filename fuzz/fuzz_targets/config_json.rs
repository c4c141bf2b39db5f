#![no_main]

use libfuzzer_sys::fuzz_target;
use webswarm::config::types::ConfigFile;
use webswarm::config::{resolve_master, resolve_slave};

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = serde_json::from_slice::<ConfigFile>(data) {
        if let Ok(master) = resolve_master(&config) {
            debug_assert!(!master.dispatch.per_request_timeout.is_zero());
            debug_assert!(master.slaves.iter().all(|addr| !addr.is_empty()));
        }
        let _slave = resolve_slave(&config);
    }
});
