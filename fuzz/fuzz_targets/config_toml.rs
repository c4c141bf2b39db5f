#![no_main]

use libfuzzer_sys::fuzz_target;
use webswarm::config::types::ConfigFile;
use webswarm::config::{resolve_master, resolve_slave};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(config) = toml::from_str::<ConfigFile>(input) {
            if let Ok(master) = resolve_master(&config) {
                debug_assert!(master.dispatch.rate_per_second.get() > 0);
                debug_assert!(master.dispatch.max_concurrency.get() > 0);
                debug_assert!(!master.listen.is_empty());
            }
            if let Ok(slave) = resolve_slave(&config) {
                debug_assert!(!slave.master.is_empty());
            }
        }
    }
});
