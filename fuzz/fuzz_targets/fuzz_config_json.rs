//! Fuzz target: `RoverConfig::from_json`
//!
//! Arbitrary bytes as a build-time config override must never panic, and
//! anything accepted must pass validation.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use rover::config::RoverConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(cfg) = RoverConfig::from_json(text) {
        assert!(cfg.validate().is_ok());
        assert!(cfg.echo_timeout_ms < cfg.poll_interval_ms);
    }
});
