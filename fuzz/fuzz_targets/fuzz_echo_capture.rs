//! Fuzz target: echo edge capture
//!
//! Drives arbitrary interleavings of trigger requests and echo-line edges
//! through `EchoCapture` and verifies:
//! - No panics on any timestamp, including wraparound
//! - A refused trigger never publishes or changes the phase
//! - Edges while Idle never publish
//! - A published distance is always what the register then holds
//!
//! cargo fuzz run fuzz_echo_capture

#![no_main]

// Links the host critical-section implementation.
use critical_section as _;
use libfuzzer_sys::fuzz_target;
use rover::sensors::register::DistanceRegister;
use rover::sensors::ultrasonic::{EchoCapture, Phase};

const TIMEOUT_US: u32 = 38_000;

fuzz_target!(|data: &[u8]| {
    let reg = DistanceRegister::new();
    let cap = EchoCapture::new();

    // 5-byte records: [op, t0, t1, t2, t3]
    for rec in data.chunks_exact(5) {
        let now = u32::from_le_bytes([rec[1], rec[2], rec[3], rec[4]]);
        let before = reg.updates();
        let phase = cap.phase();

        match rec[0] % 3 {
            0 => {
                if cap.begin(now, TIMEOUT_US, &reg).is_err() {
                    assert_eq!(cap.phase(), phase);
                    assert_eq!(reg.updates(), before);
                } else {
                    assert_eq!(cap.phase(), Phase::Triggered);
                }
            }
            op => {
                let high = op == 1;
                match cap.on_edge(high, now, &reg) {
                    Some(cm) => {
                        assert_eq!(phase, Phase::Echoing);
                        assert_eq!(reg.read(), cm);
                    }
                    None => assert_eq!(reg.updates(), before),
                }
                if phase == Phase::Idle {
                    assert_eq!(cap.phase(), Phase::Idle);
                }
            }
        }
    }
});
