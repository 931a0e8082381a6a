//! Distance sensing: the HC-SR04 driver and the register it publishes into.
//!
//! The two statics below are the only state shared with interrupt context.
//! `static` because ESP-IDF ISR callbacks cannot capture closures.

pub mod register;
pub mod ultrasonic;

use register::DistanceRegister;
use ultrasonic::EchoCapture;

/// Latest obstacle distance, written by the echo ISR.
pub static DISTANCE_REGISTER: DistanceRegister = DistanceRegister::new();

/// In-flight ranging cycle state.
pub static ECHO_CAPTURE: EchoCapture = EchoCapture::new();

/// Called from the echo GPIO ISR on every edge.
pub fn echo_isr_handler(level_high: bool, now_us: u32) {
    ECHO_CAPTURE.on_edge(level_high, now_us, &DISTANCE_REGISTER);
}
