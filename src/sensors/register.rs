//! Single-slot distance register shared between the echo ISR and the
//! polling loop.
//!
//! ```text
//!  echo ISR ──publish_pulse()──▶ [ AtomicU16 cm ] ──read()──▶ polling loop
//!             (critical section)                   (plain atomic load)
//! ```
//!
//! The writer computes and stores inside `critical_section::with`, so the
//! reader always sees either the previous complete value or the new one.
//! The reader never locks: it cannot contend with itself.

use core::sync::atomic::{AtomicU16, AtomicU32, Ordering};

/// Distance to the nearest obstacle, in whole centimetres.
pub type DistanceCm = u16;

/// Published when a ranging cycle produced no echo before the timeout.
/// Larger than any threshold, so the controller reads it as "path clear".
pub const NO_ECHO_CM: DistanceCm = DistanceCm::MAX;

/// Round-trip microseconds per centimetre at the speed of sound.
pub const US_PER_CM: u32 = 58;

/// Convert an echo pulse width into centimetres (floor division).
/// Widths too large for the register saturate to [`NO_ECHO_CM`].
pub const fn pulse_width_to_cm(width_us: u32) -> DistanceCm {
    let cm = width_us / US_PER_CM;
    if cm > NO_ECHO_CM as u32 {
        NO_ECHO_CM
    } else {
        cm as DistanceCm
    }
}

pub struct DistanceRegister {
    cm: AtomicU16,
    /// Number of publishes since boot (wraps). Lets callers tell a fresh
    /// sample from a stale one.
    updates: AtomicU32,
}

impl DistanceRegister {
    /// Register holding 0 cm, the power-on value.
    pub const fn new() -> Self {
        Self {
            cm: AtomicU16::new(0),
            updates: AtomicU32::new(0),
        }
    }

    /// Convert a pulse width and store the result. ISR side.
    pub fn publish_pulse(&self, width_us: u32) -> DistanceCm {
        critical_section::with(|_| {
            let cm = pulse_width_to_cm(width_us);
            self.store(cm);
            cm
        })
    }

    /// Store an already-computed distance (echo timeout fallback).
    pub fn publish(&self, cm: DistanceCm) {
        critical_section::with(|_| self.store(cm));
    }

    /// Latest complete distance. Polling side.
    pub fn read(&self) -> DistanceCm {
        self.cm.load(Ordering::Acquire)
    }

    pub fn updates(&self) -> u32 {
        self.updates.load(Ordering::Acquire)
    }

    // Caller holds the critical section.
    fn store(&self, cm: DistanceCm) {
        self.cm.store(cm, Ordering::Release);
        // load + store instead of fetch_add: some MCU targets lack CAS.
        let n = self.updates.load(Ordering::Relaxed);
        self.updates.store(n.wrapping_add(1), Ordering::Release);
    }
}

impl Default for DistanceRegister {
    fn default() -> Self {
        Self::new()
    }
}
