//! HC-SR04 ultrasonic ranging driver.
//!
//! A ranging cycle is split across two contexts:
//!
//! - the polling loop calls [`UltrasonicSensor::range_once`], which claims
//!   the cycle and emits the trigger pulse;
//! - the echo GPIO interrupt feeds every edge to [`EchoCapture::on_edge`],
//!   which timestamps the rising edge and publishes the distance on the
//!   falling edge.
//!
//! Only one cycle may be in flight. A cycle whose echo never completes is
//! abandoned after the echo timeout and [`NO_ECHO_CM`] is published in its
//! place. Timestamps are wrapping `u32` microseconds.

use core::sync::atomic::{AtomicU8, AtomicU32, Ordering};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{debug, warn};

use super::register::{DistanceCm, DistanceRegister, NO_ECHO_CM};
use crate::config::RoverConfig;
use crate::error::SensorError;

/// Where the current ranging cycle is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    /// No cycle in flight. Edges are ignored.
    Idle = 0,
    /// Trigger sent, waiting for the echo line to rise.
    Triggered = 1,
    /// Echo line high, pulse width being timed.
    Echoing = 2,
}

impl Phase {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Triggered,
            2 => Self::Echoing,
            _ => Self::Idle,
        }
    }
}

/// Outcome of a successful trigger request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangingStatus {
    /// A fresh cycle was started.
    Started,
    /// The previous cycle timed out; [`NO_ECHO_CM`] was published and a new
    /// cycle was started.
    RestartedAfterTimeout,
}

/// Edge-capture state shared between the echo ISR and the polling loop.
pub struct EchoCapture {
    phase: AtomicU8,
    triggered_at_us: AtomicU32,
    echo_start_us: AtomicU32,
}

impl EchoCapture {
    pub const fn new() -> Self {
        Self {
            phase: AtomicU8::new(Phase::Idle as u8),
            triggered_at_us: AtomicU32::new(0),
            echo_start_us: AtomicU32::new(0),
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Feed one echo-line edge. ISR side.
    ///
    /// Returns the published distance when this edge completed a cycle.
    pub fn on_edge(
        &self,
        level_high: bool,
        now_us: u32,
        register: &DistanceRegister,
    ) -> Option<DistanceCm> {
        critical_section::with(|_| match (self.phase(), level_high) {
            // A second rising edge while Echoing restarts the measurement.
            (Phase::Triggered | Phase::Echoing, true) => {
                self.echo_start_us.store(now_us, Ordering::Relaxed);
                self.set_phase(Phase::Echoing);
                None
            }
            (Phase::Echoing, false) => {
                let width_us = now_us.wrapping_sub(self.echo_start_us.load(Ordering::Relaxed));
                let cm = register.publish_pulse(width_us);
                self.set_phase(Phase::Idle);
                Some(cm)
            }
            _ => None,
        })
    }

    /// Claim a new cycle starting at `now_us`. Polling side.
    ///
    /// An in-flight cycle younger than `timeout_us` makes this return
    /// [`SensorError::Busy`] without side effects. An older one is abandoned
    /// and [`NO_ECHO_CM`] is published first.
    pub fn begin(
        &self,
        now_us: u32,
        timeout_us: u32,
        register: &DistanceRegister,
    ) -> Result<RangingStatus, SensorError> {
        critical_section::with(|_| {
            let status = match self.phase() {
                Phase::Idle => RangingStatus::Started,
                Phase::Triggered | Phase::Echoing => {
                    let started = self.triggered_at_us.load(Ordering::Relaxed);
                    if now_us.wrapping_sub(started) <= timeout_us {
                        return Err(SensorError::Busy);
                    }
                    register.publish(NO_ECHO_CM);
                    RangingStatus::RestartedAfterTimeout
                }
            };
            self.triggered_at_us.store(now_us, Ordering::Relaxed);
            self.set_phase(Phase::Triggered);
            Ok(status)
        })
    }

    /// Drop the current cycle without publishing anything.
    pub fn cancel(&self) {
        critical_section::with(|_| self.set_phase(Phase::Idle));
    }

    fn set_phase(&self, phase: Phase) {
        self.phase.store(phase as u8, Ordering::Release);
    }
}

impl Default for EchoCapture {
    fn default() -> Self {
        Self::new()
    }
}

/// Trigger side of the sensor: owns the trigger pin and a blocking delay
/// for the pulse, and borrows the ISR-shared capture state and register.
pub struct UltrasonicSensor<'a, P, D> {
    trigger: P,
    delay: D,
    capture: &'a EchoCapture,
    register: &'a DistanceRegister,
    trigger_pulse_us: u32,
    echo_timeout_us: u32,
}

impl<'a, P: OutputPin, D: DelayNs> UltrasonicSensor<'a, P, D> {
    pub fn new(
        mut trigger: P,
        delay: D,
        capture: &'a EchoCapture,
        register: &'a DistanceRegister,
        config: &RoverConfig,
    ) -> Self {
        if trigger.set_low().is_err() {
            warn!("Ultrasonic: could not park trigger pin low");
        }
        Self {
            trigger,
            delay,
            capture,
            register,
            trigger_pulse_us: config.trigger_pulse_us,
            echo_timeout_us: config.echo_timeout_us(),
        }
    }

    /// Start one ranging cycle. The result lands in the register later,
    /// from the echo interrupt.
    pub fn range_once(&mut self, now_us: u32) -> Result<RangingStatus, SensorError> {
        let status = self.capture.begin(now_us, self.echo_timeout_us, self.register)?;
        if status == RangingStatus::RestartedAfterTimeout {
            debug!("Ultrasonic: no echo within {} us", self.echo_timeout_us);
        }

        if self.pulse_trigger().is_err() {
            self.capture.cancel();
            // Best effort: never leave the transducer firing.
            let _ = self.trigger.set_low();
            return Err(SensorError::TriggerFailed);
        }
        Ok(status)
    }

    /// Latest published distance.
    pub fn distance_cm(&self) -> DistanceCm {
        self.register.read()
    }

    pub fn phase(&self) -> Phase {
        self.capture.phase()
    }

    fn pulse_trigger(&mut self) -> Result<(), P::Error> {
        self.trigger.set_high()?;
        self.delay.delay_us(self.trigger_pulse_us);
        self.trigger.set_low()
    }
}
