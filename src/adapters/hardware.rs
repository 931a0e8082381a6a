//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the ultrasonic sensor, the motor driver and the clock, exposing
//! them through [`RangingPort`] and [`ActuatorPort`]. On non-espidf targets
//! the underlying drivers use cfg-gated simulation stubs.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::warn;

use crate::adapters::time::Esp32TimeAdapter;
use crate::app::ports::{ActuatorPort, RangingPort};
use crate::drivers::motor::{ChannelOutputs, MotorDriver};
use crate::error::SensorError;
use crate::sensors::register::DistanceCm;
use crate::sensors::ultrasonic::{RangingStatus, UltrasonicSensor};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<'a, P, D> {
    sensor: UltrasonicSensor<'a, P, D>,
    motors: MotorDriver,
    clock: Esp32TimeAdapter,
}

impl<'a, P: OutputPin, D: DelayNs> HardwareAdapter<'a, P, D> {
    pub fn new(sensor: UltrasonicSensor<'a, P, D>, motors: MotorDriver, clock: Esp32TimeAdapter) -> Self {
        Self { sensor, motors, clock }
    }

    pub fn motors(&self) -> &MotorDriver {
        &self.motors
    }
}

// ── RangingPort implementation ────────────────────────────────

impl<P: OutputPin, D: DelayNs> RangingPort for HardwareAdapter<'_, P, D> {
    fn trigger_ranging(&mut self) -> Result<RangingStatus, SensorError> {
        self.sensor.range_once(self.clock.now_us())
    }

    fn read_distance_cm(&mut self) -> DistanceCm {
        self.sensor.distance_cm()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<P: OutputPin, D: DelayNs> ActuatorPort for HardwareAdapter<'_, P, D> {
    fn stop_all(&mut self) {
        if let Err(e) = self.motors.stop_all() {
            warn!("Motor stop failed: {}", e);
        }
    }

    fn set_outputs(&mut self, outputs: ChannelOutputs) {
        if let Err(e) = self.motors.write(outputs) {
            warn!("Motor write failed: {}", e);
            // Never leave a half-written channel set driving.
            self.stop_all();
        }
    }
}
