//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControllerService (domain)
//! ```
//!
//! Driven adapters (ranging sensor, motor actuator, event sinks) implement
//! these traits. The [`ControllerService`](super::service::ControllerService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::drivers::motor::ChannelOutputs;
use crate::error::SensorError;
use crate::sensors::register::DistanceCm;
use crate::sensors::ultrasonic::RangingStatus;

// ───────────────────────────────────────────────────────────────
// Ranging port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait RangingPort {
    /// Start a ranging cycle. The distance arrives asynchronously.
    fn trigger_ranging(&mut self) -> Result<RangingStatus, SensorError>;

    /// Latest published distance.
    fn read_distance_cm(&mut self) -> DistanceCm;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the four motor channels.
pub trait ActuatorPort {
    /// Zero all four channels.
    fn stop_all(&mut self);

    /// Write all four channel duties.
    fn set_outputs(&mut self, outputs: ChannelOutputs);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
