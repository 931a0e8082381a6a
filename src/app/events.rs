//! Outbound application events.
//!
//! The [`ControllerService`](super::service::ControllerService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.

use crate::drivers::motor::ChannelOutputs;
use crate::fsm::MotionState;
use crate::fsm::context::TurnBias;
use crate::sensors::register::DistanceCm;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The controller has started (carries the initial state).
    Started(MotionState),

    /// The FSM transitioned between states.
    StateChanged {
        from: MotionState,
        to: MotionState,
        distance_cm: DistanceCm,
    },

    /// A ranging cycle produced no echo and was abandoned.
    EchoTimeout,

    /// The trigger pin could not be driven.
    TriggerFailed,

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryData {
    pub state: MotionState,
    pub distance_cm: DistanceCm,
    pub state_timer: u32,
    pub turn_bias: TurnBias,
    pub outputs: ChannelOutputs,
    pub tick_count: u64,
    pub transitions: u64,
    pub echo_timeouts: u32,
    pub busy_refusals: u32,
    pub trigger_failures: u32,
}
