//! Shared mutable context threaded through every FSM handler.
//!
//! The "blackboard": the polling loop writes the latest distance in, state
//! handlers read it along with the timer and bias, and `on_enter` handlers
//! write the channel outputs the actuator should apply.

use crate::config::RoverConfig;
use crate::drivers::motor::ChannelOutputs;
use crate::sensors::register::DistanceCm;

use super::MotionState;

/// Direction of the next avoidance turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnBias {
    Left,
    Right,
}

impl TurnBias {
    pub fn flip(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn turn_state(self) -> MotionState {
        match self {
            Self::Left => MotionState::TurningLeft,
            Self::Right => MotionState::TurningRight,
        }
    }
}

pub struct MotionContext {
    // --- Inputs (written by the polling loop each tick) ---
    pub distance_cm: DistanceCm,

    // --- Controller state ---
    /// Ticks since the last transition, pre-increment during `on_update`.
    pub state_timer: u32,
    pub turn_bias: TurnBias,

    // --- Outputs (written by on_enter handlers) ---
    pub outputs: ChannelOutputs,

    // --- Timing ---
    /// Ticks since boot.
    pub total_ticks: u64,

    pub config: RoverConfig,
}

impl MotionContext {
    pub fn new(config: RoverConfig) -> Self {
        Self {
            distance_cm: 0,
            state_timer: 0,
            turn_bias: TurnBias::Left,
            outputs: ChannelOutputs::OFF,
            total_ticks: 0,
            config,
        }
    }

    /// Obstacle at or inside the threshold.
    pub fn obstacle_ahead(&self) -> bool {
        self.distance_cm <= self.config.obstacle_threshold_cm
    }

    pub fn path_clear(&self) -> bool {
        !self.obstacle_ahead()
    }

    /// Current state has outlived the stuck timeout.
    pub fn timed_out(&self) -> bool {
        self.state_timer > self.config.stuck_timeout_ticks
    }
}
