//! Differential drive through an L293D quadruple half-H driver.
//!
//! Four LEDC PWM inputs, one per wheel direction. Pivot turns only: a turn
//! drives a single wheel forward.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes real LEDC duty registers via hw_init helpers.
//! On host/test: the hw_init stubs succeed and the driver tracks the
//! applied outputs in memory.

use crate::config::RoverConfig;
use crate::drivers::hw_init;
use crate::error::ActuatorError;
use crate::fsm::MotionState;

/// Duty (0-255) on each of the four half-bridge inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelOutputs {
    pub right_forward: u8,
    pub left_forward: u8,
    pub right_backward: u8,
    pub left_backward: u8,
}

impl ChannelOutputs {
    pub const OFF: Self = Self {
        right_forward: 0,
        left_forward: 0,
        right_backward: 0,
        left_backward: 0,
    };

    pub fn is_off(&self) -> bool {
        *self == Self::OFF
    }
}

/// Channel outputs for a motion state.
pub fn apply_state(state: MotionState, config: &RoverConfig) -> ChannelOutputs {
    match state {
        MotionState::Stopped => ChannelOutputs::OFF,
        MotionState::Forward => ChannelOutputs {
            right_forward: config.forward_duty,
            left_forward: config.forward_duty,
            ..ChannelOutputs::OFF
        },
        // Right turn: left wheel drives, right wheel idles.
        MotionState::TurningRight => ChannelOutputs {
            left_forward: config.turn_duty,
            ..ChannelOutputs::OFF
        },
        MotionState::TurningLeft => ChannelOutputs {
            right_forward: config.turn_duty,
            ..ChannelOutputs::OFF
        },
        MotionState::Backward => ChannelOutputs {
            right_backward: config.backward_duty,
            left_backward: config.backward_duty,
            ..ChannelOutputs::OFF
        },
    }
}

pub struct MotorDriver {
    applied: ChannelOutputs,
}

impl MotorDriver {
    pub fn new() -> Self {
        Self { applied: ChannelOutputs::OFF }
    }

    /// Zero all four channels.
    pub fn stop_all(&mut self) -> Result<(), ActuatorError> {
        self.write(ChannelOutputs::OFF)
    }

    /// Outputs last written successfully.
    pub fn applied(&self) -> ChannelOutputs {
        self.applied
    }

    /// Write all four duties. Callers zero the channels first with
    /// [`stop_all`](Self::stop_all) so a wheel is never driven both ways.
    pub fn write(&mut self, outputs: ChannelOutputs) -> Result<(), ActuatorError> {
        hw_init::ledc_set(hw_init::LEDC_CH_RIGHT_FWD, outputs.right_forward)?;
        hw_init::ledc_set(hw_init::LEDC_CH_LEFT_FWD, outputs.left_forward)?;
        hw_init::ledc_set(hw_init::LEDC_CH_RIGHT_BACK, outputs.right_backward)?;
        hw_init::ledc_set(hw_init::LEDC_CH_LEFT_BACK, outputs.left_backward)?;
        self.applied = outputs;
        Ok(())
    }
}

impl Default for MotorDriver {
    fn default() -> Self {
        Self::new()
    }
}
