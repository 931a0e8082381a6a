//! GPIO / peripheral pin assignments for the rover main board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// HC-SR04 ultrasonic module
// ---------------------------------------------------------------------------

/// Digital output: held HIGH for the trigger pulse.
pub const US_TRIGGER_GPIO: i32 = 4;
/// Digital input with pull-up, any-edge interrupt. HIGH while the echo is in flight.
pub const US_ECHO_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// L293D quadruple half-H driver, bipolar wiring
// ---------------------------------------------------------------------------

pub const MOTOR_RIGHT_FWD_GPIO: i32 = 6;
pub const MOTOR_LEFT_FWD_GPIO: i32 = 7;
pub const MOTOR_RIGHT_BACK_GPIO: i32 = 15;
pub const MOTOR_LEFT_BACK_GPIO: i32 = 16;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;
/// LEDC base frequency for the drive motors.
pub const MOTOR_PWM_FREQ_HZ: u32 = 1_000;
