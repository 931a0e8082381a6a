//! Application core: pure domain logic, zero I/O.
//!
//! The polling-loop body of the rover: ranging, the movement FSM and
//! actuator commands. All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
