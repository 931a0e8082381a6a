//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements    | Connects to                       |
//! |------------|---------------|-----------------------------------|
//! | `hardware` | RangingPort   | HC-SR04 trigger GPIO + echo ISR   |
//! |            | ActuatorPort  | L293D via four LEDC PWM channels  |
//! | `log_sink` | EventSink     | Serial log output                 |
//! | `time`     | -             | ESP32 high-resolution timer       |

pub mod hardware;
pub mod log_sink;
pub mod time;
