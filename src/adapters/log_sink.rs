//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the ESP-IDF
//! logger (UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::sensors::register::NO_ECHO_CM;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Distance for display; the no-echo sentinel prints as "none".
fn fmt_distance(cm: u16) -> String {
    if cm == NO_ECHO_CM { "none".into() } else { format!("{cm}cm") }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | state={:?} t={} | dist={} | bias={:?} | \
                     rf={} lf={} rb={} lb={} | ticks={} transitions={} | \
                     timeouts={} busy={} trig_fail={}",
                    t.state,
                    t.state_timer,
                    fmt_distance(t.distance_cm),
                    t.turn_bias,
                    t.outputs.right_forward,
                    t.outputs.left_forward,
                    t.outputs.right_backward,
                    t.outputs.left_backward,
                    t.tick_count,
                    t.transitions,
                    t.echo_timeouts,
                    t.busy_refusals,
                    t.trigger_failures,
                );
            }
            AppEvent::StateChanged { from, to, distance_cm } => {
                info!("STATE | {:?} -> {:?} | dist={}", from, to, fmt_distance(*distance_cm));
            }
            AppEvent::EchoTimeout => {
                info!("RANGE | no echo, reading as clear");
            }
            AppEvent::TriggerFailed => {
                warn!("RANGE | trigger pin write failed");
            }
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
        }
    }
}
