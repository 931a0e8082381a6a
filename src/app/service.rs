//! Application service: the hexagonal core.
//!
//! [`ControllerService`] owns the movement FSM and its context, and runs
//! one polling-loop iteration per [`tick`](ControllerService::tick). All
//! I/O flows through port traits injected at call sites, making the whole
//! service testable with mock adapters.
//!
//! ```text
//!  RangingPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                  │   ControllerService    │
//! ActuatorPort ◀── │   FSM · MotionContext  │
//!                  └────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::config::RoverConfig;
use crate::error::SensorError;
use crate::fsm::context::MotionContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, MotionState, Transition};
use crate::sensors::ultrasonic::RangingStatus;

use super::events::{AppEvent, TelemetryData};
use super::ports::{ActuatorPort, EventSink, RangingPort};

pub struct ControllerService {
    fsm: Fsm,
    ctx: MotionContext,
    tick_count: u64,
    echo_timeouts: u32,
    busy_refusals: u32,
    trigger_failures: u32,
}

impl ControllerService {
    /// Construct the service. Does **not** start the FSM; call
    /// [`start`](Self::start) next.
    pub fn new(config: RoverConfig) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), MotionState::Stopped),
            ctx: MotionContext::new(config),
            tick_count: 0,
            echo_timeouts: 0,
            busy_refusals: 0,
            trigger_failures: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter `Stopped` and make sure every motor channel is off.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        hw.stop_all();
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!(
            "ControllerService started in {:?} (threshold {} cm, preset {:?})",
            self.fsm.current_state(),
            self.ctx.config.obstacle_threshold_cm,
            self.ctx.config.preset
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One polling-loop iteration: trigger ranging → read register →
    /// FSM → actuators → telemetry.
    ///
    /// The distance read here is whatever the echo ISR last published,
    /// normally the result of the previous tick's cycle.
    pub fn tick(
        &mut self,
        hw: &mut (impl RangingPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) -> Option<Transition> {
        self.tick_count = self.tick_count.wrapping_add(1);

        // 1. Start the next ranging cycle
        match hw.trigger_ranging() {
            Ok(RangingStatus::Started) => {}
            Ok(RangingStatus::RestartedAfterTimeout) => {
                self.echo_timeouts = self.echo_timeouts.wrapping_add(1);
                sink.emit(&AppEvent::EchoTimeout);
            }
            Err(SensorError::Busy) => {
                self.busy_refusals = self.busy_refusals.wrapping_add(1);
                debug!("Ranging cycle still in flight, reusing last distance");
            }
            Err(e @ SensorError::TriggerFailed) => {
                self.trigger_failures = self.trigger_failures.wrapping_add(1);
                warn!("Ranging trigger failed: {}", e);
                sink.emit(&AppEvent::TriggerFailed);
            }
        }

        // 2. Latest distance from the register
        self.ctx.distance_cm = hw.read_distance_cm();

        // 3. FSM tick
        let transition = self.fsm.tick(&mut self.ctx);

        // 4. Actuators: stop-then-set, only on a state change
        if let Some(t) = transition {
            hw.stop_all();
            hw.set_outputs(self.ctx.outputs);
            sink.emit(&AppEvent::StateChanged {
                from: t.from,
                to: t.to,
                distance_cm: self.ctx.distance_cm,
            });
        }

        // 5. Periodic telemetry
        let interval = u64::from(self.ctx.config.telemetry_interval_ticks.max(1));
        if self.tick_count % interval == 0 {
            sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
        }

        transition
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            state: self.fsm.current_state(),
            distance_cm: self.ctx.distance_cm,
            state_timer: self.ctx.state_timer,
            turn_bias: self.ctx.turn_bias,
            outputs: self.ctx.outputs,
            tick_count: self.tick_count,
            transitions: self.fsm.transition_count(),
            echo_timeouts: self.echo_timeouts,
            busy_refusals: self.busy_refusals,
            trigger_failures: self.trigger_failures,
        }
    }

    pub fn state(&self) -> MotionState {
        self.fsm.current_state()
    }

    /// Ticks since the last transition.
    pub fn state_timer(&self) -> u32 {
        self.ctx.state_timer
    }

    pub fn context(&self) -> &MotionContext {
        &self.ctx
    }

    /// Total polling ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &RoverConfig {
        &self.ctx.config
    }
}
