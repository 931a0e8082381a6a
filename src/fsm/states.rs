//! Concrete state handler functions and table builder.
//!
//! ```text
//!  STOPPED ──[clear]──▶ FORWARD ──[obstacle]──▶ TURNING_{bias}  (bias flips)
//!                         ▲  ▲                     │      │
//!                         │  └───────[clear]───────┘      │
//!                         │                          [timer > stuck]
//!                    [timer > stuck]                      ▼
//!                         └────────────────────────── BACKWARD
//! ```
//!
//! Each `on_update` evaluates only the rules that can fire in its state, in
//! global priority order: avoidance turn, stuck escalation, clear path,
//! back-up recovery.

use super::context::MotionContext;
use super::{MotionState, StateDescriptor};
use crate::drivers::motor::apply_state;
use log::{debug, info};

/// Build the static state table. Called once at startup.
pub fn build_state_table() -> [StateDescriptor; MotionState::COUNT] {
    [
        StateDescriptor {
            id: MotionState::Stopped,
            name: "Stopped",
            on_enter: Some(stopped_enter),
            on_update: stopped_update,
        },
        StateDescriptor {
            id: MotionState::Forward,
            name: "Forward",
            on_enter: Some(forward_enter),
            on_update: forward_update,
        },
        StateDescriptor {
            id: MotionState::TurningLeft,
            name: "TurningLeft",
            on_enter: Some(turning_left_enter),
            on_update: turning_update,
        },
        StateDescriptor {
            id: MotionState::TurningRight,
            name: "TurningRight",
            on_enter: Some(turning_right_enter),
            on_update: turning_update,
        },
        StateDescriptor {
            id: MotionState::Backward,
            name: "Backward",
            on_enter: Some(backward_enter),
            on_update: backward_update,
        },
    ]
}

fn set_outputs(ctx: &mut MotionContext, state: MotionState) {
    ctx.outputs = apply_state(state, &ctx.config);
}

// ═══════════════════════════════════════════════════════════════════════════
//  STOPPED
// ═══════════════════════════════════════════════════════════════════════════

fn stopped_enter(ctx: &mut MotionContext) {
    set_outputs(ctx, MotionState::Stopped);
    info!("STOPPED: all channels off");
}

fn stopped_update(ctx: &mut MotionContext) -> Option<MotionState> {
    ctx.path_clear().then_some(MotionState::Forward)
}

// ═══════════════════════════════════════════════════════════════════════════
//  FORWARD
// ═══════════════════════════════════════════════════════════════════════════

fn forward_enter(ctx: &mut MotionContext) {
    set_outputs(ctx, MotionState::Forward);
}

fn forward_update(ctx: &mut MotionContext) -> Option<MotionState> {
    if ctx.obstacle_ahead() {
        let turn = ctx.turn_bias.turn_state();
        ctx.turn_bias = ctx.turn_bias.flip();
        debug!("FORWARD: obstacle at {} cm, turning {:?}", ctx.distance_cm, turn);
        return Some(turn);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  TURNING (left and right share the update rules)
// ═══════════════════════════════════════════════════════════════════════════

fn turning_left_enter(ctx: &mut MotionContext) {
    set_outputs(ctx, MotionState::TurningLeft);
}

fn turning_right_enter(ctx: &mut MotionContext) {
    set_outputs(ctx, MotionState::TurningRight);
}

fn turning_update(ctx: &mut MotionContext) -> Option<MotionState> {
    if ctx.config.preset.stuck_escalation() && ctx.timed_out() {
        info!("TURNING: stuck for {} ticks, backing up", ctx.state_timer);
        return Some(MotionState::Backward);
    }
    ctx.path_clear().then_some(MotionState::Forward)
}

// ═══════════════════════════════════════════════════════════════════════════
//  BACKWARD
// ═══════════════════════════════════════════════════════════════════════════

fn backward_enter(ctx: &mut MotionContext) {
    set_outputs(ctx, MotionState::Backward);
}

// Clear-path does not apply here: the rover always backs up for the full
// timeout.
fn backward_update(ctx: &mut MotionContext) -> Option<MotionState> {
    ctx.timed_out().then_some(MotionState::Forward)
}
