//! Function-pointer finite state machine engine for rover motion.
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │  StateTable                                      │
//! │  ┌──────────────┬───────────┬───────────────────┐│
//! │  │ MotionState  │ on_enter  │ on_update         ││
//! │  ├──────────────┼───────────┼───────────────────┤│
//! │  │ Stopped      │ fn(ctx)   │ fn(ctx)->Option<> ││
//! │  │ Forward      │ fn(ctx)   │ fn(ctx)->Option<> ││
//! │  │ TurningLeft  │ fn(ctx)   │ fn(ctx)->Option<> ││
//! │  │ TurningRight │ fn(ctx)   │ fn(ctx)->Option<> ││
//! │  │ Backward     │ fn(ctx)   │ fn(ctx)->Option<> ││
//! │  └──────────────┴───────────┴───────────────────┘│
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the current state with the
//! state timer still holding its pre-tick value. `Some(next)` (with `next`
//! different from the current state) is a transition: the timer resets to
//! zero and `on_enter` of the new state computes its channel outputs.
//! Otherwise the timer increments. At most one transition per tick.

pub mod context;
pub mod states;

use context::MotionContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// The five motion states. Exactly one is active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MotionState {
    Stopped = 0,
    Forward = 1,
    TurningLeft = 2,
    TurningRight = 3,
    Backward = 4,
}

impl MotionState {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 5;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Stopped,
        Self::Forward,
        Self::TurningLeft,
        Self::TurningRight,
        Self::Backward,
    ];

    /// Convert a table index back to a state. Out of range maps to
    /// `Stopped` in release builds.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Stopped,
            1 => Self::Forward,
            2 => Self::TurningLeft,
            3 => Self::TurningRight,
            4 => Self::Backward,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Stopped
            }
        }
    }

    pub fn is_turning(self) -> bool {
        matches!(self, Self::TurningLeft | Self::TurningRight)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Stopped => "Stopped",
            Self::Forward => "Forward",
            Self::TurningLeft => "TurningLeft",
            Self::TurningRight => "TurningRight",
            Self::Backward => "Backward",
        }
    }
}

impl core::fmt::Display for MotionState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Runs once when a state is entered.
pub type StateActionFn = fn(&mut MotionContext);

/// Per-tick rule evaluation. `Some(next)` requests a transition.
pub type StateUpdateFn = fn(&mut MotionContext) -> Option<MotionState>;

/// One row in the state table.
pub struct StateDescriptor {
    pub id: MotionState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

/// A completed state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: MotionState,
    pub to: MotionState,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `MotionState as usize`.
    table: [StateDescriptor; MotionState::COUNT],
    current: usize,
    transitions: u64,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; MotionState::COUNT], initial: MotionState) -> Self {
        Self {
            table,
            current: initial as usize,
            transitions: 0,
        }
    }

    /// Run the initial `on_enter`. Call once before the first `tick()`.
    pub fn start(&mut self, ctx: &mut MotionContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        ctx.state_timer = 0;
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Evaluate the current state's rules once.
    pub fn tick(&mut self, ctx: &mut MotionContext) -> Option<Transition> {
        ctx.total_ticks = ctx.total_ticks.wrapping_add(1);

        match (self.table[self.current].on_update)(ctx) {
            Some(next) if next as usize != self.current => Some(self.transition(next, ctx)),
            _ => {
                ctx.state_timer = ctx.state_timer.saturating_add(1);
                None
            }
        }
    }

    /// Jump straight to `next`, running its `on_enter`. No-op if already
    /// there.
    pub fn force_transition(
        &mut self,
        next: MotionState,
        ctx: &mut MotionContext,
    ) -> Option<Transition> {
        (next as usize != self.current).then(|| self.transition(next, ctx))
    }

    pub fn current_state(&self) -> MotionState {
        MotionState::from_index(self.current)
    }

    /// Transitions since construction.
    pub fn transition_count(&self) -> u64 {
        self.transitions
    }

    fn transition(&mut self, next: MotionState, ctx: &mut MotionContext) -> Transition {
        let from = self.current_state();
        let next_idx = next as usize;

        info!(
            "FSM transition: {} -> {} (distance {} cm, timer {})",
            self.table[self.current].name, self.table[next_idx].name, ctx.distance_cm, ctx.state_timer
        );

        self.current = next_idx;
        self.transitions = self.transitions.wrapping_add(1);
        ctx.state_timer = 0;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }

        Transition { from, to: next }
    }
}
