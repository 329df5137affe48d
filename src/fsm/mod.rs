//! Function-pointer finite state machine engine.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                       │
//! │  ┌──────────────────┬───────────┬──────────┬───────────────────┐  │
//! │  │ Status           │ on_enter  │ on_exit  │ on_update         │  │
//! │  ├──────────────────┼───────────┼──────────┼───────────────────┤  │
//! │  │ Idle             │ fn(ctx)   │ -        │ fn(ctx)->Option<> │  │
//! │  │ Detecting        │ fn(ctx)   │ -        │ fn(ctx)->Option<> │  │
//! │  │ ConfirmedPending │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ Responding       │ fn(ctx)   │ -        │ fn(ctx)->Option<> │  │
//! │  │ Resolved         │ fn(ctx)   │ -        │ fn(ctx)->Option<> │  │
//! │  │ FalseAlarm       │ fn(ctx)   │ -        │ fn(ctx)->Option<> │  │
//! │  └──────────────────┴───────────┴──────────┴───────────────────┘  │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine is event-driven rather than clocked: each call to
//! [`Fsm::dispatch`] hands one stimulus (placed in
//! [`OrchestratorContext::stimulus`]) to the current state's `on_update`.
//! If it returns `Some(next)`, the engine runs `on_exit` for the current
//! state, then `on_enter` for the next, and immediately re-runs
//! `on_update` on the new state with no stimulus.  That second pass is how
//! eventless transitions (`Detecting → ConfirmedPending`,
//! `FalseAlarm → Idle`) settle within the same dispatch.

pub mod context;
pub mod states;

use context::OrchestratorContext;
use log::info;
use serde::Serialize;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Orchestrator state, doubling as the status of the open case.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Status {
    Idle = 0,
    Detecting = 1,
    ConfirmedPending = 2,
    Responding = 3,
    Resolved = 4,
    FalseAlarm = 5,
}

impl Status {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 6;

    /// Convert an index back to `Status`.  Panics on out-of-range in
    /// debug builds; returns `Idle` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Detecting,
            2 => Self::ConfirmedPending,
            3 => Self::Responding,
            4 => Self::Resolved,
            5 => Self::FalseAlarm,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Idle
            }
        }
    }

    /// States during which a case is open and new candidates are ignored.
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Detecting | Self::ConfirmedPending | Self::Responding)
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut OrchestratorContext);

/// Signature for the per-stimulus update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut OrchestratorContext) -> Option<Status>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

pub struct StateDescriptor {
    pub id: Status,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `Status as usize`.
    table: [StateDescriptor; Status::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Stimuli dispatched since construction.
    dispatch_count: u64,
    /// Transitions executed since construction.
    transition_count: u64,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; Status::COUNT], initial: Status) -> Self {
        Self {
            table,
            current: initial as usize,
            dispatch_count: 0,
            transition_count: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `dispatch()`.
    pub fn start(&mut self, ctx: &mut OrchestratorContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Hand the stimulus in `ctx` to the current state and settle.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. On `Some(next)`: `on_exit(current)` → update pointer →
    ///    `on_enter(next)`, then repeat from 1 with the stimulus consumed.
    /// 3. Stop when a state stays put.  The chain is bounded by the number
    ///    of states.
    pub fn dispatch(&mut self, ctx: &mut OrchestratorContext) {
        self.dispatch_count += 1;

        for _ in 0..Status::COUNT {
            let Some(next) = (self.table[self.current].on_update)(ctx) else {
                break;
            };
            // Whatever the first handler did not consume is dropped here so
            // the settling passes run eventless.
            ctx.stimulus = None;
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> Status {
        Status::from_index(self.current)
    }

    pub fn dispatch_count(&self) -> u64 {
        self.dispatch_count
    }

    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next: Status, ctx: &mut OrchestratorContext) {
        let next_idx = next as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.transition_count += 1;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
