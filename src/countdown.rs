//! Escalation countdown.
//!
//! The orchestrator owns exactly one [`Countdown`].  It does not own a
//! timer: a periodic 1 s tick source outside the FSM enqueues
//! `CountdownTick(case_id)` events, and each tick is applied here.  A tick
//! only counts if the countdown is armed **for that case**; anything else
//! is stale and a no-op.  Disarming is therefore observable by the very
//! next tick, even one that was already queued.

use log::{debug, info};

use crate::model::CaseId;

/// Outcome of applying one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not armed, or armed for a different case.
    Stale,
    /// Decremented; seconds left.
    Running(u32),
    /// Reached zero.  The countdown disarms itself.
    Expired,
}

#[derive(Debug, Default)]
pub struct Countdown {
    armed_for: Option<CaseId>,
    remaining_secs: u32,
}

impl Countdown {
    pub const fn new() -> Self {
        Self {
            armed_for: None,
            remaining_secs: 0,
        }
    }

    /// Start counting down `secs` for `case`.  Re-arming replaces any
    /// previous countdown.
    pub fn arm(&mut self, case: CaseId, secs: u32) {
        info!("Countdown: armed {}s for {}", secs, case);
        self.armed_for = Some(case);
        self.remaining_secs = secs;
    }

    /// Stop the countdown.  Returns the case it was armed for.
    pub fn disarm(&mut self) -> Option<CaseId> {
        let was = self.armed_for.take();
        if let Some(case) = was {
            info!("Countdown: disarmed for {} at {}s", case, self.remaining_secs);
        }
        was
    }

    /// Apply one elapsed second on behalf of `case`.
    pub fn tick(&mut self, case: CaseId) -> TickOutcome {
        if self.armed_for != Some(case) {
            debug!("Countdown: stale tick for {} ignored", case);
            return TickOutcome::Stale;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.armed_for = None;
            TickOutcome::Expired
        } else {
            TickOutcome::Running(self.remaining_secs)
        }
    }

    pub fn armed_for(&self) -> Option<CaseId> {
        self.armed_for
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }
}
