//! Console alert and dialer adapter.
//!
//! Stands in for the speech synthesiser, haptic engine, notification
//! centre, push service and phone dialer on a host.  Every intent is
//! logged and accepted.  Optionally, each dial request is answered with a
//! call-ended event after the call has "lasted" a number of ticks, which is
//! how the scenario runner closes the loop without a real phone.

use log::info;

use crate::alerts::AlertIntent;
use crate::app::ports::{AlertPort, DialerPort};
use crate::call_gate::CallIntent;
use crate::error::DeliveryError;
use crate::model::CaseId;

#[derive(Default)]
pub struct ConsoleOutputs {
    delivered: usize,
    dialed: Vec<CallIntent>,
    /// Simulated call length in seconds; `None` keeps calls open.
    hang_up_after_secs: Option<u32>,
    active_call: Option<(CaseId, u32)>,
}

impl ConsoleOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// End every placed call after `secs` simulated seconds.
    pub fn with_hang_up_after(mut self, secs: u32) -> Self {
        self.hang_up_after_secs = Some(secs);
        self
    }

    pub fn delivered(&self) -> usize {
        self.delivered
    }

    pub fn dialed(&self) -> &[CallIntent] {
        &self.dialed
    }

    /// Advance the simulated call by one second.  Returns the case whose
    /// call just ended, if any.
    pub fn advance_call(&mut self) -> Option<CaseId> {
        let (case_id, left) = self.active_call.as_mut()?;
        *left = left.saturating_sub(1);
        if *left == 0 {
            let ended = *case_id;
            self.active_call = None;
            info!("DIALER | call for {} ended", ended);
            Some(ended)
        } else {
            None
        }
    }
}

impl AlertPort for ConsoleOutputs {
    fn deliver(&mut self, intent: &AlertIntent) -> Result<(), DeliveryError> {
        self.delivered += 1;
        info!("OUTPUT | {:?} for {}", intent.channel, intent.case_id);
        Ok(())
    }
}

impl DialerPort for ConsoleOutputs {
    fn dial(&mut self, intent: &CallIntent) -> Result<(), DeliveryError> {
        info!("DIALER | dialing {} for {}", intent.phone_number, intent.case_id);
        if let Some(secs) = self.hang_up_after_secs {
            self.active_call = Some((intent.case_id, secs.max(1)));
        }
        self.dialed.push(intent.clone());
        Ok(())
    }
}
