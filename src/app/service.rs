//! Application service: the hexagonal core.
//!
//! [`EmergencyService`] owns the FSM, the detectors, the alert coordinator
//! and the call gate.  It is the single writer of the emergency case: every
//! [`Event`] is applied here, one at a time, in the order it was received.
//! All I/O flows through port traits injected at call sites, making the
//! entire service testable with mock adapters.
//!
//! ```text
//!                 ┌──────────────────────────────┐ ──▶ AlertPort
//!  Event ───────▶ │      EmergencyService        │ ──▶ DialerPort
//!                 │  Detect · FSM · Alerts · Call│ ──▶ EventSink
//!                 └──────────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::alerts::{AlertCoordinator, AlertPlan};
use crate::call_gate::CallGate;
use crate::config::EmergencyConfig;
use crate::detect::{MotionAnomalyDetector, VitalsAnomalyEvaluator};
use crate::error::Result;
use crate::events::Event;
use crate::fsm::context::{OrchestratorContext, Stimulus, Transition};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, Status};
use crate::model::{CallState, Candidate, CandidateKind, CaseId, EmergencyCase};

use super::events::{AppEvent, DeliveryTarget};
use super::ports::{AlertPort, DialerPort, EventSink};

// ───────────────────────────────────────────────────────────────
// EmergencyService
// ───────────────────────────────────────────────────────────────

pub struct EmergencyService {
    fsm: Fsm,
    ctx: OrchestratorContext,
    motion: MotionAnomalyDetector,
    vitals: VitalsAnomalyEvaluator,
    alerts: AlertCoordinator,
    calls: CallGate,
    events_handled: u64,
}

impl EmergencyService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM. Call [`start`](Self::start) next.
    pub fn new(config: EmergencyConfig) -> Self {
        let motion = MotionAnomalyDetector::new(&config);
        let vitals = VitalsAnomalyEvaluator::new(config.vitals);
        let alerts = AlertCoordinator::new(&config);
        let calls = CallGate::new(&config.emergency_number);
        let ctx = OrchestratorContext::new(config);
        let fsm = Fsm::new(build_state_table(), Status::Idle);

        Self {
            fsm,
            ctx,
            motion,
            vitals,
            alerts,
            calls,
            events_handled: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started {
            state: self.fsm.current_state(),
        });
        info!("EmergencyService started in {:?}", self.fsm.current_state());
    }

    // ── Event handling ────────────────────────────────────────

    /// Apply one queued event.
    ///
    /// `out` satisfies **both** [`AlertPort`] and [`DialerPort`].
    pub fn handle(
        &mut self,
        event: Event,
        out: &mut (impl AlertPort + DialerPort),
        sink: &mut impl EventSink,
    ) {
        self.events_handled += 1;

        match event {
            Event::Motion(sample) => match self.motion.classify(&sample) {
                Ok(anomalies) => {
                    for anomaly in anomalies {
                        let candidate =
                            Candidate::detected(anomaly.candidate_kind(), sample.timestamp_ms);
                        self.dispatch(Stimulus::Candidate(candidate), out, sink);
                    }
                }
                Err(e) => warn!("dropping motion sample at {} ms: {}", sample.timestamp_ms, e),
            },
            Event::Vitals(snapshot) => {
                if let Some(flag) = self.vitals.first_violation(&snapshot) {
                    info!(
                        "VITALS: {} out of range (violations 0b{:04b})",
                        flag,
                        self.vitals.violations(&snapshot)
                    );
                    let candidate =
                        Candidate::detected(CandidateKind::VitalsAbnormal, snapshot.timestamp_ms);
                    self.dispatch(Stimulus::Candidate(candidate), out, sink);
                }
            }
            Event::ManualTrigger {
                kind,
                severity,
                at_ms,
            } => {
                let candidate = Candidate {
                    kind,
                    detected_at_ms: at_ms,
                    severity_hint: severity,
                };
                self.dispatch(Stimulus::Candidate(candidate), out, sink);
            }
            Event::User { action } => self.dispatch(Stimulus::Action(action), out, sink),
            Event::CallEnded { case_id } => {
                if self.calls.on_call_ended(case_id, self.ctx.case_id()) {
                    self.dispatch(Stimulus::CallEnded(case_id), out, sink);
                }
            }
            Event::CountdownTick { case_id } => {
                self.dispatch(Stimulus::Tick(case_id), out, sink);
            }
            Event::Shutdown => debug!("shutdown has no effect on the orchestrator"),
        }
    }

    /// Replace the configuration.  Thresholds apply to the next sample;
    /// countdown length and alert settings apply to the next case.
    pub fn update_config(&mut self, config: EmergencyConfig) -> Result<()> {
        config.validate()?;
        self.motion.reconfigure(&config);
        self.vitals.set_bands(config.vitals);
        self.alerts.reconfigure(&config);
        self.calls.set_emergency_number(&config.emergency_number);
        self.ctx.config = config;
        info!("Configuration updated at runtime");
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> Status {
        self.fsm.current_state()
    }

    /// Whether a case is open, so new candidates would be ignored.  A
    /// resolved record awaiting `Clear` is not open.
    pub fn has_open_case(&self) -> bool {
        self.fsm.current_state().is_open()
    }

    /// The open (or resolved, not yet cleared) case.
    pub fn current_case(&self) -> Option<&EmergencyCase> {
        self.ctx.case.as_ref()
    }

    /// Case the countdown is armed for, if running.
    pub fn armed_countdown(&self) -> Option<CaseId> {
        self.ctx.countdown.armed_for()
    }

    pub fn call_state(&self, case_id: CaseId) -> CallState {
        self.calls.call_state(case_id)
    }

    pub fn config(&self) -> &EmergencyConfig {
        &self.ctx.config
    }

    pub fn motion_detector(&self) -> &MotionAnomalyDetector {
        &self.motion
    }

    /// Events applied since construction.
    pub fn events_handled(&self) -> u64 {
        self.events_handled
    }

    // ── Internal ──────────────────────────────────────────────

    fn dispatch(
        &mut self,
        stimulus: Stimulus,
        out: &mut (impl AlertPort + DialerPort),
        sink: &mut impl EventSink,
    ) {
        let prev_state = self.fsm.current_state();

        self.ctx.stimulus = Some(stimulus);
        self.fsm.dispatch(&mut self.ctx);
        self.ctx.stimulus = None;

        for transition in core::mem::take(&mut self.ctx.outbox) {
            self.route(transition, out, sink);
        }

        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }
    }

    /// Turn one FSM transition into outbound events and port calls.
    fn route(
        &mut self,
        transition: Transition,
        out: &mut (impl AlertPort + DialerPort),
        sink: &mut impl EventSink,
    ) {
        match transition {
            Transition::CaseOpened(case) => {
                let plan = self.alerts.plan_opened(&case);
                sink.emit(&AppEvent::CaseOpened { case });
                deliver_all(plan, out, sink);
            }
            Transition::CountdownStarted { case_id, seconds } => {
                sink.emit(&AppEvent::CountdownStarted { case_id, seconds });
            }
            Transition::CountdownTick { case_id, remaining } => {
                sink.emit(&AppEvent::CountdownTick { case_id, remaining });
            }
            Transition::Escalated(case) => {
                let call = self.calls.request_call(&case);
                let plan = self.alerts.plan_escalated(&case);
                sink.emit(&AppEvent::Escalated { case });

                if let Some(intent) = call {
                    let result = out.dial(&intent);
                    let case_id = intent.case_id;
                    sink.emit(&AppEvent::Call { intent });
                    if let Err(error) = result {
                        warn!("dialer failed for {}: {}", case_id, error);
                        sink.emit(&AppEvent::DeliveryFailed {
                            case_id,
                            target: DeliveryTarget::Dialer,
                            error,
                        });
                    }
                }
                deliver_all(plan, out, sink);
            }
            Transition::Resolved(case) => sink.emit(&AppEvent::CaseResolved { case }),
            Transition::CaseClosed { case, reason } => {
                self.calls.release(case.id);
                sink.emit(&AppEvent::CaseClosed {
                    final_status: case.status,
                    case,
                    reason,
                });
            }
            Transition::CandidateIgnored { kind, open_case } => {
                sink.emit(&AppEvent::CandidateIgnored { kind, open_case });
            }
        }
    }
}

/// Hand every intent to the alert port.  One failing channel never stops
/// the rest.
fn deliver_all(plan: AlertPlan, out: &mut impl AlertPort, sink: &mut impl EventSink) {
    for intent in plan {
        let result = out.deliver(&intent);
        let (case_id, channel) = (intent.case_id, intent.channel);
        sink.emit(&AppEvent::Alert { intent });
        if let Err(error) = result {
            warn!("{:?} alert for {} failed: {}", channel, case_id, error);
            sink.emit(&AppEvent::DeliveryFailed {
                case_id,
                target: DeliveryTarget::Alert(channel),
                error,
            });
        }
    }
}
