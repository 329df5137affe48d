//! Async driver for the emergency service.
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────────┐
//!  │  futures_lite::future::block_on                          │
//!  │  ┌────────────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor                      │  │
//!  │  │   ├─ ticker  (1 s, enqueues CountdownTick if armed)│  │
//!  │  │   └─ process (receive → EmergencyService::handle)  │  │
//!  │  └────────────────────────────────────────────────────┘  │
//!  └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The ticker is the only time source.  It never touches the service: it
//! reads which case the countdown is armed for (published by the process
//! task after every event) and enqueues a tick tagged with that case.  A
//! tick that was queued before a cancel is therefore stale by the time it
//! is processed, and the countdown ignores it.
//!
//! Arming a new case signals the ticker to restart its period, so the first
//! tick lands a full period after the countdown starts.  Ticks wait for
//! queue space rather than being dropped.

use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker};
use log::{debug, info};

use crate::app::ports::{AlertPort, DialerPort, EventSink};
use crate::app::service::EmergencyService;
use crate::events::{Event, EventQueue};
use crate::model::CaseId;

/// Countdown resolution.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

pub struct Runtime<'q> {
    queue: &'q EventQueue,
    /// Case the countdown is armed for, mirrored from the service.
    armed: Mutex<CriticalSectionRawMutex, Cell<Option<CaseId>>>,
    /// Raised when a new case arms; the ticker restarts its period.
    rearm: Signal<CriticalSectionRawMutex, ()>,
    tick_period: Duration,
}

impl<'q> Runtime<'q> {
    pub fn new(queue: &'q EventQueue) -> Self {
        Self {
            queue,
            armed: Mutex::new(Cell::new(None)),
            rearm: Signal::new(),
            tick_period: TICK_PERIOD,
        }
    }

    /// Override the tick period (simulation and tests).
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    pub fn queue(&self) -> &'q EventQueue {
        self.queue
    }

    /// Case the ticker is currently producing ticks for.
    pub fn armed(&self) -> Option<CaseId> {
        self.armed.lock(Cell::get)
    }

    /// Run until an [`Event::Shutdown`] is processed.  Blocks the calling
    /// thread; producers enqueue from other threads.
    pub fn run_blocking(
        &self,
        service: &mut EmergencyService,
        out: &mut (impl AlertPort + DialerPort),
        sink: &mut impl EventSink,
    ) {
        let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();

        executor.spawn(self.ticker()).detach();

        info!(
            "Runtime started (tick period {} ms)",
            self.tick_period.as_millis()
        );

        futures_lite::future::block_on(executor.run(self.process(service, out, sink)));

        info!("Runtime stopped");
    }

    /// Process everything already queued, synchronously, without ticking.
    /// Stops early at a shutdown event.  Returns the number of events
    /// handled.
    pub fn drain_pending(
        &self,
        service: &mut EmergencyService,
        out: &mut (impl AlertPort + DialerPort),
        sink: &mut impl EventSink,
    ) -> usize {
        let mut handled = 0;
        while let Some(event) = self.queue.pop() {
            if event == Event::Shutdown {
                debug!("drain stopped at shutdown");
                break;
            }
            service.handle(event, out, sink);
            handled += 1;
        }
        self.publish_armed(service);
        handled
    }

    // ── Tasks ────────────────────────────────────────────────

    async fn ticker(&self) {
        let mut ticker = Ticker::every(self.tick_period);
        loop {
            let rearmed = futures_lite::future::or(
                async {
                    self.rearm.wait().await;
                    true
                },
                async {
                    ticker.next().await;
                    false
                },
            )
            .await;

            if rearmed {
                debug!("countdown armed, ticker period restarted");
                ticker.reset();
                continue;
            }
            if let Some(case_id) = self.armed() {
                self.queue.send(Event::CountdownTick { case_id }).await;
            }
        }
    }

    async fn process(
        &self,
        service: &mut EmergencyService,
        out: &mut (impl AlertPort + DialerPort),
        sink: &mut impl EventSink,
    ) {
        self.publish_armed(service);
        loop {
            let event = self.queue.receive().await;
            if event == Event::Shutdown {
                info!("Runtime: shutdown requested");
                break;
            }
            service.handle(event, out, sink);
            self.publish_armed(service);
        }
    }

    fn publish_armed(&self, service: &EmergencyService) {
        let armed = service.armed_countdown();
        let previous = self.armed.lock(|cell| cell.replace(armed));
        if armed.is_some() && armed != previous {
            self.rearm.signal(());
        }
    }
}
