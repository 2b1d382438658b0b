//! Debounced scan scheduling.
//!
//! Page events arrive on a channel and drive an explicit state
//! machine; the machine's output is only ever a timer instruction, so
//! the scheduling policy is a pure function testable without a
//! runtime. The async loop around it owns the single timer and runs
//! scans inline, which makes scans naturally non-reentrant: events
//! arriving mid-scan buffer in the channel and are handled after
//! completion, never preempting it.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use url::Url;

use crate::pipeline::ScanPipeline;
use crate::types::ScraperConfig;

/// Page-side happenings the scheduler reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// The page finished loading.
    PageReady,
    /// The document subtree changed (child-list or character data).
    DomMutated,
    /// The page navigated in place.
    UrlChanged(Url),
    Enable,
    Disable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    /// A scan timer is armed.
    Scheduled,
    Scanning,
    /// Terminal until re-enabled.
    Disabled,
}

/// Timer instruction produced by a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    Arm(Duration),
    Disarm,
    Keep,
}

/// The scheduling state machine.
///
/// Initial page readiness waits out a longer settle delay; later
/// mutations coalesce under a shorter debounce, every new mutation
/// restarting it. A mutation observed mid-scan defers to one rescan
/// after completion.
#[derive(Debug)]
pub struct ScanScheduler {
    config: ScraperConfig,
    state: SchedulerState,
    rescan_pending: bool,
}

impl ScanScheduler {
    pub fn new(config: ScraperConfig) -> Self {
        Self {
            config,
            state: SchedulerState::Idle,
            rescan_pending: false,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Apply one event and report what to do with the timer.
    pub fn on_event(&mut self, event: &PageEvent) -> TimerAction {
        use SchedulerState::*;

        match (self.state, event) {
            (Disabled | Idle, PageEvent::Enable) => {
                self.state = Scheduled;
                TimerAction::Arm(self.config.initial_scan_delay)
            }
            (_, PageEvent::Enable) => TimerAction::Keep,

            (Disabled, PageEvent::Disable) => TimerAction::Keep,
            (_, PageEvent::Disable) => {
                self.state = Disabled;
                self.rescan_pending = false;
                tracing::debug!("scheduler disabled, pending timer cancelled");
                TimerAction::Disarm
            }

            (Disabled, _) => TimerAction::Keep,

            (Idle, PageEvent::PageReady) => {
                self.state = Scheduled;
                TimerAction::Arm(self.config.initial_scan_delay)
            }
            (_, PageEvent::PageReady) => TimerAction::Keep,

            // Each mutation restarts the debounce window
            (Idle | Scheduled, PageEvent::DomMutated) => {
                self.state = Scheduled;
                TimerAction::Arm(self.config.mutation_debounce)
            }
            (Scanning, PageEvent::DomMutated) => {
                self.rescan_pending = true;
                TimerAction::Keep
            }

            // Navigation never changes scheduling, only page memory
            (_, PageEvent::UrlChanged(_)) => TimerAction::Keep,
        }
    }

    /// The armed timer fired. True means a scan should run now.
    pub fn on_timer_fired(&mut self) -> bool {
        if self.state == SchedulerState::Scheduled {
            self.state = SchedulerState::Scanning;
            true
        } else {
            false
        }
    }

    /// A scan finished; arm a deferred rescan if a mutation arrived
    /// mid-scan.
    pub fn on_scan_complete(&mut self) -> TimerAction {
        if self.state == SchedulerState::Disabled {
            return TimerAction::Keep;
        }
        if self.rescan_pending {
            self.rescan_pending = false;
            self.state = SchedulerState::Scheduled;
            TimerAction::Arm(self.config.mutation_debounce)
        } else {
            self.state = SchedulerState::Idle;
            TimerAction::Keep
        }
    }

    /// Drive the machine from an event channel until it closes.
    pub async fn run<P: ScanPipeline>(mut self, pipeline: P, mut events: mpsc::Receiver<PageEvent>) {
        let timer = sleep(Duration::ZERO);
        tokio::pin!(timer);
        let mut armed = false;

        loop {
            tokio::select! {
                maybe_event = events.recv() => {
                    let Some(event) = maybe_event else { break };

                    if let PageEvent::UrlChanged(url) = &event {
                        pipeline.note_url_changed(url.clone()).await;
                    }

                    match self.on_event(&event) {
                        TimerAction::Arm(delay) => {
                            timer.as_mut().reset(Instant::now() + delay);
                            armed = true;
                        }
                        TimerAction::Disarm => armed = false,
                        TimerAction::Keep => {}
                    }
                }
                _ = timer.as_mut(), if armed => {
                    armed = false;
                    if !self.on_timer_fired() {
                        continue;
                    }

                    if let Err(error) = pipeline.run_scan().await {
                        tracing::warn!(%error, "scheduled scan failed");
                    }

                    if let TimerAction::Arm(delay) = self.on_scan_complete() {
                        timer.as_mut().reset(Instant::now() + delay);
                        armed = true;
                    }
                }
            }
        }

        tracing::debug!("event channel closed, scheduler stopped");
    }
}

/// Sends page events to a spawned scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<PageEvent>,
}

impl SchedulerHandle {
    pub async fn page_ready(&self) {
        self.send(PageEvent::PageReady).await;
    }

    pub async fn dom_mutated(&self) {
        self.send(PageEvent::DomMutated).await;
    }

    pub async fn url_changed(&self, url: Url) {
        self.send(PageEvent::UrlChanged(url)).await;
    }

    pub async fn enable(&self) {
        self.send(PageEvent::Enable).await;
    }

    pub async fn disable(&self) {
        self.send(PageEvent::Disable).await;
    }

    async fn send(&self, event: PageEvent) {
        if self.tx.send(event).await.is_err() {
            tracing::warn!("scheduler task is gone, event dropped");
        }
    }
}

/// Spawn a scheduler task for one page context.
pub fn spawn_scheduler<P>(config: ScraperConfig, pipeline: P) -> SchedulerHandle
where
    P: ScanPipeline + 'static,
{
    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(ScanScheduler::new(config).run(pipeline, rx));
    SchedulerHandle { tx }
}
