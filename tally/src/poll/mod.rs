//! # Poll Loop
//!
//! Drives read → rank → render at a fixed interval until cancelled.
//!
//! ## States
//!
//! ```text
//! Idle ──run()──▶ Running ──cancel / render failure──▶ Stopped
//! ```
//!
//! ## Timing
//!
//! - The first tick fires one full interval after `run()` starts.
//! - Ticks never overlap. A tick that overruns its interval pushes the next
//!   one a full interval past its own end; nothing is skipped or bunched up.
//! - Cancellation is checked between ticks only, so it is honoured within one
//!   interval and never interrupts a table walk.
//!
//! ## Failures
//!
//! A failed table read is logged and counted; the loop keeps going. A failed
//! render stops the loop, since there is nobody left to report to.

use log::{debug, info, warn};
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::domain::{LoopError, Target};
use crate::image::CountTable;
use crate::render::{Render, Report};
use crate::snapshot::{rank, read};

/// Interval used when the configured one is zero, negative or not a number.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

/// Longest interval the loop will schedule. Larger ones are capped.
pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Width used when the configured one is zero or negative.
pub const DEFAULT_TOP_N: usize = 10;

/// Normalized loop settings. Construct with [`PollSettings::normalized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub top_n: usize,
    pub reset: bool,
}

impl PollSettings {
    /// Apply defaults: non-positive interval → [`DEFAULT_INTERVAL`],
    /// non-positive width → [`DEFAULT_TOP_N`]. Intervals that round to zero
    /// count as non-positive; intervals above [`MAX_INTERVAL`] are capped.
    #[must_use]
    pub fn normalized(interval_secs: f64, top_n: i64, reset: bool) -> Self {
        let interval = if interval_secs.is_finite() && interval_secs > 0.0 {
            Duration::try_from_secs_f64(interval_secs).unwrap_or(MAX_INTERVAL)
        } else {
            DEFAULT_INTERVAL
        };
        let interval = schedulable(interval);
        let top_n = usize::try_from(top_n).ok().filter(|n| *n > 0).unwrap_or(DEFAULT_TOP_N);
        Self { interval, top_n, reset }
    }
}

/// Zero → [`DEFAULT_INTERVAL`], anything above [`MAX_INTERVAL`] → the cap.
fn schedulable(interval: Duration) -> Duration {
    if interval.is_zero() {
        DEFAULT_INTERVAL
    } else {
        interval.min(MAX_INTERVAL)
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self { interval: DEFAULT_INTERVAL, top_n: DEFAULT_TOP_N, reset: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
}

/// Counters kept across ticks, reported at shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub ticks: u64,
    pub rendered: u64,
    pub failed_reads: u64,
    /// Entries seen on the most recent successful read
    pub last_observed: usize,
}

pub struct PollLoop<T, R> {
    table: T,
    renderer: R,
    settings: PollSettings,
    target: Target,
    cancel: CancellationToken,
    state: LoopState,
    stats: TickStats,
}

impl<T: CountTable, R: Render> PollLoop<T, R> {
    pub fn new(
        table: T,
        renderer: R,
        settings: PollSettings,
        target: Target,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            table,
            renderer,
            settings,
            target,
            cancel,
            state: LoopState::Idle,
            stats: TickStats::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }

    #[must_use]
    pub fn stats(&self) -> TickStats {
        self.stats
    }

    #[must_use]
    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    /// Tick until the cancellation token fires.
    ///
    /// # Errors
    /// `LoopError::AlreadyStarted` if called twice, `LoopError::Render` if a
    /// report could not be written. The loop is `Stopped` afterwards either way.
    pub async fn run(&mut self) -> Result<TickStats, LoopError> {
        if self.state != LoopState::Idle {
            return Err(LoopError::AlreadyStarted(self.state));
        }
        self.state = LoopState::Running;

        // Fields are public, so settings may not have gone through `normalized`
        let period = schedulable(self.settings.interval);
        let start = Instant::now().checked_add(period).unwrap_or_else(Instant::now);
        let mut ticker = interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!("Polling every {period:?}, top {}", self.settings.top_n);

        let outcome = loop {
            let deadline = tokio::select! {
                biased;
                () = self.cancel.cancelled() => break Ok(()),
                deadline = ticker.tick() => deadline,
            };
            if let Err(e) = self.tick() {
                break Err(e);
            }
            if deadline.elapsed() >= period {
                debug!("Tick {} overran {period:?}, next one in a full interval", self.stats.ticks);
                ticker.reset();
            }
        };

        self.state = LoopState::Stopped;
        info!(
            "Poll loop stopped after {} ticks ({} rendered, {} failed reads)",
            self.stats.ticks, self.stats.rendered, self.stats.failed_reads
        );
        outcome.map(|()| self.stats)
    }

    /// One read → rank → render cycle.
    fn tick(&mut self) -> Result<(), LoopError> {
        self.stats.ticks += 1;

        let snapshot = match read(&mut self.table, self.settings.reset) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.stats.failed_reads += 1;
                warn!("Tick {}: {e}", self.stats.ticks);
                return Ok(());
            }
        };
        self.stats.last_observed = snapshot.len();

        let view = rank(snapshot, self.settings.top_n);
        self.renderer.render(&Report::new(&self.target, &view))?;
        self.stats.rendered += 1;
        Ok(())
    }
}
