//! Waiter and the bounded-time condition poller.
//!
//! [`Waiter`] owns the configuration and clock for one test thread's
//! interactions. Polling comes in two flavours:
//!
//! - **Advisory**: [`Waiter::poll_until`] and [`Waiter::is_present`] return
//!   `false` on timeout. Absence is a legitimate answer ("no alert shown").
//! - **Fatal**: [`Waiter::wait_until`] turns the same timeout into
//!   [`SettleError::Timeout`] for states the test cannot proceed without.
//!
//! The click and idle layers in [`crate::click`] and [`crate::idle`] add
//! further `impl Waiter` blocks on top of these primitives.

use std::time::Duration;

use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};
use crate::condition::Condition;
use crate::config::WaitConfig;
use crate::element::Observable;
use crate::result::{SettleError, SettleResult};

/// One evaluation of a polled predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollAttempt {
    /// Zero-based attempt index
    pub index: u32,
    /// Time since polling started
    pub elapsed: Duration,
    /// Predicate result
    pub satisfied: bool,
}

/// Outcome of a polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    /// Number of predicate evaluations
    pub attempts: u32,
    /// Total time spent
    pub elapsed: Duration,
    /// Final evaluation
    pub last: PollAttempt,
}

impl PollReport {
    /// Whether the predicate was observed true
    #[must_use]
    pub const fn satisfied(&self) -> bool {
        self.last.satisfied
    }
}

/// Blocking wait/retry engine bound to one configuration and clock
#[derive(Debug, Clone, Default)]
pub struct Waiter<C: Clock = SystemClock> {
    config: WaitConfig,
    clock: C,
}

impl Waiter<SystemClock> {
    /// Waiter with default configuration and the wall clock
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waiter with custom configuration and the wall clock
    #[must_use]
    pub fn with_config(config: WaitConfig) -> Self {
        Self {
            config,
            clock: SystemClock::new(),
        }
    }
}

impl<C: Clock> Waiter<C> {
    /// Waiter with an explicit clock
    #[must_use]
    pub fn with_clock(config: WaitConfig, clock: C) -> Self {
        Self { config, clock }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &WaitConfig {
        &self.config
    }

    /// Clock used for sleeps and elapsed time
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    pub(crate) fn sleep(&self, duration: Duration) {
        self.clock.sleep(duration);
    }

    /// Poll `predicate` until it holds or `timeout` elapses.
    ///
    /// The predicate is evaluated at least once, even for a zero timeout.
    pub fn poll_report<F>(&self, mut predicate: F, timeout: Duration) -> PollReport
    where
        F: FnMut() -> bool,
    {
        let start = self.clock.now();
        let interval = self.config.poll_interval();
        let mut index = 0;

        loop {
            let satisfied = predicate();
            let elapsed = self.clock.now().saturating_sub(start);
            let last = PollAttempt {
                index,
                elapsed,
                satisfied,
            };
            trace!(attempt = index, ?elapsed, satisfied, "poll");

            let remaining = timeout.saturating_sub(elapsed);
            if satisfied || remaining.is_zero() {
                return PollReport {
                    attempts: index + 1,
                    elapsed,
                    last,
                };
            }

            self.clock.sleep(interval.min(remaining));
            index += 1;
        }
    }

    /// Advisory poll: `true` once `predicate` holds, `false` on timeout
    pub fn poll_until<F>(&self, predicate: F, timeout: Duration) -> bool
    where
        F: FnMut() -> bool,
    {
        let report = self.poll_report(predicate, timeout);
        if !report.satisfied() {
            debug!(
                attempts = report.attempts,
                timeout_ms = timeout.as_millis() as u64,
                "condition absent after advisory poll"
            );
        }
        report.satisfied()
    }

    /// Fatal poll: times out with [`SettleError::Timeout`]
    pub fn wait_until<F>(
        &self,
        predicate: F,
        timeout: Duration,
        waited_for: &str,
    ) -> SettleResult<PollReport>
    where
        F: FnMut() -> bool,
    {
        let report = self.poll_report(predicate, timeout);
        if report.satisfied() {
            Ok(report)
        } else {
            Err(SettleError::Timeout {
                waited_for: waited_for.to_string(),
                ms: timeout.as_millis() as u64,
            })
        }
    }

    /// Advisory probe: does `observable` reach `condition` within `timeout`
    pub fn is_present<O>(&self, observable: &O, condition: &Condition, timeout: Duration) -> bool
    where
        O: Observable + ?Sized,
    {
        self.poll_until(|| observable.has(condition), timeout)
    }
}
