//! Clicks gated on element state, and click-until-condition retries.
//!
//! [`Waiter::clickable_click`] waits for "visible and enabled", pauses, then
//! clicks exactly once. [`Waiter::click_until`] layers a bounded retry on
//! top: click, look for the expected effect, look again for a short window,
//! and try again until the [`RetryBudget`] is spent.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::condition::Condition;
use crate::config::RetryBudget;
use crate::diagnostics::DiagnosticCapture;
use crate::element::{Check, Clickable, Observable};
use crate::result::{SettleError, SettleResult, Staleness};
use crate::session::PageSession;
use crate::wait::Waiter;

/// What happened when an attempt tried to click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The click was issued
    Clicked,
    /// The actor was not in the document
    Missing,
    /// The actor went stale during the probe or the click
    Stale(Staleness),
}

/// Result of the secondary confirmation window
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// Expected condition observed
    Confirmed,
    /// Observed element was readable but never matched
    NotObserved,
    /// Last read of the observed element failed
    CheckFailed(Staleness),
}

/// Summary of a successful click-until
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickReport {
    /// Attempts consumed, including the successful one
    pub attempts: u32,
    /// Clicks actually issued
    pub clicks: u32,
    /// Total time spent
    pub elapsed: Duration,
}

impl<C: Clock> Waiter<C> {
    /// Click `target` once it is visible and enabled, after `delay`.
    ///
    /// Waits up to the configured global timeout for the precondition.
    /// The click itself is not retried.
    pub fn clickable_click<T>(&self, target: &T, delay: Duration) -> SettleResult<()>
    where
        T: Clickable + ?Sized,
    {
        let precondition = Condition::clickable();
        let timeout = self.config().timeout();
        let report = self.poll_report(|| target.has(&precondition), timeout);
        if !report.satisfied() {
            warn!(
                target = target.name(),
                condition = %precondition,
                attempts = report.attempts,
                "click precondition never held"
            );
            return Err(SettleError::PreconditionTimeout {
                target: target.name().to_string(),
                condition: precondition.describe(),
                ms: timeout.as_millis() as u64,
            });
        }

        self.sleep(delay);
        target.hover()?;
        target.click()?;
        debug!(target = target.name(), "clicked");
        Ok(())
    }

    /// [`Waiter::clickable_click`] with the configured default delay
    pub fn click<T>(&self, target: &T) -> SettleResult<()>
    where
        T: Clickable + ?Sized,
    {
        self.clickable_click(target, self.config().click_delay())
    }

    /// Click `actor` until `observed` satisfies `expected`.
    ///
    /// Performs at most `budget.max_retries` attempts. On exhaustion a
    /// screenshot is taken through `session` and
    /// [`SettleError::RetryExhausted`] is returned.
    pub fn click_until<A, O>(
        &self,
        session: &dyn PageSession,
        actor: &A,
        observed: &O,
        expected: &Condition,
        budget: RetryBudget,
    ) -> SettleResult<ClickReport>
    where
        A: Clickable + ?Sized,
        O: Observable + ?Sized,
    {
        let start = self.clock().now();
        let mut attempt = 0;
        let mut clicks = 0;

        while attempt < budget.max_retries {
            self.sleep(budget.pacing());
            attempt += 1;

            match Self::attempt_click(actor) {
                AttemptOutcome::Clicked => clicks += 1,
                AttemptOutcome::Missing => {
                    debug!(attempt, actor = actor.name(), "actor not present, skipping click");
                    continue;
                }
                AttemptOutcome::Stale(stale) => {
                    warn!(attempt, actor = actor.name(), error = %stale, "stale actor, retrying");
                    continue;
                }
            }

            if observed.check(expected).is_satisfied() {
                return Ok(self.succeed(actor, observed, expected, attempt, clicks, start));
            }

            match self.confirm(observed, expected) {
                Confirmation::Confirmed => {
                    return Ok(self.succeed(actor, observed, expected, attempt, clicks, start));
                }
                Confirmation::NotObserved => {
                    debug!(
                        attempt,
                        observed = observed.name(),
                        expected = %expected,
                        "condition not observed after click"
                    );
                }
                Confirmation::CheckFailed(stale) => {
                    warn!(
                        attempt,
                        observed = observed.name(),
                        error = %stale,
                        "could not read observed element after click"
                    );
                }
            }
        }

        let diagnostic = DiagnosticCapture::new(&self.config().diagnostics_dir)
            .capture(session, actor.name())
            .map(|d| d.path);
        warn!(
            actor = actor.name(),
            observed = observed.name(),
            expected = %expected,
            attempts = attempt,
            clicks,
            "click-until budget exhausted"
        );
        Err(SettleError::RetryExhausted {
            actor: actor.name().to_string(),
            expected: expected.describe(),
            observed: observed.name().to_string(),
            attempts: attempt,
            diagnostic,
        })
    }

    /// [`Waiter::click_until`] with the configured default budget
    pub fn click_until_default<A, O>(
        &self,
        session: &dyn PageSession,
        actor: &A,
        observed: &O,
        expected: &Condition,
    ) -> SettleResult<ClickReport>
    where
        A: Clickable + ?Sized,
        O: Observable + ?Sized,
    {
        self.click_until(session, actor, observed, expected, self.config().retry)
    }

    /// Probe, move to and click `actor`, reporting staleness as data
    pub fn attempt_click<A>(actor: &A) -> AttemptOutcome
    where
        A: Clickable + ?Sized,
    {
        match actor.exists() {
            Ok(true) => {}
            Ok(false) => return AttemptOutcome::Missing,
            Err(stale) => return AttemptOutcome::Stale(stale),
        }
        match actor.hover().and_then(|()| actor.click()) {
            Ok(()) => AttemptOutcome::Clicked,
            Err(stale) => AttemptOutcome::Stale(stale),
        }
    }

    /// Poll `observed` for the configured confirmation window
    pub fn confirm<O>(&self, observed: &O, expected: &Condition) -> Confirmation
    where
        O: Observable + ?Sized,
    {
        let mut last_stale = None;
        let confirmed = self.poll_until(
            || match observed.check(expected) {
                Check::Satisfied => true,
                Check::Unsatisfied => {
                    last_stale = None;
                    false
                }
                Check::Stale(stale) => {
                    last_stale = Some(stale);
                    false
                }
            },
            self.config().confirm_window(),
        );
        if confirmed {
            Confirmation::Confirmed
        } else if let Some(stale) = last_stale {
            Confirmation::CheckFailed(stale)
        } else {
            Confirmation::NotObserved
        }
    }

    fn succeed<A, O>(
        &self,
        actor: &A,
        observed: &O,
        expected: &Condition,
        attempts: u32,
        clicks: u32,
        start: Duration,
    ) -> ClickReport
    where
        A: Clickable + ?Sized,
        O: Observable + ?Sized,
    {
        let elapsed = self.clock().now().saturating_sub(start);
        info!(
            actor = actor.name(),
            observed = observed.name(),
            expected = %expected,
            attempts,
            clicks,
            "click confirmed"
        );
        ClickReport {
            attempts,
            clicks,
            elapsed,
        }
    }
}
