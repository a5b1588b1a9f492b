//! Idle detection by paired sampling.
//!
//! A signal is sampled, the thread sleeps for the polling interval, and the
//! signal is sampled again. The page is idle when both samples are exactly
//! equal. A first sample that reads [`Measurement::Busy`] ends the cycle
//! without a second sample.
//!
//! Three signals ship with the crate:
//!
//! | Sampler | Measurement |
//! |---------|-------------|
//! | [`NetworkSampler`] | finished resource-timing entries outside the denylist |
//! | [`DomSampler`] | full serialized DOM |
//! | [`MarkerSampler`] | performance entries with a given name |

use std::fmt;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::MIN_POLL_INTERVAL_MS;
use crate::network::{Denylist, UrlPattern};
use crate::result::{SettleError, SettleResult};
use crate::session::PageSession;
use crate::wait::Waiter;

/// A sampled value of a page signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Measurement {
    /// Signal is mid-change and cannot be compared
    Busy,
    /// Numeric signal
    Count(u64),
    /// Textual signal compared by full content
    Content(String),
}

impl Measurement {
    /// Whether this is the busy sentinel
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => f.write_str("busy"),
            Self::Count(n) => write!(f, "{n}"),
            Self::Content(s) => write!(f, "{} bytes sha256:{}", s.len(), short_digest(s)),
        }
    }
}

/// Two samples of a signal taken one polling interval apart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdleSample {
    /// First sample
    pub first: Measurement,
    /// Second sample
    pub second: Measurement,
}

impl IdleSample {
    /// Idle iff both samples are comparable and exactly equal
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.first.is_busy() && !self.second.is_busy() && self.first == self.second
    }
}

/// Outcome of one sampling cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdleCycle {
    /// First sample was busy; no second sample taken
    Busy,
    /// Samples differed
    Changed(IdleSample),
    /// Samples matched
    Idle(IdleSample),
}

/// Summary of a completed idle wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdleReport {
    /// Cycles run, including the final idle one
    pub cycles: u32,
    /// Cycles cut short by a busy first sample
    pub busy_cycles: u32,
    /// Cycles whose samples differed
    pub changed_cycles: u32,
    /// Total time spent
    pub elapsed: Duration,
    /// The settled measurement
    pub settled: Measurement,
}

/// Source of measurements for idle detection
pub trait Sampler {
    /// Take one measurement
    fn sample(&mut self) -> SettleResult<Measurement>;

    /// What is being sampled, for logs and timeout errors
    fn describe(&self) -> String;
}

/// Adapts a closure into a [`Sampler`]
pub struct FnSampler<F> {
    func: F,
    description: String,
}

impl<F> FnSampler<F>
where
    F: FnMut() -> Measurement,
{
    /// Wrap `func`
    pub fn new(func: F, description: impl Into<String>) -> Self {
        Self {
            func,
            description: description.into(),
        }
    }
}

impl<F> fmt::Debug for FnSampler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSampler")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<F> Sampler for FnSampler<F>
where
    F: FnMut() -> Measurement,
{
    fn sample(&mut self) -> SettleResult<Measurement> {
        Ok((self.func)())
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// Counts finished, relevant resource-timing entries
pub struct NetworkSampler<'a> {
    session: &'a dyn PageSession,
    denylist: Denylist,
}

impl<'a> NetworkSampler<'a> {
    /// Sample `session`, ignoring URLs matched by `denylist`
    #[must_use]
    pub fn new(session: &'a dyn PageSession, denylist: &[UrlPattern]) -> Self {
        Self {
            session,
            denylist: Denylist::new(denylist),
        }
    }
}

impl fmt::Debug for NetworkSampler<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkSampler")
            .field("denylist", &self.denylist)
            .finish_non_exhaustive()
    }
}

impl Sampler for NetworkSampler<'_> {
    fn sample(&mut self) -> SettleResult<Measurement> {
        let mut count = 0;
        for entry in self.session.resource_entries()? {
            if self.denylist.is_denied(&entry.name) {
                continue;
            }
            if entry.is_pending() {
                debug!(url = %entry.name, "request still in flight");
                return Ok(Measurement::Busy);
            }
            count += 1;
        }
        Ok(Measurement::Count(count))
    }

    fn describe(&self) -> String {
        "network idle".to_string()
    }
}

/// Samples the full serialized DOM
pub struct DomSampler<'a> {
    session: &'a dyn PageSession,
}

impl<'a> DomSampler<'a> {
    /// Sample `session`'s DOM
    #[must_use]
    pub fn new(session: &'a dyn PageSession) -> Self {
        Self { session }
    }
}

impl fmt::Debug for DomSampler<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomSampler").finish_non_exhaustive()
    }
}

impl Sampler for DomSampler<'_> {
    fn sample(&mut self) -> SettleResult<Measurement> {
        self.session.dom_content().map(Measurement::Content)
    }

    fn describe(&self) -> String {
        "DOM stability".to_string()
    }
}

/// Counts performance-timeline entries with one name
pub struct MarkerSampler<'a> {
    session: &'a dyn PageSession,
    marker: String,
}

impl<'a> MarkerSampler<'a> {
    /// Sample entries named `marker`
    #[must_use]
    pub fn new(session: &'a dyn PageSession, marker: impl Into<String>) -> Self {
        Self {
            session,
            marker: marker.into(),
        }
    }
}

impl fmt::Debug for MarkerSampler<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkerSampler")
            .field("marker", &self.marker)
            .finish_non_exhaustive()
    }
}

impl Sampler for MarkerSampler<'_> {
    fn sample(&mut self) -> SettleResult<Measurement> {
        self.session
            .performance_entries(&self.marker)
            .map(Measurement::Count)
    }

    fn describe(&self) -> String {
        format!("performance marker {:?}", self.marker)
    }
}

impl<C: Clock> Waiter<C> {
    /// Run a single sampling cycle.
    ///
    /// Has no timeout of its own; [`Waiter::wait_idle`] bounds repetition.
    /// `interval` is raised to [`MIN_POLL_INTERVAL_MS`] if shorter.
    pub fn idle_cycle<S>(&self, sampler: &mut S, interval: Duration) -> SettleResult<IdleCycle>
    where
        S: Sampler + ?Sized,
    {
        let first = sampler.sample()?;
        if first.is_busy() {
            return Ok(IdleCycle::Busy);
        }
        self.sleep(interval.max(Duration::from_millis(MIN_POLL_INTERVAL_MS)));
        let second = sampler.sample()?;
        let pair = IdleSample { first, second };
        if pair.is_idle() {
            Ok(IdleCycle::Idle(pair))
        } else {
            Ok(IdleCycle::Changed(pair))
        }
    }

    /// Repeat sampling cycles until two consecutive samples match.
    ///
    /// After a busy cycle the waiter pauses one poll interval before the
    /// next. Total time is bounded by the configured global timeout.
    pub fn wait_idle<S>(&self, sampler: &mut S, interval: Duration) -> SettleResult<IdleReport>
    where
        S: Sampler + ?Sized,
    {
        let start = self.clock().now();
        let timeout = self.config().timeout();
        let mut cycles = 0;
        let mut busy_cycles = 0;
        let mut changed_cycles = 0;

        loop {
            let elapsed = self.clock().now().saturating_sub(start);
            if cycles > 0 && elapsed >= timeout {
                warn!(
                    signal = %sampler.describe(),
                    cycles,
                    busy_cycles,
                    changed_cycles,
                    "page never settled"
                );
                return Err(SettleError::Timeout {
                    waited_for: sampler.describe(),
                    ms: timeout.as_millis() as u64,
                });
            }

            cycles += 1;
            match self.idle_cycle(sampler, interval)? {
                IdleCycle::Idle(pair) => {
                    let elapsed = self.clock().now().saturating_sub(start);
                    info!(
                        signal = %sampler.describe(),
                        cycles,
                        elapsed_ms = elapsed.as_millis() as u64,
                        settled = %pair.second,
                        "idle"
                    );
                    return Ok(IdleReport {
                        cycles,
                        busy_cycles,
                        changed_cycles,
                        elapsed,
                        settled: pair.second,
                    });
                }
                IdleCycle::Busy => {
                    busy_cycles += 1;
                    debug!(signal = %sampler.describe(), cycle = cycles, "busy, retrying");
                    self.sleep(self.config().poll_interval());
                }
                IdleCycle::Changed(pair) => {
                    changed_cycles += 1;
                    debug!(
                        signal = %sampler.describe(),
                        cycle = cycles,
                        first = %pair.first,
                        second = %pair.second,
                        "signal changed, retrying"
                    );
                }
            }
        }
    }

    /// Wait until no relevant request is in flight and the count is stable
    pub fn wait_network_idle(&self, session: &dyn PageSession) -> SettleResult<IdleReport> {
        let mut sampler = NetworkSampler::new(session, &self.config().network_denylist);
        self.wait_idle(&mut sampler, self.config().idle_poll_interval())
    }

    /// Wait until the serialized DOM stops changing
    pub fn wait_dom_stable(&self, session: &dyn PageSession) -> SettleResult<IdleReport> {
        let mut sampler = DomSampler::new(session);
        self.wait_idle(&mut sampler, self.config().idle_poll_interval())
    }

    /// Wait until the count of `marker` performance entries stops changing
    pub fn wait_marker_stable(
        &self,
        session: &dyn PageSession,
        marker: &str,
    ) -> SettleResult<IdleReport> {
        let mut sampler = MarkerSampler::new(session, marker);
        self.wait_idle(&mut sampler, self.config().idle_poll_interval())
    }
}

fn short_digest(content: &str) -> String {
    Sha256::digest(content.as_bytes())
        .iter()
        .take(6)
        .map(|b| format!("{b:02x}"))
        .collect()
}
