//! Settle: a condition-polling wait/retry engine for browser UI tests.
//!
//! Animated, asynchronous UIs rarely reflect an action within one
//! synchronous read. Settle gives page objects four blocking primitives
//! over an explicit browser session:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  page objects (wait_ready, click, click_until, is_present)   │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ClickAction ──► ClickUntilRetry      IdleDetector           │
//! │        │              │                    │                 │
//! │        └──────────────┴──── ConditionPoller┘                 │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Observable / Clickable / PageSession   (browser driver)     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`Waiter::poll_until`] returns `false` on timeout; absence is a normal
//!   answer.
//! - [`Waiter::wait_idle`] samples a signal twice, one interval apart, and
//!   repeats until the samples match.
//! - [`Waiter::clickable_click`] waits for "visible and enabled" and clicks
//!   once.
//! - [`Waiter::click_until`] clicks until an observed element reaches a
//!   condition, failing with [`SettleError::RetryExhausted`] and a
//!   screenshot when the budget runs out.
//!
//! # Example
//!
//! ```
//! use settle::{Condition, FakeClock, MockElement, MockSession, RetryBudget, WaitConfig, Waiter};
//!
//! let waiter = Waiter::with_clock(WaitConfig::default(), FakeClock::new());
//! let session = MockSession::new();
//! let button = MockElement::interactive("more actions");
//! let menu = MockElement::hidden("actions menu").visible_after_clicks_on(&button, 1);
//!
//! let report = waiter
//!     .click_until(&session, &button, &menu, &Condition::Visible, RetryBudget::new(3, 10))
//!     .unwrap();
//! assert_eq!(report.clicks, 1);
//! ```

#![warn(missing_docs)]

mod click;
mod clock;
mod condition;
mod config;
mod diagnostics;
mod element;
mod idle;
mod network;
mod page;
mod result;
mod session;
mod wait;

/// Log subscriber setup
pub mod logging;

/// Scriptable driver stand-ins for tests
pub mod mock;

pub use click::{AttemptOutcome, ClickReport, Confirmation};
pub use clock::{Clock, FakeClock, SystemClock};
pub use condition::{Condition, ElementState};
pub use config::{
    RetryBudget, WaitConfig, DEFAULT_CONFIRM_WINDOW_MS, DEFAULT_IDLE_POLL_INTERVAL_MS,
    DEFAULT_MAX_RETRIES, DEFAULT_PACING_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS,
    MIN_POLL_INTERVAL_MS,
};
pub use diagnostics::{DiagnosticCapture, DiagnosticRef};
pub use element::{Check, Clickable, Observable};
pub use idle::{
    DomSampler, FnSampler, IdleCycle, IdleReport, IdleSample, MarkerSampler, Measurement,
    NetworkSampler, Sampler,
};
pub use logging::{init_logging, LogFormat};
pub use mock::{MockElement, MockSession};
pub use network::{default_denylist, is_denied, Denylist, ResourceEntry, UrlMatcher, UrlPattern};
pub use page::{PageObject, ReadyReport, SimplePage};
pub use result::{SettleError, SettleResult, Staleness};
pub use session::PageSession;
pub use wait::{PollAttempt, PollReport, Waiter};

/// Prelude for page-object code
pub mod prelude {
    pub use super::{
        Clickable, Condition, Observable, PageObject, PageSession, RetryBudget, SettleError,
        SettleResult, WaitConfig, Waiter,
    };
}
