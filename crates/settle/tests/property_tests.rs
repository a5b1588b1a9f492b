//! Property-based tests for the polling engine.
//!
//! All properties run on a `FakeClock`, so retry loops cost no wall time.

use std::cell::Cell;
use std::time::Duration;

use proptest::prelude::*;
use settle::{
    Clock, Condition, FakeClock, FnSampler, IdleCycle, Measurement, MockElement, MockSession,
    RetryBudget, SettleError, WaitConfig, Waiter,
};

fn fake_waiter(dir: &std::path::Path) -> (Waiter<FakeClock>, FakeClock) {
    let clock = FakeClock::new();
    let config = WaitConfig::default()
        .with_timeout(1_000)
        .with_diagnostics_dir(dir);
    (Waiter::with_clock(config, clock.clone()), clock)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A condition that never holds costs exactly `n` attempts.
    #[test]
    fn prop_click_until_is_bounded(n in 0_u32..40, pacing in 0_u64..20) {
        let tmp = tempfile::tempdir().unwrap();
        let (waiter, _clock) = fake_waiter(tmp.path());
        let session = MockSession::new();
        let button = MockElement::interactive("button");
        let panel = MockElement::hidden("panel");

        let err = waiter
            .click_until(&session, &button, &panel, &Condition::Visible, RetryBudget::new(n, pacing))
            .unwrap_err();

        prop_assert_eq!(button.clicks(), n);
        let is_exhausted = matches!(err, SettleError::RetryExhausted { attempts, .. } if attempts == n);
        prop_assert!(is_exhausted);
    }

    /// Once the condition holds after click `k`, no further clicks happen.
    #[test]
    fn prop_click_until_exits_early((n, k) in (1_u32..20).prop_flat_map(|n| (Just(n), 1..=n))) {
        let tmp = tempfile::tempdir().unwrap();
        let (waiter, _clock) = fake_waiter(tmp.path());
        let session = MockSession::new();
        let button = MockElement::interactive("button");
        let panel = MockElement::hidden("panel").visible_after_clicks_on(&button, k);

        let report = waiter
            .click_until(&session, &button, &panel, &Condition::Visible, RetryBudget::new(n, 1))
            .unwrap();

        prop_assert_eq!(button.clicks(), k);
        prop_assert_eq!(report.attempts, k);
        prop_assert!(session.screenshots().is_empty());
    }

    /// Idle iff the two samples are exactly equal.
    #[test]
    fn prop_idle_iff_samples_equal(a in 0_u64..4, b in 0_u64..4) {
        let tmp = tempfile::tempdir().unwrap();
        let (waiter, clock) = fake_waiter(tmp.path());
        let mut values = vec![Measurement::Count(a), Measurement::Count(b)].into_iter();
        let mut sampler = FnSampler::new(move || values.next().unwrap_or(Measurement::Busy), "pair");

        let cycle = waiter.idle_cycle(&mut sampler, Duration::from_millis(250)).unwrap();

        prop_assert_eq!(matches!(cycle, IdleCycle::Idle(_)), a == b);
        prop_assert_eq!(clock.now(), Duration::from_millis(250));
    }

    /// Same law for full DOM content.
    #[test]
    fn prop_dom_idle_iff_content_equal(a in "[a-c]{0,3}", b in "[a-c]{0,3}") {
        let tmp = tempfile::tempdir().unwrap();
        let (waiter, _clock) = fake_waiter(tmp.path());
        let expected_idle = a == b;
        let mut values = vec![Measurement::Content(a), Measurement::Content(b)].into_iter();
        let mut sampler = FnSampler::new(move || values.next().unwrap_or(Measurement::Busy), "dom");

        let cycle = waiter.idle_cycle(&mut sampler, Duration::from_millis(10)).unwrap();

        prop_assert_eq!(matches!(cycle, IdleCycle::Idle(_)), expected_idle);
    }

    /// A busy first sample ends the cycle before any second sample or sleep.
    #[test]
    fn prop_busy_short_circuits(next in 0_u64..100) {
        let tmp = tempfile::tempdir().unwrap();
        let (waiter, clock) = fake_waiter(tmp.path());
        let calls = Cell::new(0);
        let mut values = vec![Measurement::Busy, Measurement::Count(next)].into_iter();
        let mut sampler = FnSampler::new(
            || {
                calls.set(calls.get() + 1);
                values.next().unwrap_or(Measurement::Busy)
            },
            "network",
        );

        let cycle = waiter.idle_cycle(&mut sampler, Duration::from_millis(250)).unwrap();

        prop_assert_eq!(cycle, IdleCycle::Busy);
        prop_assert_eq!(calls.get(), 1);
        prop_assert_eq!(clock.sleep_count(), 0);
    }

    /// Advisory polls return false, never an error, and respect the timeout.
    #[test]
    fn prop_advisory_poll_never_throws(timeout_ms in 0_u64..5_000) {
        let tmp = tempfile::tempdir().unwrap();
        let (waiter, clock) = fake_waiter(tmp.path());

        let found = waiter.poll_until(|| false, Duration::from_millis(timeout_ms));

        prop_assert!(!found);
        prop_assert_eq!(clock.now(), Duration::from_millis(timeout_ms));
    }

    /// No click is issued before the target has been seen visible and enabled.
    #[test]
    fn prop_click_waits_for_precondition(reads in 1_u32..20) {
        let tmp = tempfile::tempdir().unwrap();
        let (waiter, _clock) = fake_waiter(tmp.path());
        let target = MockElement::hidden("save").visible_after_reads(reads);

        waiter.click(&target).unwrap();

        prop_assert_eq!(target.clicks(), 1);
        prop_assert!(target.reads() >= reads);
    }
}

#[test]
fn never_clickable_target_is_never_clicked() {
    let tmp = tempfile::tempdir().unwrap();
    let (waiter, _clock) = fake_waiter(tmp.path());
    let target = MockElement::hidden("save");

    let err = waiter.click(&target).unwrap_err();

    assert!(matches!(err, SettleError::PreconditionTimeout { .. }));
    assert_eq!(target.clicks(), 0);
}
