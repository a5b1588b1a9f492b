//! Page readiness for page objects.
//!
//! Page objects wrap a page or component of the UI. Before interacting they
//! call [`PageObject::wait_ready`], which chains the idle detectors: network
//! first, then the DOM, then an optional marker element.

use std::fmt;

use tracing::debug;

use crate::clock::Clock;
use crate::condition::Condition;
use crate::element::Observable;
use crate::idle::IdleReport;
use crate::network::UrlPattern;
use crate::result::{SettleError, SettleResult};
use crate::session::PageSession;
use crate::wait::Waiter;

/// What `wait_ready` observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyReport {
    /// Network idle wait
    pub network: IdleReport,
    /// DOM stability wait
    pub dom: IdleReport,
}

/// A page or component of the UI
///
/// # Example
///
/// ```ignore
/// struct SitesConsole {
///     create_button: DriverElement,
/// }
///
/// impl PageObject for SitesConsole {
///     fn page_name(&self) -> &str {
///         "sites console"
///     }
///
///     fn ready_marker(&self) -> Option<&dyn Observable> {
///         Some(&self.create_button)
///     }
/// }
///
/// console.wait_ready(&waiter, &session)?;
/// waiter.click(&console.create_button)?;
/// ```
pub trait PageObject {
    /// Name for logs and errors
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// URL the session must be on
    fn url_pattern(&self) -> Option<&UrlPattern> {
        None
    }

    /// Element whose visibility signals the page is usable
    fn ready_marker(&self) -> Option<&dyn Observable> {
        None
    }

    /// Block until the page is settled and ready for interaction
    fn wait_ready<C: Clock>(
        &self,
        waiter: &Waiter<C>,
        session: &dyn PageSession,
    ) -> SettleResult<ReadyReport>
    where
        Self: Sized,
    {
        let timeout = waiter.config().timeout();

        if let Some(pattern) = self.url_pattern() {
            let url = session.url()?;
            if !pattern.matches(&url) {
                return Err(SettleError::session(format!(
                    "{} expected URL matching {:?}, session is on {url}",
                    self.page_name(),
                    pattern
                )));
            }
        }

        let network = waiter.wait_network_idle(session)?;
        let dom = waiter.wait_dom_stable(session)?;

        if let Some(marker) = self.ready_marker() {
            let waited_for = format!("{} {}", marker.name(), Condition::Visible);
            waiter.wait_until(|| marker.has(&Condition::Visible), timeout, &waited_for)?;
        }

        debug!(
            page = self.page_name(),
            network_cycles = network.cycles,
            dom_cycles = dom.cycles,
            "page ready"
        );
        Ok(ReadyReport { network, dom })
    }
}

/// Page object assembled at runtime
pub struct SimplePage {
    name: String,
    url_pattern: Option<UrlPattern>,
    marker: Option<Box<dyn Observable>>,
}

impl SimplePage {
    /// Page named `name` with no URL check or marker
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_pattern: None,
            marker: None,
        }
    }

    /// Require the session URL to match
    #[must_use]
    pub fn with_url_pattern(mut self, pattern: UrlPattern) -> Self {
        self.url_pattern = Some(pattern);
        self
    }

    /// Require `marker` to be visible
    #[must_use]
    pub fn with_marker(mut self, marker: impl Observable + 'static) -> Self {
        self.marker = Some(Box::new(marker));
        self
    }
}

impl fmt::Debug for SimplePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimplePage")
            .field("name", &self.name)
            .field("url_pattern", &self.url_pattern)
            .field("marker", &self.marker.as_ref().map(|m| m.name().to_string()))
            .finish()
    }
}

impl PageObject for SimplePage {
    fn page_name(&self) -> &str {
        &self.name
    }

    fn url_pattern(&self) -> Option<&UrlPattern> {
        self.url_pattern.as_ref()
    }

    fn ready_marker(&self) -> Option<&dyn Observable> {
        self.marker.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use crate::config::WaitConfig;
    use crate::mock::{MockElement, MockSession};
    use crate::network::ResourceEntry;

    fn waiter() -> Waiter<FakeClock> {
        Waiter::with_clock(WaitConfig::default().with_timeout(2_000), FakeClock::new())
    }

    #[test]
    fn test_ready_after_network_and_dom_settle() {
        let session = MockSession::new()
            .with_resource_script(vec![
                vec![ResourceEntry::pending("https://h/content/page.model.json")],
                vec![ResourceEntry::finished("https://h/content/page.model.json", 40.0)],
            ])
            .with_dom_snapshots(vec!["<div>".into(), "<div></div>".into(), "<div></div>".into()]);
        let page = SimplePage::new("editor");
        let report = page.wait_ready(&waiter(), &session).unwrap();
        assert_eq!(report.network.busy_cycles, 1);
        assert_eq!(report.dom.changed_cycles, 1);
    }

    #[test]
    fn test_marker_must_become_visible() {
        let session = MockSession::new();
        let page = SimplePage::new("console").with_marker(MockElement::hidden("create"));
        let err = page.wait_ready(&waiter(), &session).unwrap_err();
        match err {
            SettleError::Timeout { waited_for, .. } => assert_eq!(waited_for, "create visible"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_url_mismatch_rejected() {
        let session = MockSession::new().with_url("https://h/sites.html");
        let page = SimplePage::new("assets")
            .with_url_pattern(UrlPattern::Contains("/assets.html".into()));
        assert!(matches!(
            page.wait_ready(&waiter(), &session),
            Err(SettleError::Session { .. })
        ));
    }

    #[test]
    fn test_default_page_name_is_type_name() {
        struct Login;
        impl PageObject for Login {}
        assert!(Login.page_name().ends_with("Login"));
        assert!(format!("{:?}", SimplePage::new("x")).contains("SimplePage"));
    }
}
