//! Page-level session seam.
//!
//! A [`PageSession`] wraps one live, thread-isolated browser page. It is
//! passed explicitly into every wait that needs page-level signals or a
//! diagnostic screenshot; nothing in the engine looks a session up.

use std::path::Path;

use crate::network::ResourceEntry;
use crate::result::SettleResult;

/// Read-mostly view of a live browser page
pub trait PageSession {
    /// Current page URL
    fn url(&self) -> SettleResult<String>;

    /// Snapshot of the resource-timing buffer
    /// (`performance.getEntriesByType("resource")`)
    fn resource_entries(&self) -> SettleResult<Vec<ResourceEntry>>;

    /// Serialized DOM (`document.documentElement.outerHTML`)
    fn dom_content(&self) -> SettleResult<String>;

    /// Number of performance-timeline entries named `name`
    fn performance_entries(&self, name: &str) -> SettleResult<u64>;

    /// Write a screenshot of the viewport to `path`
    fn screenshot(&self, path: &Path) -> SettleResult<()>;
}

impl<S: PageSession + ?Sized> PageSession for &S {
    fn url(&self) -> SettleResult<String> {
        (**self).url()
    }

    fn resource_entries(&self) -> SettleResult<Vec<ResourceEntry>> {
        (**self).resource_entries()
    }

    fn dom_content(&self) -> SettleResult<String> {
        (**self).dom_content()
    }

    fn performance_entries(&self, name: &str) -> SettleResult<u64> {
        (**self).performance_entries(name)
    }

    fn screenshot(&self, path: &Path) -> SettleResult<()> {
        (**self).screenshot(path)
    }
}
