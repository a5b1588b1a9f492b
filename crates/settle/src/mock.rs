//! Scriptable stand-ins for a browser driver.
//!
//! [`MockElement`] and [`MockSession`] implement the engine's seams without
//! a browser, so page objects and the engine itself can be tested with a
//! [`FakeClock`](crate::FakeClock). Both use interior mutability and are
//! meant for a single test thread.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::condition::ElementState;
use crate::element::{Clickable, Observable};
use crate::network::ResourceEntry;
use crate::result::{SettleError, SettleResult, Staleness};
use crate::session::PageSession;

#[derive(Debug, Clone)]
enum Reveal {
    AfterReads(u32),
    AfterClicks { counter: Rc<Cell<u32>>, clicks: u32 },
}

/// Scriptable element
#[derive(Debug)]
pub struct MockElement {
    name: String,
    state: RefCell<ElementState>,
    clicks: Rc<Cell<u32>>,
    hovers: Cell<u32>,
    reads: Cell<u32>,
    stale_reads: Cell<u32>,
    stale_clicks: Cell<u32>,
    reveal: Option<Reveal>,
}

impl MockElement {
    /// Element with a fixed state
    #[must_use]
    pub fn new(name: impl Into<String>, state: ElementState) -> Self {
        Self {
            name: name.into(),
            state: RefCell::new(state),
            clicks: Rc::new(Cell::new(0)),
            hovers: Cell::new(0),
            reads: Cell::new(0),
            stale_reads: Cell::new(0),
            stale_clicks: Cell::new(0),
            reveal: None,
        }
    }

    /// Visible and enabled
    #[must_use]
    pub fn interactive(name: impl Into<String>) -> Self {
        Self::new(name, ElementState::interactive())
    }

    /// Attached, enabled, not visible
    #[must_use]
    pub fn hidden(name: impl Into<String>) -> Self {
        Self::new(name, ElementState::present().with_enabled(true))
    }

    /// Not in the document
    #[must_use]
    pub fn absent(name: impl Into<String>) -> Self {
        Self::new(name, ElementState::absent())
    }

    /// Becomes visible from the `reads`-th state read onward
    #[must_use]
    pub fn visible_after_reads(mut self, reads: u32) -> Self {
        self.reveal = Some(Reveal::AfterReads(reads));
        self
    }

    /// Becomes visible once `actor` has been clicked `clicks` times
    #[must_use]
    pub fn visible_after_clicks_on(mut self, actor: &Self, clicks: u32) -> Self {
        self.reveal = Some(Reveal::AfterClicks {
            counter: Rc::clone(&actor.clicks),
            clicks,
        });
        self
    }

    /// The next `n` state reads fail as stale
    #[must_use]
    pub fn stale_reads(self, n: u32) -> Self {
        self.stale_reads.set(n);
        self
    }

    /// The next `n` clicks fail as stale
    #[must_use]
    pub fn stale_clicks(self, n: u32) -> Self {
        self.stale_clicks.set(n);
        self
    }

    /// Replace the base state
    pub fn set_state(&self, state: ElementState) {
        *self.state.borrow_mut() = state;
    }

    /// Successful clicks so far
    #[must_use]
    pub fn clicks(&self) -> u32 {
        self.clicks.get()
    }

    /// Hovers so far
    #[must_use]
    pub fn hovers(&self) -> u32 {
        self.hovers.get()
    }

    /// State reads so far, stale ones included
    #[must_use]
    pub fn reads(&self) -> u32 {
        self.reads.get()
    }

    fn stale(&self, what: &str) -> Staleness {
        Staleness::new(self.name.clone(), format!("{what} on detached node"))
    }

    fn revealed(&self) -> bool {
        match &self.reveal {
            None => false,
            Some(Reveal::AfterReads(n)) => self.reads.get() >= *n,
            Some(Reveal::AfterClicks { counter, clicks }) => counter.get() >= *clicks,
        }
    }
}

fn take_one(counter: &Cell<u32>) -> bool {
    let left = counter.get();
    if left > 0 {
        counter.set(left - 1);
        true
    } else {
        false
    }
}

impl Observable for MockElement {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> Result<ElementState, Staleness> {
        self.reads.set(self.reads.get() + 1);
        if take_one(&self.stale_reads) {
            return Err(self.stale("read"));
        }
        let mut state = self.state.borrow().clone();
        if self.revealed() {
            state.exists = true;
            state.visible = true;
        }
        Ok(state)
    }
}

impl Clickable for MockElement {
    fn hover(&self) -> Result<(), Staleness> {
        self.hovers.set(self.hovers.get() + 1);
        Ok(())
    }

    fn click(&self) -> Result<(), Staleness> {
        if take_one(&self.stale_clicks) {
            return Err(self.stale("click"));
        }
        self.clicks.set(self.clicks.get() + 1);
        Ok(())
    }
}

/// Sequence of values; the last one repeats once the script runs out
#[derive(Debug, Clone)]
struct Script<T> {
    queue: VecDeque<T>,
    last: Option<T>,
}

impl<T: Clone + Default> Script<T> {
    fn new(values: Vec<T>) -> Self {
        Self {
            queue: values.into(),
            last: None,
        }
    }

    fn next(&mut self) -> T {
        if let Some(value) = self.queue.pop_front() {
            self.last = Some(value.clone());
            value
        } else {
            self.last.clone().unwrap_or_default()
        }
    }
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            last: None,
        }
    }
}

/// Scriptable page session
#[derive(Debug, Default)]
pub struct MockSession {
    url: String,
    resources: RefCell<Script<Vec<ResourceEntry>>>,
    dom: RefCell<Script<String>>,
    markers: RefCell<HashMap<String, Script<u64>>>,
    screenshots: RefCell<Vec<PathBuf>>,
    dom_reads: Cell<u32>,
    failure: Option<String>,
}

impl MockSession {
    /// Empty session on `about:blank`
    #[must_use]
    pub fn new() -> Self {
        Self {
            url: "about:blank".to_string(),
            ..Self::default()
        }
    }

    /// Set the page URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// A constant resource-timing buffer
    #[must_use]
    pub fn with_resources(self, entries: Vec<ResourceEntry>) -> Self {
        self.with_resource_script(vec![entries])
    }

    /// One resource-timing buffer per read
    #[must_use]
    pub fn with_resource_script(self, buffers: Vec<Vec<ResourceEntry>>) -> Self {
        *self.resources.borrow_mut() = Script::new(buffers);
        self
    }

    /// One serialized DOM per read
    #[must_use]
    pub fn with_dom_snapshots(self, snapshots: Vec<String>) -> Self {
        *self.dom.borrow_mut() = Script::new(snapshots);
        self
    }

    /// One entry count for `marker` per read
    #[must_use]
    pub fn with_markers(self, marker: impl Into<String>, counts: Vec<u64>) -> Self {
        self.markers
            .borrow_mut()
            .insert(marker.into(), Script::new(counts));
        self
    }

    /// Every query fails with `message`
    #[must_use]
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Screenshot paths written so far
    #[must_use]
    pub fn screenshots(&self) -> Vec<PathBuf> {
        self.screenshots.borrow().clone()
    }

    /// DOM reads so far
    #[must_use]
    pub fn dom_reads(&self) -> u32 {
        self.dom_reads.get()
    }

    fn check_failure(&self) -> SettleResult<()> {
        match &self.failure {
            Some(message) => Err(SettleError::session(message.clone())),
            None => Ok(()),
        }
    }
}

impl PageSession for MockSession {
    fn url(&self) -> SettleResult<String> {
        self.check_failure()?;
        Ok(self.url.clone())
    }

    fn resource_entries(&self) -> SettleResult<Vec<ResourceEntry>> {
        self.check_failure()?;
        Ok(self.resources.borrow_mut().next())
    }

    fn dom_content(&self) -> SettleResult<String> {
        self.check_failure()?;
        self.dom_reads.set(self.dom_reads.get() + 1);
        Ok(self.dom.borrow_mut().next())
    }

    fn performance_entries(&self, name: &str) -> SettleResult<u64> {
        self.check_failure()?;
        Ok(self
            .markers
            .borrow_mut()
            .get_mut(name)
            .map_or(0, Script::next))
    }

    fn screenshot(&self, path: &Path) -> SettleResult<()> {
        self.check_failure()?;
        std::fs::write(path, b"\x89PNG\r\n\x1a\n")?;
        self.screenshots.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}
