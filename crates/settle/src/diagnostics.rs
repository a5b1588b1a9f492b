//! Failure screenshots.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::result::SettleResult;
use crate::session::PageSession;

/// A captured diagnostic artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRef {
    /// Screenshot location
    pub path: PathBuf,
    /// Capture time
    pub taken_at: DateTime<Utc>,
}

/// Writes screenshots into a diagnostics directory
#[derive(Debug, Clone)]
pub struct DiagnosticCapture {
    dir: PathBuf,
}

impl DiagnosticCapture {
    /// Capture into `dir`, created on first use
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a capture labelled `label`
    #[must_use]
    pub fn file_name(label: &str, taken_at: DateTime<Utc>) -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!(
            "{}-{}-{}.png",
            sanitize(label),
            taken_at.format("%Y%m%dT%H%M%S%3f"),
            &id[..8]
        )
    }

    /// Capture a screenshot, propagating any failure
    pub fn try_capture(&self, session: &dyn PageSession, label: &str) -> SettleResult<DiagnosticRef> {
        std::fs::create_dir_all(&self.dir)?;
        let taken_at = Utc::now();
        let path = self.dir.join(Self::file_name(label, taken_at));
        session.screenshot(&path)?;
        info!(path = %path.display(), "captured diagnostic screenshot");
        Ok(DiagnosticRef { path, taken_at })
    }

    /// Capture a screenshot; failures are logged and yield `None`
    pub fn capture(&self, session: &dyn PageSession, label: &str) -> Option<DiagnosticRef> {
        match self.try_capture(session, label) {
            Ok(diagnostic) => Some(diagnostic),
            Err(err) => {
                warn!(error = %err, label, "diagnostic capture failed");
                None
            }
        }
    }
}

fn sanitize(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "capture".to_string()
    } else {
        cleaned
    }
}
