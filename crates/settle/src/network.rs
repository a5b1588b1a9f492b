//! Resource-timing entries and URL patterns for network idle detection.

use serde::{Deserialize, Serialize};

/// One entry of the page's resource-timing buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEntry {
    /// Requested URL
    pub name: String,
    /// `responseEnd` in milliseconds; `<= 0` while the request is in flight
    pub response_end: f64,
}

impl ResourceEntry {
    /// A finished request
    #[must_use]
    pub fn finished(name: impl Into<String>, response_end: f64) -> Self {
        Self {
            name: name.into(),
            response_end,
        }
    }

    /// A request that has not completed
    #[must_use]
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            response_end: 0.0,
        }
    }

    /// Whether the response has not finished yet
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.response_end <= 0.0
    }
}

/// URL pattern for matching requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Prefix match
    Prefix(String),
    /// Contains substring
    Contains(String),
    /// Regex match
    Regex(String),
    /// Glob pattern (e.g., "**/ping/*")
    Glob(String),
    /// Match any URL
    Any,
}

impl UrlPattern {
    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Prefix(pattern) => url.starts_with(pattern.as_str()),
            Self::Contains(pattern) => url.contains(pattern.as_str()),
            Self::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(url))
                .unwrap_or(false),
            Self::Glob(pattern) => Self::glob_matches(pattern, url),
            Self::Any => true,
        }
    }

    /// `*` matches any run of characters. The text before the first `*`
    /// anchors at the start and the text after the last `*` at the end.
    fn glob_matches(pattern: &str, url: &str) -> bool {
        let parts: Vec<&str> = pattern.split('*').collect();
        let (first, last) = match parts.as_slice() {
            [only] => return url == *only,
            [first, .., last] => (*first, *last),
            [] => return false,
        };
        if !url.starts_with(first) || !url.ends_with(last) {
            return false;
        }
        let mut pos = first.len();
        let Some(end) = url.len().checked_sub(last.len()).filter(|&end| end >= pos) else {
            return false;
        };
        for part in &parts[1..parts.len() - 1] {
            if part.is_empty() {
                continue;
            }
            match url[pos..end].find(part) {
                Some(found) => pos += found + part.len(),
                None => return false,
            }
        }
        true
    }

    /// Compile this pattern for repeated matching
    #[must_use]
    pub fn compile(&self) -> UrlMatcher {
        match self {
            Self::Regex(pattern) => match regex::Regex::new(pattern) {
                Ok(re) => UrlMatcher::Regex(re),
                Err(err) => {
                    tracing::warn!(pattern = %pattern, error = %err, "invalid url regex never matches");
                    UrlMatcher::Never
                }
            },
            other => UrlMatcher::Plain(other.clone()),
        }
    }
}

/// A [`UrlPattern`] with its regex compiled once
#[derive(Debug, Clone)]
pub enum UrlMatcher {
    /// Non-regex pattern, matched directly
    Plain(UrlPattern),
    /// Compiled regex
    Regex(regex::Regex),
    /// Regex that failed to compile
    Never,
}

impl UrlMatcher {
    /// Check if a URL matches
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Plain(pattern) => pattern.matches(url),
            Self::Regex(re) => re.is_match(url),
            Self::Never => false,
        }
    }
}

/// Compiled denylist for network idle detection
#[derive(Debug, Clone, Default)]
pub struct Denylist {
    matchers: Vec<UrlMatcher>,
}

impl Denylist {
    /// Compile every pattern in `patterns`
    #[must_use]
    pub fn new(patterns: &[UrlPattern]) -> Self {
        Self {
            matchers: patterns.iter().map(UrlPattern::compile).collect(),
        }
    }

    /// Whether any pattern matches `url`
    #[must_use]
    pub fn is_denied(&self, url: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(url))
    }

    /// Number of patterns
    #[must_use]
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Whether the list has no patterns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

/// Requests that never settle on a live CMS page: session keep-alives and
/// background polling.
#[must_use]
pub fn default_denylist() -> Vec<UrlPattern> {
    vec![
        UrlPattern::Contains("/libs/granite/csrf/token.json".into()),
        UrlPattern::Contains("/libs/granite/core/content/login".into()),
        UrlPattern::Contains("/.rum/".into()),
        UrlPattern::Regex(r"/(ping|heartbeat|poll)(\.json)?(\?|$)".into()),
    ]
}

/// Whether any pattern in `denylist` matches `url`.
///
/// Compiles regex patterns on every call; build a [`Denylist`] to match
/// many URLs.
#[must_use]
pub fn is_denied(denylist: &[UrlPattern], url: &str) -> bool {
    Denylist::new(denylist).is_denied(url)
}
