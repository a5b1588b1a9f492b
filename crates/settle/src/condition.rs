//! Element state snapshots and the conditions evaluated over them.
//!
//! A [`Condition`] is a named predicate over an [`ElementState`]. Conditions
//! compose with [`Condition::and`] and describe themselves for failure
//! messages.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Read-only snapshot of a UI element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementState {
    /// Element is attached to the document
    pub exists: bool,
    /// Element is rendered and visible
    pub visible: bool,
    /// Element accepts interaction
    pub enabled: bool,
    /// Text content
    pub text: String,
    /// Attribute values
    pub attributes: HashMap<String, String>,
    /// CSS classes
    pub classes: Vec<String>,
}

impl ElementState {
    /// State of an element that is not in the document
    #[must_use]
    pub fn absent() -> Self {
        Self::default()
    }

    /// Attached but hidden and disabled
    #[must_use]
    pub fn present() -> Self {
        Self {
            exists: true,
            ..Self::default()
        }
    }

    /// Visible and enabled
    #[must_use]
    pub fn interactive() -> Self {
        Self {
            exists: true,
            visible: true,
            enabled: true,
            ..Self::default()
        }
    }

    /// Set visibility
    #[must_use]
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set enabled flag
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Add a CSS class
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }
}

/// Named boolean predicate over an element's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Element is attached
    Exists,
    /// Element is visible
    Visible,
    /// Element is absent or not visible
    Hidden,
    /// Element is enabled
    Enabled,
    /// Element is disabled
    Disabled,
    /// Attribute has exactly this value
    AttributeEquals {
        /// Attribute name
        name: String,
        /// Expected value
        value: String,
    },
    /// CSS class is present
    HasClass(String),
    /// Text content equals exactly
    TextEquals(String),
    /// Text content contains substring
    TextContains(String),
    /// All conditions hold
    And(Vec<Condition>),
}

impl Condition {
    /// Attribute equality condition
    #[must_use]
    pub fn attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::AttributeEquals {
            name: name.into(),
            value: value.into(),
        }
    }

    /// CSS class condition
    #[must_use]
    pub fn class(class: impl Into<String>) -> Self {
        Self::HasClass(class.into())
    }

    /// Exact text condition
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::TextEquals(text.into())
    }

    /// The compound precondition for clicking: visible and enabled
    #[must_use]
    pub fn clickable() -> Self {
        Self::Visible.and(Self::Enabled)
    }

    /// Logical AND, flattening nested conjunctions
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        let mut parts = match self {
            Self::And(parts) => parts,
            single => vec![single],
        };
        match other {
            Self::And(more) => parts.extend(more),
            single => parts.push(single),
        }
        Self::And(parts)
    }

    /// Evaluate against a snapshot
    #[must_use]
    pub fn matches(&self, state: &ElementState) -> bool {
        match self {
            Self::Exists => state.exists,
            Self::Visible => state.exists && state.visible,
            Self::Hidden => !(state.exists && state.visible),
            Self::Enabled => state.exists && state.enabled,
            Self::Disabled => state.exists && !state.enabled,
            Self::AttributeEquals { name, value } => {
                state.exists && state.attributes.get(name) == Some(value)
            }
            Self::HasClass(class) => state.exists && state.classes.iter().any(|c| c == class),
            Self::TextEquals(text) => state.exists && state.text == *text,
            Self::TextContains(text) => state.exists && state.text.contains(text.as_str()),
            Self::And(parts) => parts.iter().all(|c| c.matches(state)),
        }
    }

    /// Human-readable description used in diagnostics
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Exists => "exists".to_string(),
            Self::Visible => "visible".to_string(),
            Self::Hidden => "hidden".to_string(),
            Self::Enabled => "enabled".to_string(),
            Self::Disabled => "disabled".to_string(),
            Self::AttributeEquals { name, value } => format!("{name}={value:?}"),
            Self::HasClass(class) => format!("has class {class:?}"),
            Self::TextEquals(text) => format!("text {text:?}"),
            Self::TextContains(text) => format!("text containing {text:?}"),
            Self::And(parts) => parts
                .iter()
                .map(Self::describe)
                .collect::<Vec<_>>()
                .join(" and "),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod matching {
        use super::*;

        #[test]
        fn test_absent_matches_only_hidden() {
            let state = ElementState::absent();
            assert!(!Condition::Exists.matches(&state));
            assert!(!Condition::Visible.matches(&state));
            assert!(!Condition::Enabled.matches(&state));
            assert!(!Condition::Disabled.matches(&state));
            assert!(Condition::Hidden.matches(&state));
        }

        #[test]
        fn test_interactive_is_clickable() {
            let state = ElementState::interactive();
            assert!(Condition::clickable().matches(&state));
            assert!(!Condition::clickable().matches(&state.clone().with_enabled(false)));
            assert!(!Condition::clickable().matches(&state.with_visible(false)));
        }

        #[test]
        fn test_attribute_class_and_text() {
            let state = ElementState::interactive()
                .with_attribute("aria-expanded", "true")
                .with_class("is-open")
                .with_text("Publish page");
            assert!(Condition::attribute("aria-expanded", "true").matches(&state));
            assert!(!Condition::attribute("aria-expanded", "false").matches(&state));
            assert!(!Condition::attribute("missing", "").matches(&state));
            assert!(Condition::class("is-open").matches(&state));
            assert!(!Condition::class("is-closed").matches(&state));
            assert!(Condition::text("Publish page").matches(&state));
            assert!(Condition::TextContains("Publish".into()).matches(&state));
            assert!(!Condition::text("Publish").matches(&state));
        }

        #[test]
        fn test_repeated_attribute_replaces_value() {
            let state = ElementState::interactive()
                .with_attribute("aria-expanded", "false")
                .with_attribute("aria-expanded", "true");
            assert!(Condition::attribute("aria-expanded", "true").matches(&state));
            assert_eq!(state.attributes.len(), 1);
        }

        #[test]
        fn test_empty_and_is_true() {
            assert!(Condition::And(vec![]).matches(&ElementState::absent()));
        }
    }

    mod composition {
        use super::*;

        #[test]
        fn test_and_flattens() {
            let cond = Condition::Visible
                .and(Condition::Enabled)
                .and(Condition::class("ready"));
            match &cond {
                Condition::And(parts) => assert_eq!(parts.len(), 3),
                other => panic!("expected And, got {other:?}"),
            }
        }

        #[test]
        fn test_describe_joins_with_and() {
            assert_eq!(Condition::clickable().describe(), "visible and enabled");
            assert_eq!(
                Condition::attribute("value", "x").to_string(),
                "value=\"x\""
            );
        }

        #[test]
        fn test_serde_shape() {
            let json = serde_json::to_string(&Condition::class("open")).unwrap();
            assert_eq!(json, r#"{"has_class":"open"}"#);
            let back: Condition = serde_json::from_str(r#""visible""#).unwrap();
            assert_eq!(back, Condition::Visible);
        }
    }
}
