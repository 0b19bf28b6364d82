use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

/// Which façade operation a named failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Displayed,
    NotDisplayed,
    Enabled,
    Disabled,
    Class,
    NoClass,
    Value,
    Url,
    Title,
    Write,
    Click,
    NoChildren,
    SelectOption,
    Hover,
    AttributeNotFound,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Displayed => "displayed",
            Self::NotDisplayed => "not-displayed",
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Class => "class",
            Self::NoClass => "no-class",
            Self::Value => "value",
            Self::Url => "url",
            Self::Title => "title",
            Self::Write => "write",
            Self::Click => "click",
            Self::NoChildren => "no-children",
            Self::SelectOption => "select-option",
            Self::Hover => "hover",
            Self::AttributeNotFound => "attribute-not-found",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum HarnessError {
    /// The wait budget ran out without the operation succeeding.
    #[error("Timed out!")]
    Timeout,

    #[error("More than one element was selected when only one was expected for selector: {selector}")]
    Ambiguous { selector: String },

    /// A façade operation timed out; `message` describes what was awaited.
    #[error("{message}")]
    Failed { kind: FailureKind, message: String },

    #[error("Element {element} is marked as read only, you can not write to read only elements.")]
    ReadOnly { element: String },

    #[error("Element '{element}' does not contain value '{value}'.")]
    OptionNotFound { element: String, value: String },

    #[error(transparent)]
    Session(#[from] anyhow::Error),
}

impl HarnessError {
    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            message: message.into(),
        }
    }

    /// True for errors that already represent an exhausted wait budget.
    ///
    /// A wait that observes one of these from its operation stops at once
    /// instead of retrying for a second budget.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout | Self::Failed { .. })
    }

    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Replace a bare timeout with a named failure. Named failures from a
    /// nested verb and all other errors pass through untouched.
    pub fn or_failed(self, kind: FailureKind, message: impl FnOnce() -> String) -> Self {
        if matches!(self, Self::Timeout) {
            Self::failed(kind, message())
        } else {
            self
        }
    }
}
