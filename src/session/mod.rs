//! The UI-session seam.
//!
//! Everything the harness needs from a browser goes through [`Session`]:
//! queries, element inspection, diagnostics and the primitive actions used by
//! the act/assert verbs. [`cdp::CdpSession`] is the Chrome implementation.

pub mod cdp;
pub mod console;
#[cfg(test)]
pub(crate) mod fake;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to one element of the page a session is showing.
///
/// Two handles compare equal when they denote the same DOM node. Using a
/// handle after its node left the document fails with a stale-reference
/// error from the session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef(String);

impl ElementRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element[{}]", self.0)
    }
}

/// A single query a session knows how to evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Query {
    Css(String),
    XPath(String),
    /// Elements whose `id` attribute equals the value.
    Id(String),
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={}", s),
            Self::XPath(s) => write!(f, "xpath={}", s),
            Self::Id(s) => write!(f, "id={}", s),
        }
    }
}

/// Where a query is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    Document,
    Within(&'a ElementRef),
}

impl Scope<'_> {
    pub fn element(&self) -> Option<&ElementRef> {
        match self {
            Scope::Document => None,
            Scope::Within(el) => Some(el),
        }
    }
}

/// One line of the browser's log transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, [{}] :: {}", self.timestamp, self.level, self.message)
    }
}

/// Modifier keys held down while typing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub control: bool,
    pub shift: bool,
    pub alt: bool,
}

#[async_trait]
pub trait Session: Send + Sync {
    async fn find(&self, scope: Scope<'_>, query: &Query) -> Result<Vec<ElementRef>>;

    /// Lower-case tag name.
    async fn tag_name(&self, element: &ElementRef) -> Result<String>;

    /// Attribute value; `value` reads the live form value.
    async fn attribute(&self, element: &ElementRef, name: &str) -> Result<Option<String>>;

    /// Rendered, trimmed text.
    async fn text(&self, element: &ElementRef) -> Result<String>;

    async fn is_enabled(&self, element: &ElementRef) -> Result<bool>;

    async fn is_displayed(&self, element: &ElementRef) -> Result<bool>;

    /// Checked state of checkboxes/radios, selected state of options.
    async fn is_selected(&self, element: &ElementRef) -> Result<bool>;

    /// PNG of the current viewport.
    async fn screenshot(&self) -> Result<Vec<u8>>;

    async fn logs(&self) -> Result<Vec<LogEntry>>;

    async fn current_url(&self) -> Result<String>;

    async fn title(&self) -> Result<String>;

    async fn goto(&self, url: &str) -> Result<()>;

    async fn back(&self) -> Result<()>;

    async fn forward(&self) -> Result<()>;

    async fn refresh(&self) -> Result<()>;

    /// Click an element; clicking an `<option>` selects it.
    async fn click(&self, element: &ElementRef) -> Result<()>;

    async fn double_click(&self, element: &ElementRef) -> Result<()>;

    async fn hover(&self, element: &ElementRef) -> Result<()>;

    async fn clear(&self, element: &ElementRef) -> Result<()>;

    async fn send_keys(
        &self,
        element: &ElementRef,
        text: &str,
        modifiers: Modifiers,
        per_character: bool,
    ) -> Result<()>;
}
