//! Multi-strategy element lookup.
//!
//! One selector string is handed to every [`Strategy`] in priority order and
//! the matches are concatenated. A strategy that errors (a string that is not
//! valid CSS, say) contributes nothing, so a scan never fails.

pub mod css;
pub mod label;
pub mod text;
pub mod xpath;

use anyhow::Result;

use crate::error::HarnessError;
use crate::session::{ElementRef, Scope, Session};

/// The ways a selector string is interpreted, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Structural,
    AttributeValue,
    Path,
    VisibleText,
    Label,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Structural,
        Strategy::AttributeValue,
        Strategy::Path,
        Strategy::VisibleText,
        Strategy::Label,
    ];

    pub async fn run<S: Session + ?Sized>(
        self,
        session: &S,
        selector: &str,
        scope: Scope<'_>,
    ) -> Result<Vec<ElementRef>> {
        match self {
            Strategy::Structural => session.find(scope, &css::structural(selector)).await,
            Strategy::AttributeValue => {
                session.find(scope, &css::value_attribute(selector)).await
            }
            Strategy::Path => session.find(scope, &xpath::path(selector)).await,
            Strategy::VisibleText => session.find(scope, &text::visible_text(selector)).await,
            Strategy::Label => label::find_elements(session, selector, scope).await,
        }
    }
}

/// Run every strategy once and concatenate the matches.
pub async fn find_elements<S: Session + ?Sized>(
    session: &S,
    selector: &str,
    scope: Scope<'_>,
) -> Vec<ElementRef> {
    let mut found = Vec::new();
    for strategy in Strategy::ALL {
        match strategy.run(session, selector, scope).await {
            Ok(elements) => found.extend(elements),
            Err(e) => tracing::trace!("{:?} lookup of {:?} failed: {:#}", strategy, selector, e),
        }
    }
    found
}

/// Reduce a scan result to a single element.
pub fn pick_one(
    selector: &str,
    elements: Vec<ElementRef>,
    strict: bool,
) -> crate::error::Result<Option<ElementRef>> {
    if strict && elements.len() > 1 {
        return Err(HarnessError::Ambiguous {
            selector: selector.to_string(),
        });
    }
    Ok(elements.into_iter().next())
}
