use anyhow::Result;

use super::xpath::xpath_literal;
use crate::session::{ElementRef, Query, Scope, Session};

pub fn labels_with_text(selector: &str) -> Query {
    Query::XPath(format!(
        ".//label[normalize-space(text())={}]",
        xpath_literal(selector)
    ))
}

pub fn next_sibling() -> Query {
    Query::XPath("./following-sibling::*[1]".to_string())
}

/// Form control a label with the selector's text points at.
///
/// Only the first matching label is considered. Its `for` target wins;
/// without one, the label's next sibling is taken when it is a select, a
/// textarea or a non-hidden input.
pub async fn find_elements<S: Session + ?Sized>(
    session: &S,
    selector: &str,
    scope: Scope<'_>,
) -> Result<Vec<ElementRef>> {
    let labels = session.find(scope, &labels_with_text(selector)).await?;
    let Some(label) = labels.first() else {
        return Ok(Vec::new());
    };

    if let Some(target) = session.attribute(label, "for").await? {
        let target = target.trim();
        if !target.is_empty() {
            return session.find(scope, &Query::Id(target.to_string())).await;
        }
    }

    let siblings = session.find(Scope::Within(label), &next_sibling()).await?;
    let Some(sibling) = siblings.into_iter().next() else {
        return Ok(Vec::new());
    };

    if is_form_field(session, &sibling).await? {
        Ok(vec![sibling])
    } else {
        Ok(Vec::new())
    }
}

async fn is_form_field<S: Session + ?Sized>(session: &S, element: &ElementRef) -> Result<bool> {
    let tag = session.tag_name(element).await?.to_ascii_lowercase();
    Ok(match tag.as_str() {
        "select" | "textarea" => true,
        "input" => {
            let kind = session.attribute(element, "type").await?;
            !kind.is_some_and(|k| k.trim().eq_ignore_ascii_case("hidden"))
        }
        _ => false,
    })
}
