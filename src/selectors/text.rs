use super::xpath::xpath_literal;
use crate::session::Query;

/// Elements whose own normalized text equals the selector exactly.
pub fn visible_text(selector: &str) -> Query {
    Query::XPath(format!(
        ".//*[normalize-space(text())={}]",
        xpath_literal(selector)
    ))
}
