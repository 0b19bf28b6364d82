use crate::session::Query;

/// The selector taken as a CSS rule.
pub fn structural(selector: &str) -> Query {
    Query::Css(selector.to_string())
}

/// Any element whose `value` attribute equals the selector.
pub fn value_attribute(selector: &str) -> Query {
    Query::Css(format!("*[value={}]", css_string(selector)))
}

/// Quote `s` as a CSS string token.
pub fn css_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\a "),
            '\r' => out.push_str("\\d "),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}
