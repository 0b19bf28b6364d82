use crate::session::Query;

/// The selector taken as an XPath expression.
pub fn path(selector: &str) -> Query {
    Query::XPath(selector.to_string())
}

/// Quote `s` as an XPath string literal.
///
/// XPath 1.0 has no escape sequences, so a value holding both quote kinds is
/// spliced together with `concat()`.
pub fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        return format!("'{}'", s);
    }
    if !s.contains('"') {
        return format!("\"{}\"", s);
    }

    let parts: Vec<String> = s
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_plain() {
        assert_eq!(xpath_literal("Email"), "'Email'");
    }

    #[test]
    fn test_literal_with_apostrophe() {
        assert_eq!(xpath_literal("Don't"), "\"Don't\"");
    }

    #[test]
    fn test_literal_with_both_quotes() {
        assert_eq!(
            xpath_literal(r#"say "don't""#),
            r#"concat('say "don', "'", 't"')"#
        );
    }
}
