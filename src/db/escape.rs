//! String escaping utilities for PostgreSQL statements.

/// Escape text for use inside a single-quoted SQL literal.
///
/// Single quotes are doubled. NUL characters cannot be stored in PostgreSQL
/// text and are dropped.
pub fn escape_literal(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\'' => result.push_str("''"),
            '\0' => {}
            c => result.push(c),
        }
    }
    result
}

/// Wrap text in single quotes as a SQL string literal.
#[inline]
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", escape_literal(s))
}

/// Wrap a table or column name in double quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
