//! Session-scoping statements (`USE WAREHOUSE ...` and friends).

use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionScope {
    Warehouse,
    Database,
    Schema,
    Role,
}

impl fmt::Display for SessionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            SessionScope::Warehouse => "WAREHOUSE",
            SessionScope::Database => "DATABASE",
            SessionScope::Schema => "SCHEMA",
            SessionScope::Role => "ROLE",
        };
        f.write_str(keyword)
    }
}

/// Build the `USE <scope> <name>` statement.
///
/// Plain identifiers (letters, digits, `_`, `$`, dotted paths) are emitted
/// as-is so the engine applies its usual case folding; anything else is
/// double-quoted with embedded quotes doubled. Empty names and control
/// characters are rejected.
pub fn scope_statement(scope: SessionScope, name: &str) -> Result<String> {
    if name.is_empty() || name.chars().any(char::is_control) {
        return Err(Error::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("USE {scope} {}", quote_identifier(name)))
}

fn is_plain(name: &str) -> bool {
    name.split('.').all(|part| {
        let mut chars = part.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    })
}

fn quote_identifier(name: &str) -> String {
    if is_plain(name) {
        return name.to_string();
    }
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        if c == '"' {
            quoted.push('"');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SessionScope::Warehouse, "COMPUTE_WH", "USE WAREHOUSE COMPUTE_WH")]
    #[case(SessionScope::Schema, "analytics.public", "USE SCHEMA analytics.public")]
    #[case(SessionScope::Role, "my role", "USE ROLE \"my role\"")]
    #[case(SessionScope::Database, "we\"ird", "USE DATABASE \"we\"\"ird\"")]
    #[case(SessionScope::Database, "1st", "USE DATABASE \"1st\"")]
    fn test_scope_statement(#[case] scope: SessionScope, #[case] name: &str, #[case] expected: &str) {
        assert_eq!(scope_statement(scope, name).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("wh\n; DROP TABLE x")]
    fn test_rejects_invalid(#[case] name: &str) {
        assert!(matches!(
            scope_statement(SessionScope::Warehouse, name),
            Err(Error::InvalidIdentifier(_))
        ));
    }
}
