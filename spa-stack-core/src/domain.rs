//! Apex domain derivation.

use crate::error::{StackError, StackResult};

/// Derive the apex (root) domain of a fully qualified domain name.
///
/// Drops the first label when more than two labels remain after it, and
/// otherwise returns the input unchanged:
///
/// - `app.staging.example.com` -> `staging.example.com`
/// - `app.example.com` -> `app.example.com`
/// - `example.com` -> `example.com`
///
/// Multi-label public suffixes are not recognised, so `app.example.co.uk`
/// yields `example.co.uk` while `shop.co.uk` is returned as is.
pub fn root_domain(domain_name: Option<&str>) -> Option<String> {
    let domain_name = domain_name?;
    let mut labels = domain_name.split('.');
    labels.next();
    let rest: Vec<&str> = labels.collect();

    if rest.len() > 2 {
        Some(rest.join("."))
    } else {
        Some(domain_name.to_string())
    }
}

/// Apex domain of a domain the hosted zone lookup can use.
///
/// A single trailing root dot is ignored. Rejects names with empty labels
/// and names whose apex would be a single label, since no public hosted
/// zone can match those.
pub fn resolve_root_domain(domain_name: &str) -> StackResult<String> {
    let domain_name = domain_name.strip_suffix('.').unwrap_or(domain_name);
    if domain_name.split('.').any(str::is_empty) {
        return Err(StackError::resolution(format!(
            "'{domain_name}' contains an empty label"
        )));
    }

    match root_domain(Some(domain_name)) {
        Some(apex) if apex.contains('.') => Ok(apex),
        _ => Err(StackError::resolution(format!(
            "'{domain_name}' has no parent domain"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("app.staging.example.com", "staging.example.com")]
    #[case("a.b.c.example.com", "b.c.example.com")]
    #[case("app.example.com", "app.example.com")]
    #[case("example.com", "example.com")]
    #[case("localhost", "localhost")]
    #[case("app.example.co.uk", "example.co.uk")]
    fn test_root_domain(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(root_domain(Some(input)).as_deref(), Some(expected));
    }

    #[test]
    fn test_root_domain_absent_input() {
        assert_eq!(root_domain(None), None);
    }

    #[rstest]
    #[case("localhost")]
    #[case("app..example.com")]
    #[case(".example.com")]
    #[case("example.com..")]
    #[case(".")]
    fn test_resolve_root_domain_rejects_malformed(#[case] input: &str) {
        assert!(matches!(
            resolve_root_domain(input),
            Err(StackError::Resolution(_))
        ));
    }

    #[test]
    fn test_resolve_root_domain_keeps_three_label_names() {
        assert_eq!(
            resolve_root_domain("app.example.com").unwrap(),
            "app.example.com"
        );
    }

    #[rstest]
    #[case("example.com.", "example.com")]
    #[case("app.staging.example.com.", "staging.example.com")]
    fn test_resolve_root_domain_ignores_root_dot(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(resolve_root_domain(input).unwrap(), expected);
    }
}
