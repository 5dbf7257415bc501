//! Email shape check.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Returns true if `value` has the `local@domain.tld` shape.
///
/// This is a shape check, not RFC 5322 validation.
///
/// # Example
///
/// ```
/// use lumen_core::is_valid_email;
///
/// assert!(is_valid_email("a@b.com"));
/// assert!(!is_valid_email("invalid-email"));
/// ```
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}
