//! Shared validation helpers

use once_cell::sync::Lazy;
use regex::Regex;

// Shape check only; deliverability is the mailer's problem.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

/// Validate the shape of an email address before any I/O happens.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}
