//! Email and phone patterns plus normalization helpers.
//!
//! Matching is two-staged: a deliberately loose scan pattern grabs
//! email-shaped tokens *including* any URL-ish tail glued onto them,
//! and [`clean_and_validate_email`] then rejects contaminated tokens
//! and canonicalizes the rest. Splitting it this way keeps query
//! strings like `support@domain.io?ref=123` from being admitted as
//! `support@domain.io`.

use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Loose scan pattern: an email-shaped token plus any glued-on
    // URL characters. Over-captures on purpose; the cleaner decides.
    static ref EMAIL_SCAN_REGEX: Regex = Regex::new(
        r"(?i)[A-Z0-9!#$%&'*+/=?^_`{|}~:.-]+@[A-Z0-9?/=&#%_.-]+"
    ).unwrap();

    // Strict RFC-5322-lite pattern: dot-separated symbol/alnum local
    // part, label-dot domain ending in a >=2 letter top-level label.
    static ref EMAIL_VALID_REGEX: Regex = Regex::new(
        r"(?i)^[A-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[A-Z0-9](?:[A-Z0-9-]*[A-Z0-9])?\.)+[A-Z]{2,}$"
    ).unwrap();

    static ref PHONE_REGEX: Regex = Regex::new(
        r"(?:\+\d{1,3}[-. ]?)?\(?\d{3}\)?[-. ]?\d{3}[-. ]?\d{4}"
    ).unwrap();
}

/// Normalize and validate a raw email match.
///
/// Returns the canonical lowercase address, or None when the token is
/// contaminated or malformed. Idempotent over its own output.
pub fn clean_and_validate_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();

    // URL query strings and paths masquerading as addresses
    if email.contains('?') || email.contains('/') || email.contains('=') {
        return None;
    }

    let email = email.strip_prefix("mailto:").unwrap_or(&email);

    let email = email
        .trim_start_matches(|c: char| {
            c.is_whitespace() || matches!(c, '<' | '(' | '[' | '{' | '\'' | '"')
        })
        .trim_end_matches(|c: char| {
            c.is_whitespace() || matches!(c, '>' | ')' | ']' | '}' | '\'' | '"')
        });

    if !email.contains('@') || !email.contains('.') {
        return None;
    }

    if EMAIL_VALID_REGEX.is_match(email) {
        Some(email.to_string())
    } else {
        None
    }
}

/// Scan a text fragment, adding every clean address to the candidate set.
///
/// The set preserves first-seen order, which later becomes admission
/// order within the scan.
pub(crate) fn scan_emails(text: &str, found: &mut IndexSet<String>) {
    for matched in EMAIL_SCAN_REGEX.find_iter(text) {
        if let Some(email) = clean_and_validate_email(matched.as_str()) {
            found.insert(email);
        }
    }
}

/// Infer a person name from a `first.last` style local part.
///
/// Deliberately conservative: only local parts with exactly two
/// dot-separated segments longer than one character produce a name.
pub fn name_from_email(email: &str) -> Option<String> {
    let local = email.split('@').next()?;
    if !local.contains('.') {
        return None;
    }

    let parts: Vec<String> = local
        .split('.')
        .map(capitalize)
        .filter(|part| part.chars().count() > 1)
        .collect();

    if parts.len() == 2 {
        Some(parts.join(" "))
    } else {
        None
    }
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// First phone-like match in the text, reduced to digits and a leading
/// plus. None unless at least ten digits remain.
pub fn find_phone_number(text: &str) -> Option<String> {
    let matched = PHONE_REGEX.find(text)?;

    // The pattern only permits '+' at the start, so every retained
    // plus is a leading one.
    let cleaned: String = matched
        .as_str()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    let digits = cleaned.chars().filter(char::is_ascii_digit).count();
    if digits >= 10 {
        Some(cleaned)
    } else {
        None
    }
}
