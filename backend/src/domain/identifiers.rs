//! Normalisation of caller-supplied identifier lists and contact fields.
//!
//! List filters arrive loosely formed: padded, repeated or blank entries are
//! common. Every filterable field passes through [`simplify_string_list`]
//! before it reaches a query, and an empty result means "no filter".

use std::collections::HashSet;

/// Trim each entry, drop blanks and duplicates, keep first-seen order.
///
/// # Examples
/// ```
/// use directory_backend::domain::simplify_string_list;
///
/// let ids = simplify_string_list([" usr-b ", "", "usr-a", "usr-b"]);
/// assert_eq!(ids, vec!["usr-b".to_owned(), "usr-a".to_owned()]);
/// ```
pub fn simplify_string_list<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut simplified = Vec::new();
    for value in values {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() || !seen.insert(trimmed.to_owned()) {
            continue;
        }
        simplified.push(trimmed.to_owned());
    }
    simplified
}

/// Trim and lowercase a contact value such as an email or phone number.
///
/// # Examples
/// ```
/// use directory_backend::domain::simplify_string;
///
/// assert_eq!(simplify_string("  ALICE@X.com "), "alice@x.com");
/// ```
pub fn simplify_string(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Apply [`simplify_string`] to every entry, then [`simplify_string_list`].
///
/// Used for email and phone-number filters so they compare against the
/// simplified values written at creation time.
pub fn simplify_contact_list<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    simplify_string_list(values.into_iter().map(|value| simplify_string(value.as_ref())))
}
