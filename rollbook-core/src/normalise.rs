//! Field-level normalisation rules.
//!
//! Roster files arrive with human-edited padding and casing. Normalisation
//! is deliberately narrow: boolean literals tolerate whitespace and case,
//! blankness is judged on the trimmed value, and everything else passes
//! through exactly as read.

/// Parse a boolean literal.
///
/// The value is trimmed and compared case-insensitively against `TRUE` and
/// `FALSE`; nothing else coerces.
///
/// # Examples
///
/// ```
/// use rollbook_core::normalise::parse_boolean;
///
/// assert_eq!(parse_boolean(" false "), Some(false));
/// assert_eq!(parse_boolean("True"), Some(true));
/// assert_eq!(parse_boolean("yes"), None);
/// assert_eq!(parse_boolean(""), None);
/// ```
#[must_use]
pub fn parse_boolean(value: &str) -> Option<bool> {
    let literal = value.trim();
    if literal.eq_ignore_ascii_case("true") {
        Some(true)
    } else if literal.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Whether a field value is blank: empty or whitespace only.
#[must_use]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Normalise an optional field: blank collapses to absent, anything else is
/// kept verbatim, padding included.
///
/// # Examples
///
/// ```
/// use rollbook_core::normalise::optional_field;
///
/// assert_eq!(optional_field("  "), None);
/// assert_eq!(optional_field(" Ada "), Some(" Ada ".to_owned()));
/// ```
#[must_use]
pub fn optional_field(value: &str) -> Option<String> {
    if is_blank(value) {
        None
    } else {
        Some(value.to_owned())
    }
}
