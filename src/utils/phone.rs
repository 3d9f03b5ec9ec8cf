//! Phone number normalization for SMS delivery.

use crate::config::DEFAULT_PHONE_COUNTRY_CODE;

/// Normalize a phone number to international form.
///
/// Keeps digits and `+`. Numbers that already carry a `+` are kept as is;
/// otherwise a single trunk `0` is dropped and the default country code
/// is prepended. Returns `None` when no digits remain.
pub fn format_phone(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if cleaned.starts_with('+') {
        return Some(cleaned);
    }

    let national = cleaned.strip_prefix('0').unwrap_or(&cleaned);
    Some(format!("{}{}", DEFAULT_PHONE_COUNTRY_CODE, national))
}
