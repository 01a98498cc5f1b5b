//! Syntactic URL validation
//!
//! The classifier is the first gate for every candidate value: it decides
//! whether a string is even worth a network request. It is pure and
//! deterministic, performs no network access, and never panics on
//! malformed input.

use url::Url;

/// Returns true only for absolute `http`/`https` URLs with a non-empty host.
///
/// Rejected without ever raising: empty strings, relative and
/// scheme-relative references (`//host/path`), unsupported schemes, and
/// values with malformed percent-encoding.
pub fn is_valid_url(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    if !has_valid_percent_encoding(value) {
        return false;
    }
    match Url::parse(value) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        }
        // Relative references land here: Url::parse has no base to join against
        Err(_) => false,
    }
}

/// Every `%` must introduce exactly two hex digits. The url crate is
/// permissive about stray percent signs, so this is checked up front.
fn has_valid_percent_encoding(value: &str) -> bool {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 2 >= bytes.len()
                || !bytes[i + 1].is_ascii_hexdigit()
                || !bytes[i + 2].is_ascii_hexdigit()
            {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}
