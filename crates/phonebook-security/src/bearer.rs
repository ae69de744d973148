//! `Authorization` header parsing

/// Returns the token of a `Bearer <token>` header value.
///
/// The scheme is matched case-insensitively. Any other shape (missing
/// scheme, other schemes, empty token) yields `None`.
pub fn extract_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}
