//! String utilities for the domain layer.

/// Truncate to at most `max_len` bytes, ending in `...` when shortened.
///
/// Cuts on a char boundary so multi-byte arguments (paths, emoji in plan
/// text) never split.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len.saturating_sub(3).min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
