//! Substring extraction between two text markers.
//!
//! An empty return value always means "not found": callers treat it as a
//! resolution failure rather than as a valid empty fact.

/// Returns the text from the last `start` that precedes the first `end`,
/// up to and including that `end`.
///
/// `intercept("abab12398989", "ab", "98")` yields `"ab12398"`.
pub fn intercept<'a>(s: &'a str, start: &str, end: &str) -> &'a str {
    if s.is_empty() || start.is_empty() || end.is_empty() {
        return "";
    }

    let Some(end_idx) = s.find(end) else {
        return "";
    };
    slice_back_to(s, start, end_idx + end.len())
}

/// Like [`intercept`], but anchored on the last occurrence of `end`.
///
/// Used to find the enclosing entry of a nested field when the document
/// has already been cut just after the field of interest.
pub fn intercept_nearest<'a>(s: &'a str, start: &str, end: &str) -> &'a str {
    if s.is_empty() || start.is_empty() || end.is_empty() {
        return "";
    }

    let Some(end_idx) = s.rfind(end) else {
        return "";
    };
    slice_back_to(s, start, end_idx + end.len())
}

fn slice_back_to<'a>(s: &'a str, start: &str, end_idx: usize) -> &'a str {
    match s[..end_idx].rfind(start) {
        Some(start_idx) => &s[start_idx..end_idx],
        None => "",
    }
}
