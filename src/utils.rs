/// Two-digit years below this value are placed in the 2000s, the rest in the 1900s.
const CENTURY_PIVOT: i32 = 30;

/// Formats an identifier (DOI or content hash) for lookups: trimmed and lower-cased.
///
/// # Arguments
///
/// * `raw` - The identifier as it appears in the source catalog
///
/// Returns `None` for empty or whitespace-only input.
pub fn normalize_identifier(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Like [`normalize_identifier`], for optional input.
pub(crate) fn normalize_optional_identifier(raw: Option<&str>) -> Option<String> {
    raw.and_then(normalize_identifier)
}

/// Length of a string in characters rather than bytes.
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Expands a two-digit year with a sliding century window.
pub(crate) fn expand_two_digit_year(year: i32) -> i32 {
    if year < CENTURY_PIVOT {
        2000 + year
    } else {
        1900 + year
    }
}
