/// Removes blank lines and trims every remaining line
///
/// Used for saved page content: indentation and trailing spaces are dropped
/// but the line structure (headings, list items) is kept.
pub fn clean_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapses all runs of whitespace into single spaces
pub fn normalize_whitespace(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercased, whitespace-normalized form used for token matching
pub fn match_key(text: &str) -> String {
    normalize_whitespace(text).to_lowercase()
}

/// Whether `text` contains `token`, ignoring case
pub fn contains_token(text: &str, token: &str) -> bool {
    match_key(text).contains(&match_key(token))
}
