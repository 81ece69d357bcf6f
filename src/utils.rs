use std::time::Duration;

/// Utility function to create a reasonable timeout for web requests
pub fn calculate_timeout(base_ms: u64, url_length: usize) -> Duration {
    // Longer URLs tend to be search/listing pages that take longer to render
    let additional_ms = (url_length / 20) as u64 * 100;
    Duration::from_millis(base_ms + additional_ms)
}

/// Convert a string to a sanitized filename component
pub fn sanitize_filename(name: &str) -> String {
    let mut name = name.replace("http://", "").replace("https://", "");
    name = name.replace(['/', ':', '?', '&', '=', '#', '%', '\\', '*', '"', '<', '>', '|'], "_");

    // Limit filename length
    if name.len() > 100 {
        let mut end = 100;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        name[..end].to_string()
    } else {
        name
    }
}

/// Host part of a URL string, used to name output directories
///
/// Falls back to the sanitized input when the URL cannot be parsed.
pub fn host_label(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => sanitize_filename(host),
            None => sanitize_filename(url),
        },
        Err(_) => sanitize_filename(url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_timeout_grows_with_url_length() {
        assert_eq!(calculate_timeout(1000, 10), Duration::from_millis(1000));
        assert_eq!(calculate_timeout(1000, 45), Duration::from_millis(1200));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(
            sanitize_filename("https://example.com/a?b=c"),
            "example.com_a_b_c"
        );
        let long = "é".repeat(80);
        assert!(sanitize_filename(&long).len() <= 100);
    }

    #[test]
    fn test_host_label() {
        assert_eq!(host_label("https://news.example.com/list?page=2"), "news.example.com");
        assert_eq!(host_label("not a url"), "not a url");
    }
}
