//! Backspace over a URL, one logical segment at a time.

use url::Url;

/// Drop the last logical segment of `raw`.
///
/// Segments go in this order: the hash, then the search string, then path
/// segments from the end, then the host (which empties the URL). Anything
/// that does not parse as a hierarchical URL is cleared outright.
///
/// The result is always a prefix of the trimmed input. Parsing only decides
/// whether the URL is usable; the kept text is never re-serialized.
pub fn truncate_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    match Url::parse(raw) {
        Ok(url) if !url.cannot_be_a_base() => {}
        _ => return String::new(),
    }
    // The first '#' always opens the hash and the first '?' the search.
    if let Some(i) = raw.find('#') {
        return raw[..i].to_string();
    }
    if let Some(i) = raw.find('?') {
        return raw[..i].to_string();
    }
    match path_start(raw) {
        Some(start) => pop_segment(raw, start),
        None => String::new(),
    }
}

/// Byte offset of the path, just past the authority.
fn path_start(raw: &str) -> Option<usize> {
    let authority = raw.find("://")? + 3;
    raw[authority..].find('/').map(|i| authority + i)
}

/// Remove the last path segment, counting a trailing slash with it.
fn pop_segment(raw: &str, start: usize) -> String {
    let path = &raw[start..];
    if path.split('/').all(str::is_empty) {
        return String::new();
    }
    let path = path.strip_suffix('/').unwrap_or(path);
    match path.rfind('/') {
        Some(0) | None => raw[..=start].to_string(),
        Some(i) => raw[..start + i].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peels_hash_search_path_then_host() {
        let mut url = "http://example.com/a/b?q=1#top".to_string();
        let mut seen = Vec::new();
        while !url.is_empty() {
            url = truncate_url(&url);
            seen.push(url.clone());
        }
        assert_eq!(
            seen,
            [
                "http://example.com/a/b?q=1",
                "http://example.com/a/b",
                "http://example.com/a",
                "http://example.com/",
                "",
            ]
        );
    }

    #[test]
    fn trailing_slash_counts_with_its_segment() {
        assert_eq!(
            truncate_url("https://example.com/docs/"),
            "https://example.com/"
        );
    }

    #[test]
    fn empty_hash_and_search_are_segments() {
        assert_eq!(truncate_url("http://example.com/#"), "http://example.com/");
        assert_eq!(truncate_url("http://example.com/?"), "http://example.com/");
    }

    #[test]
    fn bare_host_clears() {
        assert_eq!(truncate_url("http://example.com"), "");
    }

    #[test]
    fn kept_text_is_left_as_typed() {
        assert_eq!(
            truncate_url("HTTP://Example.COM/a b?q=1#x"),
            "HTTP://Example.COM/a b?q=1"
        );
        assert_eq!(truncate_url("http://例え.jp/path#x"), "http://例え.jp/path");
        assert_eq!(
            truncate_url("http://example.com:80/a#x"),
            "http://example.com:80/a"
        );
        assert_eq!(
            truncate_url("https://example.com/a%20b/c"),
            "https://example.com/a%20b"
        );
    }

    #[test]
    fn search_without_path_leaves_bare_host() {
        assert_eq!(truncate_url("http://example.com?x=1"), "http://example.com");
        assert_eq!(truncate_url("http://example.com"), "");
    }

    #[test]
    fn repeated_slashes_pop_with_their_segment() {
        assert_eq!(truncate_url("http://example.com/a/b/"), "http://example.com/a");
        assert_eq!(truncate_url("http://example.com/a//"), "http://example.com/a");
        assert_eq!(truncate_url("http://example.com//"), "");
    }

    #[test]
    fn never_below_empty() {
        assert_eq!(truncate_url(""), "");
        assert_eq!(truncate_url("   "), "");
    }

    #[test]
    fn unparseable_and_opaque_urls_clear() {
        assert_eq!(truncate_url("not a url"), "");
        assert_eq!(truncate_url("mailto:someone@example.com"), "");
    }
}
