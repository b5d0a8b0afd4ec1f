//! URL handling module for sitelex
//!
//! This module provides the link-scope rules the crawler applies to every
//! discovered URL: site-root prefix matching, site-relative path
//! extraction, and the non-HTML asset extension filter.

use url::Url;

/// File extensions that are never fetched or indexed
const SKIPPED_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png", "gif", "zip", "bmp", "exe"];

/// Checks whether a URL falls under a site root
///
/// `root` must be a normalized trailing-slash root (as produced by config
/// loading), which keeps sibling domains like `example.com.evil.org` from
/// matching `example.com`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitelex::url::is_under_root;
///
/// let page = Url::parse("https://example.com/a/b").unwrap();
/// assert!(is_under_root(&page, "https://example.com/"));
/// assert!(!is_under_root(&page, "https://example.org/"));
/// ```
pub fn is_under_root(url: &Url, root: &str) -> bool {
    url.as_str().starts_with(root)
}

/// Extracts the site-relative path of a URL under a root
///
/// The returned path always starts with `/` and keeps any query string;
/// the root itself maps to `/`. Returns `None` when the URL is not under
/// the root.
pub fn site_relative_path(url: &Url, root: &str) -> Option<String> {
    if !is_under_root(url, root) {
        return None;
    }

    let suffix = &url.as_str()[root.len()..];
    Some(format!("/{}", suffix))
}

/// Checks whether a URL points at a known non-HTML asset
///
/// Matches on the real extension of the URL path, case-insensitively, so
/// `/report.pdf` is skipped while `/mypdf` is not.
pub fn has_skipped_extension(url: &Url) -> bool {
    let path = url.path();

    let last_segment = match path.rsplit('/').next() {
        Some(segment) => segment,
        None => return false,
    };

    let extension = match last_segment.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return false,
    };

    SKIPPED_EXTENSIONS.contains(&extension.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_is_under_root() {
        assert!(is_under_root(&url("https://example.com/"), "https://example.com/"));
        assert!(is_under_root(
            &url("https://example.com/a/b?x=1"),
            "https://example.com/"
        ));
        assert!(!is_under_root(&url("https://other.com/"), "https://example.com/"));
    }

    #[test]
    fn test_sibling_domain_is_not_under_root() {
        // The trailing slash on the root keeps prefix matching honest
        assert!(!is_under_root(
            &url("https://example.com.evil.org/"),
            "https://example.com/"
        ));
    }

    #[test]
    fn test_subdomain_is_not_under_root() {
        assert!(!is_under_root(
            &url("https://www.example.com/"),
            "https://example.com/"
        ));
    }

    #[test]
    fn test_pathed_root_scoping() {
        let root = "https://example.org/blog/";
        assert!(is_under_root(&url("https://example.org/blog/post-1"), root));
        assert!(!is_under_root(&url("https://example.org/about"), root));
    }

    #[test]
    fn test_site_relative_path() {
        let root = "https://example.com/";
        assert_eq!(
            site_relative_path(&url("https://example.com/"), root).as_deref(),
            Some("/")
        );
        assert_eq!(
            site_relative_path(&url("https://example.com/a/b"), root).as_deref(),
            Some("/a/b")
        );
        assert_eq!(
            site_relative_path(&url("https://example.com/a?page=2"), root).as_deref(),
            Some("/a?page=2")
        );
        assert_eq!(site_relative_path(&url("https://other.com/a"), root), None);
    }

    #[test]
    fn test_site_relative_path_under_pathed_root() {
        let root = "https://example.org/blog/";
        assert_eq!(
            site_relative_path(&url("https://example.org/blog/post-1"), root).as_deref(),
            Some("/post-1")
        );
    }

    #[test]
    fn test_skipped_extensions() {
        assert!(has_skipped_extension(&url("https://example.com/report.pdf")));
        assert!(has_skipped_extension(&url("https://example.com/IMG.JPG")));
        assert!(has_skipped_extension(&url("https://example.com/a/b/archive.zip")));

        assert!(!has_skipped_extension(&url("https://example.com/")));
        assert!(!has_skipped_extension(&url("https://example.com/page")));
        assert!(!has_skipped_extension(&url("https://example.com/page.html")));
        // Suffix of the name is not an extension
        assert!(!has_skipped_extension(&url("https://example.com/mypdf")));
    }
}
