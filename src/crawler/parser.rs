//! HTML parsing for link discovery and text extraction
//!
//! The crawler uses this module to pull outgoing links from fetched
//! pages; the search engine uses it to recover a page's title and
//! visible text from stored HTML when building results.

use scraper::{Html, Selector};
use url::Url;

/// Element names whose text never counts as page text
const NON_TEXT_ELEMENTS: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Extracts all followable anchor links from a page, resolved against
/// its base URL
///
/// Links with non-HTTP schemes (`javascript:`, `mailto:`, `tel:`,
/// `data:`) and same-page anchors are dropped; fragments on surviving
/// links are stripped so URLs differing only by fragment collapse into
/// one work item.
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(anchor_selector) = Selector::parse("a[href]") {
        for element in document.select(&anchor_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Extracts the first `<title>` of a document, trimmed
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts the visible text of a document as a whitespace-joined string
///
/// Skips the head and any script/style subtree, so what remains is the
/// text a reader would see rendered.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts = Vec::new();

    for node in document.tree.nodes() {
        let text = match node.value().as_text() {
            Some(text) => text,
            None => continue,
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|element| NON_TEXT_ELEMENTS.contains(&element.name()))
                .unwrap_or(false)
        });
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed.to_string());
        }
    }

    parts.join(" ")
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Same-page anchors
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    // Fragment-only links point back at the same page
    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(mut absolute_url) => {
            if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
                return None;
            }
            absolute_url.set_fragment(None);
            Some(absolute_url)
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    fn link_strings(html: &str) -> Vec<String> {
        extract_links(html, &base_url())
            .into_iter()
            .map(|url| url.to_string())
            .collect()
    }

    #[test]
    fn test_extract_title() {
        let html = r#"<html><head><title>Test Page</title></head><body></body></html>"#;
        assert_eq!(extract_title(html), Some("Test Page".to_string()));
    }

    #[test]
    fn test_extract_title_with_whitespace() {
        let html = r#"<html><head><title>  Test Page  </title></head><body></body></html>"#;
        assert_eq!(extract_title(html), Some("Test Page".to_string()));
    }

    #[test]
    fn test_no_title() {
        let html = r#"<html><head></head><body></body></html>"#;
        assert_eq!(extract_title(html), None);
    }

    #[test]
    fn test_extract_absolute_link() {
        let links = link_strings(r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#);
        assert_eq!(links, vec!["https://other.com/page"]);
    }

    #[test]
    fn test_extract_relative_link() {
        let links = link_strings(r#"<html><body><a href="/other">Link</a></body></html>"#);
        assert_eq!(links, vec!["https://example.com/other"]);
    }

    #[test]
    fn test_extract_relative_path_link() {
        let links = link_strings(r#"<html><body><a href="other">Link</a></body></html>"#);
        assert_eq!(links, vec!["https://example.com/other"]);
    }

    #[test]
    fn test_skip_javascript_link() {
        let links = link_strings(r#"<html><body><a href="javascript:void(0)">Link</a></body></html>"#);
        assert!(links.is_empty());
    }

    #[test]
    fn test_skip_mailto_and_tel_links() {
        let links = link_strings(
            r#"<html><body>
                <a href="mailto:test@example.com">Email</a>
                <a href="tel:+1234567890">Call</a>
            </body></html>"#,
        );
        assert!(links.is_empty());
    }

    #[test]
    fn test_skip_data_uri() {
        let links = link_strings(r#"<html><body><a href="data:text/html,<h1>Test</h1>">Data</a></body></html>"#);
        assert!(links.is_empty());
    }

    #[test]
    fn test_skip_fragment_only() {
        let links = link_strings(r##"<html><body><a href="#section">Jump</a></body></html>"##);
        assert!(links.is_empty());
    }

    #[test]
    fn test_fragment_stripped_from_link() {
        let links = link_strings(r##"<html><body><a href="/other#section">Link</a></body></html>"##);
        assert_eq!(links, vec!["https://example.com/other"]);
    }

    #[test]
    fn test_follow_nofollow_links() {
        let links = link_strings(r#"<html><body><a href="/page2" rel="nofollow">Link</a></body></html>"#);
        assert_eq!(links, vec!["https://example.com/page2"]);
    }

    #[test]
    fn test_skip_non_http_scheme() {
        let links = link_strings(r#"<html><body><a href="ftp://example.com/file">FTP</a></body></html>"#);
        assert!(links.is_empty());
    }

    #[test]
    fn test_mixed_valid_and_invalid_links() {
        let links = link_strings(
            r#"<html><body>
                <a href="/valid">Valid</a>
                <a href="javascript:alert('no')">Invalid</a>
                <a href="mailto:test@example.com">Invalid</a>
                <a href="/another-valid">Valid</a>
            </body></html>"#,
        );
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_extract_text_skips_markup_and_scripts() {
        let html = r#"<html>
            <head><title>Hidden Title</title><style>p { color: red; }</style></head>
            <body><p>alpha</p><script>var beta = 1;</script><div>gamma</div></body>
        </html>"#;
        let text = extract_text(html);
        assert!(text.contains("alpha"));
        assert!(text.contains("gamma"));
        assert!(!text.contains("beta"));
        assert!(!text.contains("Hidden Title"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn test_extract_text_joins_with_spaces() {
        let html = "<html><body><p>alpha</p><p>beta</p></body></html>";
        assert_eq!(extract_text(html), "alpha beta");
    }
}
