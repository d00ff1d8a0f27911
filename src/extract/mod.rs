//! Article content extraction.
//!
//! Fetches one article page with a browser-like profile, locates the
//! meaningful fragment using site-aware selectors, derives title and
//! summary, and degrades to synthesized content when the page blocks
//! access or yields too little text.

pub mod fallback;
pub mod site;

use std::collections::HashSet;
use std::time::Duration;

use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use crate::app::error::{EmberError, Result};
use crate::config::AppConfig;
use crate::domain::ArticleContent;
use crate::extract::fallback::degraded_article;
use crate::extract::site::{selector_profile, SelectorProfile, SiteKind};
use crate::fetcher::profile::browser_headers;
use crate::sanitize::{clean_html_for_rich_text, text_content};

pub const DEFAULT_ARTICLE_TIMEOUT: Duration = Duration::from_secs(15);

/// Content shorter than this (visible text) means the primary selector
/// missed; fall through to broader selectors.
const CONTENT_FALLTHROUGH_CHARS: usize = 50;

/// Below this much visible text the page is treated as access-restricted.
const MIN_EXTRACTED_CHARS: usize = 10;

/// Broader selectors tried when the profile's content selectors miss.
const SECONDARY_SELECTORS: &[&str] = &[".post", ".main", "#app", "#root", "body"];

const SUMMARY_MAX_CHARS: usize = 160;

pub struct ArticleExtractor {
    client: Client,
}

impl ArticleExtractor {
    pub fn new() -> Self {
        Self::with_config(&AppConfig::default())
    }

    pub fn with_config(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.article_timeout_secs))
            .redirect(Policy::limited(config.max_redirects))
            .gzip(true)
            .brotli(true)
            .default_headers(browser_headers())
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }

    /// Fetch and extract one article.
    ///
    /// Access-restriction-shaped responses (blocked statuses) come back as
    /// degraded content, not errors; a malformed URL is a validation error;
    /// anything else is [`EmberError::Extraction`].
    pub async fn fetch_article_content(&self, url: &str) -> Result<ArticleContent> {
        let parsed = Url::parse(url)?;

        let response = self
            .client
            .get(parsed.clone())
            .send()
            .await
            .map_err(|e| EmberError::Extraction(e.to_string()))?;

        let status = response.status();
        if is_blocked_status(status) {
            tracing::info!(url, %status, "Blocked status, synthesizing degraded content");
            return Ok(degraded_article(url, None, None));
        }
        if !status.is_success() {
            return Err(EmberError::Extraction(format!(
                "upstream returned status {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| EmberError::Extraction(e.to_string()))?;
        let html = String::from_utf8_lossy(&body);

        Ok(extract_from_html(url, &parsed, &html))
    }
}

impl Default for ArticleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Pure extraction pass over fetched markup.
pub fn extract_from_html(url: &str, parsed: &Url, html: &str) -> ArticleContent {
    let document = Html::parse_document(html);
    let kind = SiteKind::detect(parsed.host_str().unwrap_or(""));
    let profile = selector_profile(kind);

    let title = derive_title(&document, profile, parsed);
    let summary = derive_summary(&document, profile);
    let stripped = derive_content(&document, profile);

    if text_content(&stripped).chars().count() < MIN_EXTRACTED_CHARS {
        // Pages that render everything behind a login or script wall
        // produce an empty shell; treat that as a restriction.
        tracing::debug!(url, site = ?kind, "Extraction too sparse, degrading");
        return degraded_article(url, Some(&title), summary.as_deref());
    }

    let content = clean_html_for_rich_text(&stripped);
    let summary = summary.unwrap_or_else(|| first_paragraph_prefix(&document));

    ArticleContent {
        title: title.trim().to_string(),
        content,
        summary: summary.trim().to_string(),
    }
}

/// Title chain: document title, first heading, site title element,
/// open-graph title, URL-derived guess.
fn derive_title(document: &Html, profile: &SelectorProfile, url: &Url) -> String {
    if let Some(t) = select_text(document, "title") {
        return t;
    }
    if let Some(t) = select_text(document, "h1") {
        return t;
    }
    if let Some(sel) = profile.title {
        if let Some(t) = select_text(document, sel) {
            return t;
        }
    }
    if let Some(t) = select_meta(document, "meta[property=\"og:title\"]") {
        return t;
    }
    title_from_url(url)
}

fn derive_summary(document: &Html, profile: &SelectorProfile) -> Option<String> {
    select_meta(document, "meta[name=\"description\"]")
        .or_else(|| select_meta(document, "meta[property=\"og:description\"]"))
        .or_else(|| profile.summary.and_then(|sel| select_text(document, sel)))
        .map(|s| truncate_chars(&s, SUMMARY_MAX_CHARS))
}

/// Inner HTML of the first selector with meaningful text after noise
/// removal, profile selectors first, then the broad secondary list,
/// finally the body.
///
/// Measuring after the noise cut matters: a region stuffed with share
/// buttons can clear the threshold on noise alone and mask the real
/// content further down the page.
fn derive_content(document: &Html, profile: &SelectorProfile) -> String {
    for sel in profile.content {
        if let Some(html) = select_inner_html(document, sel) {
            let cleaned = strip_noise(&html, profile.remove);
            if text_content(&cleaned).chars().count() >= CONTENT_FALLTHROUGH_CHARS {
                return cleaned;
            }
        }
    }
    for sel in SECONDARY_SELECTORS {
        if let Some(html) = select_inner_html(document, sel) {
            let cleaned = strip_noise(&html, profile.remove);
            if text_content(&cleaned).chars().count() >= CONTENT_FALLTHROUGH_CHARS {
                return cleaned;
            }
        }
    }
    let body = select_inner_html(document, "body").unwrap_or_default();
    strip_noise(&body, profile.remove)
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Cut known noise regions out of an extracted fragment.
///
/// `scraper` trees are immutable, so the fragment is re-serialized from
/// its own parse with the matched subtrees skipped. Working on the tree
/// keeps duplicate markup intact: only the nodes the selectors matched
/// disappear, not other regions that happen to serialize identically.
fn strip_noise(fragment_html: &str, remove: &[&str]) -> String {
    let fragment = Html::parse_fragment(fragment_html);
    let mut removed: HashSet<NodeId> = HashSet::new();
    for sel in remove {
        let Ok(selector) = Selector::parse(sel) else {
            continue;
        };
        for node in fragment.select(&selector) {
            removed.insert(node.id());
        }
    }
    if removed.is_empty() {
        return fragment.root_element().inner_html();
    }
    let mut out = String::new();
    for child in fragment.root_element().children() {
        serialize_without(child, &removed, &mut out);
    }
    out
}

/// Serialize a node, skipping subtrees whose root is in `removed`.
/// Untouched subtrees go through the parser's own serializer.
fn serialize_without(node: NodeRef<'_, Node>, removed: &HashSet<NodeId>, out: &mut String) {
    if removed.contains(&node.id()) {
        return;
    }
    match node.value() {
        Node::Element(element) => {
            if !node.descendants().any(|d| removed.contains(&d.id())) {
                if let Some(el) = ElementRef::wrap(node) {
                    out.push_str(&el.html());
                }
                return;
            }
            let name = element.name();
            out.push('<');
            out.push_str(name);
            for (attr, value) in element.attrs() {
                out.push(' ');
                out.push_str(attr);
                out.push_str("=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(value));
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&name) {
                return;
            }
            for child in node.children() {
                serialize_without(child, removed, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        Node::Text(text) => {
            let raw: &str = &text.text;
            out.push_str(&html_escape::encode_text(raw));
        }
        Node::Comment(comment) => {
            let raw: &str = &comment.comment;
            out.push_str("<!--");
            out.push_str(raw);
            out.push_str("-->");
        }
        _ => {}
    }
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let element = document.select(&selector).next()?;
    let text: String = element.text().collect::<Vec<_>>().join(" ");
    let trimmed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!trimmed.is_empty()).then_some(trimmed)
}

fn select_meta(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let element = document.select(&selector).next()?;
    let content = element.value().attr("content")?.trim();
    (!content.is_empty()).then(|| content.to_string())
}

fn select_inner_html(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next().map(|el| el.inner_html())
}

fn first_paragraph_prefix(document: &Html) -> String {
    select_text(document, "p")
        .map(|t| truncate_chars(&t, SUMMARY_MAX_CHARS))
        .unwrap_or_default()
}

/// Last path segment, de-slugged, as a title of last resort.
fn title_from_url(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut s| s.next_back())
        .filter(|s| !s.is_empty())
        .unwrap_or("");
    if segment.is_empty() {
        return url.host_str().unwrap_or("Article").to_string();
    }
    segment.replace(['-', '_'], " ")
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

fn is_blocked_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::FORBIDDEN
            | StatusCode::UNAUTHORIZED
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::UNAVAILABLE_FOR_LEGAL_REASONS
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(url: &str, html: &str) -> ArticleContent {
        let parsed = Url::parse(url).unwrap();
        extract_from_html(url, &parsed, html)
    }

    const LONG_BODY: &str = "This article body is comfortably longer than the fall-through \
         threshold, so the extractor should accept it as genuine content.";

    #[test]
    fn test_extracts_article_element() {
        let html = format!(
            "<html><head><title>Headline</title>\
             <meta name=\"description\" content=\"A summary.\"></head>\
             <body><nav>menu</nav><article><p>{LONG_BODY}</p></article></body></html>"
        );
        let article = extract("https://news.example.com/story", &html);
        assert_eq!(article.title, "Headline");
        assert_eq!(article.summary, "A summary.");
        assert!(article.content.contains("comfortably longer"));
        assert!(!article.content.contains("menu"));
    }

    #[test]
    fn test_title_falls_back_to_h1() {
        let html = format!("<body><h1>From Heading</h1><article><p>{LONG_BODY}</p></article></body>");
        let article = extract("https://news.example.com/story", &html);
        assert_eq!(article.title, "From Heading");
    }

    #[test]
    fn test_title_falls_back_to_url_slug() {
        let html = format!("<body><article><p>{LONG_BODY}</p></article></body>");
        let article = extract("https://news.example.com/breaking-sea-levels", &html);
        assert_eq!(article.title, "breaking sea levels");
    }

    #[test]
    fn test_short_content_falls_through_to_body() {
        let html = format!("<body><article>tiny</article><p>{LONG_BODY}</p></body>");
        let article = extract("https://news.example.com/story", &html);
        assert!(article.content.contains("comfortably longer"));
    }

    #[test]
    fn test_empty_page_degrades_not_errors() {
        let article = extract("https://www.zhihu.com/question/1", "<body></body>");
        assert!(article.content.contains("zhihu.com") || article.content.contains("Zhihu"));
        assert!(article.content.contains("https://www.zhihu.com/question/1"));
    }

    #[test]
    fn test_summary_from_og_description() {
        let html = format!(
            "<head><title>t</title>\
             <meta property=\"og:description\" content=\"OG summary\"></head>\
             <body><article><p>{LONG_BODY}</p></article></body>"
        );
        let article = extract("https://news.example.com/s", &html);
        assert_eq!(article.summary, "OG summary");
    }

    #[test]
    fn test_summary_falls_back_to_first_paragraph() {
        let html = format!("<head><title>t</title></head><body><article><p>{LONG_BODY}</p></article></body>");
        let article = extract("https://news.example.com/s", &html);
        assert!(article.summary.starts_with("This article body"));
    }

    #[test]
    fn test_noise_selectors_removed_from_fragment() {
        let body = format!(
            "<div class=\"RichContent-inner\"><p>{LONG_BODY}</p>\
             <div class=\"ContentItem-actions\"><button>upvote</button></div></div>"
        );
        let html = format!("<head><title>q</title></head><body>{body}</body>");
        let article = extract("https://www.zhihu.com/question/1/answer/2", &html);
        assert!(article.content.contains("comfortably longer"));
        assert!(!article.content.contains("upvote"));
    }

    #[test]
    fn test_noise_only_region_falls_through_to_real_content() {
        // The primary region clears the length threshold on share-widget
        // text alone; the article itself lives outside it.
        let noise = "Share this answer with your friends on every network you \
             can think of, then share it again.";
        let body = format!(
            "<div class=\"RichContent-inner\">\
             <div class=\"ContentItem-actions\">{noise}</div></div>\
             <p>{LONG_BODY}</p>"
        );
        let html = format!("<head><title>q</title></head><body>{body}</body>");
        let article = extract("https://www.zhihu.com/question/1/answer/2", &html);
        assert!(article.content.contains("comfortably longer"));
        assert!(!article.content.contains("Share this answer"));
    }

    #[test]
    fn test_noise_only_page_degrades() {
        let noise = "Upvote, favorite, and forward this to everyone you know; \
             engagement is the only content this page has.";
        let html = format!(
            "<head><title>q</title></head><body>\
             <div class=\"RichContent-inner\">\
             <div class=\"ContentItem-actions\">{noise}</div></div></body>"
        );
        let article = extract("https://www.zhihu.com/question/1/answer/2", &html);
        assert!(article.content.contains("https://www.zhihu.com/question/1/answer/2"));
        assert!(!article.content.contains("Upvote"));
    }

    #[test]
    fn test_strip_noise_keeps_duplicate_markup() {
        let html = "<p>repeated line</p><div class=\"ad\">spam</div><p>repeated line</p>";
        let out = strip_noise(html, &[".ad"]);
        assert!(!out.contains("spam"));
        assert_eq!(out.matches("repeated line").count(), 2);
    }

    #[test]
    fn test_strip_noise_excises_nested_subtree() {
        let html = "<div><span class=\"ad\">spam</span><em>keep</em></div>";
        let out = strip_noise(html, &[".ad"]);
        assert!(!out.contains("spam"));
        assert!(out.contains("<em>keep</em>"));
        assert!(out.starts_with("<div>"));
    }

    #[test]
    fn test_content_is_sanitized() {
        let html = format!(
            "<head><title>t</title></head>\
             <body><article><p>{LONG_BODY}</p><script>evil()</script></article></body>"
        );
        let article = extract("https://news.example.com/s", &html);
        assert!(!article.content.contains("<script"));
        assert!(!article.content.contains("evil"));
    }

    #[test]
    fn test_blocked_statuses() {
        assert!(is_blocked_status(StatusCode::FORBIDDEN));
        assert!(is_blocked_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_blocked_status(StatusCode::NOT_FOUND));
        assert!(!is_blocked_status(StatusCode::OK));
    }
}
