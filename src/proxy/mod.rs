//! Webview proxy rewriter.
//!
//! Fetches a full page and rewrites it for display inside an embedded
//! browser view: no script may survive, relative resources are made
//! absolute, and a mobile style block is appended. The operation is
//! infallible from the caller's side; any failure produces a synthesized,
//! self-contained error page.

use std::time::Duration;

use html_escape::{encode_safe, encode_text};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use reqwest::redirect::Policy;
use reqwest::Client;
use url::Url;

use crate::config::AppConfig;
use crate::fetcher::profile::browser_headers;

/// Tags whose whole subtree is executable or frame-like and must not reach
/// the embedding view.
const EXECUTABLE_TAGS: &[&str] = &["script", "iframe", "frame", "object", "embed", "noscript"];

static EXECUTABLE_PAIRS: Lazy<Vec<Regex>> = Lazy::new(|| {
    EXECUTABLE_TAGS
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).unwrap())
        .collect()
});

static EXECUTABLE_STRAYS: Lazy<Vec<Regex>> = Lazy::new(|| {
    EXECUTABLE_TAGS
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)</?{tag}\b[^>]*/?>")).unwrap())
        .collect()
});

static UNCLOSED_SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*(?:>.*)?\z").unwrap());

static EVENT_HANDLER_ATTRS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\s+on[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).unwrap()
});

/// Simple ad-marked containers. Matching is regex-based and intentionally
/// conservative: only unambiguous markers, first matching close tag.
static AD_BLOCKS: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["div", "section", "aside", "span", "ins"]
        .iter()
        .map(|tag| {
            Regex::new(&format!(
                r#"(?is)<{tag}\b[^>]*(?:class|id)\s*=\s*["'][^"']*(?:adsbygoogle|advert|sponsor|banner-ad|ad-banner|ad-container|google-ad)[^"']*["'][^>]*>.*?</{tag}\s*>"#
            ))
            .unwrap()
        })
        .collect()
});

static IMG_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(<img\b[^>]*?\ssrc\s*=\s*)(["'])([^"']+)["']"#).unwrap());

static LINK_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(<link\b[^>]*?\shref\s*=\s*)(["'])([^"']+)["']"#).unwrap());

static HEAD_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</head\s*>").unwrap());

static BODY_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</body\s*>").unwrap());

/// Viewport and mobile styling appended to every proxied page.
const MOBILE_HEAD: &str = concat!(
    "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">",
    "<style>",
    "body{font-size:16px;line-height:1.6;padding:12px;max-width:100%;overflow-x:hidden;}",
    "img{max-width:100%;height:auto;}",
    "nav,aside,.sidebar,.nav,.menu,.topbar,.footer-links{display:none !important;}",
    "</style>"
);

pub struct WebviewProxy {
    client: Client,
}

impl WebviewProxy {
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

    /// Fetch `url` and return a sanitized, webview-ready document.
    ///
    /// Never fails: malformed URLs, network errors, and bad statuses all
    /// yield a synthesized error page embedding the original URL.
    pub async fn fetch_article_html(&self, url: &str) -> String {
        let parsed = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => return error_page(url, &e.to_string()),
        };

        let response = match self.client.get(parsed).send().await {
            Ok(r) => r,
            Err(e) => return error_page(url, &e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            return error_page(url, &format!("upstream returned status {status}"));
        }

        // Redirects may have moved the page; resolve resources against
        // where it actually came from.
        let base = response.url().clone();
        match response.bytes().await {
            Ok(body) => rewrite_page(&String::from_utf8_lossy(&body), &base),
            Err(e) => error_page(url, &e.to_string()),
        }
    }
}

impl Default for WebviewProxy {
    fn default() -> Self {
        Self::new()
    }
}

/// Pure rewrite pass over a fetched document.
///
/// The deleting passes run together until nothing changes: removing an ad
/// block or event attribute can splice its surroundings into a brand-new
/// executable tag, and a single ordered sweep would miss it. Every pass
/// only shrinks the string, which bounds the loop.
pub fn rewrite_page(html: &str, base: &Url) -> String {
    let mut out = html.to_string();

    loop {
        let before = out.len();
        for re in EXECUTABLE_PAIRS.iter() {
            out = re.replace_all(&out, "").into_owned();
        }
        out = UNCLOSED_SCRIPT.replace_all(&out, "").into_owned();
        for re in EXECUTABLE_STRAYS.iter() {
            out = re.replace_all(&out, "").into_owned();
        }
        out = EVENT_HANDLER_ATTRS.replace_all(&out, "").into_owned();
        for re in AD_BLOCKS.iter() {
            out = re.replace_all(&out, "").into_owned();
        }
        if out.len() == before {
            break;
        }
    }

    out = rewrite_resource_urls(&out, base);
    inject_mobile_head(&out)
}

fn rewrite_resource_urls(html: &str, base: &Url) -> String {
    let resolve = |caps: &Captures| -> String {
        let prefix = &caps[1];
        let quote = &caps[2];
        let value = &caps[3];
        let resolved = resolve_url(value, base);
        format!("{prefix}{quote}{resolved}{quote}")
    };

    let out = IMG_SRC.replace_all(html, resolve).into_owned();
    LINK_HREF.replace_all(&out, resolve).into_owned()
}

/// Make a resource URL absolute against the page URL. Absolute,
/// protocol-relative, and data: URLs pass through untouched.
fn resolve_url(value: &str, base: &Url) -> String {
    let trimmed = value.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("//")
        || lower.starts_with("data:")
    {
        return trimmed.to_string();
    }
    match base.join(trimmed) {
        Ok(abs) => abs.to_string(),
        Err(_) => trimmed.to_string(),
    }
}

fn inject_mobile_head(html: &str) -> String {
    if HEAD_CLOSE.is_match(html) {
        return HEAD_CLOSE
            .replace(html, format!("{MOBILE_HEAD}</head>"))
            .into_owned();
    }
    if BODY_CLOSE.is_match(html) {
        return BODY_CLOSE
            .replace(html, format!("{MOBILE_HEAD}</body>"))
            .into_owned();
    }
    format!("{html}{MOBILE_HEAD}")
}

/// Self-contained document shown when the page cannot be proxied.
pub fn error_page(url: &str, message: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html><html><head>",
            "<meta charset=\"utf-8\">",
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">",
            "<title>Page unavailable</title>",
            "</head><body>",
            "<h1>Page unavailable</h1>",
            "<p>The page could not be loaded: {msg}</p>",
            "<p><a href=\"{href}\">Open the original page</a></p>",
            "</body></html>"
        ),
        msg = encode_text(message),
        href = encode_safe(url),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://ex.com/page").unwrap()
    }

    #[test]
    fn test_relative_img_src_resolved_against_base() {
        let out = rewrite_page(r#"<body><img src="/a.png"></body>"#, &base());
        assert!(out.contains(r#"src="https://ex.com/a.png""#));
    }

    #[test]
    fn test_relative_path_without_slash() {
        let out = rewrite_page(r#"<img src="img/b.jpg">"#, &base());
        assert!(out.contains(r#"src="https://ex.com/img/b.jpg""#));
    }

    #[test]
    fn test_absolute_and_data_urls_untouched() {
        let html = r#"<img src="https://cdn.ex.com/a.png"><img src="data:image/png;base64,xyz">"#;
        let out = rewrite_page(html, &base());
        assert!(out.contains(r#"src="https://cdn.ex.com/a.png""#));
        assert!(out.contains(r#"src="data:image/png;base64,xyz""#));
    }

    #[test]
    fn test_stylesheet_href_resolved() {
        let out = rewrite_page(r#"<link rel="stylesheet" href="/css/site.css">"#, &base());
        assert!(out.contains(r#"href="https://ex.com/css/site.css""#));
    }

    #[test]
    fn test_scripts_never_survive() {
        let html = r#"<head><script src="a.js"></script></head><body><script>x()</script><p>hi</p>"#;
        let out = rewrite_page(html, &base());
        assert!(!out.to_ascii_lowercase().contains("<script"));
    }

    #[test]
    fn test_unclosed_script_removed() {
        let out = rewrite_page("<p>ok</p><script>var x = 1;", &base());
        assert!(!out.contains("var x"));
    }

    #[test]
    fn test_iframes_and_event_handlers_removed() {
        let html = r#"<iframe src="https://evil.example"></iframe><p onclick="x()">hi</p>"#;
        let out = rewrite_page(html, &base());
        assert!(!out.contains("<iframe"));
        assert!(!out.contains("onclick"));
    }

    #[test]
    fn test_removed_ad_blocks_cannot_rebuild_script() {
        let html = concat!(
            r#"<p>story</p>"#,
            r#"<scr<div class="advert">x</div>ipt>alert(1)"#,
            r#"</scr<ins class="advert">y</ins>ipt>"#
        );
        let out = rewrite_page(html, &base());
        assert!(!out.to_ascii_lowercase().contains("<script"));
        assert!(!out.contains("alert"));
        assert!(out.contains("story"));
    }

    #[test]
    fn test_removed_executable_cannot_rebuild_event_handler() {
        let html = r#"<p on<iframe></iframe>click="x()">hi</p>"#;
        let out = rewrite_page(html, &base());
        assert!(!out.contains("onclick"));
        assert!(out.contains("hi"));
    }

    #[test]
    fn test_ad_container_removed() {
        let html = r#"<div class="ad-banner top"><a href="buy">buy</a></div><p>story</p>"#;
        let out = rewrite_page(html, &base());
        assert!(!out.contains("buy"));
        assert!(out.contains("story"));
    }

    #[test]
    fn test_mobile_head_injected_before_head_close() {
        let out = rewrite_page("<html><head><title>t</title></head><body></body></html>", &base());
        assert!(out.contains("viewport"));
        let head_end = out.find("</head>").unwrap();
        let viewport = out.find("viewport").unwrap();
        assert!(viewport < head_end);
    }

    #[test]
    fn test_mobile_head_appended_when_no_head() {
        let out = rewrite_page("<p>bare fragment</p>", &base());
        assert!(out.contains("viewport"));
    }

    #[test]
    fn test_error_page_embeds_url_and_message() {
        let page = error_page("https://ex.com/x", "connection refused");
        assert!(page.contains("https://ex.com/x"));
        assert!(page.contains("connection refused"));
        assert!(page.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_error_page_escapes_malicious_url() {
        let page = error_page(r#""><script>alert(1)</script>"#, "bad");
        assert!(!page.contains("<script>"));
    }
}
