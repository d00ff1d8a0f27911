//! Degraded-content synthesis.
//!
//! When a page blocks automated access or yields no usable text, the
//! extractor returns a synthesized article instead of an error. This is a
//! pure function of (url, title, summary); it performs no I/O and cannot
//! fail.

use html_escape::{encode_safe, encode_text};
use url::Url;

use crate::domain::ArticleContent;
use crate::extract::site::platform_for;

pub fn degraded_article(
    url: &str,
    title: Option<&str>,
    summary: Option<&str>,
) -> ArticleContent {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default();
    let platform = platform_for(&host);

    let title = match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => t.to_string(),
        None => format!("Content on {}", platform.name),
    };

    let known_summary = summary.map(str::trim).filter(|s| !s.is_empty());

    let escaped_url = encode_safe(url);
    let mut content = String::new();
    content.push_str(&format!(
        "<p><strong>{}</strong></p>",
        encode_text(&format!(
            "The full content could not be retrieved from {}.",
            platform.name
        ))
    ));
    content.push_str(&format!(
        "<p>{}</p>",
        encode_text(&format!(
            "{} is {} and may restrict automated access to its pages.",
            platform.name, platform.description
        ))
    ));
    if let Some(s) = known_summary {
        content.push_str(&format!("<blockquote>{}</blockquote>", encode_text(s)));
    }
    content.push_str(&format!(
        "<p><a href=\"{}\">View the original on {}</a></p>",
        escaped_url,
        encode_text(platform.name)
    ));

    let summary = known_summary.map(str::to_string).unwrap_or_else(|| {
        format!(
            "The full content could not be retrieved; open the original page on {}.",
            platform.name
        )
    });

    ArticleContent {
        title,
        content,
        summary,
    }
}
