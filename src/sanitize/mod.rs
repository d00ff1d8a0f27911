//! Rich-text HTML cleaner.
//!
//! Reduces an untrusted HTML fragment to the small tag set a constrained
//! rich-text renderer supports. Pure text transform, no parsing tree: the
//! input is frequently malformed, and every pass must degrade rather than
//! fail, so the cleaner is built from lazily-compiled regex passes over the
//! raw string.

use once_cell::sync::Lazy;
use regex::Regex;

/// Output ceiling, to bound downstream rendering cost.
pub const MAX_RICH_TEXT_CHARS: usize = 50_000;

/// Below this much visible text the fragment is not worth rendering.
const MIN_TEXT_CHARS: usize = 20;

/// Returned instead of near-empty markup.
pub const RICH_TEXT_PLACEHOLDER: &str =
    "<p>Content is loading. Please open the original page if nothing appears.</p>";

/// Tags removed together with everything inside them.
const BLOCKED_TAGS: &[&str] = &[
    "script", "style", "iframe", "frame", "frameset", "noscript", "form", "object", "embed",
    "video", "audio", "canvas", "svg", "select", "textarea", "button",
];

/// Unpaired tags removed outright (the blocked set again, to catch stray
/// open/close tags, plus void metadata tags).
const STRAY_TAGS: &[&str] = &[
    "script", "style", "iframe", "frame", "frameset", "noscript", "form", "object", "embed",
    "video", "audio", "canvas", "svg", "select", "textarea", "button", "link", "meta", "input",
    "base",
];

static BLOCKED_PAIRS: Lazy<Vec<Regex>> = Lazy::new(|| {
    BLOCKED_TAGS
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).unwrap())
        .collect()
});

/// An unclosed executable block swallows the rest of the input; dropping
/// the tail is safer than letting its body surface as text. Also matches
/// a dangling open tag that never reaches `>`.
static UNCLOSED_EXECUTABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(?:script|style|iframe)\b[^>]*(?:>.*)?\z").unwrap());

static STRAY_SINGLES: Lazy<Vec<Regex>> = Lazy::new(|| {
    STRAY_TAGS
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)</?{tag}\b[^>]*/?>")).unwrap())
        .collect()
});

static COMMENTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static STRIPPED_ATTRS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\s+(?:id|class|style|data-[a-z0-9_-]+|on[a-z]+)\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#)
        .unwrap()
});

static IMG_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<img\b([^>]*?)\s*/?>").unwrap());

static CONTAINER_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(?:div|section|article)\b[^>]*>").unwrap());

static CONTAINER_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</(?:div|section|article)\s*>").unwrap());

static EMPTY_PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<p[^>]*>(?:\s|&nbsp;|<br\s*/?>)*</p>").unwrap());

static NESTED_P_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<p[^>]*>\s*<p\b").unwrap());

static NESTED_P_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</p>\s*</p>").unwrap());

static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

/// Visible text of a fragment: tags stripped, entities decoded, trimmed.
pub fn text_content(html: &str) -> String {
    let stripped = ANY_TAG.replace_all(html, " ");
    let decoded = html_escape::decode_html_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Clean an untrusted fragment down to the rich-text tag set.
///
/// Never fails; insufficient surviving text yields
/// [`RICH_TEXT_PLACEHOLDER`] instead of near-empty markup.
pub fn clean_html_for_rich_text(html: &str) -> String {
    let mut out = remove_disallowed(html.to_string());

    // Structural containers collapse to the one supported block tag.
    out = CONTAINER_OPEN.replace_all(&out, "<p>").into_owned();
    out = CONTAINER_CLOSE.replace_all(&out, "</p>").into_owned();

    // Collapsing containers produces nested and empty paragraphs; iterate
    // until stable, with a bound since each pass strictly shrinks.
    loop {
        let before = out.len();
        out = NESTED_P_OPEN.replace_all(&out, "<p>").into_owned();
        out = NESTED_P_CLOSE.replace_all(&out, "</p>").into_owned();
        out = EMPTY_PARAGRAPH.replace_all(&out, "").into_owned();
        if out.len() == before {
            break;
        }
    }

    // Paragraph cleanup deletes text too, so the disallowed passes get a
    // final run over the result.
    out = remove_disallowed(out);

    let out = out.trim();
    if text_content(out).chars().count() < MIN_TEXT_CHARS {
        return RICH_TEXT_PLACEHOLDER.to_string();
    }

    // Images keep only their source, plus responsive sizing. Runs after
    // the last attribute strip so the injected style survives.
    let out = IMG_TAG
        .replace_all(out, "<img$1 style=\"max-width:100%;height:auto;\">")
        .into_owned();

    truncate_chars(&out, MAX_RICH_TEXT_CHARS)
}

/// Deleting a span can splice the text around it into a brand-new tag
/// (a comment or attribute sitting inside `<scr...ipt>`), so the deleting
/// passes repeat together until nothing changes. Every pass only shrinks
/// the string, which bounds the loop.
fn remove_disallowed(mut out: String) -> String {
    loop {
        let before = out.len();
        for re in BLOCKED_PAIRS.iter() {
            out = re.replace_all(&out, "").into_owned();
        }
        out = UNCLOSED_EXECUTABLE.replace_all(&out, "").into_owned();
        for re in STRAY_SINGLES.iter() {
            out = re.replace_all(&out, "").into_owned();
        }
        out = COMMENTS.replace_all(&out, "").into_owned();
        out = STRIPPED_ATTRS.replace_all(&out, "").into_owned();
        if out.len() == before {
            break;
        }
    }
    out
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
