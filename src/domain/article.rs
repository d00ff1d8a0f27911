use serde::{Deserialize, Serialize};

/// Extracted (or synthesized) article content.
///
/// `content` is a sanitized HTML fragment suitable for a restricted
/// rich-text renderer. A degraded-content fallback produces the same shape,
/// so this is always a valid terminal output, never an error carrier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleContent {
    pub title: String,
    pub content: String,
    pub summary: String,
}
