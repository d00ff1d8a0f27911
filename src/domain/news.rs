use serde::{Deserialize, Serialize};

/// Item title used in placeholder lists substituted for unfinished sources.
pub const PLACEHOLDER_TITLE: &str = "Data is still loading, please retry shortly";

/// Subtitle attached to placeholder source results.
pub const PLACEHOLDER_SUBTITLE: &str = "temporarily unavailable";

/// One entry in a trending list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub index: u32,
    pub title: String,
    pub url: String,
    /// Heat metric as reported by the upstream; upstreams disagree on the
    /// type (string or number), so it is normalized to a string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hot: Option<String>,
}

/// A trending-list snapshot from one source, or a synthesized placeholder.
///
/// Placeholders carry [`PLACEHOLDER_TITLE`] items but are otherwise
/// shape-identical to genuine snapshots, so consumers can render either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceResult {
    pub name: String,
    pub subtitle: String,
    pub update_time: String,
    pub items: Vec<NewsItem>,
}

/// One entry per requested source id, in request order.
pub type AggregationResult = Vec<SourceResult>;

impl SourceResult {
    /// Whether this snapshot was synthesized rather than fetched.
    pub fn is_placeholder(&self) -> bool {
        self.items.iter().any(|i| i.title == PLACEHOLDER_TITLE)
    }
}
