use serde::Serialize;

/// One upstream platform a trending list can be fetched from.
#[derive(Debug, Clone, Serialize)]
pub struct Source {
    pub id: u32,
    /// Identifier used in the upstream trending-list API.
    pub upstream_name: &'static str,
    /// Human-facing platform name, used on synthesized placeholders.
    pub display_name: &'static str,
    pub description: &'static str,
}

/// Static table of supported platforms.
///
/// Ids are stable public API: callers address sources by number, so new
/// platforms must be appended, never renumbered.
const SOURCES: &[Source] = &[
    Source {
        id: 1,
        upstream_name: "zhihu",
        display_name: "Zhihu",
        description: "Zhihu trending questions",
    },
    Source {
        id: 2,
        upstream_name: "weibo",
        display_name: "Weibo",
        description: "Weibo trending searches",
    },
    Source {
        id: 3,
        upstream_name: "bili",
        display_name: "Bilibili",
        description: "Bilibili trending videos",
    },
    Source {
        id: 4,
        upstream_name: "baidu",
        display_name: "Baidu",
        description: "Baidu trending searches",
    },
    Source {
        id: 5,
        upstream_name: "douyin",
        display_name: "Douyin",
        description: "Douyin trending topics",
    },
    Source {
        id: 6,
        upstream_name: "hupu",
        display_name: "Hupu",
        description: "Hupu community front page",
    },
    Source {
        id: 7,
        upstream_name: "douban",
        display_name: "Douban",
        description: "Douban trending discussions",
    },
    Source {
        id: 8,
        upstream_name: "36k",
        display_name: "36Kr",
        description: "36Kr tech news ranking",
    },
    Source {
        id: 9,
        upstream_name: "juejin",
        display_name: "Juejin",
        description: "Juejin developer articles",
    },
];

/// Read-only lookup over the source table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceRegistry;

impl SourceRegistry {
    pub fn new() -> Self {
        Self
    }

    pub fn get(&self, id: u32) -> Option<&'static Source> {
        SOURCES.iter().find(|s| s.id == id)
    }

    /// Largest valid source id, for range validation at the boundary.
    pub fn max_id(&self) -> u32 {
        SOURCES.iter().map(|s| s.id).max().unwrap_or(0)
    }

    pub fn all(&self) -> impl Iterator<Item = &'static Source> {
        SOURCES.iter()
    }
}
