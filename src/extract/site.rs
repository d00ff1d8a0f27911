//! Hostname-driven site heuristics.
//!
//! Site detection, selector profiles, and platform naming are plain lookup
//! tables so new platforms can be added without touching control flow.

/// Coarse site classification derived from the hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    /// Q&A platform (zhihu.com).
    Zhihu,
    /// Video platform (bilibili.com).
    Bilibili,
    /// Microblogging platform (weibo.com / weibo.cn).
    Weibo,
    /// Anything unrecognized.
    Generic,
}

impl SiteKind {
    pub fn detect(host: &str) -> Self {
        let host = host.to_ascii_lowercase();
        if host.contains("zhihu.com") {
            SiteKind::Zhihu
        } else if host.contains("bilibili.com") || host.contains("b23.tv") {
            SiteKind::Bilibili
        } else if host.contains("weibo.com") || host.contains("weibo.cn") {
            SiteKind::Weibo
        } else {
            SiteKind::Generic
        }
    }
}

/// Per-site extraction selectors: where the meaningful content lives, what
/// noise to cut out of it, and optional site-specific title/summary spots.
pub struct SelectorProfile {
    pub content: &'static [&'static str],
    pub remove: &'static [&'static str],
    pub title: Option<&'static str>,
    pub summary: Option<&'static str>,
}

const ZHIHU_PROFILE: SelectorProfile = SelectorProfile {
    content: &[".RichContent-inner", ".QuestionAnswer-content", ".Post-RichTextContainer"],
    remove: &[
        ".ContentItem-actions",
        ".Reward",
        ".ShareMenu",
        ".AuthorInfo",
        ".Voters",
        ".FollowButton",
    ],
    title: Some(".QuestionHeader-title"),
    summary: Some(".QuestionRichText"),
};

const BILIBILI_PROFILE: SelectorProfile = SelectorProfile {
    content: &[".article-content", ".video-desc", ".opus-module-content"],
    remove: &[".up-info", ".share-box", ".video-toolbar", ".ad-report"],
    title: Some(".video-title"),
    summary: Some(".desc-info"),
};

const WEIBO_PROFILE: SelectorProfile = SelectorProfile {
    content: &[".weibo-text", ".WB_text", ".detail_wbtext_4CRf9"],
    remove: &[".expand", ".url-icon"],
    title: None,
    summary: None,
};

const GENERIC_PROFILE: SelectorProfile = SelectorProfile {
    content: &[
        "article",
        "[role=\"main\"]",
        "main",
        ".post-content",
        ".article-content",
        ".entry-content",
        ".content",
        "#content",
    ],
    remove: &[
        "nav",
        "header",
        "footer",
        "aside",
        ".sidebar",
        ".advertisement",
        ".ad",
        ".ads",
        ".social-share",
        ".comments",
        ".related-posts",
        "script",
        "style",
        "noscript",
    ],
    title: None,
    summary: None,
};

pub fn selector_profile(kind: SiteKind) -> &'static SelectorProfile {
    match kind {
        SiteKind::Zhihu => &ZHIHU_PROFILE,
        SiteKind::Bilibili => &BILIBILI_PROFILE,
        SiteKind::Weibo => &WEIBO_PROFILE,
        SiteKind::Generic => &GENERIC_PROFILE,
    }
}

/// Platform naming for degraded-content synthesis.
pub struct PlatformInfo {
    pattern: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

const PLATFORMS: &[PlatformInfo] = &[
    PlatformInfo {
        pattern: "zhihu",
        name: "Zhihu",
        description: "a Q&A community where questions collect long-form answers",
    },
    PlatformInfo {
        pattern: "bilibili",
        name: "Bilibili",
        description: "a video platform centered on creator uploads and live comments",
    },
    PlatformInfo {
        pattern: "weibo",
        name: "Weibo",
        description: "a microblogging platform for short trending posts",
    },
    PlatformInfo {
        pattern: "baidu",
        name: "Baidu",
        description: "a search engine whose trending board tracks query spikes",
    },
    PlatformInfo {
        pattern: "douyin",
        name: "Douyin",
        description: "a short-video platform with fast-moving trending topics",
    },
    PlatformInfo {
        pattern: "douban",
        name: "Douban",
        description: "a community for books, films and group discussions",
    },
];

const GENERIC_PLATFORM: PlatformInfo = PlatformInfo {
    pattern: "",
    name: "the original site",
    description: "an external site this service can only link to",
};

/// Resolve a hostname to a known platform, or the generic entry.
pub fn platform_for(host: &str) -> &'static PlatformInfo {
    let host = host.to_ascii_lowercase();
    PLATFORMS
        .iter()
        .find(|p| host.contains(p.pattern))
        .unwrap_or(&GENERIC_PLATFORM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_known_hosts() {
        assert_eq!(SiteKind::detect("www.zhihu.com"), SiteKind::Zhihu);
        assert_eq!(SiteKind::detect("zhuanlan.zhihu.com"), SiteKind::Zhihu);
        assert_eq!(SiteKind::detect("www.bilibili.com"), SiteKind::Bilibili);
        assert_eq!(SiteKind::detect("m.weibo.cn"), SiteKind::Weibo);
    }

    #[test]
    fn test_detect_unknown_host_is_generic() {
        assert_eq!(SiteKind::detect("news.example.com"), SiteKind::Generic);
        assert_eq!(SiteKind::detect(""), SiteKind::Generic);
    }

    #[test]
    fn test_every_profile_has_content_selectors() {
        for kind in [
            SiteKind::Zhihu,
            SiteKind::Bilibili,
            SiteKind::Weibo,
            SiteKind::Generic,
        ] {
            assert!(!selector_profile(kind).content.is_empty());
        }
    }

    #[test]
    fn test_platform_lookup() {
        assert_eq!(platform_for("www.zhihu.com").name, "Zhihu");
        assert_eq!(platform_for("m.douyin.com").name, "Douyin");
        assert_eq!(platform_for("example.org").name, "the original site");
    }
}
