//! # Emberfeed
//!
//! Trending-news aggregation and article extraction.
//!
//! ## Architecture
//!
//! ```text
//! Registry → Fetcher ×N → Aggregator (deadline race) → TTL cache
//!                          Extractor → Sanitizer ─┐
//!                          Proxy rewriter ────────┴→ renderable output
//! ```
//!
//! One aggregation call fans out over every requested source, races the
//! joint completion against a deadline, and substitutes placeholder
//! snapshots for anything unfinished; results are memoized in a TTL cache.
//! Article pages are fetched once and converted either into a sanitized
//! rich-text fragment or into a full rewritten document for an embedded
//! webview. Every high-level operation terminates in a well-formed,
//! possibly degraded, result; only request validation can fail outright.

/// Application context and error handling.
///
/// [`AppContext`](app::AppContext) wires together registry, cache,
/// fetcher, aggregator, extractor, and proxy.
pub mod app;

/// Deadline-bounded fan-out over the per-source fetchers.
pub mod aggregator;

/// TTL cache with lazy eviction and a background sweeper.
pub mod cache;

/// Command-line interface using clap.
pub mod cli;

/// Runtime configuration, optionally loaded from TOML.
pub mod config;

/// Core domain models.
///
/// - [`Source`](domain::Source) / [`SourceRegistry`](domain::SourceRegistry)
/// - [`NewsItem`](domain::NewsItem) / [`SourceResult`](domain::SourceResult)
/// - [`ArticleContent`](domain::ArticleContent)
pub mod domain;

/// Site-aware article extraction with degraded-content synthesis.
pub mod extract;

/// Per-source trending-list fetching.
///
/// - [`SourceFetcher`](fetcher::SourceFetcher): async trait seam
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based
///   implementation with strict response decoding
pub mod fetcher;

/// Webview proxy rewriting: script removal, URL absolutization, mobile
/// styling, synthesized error pages.
pub mod proxy;

/// Rich-text HTML cleaning for a constrained renderer.
pub mod sanitize;
