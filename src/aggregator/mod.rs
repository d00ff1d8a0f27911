//! Deadline-bounded fan-out over the per-source fetchers.
//!
//! One aggregation call launches every requested fetch concurrently, races
//! their joint completion against a deadline, and fills any slot that
//! failed or missed the deadline with a synthesized placeholder. The call
//! has no failure exit beyond id validation: the result always has one
//! entry per requested id, in request order.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::task::JoinHandle;

use crate::app::error::{EmberError, Result};
use crate::cache::TtlCache;
use crate::config::AppConfig;
use crate::domain::{
    AggregationResult, NewsItem, Source, SourceRegistry, SourceResult, PLACEHOLDER_SUBTITLE,
    PLACEHOLDER_TITLE,
};
use crate::fetcher::SourceFetcher;

pub const DEFAULT_AGGREGATE_TIMEOUT: Duration = Duration::from_secs(8);

pub struct Aggregator {
    registry: SourceRegistry,
    fetcher: Arc<dyn SourceFetcher>,
    cache: Arc<TtlCache<AggregationResult>>,
    full_ttl: Duration,
    partial_ttl: Duration,
}

impl Aggregator {
    pub fn new(fetcher: Arc<dyn SourceFetcher>, cache: Arc<TtlCache<AggregationResult>>) -> Self {
        Self::with_config(fetcher, cache, &AppConfig::default())
    }

    pub fn with_config(
        fetcher: Arc<dyn SourceFetcher>,
        cache: Arc<TtlCache<AggregationResult>>,
        config: &AppConfig,
    ) -> Self {
        Self {
            registry: SourceRegistry::new(),
            fetcher,
            cache,
            full_ttl: config.full_ttl(),
            partial_ttl: config.partial_ttl(),
        }
    }

    /// Fetch trending lists for `ids`, returning within roughly `timeout`.
    ///
    /// The only error exit is an id outside the registry. Upstream
    /// failures, panics, and deadline misses all degrade to placeholder
    /// entries in the assembled result.
    pub async fn get_hot_news(
        &self,
        ids: &[u32],
        timeout: Duration,
    ) -> Result<AggregationResult> {
        // Validate every id up front; fallbacks are for fetch failures,
        // not for ids that never existed.
        let sources = ids
            .iter()
            .map(|&id| {
                self.registry.get(id).ok_or(EmberError::UnknownSource(id))
            })
            .collect::<Result<Vec<&'static Source>>>()?;

        let key = cache_key(ids);
        if let Some(hit) = self.cache.get(&key).await {
            tracing::debug!(key = %key, "Aggregation cache hit");
            return Ok(hit);
        }

        let (results, complete) = self.fetch_all(&sources, timeout).await;

        // Deadline-truncated assemblies are lower-confidence; cache them
        // for a shorter window.
        let ttl = if complete { self.full_ttl } else { self.partial_ttl };
        self.cache.set(&key, results.clone(), ttl).await;
        tracing::info!(
            key = %key,
            complete,
            sources = results.len(),
            "Assembled aggregation"
        );

        Ok(results)
    }

    /// Fan out one task per source and race the joint completion against
    /// the deadline. Returns the assembled list plus whether every fetch
    /// settled in time.
    async fn fetch_all(
        &self,
        sources: &[&'static Source],
        deadline: Duration,
    ) -> (AggregationResult, bool) {
        let mut handles: Vec<JoinHandle<Result<SourceResult>>> = sources
            .iter()
            .map(|&source| {
                let fetcher = self.fetcher.clone();
                tokio::spawn(async move { fetcher.fetch(source).await })
            })
            .collect();

        let all_settled = futures::future::join_all(handles.iter_mut());
        match tokio::time::timeout(deadline, all_settled).await {
            Ok(joined) => {
                let results = joined
                    .into_iter()
                    .zip(sources)
                    .map(|(join_result, &source)| match join_result {
                        Ok(Ok(result)) => result,
                        Ok(Err(e)) => {
                            tracing::warn!(source = source.upstream_name, error = %e, "Source fetch failed");
                            fallback_source_result(source)
                        }
                        Err(e) => {
                            tracing::error!(source = source.upstream_name, error = %e, "Source task panicked");
                            fallback_source_result(source)
                        }
                    })
                    .collect();
                (results, true)
            }
            Err(_) => {
                let mut results = Vec::with_capacity(sources.len());
                for (handle, &source) in handles.iter_mut().zip(sources) {
                    if handle.is_finished() {
                        match handle.now_or_never() {
                            Some(Ok(Ok(result))) => results.push(result),
                            _ => results.push(fallback_source_result(source)),
                        }
                    } else {
                        // Cancel the losing fetch instead of letting it run
                        // on with no consumer.
                        handle.abort();
                        tracing::warn!(
                            source = source.upstream_name,
                            "Source missed aggregation deadline"
                        );
                        results.push(fallback_source_result(source));
                    }
                }
                (results, false)
            }
        }
    }
}

/// Stable cache key for an ordered id sequence. Order matters and repeats
/// are kept, since the assembled result mirrors both.
fn cache_key(ids: &[u32]) -> String {
    let joined = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join("-");
    format!("hot:{joined}")
}

/// Placeholder snapshot substituted for a failed or unfinished source.
///
/// Shape-identical to a genuine snapshot so consumers can render it; the
/// sentinel item titles mark it as provisional.
pub fn fallback_source_result(source: &Source) -> SourceResult {
    SourceResult {
        name: source.display_name.to_string(),
        subtitle: PLACEHOLDER_SUBTITLE.to_string(),
        update_time: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        items: vec![
            NewsItem {
                index: 1,
                title: PLACEHOLDER_TITLE.to_string(),
                url: String::new(),
                hot: None,
            },
            NewsItem {
                index: 2,
                title: format!("{} rankings will appear on the next refresh", source.display_name),
                url: String::new(),
                hot: None,
            },
        ],
    }
}
