use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::aggregator::Aggregator;
use crate::app::error::Result;
use crate::cache::{spawn_sweeper, TtlCache};
use crate::config::AppConfig;
use crate::domain::{AggregationResult, SourceRegistry};
use crate::extract::ArticleExtractor;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::SourceFetcher;
use crate::proxy::WebviewProxy;

/// Wires together registry, cache, fetcher, and the three operations.
pub struct AppContext {
    pub config: AppConfig,
    pub registry: SourceRegistry,
    pub cache: Arc<TtlCache<AggregationResult>>,
    pub aggregator: Aggregator,
    pub extractor: ArticleExtractor,
    pub proxy: WebviewProxy,
}

impl AppContext {
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = AppConfig::load(config_path)?;
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: AppConfig) -> Self {
        let fetcher: Arc<dyn SourceFetcher> =
            Arc::new(HttpFetcher::with_timeout(config.source_timeout()));
        Self::with_fetcher(config, fetcher)
    }

    /// Injection point for tests and alternative upstreams.
    pub fn with_fetcher(config: AppConfig, fetcher: Arc<dyn SourceFetcher>) -> Self {
        let cache = Arc::new(TtlCache::new());
        let aggregator = Aggregator::with_config(fetcher, cache.clone(), &config);
        let extractor = ArticleExtractor::with_config(&config);
        let proxy = WebviewProxy::with_config(&config);

        Self {
            registry: SourceRegistry::new(),
            cache,
            aggregator,
            extractor,
            proxy,
            config,
        }
    }

    /// Background eviction of expired cache entries, for long-running
    /// modes such as `watch`.
    pub fn start_cache_sweeper(&self) -> JoinHandle<()> {
        spawn_sweeper(self.cache.clone(), self.config.cache_sweep_interval())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_cache_sweeper_evicts_expired_entries() {
        let ctx = AppContext::with_config(AppConfig::default());
        ctx.cache.set("k", Vec::new(), Duration::from_secs(1)).await;
        let handle = ctx.start_cache_sweeper();
        tokio::time::advance(ctx.config.cache_sweep_interval() * 2).await;
        tokio::task::yield_now().await;
        assert!(ctx.cache.is_empty().await);
        handle.abort();
    }
}
