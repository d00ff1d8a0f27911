pub mod http_fetcher;
pub mod profile;

use async_trait::async_trait;

use crate::app::error::Result;
use crate::domain::{Source, SourceResult};

/// Seam for fetching one source's trending list.
///
/// Implementations make exactly one bounded-time attempt; resilience
/// (fallbacks, deadlines, caching) belongs to the aggregator, not here.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, source: &Source) -> Result<SourceResult>;
}
