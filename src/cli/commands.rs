//! Thin adapters from CLI arguments to the core operations.
//!
//! These validate shape, forward to the core, and print JSON (raw HTML for
//! the webview page). All resilience lives below this layer.

use std::time::Duration;

use crate::app::error::Result;
use crate::app::AppContext;

pub async fn list_sources(ctx: &AppContext) -> Result<()> {
    let sources: Vec<_> = ctx.registry.all().collect();
    println!("{}", serde_json::to_string_pretty(&sources).expect("static table serializes"));
    Ok(())
}

pub async fn hot_news(ctx: &AppContext, ids: &[u32], timeout_secs: Option<u64>) -> Result<()> {
    // No ids means every registered source.
    let ids: Vec<u32> = if ids.is_empty() {
        ctx.registry.all().map(|s| s.id).collect()
    } else {
        ids.to_vec()
    };

    let timeout = timeout_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| ctx.config.aggregate_timeout());

    let result = ctx.aggregator.get_hot_news(&ids, timeout).await?;
    println!("{}", serde_json::to_string_pretty(&result).expect("results serialize"));
    Ok(())
}

pub async fn article(ctx: &AppContext, url: &str) -> Result<()> {
    let article = ctx.extractor.fetch_article_content(url).await?;
    println!("{}", serde_json::to_string_pretty(&article).expect("article serializes"));
    Ok(())
}

pub async fn page(ctx: &AppContext, url: &str) -> Result<()> {
    println!("{}", ctx.proxy.fetch_article_html(url).await);
    Ok(())
}

/// Long-running refresh loop. The one mode where cache entries can pile up
/// unread, so the background sweeper runs alongside it.
pub async fn watch(ctx: &AppContext, interval_secs: u64) -> Result<()> {
    let _sweeper = ctx.start_cache_sweeper();
    let ids: Vec<u32> = ctx.registry.all().map(|s| s.id).collect();

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let result = ctx
            .aggregator
            .get_hot_news(&ids, ctx.config.aggregate_timeout())
            .await?;
        let fresh = result.iter().filter(|r| !r.is_placeholder()).count();
        tracing::info!(fresh, total = result.len(), "Refreshed trending lists");
        println!("{}", serde_json::to_string(&result).expect("results serialize"));
    }
}
