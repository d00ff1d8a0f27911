use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::app::error::{EmberError, Result};
use crate::domain::{NewsItem, Source, SourceResult};
use crate::fetcher::profile::BROWSER_USER_AGENT;
use crate::fetcher::SourceFetcher;

const TRENDING_ENDPOINT: &str = "https://api.vvhan.com/api/hotlist";

pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(6);

/// Wire format of the upstream trending-list endpoint.
///
/// Decoded strictly: a response missing any required field is an
/// [`EmberError::Upstream`], not data that propagates half-formed.
#[derive(Debug, Deserialize)]
struct TrendingResponse {
    success: bool,
    name: String,
    subtitle: String,
    update_time: String,
    data: Vec<TrendingEntry>,
}

#[derive(Debug, Deserialize)]
struct TrendingEntry {
    title: String,
    url: String,
    #[serde(default)]
    index: Option<u32>,
    #[serde(default)]
    hot: Option<HotValue>,
}

/// Upstreams disagree on the heat metric type.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HotValue {
    Number(f64),
    Text(String),
}

impl HotValue {
    fn into_string(self) -> String {
        match self {
            // Integral heat counts arrive as f64; render without ".0".
            HotValue::Number(n) if n.fract() == 0.0 => format!("{}", n as i64),
            HotValue::Number(n) => n.to_string(),
            HotValue::Text(s) => s,
        }
    }
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_SOURCE_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }

    fn trending_url(upstream_name: &str) -> String {
        format!("{TRENDING_ENDPOINT}?type={upstream_name}")
    }

    fn into_source_result(response: TrendingResponse) -> SourceResult {
        let items = response
            .data
            .into_iter()
            .enumerate()
            .map(|(i, entry)| NewsItem {
                index: entry.index.unwrap_or(i as u32 + 1),
                title: entry.title,
                url: entry.url,
                hot: entry.hot.map(HotValue::into_string),
            })
            .collect();

        SourceResult {
            name: response.name,
            subtitle: response.subtitle,
            update_time: response.update_time,
            items,
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, source: &Source) -> Result<SourceResult> {
        let response = self
            .client
            .get(Self::trending_url(source.upstream_name))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmberError::Upstream(format!(
                "{}: status {}",
                source.upstream_name, status
            )));
        }

        let body = response.bytes().await?;
        let decoded: TrendingResponse = serde_json::from_slice(&body).map_err(|e| {
            EmberError::Upstream(format!(
                "{}: malformed response: {}",
                source.upstream_name, e
            ))
        })?;

        if !decoded.success {
            return Err(EmberError::Upstream(format!(
                "{}: upstream reported failure",
                source.upstream_name
            )));
        }

        tracing::debug!(
            source = source.upstream_name,
            items = decoded.data.len(),
            "Fetched trending list"
        );

        Ok(Self::into_source_result(decoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> serde_json::Result<TrendingResponse> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_trending_url_carries_source_type() {
        assert_eq!(
            HttpFetcher::trending_url("weibo"),
            "https://api.vvhan.com/api/hotlist?type=weibo"
        );
    }

    #[test]
    fn test_decode_with_numeric_hot() {
        let response = decode(
            r#"{
                "success": true,
                "name": "Zhihu",
                "subtitle": "trending",
                "update_time": "2026-08-25 10:00:00",
                "data": [{"title": "t", "url": "https://example.com", "hot": 12345.0}]
            }"#,
        )
        .unwrap();
        let result = HttpFetcher::into_source_result(response);
        assert_eq!(result.items[0].hot.as_deref(), Some("12345"));
        assert_eq!(result.items[0].index, 1);
    }

    #[test]
    fn test_decode_with_string_hot() {
        let response = decode(
            r#"{
                "success": true,
                "name": "Weibo",
                "subtitle": "trending",
                "update_time": "2026-08-25 10:00:00",
                "data": [{"title": "t", "url": "u", "hot": "432万"}]
            }"#,
        )
        .unwrap();
        let result = HttpFetcher::into_source_result(response);
        assert_eq!(result.items[0].hot.as_deref(), Some("432万"));
    }

    #[test]
    fn test_decode_missing_field_is_rejected() {
        // No update_time.
        let err = decode(r#"{"success": true, "name": "x", "subtitle": "y", "data": []}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_decode_preserves_upstream_index() {
        let response = decode(
            r#"{
                "success": true,
                "name": "Baidu",
                "subtitle": "trending",
                "update_time": "now",
                "data": [
                    {"title": "a", "url": "u1", "index": 7},
                    {"title": "b", "url": "u2"}
                ]
            }"#,
        )
        .unwrap();
        let result = HttpFetcher::into_source_result(response);
        assert_eq!(result.items[0].index, 7);
        assert_eq!(result.items[1].index, 2);
    }
}
