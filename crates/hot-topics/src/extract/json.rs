//! Static JSON hot lists: one GET, a field read from each array element.

use super::{select_topics, ExtractContext, TopicSource};
use crate::config::{Access, PlatformSource};
use crate::error::{CrawlError, Result};
use crate::fetcher::Fetcher;
use crate::user_agent::UserAgentPool;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Read `field` from every element of the array found at `array_path`.
///
/// `array_path` is dot-separated (`"data"`, `"data.list"`); an empty path
/// means the payload itself is the array. Elements without a string
/// `field` are skipped. The result is not truncated.
pub fn parse_json_topics(
    body: &str,
    array_path: &str,
    field: &str,
    exclude: &[String],
) -> Result<Vec<String>> {
    let payload: Value =
        serde_json::from_str(body).map_err(|e| CrawlError::Parse(format!("invalid JSON: {e}")))?;

    let mut node = &payload;
    for key in array_path.split('.').filter(|k| !k.is_empty()) {
        node = node
            .get(key)
            .ok_or_else(|| CrawlError::Parse(format!("missing key {key:?} in {array_path:?}")))?;
    }

    let items = node
        .as_array()
        .ok_or_else(|| CrawlError::Parse(format!("{array_path:?} is not an array")))?;

    let titles = items.iter().filter_map(|item| {
        let title = item.get(field).and_then(Value::as_str);
        if title.is_none() {
            debug!(field, "array element without string field skipped");
        }
        title
    });

    Ok(select_topics(titles, exclude, None))
}

/// Extractor for platforms exposing a JSON hot-list endpoint.
pub struct JsonExtractor {
    source: PlatformSource,
    fetcher: Arc<Fetcher>,
    user_agents: Arc<UserAgentPool>,
}

impl JsonExtractor {
    pub fn new(source: PlatformSource, ctx: &ExtractContext) -> Self {
        Self {
            source,
            fetcher: Arc::clone(&ctx.fetcher),
            user_agents: Arc::clone(&ctx.user_agents),
        }
    }
}

#[async_trait]
impl TopicSource for JsonExtractor {
    fn label(&self) -> &str {
        &self.source.label
    }

    async fn fetch_topics(&self) -> Result<Vec<String>> {
        let Access::StaticJson { array, field } = &self.source.access else {
            return Err(CrawlError::Config(format!(
                "{} is not a static-json source",
                self.source.label
            )));
        };

        let body = self
            .fetcher
            .fetch(&self.source.url, self.user_agents.pick())
            .await?;
        let topics = parse_json_topics(&body, array, field, &self.source.exclude)?;

        info!(platform = %self.source.label, count = topics.len(), "parsed hot topics");
        Ok(topics)
    }
}
