//! Per-platform extraction strategies.
//!
//! Every platform is served by one `TopicSource`. The strategy is chosen
//! from the platform's `Access` kind by `build_source`; nothing else in the
//! crate knows which mechanism a platform uses.

pub mod dynamic;
pub mod html;
pub mod json;

use crate::config::{Access, PlatformSource, Settings};
use crate::error::Result;
use crate::fetcher::Fetcher;
use crate::renderer::Renderer;
use crate::user_agent::UserAgentPool;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::error;

pub use dynamic::DynamicExtractor;
pub use html::HtmlExtractor;
pub use json::JsonExtractor;

/// Upper bound on topics kept per platform by the HTML and DOM variants.
pub const MAX_TOPICS: usize = 50;

/// A platform's hot list.
#[async_trait]
pub trait TopicSource: Send + Sync {
    /// Platform label, unique within a run.
    fn label(&self) -> &str;

    /// Fetch and parse the hot list, reporting what went wrong.
    async fn fetch_topics(&self) -> Result<Vec<String>>;

    /// Fetch the hot list, reducing any failure to an empty list.
    async fn hot_topics(&self) -> Vec<String> {
        match self.fetch_topics().await {
            Ok(topics) => topics,
            Err(e) => {
                error!(platform = self.label(), "error fetching hot topics: {e}");
                Vec::new()
            }
        }
    }
}

/// Shared handles every extractor needs.
#[derive(Clone)]
pub struct ExtractContext {
    pub fetcher: Arc<Fetcher>,
    pub renderer: Arc<dyn Renderer>,
    pub user_agents: Arc<UserAgentPool>,
    pub max_topics: usize,
    pub settle: std::time::Duration,
    pub navigation_timeout: std::time::Duration,
}

impl ExtractContext {
    pub fn new(settings: &Settings, renderer: Arc<dyn Renderer>) -> Result<Self> {
        Ok(Self {
            fetcher: Arc::new(Fetcher::new(settings.timeout())?),
            renderer,
            user_agents: Arc::new(UserAgentPool::new(settings.user_agents.clone())?),
            max_topics: settings.max_topics,
            settle: settings.settle(),
            navigation_timeout: settings.navigation_timeout(),
        })
    }
}

/// Pick the extractor for a platform.
pub fn build_source(source: &PlatformSource, ctx: &ExtractContext) -> Box<dyn TopicSource> {
    match &source.access {
        Access::StaticHtml { .. } => Box::new(HtmlExtractor::new(source.clone(), ctx)),
        Access::StaticJson { .. } => Box::new(JsonExtractor::new(source.clone(), ctx)),
        Access::DynamicDom { .. } => Box::new(DynamicExtractor::new(source.clone(), ctx)),
    }
}

/// Collapse whitespace runs into single spaces and trim.
pub(crate) fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Clean every candidate, drop blanks and excluded entries, keep at most
/// `limit` in order.
pub(crate) fn select_topics<I, S>(
    candidates: I,
    exclude: &[String],
    limit: Option<usize>,
) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let kept = candidates
        .into_iter()
        .map(|c| clean_text(c.as_ref()))
        .filter(|t| !t.is_empty())
        .filter(|t| !exclude.iter().any(|word| t.contains(word.as_str())));

    match limit {
        Some(n) => kept.take(n).collect(),
        None => kept.collect(),
    }
}
