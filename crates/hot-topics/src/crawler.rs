//! Runs every configured source and gathers their hot lists.

use crate::config::Settings;
use crate::error::Result;
use crate::extract::{build_source, ExtractContext, TopicSource};
use crate::renderer::Renderer;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// One platform's hot list, ranked by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformTopics {
    pub platform: String,
    pub topics: Vec<String>,
}

impl PlatformTopics {
    pub fn new(platform: impl Into<String>, topics: Vec<String>) -> Self {
        Self {
            platform: platform.into(),
            topics,
        }
    }
}

/// Ordered set of sources. Declaration order is export order.
pub struct Crawler {
    sources: Vec<Box<dyn TopicSource>>,
}

impl Crawler {
    pub fn new(sources: Vec<Box<dyn TopicSource>>) -> Self {
        Self { sources }
    }

    /// Build one extractor per configured platform.
    pub fn from_settings(settings: &Settings, renderer: Arc<dyn Renderer>) -> Result<Self> {
        let ctx = ExtractContext::new(settings, renderer)?;
        let sources = settings
            .sources
            .iter()
            .map(|source| build_source(source, &ctx))
            .collect();
        Ok(Self::new(sources))
    }

    pub fn labels(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.label()).collect()
    }

    /// Crawl the sources one after another.
    pub async fn run(&self) -> Vec<PlatformTopics> {
        let mut results = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            results.push(crawl_one(source.as_ref()).await);
        }
        results
    }

    /// Crawl all sources at once; results keep declaration order.
    pub async fn run_concurrent(&self) -> Vec<PlatformTopics> {
        join_all(self.sources.iter().map(|s| crawl_one(s.as_ref()))).await
    }
}

async fn crawl_one(source: &dyn TopicSource) -> PlatformTopics {
    info!("fetching hot topics from {}...", source.label());
    let topics = source.hot_topics().await;
    info!(platform = source.label(), count = topics.len(), "hot topics collected");
    PlatformTopics::new(source.label(), topics)
}
