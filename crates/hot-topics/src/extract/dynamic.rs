//! Browser-rendered hot lists.
//!
//! Each call launches its own session, waits for client-side rendering,
//! reads the matching elements and closes the session again. Close runs
//! exactly once whenever launch succeeded, whatever happens in between.

use super::{select_topics, ExtractContext, TopicSource};
use crate::config::{Access, PlatformSource};
use crate::error::{CrawlError, Result};
use crate::renderer::{RenderSession, Renderer};
use crate::user_agent::UserAgentPool;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Interval between readiness checks while the page settles.
pub const SETTLE_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Extractor for platforms that only render their hot list client-side.
pub struct DynamicExtractor {
    source: PlatformSource,
    renderer: Arc<dyn Renderer>,
    user_agents: Arc<UserAgentPool>,
    max_topics: usize,
    settle: Duration,
    navigation_timeout: Duration,
}

impl DynamicExtractor {
    pub fn new(source: PlatformSource, ctx: &ExtractContext) -> Self {
        Self {
            source,
            renderer: Arc::clone(&ctx.renderer),
            user_agents: Arc::clone(&ctx.user_agents),
            max_topics: ctx.max_topics,
            settle: ctx.settle,
            navigation_timeout: ctx.navigation_timeout,
        }
    }

    fn selectors(&self) -> Result<&[String]> {
        match &self.source.access {
            Access::DynamicDom { selectors } => Ok(selectors.as_slice()),
            _ => Err(CrawlError::Config(format!(
                "{} is not a dynamic-dom source",
                self.source.label
            ))),
        }
    }

    /// Everything between launch and close.
    async fn collect(&self, session: &mut dyn RenderSession) -> Result<Vec<String>> {
        let selectors = self.selectors()?;

        info!(platform = %self.source.label, url = %self.source.url, "navigating");
        session
            .navigate(&self.source.url, self.navigation_timeout)
            .await?;

        wait_until_rendered(session, selectors, self.settle).await?;

        for selector in selectors {
            let texts = session.query_text(selector).await?;
            let topics = select_topics(texts, &self.source.exclude, Some(self.max_topics));
            if !topics.is_empty() {
                info!(
                    platform = %self.source.label,
                    selector = %selector,
                    count = topics.len(),
                    "parsed hot topics"
                );
                return Ok(topics);
            }
            debug!(platform = %self.source.label, selector = %selector, "selector matched nothing");
        }

        Err(CrawlError::Parse(format!(
            "no element matched any of: {}",
            selectors.join(", ")
        )))
    }
}

#[async_trait]
impl TopicSource for DynamicExtractor {
    fn label(&self) -> &str {
        &self.source.label
    }

    async fn fetch_topics(&self) -> Result<Vec<String>> {
        let mut session = self.renderer.launch(self.user_agents.pick()).await?;

        let outcome = self.collect(&mut *session).await;

        if let Err(e) = session.close().await {
            warn!(platform = %self.source.label, "error closing browser session: {e}");
        }
        outcome
    }
}

/// Poll until any selector matches, giving up silently after `settle`.
async fn wait_until_rendered(
    session: &mut dyn RenderSession,
    selectors: &[String],
    settle: Duration,
) -> Result<()> {
    let deadline = Instant::now() + settle;
    loop {
        for selector in selectors {
            if !session.query_text(selector).await?.is_empty() {
                return Ok(());
            }
        }
        let now = Instant::now();
        if now >= deadline {
            debug!("settle time elapsed before any selector matched");
            return Ok(());
        }
        tokio::time::sleep(SETTLE_POLL_INTERVAL.min(deadline - now)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::renderer::NoopRenderer;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Copy, PartialEq)]
    enum Fail {
        Nothing,
        Navigate,
        Query,
    }

    /// In-memory renderer serving canned selector results.
    struct FakeRenderer {
        pages: HashMap<String, Vec<String>>,
        fail: Fail,
        launched: Arc<AtomicUsize>,
        closed: Arc<AtomicUsize>,
        agents: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl FakeRenderer {
        fn new(pages: Vec<(&str, Vec<&str>)>, fail: Fail) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|(sel, texts)| {
                        (sel.to_string(), texts.iter().map(|t| t.to_string()).collect())
                    })
                    .collect(),
                fail,
                launched: Arc::new(AtomicUsize::new(0)),
                closed: Arc::new(AtomicUsize::new(0)),
                agents: Arc::new(std::sync::Mutex::new(Vec::new())),
            }
        }
    }

    struct FakeSession {
        pages: HashMap<String, Vec<String>>,
        fail: Fail,
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Renderer for FakeRenderer {
        async fn launch(&self, user_agent: &str) -> Result<Box<dyn RenderSession>> {
            self.launched.fetch_add(1, Ordering::SeqCst);
            self.agents.lock().unwrap().push(user_agent.to_string());
            Ok(Box::new(FakeSession {
                pages: self.pages.clone(),
                fail: self.fail,
                closed: Arc::clone(&self.closed),
            }))
        }
    }

    #[async_trait]
    impl RenderSession for FakeSession {
        async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<()> {
            if self.fail == Fail::Navigate {
                return Err(CrawlError::Render(format!("navigation to {url} failed")));
            }
            Ok(())
        }

        async fn query_text(&self, selector: &str) -> Result<Vec<String>> {
            if self.fail == Fail::Query {
                return Err(CrawlError::Render("DOM query failed".to_string()));
            }
            Ok(self.pages.get(selector).cloned().unwrap_or_default())
        }

        async fn close(self: Box<Self>) -> Result<()> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn extractor(renderer: Arc<dyn Renderer>, selectors: &[&str]) -> DynamicExtractor {
        let settings = Settings {
            settle_secs: 0,
            user_agents: vec!["fake-agent".to_string()],
            ..Settings::default()
        };
        let ctx = ExtractContext::new(&settings, renderer).unwrap();
        let source = PlatformSource::new(
            "Fake",
            "https://fake.example/hot",
            Access::DynamicDom {
                selectors: selectors.iter().map(|s| s.to_string()).collect(),
            },
        );
        DynamicExtractor::new(source, &ctx)
    }

    #[tokio::test]
    async fn test_success_closes_session_once() {
        let renderer = Arc::new(FakeRenderer::new(
            vec![(".hot", vec![" one ", "two", "", "three"])],
            Fail::Nothing,
        ));
        let ext = extractor(renderer.clone(), &[".hot"]);

        assert_eq!(ext.hot_topics().await, ["one", "two", "three"]);
        assert_eq!(renderer.launched.load(Ordering::SeqCst), 1);
        assert_eq!(renderer.closed.load(Ordering::SeqCst), 1);
        assert_eq!(*renderer.agents.lock().unwrap(), ["fake-agent"]);
    }

    #[tokio::test]
    async fn test_navigation_failure_still_closes_session() {
        let renderer = Arc::new(FakeRenderer::new(vec![(".hot", vec!["one"])], Fail::Navigate));
        let ext = extractor(renderer.clone(), &[".hot"]);

        assert!(matches!(ext.fetch_topics().await, Err(CrawlError::Render(_))));
        assert_eq!(renderer.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_query_failure_is_render_error_and_closes() {
        let renderer = Arc::new(FakeRenderer::new(vec![(".hot", vec!["one"])], Fail::Query));
        let ext = extractor(renderer.clone(), &[".hot"]);

        assert!(matches!(ext.fetch_topics().await, Err(CrawlError::Render(_))));
        assert!(ext.hot_topics().await.is_empty());
        assert_eq!(renderer.closed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_no_match_is_parse_error_and_closes() {
        let renderer = Arc::new(FakeRenderer::new(vec![], Fail::Nothing));
        let ext = extractor(renderer.clone(), &[".hot"]);

        assert!(matches!(ext.fetch_topics().await, Err(CrawlError::Parse(_))));
        assert_eq!(renderer.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_falls_back_to_next_selector() {
        let renderer = Arc::new(FakeRenderer::new(
            vec![(".primary", vec!["  "]), (".fallback", vec!["x", "y"])],
            Fail::Nothing,
        ));
        let ext = extractor(renderer.clone(), &[".missing", ".primary", ".fallback"]);

        assert_eq!(ext.hot_topics().await, ["x", "y"]);
    }

    #[tokio::test]
    async fn test_caps_at_max_topics() {
        let texts: Vec<String> = (0..70).map(|i| format!("t{i}")).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let renderer = Arc::new(FakeRenderer::new(vec![(".hot", refs)], Fail::Nothing));
        let ext = extractor(renderer, &[".hot"]);

        let topics = ext.hot_topics().await;
        assert_eq!(topics.len(), 50);
        assert_eq!(topics[49], "t49");
    }

    #[tokio::test]
    async fn test_launch_failure_yields_empty() {
        let ext = extractor(Arc::new(NoopRenderer), &[".hot"]);
        assert!(ext.hot_topics().await.is_empty());
    }

    #[tokio::test]
    async fn test_settle_wait_is_bounded() {
        let renderer = Arc::new(FakeRenderer::new(vec![], Fail::Nothing));
        let mut session = renderer.launch("ua").await.unwrap();
        let selectors = vec![".never".to_string()];

        let start = Instant::now();
        wait_until_rendered(&mut *session, &selectors, Duration::from_millis(600))
            .await
            .unwrap();
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(600));
        assert!(waited < Duration::from_secs(3));

        session.close().await.unwrap();
    }
}
