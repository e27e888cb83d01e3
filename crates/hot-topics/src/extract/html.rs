//! Static HTML hot lists: one GET, CSS selector over the parsed document.

use super::{select_topics, ExtractContext, TopicSource};
use crate::config::{Access, PlatformSource};
use crate::error::{CrawlError, Result};
use crate::fetcher::Fetcher;
use crate::user_agent::UserAgentPool;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::info;

/// Text of every element matching `selector`, in document order.
///
/// Whitespace is collapsed, blank and excluded entries are dropped, and at
/// most `limit` topics are kept.
pub fn parse_html_topics(
    html: &str,
    selector: &str,
    exclude: &[String],
    limit: usize,
) -> Result<Vec<String>> {
    let sel = Selector::parse(selector)
        .map_err(|e| CrawlError::Parse(format!("invalid selector {selector:?}: {e}")))?;
    let document = Html::parse_document(html);

    let texts = document
        .select(&sel)
        .map(|el| el.text().collect::<String>());

    Ok(select_topics(texts, exclude, Some(limit)))
}

/// Extractor for platforms serving their hot list as plain HTML.
pub struct HtmlExtractor {
    source: PlatformSource,
    fetcher: Arc<Fetcher>,
    user_agents: Arc<UserAgentPool>,
    max_topics: usize,
}

impl HtmlExtractor {
    pub fn new(source: PlatformSource, ctx: &ExtractContext) -> Self {
        Self {
            source,
            fetcher: Arc::clone(&ctx.fetcher),
            user_agents: Arc::clone(&ctx.user_agents),
            max_topics: ctx.max_topics,
        }
    }
}

#[async_trait]
impl TopicSource for HtmlExtractor {
    fn label(&self) -> &str {
        &self.source.label
    }

    async fn fetch_topics(&self) -> Result<Vec<String>> {
        let Access::StaticHtml { selector } = &self.source.access else {
            return Err(CrawlError::Config(format!(
                "{} is not a static-html source",
                self.source.label
            )));
        };

        let body = self
            .fetcher
            .fetch(&self.source.url, self.user_agents.pick())
            .await?;
        let topics = parse_html_topics(&body, selector, &self.source.exclude, self.max_topics)?;

        info!(platform = %self.source.label, count = topics.len(), "parsed hot topics");
        Ok(topics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_in_document_order() {
        let html = r#"
            <table>
              <tr><td class="td-02"><a>first</a> <span>123</span></td></tr>
              <tr><td class="td-02">  second  </td></tr>
              <tr><td class="td-02"></td></tr>
              <tr><td class="td-01">ignored</td></tr>
              <tr><td class="td-02">third</td></tr>
            </table>"#;

        let topics = parse_html_topics(html, ".td-02", &[], 50).unwrap();
        assert_eq!(topics, ["first 123", "second", "third"]);
    }

    #[test]
    fn test_inline_markup_keeps_words_whole() {
        let html = r#"<p class="t">hel<b>lo</b> world</p><p class="t"><i>热</i>搜</p>"#;

        let topics = parse_html_topics(html, ".t", &[], 50).unwrap();
        assert_eq!(topics, ["hello world", "热搜"]);
    }

    #[test]
    fn test_parse_caps_at_limit() {
        let items: String = (0..80).map(|i| format!("<li>topic {i}</li>")).collect();
        let html = format!("<ul>{items}</ul>");

        let topics = parse_html_topics(&html, "li", &[], 50).unwrap();
        assert_eq!(topics.len(), 50);
        assert_eq!(topics[0], "topic 0");
        assert_eq!(topics[49], "topic 49");
        assert!(topics.iter().all(|t| !t.trim().is_empty()));
    }

    #[test]
    fn test_limit_counts_survivors_only() {
        let mut items = String::new();
        for i in 0..60 {
            items.push_str("<li>   </li>");
            items.push_str(&format!("<li>t{i}</li>"));
        }
        let html = format!("<ul>{items}</ul>");

        let topics = parse_html_topics(&html, "li", &[], 50).unwrap();
        assert_eq!(topics.len(), 50);
        assert_eq!(topics[49], "t49");
    }

    #[test]
    fn test_excluded_entries_dropped() {
        let html = "<p class='t'>news</p><p class='t'>广告 sponsored</p><p class='t'>more</p>";
        let exclude = vec!["广告".to_string()];

        let topics = parse_html_topics(html, ".t", &exclude, 50).unwrap();
        assert_eq!(topics, ["news", "more"]);
    }

    #[test]
    fn test_no_matches_is_empty() {
        let topics = parse_html_topics("<html><body></body></html>", ".td-02", &[], 50).unwrap();
        assert!(topics.is_empty());
    }

    #[test]
    fn test_invalid_selector_is_parse_error() {
        let err = parse_html_topics("<p>x</p>", "p[", &[], 50).unwrap_err();
        assert!(matches!(err, CrawlError::Parse(_)));
    }
}
