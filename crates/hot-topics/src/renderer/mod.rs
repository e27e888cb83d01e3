//! Renderer abstraction for browser-based page rendering.
//!
//! Defines the `Renderer` and `RenderSession` traits that abstract over
//! the browser engine (currently Chromium via chromiumoxide).

pub mod chromium;

use crate::error::{CrawlError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// A browser engine that can launch isolated sessions.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Launch a new headless session presenting the given user-agent.
    async fn launch(&self, user_agent: &str) -> Result<Box<dyn RenderSession>>;
}

/// A single live browser session with one page.
#[async_trait]
pub trait RenderSession: Send + Sync {
    /// Navigate to a URL with a timeout.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;
    /// Visible text of every element matching `selector`, in DOM order.
    async fn query_text(&self, selector: &str) -> Result<Vec<String>>;
    /// Tear down the session and release the browser process.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// A no-op renderer used when the browser is disabled or unavailable.
///
/// Static sources work without a browser; every dynamic source reports a
/// render error and yields no topics.
pub struct NoopRenderer;

#[async_trait]
impl Renderer for NoopRenderer {
    async fn launch(&self, _user_agent: &str) -> Result<Box<dyn RenderSession>> {
        Err(CrawlError::Render(
            "browser not available - HTTP-only mode".to_string(),
        ))
    }
}
