//! Chromium-based renderer using chromiumoxide.

use super::{RenderSession, Renderer};
use crate::error::{CrawlError, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Env var pointing at a Chrome/Chromium binary.
pub const CHROME_PATH_ENV: &str = "HOT_TOPICS_CHROME_PATH";

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. HOT_TOPICS_CHROME_PATH env
    if let Ok(p) = std::env::var(CHROME_PATH_ENV) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.hot-topics/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = [
            home.join(".hot-topics/chromium/chrome-linux64/chrome"),
            home.join(".hot-topics/chromium/chrome"),
        ];
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser", "chrome"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common install locations
    let mut common = Vec::new();
    if cfg!(target_os = "macos") {
        common.push(PathBuf::from(
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        ));
    }
    if cfg!(target_os = "windows") {
        common.push(PathBuf::from(
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
        ));
        common.push(PathBuf::from(
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ));
        if let Ok(local) = std::env::var("LOCALAPPDATA") {
            common.push(PathBuf::from(local).join(r"Google\Chrome\Application\chrome.exe"));
        }
    }
    common.into_iter().find(|p| p.exists())
}

/// Launches one headless Chromium process per session.
pub struct ChromiumRenderer {
    chrome_path: Option<PathBuf>,
}

impl ChromiumRenderer {
    /// Create a renderer using the discovered Chromium binary.
    ///
    /// When none is found, chromiumoxide's own detection runs at launch.
    pub fn new() -> Self {
        Self {
            chrome_path: find_chromium(),
        }
    }

    fn config(&self, user_agent: &str, profile: &Path) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg(format!("--user-agent={user_agent}"))
            .window_size(1920, 1080);

        if let Some(path) = &self.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder
            .build()
            .map_err(|e| CrawlError::Render(format!("failed to build browser config: {e}")))
    }
}

/// Fresh profile directory for one browser process.
///
/// Chromium holds a singleton lock on its profile, so sessions running at
/// the same time must never share one.
fn profile_dir() -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix("hot-topics-chrome-")
        .tempdir()
        .map_err(|e| CrawlError::Render(format!("failed to create browser profile dir: {e}")))
}

impl Default for ChromiumRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn launch(&self, user_agent: &str) -> Result<Box<dyn RenderSession>> {
        let profile = profile_dir()?;
        let config = self.config(user_agent, profile.path())?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| CrawlError::Render(format!("failed to launch Chromium: {e}")))?;

        // Drive the CDP connection until the browser goes away.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let session = ChromiumSession {
                    browser,
                    page: None,
                    handler_task,
                    profile,
                };
                let _ = Box::new(session).close().await;
                return Err(CrawlError::Render(format!("failed to create new page: {e}")));
            }
        };

        debug!(profile = %profile.path().display(), "Chromium session launched");
        Ok(Box::new(ChromiumSession {
            browser,
            page: Some(page),
            handler_task,
            profile,
        }))
    }
}

/// A Chromium process with a single page and its own profile directory.
pub struct ChromiumSession {
    browser: Browser,
    page: Option<Page>,
    handler_task: JoinHandle<()>,
    profile: TempDir,
}

impl ChromiumSession {
    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| CrawlError::Render("session has no page".to_string()))
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        let page = self.page()?;

        match tokio::time::timeout(timeout, page.goto(url)).await {
            Ok(Ok(_)) => {
                let _ = page.wait_for_navigation().await;
                Ok(())
            }
            Ok(Err(e)) => Err(CrawlError::Render(format!("navigation failed: {e}"))),
            Err(_) => Err(CrawlError::Render(format!(
                "navigation timed out after {}ms",
                timeout.as_millis()
            ))),
        }
    }

    async fn query_text(&self, selector: &str) -> Result<Vec<String>> {
        let page = self.page()?;

        // No hits come back as an empty node list; an error is a CDP failure.
        let elements = page
            .find_elements(selector)
            .await
            .map_err(|e| CrawlError::Render(format!("selector query {selector:?} failed: {e}")))?;

        let mut texts = Vec::with_capacity(elements.len());
        for element in elements {
            let text = element
                .inner_text()
                .await
                .map_err(|e| CrawlError::Render(format!("failed to read element text: {e}")))?;
            texts.push(text.unwrap_or_default());
        }
        Ok(texts)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let ChromiumSession {
            mut browser,
            page,
            handler_task,
            profile,
        } = *self;

        if let Some(page) = page {
            let _ = page.close().await;
        }
        let closed = browser.close().await;
        let _ = browser.wait().await;
        handler_task.abort();

        // The process has exited, so the profile is no longer locked.
        if let Err(e) = profile.close() {
            warn!(error = %e, "failed to remove browser profile dir");
        }

        closed
            .map(|_| ())
            .map_err(|e| CrawlError::Render(format!("failed to close Chromium: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_session_gets_its_own_profile_dir() {
        let a = profile_dir().unwrap();
        let b = profile_dir().unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a.path().is_dir() && b.path().is_dir());

        let path = a.path().to_path_buf();
        a.close().unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_chromium_navigate_and_query() {
        let renderer = ChromiumRenderer::new();
        let mut session = renderer
            .launch("hot-topics-test")
            .await
            .expect("failed to launch session");

        session
            .navigate(
                "data:text/html,<ul><li class='t'>one</li><li class='t'>two</li></ul>",
                Duration::from_secs(10),
            )
            .await
            .expect("navigation failed");

        let texts = session.query_text(".t").await.expect("query failed");
        assert_eq!(texts, ["one", "two"]);

        let none = session.query_text(".missing").await.expect("query failed");
        assert!(none.is_empty());

        session.close().await.expect("close failed");
    }
}
