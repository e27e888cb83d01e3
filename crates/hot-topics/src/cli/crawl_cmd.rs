//! One full crawl-and-export cycle.

use crate::config::Settings;
use crate::crawler::Crawler;
use crate::export;
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::{NoopRenderer, Renderer};
use anyhow::{Context, Result};
use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Crawl every configured platform and write the spreadsheet.
///
/// Per-platform failures only shrink the output; a failed export is the
/// one error returned to the caller.
pub async fn run(settings: &Settings, use_browser: bool) -> Result<PathBuf> {
    let started = Local::now();

    let renderer: Arc<dyn Renderer> = if use_browser {
        Arc::new(ChromiumRenderer::new())
    } else {
        warn!("browser disabled; dynamic sources will return no topics");
        Arc::new(NoopRenderer)
    };

    let crawler = Crawler::from_settings(settings, renderer).context("failed to set up crawler")?;
    info!(
        platforms = crawler.labels().len(),
        concurrent = settings.concurrent,
        "starting crawl"
    );

    let results = if settings.concurrent {
        crawler.run_concurrent().await
    } else {
        crawler.run().await
    };

    let path = export::export(&results, &settings.output_dir, &started)
        .context("failed to export hot topics")?;
    Ok(path)
}
