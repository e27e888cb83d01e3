//! Error types for the crawler library.

use std::path::PathBuf;

/// Errors raised while crawling or exporting.
///
/// `Network`, `Render` and `Parse` stay inside a single platform: the
/// extractor boundary logs them and reports an empty topic list. `Export`
/// and `Config` abort the run.
#[derive(thiserror::Error, Debug)]
pub enum CrawlError {
    #[error("network error fetching {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("render error: {0}")]
    Render(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("failed to write {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("config error: {0}")]
    Config(String),
}

impl CrawlError {
    pub(crate) fn network(url: &str, reason: impl std::fmt::Display) -> Self {
        CrawlError::Network {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn export(path: impl Into<PathBuf>, source: impl Into<csv::Error>) -> Self {
        CrawlError::Export {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, CrawlError>;
