//! Configuration loading and resolution.
//!
//! Every field has a default, so the crawler runs with no config file at
//! all. A JSON file can override any subset of fields.

use crate::error::{CrawlError, Result};
use crate::extract::MAX_TOPICS;
use crate::user_agent::{UserAgentPool, DEFAULT_USER_AGENTS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Env var naming a config file.
pub const CONFIG_ENV: &str = "HOT_TOPICS_CONFIG";

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "hot_topics.json";

/// How a platform's hot list is acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    StaticHtml,
    StaticJson,
    DynamicDom,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccessKind::StaticHtml => "static-html",
            AccessKind::StaticJson => "static-json",
            AccessKind::DynamicDom => "dynamic-dom",
        };
        f.write_str(s)
    }
}

/// Access mechanism plus the selector or path it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Access {
    /// Plain GET, CSS selector over the returned HTML.
    StaticHtml { selector: String },
    /// Plain GET, `field` read from every element of the array at `array`
    /// (dot-separated path into the payload).
    StaticJson { array: String, field: String },
    /// Headless browser; selectors are tried in order until one matches.
    DynamicDom { selectors: Vec<String> },
}

impl Access {
    pub fn kind(&self) -> AccessKind {
        match self {
            Access::StaticHtml { .. } => AccessKind::StaticHtml,
            Access::StaticJson { .. } => AccessKind::StaticJson,
            Access::DynamicDom { .. } => AccessKind::DynamicDom,
        }
    }

    /// Human-readable selector or path, for logs and `doctor`.
    pub fn target(&self) -> String {
        match self {
            Access::StaticHtml { selector } => selector.clone(),
            Access::StaticJson { array, field } => format!("{array}[].{field}"),
            Access::DynamicDom { selectors } => selectors.join(" | "),
        }
    }
}

/// One platform to crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSource {
    pub label: String,
    pub url: String,
    pub access: Access,
    /// Topics containing any of these substrings are dropped.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl PlatformSource {
    pub fn new(label: &str, url: &str, access: Access) -> Self {
        Self {
            label: label.to_string(),
            url: url.to_string(),
            access,
            exclude: Vec::new(),
        }
    }

    pub fn excluding(mut self, words: &[&str]) -> Self {
        self.exclude = words.iter().map(|w| w.to_string()).collect();
        self
    }
}

/// The built-in platform table.
pub fn default_sources() -> Vec<PlatformSource> {
    vec![
        PlatformSource::new(
            "Weibo",
            "https://s.weibo.com/top/summary",
            Access::StaticHtml {
                selector: ".td-02".to_string(),
            },
        )
        .excluding(&["广告"]),
        PlatformSource::new(
            "Zhihu",
            "https://www.zhihu.com/hot",
            Access::DynamicDom {
                selectors: vec![".HotItem-title".to_string()],
            },
        ),
        PlatformSource::new(
            "Toutiao",
            "https://www.toutiao.com/hot-event/hot-board/",
            Access::StaticJson {
                array: "data".to_string(),
                field: "Title".to_string(),
            },
        ),
        PlatformSource::new(
            "Douyin",
            "https://www.douyin.com/hot",
            Access::DynamicDom {
                selectors: vec![
                    ".hot-search-item".to_string(),
                    ".hot-search-title".to_string(),
                    ".hot-item".to_string(),
                    ".trending-item".to_string(),
                ],
            },
        ),
        PlatformSource::new(
            "Kuaishou",
            "https://www.kuaishou.com/hot",
            Access::DynamicDom {
                selectors: vec![
                    ".hot-topic-item".to_string(),
                    ".hot-search-item".to_string(),
                    ".hot-item".to_string(),
                ],
            },
        ),
    ]
}

fn default_user_agents() -> Vec<String> {
    DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_settle_secs() -> u64 {
    5
}

fn default_navigation_timeout_secs() -> u64 {
    30
}

fn default_max_topics() -> usize {
    MAX_TOPICS
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Whole-request timeout for static fetches.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Upper bound on the wait for client-side rendering.
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,
    /// Cap applied by the HTML and DOM extractors.
    #[serde(default = "default_max_topics")]
    pub max_topics: usize,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Crawl all platforms at once instead of one after another.
    #[serde(default)]
    pub concurrent: bool,
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,
    #[serde(default = "default_sources")]
    pub sources: Vec<PlatformSource>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            settle_secs: default_settle_secs(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            max_topics: default_max_topics(),
            output_dir: default_output_dir(),
            concurrent: false,
            user_agents: default_user_agents(),
            sources: default_sources(),
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document and validate them.
    pub fn from_json(text: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(text)
            .map_err(|e| CrawlError::Config(format!("invalid config: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CrawlError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    /// Load from the explicit path, `HOT_TOPICS_CONFIG`, or
    /// `./hot_topics.json`, falling back to built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match resolve_config_path(explicit) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Reject configurations that would break the export invariants.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(CrawlError::Config("timeout_secs must be at least 1".into()));
        }
        if self.max_topics == 0 {
            return Err(CrawlError::Config("max_topics must be at least 1".into()));
        }
        UserAgentPool::new(self.user_agents.clone())?;

        let mut seen = HashSet::new();
        for source in &self.sources {
            let label = source.label.trim();
            if label.is_empty() {
                return Err(CrawlError::Config("platform label must not be empty".into()));
            }
            if !seen.insert(label) {
                return Err(CrawlError::Config(format!(
                    "duplicate platform label: {label}"
                )));
            }
            url::Url::parse(&source.url).map_err(|e| {
                CrawlError::Config(format!("{label}: invalid url {}: {e}", source.url))
            })?;
            if let Access::DynamicDom { selectors } = &source.access {
                if selectors.is_empty() {
                    return Err(CrawlError::Config(format!(
                        "{label}: dynamic source needs at least one selector"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if !env_path.trim().is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    let cwd_config = PathBuf::from(DEFAULT_CONFIG_FILE);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    None
}
