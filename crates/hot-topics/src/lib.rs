// Copyright 2026 Hot Topics Contributors
// SPDX-License-Identifier: Apache-2.0

//! Hot-topics crawler library.
//!
//! Fetches the trending lists of several platforms through a per-platform
//! extraction strategy (static HTML, static JSON or a headless browser),
//! and exports them as ranked `(platform, rank, topic)` rows.

pub mod cli;
pub mod config;
pub mod crawler;
pub mod error;
pub mod export;
pub mod extract;
pub mod fetcher;
pub mod renderer;
pub mod user_agent;

pub use config::{Access, AccessKind, PlatformSource, Settings};
pub use crawler::{Crawler, PlatformTopics};
pub use error::{CrawlError, Result};
pub use export::TopicRecord;
pub use extract::TopicSource;
