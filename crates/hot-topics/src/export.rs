// Copyright 2026 Hot Topics Contributors
// SPDX-License-Identifier: Apache-2.0

//! Spreadsheet export of the collected hot lists.
//!
//! Results are flattened into `(platform, rank, topic)` rows and written as
//! a CSV file named after the run's local start time. The file starts with
//! a UTF-8 byte-order mark so spreadsheet applications decode CJK topics
//! correctly.

use crate::crawler::PlatformTopics;
use crate::error::{CrawlError, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Byte-order mark written ahead of the header row.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One exported row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub platform: String,
    pub rank: u32,
    pub topic: String,
}

/// Flatten results into rows: platforms in the given order, ranks from 1.
pub fn flatten(results: &[PlatformTopics]) -> Vec<TopicRecord> {
    results
        .iter()
        .flat_map(|entry| {
            entry.topics.iter().zip(1u32..).map(|(topic, rank)| TopicRecord {
                platform: entry.platform.clone(),
                rank,
                topic: topic.clone(),
            })
        })
        .collect()
}

/// `hot_topics_<YYYYMMDD_HHMMSS>.csv`
pub fn export_filename(timestamp: &DateTime<Local>) -> String {
    format!("hot_topics_{}.csv", timestamp.format("%Y%m%d_%H%M%S"))
}

/// Write `records` with a `platform,rank,topic` header to `path`.
pub fn write_records(path: &Path, records: &[TopicRecord]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| CrawlError::export(path, e))?;
    file.write_all(UTF8_BOM)
        .map_err(|e| CrawlError::export(path, e))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer
        .write_record(["platform", "rank", "topic"])
        .map_err(|e| CrawlError::export(path, e))?;
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| CrawlError::export(path, e))?;
    }
    writer.flush().map_err(|e| CrawlError::export(path, e))?;
    Ok(())
}

/// Write all results to `dir`, returning the path of the new file.
pub fn export(
    results: &[PlatformTopics],
    dir: &Path,
    timestamp: &DateTime<Local>,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| CrawlError::export(dir, e))?;

    let path = dir.join(export_filename(timestamp));
    let records = flatten(results);
    write_records(&path, &records)?;

    info!(rows = records.len(), "data saved to {}", path.display());
    Ok(path)
}
