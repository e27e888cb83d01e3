//! CLI command implementations.

pub mod crawl_cmd;
pub mod doctor;
