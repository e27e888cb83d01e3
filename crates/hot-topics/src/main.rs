// Copyright 2026 Hot Topics Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use hot_topics::cli;
use hot_topics::config::Settings;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "hot-topics",
    about = "Hot Topics — crawl platform trending lists and export them to a spreadsheet",
    version,
    after_help = "Run 'hot-topics' with no command to crawl every platform once and export the results."
)]
struct Cli {
    /// Path to a JSON config file (else $HOT_TOPICS_CONFIG or ./hot_topics.json)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Directory the spreadsheet is written to
    #[arg(long, short, global = true)]
    output_dir: Option<PathBuf>,

    /// Crawl all platforms at once instead of one after another
    #[arg(long, global = true)]
    concurrent: bool,

    /// Skip the headless browser; dynamic platforms yield no topics
    #[arg(long, global = true)]
    no_browser: bool,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Log record format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl every platform once and export the results (default)
    Crawl,
    /// Check for Chromium and show the configured platforms
    Doctor,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_tracing(level: &str, format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::resolve(cli.config.as_deref())?;
    if let Some(dir) = &cli.output_dir {
        settings.output_dir = dir.clone();
    }
    if cli.concurrent {
        settings.concurrent = true;
    }
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format);

    let result = match load_settings(&cli) {
        Ok(settings) => match cli.command {
            None | Some(Commands::Crawl) => cli::crawl_cmd::run(&settings, !cli.no_browser)
                .await
                .map(|_| ()),
            Some(Commands::Doctor) => cli::doctor::run(&settings),
        },
        Err(e) => Err(e),
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("  Error: {e:#}");
        std::process::exit(1);
    }

    result
}
