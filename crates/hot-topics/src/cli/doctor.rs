//! Environment readiness check.

use crate::config::Settings;
use crate::renderer::chromium::{find_chromium, CHROME_PATH_ENV};
use anyhow::Result;

/// Report Chromium availability and the resolved platform table.
pub fn run(settings: &Settings) -> Result<()> {
    println!("Hot Topics Doctor");
    println!("=================");
    println!();

    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    let chromium_path = find_chromium();
    match &chromium_path {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Install Chrome or set {CHROME_PATH_ENV}; \
             dynamic sources will return no topics."
        ),
    }

    let output_dir = &settings.output_dir;
    if output_dir.is_dir() {
        println!("[OK] Output directory: {}", output_dir.display());
    } else {
        println!(
            "[??] Output directory {} does not exist yet (created on export)",
            output_dir.display()
        );
    }
    println!();

    println!("Platforms:");
    for source in &settings.sources {
        println!(
            "  {:<10} {:<12} {}  [{}]",
            source.label,
            source.access.kind().to_string(),
            source.url,
            source.access.target()
        );
    }
    println!();

    if chromium_path.is_some() {
        println!("Status: READY");
    } else {
        println!("Status: STATIC ONLY");
    }

    Ok(())
}
