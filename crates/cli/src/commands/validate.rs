use anyhow::Result;
use matrix_kit_validator::{ValidationReport, validate_site};
use std::path::PathBuf;

use super::load_site_dir;

pub async fn run(path: PathBuf) -> Result<()> {
    println!("Validating site at: {}", path.display());

    let site = load_site_dir(&path)?;
    println!("✓ site.toml valid");
    println!("  Site: {} ({})", site.config.title, site.config.base_url);

    let report = validate_site(&site);
    print_report(&report);

    if !report.is_valid() {
        anyhow::bail!("Validation failed with {} error(s)", report.errors.len());
    }

    println!("\n✅ Site data is valid");
    Ok(())
}

/// Print every error, warning and info line of a report
pub fn print_report(report: &ValidationReport) {
    for line in &report.info {
        println!("  {}", line);
    }
    if !report.warnings.is_empty() {
        println!();
        for warning in &report.warnings {
            println!("  ⚠ {}", warning);
        }
    }
    if !report.errors.is_empty() {
        eprintln!();
        for error in &report.errors {
            eprintln!("  ✗ {}", error);
        }
    }
}
