use anyhow::{Context, Result};
use matrix_kit_generator::generate_site;
use matrix_kit_validator::validate_site;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::load_site_dir;
use super::validate::print_report;

/// Build static site for deployment
pub async fn run(path: PathBuf, output: PathBuf) -> Result<()> {
    println!("🔨 Building static site...");
    println!("   Source: {}", path.display());
    println!("   Output: {}", output.display());
    println!();

    let site = load_site_dir(&path)?;

    println!("✓ Loaded: {}", site.config.title);
    println!("  Nationalities: {}", site.tables.nationalities().len());
    println!("  Visa types: {}", site.tables.visa_types().len());
    println!();

    println!("🔍 Validating...");
    let report = validate_site(&site);
    print_report(&report);
    if !report.is_valid() {
        anyhow::bail!(
            "Refusing to build: validation found {} error(s)",
            report.errors.len()
        );
    }
    println!();

    println!("📄 Generating pages...");
    let generated = generate_site(&site).context("Failed to generate site")?;

    fs::create_dir_all(&output).context("Failed to create output directory")?;
    for (file, html) in &generated.pages {
        write_output(&output, file, html.as_bytes())?;
    }
    for (file, data) in &generated.assets {
        write_output(&output, file, data)?;
    }
    println!(
        "   ✓ Wrote {} pages ({} visa guides) and {} assets",
        generated.pages.len(),
        generated.matrix_page_count(),
        generated.assets.len()
    );

    println!("📦 Copying static files...");
    let copied = copy_static(&path.join("static"), &output.join("static"))?;
    println!("   ✓ Copied {} static files", copied);

    if !generated.failures.is_empty() {
        eprintln!();
        for failure in &generated.failures {
            eprintln!(
                "   ✗ {}: {}",
                failure.combination.path(),
                failure.error
            );
        }
        anyhow::bail!(
            "{} page(s) failed to build; the rest were written to {}",
            generated.failures.len(),
            output.display()
        );
    }

    println!();
    println!("✅ Build complete!");
    println!("   Output: {}", output.display());
    println!();
    println!("To test locally:");
    println!("   cd {} && python3 -m http.server 8000", output.display());
    println!();

    Ok(())
}

fn write_output(output: &Path, relative: &str, data: &[u8]) -> Result<()> {
    let dst = output.join(relative);
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&dst, data).with_context(|| format!("Failed to write {}", dst.display()))
}

/// Mirror `src` into `dst`, returning the number of files copied
fn copy_static(src: &Path, dst: &Path) -> Result<usize> {
    if !src.is_dir() {
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.context("Failed to read static directory")?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .context("Static entry outside static directory")?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create {}", target.display()))?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
            copied += 1;
        }
    }

    Ok(copied)
}
