use anyhow::{Context, Result};
use matrix_kit_core::config::{SITE_TOML, parse_site_toml_str};
use matrix_kit_core::defaults;
use std::fs;
use std::path::{Path, PathBuf};

/// Escape a string for safe inclusion in a TOML basic string
///
/// The site.toml template carries comments, so it is assembled by hand
/// rather than serialized.
///
/// See: https://toml.io/en/v1.0.0#string
fn toml_escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\x08', "\\b")
        .replace('\x0C', "\\f")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Initialize a site directory.
///
/// Writes `site.toml`, the bundled reference tables under `data/`, starter
/// markdown pages under `content/` and an empty `static/` directory.
///
/// # Errors
///
/// Returns an error if `site.toml` already exists or a file cannot be written.
pub async fn run(path: PathBuf, title: Option<String>, base_url: Option<String>) -> Result<()> {
    println!("Initializing site directory: {}", path.display());

    let site_toml_path = path.join(SITE_TOML);
    if site_toml_path.exists() {
        anyhow::bail!(
            "{} already exists at {}\nHint: Delete it first or use a different directory",
            SITE_TOML,
            site_toml_path.display()
        );
    }

    create_directory_structure(&path)?;

    let site_toml = generate_site_toml(title.as_deref(), base_url.as_deref())?;
    fs::write(&site_toml_path, site_toml)
        .with_context(|| format!("Failed to write {}", site_toml_path.display()))?;

    write_data_files(&path)?;
    let pages = write_content_pages(&path)?;

    println!("\n✓ Initialization complete!");
    println!("\nGenerated structure:");
    println!("  {}/", path.display());
    println!("  ├── site.toml            ← Set title and base_url");
    println!("  ├── data/");
    println!("  │   ├── nationalities.toml");
    println!("  │   ├── visa_types.toml");
    println!("  │   └── matrix.toml      ← Which nationalities get a page per visa");
    println!("  ├── content/");
    for page in &pages {
        println!("  │   └── {}", page);
    }
    println!("  └── static/              ← Copied to the build output as-is");

    println!("\nNext steps:");
    println!("  1. Edit site.toml");
    println!("  2. Check the data: matrix-kit validate {}", path.display());
    println!("  3. Preview: matrix-kit preview {}", path.display());

    Ok(())
}

fn create_directory_structure(base: &Path) -> Result<()> {
    for dir in ["data", "content", "static"] {
        fs::create_dir_all(base.join(dir))
            .with_context(|| format!("Failed to create {}", base.join(dir).display()))?;
    }
    Ok(())
}

fn generate_site_toml(title: Option<&str>, base_url: Option<&str>) -> Result<String> {
    let site_title = toml_escape_string(title.unwrap_or("Expats Argentina"));
    let url = toml_escape_string(base_url.unwrap_or("https://example.com"));

    let title_comment = if title.is_some() {
        ""
    } else {
        "  # TODO: Set site title"
    };
    let url_comment = if base_url.is_some() {
        ""
    } else {
        "  # TODO: Set public URL"
    };

    let toml = format!(
        "# Generated by matrix-kit init\n\
\n\
[site]\n\
title = \"{site_title}\"{title_comment}\n\
base_url = \"{url}\"{url_comment}\n\
language = \"en\"\n\
\n\
[data]\n\
nationalities = \"data/nationalities.toml\"\n\
visa_types = \"data/visa_types.toml\"\n\
matrix = \"data/matrix.toml\"\n\
\n\
[matrix]\n\
# Maximum \"similar guides\" links in each page sidebar\n\
sibling_limit = 5\n\
\n\
[content]\n\
dir = \"content\"\n"
    );

    parse_site_toml_str(&toml).context("Generated site.toml is invalid")?;

    Ok(toml)
}

fn write_data_files(base: &Path) -> Result<()> {
    let files = [
        ("nationalities.toml", defaults::NATIONALITIES_TOML),
        ("visa_types.toml", defaults::VISA_TYPES_TOML),
        ("matrix.toml", defaults::MATRIX_TOML),
    ];

    for (name, content) in files {
        let dst = base.join("data").join(name);
        if dst.exists() {
            println!("   ⚠ Keeping existing {}", dst.display());
            continue;
        }
        fs::write(&dst, content).with_context(|| format!("Failed to write {}", dst.display()))?;
    }
    Ok(())
}

fn write_content_pages(base: &Path) -> Result<Vec<&'static str>> {
    let mut written = Vec::new();
    for (name, markdown) in defaults::CONTENT_PAGES {
        let dst = base.join("content").join(name);
        if dst.exists() {
            continue;
        }
        fs::write(&dst, markdown).with_context(|| format!("Failed to write {}", dst.display()))?;
        written.push(*name);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_toml_escape_string() {
        assert_eq!(toml_escape_string("plain"), "plain");
        assert_eq!(toml_escape_string("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(toml_escape_string("C:\\sites"), "C:\\\\sites");
        assert_eq!(toml_escape_string("a\nb\tc"), "a\\nb\\tc");
    }

    #[test]
    fn test_generate_site_toml_defaults() {
        let toml = generate_site_toml(None, None).unwrap();
        let config = parse_site_toml_str(&toml).unwrap();
        assert_eq!(config.title, "Expats Argentina");
        assert_eq!(config.sibling_limit, 5);
        assert!(toml.contains("# TODO: Set public URL"));
    }

    #[test]
    fn test_generate_site_toml_escapes_title() {
        let toml = generate_site_toml(Some("Moving \"South\""), Some("https://a.example/")).unwrap();
        let config = parse_site_toml_str(&toml).unwrap();
        assert_eq!(config.title, "Moving \"South\"");
        assert_eq!(config.base_url, "https://a.example");
    }

    #[test]
    fn test_generate_site_toml_rejects_bad_url() {
        assert!(generate_site_toml(None, Some("example.com")).is_err());
    }

    #[tokio::test]
    async fn test_init_scaffolds_loadable_site() {
        let dir = TempDir::new().unwrap();
        let site_dir = dir.path().join("site");

        run(site_dir.clone(), None, None).await.unwrap();

        assert!(site_dir.join("site.toml").exists());
        assert!(site_dir.join("data/matrix.toml").exists());
        assert!(site_dir.join("content/remote-work.md").exists());
        assert!(site_dir.join("static").is_dir());

        let site = matrix_kit_core::load_site(&site_dir).unwrap();
        assert_eq!(site.tables.visa_types().len(), 7);
    }

    #[tokio::test]
    async fn test_init_refuses_existing_site_toml() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("site.toml"), "# mine").unwrap();

        let err = run(dir.path().to_path_buf(), None, None).await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(
            fs::read_to_string(dir.path().join("site.toml")).unwrap(),
            "# mine"
        );
    }
}
