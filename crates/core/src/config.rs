use crate::error::{Error, Result};
use crate::tables::{ReferenceTables, load_tables, parse_matrix_str};
use crate::types::MatrixConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the site configuration inside a site directory
pub const SITE_TOML: &str = "site.toml";

/// Default cap on "similar guides" links in the page sidebar
pub const DEFAULT_SIBLING_LIMIT: usize = 5;

/// Raw TOML configuration structure
/// This matches the site.toml file structure exactly
#[derive(Debug, Deserialize)]
struct RawConfig {
    site: RawSiteMetadata,
    #[serde(default)]
    data: RawDataPaths,
    #[serde(default)]
    matrix: RawMatrixSettings,
    #[serde(default)]
    content: RawContentSettings,
}

#[derive(Debug, Deserialize)]
struct RawSiteMetadata {
    title: String,
    base_url: String,
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDataPaths {
    #[serde(default = "default_nationalities_path")]
    nationalities: String,
    #[serde(default = "default_visa_types_path")]
    visa_types: String,
    #[serde(default = "default_matrix_path")]
    matrix: String,
}

impl Default for RawDataPaths {
    fn default() -> Self {
        Self {
            nationalities: default_nationalities_path(),
            visa_types: default_visa_types_path(),
            matrix: default_matrix_path(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawMatrixSettings {
    sibling_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct RawContentSettings {
    dir: Option<String>,
}

fn default_nationalities_path() -> String {
    "data/nationalities.toml".to_string()
}

fn default_visa_types_path() -> String {
    "data/visa_types.toml".to_string()
}

fn default_matrix_path() -> String {
    "data/matrix.toml".to_string()
}

/// Validated site configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig {
    pub title: String,
    /// Absolute base URL without a trailing slash
    pub base_url: String,
    pub language: String,
    pub data: DataPaths,
    pub sibling_limit: usize,
    pub content_dir: PathBuf,
}

/// Reference data locations, relative to the site directory
#[derive(Debug, Clone, PartialEq)]
pub struct DataPaths {
    pub nationalities: PathBuf,
    pub visa_types: PathBuf,
    pub matrix: PathBuf,
}

/// Everything a build needs, loaded once up front
#[derive(Debug, Clone)]
pub struct Site {
    pub root: PathBuf,
    pub config: SiteConfig,
    pub tables: ReferenceTables,
    pub matrix: MatrixConfig,
}

impl Site {
    /// Assemble a site from already-parsed parts (used by tests and tooling)
    pub fn from_parts(
        root: PathBuf,
        config: SiteConfig,
        tables: ReferenceTables,
        matrix: MatrixConfig,
    ) -> Self {
        Self {
            root,
            config,
            tables,
            matrix,
        }
    }

    pub fn content_dir(&self) -> PathBuf {
        self.root.join(&self.config.content_dir)
    }
}

/// Parse site.toml from a file path
pub fn parse_site_toml<P: AsRef<Path>>(path: P) -> Result<SiteConfig> {
    let content = fs::read_to_string(path)?;
    parse_site_toml_str(&content)
}

/// Parse site.toml from a string (useful for testing)
pub fn parse_site_toml_str(content: &str) -> Result<SiteConfig> {
    let raw: RawConfig = toml::from_str(content)?;

    let base_url = validate_base_url(&raw.site.base_url)?;

    if raw.site.title.trim().is_empty() {
        return Err(Error::ConfigParse("site.title must not be empty".to_string()));
    }

    let data = DataPaths {
        nationalities: validate_path(&raw.data.nationalities, "data.nationalities")?,
        visa_types: validate_path(&raw.data.visa_types, "data.visa_types")?,
        matrix: validate_path(&raw.data.matrix, "data.matrix")?,
    };

    let sibling_limit = raw.matrix.sibling_limit.unwrap_or(DEFAULT_SIBLING_LIMIT);

    let content_dir = match raw.content.dir {
        Some(dir) => validate_path(&dir, "content.dir")?,
        None => PathBuf::from("content"),
    };

    Ok(SiteConfig {
        title: raw.site.title,
        base_url,
        language: raw.site.language.unwrap_or_else(|| "en".to_string()),
        data,
        sibling_limit,
        content_dir,
    })
}

/// Load site.toml and all reference data from a site directory.
///
/// Every file is read and parsed before any page is built, so a malformed
/// record fails the whole load instead of surfacing mid-render.
pub fn load_site<P: AsRef<Path>>(dir: P) -> Result<Site> {
    let root = dir.as_ref().to_path_buf();
    let config = parse_site_toml(root.join(SITE_TOML))?;

    let nationalities = read_data_file(&root, &config.data.nationalities)?;
    let visa_types = read_data_file(&root, &config.data.visa_types)?;
    let matrix = read_data_file(&root, &config.data.matrix)?;

    let tables = load_tables(&nationalities, &visa_types)?;
    let matrix = parse_matrix_str(&matrix)?;

    tracing::info!(
        site = %config.title,
        nationalities = tables.nationalities().len(),
        visa_types = tables.visa_types().len(),
        declared = matrix.declared_entries(),
        "site loaded"
    );

    Ok(Site {
        root,
        config,
        tables,
        matrix,
    })
}

fn read_data_file(root: &Path, relative: &Path) -> Result<String> {
    let path = root.join(relative);
    fs::read_to_string(&path).map_err(|e| {
        Error::ConfigParse(format!("Cannot read data file '{}': {}", path.display(), e))
    })
}

fn validate_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(Error::ConfigParse(format!(
            "site.base_url must start with http:// or https://: '{}'",
            url
        )));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Validate and convert a path string to PathBuf.
///
/// Rejects absolute paths and parent directory references (`..`) so a
/// site.toml cannot point the build at files outside the site directory.
///
/// # Examples
///
/// ```text
/// validate_path("data/nationalities.toml", "data.nationalities")  → Ok(PathBuf)
/// validate_path("/etc/passwd", "data.matrix")  → Err("Absolute paths not allowed...")
/// validate_path("../../secret.toml", "data.matrix")  → Err("Parent directory references...")
/// ```
fn validate_path(path_str: &str, field_name: &str) -> Result<PathBuf> {
    let path = Path::new(path_str);

    if path.is_absolute() {
        return Err(Error::ConfigParse(format!(
            "Absolute paths not allowed in '{}': '{}'. Use relative paths only.",
            field_name, path_str
        )));
    }

    for component in path.components() {
        if component == std::path::Component::ParentDir {
            return Err(Error::ConfigParse(format!(
                "Parent directory references (..) not allowed in '{}': '{}'",
                field_name, path_str
            )));
        }
    }

    if path_str.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty path in '{}' field",
            field_name
        )));
    }

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
[site]
title = "Expats Argentina"
base_url = "https://expatsargentina.com/"
"#;

    #[test]
    fn test_parse_minimal_config_applies_defaults() {
        let config = parse_site_toml_str(MINIMAL).unwrap();
        assert_eq!(config.title, "Expats Argentina");
        assert_eq!(config.base_url, "https://expatsargentina.com");
        assert_eq!(config.language, "en");
        assert_eq!(config.sibling_limit, DEFAULT_SIBLING_LIMIT);
        assert_eq!(config.content_dir, PathBuf::from("content"));
        assert_eq!(
            config.data.nationalities,
            PathBuf::from("data/nationalities.toml")
        );
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[site]
title = "Test"
base_url = "http://localhost:8080"
language = "es"

[data]
nationalities = "tables/nat.toml"
visa_types = "tables/visas.toml"
matrix = "tables/matrix.toml"

[matrix]
sibling_limit = 3

[content]
dir = "pages"
"#;
        let config = parse_site_toml_str(toml).unwrap();
        assert_eq!(config.language, "es");
        assert_eq!(config.sibling_limit, 3);
        assert_eq!(config.content_dir, PathBuf::from("pages"));
        assert_eq!(config.data.matrix, PathBuf::from("tables/matrix.toml"));
    }

    #[test]
    fn test_base_url_must_be_http() {
        let toml = r#"
[site]
title = "Test"
base_url = "expatsargentina.com"
"#;
        let err = parse_site_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("site.base_url"));
    }

    #[test]
    fn test_empty_title_rejected() {
        let toml = r#"
[site]
title = "  "
base_url = "https://example.com"
"#;
        assert!(parse_site_toml_str(toml).is_err());
    }

    #[test]
    fn test_validate_path_valid_relative() {
        assert!(validate_path("data/nationalities.toml", "data.nationalities").is_ok());
        assert!(validate_path("content", "content.dir").is_ok());
        assert!(validate_path("a/b/c.toml", "data.matrix").is_ok());
    }

    #[test]
    fn test_validate_path_rejects_absolute_unix() {
        let result = validate_path("/etc/passwd", "data.matrix");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Absolute paths not allowed")
        );
    }

    #[test]
    fn test_validate_path_rejects_parent_dir() {
        let result = validate_path("../secret.toml", "data.matrix");
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Parent directory references")
        );

        assert!(validate_path("data/../../x.toml", "data.matrix").is_err());
    }

    #[test]
    fn test_validate_path_rejects_empty() {
        let result = validate_path("", "content.dir");
        assert!(result.unwrap_err().to_string().contains("Empty path"));
        assert!(validate_path("   ", "content.dir").is_err());
    }

    #[test]
    fn test_parse_config_rejects_traversal_in_data_path() {
        let toml = r#"
[site]
title = "Test"
base_url = "https://example.com"

[data]
nationalities = "../../etc/shadow"
"#;
        let err = parse_site_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("data.nationalities"));
    }

    fn write_site(dir: &Path) {
        fs::create_dir_all(dir.join("data")).unwrap();
        fs::write(dir.join(SITE_TOML), MINIMAL).unwrap();
        fs::write(
            dir.join("data/nationalities.toml"),
            defaults::NATIONALITIES_TOML,
        )
        .unwrap();
        fs::write(dir.join("data/visa_types.toml"), defaults::VISA_TYPES_TOML).unwrap();
        fs::write(dir.join("data/matrix.toml"), defaults::MATRIX_TOML).unwrap();
    }

    #[test]
    fn test_load_site_reads_all_tables() {
        let dir = TempDir::new().unwrap();
        write_site(dir.path());

        let site = load_site(dir.path()).unwrap();
        assert_eq!(site.config.title, "Expats Argentina");
        assert!(site.tables.nationality("united-states").is_some());
        assert_eq!(site.matrix.membership.len(), 7);
        assert_eq!(site.content_dir(), dir.path().join("content"));
    }

    #[test]
    fn test_load_site_missing_data_file_names_path() {
        let dir = TempDir::new().unwrap();
        write_site(dir.path());
        fs::remove_file(dir.path().join("data/matrix.toml")).unwrap();

        let err = load_site(dir.path()).unwrap_err();
        assert!(err.to_string().contains("matrix.toml"));
    }

    #[test]
    fn test_load_site_malformed_record_fails_whole_load() {
        let dir = TempDir::new().unwrap();
        write_site(dir.path());
        fs::write(
            dir.path().join("data/visa_types.toml"),
            "[[visa_type]]\nslug = \"broken\"\n",
        )
        .unwrap();

        assert!(load_site(dir.path()).is_err());
    }
}
