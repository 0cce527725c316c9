use anyhow::{Context, Result};
use matrix_kit_core::Site;
use matrix_kit_generator::derive::{DerivedContent, derive};
use matrix_kit_generator::matrix::{Combination, MatrixIndex};
use matrix_kit_generator::page::{PageError, resolve_combination, siblings};
use serde::Serialize;
use std::path::PathBuf;

use super::load_site_dir;

/// What `inspect` prints for a combination
#[derive(Debug, Serialize)]
struct Inspection {
    path: String,
    visa_type: String,
    nationality: String,
    derived: DerivedContent,
    siblings: Vec<String>,
}

/// Show the computed facts behind one combination page
pub async fn run(path: PathBuf, visa_type: String, nationality: String) -> Result<()> {
    let site = load_site_dir(&path)?;
    let inspection = inspect(&site, &visa_type, &nationality)
        .with_context(|| format!("No page for {}/{}", visa_type, nationality))?;

    let json = serde_json::to_string_pretty(&inspection)
        .context("Failed to serialize derived content")?;
    println!("{}", json);

    Ok(())
}

fn inspect(site: &Site, visa_slug: &str, nationality_slug: &str) -> Result<Inspection, PageError> {
    let index = MatrixIndex::new(&site.matrix);
    let (visa, nationality) = resolve_combination(site, &index, visa_slug, nationality_slug)?;
    let combination = Combination::new(&visa.slug, &nationality.slug);

    Ok(Inspection {
        path: combination.path(),
        visa_type: visa.slug.clone(),
        nationality: nationality.slug.clone(),
        derived: derive(visa, nationality),
        siblings: siblings(&site.tables, nationality, site.config.sibling_limit)
            .into_iter()
            .map(|n| n.slug.clone())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn bundled_site() -> (TempDir, Site) {
        let dir = TempDir::new().unwrap();
        crate::commands::init::run(dir.path().to_path_buf(), None, None)
            .await
            .unwrap();
        let site = matrix_kit_core::load_site(dir.path()).unwrap();
        (dir, site)
    }

    #[tokio::test]
    async fn test_inspect_brazil_mercosur() {
        let (_dir, site) = bundled_site().await;
        let inspection = inspect(&site, "mercosur", "brazil").unwrap();

        assert!(inspection.derived.is_mercosur);
        assert_eq!(
            inspection.derived.processing_time,
            "15-30 days (fastest processing for Mercosur nationals)"
        );
        assert!(!inspection.siblings.contains(&"brazil".to_string()));

        let json = serde_json::to_value(&inspection).unwrap();
        assert_eq!(json["path"], "/visas-matrix/mercosur/brazil/");
        assert_eq!(json["derived"]["has_visa_free"], true);
    }

    #[tokio::test]
    async fn test_inspect_unlisted_pair() {
        let (_dir, site) = bundled_site().await;
        let err = inspect(&site, "mercosur", "united-states").unwrap_err();
        assert!(matches!(err, PageError::NotListed { .. }));
    }

    #[tokio::test]
    async fn test_run_reports_not_found_reason() {
        let (dir, _site) = bundled_site().await;
        let err = run(
            dir.path().to_path_buf(),
            "golden".to_string(),
            "united-states".to_string(),
        )
        .await
        .unwrap_err();
        assert!(format!("{:#}", err).contains("not in the membership lists"));
    }
}
