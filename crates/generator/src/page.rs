//! Single-page builder: membership check, lookup, derivation, rendering.

use crate::derive::derive;
use crate::matrix::{Combination, MatrixIndex};
use crate::render::{MatrixPageView, RenderOptions, render_matrix_page};
use matrix_kit_core::{LookupError, Nationality, ReferenceTables, Site, VisaType};
use thiserror::Error;

/// Why a combination page could not be produced
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("no page for {visa_type}/{nationality}: pair is not in the membership lists")]
    NotListed {
        visa_type: String,
        nationality: String,
    },

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// A finished document and where it lives
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Public URL path, e.g. `/visas-matrix/work/india/`
    pub path: String,
    /// Output file relative to the build directory
    pub output_file: String,
    pub html: String,
}

/// Same-region nationalities for the sidebar, excluding the page's own
pub fn siblings<'a>(
    tables: &'a ReferenceTables,
    nationality: &Nationality,
    limit: usize,
) -> Vec<&'a Nationality> {
    tables
        .nationalities_in_region(nationality.region)
        .filter(|n| n.slug != nationality.slug)
        .take(limit)
        .collect()
}

/// Look up the records behind a listed pair.
///
/// Unlisted pairs are rejected before any lookup, so a request for a valid
/// visa type and nationality that were never paired still yields not-found.
pub fn resolve_combination<'a>(
    site: &'a Site,
    index: &MatrixIndex,
    visa_slug: &str,
    nationality_slug: &str,
) -> Result<(&'a VisaType, &'a Nationality), PageError> {
    if !index.contains(visa_slug, nationality_slug) {
        return Err(PageError::NotListed {
            visa_type: visa_slug.to_string(),
            nationality: nationality_slug.to_string(),
        });
    }

    Ok(site.tables.resolve(visa_slug, nationality_slug)?)
}

/// Build the page for one combination
pub fn build_page(
    site: &Site,
    index: &MatrixIndex,
    visa_slug: &str,
    nationality_slug: &str,
    options: RenderOptions,
) -> Result<RenderedPage, PageError> {
    let (visa, nationality) = resolve_combination(site, index, visa_slug, nationality_slug)?;
    let derived = derive(visa, nationality);
    let siblings = siblings(&site.tables, nationality, site.config.sibling_limit);

    let view = MatrixPageView {
        visa,
        nationality,
        derived: &derived,
        siblings: &siblings,
    };

    let combination = Combination::new(&visa.slug, &nationality.slug);
    tracing::debug!(path = %combination.path(), "rendered combination page");

    Ok(RenderedPage {
        path: combination.path(),
        output_file: combination.output_file(),
        html: render_matrix_page(&site.config, &view, options),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::bundled_site;

    fn build(site: &Site, visa: &str, nat: &str) -> Result<RenderedPage, PageError> {
        let index = MatrixIndex::new(&site.matrix);
        build_page(site, &index, visa, nat, RenderOptions::default())
    }

    #[test]
    fn test_us_digital_nomad_page() {
        let site = bundled_site();
        let page = build(&site, "digital-nomad", "united-states").unwrap();

        assert_eq!(page.path, "/visas-matrix/digital-nomad/united-states/");
        assert!(page.html.contains("visa-free entry to Argentina for 90 days"));
        assert!(!page.html.contains("need a tourist visa to enter Argentina"));
        assert!(page.html.contains("Digital Nomad Visa for Americans"));
        assert!(page.html.contains("Criminal background check from United States (apostilled)"));
        assert!(page.html.contains("Visa-free (90 days)"));
        assert!(page.html.contains("/nationality/united-states/"));
        assert!(page.html.contains(r#"href="/visas/""#));
    }

    #[test]
    fn test_brazil_mercosur_page() {
        let site = bundled_site();
        let page = build(&site, "mercosur", "brazil").unwrap();

        assert!(page.html.contains("15-30 days (fastest processing for Mercosur nationals)"));
        assert!(page.html.contains("Mercosur Member"));
        assert!(!page.html.contains("Criminal background check from Brazil"));
    }

    #[test]
    fn test_fee_nationality_gets_tourist_visa_sentence() {
        let site = bundled_site();
        let page = build(&site, "work", "india").unwrap();

        assert!(page.html.contains("need a tourist visa to enter Argentina"));
        assert!(!page.html.contains("visa-free entry to Argentina for 90 days"));
        assert!(page.html.contains("Tourist visa required"));
    }

    #[test]
    fn test_unlisted_pair_is_not_found() {
        let site = bundled_site();
        let err = build(&site, "mercosur", "united-states").unwrap_err();
        assert!(matches!(err, PageError::NotListed { .. }));
    }

    #[test]
    fn test_unknown_slugs_are_not_found() {
        let site = bundled_site();
        assert!(build(&site, "golden-visa", "united-states").is_err());
        assert!(build(&site, "digital-nomad", "atlantis").is_err());
        assert!(build(&site, "digital-nomad", "United-States").is_err());
    }

    #[test]
    fn test_listed_pair_with_missing_record_is_lookup_error() {
        let mut site = bundled_site();
        site.matrix.membership[0]
            .nationalities
            .push("atlantis".to_string());
        let visa = site.matrix.membership[0].visa_type.clone();

        let err = build(&site, &visa, "atlantis").unwrap_err();
        assert_eq!(
            err,
            PageError::Lookup(LookupError::UnknownNationality("atlantis".to_string()))
        );
    }

    #[test]
    fn test_resolve_combination_checks_membership_before_lookup() {
        let site = bundled_site();
        let index = MatrixIndex::new(&site.matrix);

        let (visa, nat) = resolve_combination(&site, &index, "mercosur", "brazil").unwrap();
        assert_eq!(visa.slug, "mercosur");
        assert_eq!(nat.slug, "brazil");

        // Both records exist but the pair was never declared
        assert_eq!(
            resolve_combination(&site, &index, "mercosur", "united-states").unwrap_err(),
            PageError::NotListed {
                visa_type: "mercosur".to_string(),
                nationality: "united-states".to_string(),
            }
        );

        // Unknown slugs are never listed, so they fail the membership check too
        assert!(matches!(
            resolve_combination(&site, &index, "golden", "brazil").unwrap_err(),
            PageError::NotListed { .. }
        ));
    }

    #[test]
    fn test_siblings_same_region_excluding_self() {
        let site = bundled_site();
        let us = site.tables.nationality("united-states").unwrap();
        let sibs = siblings(&site.tables, us, 5);

        assert!(sibs.len() <= 5);
        assert!(sibs.iter().all(|s| s.region == us.region));
        assert!(sibs.iter().all(|s| s.slug != "united-states"));
    }

    #[test]
    fn test_siblings_respects_limit_and_table_order() {
        let site = bundled_site();
        let uruguay = site.tables.nationality("uruguay").unwrap();
        let sibs = siblings(&site.tables, uruguay, 2);

        let slugs: Vec<_> = sibs.iter().map(|s| s.slug.as_str()).collect();
        assert_eq!(slugs, vec!["chile", "paraguay"]);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let site = bundled_site();
        let a = build(&site, "work", "india").unwrap();
        let b = build(&site, "work", "india").unwrap();
        assert_eq!(a.html, b.html);
    }
}
