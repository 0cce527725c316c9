//! Whole-site validation run before any page is generated.
//!
//! Every problem is collected in a single pass so one run reports all of
//! them instead of stopping at the first.

use matrix_kit_core::{MatrixConfig, Nationality, ReferenceTables, Site, VisaType};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Slugs become URL path segments: lowercase ASCII, digits and hyphens
fn is_url_safe(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn check_slugs<'a>(
    kind: &str,
    slugs: impl Iterator<Item = &'a str>,
    report: &mut ValidationReport,
) {
    let mut seen = HashSet::new();
    for slug in slugs {
        if !is_url_safe(slug) {
            report
                .errors
                .push(format!("{} slug '{}' is not URL-safe", kind, slug));
        }
        if !seen.insert(slug) {
            report
                .errors
                .push(format!("Duplicate {} slug '{}'", kind, slug));
        }
    }
}

fn check_required(
    kind: &str,
    slug: &str,
    fields: &[(&str, &str)],
    report: &mut ValidationReport,
) {
    for (field, value) in fields {
        if value.trim().is_empty() {
            report
                .errors
                .push(format!("{} '{}': field '{}' is empty", kind, slug, field));
        }
    }
}

fn check_nationality(n: &Nationality, report: &mut ValidationReport) {
    check_required(
        "Nationality",
        &n.slug,
        &[
            ("name", n.name.as_str()),
            ("demonym", n.demonym.as_str()),
            ("flag", n.flag.as_str()),
            ("tourist.duration", n.tourist.duration.as_str()),
        ],
        report,
    );

    if n.tourist.reciprocity_fee == Some(true) && n.tourist.fee_amount.is_none() {
        report.warnings.push(format!(
            "Nationality '{}': reciprocity fee set without a fee amount",
            n.slug
        ));
    }
}

fn check_visa_type(v: &VisaType, report: &mut ValidationReport) {
    check_required(
        "Visa type",
        &v.slug,
        &[
            ("name", v.name.as_str()),
            ("short_name", v.short_name.as_str()),
            ("description", v.description.as_str()),
            ("processing_time", v.processing_time.as_str()),
            ("duration", v.duration.as_str()),
            ("path_to_citizenship", v.path_to_citizenship.as_str()),
            ("costs.government_fee", v.costs.government_fee.as_str()),
            ("costs.total_estimate", v.costs.total_estimate.as_str()),
        ],
        report,
    );

    if v.documents.is_empty() {
        report
            .warnings
            .push(format!("Visa type '{}' lists no documents", v.slug));
    }
}

fn check_membership(
    tables: &ReferenceTables,
    matrix: &MatrixConfig,
    report: &mut ValidationReport,
) {
    let mut declared_visas = HashSet::new();

    for membership in &matrix.membership {
        let visa = membership.visa_type.as_str();

        if tables.visa_type(visa).is_none() {
            report
                .errors
                .push(format!("Membership names unknown visa type '{}'", visa));
        }
        if !declared_visas.insert(visa) {
            report.errors.push(format!(
                "Visa type '{}' has more than one membership block",
                visa
            ));
        }

        let mut listed = HashSet::new();
        for nationality in &membership.nationalities {
            if tables.nationality(nationality).is_none() {
                report.errors.push(format!(
                    "Membership '{}' names unknown nationality '{}'",
                    visa, nationality
                ));
            }
            if !listed.insert(nationality.as_str()) {
                report.errors.push(format!(
                    "Membership '{}' lists nationality '{}' more than once",
                    visa, nationality
                ));
            }
        }
    }

    for v in tables.visa_types() {
        if !declared_visas.contains(v.slug.as_str()) {
            report.warnings.push(format!(
                "Visa type '{}' has no membership list; no pages will be generated for it",
                v.slug
            ));
        }
    }

    let referenced: HashSet<&str> = matrix
        .membership
        .iter()
        .flat_map(|m| m.nationalities.iter().map(String::as_str))
        .collect();
    let unreferenced: Vec<&str> = tables
        .nationalities()
        .iter()
        .map(|n| n.slug.as_str())
        .filter(|slug| !referenced.contains(slug))
        .collect();
    if !unreferenced.is_empty() {
        report.warnings.push(format!(
            "Nationalities not in any membership list: {}",
            unreferenced.join(", ")
        ));
    }
}

/// Sidebar links point at same-region pages for the same visa type; count
/// the ones whose target pair is not generated.
fn check_sibling_links(site: &Site, report: &mut ValidationReport) {
    let members: HashMap<&str, HashSet<&str>> = site
        .matrix
        .membership
        .iter()
        .map(|m| {
            (
                m.visa_type.as_str(),
                m.nationalities.iter().map(String::as_str).collect(),
            )
        })
        .collect();

    let mut dangling: BTreeMap<&str, usize> = BTreeMap::new();

    for membership in &site.matrix.membership {
        let visa = membership.visa_type.as_str();
        let Some(listed) = members.get(visa) else {
            continue;
        };

        for slug in &membership.nationalities {
            let Some(nationality) = site.tables.nationality(slug) else {
                continue;
            };
            let missing = site
                .tables
                .nationalities_in_region(nationality.region)
                .filter(|n| n.slug != nationality.slug)
                .take(site.config.sibling_limit)
                .filter(|n| !listed.contains(n.slug.as_str()))
                .count();
            if missing > 0 {
                *dangling.entry(visa).or_default() += missing;
            }
        }
    }

    for (visa, count) in dangling {
        report.warnings.push(format!(
            "Visa type '{}': {} sidebar link(s) point at pages that are not generated",
            visa, count
        ));
    }
}

/// Validate reference tables and membership lists together
pub fn validate_site(site: &Site) -> ValidationReport {
    let mut report = ValidationReport::default();
    let tables = &site.tables;

    check_slugs(
        "nationality",
        tables.nationalities().iter().map(|n| n.slug.as_str()),
        &mut report,
    );
    check_slugs(
        "visa type",
        tables.visa_types().iter().map(|v| v.slug.as_str()),
        &mut report,
    );

    for n in tables.nationalities() {
        check_nationality(n, &mut report);
    }
    for v in tables.visa_types() {
        check_visa_type(v, &mut report);
    }

    check_membership(tables, &site.matrix, &mut report);
    check_sibling_links(site, &mut report);

    let pairs: HashSet<(&str, &str)> = site
        .matrix
        .membership
        .iter()
        .flat_map(|m| {
            m.nationalities
                .iter()
                .map(move |n| (m.visa_type.as_str(), n.as_str()))
        })
        .collect();

    report
        .info
        .push(format!("Nationalities: {}", tables.nationalities().len()));
    report
        .info
        .push(format!("Visa types: {}", tables.visa_types().len()));
    report.info.push(format!("Combinations: {}", pairs.len()));

    tracing::debug!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validation finished"
    );

    report
}
