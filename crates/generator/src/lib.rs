//! Static site generation for the visa matrix.
//!
//! [`generate_site`] turns a loaded [`Site`] into in-memory pages and assets;
//! writing them to disk is left to the caller. [`render_path`] answers a
//! single request the same way for the preview server.

pub mod content;
pub mod derive;
pub mod matrix;
pub mod page;
pub mod render;
pub mod sitemap;

use chrono::NaiveDate;
use content::{ContentError, ContentPage, load_content_pages, render_content_page};
use matrix::{Combination, MATRIX_PREFIX, MatrixIndex, enumerate};
use matrix_kit_core::Site;
use page::{PageError, build_page};
use render::{
    ContentLink, IndexGroup, RenderOptions, render_home, render_matrix_index, render_not_found,
};
use sitemap::{
    CONTENT_PRIORITY, HOME_PRIORITY, INDEX_PRIORITY, MATRIX_PRIORITY, SitemapEntry,
    render_sitemap,
};

pub use page::RenderedPage;

/// Site stylesheet, served at `/style.css`
pub const STYLESHEET: &str = include_str!("style.css");

/// Failures that stop the whole build (as opposed to a single page)
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Content(#[from] ContentError),
}

/// A combination page that could not be built
#[derive(Debug, Clone)]
pub struct PageFailure {
    pub combination: Combination,
    pub error: PageError,
}

pub struct GeneratedSite {
    pub pages: Vec<(String, String)>,   // (output file, html)
    pub assets: Vec<(String, Vec<u8>)>, // (output file, data)
    pub failures: Vec<PageFailure>,
}

impl GeneratedSite {
    /// Number of combination pages that rendered
    pub fn matrix_page_count(&self) -> usize {
        self.pages
            .iter()
            .filter(|(file, _)| file.starts_with("visas-matrix/") && file != "visas-matrix/index.html")
            .count()
    }
}

fn content_links(pages: &[ContentPage]) -> Vec<ContentLink> {
    pages
        .iter()
        .map(|p| ContentLink {
            title: p.title.clone(),
            path: p.path(),
        })
        .collect()
}

/// Index groups in membership order, keeping only pairs that resolve
fn index_groups<'a>(site: &'a Site, combinations: &[Combination]) -> Vec<IndexGroup<'a>> {
    let mut groups: Vec<IndexGroup<'a>> = Vec::new();

    for combination in combinations {
        let Ok((visa, nationality)) = site
            .tables
            .resolve(&combination.visa_type, &combination.nationality)
        else {
            continue;
        };

        match groups.iter_mut().find(|g| g.visa.slug == visa.slug) {
            Some(group) => group.nationalities.push(nationality),
            None => groups.push(IndexGroup {
                visa,
                nationalities: vec![nationality],
            }),
        }
    }

    groups
}

/// Generate every page using today's date for the sitemap
pub fn generate_site(site: &Site) -> Result<GeneratedSite, GenerateError> {
    generate_site_on(site, chrono::Utc::now().date_naive())
}

/// Generate every page.
///
/// Each combination is built independently: a failed lookup is recorded in
/// `failures` and the remaining pages still render.
pub fn generate_site_on(site: &Site, lastmod: NaiveDate) -> Result<GeneratedSite, GenerateError> {
    let options = RenderOptions::default();
    let index = MatrixIndex::new(&site.matrix);
    let combinations = enumerate(&site.matrix);
    let content_pages = load_content_pages(&site.content_dir())?;

    let mut pages = Vec::with_capacity(combinations.len() + content_pages.len() + 3);
    let mut failures = Vec::new();
    let mut sitemap_entries = vec![
        SitemapEntry::new("/", HOME_PRIORITY),
        SitemapEntry::new(format!("{}/", MATRIX_PREFIX), INDEX_PRIORITY),
    ];

    for page in &content_pages {
        pages.push((
            page.output_file(),
            render_content_page(&site.config, page, options),
        ));
        sitemap_entries.push(SitemapEntry::new(page.path(), CONTENT_PRIORITY));
    }

    for combination in &combinations {
        match build_page(
            site,
            &index,
            &combination.visa_type,
            &combination.nationality,
            options,
        ) {
            Ok(rendered) => {
                sitemap_entries.push(SitemapEntry::new(rendered.path, MATRIX_PRIORITY));
                pages.push((rendered.output_file, rendered.html));
            }
            Err(error) => {
                tracing::warn!(
                    visa_type = %combination.visa_type,
                    nationality = %combination.nationality,
                    error = %error,
                    "skipping page"
                );
                failures.push(PageFailure {
                    combination: combination.clone(),
                    error,
                });
            }
        }
    }

    let links = content_links(&content_pages);
    pages.push((
        "index.html".to_string(),
        render_home(&site.config, &links, options),
    ));
    pages.push((
        "visas-matrix/index.html".to_string(),
        render_matrix_index(&site.config, &index_groups(site, &combinations), options),
    ));
    pages.push((
        "404.html".to_string(),
        render_not_found(&site.config, options),
    ));

    let assets = vec![
        ("style.css".to_string(), STYLESHEET.as_bytes().to_vec()),
        (
            "sitemap.xml".to_string(),
            render_sitemap(&site.config.base_url, &sitemap_entries, lastmod).into_bytes(),
        ),
    ];

    tracing::info!(
        pages = pages.len(),
        combinations = combinations.len(),
        failures = failures.len(),
        "site generated"
    );

    Ok(GeneratedSite {
        pages,
        assets,
        failures,
    })
}

/// Response to a single preview request
#[derive(Debug, Clone, PartialEq)]
pub struct Routed {
    pub found: bool,
    pub content_type: &'static str,
    pub body: String,
}

impl Routed {
    fn html(body: String) -> Self {
        Self {
            found: true,
            content_type: "text/html; charset=utf-8",
            body,
        }
    }

    fn not_found(site: &Site, options: RenderOptions) -> Self {
        Self {
            found: false,
            content_type: "text/html; charset=utf-8",
            body: render_not_found(&site.config, options),
        }
    }
}

/// Render whatever lives at a URL path, on demand.
///
/// Unlisted combinations and unknown slugs produce the not-found page.
pub fn render_path(
    site: &Site,
    path: &str,
    options: RenderOptions,
) -> Result<Routed, GenerateError> {
    let trimmed = path.trim_matches('/');
    let segments: Vec<&str> = trimmed
        .split('/')
        .filter(|s| !s.is_empty() && *s != "index.html")
        .collect();

    match segments.as_slice() {
        [] => {
            let content_pages = load_content_pages(&site.content_dir())?;
            Ok(Routed::html(render_home(
                &site.config,
                &content_links(&content_pages),
                options,
            )))
        }
        ["style.css"] => Ok(Routed {
            found: true,
            content_type: "text/css; charset=utf-8",
            body: STYLESHEET.to_string(),
        }),
        ["visas-matrix"] => {
            let combinations = enumerate(&site.matrix);
            Ok(Routed::html(render_matrix_index(
                &site.config,
                &index_groups(site, &combinations),
                options,
            )))
        }
        ["visas-matrix", visa, nationality] => {
            let index = MatrixIndex::new(&site.matrix);
            match build_page(site, &index, visa, nationality, options) {
                Ok(page) => Ok(Routed::html(page.html)),
                Err(error) => {
                    tracing::debug!(error = %error, "not found");
                    Ok(Routed::not_found(site, options))
                }
            }
        }
        _ => {
            let slug = segments.join("/");
            let content_pages = load_content_pages(&site.content_dir())?;
            Ok(match content_pages.iter().find(|p| p.slug == slug) {
                Some(page) => Routed::html(render_content_page(&site.config, page, options)),
                None => Routed::not_found(site, options),
            })
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::bundled_site;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()
    }

    #[test]
    fn test_every_enumerated_pair_renders() {
        let site = bundled_site();
        let generated = generate_site_on(&site, date()).unwrap();

        assert!(generated.failures.is_empty());
        assert_eq!(
            generated.matrix_page_count(),
            enumerate(&site.matrix).len()
        );
    }

    #[test]
    fn test_output_files_are_unique() {
        let site = bundled_site();
        let generated = generate_site_on(&site, date()).unwrap();
        let files: HashSet<_> = generated.pages.iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(files.len(), generated.pages.len());
    }

    #[test]
    fn test_unlisted_pair_is_absent_from_output() {
        let site = bundled_site();
        let generated = generate_site_on(&site, date()).unwrap();

        assert!(
            !generated
                .pages
                .iter()
                .any(|(f, _)| f == "visas-matrix/mercosur/united-states/index.html")
        );
        assert!(
            generated
                .pages
                .iter()
                .any(|(f, _)| f == "visas-matrix/mercosur/brazil/index.html")
        );
    }

    #[test]
    fn test_bad_pair_is_isolated() {
        let mut site = bundled_site();
        site.matrix.membership[0]
            .nationalities
            .insert(0, "atlantis".to_string());
        let expected = enumerate(&site.matrix).len() - 1;

        let generated = generate_site_on(&site, date()).unwrap();
        assert_eq!(generated.failures.len(), 1);
        assert_eq!(generated.failures[0].combination.nationality, "atlantis");
        assert_eq!(generated.matrix_page_count(), expected);
    }

    #[test]
    fn test_assets_and_sitemap() {
        let site = bundled_site();
        let generated = generate_site_on(&site, date()).unwrap();

        let sitemap = generated
            .assets
            .iter()
            .find(|(f, _)| f == "sitemap.xml")
            .map(|(_, data)| String::from_utf8(data.clone()).unwrap())
            .unwrap();
        assert!(sitemap.contains("https://expatsargentina.com/visas-matrix/digital-nomad/united-states/"));
        assert!(sitemap.contains("<lastmod>2026-10-01</lastmod>"));
        assert!(generated.assets.iter().any(|(f, _)| f == "style.css"));
        assert!(generated.pages.iter().any(|(f, _)| f == "404.html"));
    }

    #[test]
    fn test_content_pages_are_generated() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("content")).unwrap();
        fs::write(dir.path().join("content/remote-work.md"), "# Remote Work\n\nHello").unwrap();

        let mut site = bundled_site();
        site.root = dir.path().to_path_buf();

        let generated = generate_site_on(&site, date()).unwrap();
        let (_, html) = generated
            .pages
            .iter()
            .find(|(f, _)| f == "remote-work/index.html")
            .unwrap();
        assert!(html.contains("<h1>Remote Work</h1>"));

        let (_, home) = generated.pages.iter().find(|(f, _)| f == "index.html").unwrap();
        assert!(home.contains(r#"href="/remote-work/""#));
    }

    #[test]
    fn test_render_path_routes() {
        let site = bundled_site();
        let options = RenderOptions { preview: true };

        let page = render_path(&site, "/visas-matrix/work/india/", options).unwrap();
        assert!(page.found);
        assert!(page.body.contains("/_reload"));

        let missing = render_path(&site, "/visas-matrix/mercosur/united-states/", options).unwrap();
        assert!(!missing.found);
        assert!(missing.body.contains("Page Not Found"));

        let css = render_path(&site, "/style.css", options).unwrap();
        assert!(css.content_type.starts_with("text/css"));

        assert!(render_path(&site, "/", options).unwrap().found);
        assert!(render_path(&site, "/visas-matrix/", options).unwrap().found);
        assert!(!render_path(&site, "/no-such-page/", options).unwrap().found);
    }
}
