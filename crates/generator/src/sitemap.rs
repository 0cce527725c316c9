use crate::render::html_escape;
use chrono::NaiveDate;

/// One `<url>` element
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    /// Site-relative path beginning with `/`
    pub path: String,
    pub priority: f32,
}

impl SitemapEntry {
    pub fn new(path: impl Into<String>, priority: f32) -> Self {
        Self {
            path: path.into(),
            priority,
        }
    }
}

pub const HOME_PRIORITY: f32 = 1.0;
pub const INDEX_PRIORITY: f32 = 0.8;
pub const CONTENT_PRIORITY: f32 = 0.7;
pub const MATRIX_PRIORITY: f32 = 0.6;

/// Render sitemap.xml. Every entry shares the build date as `lastmod`.
pub fn render_sitemap(base_url: &str, entries: &[SitemapEntry], lastmod: NaiveDate) -> String {
    let lastmod = lastmod.format("%Y-%m-%d").to_string();

    let urls: String = entries
        .iter()
        .map(|entry| {
            format!(
                "  <url>\n    <loc>{}{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>monthly</changefreq>\n    <priority>{:.1}</priority>\n  </url>\n",
                html_escape(base_url),
                html_escape(&entry.path),
                lastmod,
                entry.priority
            )
        })
        .collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{}</urlset>\n",
        urls
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_sitemap() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let xml = render_sitemap(
            "https://expatsargentina.com",
            &[
                SitemapEntry::new("/", HOME_PRIORITY),
                SitemapEntry::new("/visas-matrix/work/india/", MATRIX_PRIORITY),
            ],
            date,
        );

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<loc>https://expatsargentina.com/</loc>"));
        assert!(xml.contains("<loc>https://expatsargentina.com/visas-matrix/work/india/</loc>"));
        assert!(xml.contains("<lastmod>2026-03-01</lastmod>"));
        assert!(xml.contains("<priority>0.6</priority>"));
        assert!(xml.contains("<priority>1.0</priority>"));
        assert_eq!(xml.matches("<url>").count(), 2);
    }

    #[test]
    fn test_empty_sitemap_is_well_formed() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let xml = render_sitemap("https://example.com", &[], date);
        assert!(xml.contains("<urlset"));
        assert!(xml.ends_with("</urlset>\n"));
    }
}
