//! Markdown content pages: every `*.md` under the content directory becomes
//! `/{slug}/index.html`.

use crate::render::{PageMeta, RenderOptions, render_layout};
use matrix_kit_core::SiteConfig;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Cannot read content file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot walk content directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A parsed markdown page
#[derive(Debug, Clone, PartialEq)]
pub struct ContentPage {
    /// Path relative to the content directory without extension, `/`-separated
    pub slug: String,
    pub title: String,
    /// Rendered body fragment
    pub html: String,
}

impl ContentPage {
    pub fn path(&self) -> String {
        format!("/{}/", self.slug)
    }

    pub fn output_file(&self) -> String {
        format!("{}/index.html", self.slug)
    }
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Text of the first level-one heading, if any
fn first_h1(markdown: &str) -> Option<String> {
    let mut in_h1 = false;
    let mut title = String::new();

    for event in Parser::new_ext(markdown, markdown_options()) {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) => in_h1 = true,
            Event::End(TagEnd::Heading(HeadingLevel::H1)) if in_h1 => {
                let trimmed = title.trim();
                return (!trimmed.is_empty()).then(|| trimmed.to_string());
            }
            Event::Text(text) | Event::Code(text) if in_h1 => title.push_str(&text),
            _ => {}
        }
    }

    None
}

/// `pet-importation` → `Pet Importation`
fn title_from_slug(slug: &str) -> String {
    let last = slug.rsplit('/').next().unwrap_or(slug);
    last.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Parse one markdown document
pub fn parse_content(slug: &str, markdown: &str) -> ContentPage {
    let title = first_h1(markdown).unwrap_or_else(|| title_from_slug(slug));

    let mut body = String::new();
    html::push_html(&mut body, Parser::new_ext(markdown, markdown_options()));

    ContentPage {
        slug: slug.to_string(),
        title,
        html: body,
    }
}

fn slug_for(dir: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(dir).ok()?.with_extension("");
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|s| s.starts_with('.') || s.starts_with('_'))
}

/// Load every markdown page under `dir`, sorted by path.
///
/// A missing directory is not an error; the site simply has no content pages.
pub fn load_content_pages(dir: &Path) -> Result<Vec<ContentPage>, ContentError> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "no content directory");
        return Ok(Vec::new());
    }

    let mut pages = Vec::new();
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }

        let Some(slug) = slug_for(dir, path) else {
            continue;
        };

        let markdown = fs::read_to_string(path).map_err(|source| ContentError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(slug = %slug, "loaded content page");
        pages.push(parse_content(&slug, &markdown));
    }

    Ok(pages)
}

/// Wrap a content page in the site layout
pub fn render_content_page(site: &SiteConfig, page: &ContentPage, options: RenderOptions) -> String {
    let meta = PageMeta {
        title: page.title.clone(),
        description: None,
        path: Some(page.path()),
    };
    let body = format!(r#"<article class="container prose">{}</article>"#, page.html);
    render_layout(site, &meta, &body, options)
}
