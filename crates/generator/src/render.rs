//! HTML templates. Every interpolated value goes through [`html_escape`].

use crate::derive::DerivedContent;
use crate::matrix::{MATRIX_PREFIX, matrix_path};
use matrix_kit_core::{Nationality, SiteConfig, VisaType};

/// Knobs shared by every template
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Adds the preview badge and the SSE reload script
    pub preview: bool,
}

/// Head metadata for one document
#[derive(Debug, Clone)]
pub struct PageMeta {
    pub title: String,
    pub description: Option<String>,
    /// Site-relative path used for the canonical link
    pub path: Option<String>,
}

/// Everything the matrix page template needs
pub struct MatrixPageView<'a> {
    pub visa: &'a VisaType,
    pub nationality: &'a Nationality,
    pub derived: &'a DerivedContent,
    pub siblings: &'a [&'a Nationality],
}

/// One visa type and the nationalities it has pages for
pub struct IndexGroup<'a> {
    pub visa: &'a VisaType,
    pub nationalities: Vec<&'a Nationality>,
}

/// A link on the home page
pub struct ContentLink {
    pub title: String,
    pub path: String,
}

/// HTML-escape a string to prevent XSS attacks
///
/// Escapes: & < > " '
pub fn html_escape(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#x27;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

fn list_items(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("<li>{}</li>", html_escape(item)))
        .collect()
}

/// Wrap a body in the shared document shell
pub fn render_layout(
    site: &SiteConfig,
    meta: &PageMeta,
    body: &str,
    options: RenderOptions,
) -> String {
    let description = meta
        .description
        .as_deref()
        .map(|d| {
            format!(
                r#"<meta name="description" content="{}">"#,
                html_escape(d)
            )
        })
        .unwrap_or_default();

    let canonical = meta
        .path
        .as_deref()
        .map(|p| {
            format!(
                r#"<link rel="canonical" href="{}{}">"#,
                html_escape(&site.base_url),
                html_escape(p)
            )
        })
        .unwrap_or_default();

    let preview_badge = if options.preview {
        r#"<div class="preview-badge">PREVIEW MODE - Live Reload Active</div>"#
    } else {
        ""
    };

    let reload_script = if options.preview {
        r#"<script>
        const eventSource = new EventSource('/_reload');
        eventSource.onmessage = () => location.reload();
        eventSource.onerror = () => eventSource.close();
    </script>"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} | {site}</title>
    {description}
    {canonical}
    <link rel="stylesheet" href="/style.css">
</head>
<body>
    {preview_badge}
    <header class="site-header"><a href="/">{site}</a></header>
    {body}
    <footer class="site-footer">{site}</footer>
    {reload_script}
</body>
</html>"#,
        lang = html_escape(&site.language),
        title = html_escape(&meta.title),
        site = html_escape(&site.title),
        description = description,
        canonical = canonical,
        preview_badge = preview_badge,
        body = body,
        reload_script = reload_script,
    )
}

/// Head metadata for a combination page
pub fn matrix_page_meta(visa: &VisaType, nationality: &Nationality) -> PageMeta {
    PageMeta {
        title: format!(
            "{} Visa for {}s: Complete Argentina Guide",
            visa.short_name, nationality.demonym
        ),
        description: Some(format!(
            "Complete guide to the {} for {} citizens moving to Argentina. Requirements, costs, timeline, and step-by-step process tailored for {}.",
            visa.name, nationality.demonym, nationality.name
        )),
        path: Some(matrix_path(&visa.slug, &nationality.slug)),
    }
}

/// Render one combination page
pub fn render_matrix_page(
    site: &SiteConfig,
    view: &MatrixPageView,
    options: RenderOptions,
) -> String {
    let body = format!(
        r#"{hero}
    <div class="container layout">
        <main>
            {overview}
            {audience}
            {requirements}
            {documents}
            {timeline}
            {costs}
            {pros_cons}
            {faq}
        </main>
        {sidebar}
    </div>
    {navigation}"#,
        hero = hero_section(view),
        overview = overview_section(view),
        audience = audience_section(view.visa),
        requirements = requirements_section(view),
        documents = documents_section(view),
        timeline = timeline_section(view),
        costs = costs_section(view.visa),
        pros_cons = pros_cons_section(view.visa),
        faq = faq_section(view.visa),
        sidebar = sidebar(view),
        navigation = navigation(view.nationality),
    );

    render_layout(
        site,
        &matrix_page_meta(view.visa, view.nationality),
        &body,
        options,
    )
}

fn hero_section(view: &MatrixPageView) -> String {
    let visa = view.visa;
    let nat = view.nationality;

    let mercosur_badge = if view.derived.is_mercosur {
        r#"<span class="badge mercosur">Mercosur Member</span>"#
    } else {
        ""
    };

    format!(
        r#"<section class="hero">
        <div class="container">
            <nav class="breadcrumb">
                <a href="/">Home</a> / <a href="/visas/">Visas</a> /
                <a href="/visas/{visa_slug}/">{short}</a> / <span>{nat_name}</span>
            </nav>
            <div><span class="flag">{flag}</span><span class="badge">{short} Visa</span>{mercosur_badge}</div>
            <h1>{short} Visa for {demonym}s</h1>
            <p class="lead">Complete guide to obtaining the {visa_name} as a {demonym} citizen.
            Specific requirements, timeline, and process for {nat_name} passport holders.</p>
        </div>
    </section>"#,
        visa_slug = html_escape(&visa.slug),
        short = html_escape(&visa.short_name),
        visa_name = html_escape(&visa.name),
        nat_name = html_escape(&nat.name),
        demonym = html_escape(&nat.demonym),
        flag = html_escape(&nat.flag),
        mercosur_badge = mercosur_badge,
    )
}

/// Entry sentence for the overview; exactly one variant per nationality
pub fn entry_status_sentence(nationality: &Nationality, has_visa_free: bool) -> String {
    if has_visa_free {
        format!(
            "As a {} citizen, you have visa-free entry to Argentina for 90 days, which gives you time to prepare this application.",
            nationality.demonym
        )
    } else {
        format!(
            "As a {} citizen, you need a tourist visa to enter Argentina, so plan your entry before starting this application.",
            nationality.demonym
        )
    }
}

fn overview_section(view: &MatrixPageView) -> String {
    let demonym = html_escape(&view.nationality.demonym);

    let notes = if view.derived.special_notes.is_empty() {
        String::new()
    } else {
        format!(
            r#"<div class="notes">
                <p><strong>Special Considerations for {}s:</strong></p>
                <ul class="special-notes">{}</ul>
            </div>"#,
            demonym,
            list_items(&view.derived.special_notes)
        )
    };

    format!(
        r#"<section class="overview">
                <h2>Overview for {demonym} Citizens</h2>
                <p>{description}</p>
                <p class="entry-status">{entry}</p>
                {notes}
            </section>"#,
        demonym = demonym,
        description = html_escape(&view.visa.description),
        entry = html_escape(&entry_status_sentence(
            view.nationality,
            view.derived.has_visa_free
        )),
        notes = notes,
    )
}

fn audience_section(visa: &VisaType) -> String {
    format!(
        r#"<section class="audience">
                <h2>Is This Visa Right for You?</h2>
                <p>The {} Visa is designed for:</p>
                <ul class="checklist">{}</ul>
            </section>"#,
        html_escape(&visa.short_name),
        list_items(&visa.who_is_it_for)
    )
}

fn requirement_block(label: &str, value: &str) -> String {
    format!(
        r#"<div class="requirement"><p class="label">{}</p><p>{}</p></div>"#,
        label,
        html_escape(value)
    )
}

/// Only the fields a visa type sets are shown; with none set the section is
/// left out
fn requirements_section(view: &MatrixPageView) -> String {
    let req = &view.visa.requirements;
    if req.is_empty() {
        return String::new();
    }

    let mut blocks = String::new();

    if let Some(income) = &req.income {
        blocks.push_str(&requirement_block("Income Requirement", income));
    }
    if let Some(employment) = &req.employment {
        blocks.push_str(&requirement_block("Employment", employment));
    }
    if let Some(investment) = &req.investment {
        blocks.push_str(&requirement_block("Investment", investment));
    }
    if let Some(other) = req.other.as_ref().filter(|o| !o.is_empty()) {
        blocks.push_str(&format!(
            r#"<div class="requirement"><p class="label">Additional Requirements</p><ul class="plain">{}</ul></div>"#,
            list_items(other)
        ));
    }

    format!(
        r#"<section class="requirements">
                <h2>Requirements for {}s</h2>
                <div class="card">{}</div>
            </section>"#,
        html_escape(&view.nationality.demonym),
        blocks
    )
}

/// Criminal-record checklist entry for a nationality, if one is required
pub fn criminal_record_entry(nationality: &Nationality) -> Option<String> {
    let record = &nationality.criminal_record;
    if !record.required {
        return None;
    }

    let mut entry = format!("Criminal background check from {}", nationality.name);
    if record.apostille {
        entry.push_str(" (apostilled)");
    }
    if let Some(notes) = &record.notes {
        entry.push_str(" - ");
        entry.push_str(notes);
    }
    Some(entry)
}

fn documents_section(view: &MatrixPageView) -> String {
    let mut items = list_items(&view.visa.documents);
    if let Some(entry) = criminal_record_entry(view.nationality) {
        items.push_str(&format!(
            r#"<li class="nationality-record">{}</li>"#,
            html_escape(&entry)
        ));
    }

    format!(
        r#"<section class="documents">
                <h2>Document Checklist for {demonym}s</h2>
                <div class="card">
                    <p>As a {demonym} citizen, you'll need these documents:</p>
                    <ul class="checklist">{items}</ul>
                </div>
            </section>"#,
        demonym = html_escape(&view.nationality.demonym),
        items = items,
    )
}

fn timeline_section(view: &MatrixPageView) -> String {
    let nat = view.nationality;
    let name = html_escape(&nat.name);
    let demonym = html_escape(&nat.demonym);

    let entry_step = if view.derived.has_visa_free {
        format!(
            "{}s can enter visa-free for 90 days. Use this time to prepare your application.",
            demonym
        )
    } else {
        format!(
            "Apply for a tourist visa at the Argentine embassy in {}, then travel to Argentina.",
            name
        )
    };

    let apostille_hint = if nat.requires_apostilled_record() {
        format!(
            " Note: Documents must be apostilled in {} before travel.",
            name
        )
    } else {
        String::new()
    };

    format!(
        r#"<section class="timeline">
                <h2>Timeline &amp; Process</h2>
                <div class="facts">
                    <div class="card"><p class="label">Processing Time</p><p class="processing-time">{processing}</p></div>
                    <div class="card"><p class="label">Visa Duration</p><p>{duration}</p></div>
                    <div class="card"><p class="label">Path to Citizenship</p><p>{citizenship}</p></div>
                </div>
                <div class="card">
                    <h3>Step-by-Step Process</h3>
                    <ol class="steps">
                        <li><strong>Entry to Argentina</strong><p>{entry_step}</p></li>
                        <li><strong>Gather Documents</strong><p>Obtain all required documents from {name}.{apostille_hint}</p></li>
                        <li><strong>Submit Application</strong><p>Apply at the Dirección Nacional de Migraciones (DNM) in Buenos Aires or your local migraciones office.</p></li>
                        <li><strong>Receive Precaria</strong><p>You'll receive a temporary authorization (precaria) allowing you to stay legally while processing.</p></li>
                        <li><strong>Collect Residency Card</strong><p>Once approved, collect your DNI (residency card) and enjoy your new life in Argentina!</p></li>
                    </ol>
                </div>
            </section>"#,
        processing = html_escape(&view.derived.processing_time),
        duration = html_escape(&view.visa.duration),
        citizenship = html_escape(&view.visa.path_to_citizenship),
        entry_step = entry_step,
        name = name,
        apostille_hint = apostille_hint,
    )
}

fn costs_section(visa: &VisaType) -> String {
    let legal = visa
        .costs
        .legal_fees
        .as_deref()
        .map(|fees| {
            format!(
                r#"<div class="row"><span>Legal Fees (optional)</span><span>{}</span></div>"#,
                html_escape(fees)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<section class="costs">
                <h2>Costs</h2>
                <div class="card">
                    <div class="row"><span>Government Fee</span><span>{}</span></div>
                    {}
                    <div class="row total"><span>Total Estimated Cost</span><span>{}</span></div>
                </div>
            </section>"#,
        html_escape(&visa.costs.government_fee),
        legal,
        html_escape(&visa.costs.total_estimate)
    )
}

fn pros_cons_section(visa: &VisaType) -> String {
    format!(
        r#"<section class="pros-cons-section">
                <h2>Pros &amp; Cons</h2>
                <div class="pros-cons">
                    <div class="card pros"><h3>Advantages</h3><ul class="plain">{}</ul></div>
                    <div class="card cons"><h3>Considerations</h3><ul class="plain">{}</ul></div>
                </div>
            </section>"#,
        list_items(&visa.pros),
        list_items(&visa.cons)
    )
}

fn faq_section(visa: &VisaType) -> String {
    let faqs: String = visa
        .faq
        .iter()
        .map(|faq| {
            format!(
                r#"<details class="card faq"><summary><h3>{}</h3></summary><p>{}</p></details>"#,
                html_escape(&faq.question),
                html_escape(&faq.answer)
            )
        })
        .collect();

    format!(
        r#"<section class="faqs">
                <h2>Frequently Asked Questions</h2>
                {}
            </section>"#,
        faqs
    )
}

fn sidebar(view: &MatrixPageView) -> String {
    let visa = view.visa;
    let nat = view.nationality;

    let entry = if view.derived.has_visa_free {
        "Visa-free (90 days)"
    } else {
        "Tourist visa required"
    };

    let issues = if view.derived.common_issues.is_empty() {
        String::new()
    } else {
        format!(
            r#"<div class="card">
                <h3>Common Issues for {}s</h3>
                <ul class="plain issues">{}</ul>
            </div>"#,
            html_escape(&nat.demonym),
            list_items(&view.derived.common_issues)
        )
    };

    let siblings: String = view
        .siblings
        .iter()
        .map(|s| {
            format!(
                r#"<a href="{}">{} {}</a>"#,
                html_escape(&matrix_path(&visa.slug, &s.slug)),
                html_escape(&s.flag),
                html_escape(&s.name)
            )
        })
        .collect();

    format!(
        r#"<aside>
            <div class="card quick">
                <h3>Quick Overview</h3>
                <p class="label">Visa Type</p><p>{visa_name}</p>
                <p class="label">For Citizens Of</p><p>{flag} {nat_name}</p>
                <p class="label">Entry Requirement</p><p class="entry-requirement">{entry}</p>
                <p class="label">Processing Time</p><p>{processing}</p>
            </div>
            {issues}
            <div class="card siblings">
                <h3>Similar Guides</h3>
                {siblings}
            </div>
        </aside>"#,
        visa_name = html_escape(&visa.name),
        flag = html_escape(&nat.flag),
        nat_name = html_escape(&nat.name),
        entry = entry,
        processing = html_escape(&view.derived.processing_time),
        issues = issues,
        siblings = siblings,
    )
}

fn navigation(nationality: &Nationality) -> String {
    format!(
        r#"<div class="container nav-footer">
        <a href="/nationality/{}/">&larr; Back to {} Guide</a>
        <a href="/visas/">All Visa Options</a>
    </div>"#,
        html_escape(&nationality.slug),
        html_escape(&nationality.name)
    )
}

/// Listing of every generated combination, grouped by visa type
pub fn render_matrix_index(
    site: &SiteConfig,
    groups: &[IndexGroup],
    options: RenderOptions,
) -> String {
    let sections: String = groups
        .iter()
        .map(|group| {
            let links: String = group
                .nationalities
                .iter()
                .map(|n| {
                    format!(
                        r#"<li><a href="{}">{} {}</a></li>"#,
                        html_escape(&matrix_path(&group.visa.slug, &n.slug)),
                        html_escape(&n.flag),
                        html_escape(&n.name)
                    )
                })
                .collect();
            format!(
                r#"<h2>{} Visa</h2><ul>{}</ul>"#,
                html_escape(&group.visa.short_name),
                links
            )
        })
        .collect();

    let body = format!(
        r#"<div class="container matrix-index">
        <h1>Visa Guides by Nationality</h1>
        {}
    </div>"#,
        sections
    );

    let meta = PageMeta {
        title: "Visa Guides by Nationality".to_string(),
        description: Some(
            "Argentina visa requirements for every visa type, tailored to your nationality."
                .to_string(),
        ),
        path: Some(format!("{}/", MATRIX_PREFIX)),
    };

    render_layout(site, &meta, &body, options)
}

/// Home page linking the matrix index and every content page
pub fn render_home(site: &SiteConfig, pages: &[ContentLink], options: RenderOptions) -> String {
    let links: String = pages
        .iter()
        .map(|p| {
            format!(
                r#"<li><a href="{}">{}</a></li>"#,
                html_escape(&p.path),
                html_escape(&p.title)
            )
        })
        .collect();

    let body = format!(
        r#"<div class="container prose">
        <h1>{title}</h1>
        <p><a href="{prefix}/">Visa guides by nationality</a></p>
        <ul>{links}</ul>
    </div>"#,
        title = html_escape(&site.title),
        prefix = MATRIX_PREFIX,
        links = links,
    );

    let meta = PageMeta {
        title: "Home".to_string(),
        description: None,
        path: Some("/".to_string()),
    };

    render_layout(site, &meta, &body, options)
}

/// The not-found result for unknown or unlisted paths
pub fn render_not_found(site: &SiteConfig, options: RenderOptions) -> String {
    let body = format!(
        r#"<div class="container prose not-found">
        <h1>Page Not Found</h1>
        <p>Looks like you took a wrong turn. This page doesn't exist, but there's plenty to explore across Argentina.</p>
        <p><a href="/">Go Home</a> &middot; <a href="{}/">Browse visa guides</a></p>
    </div>"#,
        MATRIX_PREFIX
    );

    let meta = PageMeta {
        title: "Not Found".to_string(),
        description: None,
        path: None,
    };

    render_layout(site, &meta, &body, options)
}
