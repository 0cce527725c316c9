//! Per-combination content derivation.
//!
//! Every rule table below is evaluated in declaration order. Note and issue
//! rules are non-exclusive: each one that matches appends its text, so the
//! table order is the output order. Processing-time overrides are listed
//! highest precedence first and the first match wins.

use matrix_kit_core::{Nationality, VisaType};
use serde::Serialize;

/// Facts computed fresh for each page build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedContent {
    pub special_notes: Vec<String>,
    pub common_issues: Vec<String>,
    pub processing_time: String,
    pub is_mercosur: bool,
    pub has_visa_free: bool,
}

/// Inputs visible to every rule
pub struct RuleContext<'a> {
    pub visa: &'a VisaType,
    pub nationality: &'a Nationality,
    pub is_mercosur: bool,
    pub has_visa_free: bool,
}

impl<'a> RuleContext<'a> {
    pub fn new(visa: &'a VisaType, nationality: &'a Nationality) -> Self {
        Self {
            visa,
            nationality,
            is_mercosur: nationality.is_mercosur_eligible(),
            has_visa_free: nationality.has_visa_free_entry(),
        }
    }

    fn visa_is(&self, slug: &str) -> bool {
        self.visa.slug == slug
    }

    fn visa_in(&self, slugs: &[&str]) -> bool {
        slugs.contains(&self.visa.slug.as_str())
    }

    fn nationality_in(&self, slugs: &[&str]) -> bool {
        slugs.contains(&self.nationality.slug.as_str())
    }
}

/// Predicate plus text producer
pub struct TextRule {
    pub name: &'static str,
    pub applies: fn(&RuleContext) -> bool,
    pub text: fn(&RuleContext) -> String,
}

/// Replacement processing time for matching combinations
pub struct ProcessingOverride {
    pub name: &'static str,
    pub applies: fn(&RuleContext) -> bool,
    pub processing_time: &'static str,
}

const RETIREMENT_VISAS: &[&str] = &["rentista", "pensionado"];
const VISA_FREE_EASTERN_EUROPE: &[&str] = &["russia", "ukraine"];
const TOURIST_VISA_FIRST: &[&str] = &["india", "philippines"];
const STRONG_CURRENCY: &[&str] = &["united-states", "canada", "united-kingdom"];
const PENSION_QUALIFIES: &[&str] = &["united-states", "united-kingdom"];
const HUMANITARIAN: &[&str] = &["venezuela", "ukraine"];

pub const MERCOSUR_FAST_TRACK: &str = "15-30 days (fastest processing for Mercosur nationals)";
pub const HUMANITARIAN_EXPEDITED: &str = "30-60 days (expedited for humanitarian cases)";

pub static SPECIAL_NOTE_RULES: &[TextRule] = &[
    TextRule {
        name: "nomad-visa-free-explore",
        applies: |c| c.visa_is("digital-nomad") && c.nationality_in(VISA_FREE_EASTERN_EUROPE),
        text: |c| {
            format!(
                "{} citizens benefit from visa-free entry, making it easy to explore Argentina before committing to the Digital Nomad Visa.",
                c.nationality.name
            )
        },
    },
    TextRule {
        name: "nomad-tourist-visa-first",
        applies: |c| c.visa_is("digital-nomad") && c.nationality_in(TOURIST_VISA_FIRST),
        text: |_| {
            "You'll need to apply for a tourist visa first, then switch to Digital Nomad Visa within Argentina.".to_string()
        },
    },
    TextRule {
        name: "nomad-mercosur-alternative",
        applies: |c| c.visa_is("digital-nomad") && c.is_mercosur,
        text: |_| {
            "As a Mercosur national, you have easier pathways available, but the Digital Nomad Visa still offers benefits for those working remotely for foreign companies.".to_string()
        },
    },
    TextRule {
        name: "nomad-exchange-rate",
        applies: |c| c.visa_is("digital-nomad") && c.nationality_in(STRONG_CURRENCY),
        text: |c| {
            format!(
                "The strong USD/CAD/GBP to Argentine peso exchange rate makes Argentina extremely affordable for {} remote workers.",
                c.nationality.demonym
            )
        },
    },
    TextRule {
        name: "retirement-pension-qualifies",
        applies: |c| c.visa_in(RETIREMENT_VISAS) && c.nationality_in(PENSION_QUALIFIES),
        text: |c| {
            format!(
                "Social Security/pension income from {} qualifies easily for this visa category.",
                c.nationality.name
            )
        },
    },
    TextRule {
        name: "retirement-israeli-community",
        applies: |c| c.visa_in(RETIREMENT_VISAS) && c.nationality_in(&["israel"]),
        text: |_| {
            "Many Israeli retirees choose Argentina for its vibrant Jewish community and kosher infrastructure.".to_string()
        },
    },
    TextRule {
        name: "retirement-tax-treaty",
        applies: |c| c.visa_in(RETIREMENT_VISAS) && c.nationality.tax_treaty,
        text: |c| {
            format!(
                "The {}-Argentina tax treaty helps prevent double taxation on your pension/investment income.",
                c.nationality.name
            )
        },
    },
    TextRule {
        name: "work-in-demand",
        applies: |c| c.visa_is("work") && c.nationality_in(TOURIST_VISA_FIRST),
        text: |c| {
            format!(
                "{} professionals are in demand in Argentina's IT and healthcare sectors.",
                c.nationality.demonym
            )
        },
    },
    TextRule {
        name: "work-mercosur-no-sponsor",
        applies: |c| c.visa_is("work") && c.is_mercosur,
        text: |_| {
            "As a Mercosur national, you don't need employer sponsorship - you can work immediately upon obtaining Mercosur residency.".to_string()
        },
    },
    TextRule {
        name: "mercosur-eligible",
        applies: |c| c.visa.is_mercosur() && c.is_mercosur,
        text: |_| {
            "You're eligible for the Mercosur residency pathway, which is the fastest and most affordable route to living in Argentina.".to_string()
        },
    },
];

pub static COMMON_ISSUE_RULES: &[TextRule] = &[
    TextRule {
        name: "apostilled-criminal-record",
        applies: |c| c.nationality.requires_apostilled_record() && !c.visa.apostilled_record_listed,
        text: |c| {
            format!(
                "Obtaining your criminal record check with apostille from {}",
                c.nationality.name
            )
        },
    },
    TextRule {
        name: "tourist-visa-before-travel",
        applies: |c| !c.has_visa_free && !c.visa.is_mercosur(),
        text: |c| {
            format!(
                "Obtaining your tourist visa before travel (required for {}s)",
                c.nationality.demonym
            )
        },
    },
    TextRule {
        name: "nomad-income-proof",
        applies: |c| c.visa_is("digital-nomad") && c.nationality_in(TOURIST_VISA_FIRST),
        text: |_| {
            "Proving stable remote income in a format Argentine immigration accepts".to_string()
        },
    },
];

pub static PROCESSING_OVERRIDES: &[ProcessingOverride] = &[
    ProcessingOverride {
        name: "mercosur-fast-track",
        applies: |c| c.is_mercosur && c.visa.is_mercosur(),
        processing_time: MERCOSUR_FAST_TRACK,
    },
    ProcessingOverride {
        name: "humanitarian-expedited",
        applies: |c| c.nationality_in(HUMANITARIAN),
        processing_time: HUMANITARIAN_EXPEDITED,
    },
];

fn apply_text_rules(rules: &[TextRule], ctx: &RuleContext) -> Vec<String> {
    rules
        .iter()
        .filter(|rule| (rule.applies)(ctx))
        .inspect(|rule| tracing::trace!(rule = rule.name, "rule matched"))
        .map(|rule| (rule.text)(ctx))
        .collect()
}

fn processing_time(ctx: &RuleContext) -> String {
    PROCESSING_OVERRIDES
        .iter()
        .find(|o| (o.applies)(ctx))
        .map(|o| o.processing_time.to_string())
        .unwrap_or_else(|| ctx.visa.processing_time.clone())
}

/// Derive the display facts for one resolved combination. Never fails.
pub fn derive(visa: &VisaType, nationality: &Nationality) -> DerivedContent {
    let ctx = RuleContext::new(visa, nationality);

    DerivedContent {
        special_notes: apply_text_rules(SPECIAL_NOTE_RULES, &ctx),
        common_issues: apply_text_rules(COMMON_ISSUE_RULES, &ctx),
        processing_time: processing_time(&ctx),
        is_mercosur: ctx.is_mercosur,
        has_visa_free: ctx.has_visa_free,
    }
}
