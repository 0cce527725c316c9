use serde::{Deserialize, Serialize};
use std::fmt;

/// Slug of the visa type whose pages get the Mercosur fast-track treatment
pub const MERCOSUR_VISA_SLUG: &str = "mercosur";

/// Geographic grouping used for "similar guides" cross-links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    NorthAmerica,
    Europe,
    LatinAmerica,
    Asia,
    Oceania,
    Africa,
}

impl Region {
    pub fn display_name(&self) -> &'static str {
        match self {
            Region::NorthAmerica => "North America",
            Region::Europe => "Europe",
            Region::LatinAmerica => "Latin America",
            Region::Asia => "Asia",
            Region::Oceania => "Oceania",
            Region::Africa => "Africa",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One nationality record from the reference table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nationality {
    pub slug: String,
    pub name: String,
    pub demonym: String,
    pub flag: String,
    pub region: Region,
    #[serde(default)]
    pub tax_treaty: bool,
    pub tourist: TouristEntry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mercosur: Option<MercosurStatus>,
    pub criminal_record: CriminalRecord,
}

impl Nationality {
    /// Visa-free tourist entry means no reciprocity fee is set
    pub fn has_visa_free_entry(&self) -> bool {
        !self.tourist.reciprocity_fee.unwrap_or(false)
    }

    pub fn is_mercosur_eligible(&self) -> bool {
        self.mercosur.as_ref().is_some_and(|m| m.eligible)
    }

    pub fn requires_apostilled_record(&self) -> bool {
        self.criminal_record.required && self.criminal_record.apostille
    }
}

/// Tourist entry conditions for a nationality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouristEntry {
    pub duration: String,
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reciprocity_fee: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_amount: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MercosurStatus {
    pub eligible: bool,
    pub notes: String,
}

/// Criminal-record document requirement for a nationality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriminalRecord {
    pub required: bool,
    pub apostille: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One visa type record from the reference table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisaType {
    pub slug: String,
    pub name: String,
    pub short_name: String,
    pub description: String,
    pub who_is_it_for: Vec<String>,
    #[serde(default)]
    pub requirements: Requirements,
    pub processing_time: String,
    pub duration: String,
    pub renewability: String,
    pub path_to_citizenship: String,
    pub documents: Vec<String>,
    /// The generic checklist already asks every applicant for an apostilled
    /// criminal-record check
    #[serde(default)]
    pub apostilled_record_listed: bool,
    pub costs: Costs,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub faq: Vec<Faq>,
}

impl VisaType {
    pub fn is_mercosur(&self) -> bool {
        self.slug == MERCOSUR_VISA_SLUG
    }
}

/// Requirement fields; each one is rendered only when present
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<Vec<String>>,
}

impl Requirements {
    pub fn is_empty(&self) -> bool {
        self.income.is_none()
            && self.employment.is_none()
            && self.investment.is_none()
            && self.other.as_ref().is_none_or(|o| o.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Costs {
    pub government_fee: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_fees: Option<String>,
    pub total_estimate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// Per-visa-type list of nationalities that get a generated page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub visa_type: String,
    pub nationalities: Vec<String>,
}

/// Declarative enumerator configuration (matrix.toml)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatrixConfig {
    #[serde(default)]
    pub membership: Vec<Membership>,
}

impl MatrixConfig {
    /// Total declared (visa type, nationality) entries, duplicates included
    pub fn declared_entries(&self) -> usize {
        self.membership.iter().map(|m| m.nationalities.len()).sum()
    }
}
