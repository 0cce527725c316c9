use crate::error::{Error, Result};
use crate::types::{MatrixConfig, Nationality, Region, VisaType};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Deserialize)]
struct NationalityFile {
    #[serde(default)]
    nationality: Vec<Nationality>,
}

#[derive(Debug, Deserialize)]
struct VisaTypeFile {
    #[serde(default)]
    visa_type: Vec<VisaType>,
}

/// Why a (visa type, nationality) pair failed to resolve
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("unknown visa type '{0}'")]
    UnknownVisaType(String),

    #[error("unknown nationality '{0}'")]
    UnknownNationality(String),
}

/// Immutable reference data, loaded once and shared by reference
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    nationalities: Vec<Nationality>,
    visa_types: Vec<VisaType>,
}

impl ReferenceTables {
    pub fn new(nationalities: Vec<Nationality>, visa_types: Vec<VisaType>) -> Self {
        Self {
            nationalities,
            visa_types,
        }
    }

    pub fn nationalities(&self) -> &[Nationality] {
        &self.nationalities
    }

    pub fn visa_types(&self) -> &[VisaType] {
        &self.visa_types
    }

    /// Exact, case-sensitive slug match. First record wins on duplicates.
    pub fn nationality(&self, slug: &str) -> Option<&Nationality> {
        self.nationalities.iter().find(|n| n.slug == slug)
    }

    /// Exact, case-sensitive slug match. First record wins on duplicates.
    pub fn visa_type(&self, slug: &str) -> Option<&VisaType> {
        self.visa_types.iter().find(|v| v.slug == slug)
    }

    /// Resolve both halves of a combination; the visa type is checked first
    pub fn resolve(
        &self,
        visa_slug: &str,
        nationality_slug: &str,
    ) -> std::result::Result<(&VisaType, &Nationality), LookupError> {
        let visa = self
            .visa_type(visa_slug)
            .ok_or_else(|| LookupError::UnknownVisaType(visa_slug.to_string()))?;
        let nationality = self
            .nationality(nationality_slug)
            .ok_or_else(|| LookupError::UnknownNationality(nationality_slug.to_string()))?;
        Ok((visa, nationality))
    }

    /// Nationalities in a region, in table order
    pub fn nationalities_in_region(&self, region: Region) -> impl Iterator<Item = &Nationality> {
        self.nationalities.iter().filter(move |n| n.region == region)
    }
}

/// Parse a nationalities table (`[[nationality]]` records)
pub fn parse_nationalities_str(content: &str) -> Result<Vec<Nationality>> {
    let file: NationalityFile = parse_table(content, "nationalities")?;
    Ok(file.nationality)
}

/// Parse a visa types table (`[[visa_type]]` records)
pub fn parse_visa_types_str(content: &str) -> Result<Vec<VisaType>> {
    let file: VisaTypeFile = parse_table(content, "visa types")?;
    Ok(file.visa_type)
}

/// Parse the membership lists (`[[membership]]` records)
pub fn parse_matrix_str(content: &str) -> Result<MatrixConfig> {
    parse_table(content, "membership lists")
}

fn parse_table<T: serde::de::DeserializeOwned>(content: &str, what: &str) -> Result<T> {
    toml::from_str(content).map_err(|e| Error::InvalidData(format!("{}: {}", what, e)))
}

/// Build tables from the two TOML documents
pub fn load_tables(nationalities_toml: &str, visa_types_toml: &str) -> Result<ReferenceTables> {
    let nationalities = parse_nationalities_str(nationalities_toml)?;
    let visa_types = parse_visa_types_str(visa_types_toml)?;
    tracing::debug!(
        nationalities = nationalities.len(),
        visa_types = visa_types.len(),
        "loaded reference tables"
    );
    Ok(ReferenceTables::new(nationalities, visa_types))
}
