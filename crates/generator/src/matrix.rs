//! Combination enumerator: flattens the per-visa-type membership lists into
//! the finite set of pages to materialize.

use matrix_kit_core::MatrixConfig;
use serde::Serialize;
use std::collections::HashSet;

/// URL prefix shared by every generated combination page
pub const MATRIX_PREFIX: &str = "/visas-matrix";

/// A (visa type, nationality) pair selected for page generation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Combination {
    pub visa_type: String,
    pub nationality: String,
}

impl Combination {
    pub fn new(visa_type: impl Into<String>, nationality: impl Into<String>) -> Self {
        Self {
            visa_type: visa_type.into(),
            nationality: nationality.into(),
        }
    }

    /// Public URL path, e.g. `/visas-matrix/work/india/`
    pub fn path(&self) -> String {
        matrix_path(&self.visa_type, &self.nationality)
    }

    /// Output file relative to the build directory
    pub fn output_file(&self) -> String {
        format!(
            "visas-matrix/{}/{}/index.html",
            self.visa_type, self.nationality
        )
    }
}

pub fn matrix_path(visa_type: &str, nationality: &str) -> String {
    format!("{}/{}/{}/", MATRIX_PREFIX, visa_type, nationality)
}

/// Enumerate every combination in declaration order.
///
/// Pure function of the configuration. A pair declared more than once yields
/// a single combination at its first position.
pub fn enumerate(matrix: &MatrixConfig) -> Vec<Combination> {
    let mut seen = HashSet::new();
    let mut combinations = Vec::with_capacity(matrix.declared_entries());

    for membership in &matrix.membership {
        for nationality in &membership.nationalities {
            let combination = Combination::new(&membership.visa_type, nationality);
            if seen.insert(combination.clone()) {
                combinations.push(combination);
            } else {
                tracing::warn!(
                    visa_type = %membership.visa_type,
                    nationality = %nationality,
                    "duplicate combination in membership lists"
                );
            }
        }
    }

    combinations
}

/// Membership check used to turn unlisted requests into not-found results
#[derive(Debug, Clone, Default)]
pub struct MatrixIndex {
    pairs: HashSet<(String, String)>,
}

impl MatrixIndex {
    pub fn new(matrix: &MatrixConfig) -> Self {
        let pairs = matrix
            .membership
            .iter()
            .flat_map(|m| {
                m.nationalities
                    .iter()
                    .map(move |n| (m.visa_type.clone(), n.clone()))
            })
            .collect();
        Self { pairs }
    }

    pub fn contains(&self, visa_type: &str, nationality: &str) -> bool {
        self.pairs
            .contains(&(visa_type.to_string(), nationality.to_string()))
    }
}
