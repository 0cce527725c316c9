//! Bundled dataset written by `matrix-kit init`.

pub const NATIONALITIES_TOML: &str = include_str!("../data/nationalities.toml");
pub const VISA_TYPES_TOML: &str = include_str!("../data/visa_types.toml");
pub const MATRIX_TOML: &str = include_str!("../data/matrix.toml");

pub const REMOTE_WORK_MD: &str = include_str!("../data/content/remote-work.md");
pub const PET_IMPORTATION_MD: &str = include_str!("../data/content/pet-importation.md");

/// Content pages scaffolded by `init`, as (file name, markdown)
pub const CONTENT_PAGES: &[(&str, &str)] = &[
    ("remote-work.md", REMOTE_WORK_MD),
    ("pet-importation.md", PET_IMPORTATION_MD),
];
