pub mod build;
pub mod init;
pub mod inspect;
pub mod preview;
pub mod validate;

use anyhow::{Context, Result};
use matrix_kit_core::Site;
use matrix_kit_core::config::SITE_TOML;
use std::path::Path;

/// Load a site directory, with hints when it has not been initialized
pub fn load_site_dir(path: &Path) -> Result<Site> {
    if !path.exists() {
        anyhow::bail!(
            "Site directory does not exist: {}\nRun 'matrix-kit init {}' first",
            path.display(),
            path.display()
        );
    }

    if !path.join(SITE_TOML).exists() {
        anyhow::bail!(
            "{} not found in {}\nRun 'matrix-kit init {}' first",
            SITE_TOML,
            path.display(),
            path.display()
        );
    }

    matrix_kit_core::load_site(path)
        .with_context(|| format!("Failed to load site at {}", path.display()))
}
