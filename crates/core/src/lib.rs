pub mod config;
pub mod defaults;
pub mod error;
pub mod tables;
pub mod types;

pub use config::{Site, SiteConfig, load_site};
pub use error::{Error, Result};
pub use tables::{LookupError, ReferenceTables};
pub use types::*;
