//! Diagnostic logging on stderr via `tracing-subscriber`.
//!
//! User-facing progress stays on stdout through `println!`; events from the
//! library crates (per-page debug, skipped pages, build summary) go here.
//! `RUST_LOG` overrides the level picked from `-v`.

use clap::ValueEnum;
use std::io;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable multi-field output
    #[default]
    Pretty,
    /// Single-line output
    Compact,
    /// JSON lines for machine parsing
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    pub with_ansi: bool,
}

impl LogConfig {
    /// - 0 (no `-v`): warn
    /// - 1 (`-v`): info
    /// - 2 (`-vv`): debug
    /// - 3+: trace
    #[must_use]
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            format: LogFormat::default(),
            with_ansi: true,
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Install the global subscriber. Call once at startup.
pub fn init_logging(config: &LogConfig) {
    let filter = build_env_filter(config.level);

    match config.format {
        LogFormat::Json => {
            let layer = fmt::layer().json().with_writer(io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .init();
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_writer(io::stderr)
                .with_ansi(config.with_ansi)
                .with_target(false)
                .without_time();
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .init();
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(config.with_ansi)
                .with_target(false)
                .without_time();
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .init();
        }
    }
}

fn filter_directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    // Third-party crates stay at warn unless RUST_LOG says otherwise
    format!(
        "warn,matrix_kit={level},matrix_kit_core={level},matrix_kit_generator={level},\
         matrix_kit_validator={level},tower_http={level}",
        level = level
    )
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directives(level)))
}
