mod commands;
mod logging;

use clap::{ArgAction, CommandFactory, Parser};
use clap_complete::{Shell, generate};
use logging::{LogConfig, LogFormat};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "matrix-kit")]
#[command(version, about = "Static site generator for visa-by-nationality guides", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Diagnostic log format on stderr
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Initialize a new site directory with the bundled dataset
    Init {
        /// Path to the site directory (created if missing)
        path: PathBuf,

        /// Site title written to site.toml
        #[arg(long)]
        title: Option<String>,

        /// Base URL written to site.toml
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Validate reference data and membership lists
    Validate {
        /// Path to site directory
        path: PathBuf,
    },

    /// Preview site locally with hot reload
    Preview {
        /// Path to site directory
        path: PathBuf,

        /// Port to serve on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Build the static site
    Build {
        /// Path to site directory
        path: PathBuf,

        /// Output directory for generated site
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the derived content for one combination as JSON
    Inspect {
        /// Path to site directory
        path: PathBuf,

        /// Visa type slug, e.g. digital-nomad
        visa_type: String,

        /// Nationality slug, e.g. united-states
        nationality: String,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init_logging(&LogConfig::from_verbosity(cli.verbose).with_format(cli.log_format));

    match cli.command {
        Command::Init {
            path,
            title,
            base_url,
        } => commands::init::run(path, title, base_url).await,
        Command::Validate { path } => commands::validate::run(path).await,
        Command::Preview { path, port } => commands::preview::run(path, port).await,
        Command::Build { path, output } => commands::build::run(path, output).await,
        Command::Inspect {
            path,
            visa_type,
            nationality,
        } => commands::inspect::run(path, visa_type, nationality).await,
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "matrix-kit", &mut io::stdout());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "matrix-kit",
            "build",
            "site",
            "-o",
            "dist",
            "-vv",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Command::Build { .. }));
    }

    #[test]
    fn test_inspect_arguments() {
        let cli =
            Cli::try_parse_from(["matrix-kit", "inspect", "site", "work", "india"]).unwrap();
        match cli.command {
            Command::Inspect {
                visa_type,
                nationality,
                ..
            } => {
                assert_eq!(visa_type, "work");
                assert_eq!(nationality, "india");
            }
            _ => panic!("expected inspect"),
        }
    }
}
