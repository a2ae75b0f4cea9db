//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::commands;
use super::output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "blueprint")]
#[command(version, about = "Check, scale and normalize factory blueprint documents")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text", env = "BLUEPRINT_FORMAT")]
    pub format: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show node health and system balance
    Check {
        /// Blueprint document (.json, .ron or .toml)
        file: PathBuf,

        /// Uniform scale factor applied before checking
        #[arg(long, short, default_value = "1", env = "BLUEPRINT_SCALE")]
        scale: f64,

        /// Only list nodes whose id, label, type or tier contains this text
        #[arg(long)]
        search: Option<String>,

        /// Fail if any node is not OK or anything was ignored
        #[arg(long)]
        strict: bool,
    },

    /// Show the item ledger only
    Items {
        /// Blueprint document (.json, .ron or .toml)
        file: PathBuf,

        /// Uniform scale factor applied before summing
        #[arg(long, short, default_value = "1", env = "BLUEPRINT_SCALE")]
        scale: f64,
    },

    /// Write a scaled copy of a blueprint as JSON
    Scale {
        /// Blueprint document (.json, .ron or .toml)
        file: PathBuf,

        /// Multiplier for machine counts and rates
        #[arg(long, short = 'k')]
        factor: f64,

        /// Output path (defaults to `<name>_x<factor>.json` next to the input)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Print to stdout instead of writing a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },

    /// Print a blueprint with every default applied
    Normalize {
        /// Blueprint document (.json, .ron or .toml)
        file: PathBuf,
    },
}

/// Parse arguments and run the selected command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let output = Output::new(cli.format);

    match cli.command {
        Commands::Check {
            file,
            scale,
            search,
            strict,
        } => commands::check(&output, &file, scale, search.as_deref(), strict),
        Commands::Items { file, scale } => commands::items(&output, &file, scale),
        Commands::Scale {
            file,
            factor,
            output: path,
            stdout,
        } => commands::scale(&output, &file, factor, path.as_deref(), stdout),
        Commands::Normalize { file } => commands::normalize(&output, &file),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A subscriber may already be installed when run from tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_check_with_scale() {
        let cli = Cli::try_parse_from(["blueprint", "check", "bp.json", "--scale", "3"]).unwrap();
        match cli.command {
            Commands::Check { scale, strict, .. } => {
                assert_eq!(scale, 3.0);
                assert!(!strict);
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn scale_requires_factor() {
        assert!(Cli::try_parse_from(["blueprint", "scale", "bp.json"]).is_err());
    }

    #[test]
    fn stdout_conflicts_with_output() {
        let result = Cli::try_parse_from([
            "blueprint", "scale", "bp.json", "-k", "2", "--stdout", "-o", "x.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn json_format_flag_is_global() {
        let cli = Cli::try_parse_from(["blueprint", "normalize", "bp.json", "--format", "json"])
            .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
