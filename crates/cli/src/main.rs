// prosumer-import CLI - joins a generator registry onto a CRM deal export
// and writes the bulk-import file

mod exit_codes;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{ErrorOutput, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "prosumer-import")]
#[command(about = "Reconcile a generator registry with a CRM deal list into a bulk-import CSV")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join, remap and clean the two exports; write the bulk-import CSV
    #[command(after_help = "\
Examples:
  prosumer-import run geradores.xlsx negocios.csv
  prosumer-import run geradores.xlsx negocios.csv -o importacao.csv
  prosumer-import run geradores.xlsx negocios.csv --sheet Plan1 --json
  prosumer-import run geradores.csv negocios.csv --config mapeamento.toml --strict
  prosumer-import run geradores.csv negocios.csv --on-duplicate error --fail-on-unmatched

Exit codes:
  0  success
  3  input error (unreadable file, missing key column)
  4  invalid config
  5  unmatched deals (with --fail-on-unmatched)
  6  strict mode recorded defaulted values
  7  duplicate generator keys (with --on-duplicate error)")]
    Run(recon::RunArgs),

    /// Validate a mapping config without running
    #[command(after_help = "\
Examples:
  prosumer-import validate mapeamento.toml")]
    Validate {
        /// Path to the mapping .toml file
        config: PathBuf,
    },

    /// Print the built-in mapping config as TOML
    #[command(after_help = "\
Examples:
  prosumer-import config > mapeamento.toml")]
    Config,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nbuild:   ", env!("BUILD_PROFILE"),
        "\ntarget:  ", env!("BUILD_TARGET"),
    )
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (result, json) = match cli.command {
        Commands::Run(args) => {
            let json = args.json;
            (recon::cmd_run(args), json)
        }
        Commands::Validate { config } => (recon::cmd_validate(config), false),
        Commands::Config => (recon::cmd_config(), false),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                ErrorOutput::new(code, &message, hint.as_deref()).print(json);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
