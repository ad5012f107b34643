//! `prosumer-import run|validate|config`: join, remap, clean, write.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use prosumer_recon::model::{KeySamples, SampleRow};
use prosumer_recon::{DuplicatePolicy, ReconConfig, ReconError, ReconResult};

use crate::exit_codes::{
    recon_exit_code, EXIT_CONFIG, EXIT_ERROR, EXIT_INPUT, EXIT_STRICT, EXIT_UNMATCHED,
};
use crate::CliError;

#[derive(Args)]
pub struct RunArgs {
    /// Generator registry export (.xlsx/.xls/.ods or delimited text)
    pub generators: PathBuf,

    /// CRM deal export (delimited text or spreadsheet)
    pub deals: PathBuf,

    /// Bulk-import CSV to write
    #[arg(long, short = 'o', default_value = "resultado.csv")]
    pub output: PathBuf,

    /// Mapping config (.toml); built-in mapping when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Sheet to read from a spreadsheet input (default: first sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// What to do when a generator key occurs more than once
    #[arg(long, value_enum)]
    pub on_duplicate: Option<OnDuplicate>,

    /// Report every value a cleaning rule had to default (exit 6 if any)
    #[arg(long)]
    pub strict: bool,

    /// Matched rows shown in the report
    #[arg(long, value_name = "N")]
    pub sample: Option<usize>,

    /// Output the JSON report to stdout instead of the human summary
    #[arg(long)]
    pub json: bool,

    /// Write the JSON report to file
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Exit 5 when any deal has no generator match
    #[arg(long)]
    pub fail_on_unmatched: bool,

    /// Suppress the human summary
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OnDuplicate {
    /// First generator row in file order wins
    FirstMatch,
    /// Abort with exit 7
    Error,
}

impl From<OnDuplicate> for DuplicatePolicy {
    fn from(value: OnDuplicate) -> Self {
        match value {
            OnDuplicate::FirstMatch => DuplicatePolicy::FirstMatch,
            OnDuplicate::Error => DuplicatePolicy::Error,
        }
    }
}

fn recon_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn engine_err(err: ReconError) -> CliError {
    let code = recon_exit_code(&err);
    let hint = match &err {
        ReconError::MissingKeyColumn { .. } => {
            Some("set the key column names in a --config file (see `prosumer-import config`)")
        }
        ReconError::DuplicateKeys(_) => {
            Some("deduplicate the generator export or run with --on-duplicate first-match")
        }
        _ => None,
    };
    let cli_err = recon_err(code, err.to_string());
    match hint {
        Some(hint) => cli_err.with_hint(hint),
        None => cli_err,
    }
}

fn load_config(path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = std::fs::read_to_string(path).map_err(|e| {
        recon_err(EXIT_CONFIG, format!("cannot read config {}: {e}", path.display()))
    })?;
    ReconConfig::from_toml(&config_str).map_err(engine_err)
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let mut config = match &args.config {
        Some(path) => {
            log::debug!("mapping config: {}", path.display());
            load_config(path)?
        }
        None => {
            log::debug!("mapping config: built-in");
            ReconConfig::default()
        }
    };
    if let Some(policy) = args.on_duplicate {
        config.options.on_duplicate = policy.into();
    }
    config.options.strict |= args.strict;
    if let Some(n) = args.sample {
        config.options.sample_size = n;
    }

    let generators = prosumer_io::read_table(&args.generators, args.sheet.as_deref())
        .map_err(|e| recon_err(EXIT_INPUT, e.to_string()))?;
    let deals = prosumer_io::read_table(&args.deals, None)
        .map_err(|e| recon_err(EXIT_INPUT, e.to_string()))?;

    let result = prosumer_recon::run(&config, &generators, &deals).map_err(engine_err)?;

    prosumer_io::csv::write_output(&args.output, &result.records)
        .map_err(|e| recon_err(EXIT_ERROR, e.to_string()))?;

    if args.json || args.report.is_some() {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| recon_err(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = args.report {
            std::fs::write(path, &json_str)
                .map_err(|e| recon_err(EXIT_ERROR, format!("cannot write report: {e}")))?;
            if !args.quiet {
                eprintln!("wrote {}", path.display());
            }
        }

        if args.json {
            println!("{json_str}");
        }
    }

    if !args.quiet {
        print_summary(&result, &args.output);
    }

    let s = &result.summary;
    if args.fail_on_unmatched && s.unmatched > 0 {
        return Err(recon_err(
            EXIT_UNMATCHED,
            format!("{} of {} deals have no generator match", s.unmatched, s.total),
        ));
    }
    if config.options.strict && s.coercions > 0 {
        return Err(recon_err(
            EXIT_STRICT,
            format!("{} value(s) defaulted by cleaning rules", s.coercions),
        ));
    }

    Ok(())
}

/// Human summary to stderr.
fn print_summary(result: &ReconResult, output: &Path) {
    let s = &result.summary;
    eprintln!(
        "{} deals: {} matched, {} unmatched ({} generator rows)",
        s.total, s.matched, s.unmatched, s.generator_rows,
    );

    if !result.unmatched_keys.is_empty() {
        eprintln!("unmatched keys: {}", result.unmatched_keys.join(", "));
    }

    if let Some(ref samples) = result.key_samples {
        print_key_samples(samples);
    }

    if !result.matched_sample.is_empty() {
        eprintln!("matched sample:");
        for row in &result.matched_sample {
            eprintln!("  {}", describe_sample(row));
        }
    }

    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }

    for notice in &result.coercions {
        eprintln!(
            "strict: row {} (key {}): {} = {:?} defaulted",
            notice.row + 1,
            notice.key,
            notice.field,
            notice.value,
        );
    }

    eprintln!("wrote {} ({} rows)", output.display(), s.total);
}

fn print_key_samples(samples: &KeySamples) {
    eprintln!("no deal matched a generator; compare the key formats:");
    eprintln!("  generator keys: {:?}", samples.generators);
    eprintln!("  deal keys:      {:?}", samples.deals);
}

fn describe_sample(row: &SampleRow) -> String {
    row.cells
        .iter()
        .map(|c| format!("{}={}", c.column, c.value))
        .collect::<Vec<_>>()
        .join(" | ")
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!(
        "valid: '{}': generators key '{}' ({} column(s)), deals key '{}' ({} column(s)), on_duplicate = {}",
        config.name,
        config.generators.key,
        config.generators.columns.len(),
        config.deals.key,
        config.deals.columns.len(),
        config.options.on_duplicate,
    );
    Ok(())
}

pub fn cmd_config() -> Result<(), CliError> {
    let toml = ReconConfig::default().to_toml().map_err(engine_err)?;
    print!("{toml}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use prosumer_recon::model::SampleCell;

    #[test]
    fn on_duplicate_maps_to_policy() {
        assert_eq!(DuplicatePolicy::from(OnDuplicate::FirstMatch), DuplicatePolicy::FirstMatch);
        assert_eq!(DuplicatePolicy::from(OnDuplicate::Error), DuplicatePolicy::Error);
    }

    #[test]
    fn engine_errors_carry_hints() {
        let err = engine_err(ReconError::DuplicateKeys(vec![]));
        assert_eq!(err.code, crate::exit_codes::EXIT_DUPLICATE);
        assert!(err.hint.unwrap().contains("--on-duplicate"));

        let err = engine_err(ReconError::ConfigValidation("bad".into()));
        assert_eq!(err.code, EXIT_CONFIG);
        assert!(err.hint.is_none());
    }

    #[test]
    fn sample_rows_render_as_pairs() {
        let row = SampleRow {
            key: "1001".into(),
            cells: vec![
                SampleCell { column: "UC".into(), value: "1001".into() },
                SampleCell { column: "Titular".into(), value: "Maria".into() },
            ],
        };
        assert_eq!(describe_sample(&row), "UC=1001 | Titular=Maria");
    }
}
