//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Codes
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success                                                   |
//! | 1    | General error (unspecified)                               |
//! | 2    | CLI usage error (bad args)                                |
//! | 3    | Input error (unreadable file, missing key column)         |
//! | 4    | Invalid mapping config                                    |
//! | 5    | Unmatched deals and `--fail-on-unmatched` set             |
//! | 6    | Strict mode recorded coercion notices                     |
//! | 7    | Duplicate generator keys under the `error` policy         |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use prosumer_recon::ReconError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Import run (3-9)
// =============================================================================

/// Input file unreadable or unparseable, or a key column is missing.
pub const EXIT_INPUT: u8 = 3;

/// Mapping config failed to parse or validate.
pub const EXIT_CONFIG: u8 = 4;

/// Output written, but some deals had no generator match.
/// Only with `--fail-on-unmatched`.
pub const EXIT_UNMATCHED: u8 = 5;

/// Output written, but strict mode recorded defaulted values.
pub const EXIT_STRICT: u8 = 6;

/// Duplicate generator keys with `on_duplicate = "error"`.
pub const EXIT_DUPLICATE: u8 = 7;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_)
        | ReconError::ConfigValidation(_)
        | ReconError::ConfigSerialize(_) => EXIT_CONFIG,
        ReconError::MissingKeyColumn { .. } => EXIT_INPUT,
        ReconError::DuplicateKeys(_) => EXIT_DUPLICATE,
    }
}

/// Stable machine-readable name for an exit code.
pub fn exit_code_name(code: u8) -> &'static str {
    match code {
        EXIT_SUCCESS => "ok",
        EXIT_USAGE => "usage",
        EXIT_INPUT => "input_error",
        EXIT_CONFIG => "invalid_config",
        EXIT_UNMATCHED => "unmatched",
        EXIT_STRICT => "strict_notices",
        EXIT_DUPLICATE => "duplicate_keys",
        _ => "error",
    }
}

/// Structured error output for `--json` runs.
/// Designed for both human-readable and machine-parseable output.
#[derive(Debug, serde::Serialize)]
pub struct ErrorOutput {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub exit_code: u8,
}

impl ErrorOutput {
    pub fn new(code: u8, message: &str, hint: Option<&str>) -> Self {
        Self {
            error: exit_code_name(code).to_string(),
            message: message.to_string(),
            hint: hint.map(str::to_string),
            exit_code: code,
        }
    }

    /// Print error to stderr (human-readable by default).
    pub fn print(&self, json: bool) {
        if json {
            if let Ok(output) = serde_json::to_string(self) {
                eprintln!("{}", output);
            }
        } else {
            eprintln!("error: {}", self.message);
            if let Some(hint) = &self.hint {
                eprintln!("hint: {}", hint);
            }
        }
    }
}
