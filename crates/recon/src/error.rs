use thiserror::Error;

use crate::model::{DuplicateKey, Source};

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (unknown destination, derived field mapped, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// Config could not be rendered back to TOML.
    #[error("config serialization error: {0}")]
    ConfigSerialize(String),
    /// The join key column is absent from one of the inputs.
    #[error("{side} file: missing key column '{column}'")]
    MissingKeyColumn { side: Source, column: String },
    /// Duplicate generator keys under the `error` duplicate policy.
    #[error("duplicate keys in generators file:\n{}", describe_duplicates(.0))]
    DuplicateKeys(Vec<DuplicateKey>),
}

fn describe_duplicates(dups: &[DuplicateKey]) -> String {
    dups.iter()
        .map(|d| format!("  key {:?} appears {} times", d.key, d.count))
        .collect::<Vec<_>>()
        .join("\n")
}
