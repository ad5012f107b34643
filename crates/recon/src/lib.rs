//! `prosumer-recon`: prosumer registry × CRM deal reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns the remapped
//! records plus a report. No CLI or IO dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod key;
pub mod mapping;
pub mod matcher;
pub mod model;
pub mod schema;
pub mod transform;

pub use config::{DuplicatePolicy, ReconConfig};
pub use engine::run;
pub use error::ReconError;
pub use key::normalize_key;
pub use model::{OutputRecord, ReconResult, ReconWarning, SourceTable};
pub use schema::DESTINATION_COLUMNS;
