use std::collections::HashSet;

use crate::key::normalize_key;
use crate::mapping::ColumnPlan;
use crate::model::{
    ColumnRef, JoinedTable, KeySamples, OutputRecord, ReconSummary, SampleCell, SampleRow, Source,
    SourceTable,
};

/// Leading keys shown per side when nothing matched.
pub const KEY_SAMPLE_SIZE: usize = 3;

/// Compute summary statistics from the remapped records.
pub fn compute_summary(
    records: &[OutputRecord],
    generator_rows: usize,
    warnings: usize,
    coercions: usize,
) -> ReconSummary {
    let matched = records.iter().filter(|r| r.matched).count();
    ReconSummary {
        total: records.len(),
        matched,
        unmatched: records.len() - matched,
        generator_rows,
        warnings,
        coercions,
    }
}

/// Keys of unmatched deals, first occurrence order, no repeats.
pub fn unmatched_keys(records: &[OutputRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| !r.matched)
        .filter(|r| seen.insert(r.key.as_str()))
        .map(|r| r.key.clone())
        .collect()
}

/// Leading matched rows as they appear in the joined table: the deal key
/// column followed by every generator column the mapping reads.
pub fn matched_sample(
    joined: &JoinedTable<'_>,
    plan: &ColumnPlan,
    deal_key: ColumnRef,
    limit: usize,
) -> Vec<SampleRow> {
    let mut columns = vec![deal_key];
    columns.extend(plan.columns().filter(|c| c.source == Source::Generators));

    joined
        .rows()
        .iter()
        .filter(|row| row.is_matched())
        .take(limit)
        .map(|row| SampleRow {
            key: row.key.clone(),
            cells: columns
                .iter()
                .map(|col| SampleCell {
                    column: joined.column_name(*col).unwrap_or_default().to_string(),
                    value: joined.value(row, *col).to_string(),
                })
                .collect(),
        })
        .collect()
}

/// First normalized keys of each side, to diagnose a join with no matches.
pub fn key_samples(
    generators: &SourceTable,
    generator_key: usize,
    deals: &SourceTable,
    deal_key: usize,
) -> KeySamples {
    fn leading(table: &SourceTable, col: usize) -> Vec<String> {
        (0..table.len().min(KEY_SAMPLE_SIZE))
            .map(|row| normalize_key(table.cell(row, col)))
            .collect()
    }
    KeySamples {
        generators: leading(generators, generator_key),
        deals: leading(deals, deal_key),
    }
}
