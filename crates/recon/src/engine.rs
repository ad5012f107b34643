use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::evidence::{compute_summary, key_samples, matched_sample, unmatched_keys};
use crate::mapping::ColumnPlan;
use crate::matcher::right_outer_join;
use crate::model::{ColumnRef, ReconMeta, ReconResult, ReconWarning, Source, SourceTable};
use crate::transform::apply_field_rules;

/// Join, remap and clean. One output record per deal row, in deal order.
pub fn run(
    config: &ReconConfig,
    generators: &SourceTable,
    deals: &SourceTable,
) -> Result<ReconResult, ReconError> {
    let options = &config.options;
    let join = right_outer_join(
        generators,
        deals,
        &config.generators.key,
        &config.deals.key,
        options.on_duplicate,
    )?;
    let joined = &join.table;

    let plan = ColumnPlan::resolve(config, joined);

    let mut warnings: Vec<ReconWarning> = join
        .duplicates
        .iter()
        .map(|d| ReconWarning::DuplicateKey {
            key: d.key.clone(),
            count: d.count,
        })
        .collect();
    warnings.extend(plan.warnings.iter().cloned());
    for warning in &warnings {
        log::warn!("{warning}");
    }

    let mut coercions = Vec::new();
    let records: Vec<_> = joined
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut record = plan.apply(joined, row);
            apply_field_rules(&mut record, i, options.strict, &mut coercions);
            record
        })
        .collect();

    let summary = compute_summary(&records, generators.len(), warnings.len(), coercions.len());
    log::debug!(
        "{} output rows: {} matched, {} unmatched, {} coercion notices",
        summary.total,
        summary.matched,
        summary.unmatched,
        summary.coercions
    );

    let deal_key = ColumnRef {
        source: Source::Deals,
        index: join.deal_key,
    };
    let matched_sample = matched_sample(joined, &plan, deal_key, options.sample_size);
    let key_samples = (summary.matched == 0)
        .then(|| key_samples(generators, join.generator_key, deals, join.deal_key));

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            strict: options.strict,
        },
        unmatched_keys: unmatched_keys(&records),
        matched_sample,
        key_samples,
        warnings,
        coercions,
        preview: records.iter().take(options.sample_size).cloned().collect(),
        summary,
        records,
    })
}
