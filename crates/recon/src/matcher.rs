use std::collections::HashMap;

use crate::config::DuplicatePolicy;
use crate::error::ReconError;
use crate::key::normalize_key;
use crate::model::{DuplicateKey, JoinedRow, JoinedTable, Source, SourceTable};

#[derive(Debug)]
pub struct JoinOutput<'a> {
    pub table: JoinedTable<'a>,
    /// Key column positions in their source tables.
    pub generator_key: usize,
    pub deal_key: usize,
    /// Generator keys seen more than once, in first-seen order.
    pub duplicates: Vec<DuplicateKey>,
}

/// Right-outer join of generators onto deals by normalized key.
///
/// Every deal row yields exactly one joined row, in deal order. A generator
/// key that occurs more than once resolves to its first row, or fails the
/// join under [`DuplicatePolicy::Error`].
pub fn right_outer_join<'a>(
    generators: &'a SourceTable,
    deals: &'a SourceTable,
    generator_key: &str,
    deal_key: &str,
    policy: DuplicatePolicy,
) -> Result<JoinOutput<'a>, ReconError> {
    let gen_key_idx = key_column(generators, generator_key, Source::Generators)?;
    let deal_key_idx = key_column(deals, deal_key, Source::Deals)?;

    let (index, duplicates) = index_generators(generators, gen_key_idx);

    if policy == DuplicatePolicy::Error && !duplicates.is_empty() {
        return Err(ReconError::DuplicateKeys(duplicates));
    }

    let rows: Vec<JoinedRow> = (0..deals.len())
        .map(|deal_index| {
            let key = normalize_key(deals.cell(deal_index, deal_key_idx));
            let generator_index = index.get(&key).copied();
            JoinedRow {
                key,
                deal_index,
                generator_index,
            }
        })
        .collect();

    log::debug!(
        "joined {} deal rows against {} generator rows ({} distinct keys)",
        deals.len(),
        generators.len(),
        index.len()
    );

    Ok(JoinOutput {
        table: JoinedTable::new(generators, deals, gen_key_idx, deal_key_idx, rows),
        generator_key: gen_key_idx,
        deal_key: deal_key_idx,
        duplicates,
    })
}

fn key_column(table: &SourceTable, name: &str, side: Source) -> Result<usize, ReconError> {
    table
        .column_index(name)
        .ok_or_else(|| ReconError::MissingKeyColumn {
            side,
            column: name.into(),
        })
}

/// Map each normalized generator key to its first row.
fn index_generators(
    generators: &SourceTable,
    key_idx: usize,
) -> (HashMap<String, usize>, Vec<DuplicateKey>) {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(generators.len());
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for row in 0..generators.len() {
        let key = normalize_key(generators.cell(row, key_idx));
        let count = counts.entry(key.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            first_seen.push(key.clone());
        }
        index.entry(key).or_insert(row);
    }

    let duplicates = first_seen
        .into_iter()
        .filter_map(|key| {
            let count = counts.get(&key).copied().unwrap_or(0);
            (count > 1).then_some(DuplicateKey { key, count })
        })
        .collect();

    (index, duplicates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> SourceTable {
        let mut t = SourceTable::new(headers.iter().map(|s| s.to_string()).collect());
        for r in rows {
            t.push_row(r.iter().map(|s| s.to_string()).collect());
        }
        t
    }

    fn generators() -> SourceTable {
        table(
            &["Número da Instalação", "Titular"],
            &[&["1001.0", "Maria"], &[" 2002 ", "João"]],
        )
    }

    #[test]
    fn keeps_every_deal_in_order() {
        let gens = generators();
        let deals = table(&["UC"], &[&["9999"], &["1001"], &["2002.0"]]);
        let out = right_outer_join(&gens, &deals, "Número da Instalação", "UC", DuplicatePolicy::FirstMatch)
            .unwrap();
        let rows = out.table.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].key, "9999");
        assert_eq!(rows[0].generator_index, None);
        assert_eq!(rows[1].generator_index, Some(0));
        assert_eq!(rows[2].key, "2002");
        assert_eq!(rows[2].generator_index, Some(1));
        assert!(out.duplicates.is_empty());
    }

    #[test]
    fn empty_generators_match_nothing() {
        let gens = table(&["Número da Instalação"], &[]);
        let deals = table(&["UC"], &[&["1"], &["2"]]);
        let out = right_outer_join(&gens, &deals, "Número da Instalação", "UC", DuplicatePolicy::FirstMatch)
            .unwrap();
        assert_eq!(out.table.rows().len(), 2);
        assert_eq!(out.table.matched_count(), 0);
    }

    #[test]
    fn duplicate_deals_each_get_the_match() {
        let gens = generators();
        let deals = table(&["UC"], &[&["1001"], &["1001"]]);
        let out = right_outer_join(&gens, &deals, "Número da Instalação", "UC", DuplicatePolicy::Error)
            .unwrap();
        assert_eq!(out.table.matched_count(), 2);
    }

    #[test]
    fn blank_keys_match_each_other() {
        let gens = table(&["Número da Instalação", "Titular"], &[&["  ", "Sem chave"]]);
        let deals = table(&["UC"], &[&[""]]);
        let out = right_outer_join(&gens, &deals, "Número da Instalação", "UC", DuplicatePolicy::FirstMatch)
            .unwrap();
        assert_eq!(out.table.rows()[0].generator_index, Some(0));
    }

    #[test]
    fn first_match_wins_on_duplicate_generators() {
        let gens = table(
            &["Número da Instalação", "Titular"],
            &[&["1001", "Maria"], &["1001.0", "Outra Maria"], &["2002", "João"]],
        );
        let deals = table(&["UC"], &[&["1001"]]);
        let out = right_outer_join(&gens, &deals, "Número da Instalação", "UC", DuplicatePolicy::FirstMatch)
            .unwrap();
        let row = &out.table.rows()[0];
        assert_eq!(row.generator_index, Some(0));
        assert_eq!(out.table.get(row, "Titular"), Some("Maria"));
        assert_eq!(
            out.duplicates,
            vec![DuplicateKey { key: "1001".into(), count: 2 }]
        );
    }

    #[test]
    fn error_policy_rejects_duplicate_generators() {
        let gens = table(&["Número da Instalação"], &[&["1001"], &["1001"]]);
        let deals = table(&["UC"], &[&["1001"]]);
        let err = right_outer_join(&gens, &deals, "Número da Instalação", "UC", DuplicatePolicy::Error)
            .unwrap_err();
        match err {
            ReconError::DuplicateKeys(dups) => {
                assert_eq!(dups, vec![DuplicateKey { key: "1001".into(), count: 2 }]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_key_column_is_structural() {
        let gens = generators();
        let deals = table(&["Unidade"], &[&["1001"]]);
        let err = right_outer_join(&gens, &deals, "Número da Instalação", "UC", DuplicatePolicy::FirstMatch)
            .unwrap_err();
        assert!(matches!(
            err,
            ReconError::MissingKeyColumn { side: Source::Deals, ref column } if column == "UC"
        ));

        let err = right_outer_join(&deals, &deals, "Número da Instalação", "Unidade", DuplicatePolicy::FirstMatch)
            .unwrap_err();
        assert!(matches!(err, ReconError::MissingKeyColumn { side: Source::Generators, .. }));
    }
}
