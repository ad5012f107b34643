//! Destination ← joined-column remapping.

use crate::config::ReconConfig;
use crate::model::{ColumnRef, JoinedRow, JoinedTable, OutputRecord, ReconWarning, Source};
use crate::schema::{self, DESTINATION_COLUMNS};

/// Mapping resolved against one joined table.
#[derive(Debug, Clone)]
pub struct ColumnPlan {
    /// (destination index, joined column) in destination-schema order.
    entries: Vec<(usize, ColumnRef)>,
    pub warnings: Vec<ReconWarning>,
}

impl ColumnPlan {
    /// Resolve both mapping tables. A column absent from the joined table
    /// yields one warning and leaves its destination empty.
    pub fn resolve(config: &ReconConfig, joined: &JoinedTable<'_>) -> Self {
        let mut entries = Vec::new();
        let mut warnings = Vec::new();

        for (dest_idx, dest) in DESTINATION_COLUMNS.iter().enumerate() {
            let sides = [
                (Source::Generators, &config.generators.columns),
                (Source::Deals, &config.deals.columns),
            ];
            for (source, columns) in sides {
                let Some(column) = columns.get(*dest) else {
                    continue;
                };
                match joined.resolve(column) {
                    Some(col) => entries.push((dest_idx, col)),
                    None => warnings.push(ReconWarning::MissingColumn {
                        source,
                        destination: dest.to_string(),
                        column: column.clone(),
                    }),
                }
            }
        }

        Self { entries, warnings }
    }

    /// Source columns the plan reads, in destination order.
    pub fn columns(&self) -> impl Iterator<Item = ColumnRef> + '_ {
        self.entries.iter().map(|(_, col)| *col)
    }

    /// Remap one joined row. Values are copied verbatim; cleaning happens later.
    pub fn apply(&self, joined: &JoinedTable<'_>, row: &JoinedRow) -> OutputRecord {
        let mut record = OutputRecord::new(row.key.clone(), row.is_matched());
        for (dest_idx, col) in &self.entries {
            record.set_at(*dest_idx, joined.value(row, *col));
        }

        record.set(schema::NUMERO_CLIENTE, row.key.clone());
        let pis_cofins = record.get(schema::DEVOLUCAO_PIS_COFINS).unwrap_or("").to_string();
        record.set(schema::DEVOLUCAO_ICMS, pis_cofins);
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::config::SourceConfig;
    use crate::model::SourceTable;

    fn table(headers: &[&str], rows: &[&[&str]]) -> SourceTable {
        let mut t = SourceTable::new(headers.iter().map(|s| s.to_string()).collect());
        for r in rows {
            t.push_row(r.iter().map(|s| s.to_string()).collect());
        }
        t
    }

    fn to_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(d, s)| (d.to_string(), s.to_string()))
            .collect()
    }

    fn config(gen_cols: &[(&str, &str)], deal_cols: &[(&str, &str)]) -> ReconConfig {
        ReconConfig {
            generators: SourceConfig {
                key: "Número da Instalação".into(),
                columns: to_map(gen_cols),
            },
            deals: SourceConfig {
                key: "UC".into(),
                columns: to_map(deal_cols),
            },
            ..ReconConfig::default()
        }
    }

    fn joined<'a>(gens: &'a SourceTable, deals: &'a SourceTable) -> JoinedTable<'a> {
        let rows = vec![
            JoinedRow {
                key: "1001".into(),
                deal_index: 0,
                generator_index: Some(0),
            },
            JoinedRow {
                key: "9999".into(),
                deal_index: 1,
                generator_index: None,
            },
        ];
        JoinedTable::new(gens, deals, 0, 0, rows)
    }

    #[test]
    fn copies_values_verbatim_from_both_sides() {
        let gens = table(
            &["Número da Instalação", "Titular", "Cidade", "Restituir Impostos"],
            &[&["1001", "Maria", "Recife", "Sim"]],
        );
        let deals = table(
            &["UC", "Cidade", "NÚMERO DO RG"],
            &[&["1001", "Olinda", "12.345"], &["9999", "Paulista", "67.890"]],
        );
        let cfg = config(
            &[
                ("Nome", "Titular"),
                ("EnderecoCidade", "Cidade_A"),
                ("DevolucaoPisCofins", "Restituir Impostos"),
            ],
            &[("RgNumero", "NÚMERO DO RG")],
        );
        let joined = joined(&gens, &deals);
        let plan = ColumnPlan::resolve(&cfg, &joined);
        assert!(plan.warnings.is_empty());

        let matched = plan.apply(&joined, &joined.rows()[0]);
        assert!(matched.matched);
        assert_eq!(matched.get(schema::NOME), Some("Maria"));
        assert_eq!(matched.get("EnderecoCidade"), Some("Recife"));
        assert_eq!(matched.get("RgNumero"), Some("12.345"));
        assert_eq!(matched.get(schema::NUMERO_CLIENTE), Some("1001"));
        assert_eq!(matched.get(schema::DEVOLUCAO_ICMS), Some("Sim"));

        let unmatched = plan.apply(&joined, &joined.rows()[1]);
        assert!(!unmatched.matched);
        assert_eq!(unmatched.get(schema::NOME), Some(""));
        assert_eq!(unmatched.get("RgNumero"), Some("67.890"));
        assert_eq!(unmatched.get(schema::NUMERO_CLIENTE), Some("9999"));
    }

    #[test]
    fn missing_columns_warn_in_schema_order() {
        let gens = table(&["Número da Instalação", "Titular"], &[&["1001", "Maria"]]);
        let deals = table(&["UC"], &[&["1001"], &["9999"]]);
        let cfg = config(
            &[("Telefone", "Telefones"), ("Nome", "Titular"), ("Email", "E-mail")],
            &[("Fornecimento", "TIPO DE LIGAÇÃO")],
        );
        let joined = joined(&gens, &deals);
        let plan = ColumnPlan::resolve(&cfg, &joined);

        let missing: Vec<(Source, &str)> = plan
            .warnings
            .iter()
            .map(|w| match w {
                ReconWarning::MissingColumn {
                    source,
                    destination,
                    ..
                } => (*source, destination.as_str()),
                other => panic!("unexpected warning {other:?}"),
            })
            .collect();
        assert_eq!(
            missing,
            vec![
                (Source::Generators, "Email"),
                (Source::Generators, "Telefone"),
                (Source::Deals, "Fornecimento"),
            ]
        );

        let rec = plan.apply(&joined, &joined.rows()[0]);
        assert_eq!(rec.get("Email"), Some(""));
        assert_eq!(rec.get(schema::NOME), Some("Maria"));
    }

    #[test]
    fn unsuffixed_name_does_not_resolve_a_collision() {
        let gens = table(&["Número da Instalação", "UF"], &[&["1001", "PE"]]);
        let deals = table(&["UC", "UF"], &[&["1001", "SP"], &["9999", "RJ"]]);
        let cfg = config(&[("EnderecoUf", "UF")], &[]);
        let joined = joined(&gens, &deals);
        let plan = ColumnPlan::resolve(&cfg, &joined);
        assert_eq!(plan.warnings.len(), 1);
        assert_eq!(plan.columns().count(), 0);
    }
}
