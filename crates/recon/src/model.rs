use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::schema::{self, DESTINATION_COLUMNS};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Which export a column or record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Source A: generator/prosumer registry (enrichment side).
    Generators,
    /// Source B: CRM deal list (kept side).
    Deals,
}

impl Source {
    /// Suffix appended to a column name that exists in both exports.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Generators => "_A",
            Self::Deals => "_B",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generators => write!(f, "generators"),
            Self::Deals => write!(f, "deals"),
        }
    }
}

/// One tabular export: a header row plus data rows of raw cell text.
///
/// Every row has exactly `headers.len()` cells; [`SourceTable::push_row`]
/// pads or truncates to keep that true.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SourceTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, mut cells: Vec<String>) {
        cells.resize(self.headers.len(), String::new());
        self.rows.push(cells);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// First column carrying this exact header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    pub fn record(&self, index: usize) -> SourceRecord<'_> {
        SourceRecord { table: self, index }
    }

    pub fn records(&self) -> impl Iterator<Item = SourceRecord<'_>> {
        (0..self.rows.len()).map(move |i| self.record(i))
    }
}

/// Borrowed view of one row, addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct SourceRecord<'a> {
    table: &'a SourceTable,
    index: usize,
}

impl<'a> SourceRecord<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.table
            .column_index(column)
            .map(|c| self.table.cell(self.index, c))
    }
}

// ---------------------------------------------------------------------------
// Join
// ---------------------------------------------------------------------------

/// Location of a joined column in its source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef {
    pub source: Source,
    pub index: usize,
}

/// One deal row with its generator match, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRow {
    /// Normalized deal key.
    pub key: String,
    pub deal_index: usize,
    pub generator_index: Option<usize>,
}

impl JoinedRow {
    pub fn is_matched(&self) -> bool {
        self.generator_index.is_some()
    }
}

/// Right-outer join result: one row per deal, generator columns attached.
///
/// Column names follow the merge convention: a name present in both exports
/// is exposed as `<name>_A` (generators) and `<name>_B` (deals). Both key
/// columns read as the normalized key.
#[derive(Debug)]
pub struct JoinedTable<'a> {
    generators: &'a SourceTable,
    deals: &'a SourceTable,
    keys: [ColumnRef; 2],
    columns: Vec<(String, ColumnRef)>,
    lookup: HashMap<String, ColumnRef>,
    rows: Vec<JoinedRow>,
}

impl<'a> JoinedTable<'a> {
    pub fn new(
        generators: &'a SourceTable,
        deals: &'a SourceTable,
        generator_key: usize,
        deal_key: usize,
        rows: Vec<JoinedRow>,
    ) -> Self {
        let mut columns = Vec::with_capacity(generators.headers().len() + deals.headers().len());
        let sides = [(Source::Generators, generators, deals), (Source::Deals, deals, generators)];
        for (source, own, other) in sides {
            for (index, header) in own.headers().iter().enumerate() {
                let name = if other.column_index(header).is_some() {
                    format!("{header}{}", source.suffix())
                } else {
                    header.clone()
                };
                columns.push((name, ColumnRef { source, index }));
            }
        }

        let mut lookup = HashMap::with_capacity(columns.len());
        for (name, col) in &columns {
            lookup.entry(name.clone()).or_insert(*col);
        }

        Self {
            generators,
            deals,
            keys: [
                ColumnRef {
                    source: Source::Generators,
                    index: generator_key,
                },
                ColumnRef {
                    source: Source::Deals,
                    index: deal_key,
                },
            ],
            columns,
            lookup,
            rows,
        }
    }

    pub fn rows(&self) -> &[JoinedRow] {
        &self.rows
    }

    /// Joined column names, generator columns first.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn resolve(&self, column: &str) -> Option<ColumnRef> {
        self.lookup.get(column).copied()
    }

    /// Joined name of a source column, suffix included.
    pub fn column_name(&self, col: ColumnRef) -> Option<&str> {
        self.columns
            .iter()
            .find(|(_, c)| *c == col)
            .map(|(name, _)| name.as_str())
    }

    /// Cell value for a resolved column. Generator columns of unmatched rows are empty.
    pub fn value<'r>(&'r self, row: &'r JoinedRow, col: ColumnRef) -> &'r str {
        if col.source == Source::Generators && row.generator_index.is_none() {
            return "";
        }
        if self.keys.contains(&col) {
            return &row.key;
        }
        match (col.source, row.generator_index) {
            (Source::Generators, Some(g)) => self.generators.cell(g, col.index),
            _ => self.deals.cell(row.deal_index, col.index),
        }
    }

    pub fn get<'r>(&'r self, row: &'r JoinedRow, column: &str) -> Option<&'r str> {
        self.resolve(column).map(|col| self.value(row, col))
    }

    pub fn matched_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_matched()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateKey {
    pub key: String,
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One row of the destination schema, values already rendered as text.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub key: String,
    pub matched: bool,
    values: Vec<String>,
}

impl OutputRecord {
    pub fn new(key: impl Into<String>, matched: bool) -> Self {
        Self {
            key: key.into(),
            matched,
            values: vec![String::new(); DESTINATION_COLUMNS.len()],
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        schema::field_index(field).map(|i| self.values[i].as_str())
    }

    /// Set a destination field. Names outside the schema are ignored.
    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        if let Some(i) = schema::field_index(field) {
            self.values[i] = value.into();
        }
    }

    pub fn set_at(&mut self, index: usize, value: impl Into<String>) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value.into();
        }
    }

    /// Values in destination-schema order.
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl Serialize for OutputRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in DESTINATION_COLUMNS.iter().zip(&self.values) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Non-fatal issue found while building the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconWarning {
    /// A mapped source column does not exist in the joined table.
    MissingColumn {
        source: Source,
        destination: String,
        column: String,
    },
    /// A generator key occurs more than once; the first row was used.
    DuplicateKey { key: String, count: usize },
}

impl std::fmt::Display for ReconWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumn {
                source,
                destination,
                column,
            } => write!(
                f,
                "{source} column '{column}' not found; '{destination}' left empty"
            ),
            Self::DuplicateKey { key, count } => write!(
                f,
                "generator key {key:?} appears {count} times; first row used"
            ),
        }
    }
}

/// A value a cleaning rule had to default (strict mode only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoercionNotice {
    /// Zero-based output row.
    pub row: usize,
    pub key: String,
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleCell {
    pub column: String,
    pub value: String,
}

/// A matched row as seen in the joined table, for spot checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleRow {
    pub key: String,
    pub cells: Vec<SampleCell>,
}

/// Leading keys of each side, shown when nothing matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeySamples {
    pub generators: Vec<String>,
    pub deals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub generator_rows: usize,
    pub warnings: usize,
    pub coercions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub strict: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub unmatched_keys: Vec<String>,
    pub matched_sample: Vec<SampleRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_samples: Option<KeySamples>,
    pub warnings: Vec<ReconWarning>,
    pub coercions: Vec<CoercionNotice>,
    pub preview: Vec<OutputRecord>,
    /// Full output, one record per deal row. Written to file, not to the report.
    #[serde(skip)]
    pub records: Vec<OutputRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_ignores_unknown_field() {
        let mut rec = OutputRecord::new("1001", true);
        rec.set("NaoExiste", "x");
        rec.set(schema::NOME, "Maria");
        assert_eq!(rec.get("NaoExiste"), None);
        assert_eq!(rec.get(schema::NOME), Some("Maria"));
        assert_eq!(rec.values().iter().filter(|v| !v.is_empty()).count(), 1);
    }

    fn table(headers: &[&str], rows: &[&[&str]]) -> SourceTable {
        let mut t = SourceTable::new(headers.iter().map(|s| s.to_string()).collect());
        for r in rows {
            t.push_row(r.iter().map(|s| s.to_string()).collect());
        }
        t
    }

    #[test]
    fn push_row_pads_and_truncates() {
        let mut t = SourceTable::new(vec!["a".into(), "b".into()]);
        t.push_row(vec!["1".into()]);
        t.push_row(vec!["1".into(), "2".into(), "3".into()]);
        assert_eq!(t.cell(0, 1), "");
        assert_eq!(t.cell(1, 1), "2");
        assert_eq!(t.cell(1, 2), "");
        assert_eq!(t.record(1).get("b"), Some("2"));
        assert_eq!(t.record(1).get("c"), None);
    }

    #[test]
    fn colliding_columns_get_side_suffixes() {
        let gens = table(&["Número da Instalação", "Cidade", "Titular"], &[&["1", "Recife", "Maria"]]);
        let deals = table(&["UC", "Cidade"], &[&["1", "Olinda"]]);
        let rows = vec![JoinedRow {
            key: "1".into(),
            deal_index: 0,
            generator_index: Some(0),
        }];
        let joined = JoinedTable::new(&gens, &deals, 0, 0, rows);

        let names: Vec<&str> = joined.column_names().collect();
        assert_eq!(names, vec!["Número da Instalação", "Cidade_A", "Titular", "UC", "Cidade_B"]);

        let row = &joined.rows()[0];
        assert_eq!(joined.get(row, "Cidade_A"), Some("Recife"));
        assert_eq!(joined.get(row, "Cidade_B"), Some("Olinda"));
        assert_eq!(joined.get(row, "Cidade"), None);
    }

    #[test]
    fn unmatched_rows_read_empty_generator_cells() {
        let gens = table(&["Número da Instalação", "Titular"], &[&["1", "Maria"]]);
        let deals = table(&["UC"], &[&["9"]]);
        let rows = vec![JoinedRow {
            key: "9".into(),
            deal_index: 0,
            generator_index: None,
        }];
        let joined = JoinedTable::new(&gens, &deals, 0, 0, rows);
        let row = &joined.rows()[0];
        assert_eq!(joined.get(row, "Titular"), Some(""));
        assert_eq!(joined.get(row, "UC"), Some("9"));
        assert_eq!(joined.matched_count(), 0);
    }

    #[test]
    fn key_columns_read_as_normalized_key() {
        let gens = table(&["Número da Instalação"], &[&["1001.0 "]]);
        let deals = table(&["UC"], &[&[" 1001"]]);
        let rows = vec![JoinedRow {
            key: "1001".into(),
            deal_index: 0,
            generator_index: Some(0),
        }];
        let joined = JoinedTable::new(&gens, &deals, 0, 0, rows);
        let row = &joined.rows()[0];
        assert_eq!(joined.get(row, "Número da Instalação"), Some("1001"));
        assert_eq!(joined.get(row, "UC"), Some("1001"));
    }

    #[test]
    fn output_record_serializes_in_schema_order() {
        let mut rec = OutputRecord::new("1001", true);
        rec.set(schema::NOME, "Maria");
        let json = serde_json::to_string(&rec).unwrap();
        let first = json.find("NumeroInstalacaoUsina").unwrap();
        let nome = json.find("\"Nome\":\"Maria\"").unwrap();
        let last = json.find("CreditoResidual").unwrap();
        assert!(first < nome && nome < last);
    }
}
