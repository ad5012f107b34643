/// Canonical form of an installation identifier.
///
/// Spreadsheet round-trips turn `12345` into `12345.0`; that suffix is
/// dropped along with surrounding whitespace. The result is a fixed point:
/// normalizing it again returns it unchanged.
pub fn normalize_key(raw: &str) -> String {
    let mut key = raw.trim();
    while let Some(stripped) = key.strip_suffix(".0") {
        key = stripped.trim_end();
    }
    key.to_string()
}
