//! Field-level cleaning rules applied after remapping.
//!
//! Every rule is total: a value that cannot be interpreted falls back to a
//! fixed default instead of failing the run. In strict mode the fallback is
//! recorded as a [`CoercionNotice`].

use chrono::NaiveDate;

use crate::model::{CoercionNotice, OutputRecord};
use crate::schema;

// ---------------------------------------------------------------------------
// Document number
// ---------------------------------------------------------------------------

pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// `12345678901` → `123456789-01`. Two digits or fewer pass through.
pub fn mask_document(digits: &str) -> String {
    if digits.len() > 2 {
        let (head, tail) = digits.split_at(digits.len() - 2);
        format!("{head}-{tail}")
    } else {
        digits.to_string()
    }
}

pub fn format_document(raw: &str) -> String {
    mask_document(&digits_only(raw))
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

// Two-digit years first: `%Y` would read "20" as year 20.
const DAY_FIRST_FORMATS: [&str; 6] = [
    "%d/%m/%y", "%d/%m/%Y", "%d-%m-%y", "%d-%m-%Y", "%d.%m.%y", "%d.%m.%Y",
];

/// Parse a day-first date, ignoring any time-of-day part.
pub fn parse_day_first_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw
        .trim()
        .split(|c: char| c.is_whitespace() || c == 'T')
        .next()
        .unwrap_or("");
    if date_part.is_empty() {
        return None;
    }

    DAY_FIRST_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        .or_else(|| NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok())
}

/// ISO `YYYY-MM-DD`, or empty when the value is not a date.
pub fn format_date(raw: &str) -> String {
    parse_day_first_date(raw)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Booleans
// ---------------------------------------------------------------------------

/// `Some` only for the recognized tokens.
pub fn parse_yes_no(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "sim" => Some(true),
        // precomposed and decomposed tilde
        "não" | "na\u{303}o" | "nao" => Some(false),
        _ => None,
    }
}

pub fn yes_no(raw: &str) -> bool {
    parse_yes_no(raw).unwrap_or(false)
}

pub fn render_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

// ---------------------------------------------------------------------------
// Contracted kWh
// ---------------------------------------------------------------------------

/// Parse a decimal-comma quantity, keeping two decimals (toward zero).
pub fn parse_kwh(raw: &str) -> Option<f64> {
    let normalized = raw.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    let value: f64 = normalized.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(truncate_cents(value))
}

/// Cut the shortest decimal form after two fractional digits. Scaling by
/// 100 instead would misround values like 0.29 or 799.999999999.
fn truncate_cents(value: f64) -> f64 {
    let text = value.to_string();
    let cut = match text.find('.') {
        Some(dot) => &text[..text.len().min(dot + 3)],
        None => text.as_str(),
    };
    cut.parse::<f64>().map_or(value, |v| v + 0.0)
}

pub fn contracted_kwh(raw: &str) -> f64 {
    parse_kwh(raw).unwrap_or(0.0)
}

pub fn render_kwh(value: f64) -> String {
    format!("{value:.2}")
}

// ---------------------------------------------------------------------------
// Record pass
// ---------------------------------------------------------------------------

/// Apply every field rule to one remapped record.
pub fn apply_field_rules(
    record: &mut OutputRecord,
    row: usize,
    strict: bool,
    notices: &mut Vec<CoercionNotice>,
) {
    let key = record.key.clone();
    let mut notice = |field: &str, value: &str| {
        if strict && !value.trim().is_empty() {
            notices.push(CoercionNotice {
                row,
                key: key.clone(),
                field: field.to_string(),
                value: value.to_string(),
            });
        }
    };

    let document = record.get(schema::DOCUMENTO).unwrap_or("").to_string();
    record.set(schema::DOCUMENTO, format_document(&document));

    for field in schema::DATE_FIELDS {
        let raw = record.get(field).unwrap_or("").to_string();
        let formatted = format_date(&raw);
        if formatted.is_empty() {
            notice(field, &raw);
        }
        record.set(field, formatted);
    }

    for field in schema::BOOLEAN_FIELDS {
        let raw = record.get(field).unwrap_or("").to_string();
        let parsed = parse_yes_no(&raw);
        if parsed.is_none() {
            notice(field, &raw);
        }
        record.set(field, render_bool(parsed.unwrap_or(false)));
    }

    record.set(schema::VALIDACAO_INFOS_DISTRIBUIDORA, render_bool(false));

    let kwh_raw = record.get(schema::KWH_CONTRATADO).unwrap_or("").to_string();
    let kwh = parse_kwh(&kwh_raw);
    if kwh.is_none() {
        notice(schema::KWH_CONTRATADO, &kwh_raw);
    }
    record.set(schema::KWH_CONTRATADO, render_kwh(kwh.unwrap_or(0.0)));
}
