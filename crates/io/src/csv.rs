// Delimited text import and bulk-import export

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use prosumer_recon::{OutputRecord, SourceTable, DESTINATION_COLUMNS};

use crate::error::FileError;

const UTF8_BOM: &str = "\u{feff}";

/// Output delimiter expected by the bulk-import system.
pub const OUTPUT_DELIMITER: u8 = b';';

pub fn read_table(path: &Path) -> Result<SourceTable, FileError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    log::debug!("{}: delimiter {:?}", path.display(), delimiter as char);
    parse_table(&content, delimiter).map_err(|e| match e {
        ParseFailure::NoHeader => FileError::NoHeader {
            path: path.to_path_buf(),
        },
        ParseFailure::Csv(e) => FileError::parse(path, e),
    })
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(10)
        .collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the header line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: (number of lines with same field count as line 1) * field_count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (Windows-1252 fallback). A leading BOM is dropped.
pub fn read_file_as_utf8(path: &Path) -> Result<String, FileError> {
    let read_err = |source| FileError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            log::debug!("{}: not UTF-8, decoding as Windows-1252", path.display());
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match text.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

#[derive(Debug)]
pub enum ParseFailure {
    NoHeader,
    Csv(csv::Error),
}

/// First non-blank record is the header; fully blank records are skipped.
pub fn parse_table(content: &str, delimiter: u8) -> Result<SourceTable, ParseFailure> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut table: Option<SourceTable> = None;
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = result.map_err(ParseFailure::Csv)?;
        if record.iter().all(|field| field.trim().is_empty()) {
            skipped += 1;
            continue;
        }
        let cells: Vec<String> = record.iter().map(|field| field.to_string()).collect();
        match table.as_mut() {
            Some(t) => t.push_row(cells),
            None => table = Some(SourceTable::new(cells)),
        }
    }

    let table = table.ok_or(ParseFailure::NoHeader)?;
    log::debug!(
        "parsed {} rows x {} columns ({} blank rows skipped)",
        table.len(),
        table.headers().len(),
        skipped
    );
    Ok(table)
}

/// Write records as the bulk-import file: UTF-8 with BOM, `;`-delimited,
/// header = destination columns in schema order.
pub fn write_output(path: &Path, records: &[OutputRecord]) -> Result<(), FileError> {
    let file = File::create(path).map_err(|source| FileError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    write_output_to(BufWriter::new(file), records)
}

pub fn write_output_to<W: Write>(mut out: W, records: &[OutputRecord]) -> Result<(), FileError> {
    out.write_all(UTF8_BOM.as_bytes())
        .map_err(|e| FileError::Output(e.to_string()))?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(OUTPUT_DELIMITER)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);

    writer
        .write_record(DESTINATION_COLUMNS)
        .map_err(|e| FileError::Output(e.to_string()))?;
    for record in records {
        writer
            .write_record(record.values())
            .map_err(|e| FileError::Output(e.to_string()))?;
    }

    writer.flush().map_err(|e| FileError::Output(e.to_string()))?;
    Ok(())
}
