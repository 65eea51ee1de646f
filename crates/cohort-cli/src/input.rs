//! `SEGMENT,IDENTIFIER` row files.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, bail};

/// Read every `(segment, identifier)` pair from a CSV file.
///
/// Columns past the second are ignored.
pub fn read_segment_rows(
    path: &Path,
    has_header: bool,
    delimiter: char,
) -> anyhow::Result<Vec<(String, String)>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    read_segment_rows_from(std::io::BufReader::new(file), has_header, delimiter)
        .with_context(|| format!("failed to read {}", path.display()))
}

pub fn read_segment_rows_from<R: Read>(
    reader: R,
    has_header: bool,
    delimiter: char,
) -> anyhow::Result<Vec<(String, String)>> {
    let Ok(delimiter) = u8::try_from(delimiter) else {
        bail!("delimiter '{delimiter}' must be a single-byte character");
    };

    let mut csv = csv::ReaderBuilder::new()
        .has_headers(has_header)
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in csv.records() {
        let record = record?;
        match (record.get(0), record.get(1)) {
            (Some(segment), Some(id)) if !segment.is_empty() && !id.is_empty() => {
                rows.push((segment.to_string(), id.to_string()));
            }
            _ => {
                let line = record.position().map_or(0, csv::Position::line);
                bail!("line {line}: expected SEGMENT{}IDENTIFIER", char::from(delimiter));
            }
        }
    }

    tracing::debug!(rows = rows.len(), "read segment rows");
    Ok(rows)
}
