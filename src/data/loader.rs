use std::io::Read;
use std::path::Path;

use crate::error::{LoadError, LoadResult};

// ---------------------------------------------------------------------------
// RawTable – rows as read from the source
// ---------------------------------------------------------------------------

/// Tokens read as "no value", the same set pandas' CSV reader treats as NA.
const NA_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Untyped source rows. Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Header names exactly as they appear in the file.
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the crash table from a file. Only `.csv` (or extension-less) paths
/// are accepted.
pub fn load_file(path: &Path) -> LoadResult<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" | "" => {
            let file = std::fs::File::open(path)?;
            let table = read_csv(file)?;
            log::info!(
                "Read {} rows x {} columns from {}",
                table.len(),
                table.headers.len(),
                path.display()
            );
            if table.is_empty() {
                log::warn!("{} has a header row but no records", path.display());
            }
            Ok(table)
        }
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

/// Parse CSV text from any reader.
///
/// Short rows are padded with absent cells and long rows truncated. Rows the
/// CSV reader rejects are skipped with a warning.
pub fn read_csv<R: Read>(reader: R) -> LoadResult<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::NoHeaders);
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.byte_records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Skipping CSV row {row_no}: {e}");
                continue;
            }
        };

        let row = (0..headers.len())
            .map(|i| {
                record
                    .get(i)
                    .map(|cell| String::from_utf8_lossy(cell).into_owned())
                    .and_then(na_to_absent)
            })
            .collect();
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

fn na_to_absent(cell: String) -> Option<String> {
    if cell.is_empty() || NA_TOKENS.contains(&cell.as_str()) {
        None
    } else {
        Some(cell)
    }
}
