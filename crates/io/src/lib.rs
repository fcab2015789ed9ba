// Roster file I/O: locating inputs, reading CSV/Excel tables, writing
// quoted CSV rosters and Excel reports.

pub mod csv;
pub mod error;
pub mod locate;
pub mod output;
pub mod quoted;
pub mod xlsx;

use std::path::{Path, PathBuf};

use padron_recon::config::RoleConfig;
use padron_recon::Table;
use tracing::info;

pub use error::IoError;
pub use locate::{locate, resolve_input};
pub use output::{timestamp, write_artifact};
pub use xlsx::SheetSelector;

/// Read a table from a CSV or workbook file. CSV files have a single
/// sheet, so the selector is ignored for them.
pub fn read_table(path: &Path, selector: &SheetSelector, header_row: usize) -> Result<Table, IoError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" | "txt" => csv::read_table(path, header_row),
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => xlsx::read_table(path, selector, header_row),
        _ => Err(IoError::Unsupported(path.to_path_buf())),
    }
}

/// Locate and read a role's input under `data_dir`.
pub fn read_role(data_dir: &Path, role_name: &str, role: &RoleConfig) -> Result<(PathBuf, Table), IoError> {
    let path = resolve_input(data_dir, &role.file)?;
    let selector = SheetSelector::from_role(role.sheet.as_deref(), role.sheet_contains.as_deref());
    let table = read_table(&path, &selector, role.header_row)?;
    info!(
        role = role_name,
        file = %path.display(),
        rows = table.len(),
        columns = table.headers.len(),
        "input loaded"
    );
    Ok((path, table))
}

/// Turn raw records into a table: row `header_row` becomes the headers
/// (trimmed), later rows the data. Blank rows are dropped and short rows
/// padded to the header width.
pub(crate) fn split_header(records: Vec<Vec<String>>, header_row: usize) -> Table {
    let mut iter = records.into_iter().skip(header_row);
    let headers: Vec<String> = iter
        .next()
        .unwrap_or_default()
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();
    let width = headers.len();

    let rows = iter
        .filter(|r| r.iter().any(|c| !c.trim().is_empty()))
        .map(|mut r| {
            if r.len() < width {
                r.resize(width, String::new());
            }
            r
        })
        .collect();

    Table::new(headers, rows)
}
