// Excel input (calamine) and report output (rust_xlsxwriter)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use padron_recon::ReportSheet;
use padron_recon::Table;
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};
use tracing::debug;

use crate::error::IoError;

/// Which sheet of a workbook to read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SheetSelector {
    /// Exact sheet name.
    Name(String),
    /// Case-insensitive substring of the sheet name.
    Contains(String),
    #[default]
    First,
}

impl SheetSelector {
    pub fn from_role(sheet: Option<&str>, sheet_contains: Option<&str>) -> Self {
        match (sheet, sheet_contains) {
            (Some(name), _) => Self::Name(name.to_string()),
            (None, Some(part)) => Self::Contains(part.to_string()),
            (None, None) => Self::First,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Name(name) => name.clone(),
            Self::Contains(part) => format!("*{part}*"),
            Self::First => "<first>".to_string(),
        }
    }

    /// Pick a sheet name from the workbook's list.
    pub fn pick<'a>(&self, names: &'a [String]) -> Option<&'a String> {
        match self {
            Self::Name(name) => names.iter().find(|n| *n == name),
            Self::Contains(part) => {
                let part = part.to_lowercase();
                names.iter().find(|n| n.to_lowercase().contains(&part))
            }
            Self::First => names.first(),
        }
    }
}

fn open(path: &Path) -> Result<Sheets<std::io::BufReader<std::fs::File>>, IoError> {
    open_workbook_auto(path).map_err(|e| IoError::Read {
        path: path.to_path_buf(),
        message: format!("Failed to open Excel file: {e}"),
    })
}

/// Read one sheet as a table. Rows above `header_row` are discarded.
pub fn read_table(path: &Path, selector: &SheetSelector, header_row: usize) -> Result<Table, IoError> {
    let mut workbook = open(path)?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();

    let sheet_name = selector
        .pick(&sheet_names)
        .cloned()
        .ok_or_else(|| IoError::Sheet {
            path: path.to_path_buf(),
            sheet: selector.describe(),
        })?;

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| IoError::Read {
        path: path.to_path_buf(),
        message: format!("Failed to read sheet '{sheet_name}': {e}"),
    })?;

    // Data may not begin at A1; keep absolute positions so header_row
    // means the same thing as in the spreadsheet UI.
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut records: Vec<Vec<String>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut record = vec![String::new(); start_col as usize];
        record.extend(row.iter().map(cell_text));
        records.push(record);
    }

    debug!(file = %path.display(), sheet = %sheet_name, rows = records.len(), "sheet read");
    Ok(crate::split_header(records, header_row))
}

/// Render a cell the way it reads in Excel. Whole floats lose their
/// `.0` so numeric RUT columns stay usable as keys.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => format!("{}", n),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Write a single-sheet review workbook with a bold header row.
pub fn write_report(sheet: &ReportSheet, path: &Path) -> Result<(), IoError> {
    let write_err = |message: String| IoError::Write {
        path: path.to_path_buf(),
        message,
    };

    let mut xlsx_workbook = XlsxWorkbook::new();
    let bold = Format::new().set_bold();

    let worksheet = xlsx_workbook
        .add_worksheet()
        .set_name(&sheet.sheet_name)
        .map_err(|e| write_err(format!("Failed to create sheet '{}': {}", sheet.sheet_name, e)))?;

    for (col, header) in sheet.headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, header, &bold)
            .map_err(|e| write_err(format!("Failed to write header: {}", e)))?;
    }
    for (row_idx, row) in sheet.rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            worksheet
                .write_string(row_idx as u32 + 1, col as u16, value)
                .map_err(|e| write_err(format!("Failed to write cell: {}", e)))?;
        }
    }
    if !sheet.headers.is_empty() {
        worksheet.autofit();
    }

    xlsx_workbook
        .save(path)
        .map_err(|e| write_err(format!("Failed to save XLSX file: {}", e)))?;
    Ok(())
}
