//! Overview and archive workbook I/O
//!
//! Every cell is handled as text; numeric cells read back as integers when
//! they have no fraction, so an `ISBN` stored as a number stays a 13-digit
//! string.

use crate::error::WorkbookError;
use crate::types::{Cell, Table};
use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};
use std::collections::HashSet;
use std::path::Path;

/// Largest float still rendered as a plain integer
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn cell_text(cell: &Data) -> Cell {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT_INTEGER => {
            Some(format!("{}", *f as i64))
        }
        Data::Float(f) => Some(f.to_string()),
        other => Some(other.to_string()),
    }
}

/// Suffix repeated header names `.1`, `.2`, ... so every column name is distinct
fn unique_headers(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for name in names {
        let mut candidate = name.clone();
        let mut n = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}.{}", name, n);
            n += 1;
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

/// Read every sheet of a workbook and concatenate them into one table.
///
/// The first row of each sheet is its header. Sheets may have different
/// columns; the result has their union in first-seen order.
pub fn read_workbook(path: &Path) -> Result<Table, WorkbookError> {
    let read_err = |message: String| WorkbookError::Read {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| read_err(format!("{}", e)))?;
    let mut combined: Option<Table> = None;

    for sheet in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| read_err(format!("sheet '{}': {}", sheet, e)))?;
        let mut rows = range.rows();

        let Some(header) = rows.next() else {
            tracing::debug!("Sheet '{}' in {:?} is empty", sheet, path);
            continue;
        };
        let columns = unique_headers(
            header
                .iter()
                .enumerate()
                .map(|(i, cell)| cell_text(cell).unwrap_or_else(|| format!("Unnamed: {}", i))),
        );
        if columns.is_empty() {
            return Err(WorkbookError::MissingHeader {
                path: path.to_path_buf(),
                sheet,
            });
        }

        let mut table = Table::with_columns(columns);
        for row in rows {
            table.push_row(row.iter().map(cell_text).collect());
        }
        tracing::debug!("Read {} rows from sheet '{}'", table.len(), sheet);

        combined = Some(match combined {
            Some(acc) => acc.concat(table),
            None => table,
        });
    }

    Ok(combined.unwrap_or_default())
}

/// Write a table as a single-sheet workbook with a bold header row.
///
/// Absent and empty cells are left blank.
pub fn write_workbook(table: &Table, path: &Path) -> Result<(), WorkbookError> {
    let write_err = |message: String| WorkbookError::Write {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header = Format::new().set_bold();

    for (col, name) in table.columns().iter().enumerate() {
        let col = u16::try_from(col).map_err(|e| write_err(e.to_string()))?;
        worksheet
            .write_string_with_format(0, col, name, &header)
            .map_err(|e| write_err(e.to_string()))?;
    }

    for (r, row) in table.rows().iter().enumerate() {
        let r = u32::try_from(r + 1).map_err(|e| write_err(e.to_string()))?;
        for (col, cell) in row.iter().enumerate() {
            let Some(text) = cell.as_deref().filter(|t| !t.is_empty()) else {
                continue;
            };
            let col = u16::try_from(col).map_err(|e| write_err(e.to_string()))?;
            worksheet
                .write_string(r, col, text)
                .map_err(|e| write_err(e.to_string()))?;
        }
    }
    worksheet.autofit();

    workbook.save(path).map_err(|e| write_err(e.to_string()))?;
    tracing::debug!("Wrote {} rows to {:?}", table.len(), path);
    Ok(())
}
