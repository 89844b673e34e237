//! Merge engine: assembles this run's rows and reconciles them into the overview

use crate::types::{columns, Cell, Table};
use std::collections::BTreeMap;

/// Display name of the key column in the assembled and overview tables
pub const KEY: &str = columns::ISBN;

/// Stage 1: build the new-data table for this run.
///
/// EPUB and PDF rows are concatenated, then the delivery records are right
/// outer joined onto them by `ISBN`: every delivery record yields a row (with
/// empty metadata when no file matched), and file rows without a delivery
/// record are dropped. The result uses the display schema
/// (`ISBN, Titel, Auteur(s), ...`).
pub fn assemble_new_data(epubs: Table, pdfs: Table, deliveries: &Table) -> Table {
    let files = epubs.concat(pdfs);
    files
        .right_join(deliveries, columns::ISBN)
        .select_renamed(&columns::DISPLAY_SCHEMA)
}

/// Rows of one side of the reconcile, grouped by identifier
struct Collapsed {
    columns: Vec<String>,

    /// Present identifiers, duplicates coalesced cell by cell (later non-absent wins)
    keyed: BTreeMap<String, Vec<Cell>>,

    /// Rows without an identifier, untouched and in table order
    keyless: Vec<Vec<Cell>>,
}

fn collapse_by_key(table: &Table) -> Collapsed {
    let key_col = table.column_index(KEY);
    let mut keyed: BTreeMap<String, Vec<Cell>> = BTreeMap::new();
    let mut keyless = Vec::new();

    for row in table.rows() {
        let Some(key) = key_col.and_then(|k| row[k].clone()) else {
            keyless.push(row.clone());
            continue;
        };
        match keyed.get_mut(&key) {
            Some(existing) => {
                for (slot, cell) in existing.iter_mut().zip(row) {
                    if cell.is_some() {
                        *slot = cell.clone();
                    }
                }
            }
            None => {
                keyed.insert(key, row.clone());
            }
        }
    }

    Collapsed {
        columns: table.columns().to_vec(),
        keyed,
        keyless,
    }
}

/// Stage 2: reconcile the new-data table into the overview table.
///
/// Full outer join on `ISBN`. For every new-data column other than the key,
/// the merged cell is the new value when present and otherwise the overview
/// (`_oud`) value; the `_oud` columns themselves are not kept. Columns only
/// the overview has are carried over untouched and keep their position;
/// columns only the new data has are appended.
///
/// Rows sharing an identifier on either side are first collapsed into one,
/// later rows winning per cell, so the result has exactly one row per
/// identifier ever seen, sorted by identifier. Rows without an identifier
/// never match anything: each is kept as its own row after the keyed ones,
/// overview rows first.
pub fn reconcile(overview: &Table, new_data: &Table) -> Table {
    let old = collapse_by_key(overview);
    let new = collapse_by_key(new_data);

    let mut out_columns = old.columns.clone();
    if !out_columns.iter().any(|c| c == KEY) {
        out_columns.insert(0, KEY.to_string());
    }
    for name in &new.columns {
        if !out_columns.contains(name) {
            out_columns.push(name.clone());
        }
    }

    let position = |name: &str| out_columns.iter().position(|c| c == name);
    let old_targets: Vec<Option<usize>> = old.columns.iter().map(|c| position(c)).collect();
    let new_targets: Vec<Option<usize>> = new.columns.iter().map(|c| position(c)).collect();
    let key_target = position(KEY);
    let width = out_columns.len();

    let mut keys: Vec<&String> = old.keyed.keys().chain(new.keyed.keys()).collect();
    keys.sort();
    keys.dedup();

    let mut rows = Vec::with_capacity(keys.len() + old.keyless.len() + new.keyless.len());
    for key in keys {
        let mut row: Vec<Cell> = vec![None; width];
        if let Some(old_row) = old.keyed.get(key) {
            place(&mut row, old_row, &old_targets);
        }
        if let Some(new_row) = new.keyed.get(key) {
            place(&mut row, new_row, &new_targets);
        }
        if let Some(t) = key_target {
            row[t] = Some(key.clone());
        }
        rows.push(row);
    }
    for (keyless, targets) in [(&old.keyless, &old_targets), (&new.keyless, &new_targets)] {
        for source in keyless {
            let mut row: Vec<Cell> = vec![None; width];
            place(&mut row, source, targets);
            rows.push(row);
        }
    }

    Table::from_parts(out_columns, rows)
}

/// Copy the present cells of `source` into `row` at their output positions
fn place(row: &mut [Cell], source: &[Cell], targets: &[Option<usize>]) {
    for (cell, target) in source.iter().zip(targets) {
        if let (Some(t), Some(value)) = (target, cell) {
            row[*t] = Some(value.clone());
        }
    }
}
