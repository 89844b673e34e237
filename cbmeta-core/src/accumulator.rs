//! Column-wise accumulation of per-file records into a table

use crate::types::{columns, Cell, MetadataRecord, Table};

/// Folds records into `column -> ordered values`.
///
/// Records may have differing key sets: a key seen for the first time is
/// back-filled with absent cells, and a key missing from a record gets an
/// absent cell, so every column always has one value per record.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    columns: Vec<(String, Vec<Cell>)>,
    rows: usize,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    fn column_mut(&mut self, key: &str) -> &mut Vec<Cell> {
        let idx = match self.columns.iter().position(|(name, _)| name == key) {
            Some(i) => i,
            None => {
                self.columns.push((key.to_string(), vec![None; self.rows]));
                self.columns.len() - 1
            }
        };
        &mut self.columns[idx].1
    }

    fn pad(&mut self) {
        for (_, values) in &mut self.columns {
            values.resize(self.rows, None);
        }
    }

    /// Append one record
    pub fn push(&mut self, record: &MetadataRecord) {
        for (key, value) in record.iter() {
            self.column_mut(key).push(Some(value.to_string()));
        }
        self.rows += 1;
        self.pad();
    }

    /// Append every record of `other` after this one's
    pub fn append(&mut self, other: Accumulator) {
        let base = self.rows;
        for (key, values) in other.columns {
            let column = self.column_mut(&key);
            column.resize(base, None);
            column.extend(values);
        }
        self.rows += other.rows;
        self.pad();
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Convert to a table; an empty accumulator becomes an `ISBN`-only table
    pub fn into_table(self) -> Table {
        if self.rows == 0 {
            return Table::with_columns([columns::ISBN]);
        }
        let names: Vec<String> = self.columns.iter().map(|(n, _)| n.clone()).collect();
        let mut rows = vec![Vec::with_capacity(names.len()); self.rows];
        for (_, values) in self.columns {
            for (row, value) in rows.iter_mut().zip(values) {
                row.push(value);
            }
        }
        Table::from_parts(names, rows)
    }
}
