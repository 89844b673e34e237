//! Columnar string table used for every intermediate and output artifact

use serde::{Deserialize, Serialize};

/// A cell; `None` is an absent value (empty spreadsheet cell)
pub type Cell = Option<String>;

/// Ordered columns and rows of optional string cells
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create an empty table with the given columns
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; short rows are padded with absent cells, long rows truncated
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    /// Builder form of [`Table::push_row`] taking plain strings
    pub fn with_row<I, S>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_row(row.into_iter().map(|s| Some(s.into())).collect());
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell value at `row` in column `name`
    pub fn get(&self, row: usize, name: &str) -> Option<&str> {
        let col = self.column_index(name)?;
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// All cells of one column; absent column yields nothing
    pub fn column(&self, name: &str) -> Vec<Option<&str>> {
        match self.column_index(name) {
            Some(col) => self.rows.iter().map(|r| r[col].as_deref()).collect(),
            None => Vec::new(),
        }
    }

    /// Indices of rows whose `key` column equals `value`
    pub fn find_rows(&self, key: &str, value: &str) -> Vec<usize> {
        let Some(col) = self.column_index(key) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r[col].as_deref() == Some(value))
            .map(|(i, _)| i)
            .collect()
    }

    /// Row-wise concatenation over the union of both column sets.
    ///
    /// Columns keep first-seen order; cells missing on one side are absent.
    pub fn concat(mut self, other: Table) -> Table {
        for name in &other.columns {
            if !self.has_column(name) {
                self.columns.push(name.clone());
            }
        }
        let width = self.columns.len();
        for row in &mut self.rows {
            row.resize(width, None);
        }

        let mapping: Vec<usize> = other
            .columns
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect();
        for row in other.rows {
            let mut out = vec![None; width];
            for (cell, &target) in row.into_iter().zip(&mapping) {
                out[target] = cell;
            }
            self.rows.push(out);
        }
        self
    }

    /// Right outer join of `right` onto `self` by `key`.
    ///
    /// Output rows follow `right`'s order. Each right row is repeated once per
    /// matching left row, or emitted once with absent left cells when nothing
    /// matches. Left rows without a partner are dropped. Columns are the left
    /// columns followed by the right's non-key columns; a column present on
    /// both sides is kept once, taking the left value and falling back to the
    /// right one.
    pub fn right_join(&self, right: &Table, key: &str) -> Table {
        let left_key = self.column_index(key);
        let right_key = right.column_index(key);

        let mut columns = self.columns.clone();
        if left_key.is_none() {
            columns.insert(0, key.to_string());
        }
        // right column index -> output column index
        let mut right_targets = Vec::with_capacity(right.columns.len());
        for name in &right.columns {
            match columns.iter().position(|c| c == name) {
                Some(pos) => right_targets.push(pos),
                None => {
                    columns.push(name.clone());
                    right_targets.push(columns.len() - 1);
                }
            }
        }
        let left_offset = usize::from(left_key.is_none());

        let mut out = Table::with_columns(columns);
        let width = out.columns.len();
        for right_row in &right.rows {
            let key_value = right_key.and_then(|k| right_row[k].as_deref());
            let matches: Vec<&Vec<Cell>> = match (left_key, key_value) {
                (Some(lk), Some(value)) => self
                    .rows
                    .iter()
                    .filter(|r| r[lk].as_deref() == Some(value))
                    .collect(),
                _ => Vec::new(),
            };

            let mut emit = |left_row: Option<&Vec<Cell>>| {
                let mut row = vec![None; width];
                if let Some(left_row) = left_row {
                    for (i, cell) in left_row.iter().enumerate() {
                        row[i + left_offset] = cell.clone();
                    }
                }
                for (cell, &target) in right_row.iter().zip(&right_targets) {
                    if row[target].is_none() {
                        row[target] = cell.clone();
                    }
                }
                out.rows.push(row);
            };

            if matches.is_empty() {
                emit(None);
            } else {
                for left_row in matches {
                    emit(Some(left_row));
                }
            }
        }
        out
    }

    /// Project onto `(source, target)` column pairs, renaming as it goes.
    ///
    /// A source column the table lacks becomes an all-absent column.
    pub fn select_renamed(&self, mapping: &[(&str, &str)]) -> Table {
        let sources: Vec<Option<usize>> = mapping
            .iter()
            .map(|(source, _)| self.column_index(source))
            .collect();
        let mut out = Table::with_columns(mapping.iter().map(|(_, target)| *target));
        for row in &self.rows {
            out.rows.push(
                sources
                    .iter()
                    .map(|src| src.and_then(|i| row[i].clone()))
                    .collect(),
            );
        }
        out
    }

    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Table {
        let mut table = Table::with_columns(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(table: &Table, name: &str) -> Vec<Option<String>> {
        table
            .column(name)
            .into_iter()
            .map(|c| c.map(String::from))
            .collect()
    }

    #[test]
    fn test_concat_unions_columns() {
        let epubs = Table::with_columns(["title", "ISBN"]).with_row(["Boek", "1"]);
        let pdfs = Table::with_columns(["ISBN", "Extensie"]).with_row(["2", "pdf"]);

        let all = epubs.concat(pdfs);
        assert_eq!(all.columns(), ["title", "ISBN", "Extensie"]);
        assert_eq!(all.len(), 2);
        assert_eq!(all.get(1, "ISBN"), Some("2"));
        assert_eq!(all.get(1, "title"), None);
        assert_eq!(all.get(0, "Extensie"), None);
    }

    #[test]
    fn test_concat_with_key_only_table() {
        let empty = Table::with_columns(["ISBN"]);
        let pdfs = Table::with_columns(["ISBN", "Extensie"]).with_row(["2", "pdf"]);
        let all = empty.concat(pdfs);
        assert_eq!(all.columns(), ["ISBN", "Extensie"]);
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_right_join_keeps_every_right_row() {
        let meta = Table::with_columns(["ISBN", "title"])
            .with_row(["1", "Een"])
            .with_row(["3", "Drie"]);
        let feed = Table::with_columns(["ISBN", "Actie"])
            .with_row(["1", "N"])
            .with_row(["2", "D"]);

        let joined = meta.right_join(&feed, "ISBN");
        assert_eq!(joined.columns(), ["ISBN", "title", "Actie"]);
        assert_eq!(cells(&joined, "ISBN"), vec![Some("1".into()), Some("2".into())]);
        assert_eq!(cells(&joined, "title"), vec![Some("Een".into()), None]);
        assert_eq!(cells(&joined, "Actie"), vec![Some("N".into()), Some("D".into())]);
    }

    #[test]
    fn test_right_join_repeats_per_match() {
        let meta = Table::with_columns(["ISBN", "Extensie"])
            .with_row(["1", "epub"])
            .with_row(["1", "pdf"]);
        let feed = Table::with_columns(["ISBN", "Actie"]).with_row(["1", "N"]);

        let joined = meta.right_join(&feed, "ISBN");
        assert_eq!(joined.len(), 2);
        assert_eq!(joined.get(1, "Extensie"), Some("pdf"));
        assert_eq!(joined.get(1, "Actie"), Some("N"));
    }

    #[test]
    fn test_right_join_shared_column_prefers_left() {
        let meta = Table::with_columns(["ISBN", "title"]).with_row(["1", "Links"]);
        let feed = Table::with_columns(["ISBN", "title", "Actie"])
            .with_row(["1", "Rechts", "N"])
            .with_row(["2", "Alleen rechts", "N"]);

        let joined = meta.right_join(&feed, "ISBN");
        assert_eq!(joined.columns(), ["ISBN", "title", "Actie"]);
        assert_eq!(joined.get(0, "title"), Some("Links"));
        assert_eq!(joined.get(1, "title"), Some("Alleen rechts"));
    }

    #[test]
    fn test_right_join_left_without_key_column() {
        let meta = Table::with_columns(["title"]).with_row(["Los"]);
        let feed = Table::with_columns(["ISBN", "Actie"]).with_row(["1", "N"]);

        let joined = meta.right_join(&feed, "ISBN");
        assert_eq!(joined.columns(), ["ISBN", "title", "Actie"]);
        assert_eq!(joined.get(0, "ISBN"), Some("1"));
        assert_eq!(joined.get(0, "title"), None);
    }

    #[test]
    fn test_select_renamed_fills_missing_columns() {
        let table = Table::with_columns(["title", "ISBN"]).with_row(["Boek", "1"]);
        let out = table.select_renamed(&[("ISBN", "ISBN"), ("title", "Titel"), ("Actie", "Actie")]);
        assert_eq!(out.columns(), ["ISBN", "Titel", "Actie"]);
        assert_eq!(out.get(0, "Titel"), Some("Boek"));
        assert_eq!(out.get(0, "Actie"), None);
    }

    #[test]
    fn test_push_row_pads_short_rows() {
        let mut table = Table::with_columns(["a", "b"]);
        table.push_row(vec![Some("x".into())]);
        assert_eq!(table.rows()[0], vec![Some("x".to_string()), None]);
    }
}
