use crate::error::Result;
use std::path::Path;

/// A plain string table: named columns plus rows of text cells.
///
/// Used at the boundaries where column sets are not known at compile time:
/// external datasets joined into the primary one, and the tables handed to
/// the report renderer. Cells are always text; absent values are empty
/// strings.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a row, padding or truncating it to the table width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    /// Cell value by row index and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// New table keeping only the named columns that actually exist, in the
    /// given order. Columns not present are silently dropped from the
    /// selection.
    pub fn select(&self, names: &[&str]) -> Table {
        let picked: Vec<usize> = names
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect();

        let columns = picked.iter().map(|&i| self.columns[i].clone()).collect();
        let mut out = Table::new(columns);
        for row in &self.rows {
            out.push_row(picked.iter().map(|&i| row[i].clone()).collect());
        }
        out
    }

    /// Sort rows descending by the named column (text comparison; ISO dates
    /// order correctly). Empty cells sort last. No-op if the column does not
    /// exist.
    pub fn sort_desc_by(&mut self, column: &str) {
        let Some(idx) = self.column_index(column) else {
            return;
        };
        self.rows.sort_by(|a, b| {
            match (a[idx].is_empty(), b[idx].is_empty()) {
                (true, true) => std::cmp::Ordering::Equal,
                (true, false) => std::cmp::Ordering::Greater,
                (false, true) => std::cmp::Ordering::Less,
                (false, false) => b[idx].cmp(&a[idx]),
            }
        });
    }

    pub fn load(path: &Path) -> Result<Table> {
        let mut reader = csv::Reader::from_path(path)?;
        let columns: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let mut table = Table::new(columns);
        for record in reader.records() {
            let record = record?;
            table.push_row(record.iter().map(String::from).collect());
        }
        Ok(table)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}
