use crate::error::Result;
use crate::model::{EXPORT_COLUMNS, PageRecord};
use crate::table::Table;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// The persisted table of page records, keyed by URL.
///
/// Loaded from and saved to a UTF-8 CSV file with the columns in
/// [`EXPORT_COLUMNS`]. Saving sorts by `date_created` descending, records
/// without a creation date last.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<PageRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<PageRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn urls(&self) -> HashSet<String> {
        self.records.iter().map(|r| r.url.clone()).collect()
    }

    pub fn get(&self, url: &str) -> Option<&PageRecord> {
        self.records.iter().find(|r| r.url == url)
    }

    pub fn push(&mut self, record: PageRecord) {
        self.records.push(record);
    }

    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for record in reader.deserialize::<PageRecord>() {
            records.push(record?);
        }
        info!(count = records.len(), path = %path.display(), "loaded dataset");
        Ok(Self { records })
    }

    /// Write the dataset as CSV, sorted by `date_created` descending.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut sorted = self.records.clone();
        // Option<NaiveDate> orders None first, so reversing puts the
        // undated records at the bottom.
        sorted.sort_by(|a, b| b.date_created.cmp(&a.date_created));

        let mut writer = csv::Writer::from_path(path)?;
        for record in &sorted {
            writer.serialize(record)?;
        }
        writer.flush()?;
        info!(count = sorted.len(), path = %path.display(), "saved dataset");
        Ok(())
    }

    /// String-table view in [`EXPORT_COLUMNS`] order, for joins and reports.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(EXPORT_COLUMNS.iter().map(|c| c.to_string()).collect());
        for record in &self.records {
            table.push_row(record.to_row());
        }
        table
    }
}

/// Read a manual URL list: one URL per line, blank lines and lines starting
/// with `#` ignored. Returns a sorted, deduplicated list.
pub fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    let mut urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect();
    urls.sort();
    urls.dedup();
    Ok(urls)
}
