// Report tables handed to the external renderer. The renderer owns layout
// and styling; the columns and values here are the data contract.

use crate::dataset::Dataset;
use crate::model::{Freshness, PageRecord, format_date};
use crate::table::Table;
use chrono::NaiveDate;
use std::collections::HashMap;
use url::Url;

pub const CURRENT_COLUMNS: [&str; 7] = [
    "title",
    "path",
    "freshness",
    "language",
    "date_modified",
    "date_created",
    "tags",
];

pub const CHANGES_COLUMNS: [&str; 6] = [
    "title",
    "path",
    "status_change",
    "freshness_previous",
    "freshness_current",
    "date_modified",
];

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// One row per record with its freshness classified at `today`.
pub fn build_current_table(dataset: &Dataset, today: NaiveDate) -> Table {
    let mut table = Table::new(CURRENT_COLUMNS.iter().map(|c| c.to_string()).collect());
    for record in &dataset.records {
        let freshness = Freshness::classify(record.date_modified, today);
        table.push_row(vec![
            record.title.clone(),
            extract_url_path(&record.url),
            freshness.as_str().to_string(),
            record.language.as_str().to_string(),
            format_date(record.date_modified),
            format_date(record.date_created),
            record.tags.join("; "),
        ]);
    }
    table
}

/// Rows for pages that are new since `previous` or whose freshness class
/// changed. Unchanged pages do not appear.
pub fn build_changes_table(previous: &Dataset, current: &Dataset, today: NaiveDate) -> Table {
    let previous_by_url: HashMap<&str, &PageRecord> = previous
        .records
        .iter()
        .map(|r| (r.url.as_str(), r))
        .collect();

    let mut table = Table::new(CHANGES_COLUMNS.iter().map(|c| c.to_string()).collect());
    for record in &current.records {
        let current_freshness = Freshness::classify(record.date_modified, today);
        let (status_change, previous_freshness) = match previous_by_url.get(record.url.as_str()) {
            None => ("New page".to_string(), String::new()),
            Some(prev) => {
                let previous_freshness = Freshness::classify(prev.date_modified, today);
                if previous_freshness == current_freshness {
                    continue;
                }
                let status = if current_freshness.rank() > previous_freshness.rank() {
                    format!("Improved ({previous_freshness} -> {current_freshness})")
                } else {
                    format!("Degraded ({previous_freshness} -> {current_freshness})")
                };
                (status, previous_freshness.as_str().to_string())
            }
        };

        table.push_row(vec![
            record.title.clone(),
            extract_url_path(&record.url),
            status_change,
            previous_freshness,
            current_freshness.as_str().to_string(),
            format_date(record.date_modified),
        ]);
    }
    table
}
