// Tests for dataset persistence

use chrono::{NaiveDate, TimeZone, Utc};
use pagerot_core::dataset::{Dataset, read_url_list};
use pagerot_core::model::{EXPORT_COLUMNS, Language, PageRecord};
use pagerot_core::table::Table;
use std::fs;
use tempfile::TempDir;

fn record(url: &str, created: Option<NaiveDate>) -> PageRecord {
    PageRecord {
        url: url.to_string(),
        language: Language::Da,
        title: "En artikel".to_string(),
        date_created: created,
        date_modified: NaiveDate::from_ymd_opt(2025, 2, 1),
        tags: vec!["ledelse".to_string(), "strategi".to_string()],
        scraped_at: Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap(),
    }
}

// ============================================================================
// CSV round trip
// ============================================================================

#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dataset.csv");

    let dataset = Dataset::from_records(vec![
        record("https://x.com/artikler/a", NaiveDate::from_ymd_opt(2024, 3, 1)),
        record("https://x.com/artikler/b", NaiveDate::from_ymd_opt(2025, 1, 1)),
    ]);
    dataset.save(&path).unwrap();

    let loaded = Dataset::load(&path).unwrap();
    assert_eq!(loaded.len(), 2);

    let a = loaded.get("https://x.com/artikler/a").unwrap();
    assert_eq!(a.language, Language::Da);
    assert_eq!(a.title, "En artikel");
    assert_eq!(a.date_created, NaiveDate::from_ymd_opt(2024, 3, 1));
    assert_eq!(a.tags, vec!["ledelse".to_string(), "strategi".to_string()]);
    assert_eq!(
        a.scraped_at,
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap()
    );
}

#[test]
fn test_save_writes_export_columns_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dataset.csv");

    Dataset::from_records(vec![record("https://x.com/artikler/a", None)])
        .save(&path)
        .unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let header = content.lines().next().unwrap();
    assert_eq!(header, EXPORT_COLUMNS.join(","));
}

#[test]
fn test_save_sorts_by_date_created_descending_undated_last() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dataset.csv");

    let dataset = Dataset::from_records(vec![
        record("https://x.com/artikler/old", NaiveDate::from_ymd_opt(2023, 1, 1)),
        record("https://x.com/artikler/undated", None),
        record("https://x.com/artikler/new", NaiveDate::from_ymd_opt(2025, 1, 1)),
    ]);
    dataset.save(&path).unwrap();

    let loaded = Dataset::load(&path).unwrap();
    let urls: Vec<&str> = loaded.records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://x.com/artikler/new",
            "https://x.com/artikler/old",
            "https://x.com/artikler/undated",
        ]
    );
}

#[test]
fn test_missing_dates_round_trip_as_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dataset.csv");

    let mut bare = record("https://x.com/artikler/a", None);
    bare.date_modified = None;
    bare.tags = Vec::new();
    bare.title = String::new();
    Dataset::from_records(vec![bare]).save(&path).unwrap();

    let loaded = Dataset::load(&path).unwrap();
    let r = loaded.get("https://x.com/artikler/a").unwrap();
    assert_eq!(r.date_created, None);
    assert_eq!(r.date_modified, None);
    assert!(r.tags.is_empty());
    assert!(r.title.is_empty());
}

#[test]
fn test_load_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(Dataset::load(&dir.path().join("nope.csv")).is_err());
}

// ============================================================================
// Table view and generic table IO
// ============================================================================

#[test]
fn test_to_table_uses_export_columns() {
    let dataset = Dataset::from_records(vec![record(
        "https://x.com/artikler/a",
        NaiveDate::from_ymd_opt(2024, 3, 1),
    )]);

    let table = dataset.to_table();

    assert_eq!(table.columns(), &EXPORT_COLUMNS.map(String::from));
    assert_eq!(table.value(0, "url"), Some("https://x.com/artikler/a"));
    assert_eq!(table.value(0, "language"), Some("DA"));
    assert_eq!(table.value(0, "date_created"), Some("2024-03-01"));
    assert_eq!(table.value(0, "tags"), Some("ledelse; strategi"));
}

#[test]
fn test_table_select_and_sort() {
    let mut table = Table::new(vec![
        "url".to_string(),
        "title".to_string(),
        "date_created".to_string(),
    ]);
    table.push_row(vec!["a".to_string(), "Old".to_string(), "2023-01-01".to_string()]);
    table.push_row(vec!["b".to_string(), "Undated".to_string(), String::new()]);
    table.push_row(vec!["c".to_string(), "New".to_string(), "2025-01-01".to_string()]);

    let mut selected = table.select(&["title", "date_created", "missing"]);
    assert_eq!(selected.columns(), &["title".to_string(), "date_created".to_string()]);

    selected.sort_desc_by("date_created");
    assert_eq!(selected.value(0, "title"), Some("New"));
    assert_eq!(selected.value(1, "title"), Some("Old"));
    // Empty dates sort last.
    assert_eq!(selected.value(2, "title"), Some("Undated"));
}

#[test]
fn test_table_round_trip_preserves_arbitrary_columns() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("external.csv");

    let mut table = Table::new(vec!["url".to_string(), "clicks".to_string()]);
    table.push_row(vec!["https://x.com/a".to_string(), "42".to_string()]);
    table.save(&path).unwrap();

    let loaded = Table::load(&path).unwrap();
    assert_eq!(loaded, table);
}

// ============================================================================
// URL list files
// ============================================================================

#[test]
fn test_read_url_list_skips_blanks_and_comments() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("urls.txt");
    fs::write(
        &path,
        "# seed list\n\nhttps://x.com/articles/b\nhttps://x.com/articles/a\n  \nhttps://x.com/articles/a\n",
    )
    .unwrap();

    let urls = read_url_list(&path).unwrap();

    assert_eq!(
        urls,
        vec![
            "https://x.com/articles/a".to_string(),
            "https://x.com/articles/b".to_string(),
        ]
    );
}
