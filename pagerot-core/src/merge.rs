use crate::dataset::Dataset;
use crate::model::{Language, MergeStrategy, PageRecord};
use crate::table::Table;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Reconcile freshly scraped records into an existing dataset under the
/// selected strategy, keyed by `url`.
///
/// `Skip` and `Update` preserve URL uniqueness (given a unique input);
/// `Append` deliberately does not.
pub fn merge(existing: Dataset, fresh: Vec<PageRecord>, strategy: MergeStrategy) -> Dataset {
    info!(strategy = strategy.as_str(), incoming = fresh.len(), "merging records");

    match strategy {
        MergeStrategy::Skip => {
            let mut known = existing.urls();
            let mut merged = existing;
            let mut added = 0usize;
            for record in fresh {
                if known.insert(record.url.clone()) {
                    merged.push(record);
                    added += 1;
                }
            }
            debug!(added, "skip merge complete");
            merged
        }
        MergeStrategy::Update => {
            let mut merged = existing;
            // Indexes appended records too, so repeated URLs within the
            // incoming batch collapse into one.
            let mut index: HashMap<String, usize> = merged
                .records
                .iter()
                .enumerate()
                .map(|(i, r)| (r.url.clone(), i))
                .collect();
            for record in fresh {
                match index.get(&record.url) {
                    Some(&i) => apply_update(&mut merged.records[i], &record),
                    None => {
                        index.insert(record.url.clone(), merged.len());
                        merged.push(record);
                    }
                }
            }
            merged
        }
        MergeStrategy::Append => {
            let mut merged = existing;
            merged.records.extend(fresh);
            merged
        }
    }
}

/// Overwrite each field of `existing` with the incoming value, except where
/// the incoming value is empty: an empty incoming field never clobbers a
/// populated existing one. `scraped_at` is always refreshed.
fn apply_update(existing: &mut PageRecord, incoming: &PageRecord) {
    if incoming.language != Language::Unknown {
        existing.language = incoming.language;
    }
    if !incoming.title.is_empty() {
        existing.title = incoming.title.clone();
    }
    if incoming.date_created.is_some() {
        existing.date_created = incoming.date_created;
    }
    if incoming.date_modified.is_some() {
        existing.date_modified = incoming.date_modified;
    }
    if !incoming.tags.is_empty() {
        existing.tags = incoming.tags.clone();
    }
    existing.scraped_at = incoming.scraped_at;
}

/// Full outer join of two string tables on `key`.
///
/// Every key present in either table appears exactly once in the result.
/// External columns whose name collides with a primary column are suffixed
/// `_external`. If the key column is missing from either side the primary
/// table is returned unchanged (structural failure is non-fatal).
pub fn outer_join(primary: &Table, external: &Table, key: &str) -> Table {
    let (Some(pk), Some(ek)) = (primary.column_index(key), external.column_index(key)) else {
        warn!(key, "join key not found in both datasets, keeping primary unchanged");
        return primary.clone();
    };

    let mut columns: Vec<String> = primary.columns().to_vec();
    // (index into external row, output column name)
    let mut ext_cols: Vec<usize> = Vec::new();
    for (i, name) in external.columns().iter().enumerate() {
        if i == ek {
            continue;
        }
        let out_name = if primary.column_index(name).is_some() {
            format!("{name}_external")
        } else {
            name.clone()
        };
        columns.push(out_name);
        ext_cols.push(i);
    }

    let mut result = Table::new(columns);

    let mut external_by_key: HashMap<&str, &Vec<String>> = HashMap::new();
    for row in external.rows() {
        external_by_key.entry(row[ek].as_str()).or_insert(row);
    }

    let mut emitted: HashSet<&str> = HashSet::new();
    for row in primary.rows() {
        let k = row[pk].as_str();
        if !emitted.insert(k) {
            continue;
        }
        let mut out = row.clone();
        match external_by_key.get(k) {
            Some(ext_row) => {
                for &i in &ext_cols {
                    out.push(ext_row[i].clone());
                }
            }
            None => out.extend(ext_cols.iter().map(|_| String::new())),
        }
        result.push_row(out);
    }

    for row in external.rows() {
        let k = row[ek].as_str();
        if !emitted.insert(k) {
            continue;
        }
        let mut out = vec![String::new(); primary.width()];
        out[pk] = k.to_string();
        for &i in &ext_cols {
            out.push(row[i].clone());
        }
        result.push_row(out);
    }

    info!(total = result.len(), "outer join complete");
    result
}
