use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

/// Column order of the persisted dataset. Also the export order for
/// tables derived from one.
pub const EXPORT_COLUMNS: [&str; 7] = [
    "url",
    "language",
    "title",
    "date_created",
    "date_modified",
    "tags",
    "scraped_at",
];

/// Content language of a page, inferred from its URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Da,
    En,
    Unknown,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Da => "DA",
            Language::En => "EN",
            Language::Unknown => "",
        }
    }

    /// Infer the language from URL path conventions: an explicit `/da/` or
    /// `/en/` segment wins, otherwise the article path marker decides
    /// (`/artikler/` is Danish, `/articles/` is English).
    pub fn from_url(url: &str) -> Self {
        let lower = url.to_ascii_lowercase();
        if lower.contains("/da/") {
            Language::Da
        } else if lower.contains("/en/") {
            Language::En
        } else if lower.contains("/artikler/") {
            Language::Da
        } else if lower.contains("/articles/") {
            Language::En
        } else {
            Language::Unknown
        }
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.trim().to_ascii_uppercase().as_str() {
            "DA" => Language::Da,
            "EN" => Language::En,
            _ => Language::Unknown,
        })
    }
}

/// Staleness category derived from the time elapsed since last modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Rotting,
    Outdated,
}

impl Freshness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Freshness::Fresh => "Fresh",
            Freshness::Rotting => "Rotting",
            Freshness::Outdated => "Outdated",
        }
    }

    /// Classify a page by the age of its last modification at `today`:
    /// under 6 months is `Fresh`, 6 to 12 months is `Rotting`, 12 months
    /// or more (or no modification date at all) is `Outdated`.
    pub fn classify(date_modified: Option<NaiveDate>, today: NaiveDate) -> Self {
        let Some(modified) = date_modified else {
            return Freshness::Outdated;
        };

        let six_months = modified.checked_add_months(Months::new(6));
        let twelve_months = modified.checked_add_months(Months::new(12));

        match (six_months, twelve_months) {
            (Some(six), _) if today < six => Freshness::Fresh,
            (_, Some(twelve)) if today < twelve => Freshness::Rotting,
            _ => Freshness::Outdated,
        }
    }

    /// Ordering used for change detection: higher is better.
    pub fn rank(&self) -> u8 {
        match self {
            Freshness::Outdated => 0,
            Freshness::Rotting => 1,
            Freshness::Fresh => 2,
        }
    }
}

impl std::fmt::Display for Freshness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy for reconciling freshly scraped records with a persisted dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Keep existing records, only append genuinely new URLs.
    Skip,
    /// Overwrite existing fields with new values, preserving non-empty
    /// existing values when the incoming value is empty.
    Update,
    /// Concatenate unconditionally, duplicates allowed.
    Append,
}

impl MergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::Skip => "skip",
            MergeStrategy::Update => "update",
            MergeStrategy::Append => "append",
        }
    }

    /// Parse a strategy name. Unknown names fall back to `Update` with a
    /// warning rather than failing the run.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "skip" => MergeStrategy::Skip,
            "update" => MergeStrategy::Update,
            "append" => MergeStrategy::Append,
            other => {
                warn!(strategy = other, "unknown merge strategy, defaulting to update");
                MergeStrategy::Update
            }
        }
    }
}

/// One row of the dataset: everything we know about a single content page.
///
/// `url` is the unique key within a dataset. Serialization matches the CSV
/// layout in [`EXPORT_COLUMNS`]; missing values become empty strings, never
/// a literal null marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub language: Language,
    pub title: String,
    #[serde(with = "csv_date")]
    pub date_created: Option<NaiveDate>,
    #[serde(with = "csv_date")]
    pub date_modified: Option<NaiveDate>,
    #[serde(with = "csv_tags")]
    pub tags: Vec<String>,
    #[serde(with = "csv_timestamp")]
    pub scraped_at: DateTime<Utc>,
}

impl PageRecord {
    /// Record carrying nothing but the URL and the extraction timestamp.
    /// This is what a failed extraction contributes to the dataset.
    pub fn bare(url: &str, scraped_at: DateTime<Utc>) -> Self {
        Self {
            url: url.to_string(),
            language: Language::Unknown,
            title: String::new(),
            date_created: None,
            date_modified: None,
            tags: Vec::new(),
            scraped_at,
        }
    }

    /// Row representation in [`EXPORT_COLUMNS`] order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.url.clone(),
            self.language.as_str().to_string(),
            self.title.clone(),
            format_date(self.date_created),
            format_date(self.date_modified),
            self.tags.join("; "),
            self.scraped_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]
    }
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Parse a metadata date value at day precision: the first 10 characters
/// are taken, anything unparseable is dropped.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

mod csv_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(super::parse_day(&raw))
    }
}

mod csv_tags {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.join("; "))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<String>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let mut tags: Vec<String> = raw
            .split(';')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();
        tags.sort();
        tags.dedup();
        Ok(tags)
    }
}

mod csv_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, FORMAT) {
            return Ok(naive.and_utc());
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| de::Error::custom(format!("invalid scraped_at '{raw}': {e}")))
    }
}
