pub mod dates;

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use dates::{format_date, parse_date};

/// An untyped source object, keyed however its origin chose to key it.
pub type RawRecord = Map<String, Value>;

// Alias lists are tried in order; the first non-null value wins.
pub const ID_ALIASES: &[&str] = &["id", "ID", "codigo"];
pub const TITLE_ALIASES: &[&str] = &["title", "titulo", "asunto", "name"];
pub const REGION_ALIASES: &[&str] = &["region", "región", "zona", "departamento"];
pub const COUNTRY_ALIASES: &[&str] = &["country", "pais", "país"];
pub const CATEGORY_ALIASES: &[&str] = &["type", "tipo", "category", "categoria"];
pub const STATUS_ALIASES: &[&str] = &["status", "estado"];
pub const SEVERITY_ALIASES: &[&str] = &["severity", "severidad", "gravedad"];
pub const ACTOR_ALIASES: &[&str] = &["actor", "actores"];
pub const IMPACT_ALIASES: &[&str] = &["impact", "impacto"];
pub const DATE_ALIASES: &[&str] = &["date", "fecha", "fechahora", "created_at", "createdAt"];
pub const DESCRIPTION_ALIASES: &[&str] =
    &["description", "descripcion", "detalle", "summary", "resumen"];
pub const SOURCE_ALIASES: &[&str] = &["source", "fuente", "url", "link"];
pub const COLOR_ALIASES: &[&str] = &["color"];
pub const LOGO_ALIASES: &[&str] = &["logo"];

const ALL_ALIASES: &[&[&str]] = &[
    ID_ALIASES,
    TITLE_ALIASES,
    REGION_ALIASES,
    COUNTRY_ALIASES,
    CATEGORY_ALIASES,
    STATUS_ALIASES,
    SEVERITY_ALIASES,
    ACTOR_ALIASES,
    IMPACT_ALIASES,
    DATE_ALIASES,
    DESCRIPTION_ALIASES,
    SOURCE_ALIASES,
    COLOR_ALIASES,
    LOGO_ALIASES,
];

/// Canonical field names. Used as sort keys and as the filterable field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Id,
    Title,
    Region,
    Country,
    Category,
    Status,
    Severity,
    Actor,
    Impact,
    Date,
    Description,
    Source,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::Id,
        Field::Title,
        Field::Region,
        Field::Country,
        Field::Category,
        Field::Status,
        Field::Severity,
        Field::Actor,
        Field::Impact,
        Field::Date,
        Field::Description,
        Field::Source,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Title => "title",
            Field::Region => "region",
            Field::Country => "country",
            Field::Category => "category",
            Field::Status => "status",
            Field::Severity => "severity",
            Field::Actor => "actor",
            Field::Impact => "impact",
            Field::Date => "date",
            Field::Description => "description",
            Field::Source => "source",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Id => "ID",
            Field::Title => "Title",
            Field::Region => "Region",
            Field::Country => "Country",
            Field::Category => "Type",
            Field::Status => "Status",
            Field::Severity => "Severity",
            Field::Actor => "Actor",
            Field::Impact => "Impact",
            Field::Date => "Date",
            Field::Description => "Description",
            Field::Source => "Source",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lower = value.trim().to_lowercase();
        let field = match lower.as_str() {
            "id" => Field::Id,
            "title" => Field::Title,
            "region" => Field::Region,
            "country" => Field::Country,
            "category" | "type" => Field::Category,
            "status" => Field::Status,
            "severity" => Field::Severity,
            "actor" => Field::Actor,
            "impact" => Field::Impact,
            "date" => Field::Date,
            "description" | "summary" => Field::Description,
            "source" => Field::Source,
            _ => {
                let expected: Vec<&str> = Field::ALL.iter().map(|f| f.as_str()).collect();
                return Err(format!(
                    "unknown field '{}', expected one of {}",
                    value.trim(),
                    expected.join(", ")
                ));
            }
        };
        Ok(field)
    }
}

/// Labels used when a source omits a field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub missing_label: String,
    pub untitled_label: String,
    pub source_placeholder: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            missing_label: "N/A".to_string(),
            untitled_label: "(Untitled)".to_string(),
            source_placeholder: "#".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Record {
    pub id: String,
    pub title: String,
    pub region: String,
    pub country: String,
    pub category: String,
    pub status: String,
    pub severity: String,
    pub actor: String,
    pub impact: String,
    pub date: Option<DateTime<Utc>>,
    pub description: String,
    pub source: String,
    pub color: Option<Value>,
    pub logo: Option<Value>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: RawRecord,
}

impl Record {
    /// The display text of `field`. Dates render as `YYYY-MM-DD`, or empty when absent.
    pub fn text(&self, field: Field) -> Cow<'_, str> {
        match field {
            Field::Id => Cow::Borrowed(&self.id),
            Field::Title => Cow::Borrowed(&self.title),
            Field::Region => Cow::Borrowed(&self.region),
            Field::Country => Cow::Borrowed(&self.country),
            Field::Category => Cow::Borrowed(&self.category),
            Field::Status => Cow::Borrowed(&self.status),
            Field::Severity => Cow::Borrowed(&self.severity),
            Field::Actor => Cow::Borrowed(&self.actor),
            Field::Impact => Cow::Borrowed(&self.impact),
            Field::Date => Cow::Owned(format_date(self.date)),
            Field::Description => Cow::Borrowed(&self.description),
            Field::Source => Cow::Borrowed(&self.source),
        }
    }

    /// Milliseconds since the epoch, with a missing date counted as zero.
    pub fn date_millis(&self) -> i64 {
        self.date.map(|d| d.timestamp_millis()).unwrap_or(0)
    }
}

/// Returns the first alias whose value is present and not JSON `null`.
///
/// Falsy values such as `""`, `0` or `false` are present and stop the search.
pub fn resolve<'a>(raw: &'a RawRecord, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|key| raw.get(*key))
        .find(|value| !value.is_null())
}

/// Strings pass through verbatim; anything else becomes compact JSON text.
pub fn text_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn text_field(raw: &RawRecord, aliases: &[&str], default: &str) -> String {
    resolve(raw, aliases)
        .map(text_of)
        .unwrap_or_else(|| default.to_string())
}

/// Normalizes a batch of raw records.
///
/// `raw` is either an array of objects or a single object, which is treated as
/// a batch of one. `null` is an empty batch. Non-object array elements become
/// fully defaulted records so the output keeps the input's length and order.
pub fn normalize(raw: &Value, opts: &NormalizeOptions) -> Vec<Record> {
    match raw {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| normalize_one(item, index, opts))
            .collect(),
        other => vec![normalize_one(other, 0, opts)],
    }
}

pub fn normalize_one(item: &Value, index: usize, opts: &NormalizeOptions) -> Record {
    let empty = RawRecord::new();
    let raw = item.as_object().unwrap_or(&empty);
    let missing = opts.missing_label.as_str();

    let id = resolve(raw, ID_ALIASES)
        .map(text_of)
        .unwrap_or_else(|| format!("row_{}", index + 1));

    let extra: RawRecord = raw
        .iter()
        .filter(|(key, _)| {
            !ALL_ALIASES
                .iter()
                .any(|aliases| aliases.contains(&key.as_str()))
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Record {
        id,
        title: text_field(raw, TITLE_ALIASES, &opts.untitled_label),
        region: text_field(raw, REGION_ALIASES, missing),
        country: text_field(raw, COUNTRY_ALIASES, missing),
        category: text_field(raw, CATEGORY_ALIASES, missing),
        status: text_field(raw, STATUS_ALIASES, missing),
        severity: text_field(raw, SEVERITY_ALIASES, missing),
        actor: text_field(raw, ACTOR_ALIASES, missing),
        impact: text_field(raw, IMPACT_ALIASES, missing),
        date: resolve(raw, DATE_ALIASES).and_then(parse_date),
        description: text_field(raw, DESCRIPTION_ALIASES, ""),
        source: text_field(raw, SOURCE_ALIASES, &opts.source_placeholder),
        color: resolve(raw, COLOR_ALIASES).cloned(),
        logo: resolve(raw, LOGO_ALIASES).cloned(),
        extra,
    }
}
