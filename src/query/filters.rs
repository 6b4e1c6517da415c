use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::record::{Field, Record};

/// Fields concatenated into the free-text haystack, in order.
pub const SEARCH_FIELDS: [Field; 7] = [
    Field::Id,
    Field::Title,
    Field::Description,
    Field::Region,
    Field::Status,
    Field::Severity,
    Field::Date,
];

/// Haystack used when browsing by category: type and actor replace status and severity.
pub const CATEGORY_SEARCH_FIELDS: [Field; 7] = [
    Field::Id,
    Field::Title,
    Field::Description,
    Field::Region,
    Field::Category,
    Field::Actor,
    Field::Date,
];

pub fn search_fields(filter_field: Field) -> &'static [Field; 7] {
    match filter_field {
        Field::Category => &CATEGORY_SEARCH_FIELDS,
        _ => &SEARCH_FIELDS,
    }
}

const SENTINELS: &[&str] = &["all", "todos", "todas"];

/// Equality restriction on the filter field. `All` is the "no filter" sentinel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Filter {
    #[default]
    All,
    Value(String),
}

impl Filter {
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || SENTINELS.iter().any(|s| trimmed.eq_ignore_ascii_case(s)) {
            Filter::All
        } else {
            Filter::Value(trimmed.to_string())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Filter::All)
    }
}

impl From<String> for Filter {
    fn from(value: String) -> Self {
        Filter::parse(&value)
    }
}

impl From<Filter> for String {
    fn from(value: Filter) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str("all"),
            Filter::Value(v) => f.write_str(v),
        }
    }
}

/// Case-insensitive equality predicate on one field.
pub(in crate::query) struct FieldEquals {
    field: Field,
    needle: String,
}

impl FieldEquals {
    pub(in crate::query) fn new(field: Field, filter: &Filter) -> Option<Self> {
        match filter {
            Filter::All => None,
            Filter::Value(v) => Some(Self {
                field,
                needle: v.to_lowercase(),
            }),
        }
    }

    pub(in crate::query) fn matches(&self, record: &Record) -> bool {
        record.text(self.field).to_lowercase() == self.needle
    }
}

/// Case-insensitive substring predicate over the search haystack.
pub(in crate::query) struct TextSearch {
    needle: String,
    fields: &'static [Field; 7],
}

impl TextSearch {
    /// `None` when the query is empty after trimming.
    pub(in crate::query) fn new(query: &str, filter_field: Field) -> Option<Self> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            None
        } else {
            Some(Self {
                needle,
                fields: search_fields(filter_field),
            })
        }
    }

    pub(in crate::query) fn matches(&self, record: &Record) -> bool {
        haystack(record, self.fields).contains(&self.needle)
    }
}

pub fn haystack(record: &Record, fields: &[Field]) -> String {
    fields
        .iter()
        .map(|field| record.text(*field))
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{normalize_one, NormalizeOptions};
    use serde_json::json;

    #[test]
    fn sentinels_parse_to_all() {
        assert_eq!(Filter::parse("all"), Filter::All);
        assert_eq!(Filter::parse("Todos"), Filter::All);
        assert_eq!(Filter::parse("TODAS"), Filter::All);
        assert_eq!(Filter::parse("  "), Filter::All);
        assert_eq!(Filter::parse(" Caribe "), Filter::Value("Caribe".to_string()));
    }

    #[test]
    fn haystack_includes_formatted_date() {
        let r = normalize_one(
            &json!({"id": "X1", "title": "Paro", "date": "2024-05-06"}),
            0,
            &NormalizeOptions::default(),
        );
        let hay = haystack(&r, &SEARCH_FIELDS);
        assert!(hay.starts_with("x1 paro "));
        assert!(hay.ends_with("2024-05-06"));
    }

    #[test]
    fn defaulted_fields_outside_the_haystack_are_not_searched() {
        let r = normalize_one(
            &json!({"id": "1", "title": "Robo", "region": "Lima", "status": "Abierto",
                    "severity": "Alta", "date": "2024-01-01"}),
            0,
            &NormalizeOptions::default(),
        );
        assert!(!haystack(&r, &SEARCH_FIELDS).contains("n/a"));
        assert!(haystack(&r, &CATEGORY_SEARCH_FIELDS).contains("n/a"));
    }

    #[test]
    fn whitespace_query_is_absent() {
        assert!(TextSearch::new("   ", Field::Region).is_none());
        assert!(TextSearch::new(" a ", Field::Region).is_some());
    }
}
