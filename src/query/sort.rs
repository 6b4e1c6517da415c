use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::record::{Field, Record};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Dates start newest-first; everything else starts ascending.
    pub fn default_for(key: Field) -> Self {
        match key {
            Field::Date => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// Applies the direction to a comparator result. Equal stays equal.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction '{other}', expected asc or desc")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub key: Field,
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self {
        Sort::new(Field::Date)
    }
}

impl Sort {
    /// A sort on `key` in that key's default direction.
    pub fn new(key: Field) -> Self {
        Self {
            key,
            direction: SortDirection::default_for(key),
        }
    }

    /// Selecting the active key flips direction; a new key starts at its default.
    pub fn toggled(self, key: Field) -> Self {
        if self.key == key {
            Self {
                key,
                direction: self.direction.flipped(),
            }
        } else {
            Sort::new(key)
        }
    }

    /// Stable in-place sort. Equal keys keep their incoming order in either direction.
    pub fn sort(&self, records: &mut Vec<&Record>) {
        let mut keyed: Vec<(SortValue, &Record)> = records
            .iter()
            .map(|r| (SortValue::of(r, self.key), *r))
            .collect();
        keyed.sort_by(|a, b| self.direction.apply(a.0.cmp(&b.0)));
        records.clear();
        records.extend(keyed.into_iter().map(|(_, r)| r));
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortValue {
    Millis(i64),
    Text(String),
}

impl SortValue {
    fn of(record: &Record, key: Field) -> Self {
        match key {
            Field::Date => SortValue::Millis(record.date_millis()),
            other => SortValue::Text(record.text(other).to_lowercase()),
        }
    }
}
