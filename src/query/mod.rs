pub mod filters;
pub mod sort;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::record::{Field, Record};

pub use filters::{haystack, search_fields, Filter, CATEGORY_SEARCH_FIELDS, SEARCH_FIELDS};
pub use sort::{Sort, SortDirection};

use filters::{FieldEquals, TextSearch};

/// Everything the pipeline needs to derive the ordered result set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criteria {
    pub text: String,
    pub filter: Filter,
    pub filter_field: Field,
    pub sort: Sort,
}

impl Default for Criteria {
    fn default() -> Self {
        Self {
            text: String::new(),
            filter: Filter::All,
            filter_field: Field::Region,
            sort: Sort::default(),
        }
    }
}

/// Filter, then search, then stable sort.
pub fn query<'a>(records: &'a [Record], criteria: &Criteria) -> Vec<&'a Record> {
    let equals = FieldEquals::new(criteria.filter_field, &criteria.filter);
    let search = TextSearch::new(&criteria.text, criteria.filter_field);

    let mut out: Vec<&Record> = records
        .iter()
        .filter(|r| equals.as_ref().map_or(true, |p| p.matches(r)))
        .filter(|r| search.as_ref().map_or(true, |p| p.matches(r)))
        .collect();

    criteria.sort.sort(&mut out);

    debug!(
        total = records.len(),
        matched = out.len(),
        filter = %criteria.filter,
        sort = %criteria.sort.key,
        direction = %criteria.sort.direction,
        "query recomputed"
    );
    out
}

/// Distinct values of `field` across `records`, sorted case-insensitively.
///
/// Distinct values of `field`, each one selectable through `Filter::parse`.
/// Empty values are skipped since the empty filter means "all".
pub fn filter_options(records: &[Record], field: Field) -> Vec<String> {
    let mut seen: BTreeSet<(String, String)> = BTreeSet::new();
    for record in records {
        let text = record.text(field);
        if text.trim().is_empty() {
            continue;
        }
        seen.insert((text.to_lowercase(), text.into_owned()));
    }
    seen.into_iter().map(|(_, value)| value).collect()
}
