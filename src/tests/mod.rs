use serde_json::{json, Value};

use crate::pager::paginate;
use crate::query::{filter_options, query, Criteria, Filter, Sort, SortDirection};
use crate::record::{normalize, Field, NormalizeOptions, Record, ID_ALIASES};

fn records(raw: Value) -> Vec<Record> {
    normalize(&raw, &NormalizeOptions::default())
}

fn ids(out: &[&Record]) -> Vec<String> {
    out.iter().map(|r| r.id.clone()).collect()
}

fn corpus() -> Vec<Record> {
    let regions = ["Norte", "norte", "Sur", "Centro", ""];
    let titles = ["Robo de vehículo", "Robo armado", "Bloqueo", "Incendio forestal", "Hurto"];
    let raw: Vec<Value> = (0..40)
        .map(|i| {
            let day = (i % 28) + 1;
            let severity = if i % 3 == 0 { "Alta" } else { "Media" };
            let date = if i % 7 == 0 {
                Value::Null
            } else {
                Value::String(format!("2024-03-{day:02}"))
            };
            json!({
                "id": format!("INC-{i:03}"),
                "titulo": titles[i % titles.len()],
                "zona": regions[i % regions.len()],
                "severidad": severity,
                "fecha": date,
            })
        })
        .collect();
    records(Value::Array(raw))
}

#[test]
fn filter_selects_matching_region() {
    let data = records(json!([
        {"title": "A", "region": "X", "date": "2024-01-01"},
        {"title": "B", "region": "Y", "date": "2024-06-01"}
    ]));
    let criteria = Criteria {
        filter: Filter::parse("X"),
        ..Default::default()
    };
    let out = query(&data, &criteria);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].title, "A");
}

#[test]
fn out_of_range_page_is_clamped() {
    let data = records(Value::Array((0..25).map(|i| json!({"id": i})).collect()));
    let matched = query(&data, &Criteria::default());
    let page = paginate(&matched, 99, 10);
    assert_eq!(page.page, 3);
    assert_eq!(page.items.len(), 5);
}

#[test]
fn null_dates_sort_last_when_descending() {
    let data = records(json!([
        {"id": "undated", "date": null},
        {"id": "dated", "date": "2024-01-01"}
    ]));
    let out = query(&data, &Criteria::default());
    assert_eq!(ids(&out), vec!["dated", "undated"]);
}

#[test]
fn empty_set_yields_single_empty_page() {
    let data = records(json!([]));
    let matched = query(&data, &Criteria::default());
    let page = paginate(&matched, 1, 20);
    assert!(page.items.is_empty());
    assert_eq!(page.page, 1);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.total, 0);
}

#[test]
fn id_comes_from_first_defined_alias() {
    let raw = json!({"codigo": "C-9", "ID": "upper", "title": "x"});
    let first = ID_ALIASES
        .iter()
        .find_map(|alias| raw.get(*alias).filter(|v| !v.is_null()))
        .and_then(Value::as_str)
        .unwrap()
        .to_string();
    assert_eq!(records(json!([raw]))[0].id, first);
    assert_eq!(records(json!([{"title": "x"}]))[0].id, "row_1");
}

#[test]
fn filter_has_no_false_positives_or_negatives() {
    let data = corpus();
    for value in ["norte", "SUR", "Centro", "N/A", "Oeste"] {
        let criteria = Criteria {
            filter: Filter::parse(value),
            ..Default::default()
        };
        let out = query(&data, &criteria);
        assert!(out.iter().all(|r| r.region.to_lowercase() == value.to_lowercase()));
        let expected = data
            .iter()
            .filter(|r| r.region.to_lowercase() == value.to_lowercase())
            .count();
        assert_eq!(out.len(), expected, "filter {value}");
    }
}

#[test]
fn longer_queries_never_widen_results() {
    let data = corpus();
    let full = "robo de vehículo";
    let mut previous = usize::MAX;
    for end in full.char_indices().map(|(i, c)| i + c.len_utf8()) {
        let criteria = Criteria {
            text: full[..end].to_string(),
            ..Default::default()
        };
        let count = query(&data, &criteria).len();
        assert!(count <= previous, "query '{}' widened results", &full[..end]);
        previous = count;
    }
    assert!(previous > 0);
}

#[test]
fn equal_keys_keep_input_order() {
    let data = corpus();
    for direction in [SortDirection::Asc, SortDirection::Desc] {
        let criteria = Criteria {
            sort: Sort {
                key: Field::Severity,
                direction,
            },
            ..Default::default()
        };
        let out = query(&data, &criteria);
        for severity in ["Alta", "Media"] {
            let sorted: Vec<&str> = out
                .iter()
                .filter(|r| r.severity == severity)
                .map(|r| r.id.as_str())
                .collect();
            let original: Vec<&str> = data
                .iter()
                .filter(|r| r.severity == severity)
                .map(|r| r.id.as_str())
                .collect();
            assert_eq!(sorted, original);
        }
    }
}

#[test]
fn pages_stay_in_bounds() {
    let data = corpus();
    let refs: Vec<&Record> = data.iter().collect();
    for total in [0, 1, 9, 10, 11, 40] {
        for size in [1, 3, 10, 25, 100] {
            for requested in [0, 1, 2, 5, 1000] {
                let page = paginate(&refs[..total], requested, size);
                assert!(page.page >= 1 && page.page <= page.total_pages);
                assert!(page.items.len() <= size);
            }
        }
    }
}

#[test]
fn same_state_same_output() {
    let data = corpus();
    let criteria = Criteria {
        text: "robo".to_string(),
        filter: Filter::parse("norte"),
        filter_field: Field::Region,
        sort: Sort::new(Field::Title),
    };
    let first = ids(&query(&data, &criteria));
    let second = ids(&query(&data, &criteria));
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn search_ignores_fields_outside_the_haystack() {
    let data = records(json!([
        {"id": "1", "title": "Robo", "region": "Lima", "status": "Abierto",
         "severity": "Alta", "date": "2024-01-01"}
    ]));
    let criteria = Criteria {
        text: "n/a".to_string(),
        ..Default::default()
    };
    assert!(query(&data, &criteria).is_empty());
}

#[test]
fn category_browsing_searches_type_and_actor() {
    let data = records(json!([
        {"id": "1", "title": "Paro", "tipo": "Protesta", "actores": "Sindicato",
         "estado": "Cerrado"},
        {"id": "2", "title": "Hurto", "tipo": "Delito", "actores": "Desconocido"}
    ]));
    let by_category = Criteria {
        text: "sindicato".to_string(),
        filter_field: Field::Category,
        ..Default::default()
    };
    assert_eq!(ids(&query(&data, &by_category)), vec!["1"]);

    let by_status = Criteria {
        text: "cerrado".to_string(),
        filter_field: Field::Category,
        ..Default::default()
    };
    assert!(query(&data, &by_status).is_empty());

    let by_region = Criteria {
        text: "cerrado".to_string(),
        ..Default::default()
    };
    assert_eq!(ids(&query(&data, &by_region)), vec!["1"]);
}

#[test]
fn every_listed_filter_option_selects_records() {
    let data = corpus();
    let options = filter_options(&data, Field::Region);
    assert!(!options.is_empty());
    assert!(options.iter().all(|o| !o.is_empty()));
    for option in options {
        let criteria = Criteria {
            filter: Filter::parse(&option),
            ..Default::default()
        };
        assert!(!query(&data, &criteria).is_empty(), "option {option}");
    }
}
