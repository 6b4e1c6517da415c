use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a raw date value into an instant.
///
/// Falsy values (`""`, `0`, `false`) and anything unparseable yield `None`.
/// Numbers are milliseconds since the Unix epoch; naive strings are read as UTC.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let ms = n.as_f64()?;
            if ms == 0.0 || !ms.is_finite() {
                return None;
            }
            Utc.timestamp_millis_opt(ms.trunc() as i64).single()
        }
        Value::String(s) => parse_date_str(s),
        _ => None,
    }
}

pub fn parse_date_str(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| Utc.from_utc_datetime(&naive));
        }
    }
    None
}

/// `YYYY-MM-DD`, or an empty string for a missing date.
pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_plain_dates_as_utc_midnight() {
        let d = parse_date(&json!("2024-01-01")).unwrap();
        assert_eq!(d.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        let d = parse_date(&json!("2024/06/01")).unwrap();
        assert_eq!(format_date(Some(d)), "2024-06-01");
    }

    #[test]
    fn parses_datetimes() {
        assert!(parse_date(&json!("2024-01-01T10:30:00Z")).is_some());
        assert!(parse_date(&json!("2024-01-01T10:30:00-05:00")).is_some());
        assert!(parse_date(&json!("2024-01-01 10:30:00")).is_some());
        assert!(parse_date(&json!("2024-01-01T10:30")).is_some());
        assert!(parse_date(&json!("2024-01-01T10:30:00.250")).is_some());
    }

    #[test]
    fn numbers_are_epoch_millis() {
        let d = parse_date(&json!(86_400_000)).unwrap();
        assert_eq!(format_date(Some(d)), "1970-01-02");
    }

    #[test]
    fn falsy_and_garbage_are_none() {
        assert_eq!(parse_date(&json!("")), None);
        assert_eq!(parse_date(&json!("   ")), None);
        assert_eq!(parse_date(&json!(0)), None);
        assert_eq!(parse_date(&json!(false)), None);
        assert_eq!(parse_date(&json!(true)), None);
        assert_eq!(parse_date(&json!("2024-13-45")), None);
        assert_eq!(parse_date(&json!({"y": 2024})), None);
    }

    #[test]
    fn format_missing_is_empty() {
        assert_eq!(format_date(None), "");
    }
}
