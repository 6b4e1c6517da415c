use serde_json::Value;

/// What a site's manifest points at.
#[derive(Clone, Debug, PartialEq)]
pub enum Manifest {
    /// The manifest itself is the record array.
    Inline(Vec<Value>),
    /// A bundle and/or a list of per-record files, relative to the site root.
    Index {
        bundle: Option<String>,
        files: Vec<String>,
    },
}

impl Manifest {
    /// Non-string `files` entries and a non-array `files` value are ignored.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => Manifest::Inline(items),
            Value::Object(map) => {
                let bundle = map
                    .get("bundle")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string);
                let files = map
                    .get("files")
                    .and_then(Value::as_array)
                    .map(|files| {
                        files
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                Manifest::Index { bundle, files }
            }
            _ => Manifest::Index {
                bundle: None,
                files: Vec::new(),
            },
        }
    }
}

/// `null`, `false`, `0` and `""` payloads carry no record.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Concatenates per-file payloads, spreading arrays one level deep.
pub fn flatten_payloads(payloads: impl IntoIterator<Item = Value>) -> Vec<Value> {
    let mut out = Vec::new();
    for payload in payloads {
        if is_falsy(&payload) {
            continue;
        }
        match payload {
            Value::Array(items) => out.extend(items),
            other => out.push(other),
        }
    }
    out
}
