//! Concrete URLs and query strings for a matched template.

use serde_json::{Number, Value};
use url::form_urlencoded;

use crate::spec::{PathTemplate, Segment};

/// 2^53: above this a float no longer represents every integer.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Substitutes the chain's literals into the template's parameter segments.
///
/// `chain` must already match `template` positionally. Substituted values are
/// percent-encoded, literal segments are kept as written.
pub fn build_url(base_url: &str, template: &PathTemplate, chain: &[String]) -> String {
    let mut url = base_url.trim_end_matches('/').to_string();

    for (segment, actual) in template.segments().iter().zip(chain) {
        url.push('/');
        match segment {
            Segment::Literal(literal) => url.push_str(literal),
            Segment::Param { name, raw } => {
                let placeholder = format!("{{{name}}}");
                url.push_str(&raw.replacen(&placeholder, &urlencoding::encode(actual), 1));
            },
        }
    }

    if template.segments().is_empty() || template.as_str().ends_with('/') {
        url.push('/');
    }
    url
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(number_text(n)),
        nested => Some(nested.to_string()),
    }
}

/// Whole floats print as integers (`2.0` -> `2`).
fn number_text(n: &Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f.abs() < MAX_SAFE_INTEGER {
                return format!("{}", f as i64);
            }
        }
    }
    n.to_string()
}

/// Serializes a read payload into `?key=value&...`.
///
/// Non-object payloads produce nothing. `null` values are skipped, arrays
/// become repeated parameters in order. Returns an empty string when no
/// parameter remains.
///
/// `null` array elements are skipped rather than sent as the text `null`.
/// Nested arrays and objects are sent as JSON text (`[1,2]`), not
/// comma-joined.
pub fn build_query_string(payload: &Value) -> String {
    let Some(params) = payload.as_object() else {
        return String::new();
    };

    let mut search = form_urlencoded::Serializer::new(String::new());
    let mut appended = false;

    for (key, value) in params {
        let values: Vec<String> = match value {
            Value::Array(items) => items.iter().filter_map(query_value).collect(),
            other => query_value(other).into_iter().collect(),
        };
        for v in values {
            search.append_pair(key, &v);
            appended = true;
        }
    }

    if appended {
        format!("?{}", search.finish())
    } else {
        String::new()
    }
}
