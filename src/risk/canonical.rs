//! Canonical request-parameter serialization, shared bit-for-bit with the
//! server's reconstruction. Key order follows UTF-16 code units, matching
//! how the page runtime sorts strings.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Everything a URI-component encoder leaves bare, beyond alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Order two keys by UTF-16 code units. Differs from byte order for
/// supplementary-plane text, and the server sorts the same way.
pub fn utf16_cmp(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

/// Scalar values keep their text form; composites collapse to compact JSON.
fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// GET parameters: URI-encoded `k=v` pairs joined with `&`, keys sorted.
/// Empty input serializes to the empty string.
pub fn query_string(params: &Map<String, Value>) -> String {
    let mut keys: Vec<&String> = params.keys().collect();
    keys.sort_by(|a, b| utf16_cmp(a, b));
    keys.iter()
        .map(|k| {
            format!(
                "{}={}",
                encode_component(k),
                encode_component(&value_text(&params[k.as_str()]))
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Body parameters: exactly `{}` when empty, canonical JSON otherwise.
pub fn body_string(params: &Map<String, Value>) -> String {
    if params.is_empty() {
        "{}".to_string()
    } else {
        canonical_json(&Value::Object(params.clone()))
    }
}

/// Dispatch on the request method: query form for GET, body form otherwise.
pub fn serialize_params(method: &str, params: &Map<String, Value>) -> String {
    if method.eq_ignore_ascii_case("GET") {
        query_string(params)
    } else {
        body_string(params)
    }
}

/// Canonical JSON: arrays in order, object keys sorted by UTF-16 code unit,
/// no whitespace. Any logical value serializes to exactly one byte sequence.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            out.push('{');
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_by(|a, b| utf16_cmp(a, b));
            for (i, k) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String((*k).clone()).to_string());
                out.push(':');
                write_canonical(&map[k.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
