//! Tolerant field access over loosely-shaped upstream payloads.
//!
//! Upstream responses name the same field differently depending on the
//! endpoint (`bid_price` vs `bid`, `todays_change_perc` vs
//! `todaysChangePerc`, `close` vs `c`). Callers list the aliases in priority
//! order and supply their own default.

use serde_json::{Map, Value};

/// Anything a named field can be read from.
pub trait FieldSource {
    fn lookup(&self, name: &str) -> Option<&Value>;
}

impl FieldSource for Value {
    fn lookup(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.lookup(name),
            _ => None,
        }
    }
}

impl FieldSource for Map<String, Value> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl<T: FieldSource + ?Sized> FieldSource for &T {
    fn lookup(&self, name: &str) -> Option<&Value> {
        (**self).lookup(name)
    }
}

impl<T: FieldSource> FieldSource for Option<T> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.as_ref().and_then(|inner| inner.lookup(name))
    }
}

/// First non-null value among `names`.
pub fn read_field<'a, S>(source: &'a S, names: &[&str]) -> Option<&'a Value>
where
    S: FieldSource + ?Sized,
{
    names
        .iter()
        .filter_map(|name| source.lookup(name))
        .find(|value| !value.is_null())
}

/// Nested lookup, e.g. `read_path(v, &["quote", "USD", "price"])`.
pub fn read_path<'a>(source: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(source, |current, name| current.lookup(name))
        .filter(|value| !value.is_null())
}

/// First alias holding a non-zero number. Zero counts as absent, so
/// `read_f64(bar, &["close", "c"])` falls through an empty `close`.
pub fn read_f64<S>(source: &S, names: &[&str]) -> Option<f64>
where
    S: FieldSource + ?Sized,
{
    names
        .iter()
        .filter_map(|name| source.lookup(name))
        .filter_map(as_f64)
        .find(|number| *number != 0.0)
}

pub fn read_i64<S>(source: &S, names: &[&str]) -> Option<i64>
where
    S: FieldSource + ?Sized,
{
    read_field(source, names).and_then(Value::as_i64)
}

pub fn read_str<'a, S>(source: &'a S, names: &[&str]) -> Option<&'a str>
where
    S: FieldSource + ?Sized,
{
    read_field(source, names).and_then(Value::as_str)
}

/// Renders the first present scalar as text; objects and arrays are skipped.
pub fn read_display<S>(source: &S, names: &[&str]) -> Option<String>
where
    S: FieldSource + ?Sized,
{
    names
        .iter()
        .filter_map(|name| source.lookup(name))
        .find_map(display_scalar)
}

/// Items of a JSON array, or the `results` array of an object.
pub fn items(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        Value::Object(map) => map
            .get("results")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn display_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tries_aliases_in_order_and_skips_nulls() {
        let quote = json!({ "bid_price": null, "bid": 1.0842 });
        assert_eq!(read_f64(&quote, &["bid_price", "bid"]), Some(1.0842));
        assert_eq!(read_field(&quote, &["ask"]), None);
    }

    #[test]
    fn zero_numbers_fall_through_to_next_alias() {
        let bar = json!({ "close": 0, "c": 1.25 });
        assert_eq!(read_f64(&bar, &["close", "c"]), Some(1.25));
    }

    #[test]
    fn nested_paths_resolve_through_objects() {
        let payload = json!({ "quote": { "USD": { "price": 64000.5 } } });
        let price = read_path(&payload, &["quote", "USD", "price"]).and_then(Value::as_f64);
        assert_eq!(price, Some(64000.5));
        assert!(read_path(&payload, &["quote", "EUR", "price"]).is_none());
    }

    #[test]
    fn typed_reads_ignore_mismatched_types() {
        let coin = json!({ "cmc_rank": 3, "name": "Tether", "slug": 7 });
        assert_eq!(read_i64(&coin, &["rank", "cmc_rank"]), Some(3));
        assert_eq!(read_str(&coin, &["name"]), Some("Tether"));
        assert_eq!(read_str(&coin, &["slug"]), None);
    }

    #[test]
    fn optional_sources_read_as_absent() {
        let missing: Option<&Value> = None;
        assert_eq!(read_display(&missing, &["ticker"]), None);
    }

    #[test]
    fn items_accepts_arrays_and_results_envelopes() {
        assert_eq!(items(&json!([1, 2])).len(), 2);
        assert_eq!(items(&json!({ "results": [1] })).len(), 1);
        assert!(items(&json!({ "status": "OK" })).is_empty());
    }
}
