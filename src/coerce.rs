//! Permissive value coercion.
//!
//! These are data-loss-tolerant accessors: a value that cannot be coerced to
//! the requested type yields that type's zero value rather than an error.
//! Callers that need failures surfaced use the structured decode path
//! instead.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};

/// Coerce to a boolean.
///
/// Booleans pass through; non-zero numbers are true; the strings `true`,
/// `t`, `1`, `yes`, `on` (any casing) are true. Everything else is false.
pub fn as_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.to_lowercase().as_str(),
            "true" | "t" | "1" | "yes" | "on"
        ),
        _ => false,
    }
}

/// Coerce to a signed integer. Floats truncate; numeric strings parse;
/// booleans are 1/0; failure is 0.
pub fn as_i64(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

/// Coerce to an unsigned integer. Negative values and failures are 0.
pub fn as_u64(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        Value::Bool(b) => u64::from(*b),
        _ => 0,
    }
}

/// Coerce to a float. Failure is 0.0.
pub fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => 0.0,
    }
}

/// Coerce to a string. Scalars take their display form; null, sequences,
/// and maps are the empty string.
pub fn as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Coerce to a vector of strings.
///
/// Sequences coerce element-wise; a string splits on whitespace; any other
/// scalar promotes to a one-element vector.
pub fn as_string_vec(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(as_string).collect(),
        Value::String(s) => s.split_whitespace().map(str::to_string).collect(),
        Value::Null => Vec::new(),
        other => vec![as_string(other)],
    }
}

/// Coerce to a vector of integers. Sequences coerce element-wise; a lone
/// number promotes to a one-element vector; anything else is empty.
pub fn as_i64_vec(value: &Value) -> Vec<i64> {
    match value {
        Value::Array(items) => items.iter().map(as_i64).collect(),
        Value::Number(_) => vec![as_i64(value)],
        _ => Vec::new(),
    }
}

/// Coerce to a duration.
///
/// Strings use the `1s1ms` grammar (units `ns`, `us`/`µs`, `ms`, `s`, `m`,
/// `h`); bare numbers and unitless numeric strings are nanoseconds. Failure
/// is the zero duration.
pub fn as_duration(value: &Value) -> Duration {
    match value {
        Value::Number(n) => {
            if let Some(ns) = n.as_u64() {
                Duration::from_nanos(ns)
            } else if let Some(f) = n.as_f64().filter(|f| *f >= 0.0) {
                Duration::from_nanos(f as u64)
            } else {
                Duration::ZERO
            }
        }
        Value::String(s) => parse_duration(s)
            .or_else(|| {
                s.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|f| *f >= 0.0)
                    .map(|f| Duration::from_nanos(f as u64))
            })
            .unwrap_or(Duration::ZERO),
        _ => Duration::ZERO,
    }
}

/// Parse a duration string: one or more `<number><unit>` groups, where the
/// number may carry a fraction.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    if s == "0" {
        return Some(Duration::ZERO);
    }

    let mut total_ns: u128 = 0;
    let mut rest = s;
    while !rest.is_empty() {
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        if digits_end == 0 {
            return None;
        }
        let number: f64 = rest[..digits_end].parse().ok()?;
        rest = &rest[digits_end..];

        let (unit_ns, unit_len) = if rest.starts_with("ns") {
            (1u64, 2)
        } else if rest.starts_with("us") {
            (1_000, 2)
        } else if rest.starts_with("µs") {
            (1_000, "µs".len())
        } else if rest.starts_with("ms") {
            (1_000_000, 2)
        } else if rest.starts_with('s') {
            (1_000_000_000, 1)
        } else if rest.starts_with('m') {
            (60 * 1_000_000_000, 1)
        } else if rest.starts_with('h') {
            (3_600 * 1_000_000_000, 1)
        } else {
            return None;
        };
        rest = &rest[unit_len..];
        total_ns += (number * unit_ns as f64) as u128;
    }

    Some(Duration::from_nanos(u64::try_from(total_ns).ok()?))
}

/// Coerce to a UTC timestamp.
///
/// Integers are Unix seconds; strings try RFC 3339, `%Y-%m-%d %H:%M:%S`,
/// and `%Y-%m-%d` in turn. Failure is the Unix epoch.
pub fn as_time(value: &Value) -> DateTime<Utc> {
    let epoch = DateTime::<Utc>::UNIX_EPOCH;
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .unwrap_or(epoch),
        Value::String(s) => parse_time(s).unwrap_or(epoch),
        _ => epoch,
    }
}

fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}

/// Coerce to a size in bytes, via [`parse_size_in_bytes`] for strings.
pub fn as_size_in_bytes(value: &Value) -> u64 {
    match value {
        Value::Number(_) => as_u64(value),
        Value::String(s) => parse_size_in_bytes(s),
        _ => 0,
    }
}

/// Parse a human-readable byte size.
///
/// An optional unit suffix (`b`, `kb`, `mb`, `gb`, case-insensitive, binary
/// multiples) may follow the number, separated by whitespace or not at all.
/// Unrecognized or overflowing input yields 0 rather than an error.
pub fn parse_size_in_bytes(input: &str) -> u64 {
    let lower = input.trim().to_lowercase();
    let (number_part, multiplier) = if let Some(rest) = lower.strip_suffix("kb") {
        (rest, 1u64 << 10)
    } else if let Some(rest) = lower.strip_suffix("mb") {
        (rest, 1 << 20)
    } else if let Some(rest) = lower.strip_suffix("gb") {
        (rest, 1 << 30)
    } else if let Some(rest) = lower.strip_suffix('b') {
        (rest, 1)
    } else {
        (lower.as_str(), 1)
    };

    number_part
        .trim_end()
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .unwrap_or(0)
}

/// Coerce to a map of raw values. Non-maps are empty.
pub fn as_string_map(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    }
}

/// Coerce to a map of strings, coercing each value.
pub fn as_string_map_string(value: &Value) -> HashMap<String, String> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| (k.clone(), as_string(v)))
            .collect(),
        _ => HashMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bool_coercion() {
        assert!(as_bool(&json!(true)));
        assert!(as_bool(&json!("true")));
        assert!(as_bool(&json!("TRUE")));
        assert!(as_bool(&json!("1")));
        assert!(as_bool(&json!(1)));
        assert!(!as_bool(&json!(0)));
        assert!(!as_bool(&json!("maybe")));
        assert!(!as_bool(&json!(null)));
        assert!(!as_bool(&json!([true])));
    }

    #[test]
    fn test_integer_coercion() {
        assert_eq!(as_i64(&json!(42)), 42);
        assert_eq!(as_i64(&json!("42")), 42);
        assert_eq!(as_i64(&json!(2.9)), 2);
        assert_eq!(as_i64(&json!(true)), 1);
        assert_eq!(as_i64(&json!("nope")), 0);
        assert_eq!(as_u64(&json!(-5)), 0);
        assert_eq!(as_u64(&json!("9223372036854775808")), 9223372036854775808);
    }

    #[test]
    fn test_string_coercion() {
        assert_eq!(as_string(&json!("x")), "x");
        assert_eq!(as_string(&json!(35)), "35");
        assert_eq!(as_string(&json!(true)), "true");
        assert_eq!(as_string(&json!(null)), "");
        assert_eq!(as_string(&json!({"a": 1})), "");
    }

    #[test]
    fn test_string_vec_coercion() {
        assert_eq!(
            as_string_vec(&json!(["a", 1, true])),
            vec!["a", "1", "true"]
        );
        assert_eq!(as_string_vec(&json!("one two")), vec!["one", "two"]);
        assert_eq!(as_string_vec(&json!(7)), vec!["7"]);
        assert!(as_string_vec(&json!(null)).is_empty());
    }

    #[test]
    fn test_i64_vec_coercion() {
        assert_eq!(as_i64_vec(&json!([1, "2", 3.7])), vec![1, 2, 3]);
        assert_eq!(as_i64_vec(&json!(5)), vec![5]);
        assert!(as_i64_vec(&json!("not a list")).is_empty());
    }

    #[test]
    fn test_duration_grammar() {
        assert_eq!(parse_duration("1s1ms"), Some(Duration::from_millis(1001)));
        assert_eq!(parse_duration("300ms"), Some(Duration::from_millis(300)));
        assert_eq!(
            parse_duration("2h45m"),
            Some(Duration::from_secs(2 * 3600 + 45 * 60))
        );
        assert_eq!(parse_duration("1.5s"), Some(Duration::from_millis(1500)));
        assert_eq!(parse_duration("100us"), Some(Duration::from_micros(100)));
        assert_eq!(parse_duration("0"), Some(Duration::ZERO));
        assert_eq!(parse_duration("banana"), None);
        assert_eq!(parse_duration("5"), None);
    }

    #[test]
    fn test_duration_numbers_are_nanoseconds() {
        assert_eq!(as_duration(&json!(1_000_000_000)), Duration::from_secs(1));
        assert_eq!(as_duration(&json!("1s")), Duration::from_secs(1));
        // A unitless numeric string counts the same as a bare number.
        assert_eq!(as_duration(&json!("5")), Duration::from_nanos(5));
        assert_eq!(as_duration(&json!("-5")), Duration::ZERO);
        assert_eq!(as_duration(&json!("junk")), Duration::ZERO);
    }

    #[test]
    fn test_time_coercion() {
        let t = as_time(&json!("2020-01-02T03:04:05Z"));
        assert_eq!(t.timestamp(), 1577934245);

        let t = as_time(&json!("2020-01-02"));
        assert_eq!(t.timestamp(), 1577923200);

        let t = as_time(&json!(1577934245));
        assert_eq!(t.timestamp(), 1577934245);

        // Failure degrades to the epoch.
        assert_eq!(as_time(&json!("not a time")).timestamp(), 0);
    }

    #[test]
    fn test_size_in_bytes_table() {
        let cases: &[(&str, u64)] = &[
            ("", 0),
            ("b", 0),
            ("12 bytes", 0),
            ("200000000000gb", 0),
            ("12 b", 12),
            ("43 MB", 43 * (1 << 20)),
            ("10mb", 10 * (1 << 20)),
            ("1gb", 1 << 30),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_size_in_bytes(input), *expected, "input {input:?}");
        }
    }

    #[test]
    fn test_string_map_coercion() {
        let m = as_string_map_string(&json!({"a": 1, "b": "two"}));
        assert_eq!(m["a"], "1");
        assert_eq!(m["b"], "two");
        assert!(as_string_map_string(&json!("nope")).is_empty());
    }
}
