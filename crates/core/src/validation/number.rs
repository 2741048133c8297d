use serde_json::Value;

/// Read a numeric form field.
///
/// JSON numbers are taken as-is; strings are trimmed and parsed as `f64`.
/// Anything else, or a non-finite result, yields `None`.
pub(crate) fn parse_finite(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_numeric_strings_parse() {
        assert_eq!(parse_finite(&json!(10)), Some(10.0));
        assert_eq!(parse_finite(&json!(2.5)), Some(2.5));
        assert_eq!(parse_finite(&json!(" 7.25 ")), Some(7.25));
        assert_eq!(parse_finite(&json!("1e3")), Some(1000.0));
    }

    #[test]
    fn non_numeric_values_are_missing() {
        assert_eq!(parse_finite(&Value::Null), None);
        assert_eq!(parse_finite(&json!("")), None);
        assert_eq!(parse_finite(&json!("ten")), None);
        assert_eq!(parse_finite(&json!(true)), None);
        assert_eq!(parse_finite(&json!([1])), None);
    }

    #[test]
    fn non_finite_strings_are_missing() {
        assert_eq!(parse_finite(&json!("inf")), None);
        assert_eq!(parse_finite(&json!("NaN")), None);
        assert_eq!(parse_finite(&json!("-Infinity")), None);
    }
}
