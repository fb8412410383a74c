//! Loosely-typed payload access
//!
//! Embedded card payloads are nested JSON mappings whose shape changes
//! between page revisions. `PayloadValue` wraps a decoded value and exposes
//! accessors that answer `None` (or an empty iterator) on any shape mismatch,
//! so traversal code never has to fail on an unexpected type.

use serde_json::Value;

/// Borrowed view over a decoded payload value
#[derive(Debug, Clone, Copy)]
pub struct PayloadValue<'a>(&'a Value);

impl<'a> PayloadValue<'a> {
    pub const fn new(value: &'a Value) -> Self {
        Self(value)
    }

    /// Field of a mapping; `None` when absent or when this is not a mapping
    pub fn get(self, key: &str) -> Option<Self> {
        self.0.as_object()?.get(key).map(Self)
    }

    pub fn as_str(self) -> Option<&'a str> {
        self.0.as_str()
    }

    pub fn is_mapping(self) -> bool {
        self.0.is_object()
    }

    pub fn is_sequence(self) -> bool {
        self.0.is_array()
    }

    pub fn is_number(self) -> bool {
        self.0.is_number()
    }

    pub fn is_null(self) -> bool {
        self.0.is_null()
    }

    /// Values of a mapping in document order; empty for anything else
    pub fn mapping_values(self) -> impl Iterator<Item = PayloadValue<'a>> {
        self.0
            .as_object()
            .into_iter()
            .flat_map(|map| map.values())
            .map(PayloadValue)
    }

    /// Elements of a sequence; empty for anything else
    pub fn sequence(self) -> impl Iterator<Item = PayloadValue<'a>> {
        self.0
            .as_array()
            .into_iter()
            .flat_map(|items| items.iter())
            .map(PayloadValue)
    }

    /// Non-zero numbers and non-empty strings count as present values
    pub fn is_meaningful(self) -> bool {
        match self.0 {
            Value::String(s) => !s.is_empty(),
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::Bool(b) => *b,
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
            Value::Null => false,
        }
    }

    /// Text form of a scalar: strings as-is, numbers and booleans in their
    /// JSON spelling, nested values as compact JSON, `null` as `None`
    pub fn to_display_text(self) -> Option<String> {
        match self.0 {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }

    /// Short type name for diagnostics
    pub const fn kind(self) -> &'static str {
        match self.0 {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "sequence",
            Value::Object(_) => "mapping",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accessors_never_fail_on_shape_mismatch() {
        let value = json!([1, 2, 3]);
        let payload = PayloadValue::new(&value);

        assert!(payload.get("widgets").is_none());
        assert_eq!(payload.mapping_values().count(), 0);
        assert_eq!(payload.sequence().count(), 3);
        assert!(payload.as_str().is_none());
        assert!(payload.is_sequence());
        assert!(!payload.is_mapping());
        assert!(!payload.is_null());
    }

    #[test]
    fn test_mapping_values_keep_document_order() {
        let value: Value = serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let order: Vec<String> = PayloadValue::new(&value)
            .mapping_values()
            .filter_map(|v| v.to_display_text())
            .collect();
        assert_eq!(order, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_display_text_coercion() {
        let value = json!({"s": "text", "n": 1999, "f": 12.5, "b": true, "null": null, "list": [1, "a"]});
        let payload = PayloadValue::new(&value);

        let text = |key: &str| payload.get(key).and_then(|v| v.to_display_text());
        assert_eq!(text("s").as_deref(), Some("text"));
        assert_eq!(text("n").as_deref(), Some("1999"));
        assert_eq!(text("f").as_deref(), Some("12.5"));
        assert_eq!(text("b").as_deref(), Some("true"));
        assert_eq!(text("null"), None);
        assert_eq!(text("list").as_deref(), Some(r#"[1,"a"]"#));
    }

    #[test]
    fn test_meaningful_values() {
        let value = json!({"zero": 0, "empty": "", "price": 1999, "label": "500"});
        let payload = PayloadValue::new(&value);

        assert!(!payload.get("zero").is_some_and(|v| v.is_meaningful()));
        assert!(!payload.get("empty").is_some_and(|v| v.is_meaningful()));
        assert!(payload.get("price").is_some_and(|v| v.is_meaningful()));
        assert!(payload.get("label").is_some_and(|v| v.is_meaningful()));
    }
}
