//! Opaque JSON carried as text.
//!
//! Several role attributes (`query`, `field_security`, `global`, `metadata`)
//! are configured as JSON *text* but travel to the cluster as parsed JSON
//! values and come back re-serialized, usually with different key order and
//! whitespace. `JsonText` keeps both forms so comparisons never re-parse.
//!
//! ## Equality
//!
//! - Two texts are equal when their parsed values are structurally equal.
//! - Blank text and `{}` are the same value: "no restriction configured" and
//!   "explicitly empty object" are indistinguishable to the cluster.
//! - Text that does not parse compares by its trimmed raw form. It equals a
//!   JSON string literal with the same content, since both are sent as that
//!   string.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// The text every optional JSON attribute defaults to.
pub const EMPTY_OBJECT: &str = "{}";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct JsonText {
    raw: String,
    parsed: Option<JsonValue>,
}

impl JsonText {
    pub fn new(text: impl Into<String>) -> Self {
        let raw = text.into();
        let parsed = if raw.trim().is_empty() {
            None
        } else {
            serde_json::from_str(&raw).ok()
        };
        Self { raw, parsed }
    }

    pub fn empty_object() -> Self {
        Self::new(EMPTY_OBJECT)
    }

    /// Blank text, the form the cluster's read path uses for "absent".
    pub fn blank() -> Self {
        Self::new(String::new())
    }

    /// Serialize a wire value back to text.
    pub fn from_value(value: &JsonValue) -> Self {
        Self {
            raw: value.to_string(),
            parsed: Some(value.clone()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed form; `None` for blank or unparseable text.
    pub fn parsed(&self) -> Option<&JsonValue> {
        self.parsed.as_ref()
    }

    pub fn is_blank(&self) -> bool {
        self.raw.trim().is_empty()
    }

    /// Blank text or an empty JSON object.
    pub fn is_empty(&self) -> bool {
        self.is_blank() || matches!(&self.parsed, Some(JsonValue::Object(map)) if map.is_empty())
    }

    /// Value to put on the wire.
    ///
    /// `None` for blank text. Text that does not parse is passed through as a
    /// JSON string so the cluster reports the problem instead of this layer.
    pub fn to_wire(&self) -> Option<JsonValue> {
        if self.is_blank() {
            return None;
        }
        Some(
            self.parsed
                .clone()
                .unwrap_or_else(|| JsonValue::String(self.raw.clone())),
        )
    }
}

impl Default for JsonText {
    fn default() -> Self {
        Self::empty_object()
    }
}

impl PartialEq for JsonText {
    fn eq(&self, other: &Self) -> bool {
        if self.is_empty() && other.is_empty() {
            return true;
        }
        match (&self.parsed, &other.parsed) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.raw.trim() == other.raw.trim(),
            // Unparsed text goes on the wire as a JSON string.
            (Some(JsonValue::String(s)), None) => s.trim() == other.raw.trim(),
            (None, Some(JsonValue::String(s))) => self.raw.trim() == s.trim(),
            _ => false,
        }
    }
}

impl Eq for JsonText {}

impl From<String> for JsonText {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for JsonText {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<JsonText> for String {
    fn from(value: JsonText) -> Self {
        value.raw
    }
}

impl core::fmt::Display for JsonText {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn key_order_and_whitespace_do_not_matter() {
        assert_eq!(JsonText::new(r#"{"a":1,"b":2}"#), JsonText::new(r#"{"b":2,"a":1}"#));
        assert_eq!(
            JsonText::new(r#"{"grant": ["*"]}"#),
            JsonText::new("{\n  \"grant\" : [ \"*\" ]\n}")
        );
    }

    #[test]
    fn array_order_matters() {
        assert_ne!(JsonText::new(r#"["a","b"]"#), JsonText::new(r#"["b","a"]"#));
    }

    #[test]
    fn blank_and_empty_object_are_equal() {
        assert_eq!(JsonText::blank(), JsonText::empty_object());
        assert_eq!(JsonText::new("  "), JsonText::new("{ }"));
        assert!(JsonText::blank().is_empty());
        assert!(JsonText::empty_object().is_empty());
        assert!(!JsonText::new(r#"{"a":1}"#).is_empty());
    }

    #[test]
    fn unparseable_text_passes_through_as_string() {
        let text = JsonText::new("not json");
        assert_eq!(text.parsed(), None);
        assert_eq!(text.to_wire(), Some(JsonValue::String("not json".to_string())));
        assert_eq!(text, JsonText::new(" not json "));
        assert_ne!(text, JsonText::new("not json either"));
    }

    #[test]
    fn string_literal_equals_its_unparsed_content() {
        let literal = JsonText::new(r#""abc""#);
        let returned = JsonText::new("abc");
        assert_eq!(literal.to_wire(), returned.to_wire());
        assert_eq!(literal, returned);
        assert_eq!(returned, literal);
        assert_ne!(literal, JsonText::new("abd"));
        assert_ne!(JsonText::new("1"), JsonText::new(r#""1""#));
    }

    #[test]
    fn blank_text_has_no_wire_value() {
        assert_eq!(JsonText::blank().to_wire(), None);
        assert_eq!(JsonText::empty_object().to_wire(), Some(json!({})));
    }

    #[test]
    fn from_value_round_trips() {
        let value = json!({"match": {"owner": "ops"}});
        let text = JsonText::from_value(&value);
        assert_eq!(text.parsed(), Some(&value));
        assert_eq!(text, JsonText::new(r#"{ "match": { "owner": "ops" } }"#));
    }

    #[test]
    fn serializes_as_plain_string() {
        let text = JsonText::new(r#"{"a":1}"#);
        assert_eq!(serde_json::to_string(&text).unwrap(), r#""{\"a\":1}""#);
        let back: JsonText = serde_json::from_str(r#""{\"a\":1}""#).unwrap();
        assert_eq!(back, text);
    }

    proptest! {
        /// Property: reordering the keys of an object never changes equality.
        #[test]
        fn reordered_objects_are_equal(
            entries in prop::collection::btree_map("[a-z]{1,8}", any::<i32>(), 0..8)
        ) {
            let forward: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("\"{k}\":{v}"))
                .collect();
            let mut backward = forward.clone();
            backward.reverse();

            let a = JsonText::new(format!("{{{}}}", forward.join(",")));
            let b = JsonText::new(format!("{{ {} }}", backward.join(" , ")));
            prop_assert_eq!(a, b);
        }
    }
}
