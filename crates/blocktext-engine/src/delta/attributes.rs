use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Attribute key holding the line type on the newline that ends a line.
pub const LINE_TYPE_KEY: &str = "$type";

/// A formatting attribute value.
///
/// Mirrors the JSON scalar values a host can attach to content. `Null` is used
/// by transforms to request removal of an attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Null,
}

impl AttributeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

/// Attribute name to value, ordered by name so that equal maps compare and
/// serialize identically.
pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// Structural role of a line.
///
/// `Ol` and `Ul` are length modifiers: rendering them prefixes glyphs which are
/// not part of the stored text. Hosts may define their own types, carried as
/// `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LineType {
    #[default]
    Normal,
    Ol,
    Ul,
    Quoted,
    Other(String),
}

impl LineType {
    pub fn as_str(&self) -> &str {
        match self {
            LineType::Normal => "normal",
            LineType::Ol => "ol",
            LineType::Ul => "ul",
            LineType::Quoted => "quoted",
            LineType::Other(name) => name,
        }
    }
}

impl From<&str> for LineType {
    fn from(value: &str) -> Self {
        match value {
            "normal" => LineType::Normal,
            "ol" => LineType::Ol,
            "ul" => LineType::Ul,
            "quoted" => LineType::Quoted,
            other => LineType::Other(other.to_string()),
        }
    }
}

impl From<String> for LineType {
    fn from(value: String) -> Self {
        LineType::from(value.as_str())
    }
}

impl From<LineType> for String {
    fn from(value: LineType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Union of two attribute maps where `left` wins on conflicting keys.
pub fn merge_attributes_left(left: &AttributeMap, right: &AttributeMap) -> AttributeMap {
    let mut merged = right.clone();
    merged.extend(left.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Build an attribute map from `(name, value)` pairs.
pub fn attributes<K, V, I>(pairs: I) -> AttributeMap
where
    K: Into<String>,
    V: Into<AttributeValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("normal", LineType::Normal)]
    #[case("ol", LineType::Ol)]
    #[case("ul", LineType::Ul)]
    #[case("quoted", LineType::Quoted)]
    #[case("heading-1", LineType::Other("heading-1".to_string()))]
    fn test_line_type_from_str(#[case] input: &str, #[case] expected: LineType) {
        assert_eq!(LineType::from(input), expected);
        assert_eq!(expected.as_str(), input);
    }

    #[test]
    fn test_merge_attributes_left_prefers_left() {
        let left = attributes([("bold", true)]);
        let right = attributes([("bold", false), ("italic", true)]);

        let merged = merge_attributes_left(&left, &right);

        assert_eq!(merged, attributes([("bold", true), ("italic", true)]));
    }

    #[test]
    fn test_attribute_value_json_shape() {
        let attrs = attributes([
            ("bold", AttributeValue::Bool(true)),
            ("color", AttributeValue::from("red")),
            ("size", AttributeValue::Number(12.0)),
            ("link", AttributeValue::Null),
        ]);

        let json = serde_json::to_string(&attrs).unwrap();
        assert_eq!(
            json,
            r#"{"bold":true,"color":"red","link":null,"size":12.0}"#
        );

        let back: AttributeMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, attrs);
    }

    #[test]
    fn test_line_type_serializes_as_string() {
        let json = serde_json::to_string(&LineType::Ol).unwrap();
        assert_eq!(json, r#""ol""#);
        let back: LineType = serde_json::from_str(r#""custom""#).unwrap();
        assert_eq!(back, LineType::Other("custom".to_string()));
    }
}
