//! DynamoDB `AttributeValue` type with custom serialization.
//!
//! `AttributeValue` is a tagged union where exactly one variant is present.
//! The JSON wire format uses single-key objects like `{"S": "hello"}`.
//!
//! Only the six scalar and set kinds of the 2012-08-10 API are modelled.
//! Binary payloads are kept as their opaque text form and never decoded.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::AttributeType;

/// DynamoDB attribute value.
///
/// Numbers are always string-encoded to preserve arbitrary precision.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributeValue {
    /// String value.
    S(String),
    /// Number value (decimal text).
    N(String),
    /// Binary value (opaque text form, usually base64).
    B(String),
    /// String Set.
    Ss(Vec<String>),
    /// Number Set (string-encoded).
    Ns(Vec<String>),
    /// Binary Set (opaque text form).
    Bs(Vec<String>),
}

impl AttributeValue {
    /// Returns the type tag of the kind held by this value.
    #[must_use]
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            Self::S(_) => AttributeType::S,
            Self::N(_) => AttributeType::N,
            Self::B(_) => AttributeType::B,
            Self::Ss(_) => AttributeType::Ss,
            Self::Ns(_) => AttributeType::Ns,
            Self::Bs(_) => AttributeType::Bs,
        }
    }

    /// Returns the scalar text for the requested type tag.
    ///
    /// Yields an empty string when the value holds a different kind, or when
    /// a set tag is requested.
    #[must_use]
    pub fn value(&self, ty: &AttributeType) -> &str {
        match (ty, self) {
            (AttributeType::S, Self::S(s))
            | (AttributeType::N, Self::N(s))
            | (AttributeType::B, Self::B(s)) => s,
            _ => "",
        }
    }

    /// Returns the set members for the requested set type tag, empty otherwise.
    #[must_use]
    pub fn members(&self, ty: &AttributeType) -> &[String] {
        match (ty, self) {
            (AttributeType::Ss, Self::Ss(v))
            | (AttributeType::Ns, Self::Ns(v))
            | (AttributeType::Bs, Self::Bs(v)) => v,
            _ => &[],
        }
    }

    /// Compares this value with `expected` under the kind `expected` carries.
    #[must_use]
    pub fn equals(&self, expected: &AttributeValue) -> bool {
        self.equals_as(&expected.attribute_type(), expected)
    }

    /// Compares this value with `expected` interpreted as type `ty`.
    ///
    /// Scalars compare by exact text. Sets compare by length and then
    /// member by member in stored order, so `["a","b"]` differs from
    /// `["b","a"]`.
    #[must_use]
    pub fn equals_as(&self, ty: &AttributeType, expected: &AttributeValue) -> bool {
        if ty.is_set() {
            self.members(ty) == expected.members(ty)
        } else {
            self.value(ty) == expected.value(ty)
        }
    }

    /// Returns the number text if this is an `N` variant.
    #[must_use]
    pub fn as_n(&self) -> Option<&str> {
        match self {
            Self::N(n) => Some(n),
            _ => None,
        }
    }

    /// Approximate stored size: attribute text lengths summed.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::S(s) | Self::N(s) | Self::B(s) => s.len(),
            Self::Ss(v) | Self::Ns(v) | Self::Bs(v) => v.iter().map(String::len).sum(),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S(s) => write!(f, "{{S: {s}}}"),
            Self::N(n) => write!(f, "{{N: {n}}}"),
            Self::B(b) => write!(f, "{{B: {} bytes}}", b.len()),
            Self::Ss(v) => write!(f, "{{SS: {v:?}}}"),
            Self::Ns(v) => write!(f, "{{NS: {v:?}}}"),
            Self::Bs(v) => write!(f, "{{BS: {} items}}", v.len()),
        }
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::S(s) => map.serialize_entry("S", s)?,
            Self::N(n) => map.serialize_entry("N", n)?,
            Self::B(b) => map.serialize_entry("B", b)?,
            Self::Ss(v) => map.serialize_entry("SS", v)?,
            Self::Ns(v) => map.serialize_entry("NS", v)?,
            Self::Bs(v) => map.serialize_entry("BS", v)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AttributeValueVisitor)
    }
}

struct AttributeValueVisitor;

impl<'de> Visitor<'de> for AttributeValueVisitor {
    type Value = AttributeValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a DynamoDB AttributeValue object with exactly one type key")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
        let Some(key) = map.next_key::<String>()? else {
            return Err(de::Error::custom(
                "AttributeValue must have exactly one key",
            ));
        };

        let value = match key.as_str() {
            "S" => AttributeValue::S(map.next_value()?),
            "N" => AttributeValue::N(map.next_value()?),
            "B" => AttributeValue::B(map.next_value()?),
            "SS" => AttributeValue::Ss(map.next_value()?),
            "NS" => AttributeValue::Ns(map.next_value()?),
            "BS" => AttributeValue::Bs(map.next_value()?),
            other => {
                return Err(de::Error::unknown_field(
                    other,
                    &["S", "N", "B", "SS", "NS", "BS"],
                ));
            }
        };

        if map.next_key::<String>()?.is_some() {
            return Err(de::Error::custom(
                "AttributeValue must have exactly one key",
            ));
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_serialize_string_value() {
        let val = AttributeValue::S("hello".to_owned());
        let json = serde_json::to_string(&val).unwrap();
        assert_eq!(json, r#"{"S":"hello"}"#);
    }

    #[test]
    fn test_should_serialize_number_set() {
        let val = AttributeValue::Ns(vec!["1".to_owned(), "2".to_owned()]);
        let json = serde_json::to_string(&val).unwrap();
        assert_eq!(json, r#"{"NS":["1","2"]}"#);
    }

    #[test]
    fn test_should_keep_binary_as_opaque_text() {
        let val: AttributeValue = serde_json::from_str(r#"{"B":"not base64!"}"#).unwrap();
        assert_eq!(val, AttributeValue::B("not base64!".to_owned()));
    }

    #[test]
    fn test_should_reject_unknown_type_key() {
        let err = serde_json::from_str::<AttributeValue>(r#"{"BOOL":true}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_should_reject_multiple_type_keys() {
        let err = serde_json::from_str::<AttributeValue>(r#"{"S":"a","N":"1"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_should_return_empty_value_for_other_kind() {
        let val = AttributeValue::N("42".to_owned());
        assert_eq!(val.value(&AttributeType::N), "42");
        assert_eq!(val.value(&AttributeType::S), "");
        assert_eq!(val.value(&AttributeType::Ns), "");
    }

    #[test]
    fn test_should_compare_scalars_by_text() {
        let a = AttributeValue::N("10".to_owned());
        assert!(a.equals(&AttributeValue::N("10".to_owned())));
        assert!(!a.equals(&AttributeValue::N("10.0".to_owned())));
        assert!(!a.equals(&AttributeValue::S("10".to_owned())));
    }

    #[test]
    fn test_should_compare_sets_positionally() {
        let stored = AttributeValue::Ss(vec!["a".to_owned(), "b".to_owned()]);
        assert!(stored.equals(&AttributeValue::Ss(vec!["a".to_owned(), "b".to_owned()])));
        assert!(!stored.equals(&AttributeValue::Ss(vec!["b".to_owned(), "a".to_owned()])));
        assert!(!stored.equals(&AttributeValue::Ss(vec!["a".to_owned()])));
    }

    #[test]
    fn test_should_compare_under_declared_type() {
        let stored = AttributeValue::S("x".to_owned());
        let expected = AttributeValue::S("y".to_owned());
        assert!(!stored.equals_as(&AttributeType::S, &expected));
        // Both sides have no N text under an N declaration.
        assert!(stored.equals_as(&AttributeType::N, &expected));
    }
}
