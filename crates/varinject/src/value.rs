//! value representation
//!
//! A configuration model is an untyped tree with the following data types
//! - null
//! - boolean (true/false)
//! - integer (signed, i64)
//! - unsigned (u64, only for integers beyond i64::MAX)
//! - decimal (f64)
//! - string (utf-8)
//! - array ("list" of values)
//! - object (order-preserving "map"/"dictionary", where the key is of type string)
//!
//! Models are parsed from yaml or json. Mapping keys that are not strings in the source
//! document are stringified on the way in.
//!
use indexmap::IndexMap;
use serde::{
    ser::{SerializeMap, SerializeSeq},
    Serializer,
};

pub type Object = IndexMap<String, Value>;

/// All possible value types
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Unsigned(u64),
    Decimal(f64),
    String(String),
    Array(Vec<Value>),
    Object(Object),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Follow a chain of object keys
    pub fn pointer(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .try_fold(self, |value, key| value.as_object()?.get(*key))
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Array(_) | Value::Object(_))
    }
}

/// Plain text form of a value, as recorded in the variable file
///
/// Collections are rendered as compact json. Decimals always carry a fractional part,
/// `1.0` stays `1.0`.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Integer(value) => write!(f, "{value}"),
            Value::Unsigned(value) => write!(f, "{value}"),
            Value::Decimal(value) => write!(f, "{value:?}"),
            Value::String(value) => f.write_str(value),
            Value::Array(_) | Value::Object(_) => {
                let json = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<K: ToString, V: Into<Value>> From<IndexMap<K, V>> for Value {
    fn from(value: IndexMap<K, V>) -> Self {
        Value::Object(
            value
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        )
    }
}

impl From<serde_json::Number> for Value {
    fn from(value: serde_json::Number) -> Self {
        if let Some(int) = value.as_i64() {
            return Value::Integer(int);
        }
        if let Some(unsigned) = value.as_u64() {
            return Value::Unsigned(unsigned);
        }

        value.as_f64().map(Value::Decimal).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match value {
            Json::Null => Value::Null,
            Json::Bool(b) => b.into(),
            Json::Number(n) => n.into(),
            Json::String(s) => s.into(),
            Json::Array(a) => a.into(),
            Json::Object(o) => Value::Object(o.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

impl From<serde_yaml::Number> for Value {
    fn from(value: serde_yaml::Number) -> Self {
        if let Some(int) = value.as_i64() {
            return Value::Integer(int);
        }
        if let Some(unsigned) = value.as_u64() {
            return Value::Unsigned(unsigned);
        }

        value.as_f64().map(Value::Decimal).unwrap_or(Value::Null)
    }
}

impl From<serde_yaml::Value> for Value {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value as Yaml;

        match value {
            Yaml::Null => Value::Null,
            Yaml::Bool(b) => b.into(),
            Yaml::Number(n) => n.into(),
            Yaml::String(s) => s.into(),
            Yaml::Sequence(s) => s.into(),
            Yaml::Mapping(m) => Value::Object(
                m.into_iter()
                    .map(|(k, v)| (yaml_key(k), v.into()))
                    .collect(),
            ),
            Yaml::Tagged(tagged) => tagged.value.into(),
        }
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        other => Value::from(other).to_string(),
    }
}

impl serde::ser::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(value) => serializer.serialize_bool(*value),
            Value::Integer(value) => serializer.serialize_i64(*value),
            Value::Unsigned(value) => serializer.serialize_u64(*value),
            Value::Decimal(value) => serializer.serialize_f64(*value),
            Value::String(value) => serializer.serialize_str(value),
            Value::Array(value) => {
                let mut ser = serializer.serialize_seq(Some(value.len()))?;
                for element in value {
                    ser.serialize_element(element)?;
                }
                ser.end()
            }
            Value::Object(value) => {
                let mut ser = serializer.serialize_map(Some(value.len()))?;
                for (element_key, element_value) in value {
                    ser.serialize_entry(element_key, element_value)?;
                }
                ser.end()
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_is_plain_text() {
        assert_eq!(Value::from("abc").to_string(), "abc");
        assert_eq!(Value::Integer(7001).to_string(), "7001");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::Null.to_string(), "");

        let list: Value = serde_json::json!(["a", 1]).into();
        assert_eq!(list.to_string(), r#"["a",1]"#);
    }

    #[test]
    fn numbers_keep_their_text() {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str("timeout: 1.0\nratio: 0.25\nbig: 18446744073709551615\nport: -1").unwrap();
        let value = Value::from(yaml);
        let text = |key: &str| value.pointer(&[key]).unwrap().to_string();

        assert_eq!(text("timeout"), "1.0");
        assert_eq!(text("ratio"), "0.25");
        assert_eq!(text("big"), "18446744073709551615");
        assert_eq!(text("port"), "-1");

        let json: Value = serde_json::json!({"big": u64::MAX, "timeout": 1.0}).into();
        assert_eq!(json.pointer(&["big"]), Some(&Value::Unsigned(u64::MAX)));
        assert_eq!(json.pointer(&["timeout"]).unwrap().to_string(), "1.0");
    }

    #[test]
    fn yaml_keys_are_stringified() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("1: one\ntrue: yes\nkey: value").unwrap();
        let value = Value::from(yaml);
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();

        assert_eq!(keys, vec!["1", "true", "key"]);
    }

    #[test]
    fn pointer_follows_objects() {
        let value: Value = serde_json::json!({"a": {"b": {"c": 3}}}).into();

        assert_eq!(value.pointer(&["a", "b", "c"]), Some(&Value::Integer(3)));
        assert_eq!(value.pointer(&["a", "x"]), None);
    }
}
