//! Column values exchanged with drivers.
//!
//! Every driver adapter converts its native cell type into [`Value`], and
//! every row type converts its fields to and from it. Conversions from
//! `Value::Text` parse the text, so rows replayed from CSV files (where every
//! cell is text) can populate typed fields.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A positional row as produced by a driver, before mapping.
pub type RawRow = Vec<Value>;

/// A single column value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Get type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Render the value as a CSV field.
    ///
    /// `Null` becomes an empty field and bytes are hex-encoded, mirroring
    /// [`Value::from_csv_field`].
    pub fn to_csv_field(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => s.clone(),
            Value::Bytes(b) => hex::encode(b),
        }
    }

    /// Read a CSV field back as text.
    ///
    /// An empty field stays empty text: the file cannot tell `Null` from
    /// `""`, and [`Option`] fields read empty text as `None` when the inner
    /// type cannot be built from it.
    pub fn from_csv_field(field: &str) -> Self {
        Value::Text(field.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            other => write!(f, "{}", other.to_csv_field()),
        }
    }
}

/// A value could not be converted into the requested Rust type.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot convert {found} into {expected}{}", field_suffix(.field))]
pub struct ValueError {
    pub field: Option<&'static str>,
    pub expected: &'static str,
    pub found: String,
}

impl ValueError {
    pub fn new(expected: &'static str, found: &Value) -> Self {
        Self {
            field: None,
            expected,
            found: format!("{} `{}`", found.type_name(), found),
        }
    }

    /// Attach the field name the failed value was bound to.
    pub fn for_field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }
}

fn field_suffix(field: &Option<&'static str>) -> String {
    field.map(|f| format!(" for field `{f}`")).unwrap_or_default()
}

/// Conversion from a column value.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

/// Conversion into a column value.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        Ok(value)
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Int(i) => Ok(i),
            Value::Bool(b) => Ok(i64::from(b)),
            Value::Text(ref s) => s.trim().parse().map_err(|_| ValueError::new("i64", &value)),
            other => Err(ValueError::new("i64", &other)),
        }
    }
}

macro_rules! narrow_int {
    ($($ty:ty),+) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, ValueError> {
                    let wide = i64::from_value(value.clone())
                        .map_err(|_| ValueError::new(stringify!($ty), &value))?;
                    <$ty>::try_from(wide).map_err(|_| ValueError::new(stringify!($ty), &value))
                }
            }

            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }
            }
        )+
    };
}

narrow_int!(i32, i16, u32, u16, u8);

impl ToValue for i64 {
    fn to_value(&self) -> Value {
        Value::Int(*self)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            Value::Text(ref s) => s.trim().parse().map_err(|_| ValueError::new("f64", &value)),
            other => Err(ValueError::new("f64", &other)),
        }
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Int(0) => Ok(false),
            Value::Int(1) => Ok(true),
            Value::Text(ref s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Ok(true),
                "false" | "f" | "0" => Ok(false),
                _ => Err(ValueError::new("bool", &value)),
            },
            other => Err(ValueError::new("bool", &other)),
        }
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Int(i) => Ok(i.to_string()),
            Value::Float(f) => Ok(f.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(ValueError::new("String", &other)),
        }
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl ToValue for &str {
    fn to_value(&self) -> Value {
        Value::Text((*self).to_string())
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bytes(b) => Ok(b),
            Value::Text(ref s) => hex::decode(s).map_err(|_| ValueError::new("bytes", &value)),
            other => Err(ValueError::new("bytes", &other)),
        }
    }
}

impl ToValue for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            Value::Text(s) if s.is_empty() => Ok(T::from_value(Value::Text(s)).ok()),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, ToValue::to_value)
    }
}

/// Build a parameter list from heterogeneous values.
///
/// ```
/// let params = typed_sql::params![1_i64, "alice", None::<String>];
/// assert_eq!(params.len(), 3);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::value::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::value::ToValue::to_value(&$value)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::Int(7), 7)]
    #[case(Value::Text(" 42 ".into()), 42)]
    #[case(Value::Bool(true), 1)]
    fn test_i64_from_value(#[case] input: Value, #[case] expected: i64) {
        assert_eq!(i64::from_value(input).unwrap(), expected);
    }

    #[test]
    fn test_i64_rejects_words() {
        let err = i64::from_value(Value::Text("seven".into())).unwrap_err();
        assert_eq!(err.expected, "i64");
        assert!(err.to_string().contains("seven"));
    }

    #[test]
    fn test_narrow_int_overflow() {
        assert!(i16::from_value(Value::Int(70_000)).is_err());
        assert_eq!(i16::from_value(Value::Int(-3)).unwrap(), -3);
    }

    #[rstest]
    #[case("TRUE", true)]
    #[case("f", false)]
    #[case("1", true)]
    fn test_bool_from_text(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(bool::from_value(Value::Text(text.into())).unwrap(), expected);
    }

    #[test]
    fn test_option_maps_null() {
        assert_eq!(Option::<i64>::from_value(Value::Null).unwrap(), None);
        assert_eq!(Option::<i64>::from_value(Value::Int(3)).unwrap(), Some(3));
        assert_eq!(None::<i64>.to_value(), Value::Null);
    }

    #[test]
    fn test_bytes_csv_field_is_hex() {
        let value = Value::Bytes(vec![0xde, 0xad]);
        assert_eq!(value.to_csv_field(), "dead");
        let back = Vec::<u8>::from_value(Value::from_csv_field("dead")).unwrap();
        assert_eq!(back, vec![0xde, 0xad]);
    }

    #[test]
    fn test_empty_csv_field_is_empty_text() {
        assert_eq!(Value::from_csv_field(""), Value::Text(String::new()));
        assert_eq!(Value::from_csv_field("x"), Value::Text("x".into()));
        assert_eq!(String::from_value(Value::from_csv_field("")).unwrap(), "");
        assert_eq!(Option::<i64>::from_value(Value::from_csv_field("")).unwrap(), None);
        assert_eq!(Option::<bool>::from_value(Value::from_csv_field("")).unwrap(), None);
        assert_eq!(
            Option::<String>::from_value(Value::from_csv_field("")).unwrap(),
            Some(String::new())
        );
        assert!(i64::from_value(Value::from_csv_field("")).is_err());
    }

    #[test]
    fn test_field_name_in_message() {
        let err = ValueError::new("i64", &Value::Text("x".into())).for_field("id");
        assert!(err.to_string().ends_with("for field `id`"));
    }

    #[test]
    fn test_params_macro() {
        let params = crate::params![1_i64, "a", Some(2.5_f64)];
        assert_eq!(
            params,
            vec![Value::Int(1), Value::Text("a".into()), Value::Float(2.5)]
        );
    }
}
