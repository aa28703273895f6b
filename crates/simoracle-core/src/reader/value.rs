//! Typed cell values and column dtypes.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

/// A single typed cell: a scalar or a fixed-size array of scalars.
///
/// Carries a total order (floats compare with `f64::total_cmp`) so that
/// every canonical form built from it is `Ord + Hash`.
///
/// Serialized as plain JSON scalars and arrays, except non-finite floats,
/// which JSON cannot express: they are written as `{"float": "inf"}`,
/// `{"float": "-inf"}` or `{"float": "nan"}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawValue")]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Array(Vec<FieldValue>),
}

impl FieldValue {
    fn rank(&self) -> u8 {
        match self {
            FieldValue::Bool(_) => 0,
            FieldValue::Int(_) => 1,
            FieldValue::Float(_) => 2,
            FieldValue::Text(_) => 3,
            FieldValue::Array(_) => 4,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct NonFinite<'a> {
    float: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Array(Vec<FieldValue>),
    NonFinite { float: String },
}

impl TryFrom<RawValue> for FieldValue {
    type Error = String;

    fn try_from(raw: RawValue) -> std::result::Result<Self, Self::Error> {
        Ok(match raw {
            RawValue::Bool(v) => FieldValue::Bool(v),
            RawValue::Int(v) => FieldValue::Int(v),
            RawValue::Float(v) => FieldValue::Float(v),
            RawValue::Text(v) => FieldValue::Text(v),
            RawValue::Array(v) => FieldValue::Array(v),
            RawValue::NonFinite { float } => FieldValue::Float(match float.as_str() {
                "inf" => f64::INFINITY,
                "-inf" => f64::NEG_INFINITY,
                "nan" => f64::NAN,
                other => return Err(format!("unknown non-finite float: {other}")),
            }),
        })
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FieldValue::Bool(v) => serializer.serialize_bool(*v),
            FieldValue::Int(v) => serializer.serialize_i64(*v),
            FieldValue::Float(v) if v.is_finite() => serializer.serialize_f64(*v),
            FieldValue::Float(v) => {
                let float = if v.is_nan() {
                    "nan"
                } else if v.is_sign_negative() {
                    "-inf"
                } else {
                    "inf"
                };
                NonFinite { float }.serialize(serializer)
            }
            FieldValue::Text(v) => serializer.serialize_str(v),
            FieldValue::Array(items) => items.serialize(serializer),
        }
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
            (FieldValue::Int(a), FieldValue::Int(b)) => a.cmp(b),
            (FieldValue::Float(a), FieldValue::Float(b)) => a.total_cmp(b),
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Array(a), FieldValue::Array(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FieldValue {}

impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            FieldValue::Bool(v) => v.hash(state),
            FieldValue::Int(v) => v.hash(state),
            // total_cmp equality is bitwise equality
            FieldValue::Float(v) => v.to_bits().hash(state),
            FieldValue::Text(v) => v.hash(state),
            FieldValue::Array(v) => v.hash(state),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(v) => write!(f, "{v}"),
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Text(v) => write!(f, "{v:?}"),
            FieldValue::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

/// Column dtype. Serialized as a short string (`"int"`, `"[float; 3]"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DataType {
    Bool,
    Int,
    Float,
    Text,
    Array(Box<DataType>, usize),
}

impl DataType {
    /// Coerce `value` into this dtype, or `None` when it does not fit.
    ///
    /// Ints widen into float columns, `-0.0` is folded into `0.0` and every
    /// NaN payload is folded into `f64::NAN`.
    pub fn coerce(&self, value: FieldValue) -> Option<FieldValue> {
        match (self, value) {
            (DataType::Bool, v @ FieldValue::Bool(_)) => Some(v),
            (DataType::Int, v @ FieldValue::Int(_)) => Some(v),
            (DataType::Float, FieldValue::Int(i)) => Some(FieldValue::Float(i as f64)),
            (DataType::Float, FieldValue::Float(f)) => Some(FieldValue::Float(if f == 0.0 {
                0.0
            } else if f.is_nan() {
                f64::NAN
            } else {
                f
            })),
            (DataType::Text, v @ FieldValue::Text(_)) => Some(v),
            (DataType::Array(elem, len), FieldValue::Array(items)) if items.len() == *len => items
                .into_iter()
                .map(|item| elem.coerce(item))
                .collect::<Option<Vec<_>>>()
                .map(FieldValue::Array),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Bool => f.write_str("bool"),
            DataType::Int => f.write_str("int"),
            DataType::Float => f.write_str("float"),
            DataType::Text => f.write_str("text"),
            DataType::Array(elem, len) => write!(f, "[{elem}; {len}]"),
        }
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            let (elem, len) = inner
                .rsplit_once(';')
                .ok_or_else(|| format!("array dtype missing length: {s}"))?;
            let len = len
                .trim()
                .parse::<usize>()
                .map_err(|_| format!("invalid array length in dtype: {s}"))?;
            return Ok(DataType::Array(Box::new(elem.parse()?), len));
        }
        match s {
            "bool" => Ok(DataType::Bool),
            "int" | "int32" | "int64" => Ok(DataType::Int),
            "float" | "float32" | "float64" | "double" => Ok(DataType::Float),
            "text" | "str" | "string" => Ok(DataType::Text),
            other => Err(format!("unknown dtype: {other}")),
        }
    }
}

impl TryFrom<String> for DataType {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DataType> for String {
    fn from(value: DataType) -> Self {
        value.to_string()
    }
}
