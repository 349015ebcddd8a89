use crate::{Error, Result};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use std::{any, borrow::Cow, collections::BTreeMap};
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Dynamically typed value carried by bindings, literals and result rows.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    /// A slot with no value at all (a key missing from one of several inserted records).
    /// Compiles to `DEFAULT` in multi-row inserts, rejected anywhere a binding is expected.
    Default,
    Boolean(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Blob(Box<[u8]>),
    Date(Date),
    Time(Time),
    Timestamp(PrimitiveDateTime),
    Uuid(Uuid),
    Json(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
    pub fn is_default(&self) -> bool {
        matches!(self, Value::Default)
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) | Value::Json(v) => Some(v),
            _ => None,
        }
    }
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Boolean(v) => Some(*v as i64),
            Value::Decimal(v) => v.to_i64(),
            _ => None,
        }
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            Value::Int(v) => Some(*v != 0),
            _ => None,
        }
    }
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Default => "default",
            Value::Boolean(..) => "boolean",
            Value::Int(..) => "integer",
            Value::Float(..) => "float",
            Value::Decimal(..) => "decimal",
            Value::Text(..) => "text",
            Value::Blob(..) => "blob",
            Value::Date(..) => "date",
            Value::Time(..) => "time",
            Value::Timestamp(..) => "timestamp",
            Value::Uuid(..) => "uuid",
            Value::Json(..) => "json",
        }
    }
}

/// A single row payload for insert and update statements. Keys are kept sorted so that
/// the column order of the compiled statement does not depend on insertion order.
pub type Record = BTreeMap<String, Value>;

/// Conversion between native Rust types and [`Value`].
pub trait AsValue {
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

fn mismatch<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert a {} value into {}",
        value.kind(),
        any::type_name::<T>()
    ))
}

macro_rules! impl_as_value {
    ($source:ty, $variant:ident, $into:expr, $($pattern:pat => $extract:expr),+ $(,)?) => {
        impl AsValue for $source {
            fn as_value(self) -> Value {
                Value::$variant($into(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $($pattern => $extract,)+
                    v => Err(mismatch::<Self>(&v)),
                }
            }
        }
        impl From<$source> for Value {
            fn from(value: $source) -> Self {
                value.as_value()
            }
        }
    };
}

macro_rules! impl_as_value_integer {
    ($($source:ty),+) => {
        $(impl_as_value!(
            $source,
            Int,
            |v: $source| v as i64,
            Value::Int(v) => <$source>::try_from(v).map_err(|e| {
                Error::new(e).context(format!(
                    "Value {} does not fit into {}",
                    v,
                    any::type_name::<$source>()
                ))
            }),
            Value::Boolean(v) => Ok(v as $source),
        );)+
    };
}

impl_as_value_integer!(i8, i16, i32, i64, u8, u16, u32);
impl_as_value!(
    bool,
    Boolean,
    |v| v,
    Value::Boolean(v) => Ok(v),
    Value::Int(v) => Ok(v != 0),
);
impl_as_value!(
    f64,
    Float,
    |v| v,
    Value::Float(v) => Ok(v),
    Value::Int(v) => Ok(v as f64),
    Value::Decimal(v) => v
        .to_f64()
        .ok_or_else(|| Error::msg(format!("Decimal {} does not fit into f64", v))),
);
impl_as_value!(
    f32,
    Float,
    |v: f32| v as f64,
    Value::Float(v) => Ok(v as f32),
    Value::Int(v) => Ok(v as f32),
);
impl_as_value!(
    Decimal,
    Decimal,
    |v| v,
    Value::Decimal(v) => Ok(v),
    Value::Int(v) => Ok(Decimal::from(v)),
);
impl_as_value!(
    String,
    Text,
    |v| v,
    Value::Text(v) => Ok(v),
    Value::Json(v) => Ok(v),
);
impl_as_value!(
    Box<[u8]>,
    Blob,
    |v| v,
    Value::Blob(v) => Ok(v),
);
impl_as_value!(
    Vec<u8>,
    Blob,
    |v: Vec<u8>| v.into_boxed_slice(),
    Value::Blob(v) => Ok(v.into_vec()),
);
impl_as_value!(
    Date,
    Date,
    |v| v,
    Value::Date(v) => Ok(v),
);
impl_as_value!(
    Time,
    Time,
    |v| v,
    Value::Time(v) => Ok(v),
);
impl_as_value!(
    PrimitiveDateTime,
    Timestamp,
    |v| v,
    Value::Timestamp(v) => Ok(v),
);
impl_as_value!(
    Uuid,
    Uuid,
    |v| v,
    Value::Uuid(v) => Ok(v),
    Value::Text(v) => Uuid::parse_str(&v).map_err(Error::new),
);

impl AsValue for Value {
    fn as_value(self) -> Value {
        self
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => Value::Null,
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            v => T::try_from_value(v).map(Some),
        }
    }
}

impl<T: AsValue> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.into())
    }
}

impl From<Cow<'_, str>> for Value {
    fn from(value: Cow<'_, str>) -> Self {
        Value::Text(value.into_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.into())
    }
}

/// Build a [`Record`] from `key => value` pairs.
///
/// ```rust,ignore
/// let row = record! { "email" => "a@b.c", "age" => 33 };
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::Record::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::Record::new();
        $(record.insert(::std::string::String::from($key), $crate::Value::from($value));)+
        record
    }};
}
