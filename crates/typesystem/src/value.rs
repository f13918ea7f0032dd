//! Value model shared by loose and typed instances
//!
//! A [`Value`] is what flows into `convert` and out of typed getters. Loose
//! input (attribute bags from the wire layer) uses the `Struct` and
//! `Referenceable` variants; conversion produces `TypedStruct` and
//! `TypedReferenceable` variants bound to a field mapping.
//!
//! ## Equality
//!
//! Different variants are never equal, even when they hold the "same"
//! number: `Int(1) != Long(1)`. Conversion is the only place where widths
//! are reconciled.

use crate::instance::{Referenceable, Struct, TypedReferenceable, TypedStruct};
use chrono::{DateTime, SecondsFormat, Utc};
use metatype_core::Id;
use rust_decimal::Decimal;
use std::fmt;

/// One value of an enum type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    /// Symbolic name
    pub value: String,
    /// Ordinal
    pub ordinal: i32,
}

impl EnumValue {
    /// Create an enum value
    pub fn new(value: impl Into<String>, ordinal: i32) -> Self {
        Self {
            value: value.into(),
            ordinal,
        }
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Any value the type system can convert, store or render
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value
    Null,
    /// `boolean`
    Bool(bool),
    /// `byte`
    Byte(i8),
    /// `short`
    Short(i16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// `biginteger`
    BigInt(i128),
    /// `bigdecimal`
    BigDecimal(Decimal),
    /// `date`
    Date(DateTime<Utc>),
    /// `string`
    String(String),
    /// Value of an enum type
    Enum(EnumValue),
    /// List of values
    Array(Vec<Value>),
    /// Key/value pairs in insertion order
    Map(Vec<(Value, Value)>),
    /// Loose attribute bag
    Struct(Struct),
    /// Loose attribute bag with identity and traits
    Referenceable(Referenceable),
    /// Reference to a class instance
    Id(Id),
    /// Struct or trait instance bound to a field mapping
    TypedStruct(TypedStruct),
    /// Class instance bound to a field mapping
    TypedReferenceable(TypedReferenceable),
}

impl Value {
    /// Variant name, for diagnostics
    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Byte(_) => "Byte",
            Value::Short(_) => "Short",
            Value::Int(_) => "Int",
            Value::Long(_) => "Long",
            Value::Float(_) => "Float",
            Value::Double(_) => "Double",
            Value::BigInt(_) => "BigInt",
            Value::BigDecimal(_) => "BigDecimal",
            Value::Date(_) => "Date",
            Value::String(_) => "String",
            Value::Enum(_) => "Enum",
            Value::Array(_) => "Array",
            Value::Map(_) => "Map",
            Value::Struct(_) => "Struct",
            Value::Referenceable(_) => "Referenceable",
            Value::Id(_) => "Id",
            Value::TypedStruct(_) => "TypedStruct",
            Value::TypedReferenceable(_) => "TypedReferenceable",
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Declared type name carried by instance-shaped values
    pub fn instance_type_name(&self) -> Option<&str> {
        match self {
            Value::Struct(s) => Some(s.type_name()),
            Value::Referenceable(r) => Some(r.type_name()),
            Value::Id(id) => Some(id.type_name()),
            Value::TypedStruct(t) => Some(t.type_name()),
            Value::TypedReferenceable(t) => Some(t.type_name()),
            _ => None,
        }
    }

    /// Identity carried by class-shaped values
    pub fn id(&self) -> Option<&Id> {
        match self {
            Value::Referenceable(r) => Some(r.id()),
            Value::Id(id) => Some(id),
            Value::TypedReferenceable(t) => Some(t.id()),
            _ => None,
        }
    }

    /// Get as &str if this is a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as &[Value] if this is an Array value
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Get as typed struct if this is a TypedStruct value
    pub fn as_typed_struct(&self) -> Option<&TypedStruct> {
        match self {
            Value::TypedStruct(t) => Some(t),
            _ => None,
        }
    }

    /// Get as typed referenceable if this is a TypedReferenceable value
    pub fn as_typed_referenceable(&self) -> Option<&TypedReferenceable> {
        match self {
            Value::TypedReferenceable(t) => Some(t),
            _ => None,
        }
    }

    /// Take the typed struct out of this value
    pub fn into_typed_struct(self) -> Option<TypedStruct> {
        match self {
            Value::TypedStruct(t) => Some(t),
            _ => None,
        }
    }

    /// Take the typed referenceable out of this value
    pub fn into_typed_referenceable(self) -> Option<TypedReferenceable> {
        match self {
            Value::TypedReferenceable(t) => Some(t),
            _ => None,
        }
    }

    /// Integral payload widened to i128
    pub(crate) fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Byte(v) => Some(*v as i128),
            Value::Short(v) => Some(*v as i128),
            Value::Int(v) => Some(*v as i128),
            Value::Long(v) => Some(*v as i128),
            Value::BigInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Replace typed instances by their loose equivalents, recursively
    pub fn into_loose(self) -> Value {
        match self {
            Value::TypedStruct(t) => Value::Struct(t.to_loose()),
            Value::TypedReferenceable(t) => Value::Referenceable(t.to_loose()),
            Value::Array(items) => Value::Array(items.into_iter().map(Value::into_loose).collect()),
            Value::Map(pairs) => Value::Map(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into_loose(), v.into_loose()))
                    .collect(),
            ),
            other => other,
        }
    }
}

// ============================================================================
// From implementations for ergonomic API usage
// ============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i8> for Value {
    fn from(i: i8) -> Self {
        Value::Byte(i)
    }
}

impl From<i16> for Value {
    fn from(i: i16) -> Self {
        Value::Short(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Long(i)
    }
}

impl From<i128> for Value {
    fn from(i: i128) -> Self {
        Value::BigInt(i)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Double(f)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::BigDecimal(d)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

impl From<EnumValue> for Value {
    fn from(e: EnumValue) -> Self {
        Value::Enum(e)
    }
}

impl From<Id> for Value {
    fn from(id: Id) -> Self {
        Value::Id(id)
    }
}

impl From<Struct> for Value {
    fn from(s: Struct) -> Self {
        Value::Struct(s)
    }
}

impl From<Referenceable> for Value {
    fn from(r: Referenceable) -> Self {
        Value::Referenceable(r)
    }
}

impl From<TypedStruct> for Value {
    fn from(t: TypedStruct) -> Self {
        Value::TypedStruct(t)
    }
}

impl From<TypedReferenceable> for Value {
    fn from(t: TypedReferenceable) -> Self {
        Value::TypedReferenceable(t)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

/// Single-line rendering used in error messages
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "<null>"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Short(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::BigInt(v) => write!(f, "{}", v),
            Value::BigDecimal(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "{}", v.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Value::String(v) => write!(f, "{}", v),
            Value::Enum(v) => write!(f, "{}", v),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Struct(s) => write!(f, "{}", s),
            Value::Referenceable(r) => write!(f, "{}", r),
            Value::Id(id) => write!(f, "{}", id),
            Value::TypedStruct(t) => write!(f, "{}{{..}}", t.type_name()),
            Value::TypedReferenceable(t) => write!(f, "{}{{id={}, ..}}", t.type_name(), t.id()),
        }
    }
}
