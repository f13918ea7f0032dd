//! Positional slot storage for typed instances
//!
//! Each attribute of a field mapping is assigned a storage kind and a
//! position within that kind's array. A typed instance allocates one array
//! per kind, sized from the mapping's [`SlotCounts`], so reads and writes are
//! O(1) index operations with no per-attribute boxing.

use crate::instance::{TypedReferenceable, TypedStruct};
use crate::value::{EnumValue, Value};
use chrono::{DateTime, Utc};
use metatype_core::{Error, Id, PrimitiveType, Result};
use rust_decimal::Decimal;

/// Storage kind of one attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// `boolean`
    Bool,
    /// `byte`
    Byte,
    /// `short`
    Short,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `biginteger`
    BigInt,
    /// `bigdecimal`
    BigDecimal,
    /// `date`
    Date,
    /// `string`
    String,
    /// Enum value
    Enum,
    /// Array value
    Array,
    /// Map value
    Map,
    /// Nested struct or trait instance
    Struct,
    /// Owned (composite) class instance
    Referenceable,
    /// Weak reference to a class instance
    Id,
}

impl SlotKind {
    /// Storage kind of a primitive
    pub fn for_primitive(p: PrimitiveType) -> Self {
        match p {
            PrimitiveType::Boolean => SlotKind::Bool,
            PrimitiveType::Byte => SlotKind::Byte,
            PrimitiveType::Short => SlotKind::Short,
            PrimitiveType::Int => SlotKind::Int,
            PrimitiveType::Long => SlotKind::Long,
            PrimitiveType::Float => SlotKind::Float,
            PrimitiveType::Double => SlotKind::Double,
            PrimitiveType::BigInteger => SlotKind::BigInt,
            PrimitiveType::BigDecimal => SlotKind::BigDecimal,
            PrimitiveType::Date => SlotKind::Date,
            PrimitiveType::String => SlotKind::String,
        }
    }
}

/// Number of slots of each kind in a field mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotCounts {
    /// `boolean` slots
    pub bools: usize,
    /// `byte` slots
    pub bytes: usize,
    /// `short` slots
    pub shorts: usize,
    /// `int` slots
    pub ints: usize,
    /// `long` slots
    pub longs: usize,
    /// `float` slots
    pub floats: usize,
    /// `double` slots
    pub doubles: usize,
    /// `biginteger` slots
    pub big_ints: usize,
    /// `bigdecimal` slots
    pub big_decimals: usize,
    /// `date` slots
    pub dates: usize,
    /// `string` slots
    pub strings: usize,
    /// Enum slots
    pub enums: usize,
    /// Array slots
    pub arrays: usize,
    /// Map slots
    pub maps: usize,
    /// Nested struct/trait slots
    pub structs: usize,
    /// Composite class slots
    pub referenceables: usize,
    /// Class reference slots
    pub ids: usize,
}

impl SlotCounts {
    /// Reserve the next position of `kind`
    pub(crate) fn allocate(&mut self, kind: SlotKind) -> usize {
        let counter = match kind {
            SlotKind::Bool => &mut self.bools,
            SlotKind::Byte => &mut self.bytes,
            SlotKind::Short => &mut self.shorts,
            SlotKind::Int => &mut self.ints,
            SlotKind::Long => &mut self.longs,
            SlotKind::Float => &mut self.floats,
            SlotKind::Double => &mut self.doubles,
            SlotKind::BigInt => &mut self.big_ints,
            SlotKind::BigDecimal => &mut self.big_decimals,
            SlotKind::Date => &mut self.dates,
            SlotKind::String => &mut self.strings,
            SlotKind::Enum => &mut self.enums,
            SlotKind::Array => &mut self.arrays,
            SlotKind::Map => &mut self.maps,
            SlotKind::Struct => &mut self.structs,
            SlotKind::Referenceable => &mut self.referenceables,
            SlotKind::Id => &mut self.ids,
        };
        let position = *counter;
        *counter += 1;
        position
    }

    /// Total number of slots across all kinds
    pub fn total(&self) -> usize {
        self.bools
            + self.bytes
            + self.shorts
            + self.ints
            + self.longs
            + self.floats
            + self.doubles
            + self.big_ints
            + self.big_decimals
            + self.dates
            + self.strings
            + self.enums
            + self.arrays
            + self.maps
            + self.structs
            + self.referenceables
            + self.ids
    }
}

/// Per-kind value arrays of one typed instance
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Slots {
    bools: Vec<bool>,
    bytes: Vec<i8>,
    shorts: Vec<i16>,
    ints: Vec<i32>,
    longs: Vec<i64>,
    floats: Vec<f32>,
    doubles: Vec<f64>,
    big_ints: Vec<i128>,
    big_decimals: Vec<Decimal>,
    dates: Vec<Option<DateTime<Utc>>>,
    strings: Vec<Option<String>>,
    enums: Vec<Option<EnumValue>>,
    arrays: Vec<Option<Vec<Value>>>,
    maps: Vec<Option<Vec<(Value, Value)>>>,
    structs: Vec<Option<TypedStruct>>,
    referenceables: Vec<Option<TypedReferenceable>>,
    ids: Vec<Option<Id>>,
}

impl Slots {
    pub(crate) fn new(counts: &SlotCounts) -> Self {
        Self {
            bools: vec![false; counts.bools],
            bytes: vec![0; counts.bytes],
            shorts: vec![0; counts.shorts],
            ints: vec![0; counts.ints],
            longs: vec![0; counts.longs],
            floats: vec![0.0; counts.floats],
            doubles: vec![0.0; counts.doubles],
            big_ints: vec![0; counts.big_ints],
            big_decimals: vec![Decimal::ZERO; counts.big_decimals],
            dates: vec![None; counts.dates],
            strings: vec![None; counts.strings],
            enums: vec![None; counts.enums],
            arrays: vec![None; counts.arrays],
            maps: vec![None; counts.maps],
            structs: vec![None; counts.structs],
            referenceables: vec![None; counts.referenceables],
            ids: vec![None; counts.ids],
        }
    }

    /// Store an already converted, non-null value
    pub(crate) fn store(&mut self, kind: SlotKind, pos: usize, value: Value) -> Result<()> {
        match (kind, value) {
            (SlotKind::Bool, Value::Bool(v)) => self.bools[pos] = v,
            (SlotKind::Byte, Value::Byte(v)) => self.bytes[pos] = v,
            (SlotKind::Short, Value::Short(v)) => self.shorts[pos] = v,
            (SlotKind::Int, Value::Int(v)) => self.ints[pos] = v,
            (SlotKind::Long, Value::Long(v)) => self.longs[pos] = v,
            (SlotKind::Float, Value::Float(v)) => self.floats[pos] = v,
            (SlotKind::Double, Value::Double(v)) => self.doubles[pos] = v,
            (SlotKind::BigInt, Value::BigInt(v)) => self.big_ints[pos] = v,
            (SlotKind::BigDecimal, Value::BigDecimal(v)) => self.big_decimals[pos] = v,
            (SlotKind::Date, Value::Date(v)) => self.dates[pos] = Some(v),
            (SlotKind::String, Value::String(v)) => self.strings[pos] = Some(v),
            (SlotKind::Enum, Value::Enum(v)) => self.enums[pos] = Some(v),
            (SlotKind::Array, Value::Array(v)) => self.arrays[pos] = Some(v),
            (SlotKind::Map, Value::Map(v)) => self.maps[pos] = Some(v),
            (SlotKind::Struct, Value::TypedStruct(v)) => self.structs[pos] = Some(v),
            (SlotKind::Referenceable, Value::TypedReferenceable(v)) => {
                self.referenceables[pos] = Some(v)
            }
            (SlotKind::Id, Value::Id(v)) => self.ids[pos] = Some(v),
            (SlotKind::Id, Value::TypedReferenceable(v)) => self.ids[pos] = Some(v.id().clone()),
            (kind, other) => {
                return Err(Error::invalid_operation(format!(
                    "{} value cannot be stored in a {:?} slot",
                    other.variant_name(),
                    kind
                )))
            }
        }
        Ok(())
    }

    /// Reset a slot to its empty state
    pub(crate) fn clear(&mut self, kind: SlotKind, pos: usize) {
        match kind {
            SlotKind::Bool => self.bools[pos] = false,
            SlotKind::Byte => self.bytes[pos] = 0,
            SlotKind::Short => self.shorts[pos] = 0,
            SlotKind::Int => self.ints[pos] = 0,
            SlotKind::Long => self.longs[pos] = 0,
            SlotKind::Float => self.floats[pos] = 0.0,
            SlotKind::Double => self.doubles[pos] = 0.0,
            SlotKind::BigInt => self.big_ints[pos] = 0,
            SlotKind::BigDecimal => self.big_decimals[pos] = Decimal::ZERO,
            SlotKind::Date => self.dates[pos] = None,
            SlotKind::String => self.strings[pos] = None,
            SlotKind::Enum => self.enums[pos] = None,
            SlotKind::Array => self.arrays[pos] = None,
            SlotKind::Map => self.maps[pos] = None,
            SlotKind::Struct => self.structs[pos] = None,
            SlotKind::Referenceable => self.referenceables[pos] = None,
            SlotKind::Id => self.ids[pos] = None,
        }
    }

    /// Read a slot as a value
    pub(crate) fn load(&self, kind: SlotKind, pos: usize) -> Value {
        match kind {
            SlotKind::Bool => Value::Bool(self.bools[pos]),
            SlotKind::Byte => Value::Byte(self.bytes[pos]),
            SlotKind::Short => Value::Short(self.shorts[pos]),
            SlotKind::Int => Value::Int(self.ints[pos]),
            SlotKind::Long => Value::Long(self.longs[pos]),
            SlotKind::Float => Value::Float(self.floats[pos]),
            SlotKind::Double => Value::Double(self.doubles[pos]),
            SlotKind::BigInt => Value::BigInt(self.big_ints[pos]),
            SlotKind::BigDecimal => Value::BigDecimal(self.big_decimals[pos]),
            SlotKind::Date => self.dates[pos].map_or(Value::Null, Value::Date),
            SlotKind::String => self.strings[pos].clone().map_or(Value::Null, Value::String),
            SlotKind::Enum => self.enums[pos].clone().map_or(Value::Null, Value::Enum),
            SlotKind::Array => self.arrays[pos].clone().map_or(Value::Null, Value::Array),
            SlotKind::Map => self.maps[pos].clone().map_or(Value::Null, Value::Map),
            SlotKind::Struct => self.structs[pos]
                .clone()
                .map_or(Value::Null, Value::TypedStruct),
            SlotKind::Referenceable => self.referenceables[pos]
                .clone()
                .map_or(Value::Null, Value::TypedReferenceable),
            SlotKind::Id => self.ids[pos].clone().map_or(Value::Null, Value::Id),
        }
    }

    /// Borrow a nested struct slot
    pub(crate) fn struct_at(&self, pos: usize) -> Option<&TypedStruct> {
        self.structs[pos].as_ref()
    }

    /// Borrow a composite class slot
    pub(crate) fn referenceable_at(&self, pos: usize) -> Option<&TypedReferenceable> {
        self.referenceables[pos].as_ref()
    }
}
