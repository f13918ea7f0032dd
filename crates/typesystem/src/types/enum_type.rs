//! Enum types

use crate::value::{EnumValue, Value};
use metatype_core::{Error, Result};
use rustc_hash::FxHashMap;

/// Named set of ordinal values
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    name: String,
    values: Vec<EnumValue>,
    by_name: FxHashMap<String, usize>,
    by_ordinal: FxHashMap<i32, usize>,
}

impl EnumType {
    /// Build an enum type, rejecting duplicate names or ordinals
    pub fn new(name: impl Into<String>, values: Vec<EnumValue>) -> Result<Self> {
        let name = name.into();
        let mut by_name = FxHashMap::default();
        let mut by_ordinal = FxHashMap::default();
        for (i, v) in values.iter().enumerate() {
            if by_name.insert(v.value.clone(), i).is_some() {
                return Err(Error::conflict(
                    &name,
                    format!("duplicate enum value '{}'", v.value),
                ));
            }
            if by_ordinal.insert(v.ordinal, i).is_some() {
                return Err(Error::conflict(
                    &name,
                    format!("duplicate enum ordinal {}", v.ordinal),
                ));
            }
        }
        Ok(Self {
            name,
            values,
            by_name,
            by_ordinal,
        })
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared values in declaration order
    pub fn values(&self) -> &[EnumValue] {
        &self.values
    }

    /// Value by symbolic name
    pub fn from_value(&self, value: &str) -> Option<&EnumValue> {
        self.by_name.get(value).map(|&i| &self.values[i])
    }

    /// Value by ordinal
    pub fn from_ordinal(&self, ordinal: i32) -> Option<&EnumValue> {
        self.by_ordinal.get(&ordinal).map(|&i| &self.values[i])
    }

    /// Convert a non-null value: an `EnumValue` of this enum, its name, or its ordinal
    pub(crate) fn convert(&self, value: Value) -> Result<Value> {
        let found = match &value {
            Value::Enum(e) => self.from_value(&e.value).filter(|v| v.ordinal == e.ordinal),
            Value::String(s) => self.from_value(s),
            other => other
                .as_i128()
                .and_then(|i| i32::try_from(i).ok())
                .and_then(|i| self.from_ordinal(i)),
        };
        found
            .cloned()
            .map(Value::Enum)
            .ok_or_else(|| Error::conversion(&self.name, &value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors() -> EnumType {
        EnumType::new(
            "Color",
            vec![EnumValue::new("RED", 1), EnumValue::new("GREEN", 2)],
        )
        .unwrap()
    }

    #[test]
    fn test_convert_by_name_ordinal_and_value() {
        let e = colors();
        let green = Value::Enum(EnumValue::new("GREEN", 2));
        assert_eq!(e.convert(Value::from("GREEN")).unwrap(), green);
        assert_eq!(e.convert(Value::Int(2)).unwrap(), green);
        assert_eq!(e.convert(green.clone()).unwrap(), green);
    }

    #[test]
    fn test_convert_rejects_unknown() {
        let e = colors();
        assert!(e.convert(Value::from("BLUE")).is_err());
        assert!(e.convert(Value::Int(9)).is_err());
        // right name, wrong ordinal
        assert!(e.convert(Value::Enum(EnumValue::new("RED", 2))).is_err());
    }

    #[test]
    fn test_duplicates_rejected() {
        let err = EnumType::new("E", vec![EnumValue::new("A", 1), EnumValue::new("A", 2)]);
        assert!(matches!(err, Err(Error::TypeConflict { .. })));
        let err = EnumType::new("E", vec![EnumValue::new("A", 1), EnumValue::new("B", 1)]);
        assert!(matches!(err, Err(Error::TypeConflict { .. })));
    }
}
