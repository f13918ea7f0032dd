//! Multiplicity enforcement
//!
//! Every `convert` entry point calls [`enforce`] before looking at the
//! value's shape, and array conversion calls [`enforce_unique`] once the
//! elements are converted (so `"1"` and `1` count as duplicates of an
//! `int` set).

use crate::value::Value;
use metatype_core::{Error, Multiplicity, Result};

/// Outcome of the multiplicity check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Presence {
    /// Null and allowed: convert yields null
    Null,
    /// Non-null: continue with category-specific conversion
    Present,
}

/// Reject null when disallowed and multi-valued input against a
/// single-valued multiplicity; check element counts against the bounds.
pub(crate) fn enforce(target: &str, value: &Value, m: Multiplicity) -> Result<Presence> {
    match value {
        Value::Null => {
            if m.null_allowed() {
                Ok(Presence::Null)
            } else {
                Err(Error::null_not_allowed(m))
            }
        }
        Value::Array(items) => {
            if !m.is_many() {
                return Err(Error::conversion_because(
                    target,
                    value,
                    format!("multi-valued input for single-valued multiplicity {}", m),
                ));
            }
            if !m.admits_count(items.len()) {
                return Err(Error::conversion_because(
                    target,
                    value,
                    format!("{} elements outside bounds of multiplicity {}", items.len(), m),
                ));
            }
            Ok(Presence::Present)
        }
        _ => Ok(Presence::Present),
    }
}

/// Reject duplicate elements when the multiplicity requires uniqueness
pub(crate) fn enforce_unique(target: &str, items: &[Value], m: Multiplicity) -> Result<()> {
    if !m.is_unique {
        return Ok(());
    }
    for (i, item) in items.iter().enumerate() {
        if items[..i].contains(item) {
            return Err(Error::conversion_because(
                target,
                item,
                format!("duplicate element in {}", m),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use metatype_core::ErrorKind;

    #[test]
    fn test_null_handling() {
        assert_eq!(
            enforce("string", &Value::Null, Multiplicity::OPTIONAL).unwrap(),
            Presence::Null
        );
        let err = enforce("string", &Value::Null, Multiplicity::REQUIRED).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NullNotAllowed);
    }

    #[test]
    fn test_array_against_single_valued() {
        let v = Value::Array(vec![Value::Int(1)]);
        let err = enforce("int", &v, Multiplicity::REQUIRED).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueConversion);
        assert_eq!(
            enforce("array<int>", &v, Multiplicity::COLLECTION).unwrap(),
            Presence::Present
        );
    }

    #[test]
    fn test_count_bounds() {
        let m = Multiplicity::new(2, 3, false);
        let one = Value::Array(vec![Value::Int(1)]);
        assert!(enforce("array<int>", &one, m).is_err());
        let two = Value::Array(vec![Value::Int(1), Value::Int(2)]);
        assert!(enforce("array<int>", &two, m).is_ok());
    }

    #[test]
    fn test_uniqueness() {
        let items = vec![Value::Int(1), Value::Int(2), Value::Int(1)];
        assert!(enforce_unique("array<int>", &items, Multiplicity::COLLECTION).is_ok());
        let err = enforce_unique("array<int>", &items, Multiplicity::SET).unwrap_err();
        assert!(err.to_string().contains("duplicate element"));
    }
}
