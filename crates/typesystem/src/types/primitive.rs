//! Conversion rules for the built-in primitives
//!
//! Conversions are lossless: integers move between widths only when the
//! value fits, floats become integers only when they have no fractional
//! part, integers become floats only below the mantissa limit, and strings
//! are parsed. Anything else fails with `ValueConversion`.

use crate::value::Value;
use chrono::{DateTime, TimeZone, Utc};
use metatype_core::{Error, PrimitiveType, Result};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Convert a non-null value to the given primitive
pub(crate) fn convert(p: PrimitiveType, value: Value) -> Result<Value> {
    let target = p.name();
    match p {
        PrimitiveType::Boolean => match value {
            Value::Bool(b) => Ok(Value::Bool(b)),
            Value::String(ref s) if s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            Value::String(ref s) if s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            other => Err(Error::conversion(target, other)),
        },
        PrimitiveType::Byte => {
            integral(target, &value, i8::MIN as i128, i8::MAX as i128).map(|v| Value::Byte(v as i8))
        }
        PrimitiveType::Short => integral(target, &value, i16::MIN as i128, i16::MAX as i128)
            .map(|v| Value::Short(v as i16)),
        PrimitiveType::Int => {
            integral(target, &value, i32::MIN as i128, i32::MAX as i128).map(|v| Value::Int(v as i32))
        }
        PrimitiveType::Long => integral(target, &value, i64::MIN as i128, i64::MAX as i128)
            .map(|v| Value::Long(v as i64)),
        PrimitiveType::BigInteger => {
            integral(target, &value, i128::MIN, i128::MAX).map(Value::BigInt)
        }
        PrimitiveType::Float => {
            let v = floating(target, &value, FLOAT_EXACT_INT)?;
            if v.is_finite() && v.abs() > f32::MAX as f64 {
                return Err(Error::conversion_because(target, &value, "out of range"));
            }
            Ok(Value::Float(v as f32))
        }
        PrimitiveType::Double => floating(target, &value, DOUBLE_EXACT_INT).map(Value::Double),
        PrimitiveType::BigDecimal => decimal(target, &value).map(Value::BigDecimal),
        PrimitiveType::Date => date(target, &value).map(Value::Date),
        PrimitiveType::String => match value {
            Value::String(s) => Ok(Value::String(s)),
            Value::Bool(_)
            | Value::Byte(_)
            | Value::Short(_)
            | Value::Int(_)
            | Value::Long(_)
            | Value::Float(_)
            | Value::Double(_)
            | Value::BigInt(_)
            | Value::BigDecimal(_)
            | Value::Date(_)
            | Value::Enum(_) => Ok(Value::String(value.to_string())),
            other => Err(Error::conversion(target, other)),
        },
    }
}

fn integral(target: &str, value: &Value, min: i128, max: i128) -> Result<i128> {
    let wide = match value {
        Value::String(s) => s
            .trim()
            .parse::<i128>()
            .map_err(|e| Error::conversion_because(target, value, e.to_string()))?,
        Value::Float(f) => whole_float(target, value, *f as f64)?,
        Value::Double(f) => whole_float(target, value, *f)?,
        Value::BigDecimal(d) => {
            if !d.fract().is_zero() {
                return Err(Error::conversion_because(target, value, "fractional value"));
            }
            d.to_i128()
                .ok_or_else(|| Error::conversion_because(target, value, "out of range"))?
        }
        other => other
            .as_i128()
            .ok_or_else(|| Error::conversion(target, other))?,
    };
    if wide < min || wide > max {
        return Err(Error::conversion_because(target, value, "out of range"));
    }
    Ok(wide)
}

fn whole_float(target: &str, value: &Value, f: f64) -> Result<i128> {
    if !f.is_finite() || f.fract() != 0.0 {
        return Err(Error::conversion_because(target, value, "not a whole number"));
    }
    if f.abs() >= i128::MAX as f64 {
        return Err(Error::conversion_because(target, value, "out of range"));
    }
    Ok(f as i128)
}

/// Largest integer magnitudes the float types hold exactly
const FLOAT_EXACT_INT: i128 = 1 << f32::MANTISSA_DIGITS;
const DOUBLE_EXACT_INT: i128 = 1 << f64::MANTISSA_DIGITS;

fn floating(target: &str, value: &Value, exact_int: i128) -> Result<f64> {
    match value {
        Value::Float(f) => Ok(*f as f64),
        Value::Double(f) => Ok(*f),
        Value::BigDecimal(d) => d
            .to_f64()
            .ok_or_else(|| Error::conversion_because(target, value, "out of range")),
        Value::String(s) => {
            let f = s
                .trim()
                .parse::<f64>()
                .map_err(|e| Error::conversion_because(target, value, e.to_string()))?;
            if !f.is_finite() {
                return Err(Error::conversion_because(target, value, "not a finite number"));
            }
            Ok(f)
        }
        other => {
            let i = other
                .as_i128()
                .ok_or_else(|| Error::conversion(target, other))?;
            if i.unsigned_abs() > exact_int as u128 {
                return Err(Error::conversion_because(target, value, "not exactly representable"));
            }
            Ok(i as f64)
        }
    }
}

fn decimal(target: &str, value: &Value) -> Result<Decimal> {
    let converted = match value {
        Value::BigDecimal(d) => Some(*d),
        Value::Float(f) => Decimal::from_f32(*f),
        Value::Double(f) => Decimal::from_f64(*f),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        other => match other.as_i128() {
            Some(i) => Decimal::from_i128(i),
            None => return Err(Error::conversion(target, other)),
        },
    };
    converted.ok_or_else(|| Error::conversion_because(target, value, "not representable"))
}

fn date(target: &str, value: &Value) -> Result<DateTime<Utc>> {
    match value {
        Value::Date(d) => Ok(*d),
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|d| d.with_timezone(&Utc))
            .map_err(|e| Error::conversion_because(target, value, e.to_string())),
        Value::Long(millis) => Utc
            .timestamp_millis_opt(*millis)
            .single()
            .ok_or_else(|| Error::conversion_because(target, value, "timestamp out of range")),
        other => Err(Error::conversion(target, other)),
    }
}
