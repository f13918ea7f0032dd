//! Type categories and primitive kinds
//!
//! Every data type in the registry reports exactly one [`TypeCategory`].
//! The seven categories split into leaf categories (primitive, enum, array,
//! map) and hierarchical categories (struct, trait, class) that carry an
//! attribute layout.
//!
//! ## The Eleven Primitives
//!
//! | Primitive | Name | Rust value |
//! |-----------|------|------------|
//! | Boolean | `boolean` | `bool` |
//! | Byte | `byte` | `i8` |
//! | Short | `short` | `i16` |
//! | Int | `int` | `i32` |
//! | Long | `long` | `i64` |
//! | Float | `float` | `f32` |
//! | Double | `double` | `f64` |
//! | BigInteger | `biginteger` | `i128` |
//! | BigDecimal | `bigdecimal` | `rust_decimal::Decimal` |
//! | Date | `date` | `chrono::DateTime<Utc>` |
//! | String | `string` | `String` |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeCategory {
    /// Built-in scalar
    Primitive,
    /// Named set of ordinal values
    Enum,
    /// Homogeneous list
    Array,
    /// Key/value map
    Map,
    /// Attribute bag without identity or inheritance
    Struct,
    /// Mixin attached to class instances
    Trait,
    /// Entity type with identity and inheritance
    Class,
}

impl TypeCategory {
    /// All categories (for iteration)
    pub const ALL: [TypeCategory; 7] = [
        TypeCategory::Primitive,
        TypeCategory::Enum,
        TypeCategory::Array,
        TypeCategory::Map,
        TypeCategory::Struct,
        TypeCategory::Trait,
        TypeCategory::Class,
    ];

    /// Upper-case display name
    pub const fn name(&self) -> &'static str {
        match self {
            TypeCategory::Primitive => "PRIMITIVE",
            TypeCategory::Enum => "ENUM",
            TypeCategory::Array => "ARRAY",
            TypeCategory::Map => "MAP",
            TypeCategory::Struct => "STRUCT",
            TypeCategory::Trait => "TRAIT",
            TypeCategory::Class => "CLASS",
        }
    }

    /// Whether types of this category carry a field mapping
    pub const fn is_composite(&self) -> bool {
        matches!(
            self,
            TypeCategory::Struct | TypeCategory::Trait | TypeCategory::Class
        )
    }

    /// Whether types of this category support inheritance
    pub const fn is_hierarchical(&self) -> bool {
        matches!(self, TypeCategory::Trait | TypeCategory::Class)
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The built-in primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    /// `boolean`
    Boolean,
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
    BigInteger,
    /// `bigdecimal`
    BigDecimal,
    /// `date`
    Date,
    /// `string`
    String,
}

impl PrimitiveType {
    /// All primitive types (for iteration)
    pub const ALL: [PrimitiveType; 11] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
        PrimitiveType::BigInteger,
        PrimitiveType::BigDecimal,
        PrimitiveType::Date,
        PrimitiveType::String,
    ];

    /// Registered type name
    pub const fn name(&self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::BigInteger => "biginteger",
            PrimitiveType::BigDecimal => "bigdecimal",
            PrimitiveType::Date => "date",
            PrimitiveType::String => "string",
        }
    }

    /// Parse from registered type name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }

    /// Whether this primitive holds an integral number
    pub const fn is_integral(&self) -> bool {
        matches!(
            self,
            PrimitiveType::Byte
                | PrimitiveType::Short
                | PrimitiveType::Int
                | PrimitiveType::Long
                | PrimitiveType::BigInteger
        )
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_flags() {
        let composite: Vec<_> = TypeCategory::ALL
            .iter()
            .filter(|c| c.is_composite())
            .collect();
        assert_eq!(composite.len(), 3);
        assert!(TypeCategory::Class.is_hierarchical());
        assert!(TypeCategory::Trait.is_hierarchical());
        assert!(!TypeCategory::Struct.is_hierarchical());
    }

    #[test]
    fn test_primitive_name_roundtrip() {
        for p in PrimitiveType::ALL {
            assert_eq!(PrimitiveType::from_name(p.name()), Some(p));
        }
        assert_eq!(PrimitiveType::from_name("varchar"), None);
    }

    #[test]
    fn test_primitive_integral() {
        assert!(PrimitiveType::Long.is_integral());
        assert!(PrimitiveType::BigInteger.is_integral());
        assert!(!PrimitiveType::Double.is_integral());
        assert!(!PrimitiveType::String.is_integral());
    }
}
