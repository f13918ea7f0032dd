//! Data types
//!
//! [`DataType`] is a closed set of type categories. Every variant exposes a
//! name, a category, `convert` and `output`; the struct, trait and class
//! variants additionally carry a [`FieldMapping`], and trait and class carry
//! a [`Hierarchy`].
//!
//! ## Module Structure
//!
//! - `attribute`: attribute declarations and resolved schemas
//! - `field_mapping`: flattened slot layout
//! - `hierarchy`: supertype linearization and attribute flattening
//! - `enforce`: multiplicity enforcement
//! - `primitive`, `enum_type`, `collection`: leaf categories
//! - `struct_type`, `trait_type`, `class_type`: composite categories

pub mod attribute;
pub(crate) mod enforce;
pub mod field_mapping;
pub mod hierarchy;

pub mod class_type;
pub mod collection;
pub mod enum_type;
pub(crate) mod primitive;
pub mod struct_type;
pub mod trait_type;

pub use attribute::{AttributeDefinition, AttributeInfo};
pub use class_type::ClassType;
pub use collection::{array_type_name, map_type_name, ArrayType, MapType};
pub use enum_type::EnumType;
pub use field_mapping::FieldMapping;
pub use hierarchy::{Hierarchy, SuperTypePath};
pub use struct_type::StructType;
pub use trait_type::TraitType;

use crate::output;
use crate::registry::TypeCatalog;
use crate::value::Value;
use enforce::Presence;
use metatype_core::{Error, Multiplicity, PrimitiveType, Result, TypeCategory};
use std::fmt;
use std::sync::Arc;

/// State threaded through one (possibly recursive) conversion
#[derive(Clone, Copy)]
pub(crate) struct ConvertCtx<'a> {
    pub catalog: &'a Arc<TypeCatalog>,
    pub depth: usize,
}

impl<'a> ConvertCtx<'a> {
    pub(crate) fn new(catalog: &'a Arc<TypeCatalog>) -> Self {
        Self { catalog, depth: 0 }
    }

    /// Context for the attributes of a composite value
    pub(crate) fn nested(&self) -> Self {
        Self {
            catalog: self.catalog,
            depth: self.depth + 1,
        }
    }

    /// Fail once composite nesting exceeds the configured bound
    pub(crate) fn check_depth(&self, target: &str, value: impl fmt::Display) -> Result<()> {
        let max = self.catalog.config().max_conversion_depth;
        if self.depth >= max {
            return Err(Error::conversion_because(
                target,
                value,
                format!("nesting deeper than {} levels", max),
            ));
        }
        Ok(())
    }
}

/// A registered type
#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    /// Built-in scalar
    Primitive(PrimitiveType),
    /// Enum type
    Enum(EnumType),
    /// `array<E>`
    Array(ArrayType),
    /// `map<K,V>`
    Map(MapType),
    /// Struct type
    Struct(StructType),
    /// Trait type
    Trait(TraitType),
    /// Class type
    Class(ClassType),
}

impl DataType {
    /// Type name
    pub fn name(&self) -> &str {
        match self {
            DataType::Primitive(p) => p.name(),
            DataType::Enum(t) => t.name(),
            DataType::Array(t) => t.name(),
            DataType::Map(t) => t.name(),
            DataType::Struct(t) => t.name(),
            DataType::Trait(t) => t.name(),
            DataType::Class(t) => t.name(),
        }
    }

    /// Type category
    pub fn category(&self) -> TypeCategory {
        match self {
            DataType::Primitive(_) => TypeCategory::Primitive,
            DataType::Enum(_) => TypeCategory::Enum,
            DataType::Array(_) => TypeCategory::Array,
            DataType::Map(_) => TypeCategory::Map,
            DataType::Struct(_) => TypeCategory::Struct,
            DataType::Trait(_) => TypeCategory::Trait,
            DataType::Class(_) => TypeCategory::Class,
        }
    }

    /// Attribute layout of composite types
    pub fn field_mapping(&self) -> Option<&Arc<FieldMapping>> {
        match self {
            DataType::Struct(t) => Some(t.field_mapping()),
            DataType::Trait(t) => Some(t.field_mapping()),
            DataType::Class(t) => Some(t.field_mapping()),
            _ => None,
        }
    }

    /// Ancestry of hierarchical types
    pub fn hierarchy(&self) -> Option<&Hierarchy> {
        match self {
            DataType::Trait(t) => Some(t.hierarchy()),
            DataType::Class(t) => Some(t.hierarchy()),
            _ => None,
        }
    }

    /// Whether this type is `name` or one of its descendants
    pub fn is_subtype_of(&self, name: &str) -> bool {
        match self.hierarchy() {
            Some(h) => h.is_subtype_of(name),
            None => self.name() == name,
        }
    }

    /// Convert `value` against this type and `multiplicity`.
    ///
    /// # Errors
    ///
    /// - `NullNotAllowed` for null against a non-nullable multiplicity
    /// - `ValueConversion` for incompatible shapes or values
    /// - `InvalidIdentity` for class references owned by an unrelated type
    /// - `FieldContext` frames around failures of nested attributes
    pub fn convert(
        &self,
        catalog: &Arc<TypeCatalog>,
        value: Value,
        multiplicity: Multiplicity,
    ) -> Result<Value> {
        self.convert_at(&ConvertCtx::new(catalog), value, multiplicity)
    }

    pub(crate) fn convert_at(
        &self,
        ctx: &ConvertCtx<'_>,
        value: Value,
        multiplicity: Multiplicity,
    ) -> Result<Value> {
        if enforce::enforce(self.name(), &value, multiplicity)? == Presence::Null {
            return Ok(Value::Null);
        }
        match self {
            DataType::Primitive(p) => primitive::convert(*p, value),
            DataType::Enum(t) => t.convert(value),
            DataType::Array(t) => t.convert(ctx, value, multiplicity),
            DataType::Map(t) => t.convert(ctx, value),
            DataType::Struct(t) => t.convert_present(ctx, value, multiplicity),
            DataType::Trait(t) => t.convert_present(ctx, value, multiplicity),
            DataType::Class(t) => t.convert_present(ctx, value, multiplicity),
        }
    }

    /// Render `value` for diagnostics, after checking it belongs to this type.
    pub fn output(&self, value: &Value, buf: &mut String, prefix: &str) -> Result<()> {
        let belongs = match (self, value.instance_type_name()) {
            (_, None) => value.is_null() || self.holds_leaf(value),
            (DataType::Struct(_), Some(name)) => name == self.name(),
            (DataType::Trait(_) | DataType::Class(_), Some(name)) => {
                name == self.name()
                    || typed_catalog(value).map_or(false, |c| c.is_subtype(name, self.name()))
            }
            (_, Some(_)) => false,
        };
        if !belongs {
            return Err(Error::conversion_because(
                self.name(),
                value,
                "value does not belong to this type",
            ));
        }
        output::output(value, buf, prefix);
        Ok(())
    }
}

impl DataType {
    fn holds_leaf(&self, value: &Value) -> bool {
        match (self, value) {
            (DataType::Primitive(p), v) => matches!(
                (p, v),
                (PrimitiveType::Boolean, Value::Bool(_))
                    | (PrimitiveType::Byte, Value::Byte(_))
                    | (PrimitiveType::Short, Value::Short(_))
                    | (PrimitiveType::Int, Value::Int(_))
                    | (PrimitiveType::Long, Value::Long(_))
                    | (PrimitiveType::BigInteger, Value::BigInt(_))
                    | (PrimitiveType::Float, Value::Float(_))
                    | (PrimitiveType::Double, Value::Double(_))
                    | (PrimitiveType::BigDecimal, Value::BigDecimal(_))
                    | (PrimitiveType::Date, Value::Date(_))
                    | (PrimitiveType::String, Value::String(_))
            ),
            (DataType::Enum(t), Value::Enum(e)) => t.from_value(&e.value) == Some(e),
            (DataType::Array(_), Value::Array(_)) => true,
            (DataType::Map(_), Value::Map(_)) => true,
            _ => false,
        }
    }
}

fn typed_catalog(value: &Value) -> Option<&Arc<TypeCatalog>> {
    match value {
        Value::TypedStruct(t) => Some(t.catalog()),
        Value::TypedReferenceable(t) => Some(t.catalog()),
        _ => None,
    }
}
