//! Attribute declarations and their resolved schema

use crate::instance::SlotKind;
use crate::value::Value;
use metatype_core::{Error, Multiplicity, Result, TypeCategory};
use std::fmt;

/// Attribute as declared by a caller, before resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDefinition {
    /// Attribute name
    pub name: String,
    /// Declared type name
    pub type_name: String,
    /// Cardinality and nullability
    pub multiplicity: Multiplicity,
    /// Whether a class-typed value is owned (stored in full)
    pub is_composite: bool,
    /// Whether values must be unique across instances
    pub is_unique: bool,
    /// Name of the attribute on the other side of a relation
    pub reverse_attribute_name: Option<String>,
}

impl AttributeDefinition {
    /// Attribute with explicit multiplicity
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        multiplicity: Multiplicity,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            multiplicity,
            is_composite: false,
            is_unique: false,
            reverse_attribute_name: None,
        }
    }

    /// `REQUIRED` attribute
    pub fn required(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, type_name, Multiplicity::REQUIRED)
    }

    /// `OPTIONAL` attribute
    pub fn optional(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, type_name, Multiplicity::OPTIONAL)
    }

    /// `COLLECTION` attribute
    pub fn collection(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, type_name, Multiplicity::COLLECTION)
    }

    /// `SET` attribute
    pub fn set(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, type_name, Multiplicity::SET)
    }

    /// Mark as composite (owning)
    pub fn composite(mut self) -> Self {
        self.is_composite = true;
        self
    }

    /// Mark as unique
    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    /// Set the reverse relation name
    pub fn reverse(mut self, name: impl Into<String>) -> Self {
        self.reverse_attribute_name = Some(name.into());
        self
    }
}

/// Resolved schema of one attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeInfo {
    /// Attribute name as declared
    pub name: String,
    /// Declared type name
    pub type_name: String,
    /// Category of the declared type
    pub category: TypeCategory,
    /// Storage kind in typed instances
    pub slot: SlotKind,
    /// Cardinality and nullability
    pub multiplicity: Multiplicity,
    /// Whether a class-typed value is owned
    pub is_composite: bool,
    /// Whether values must be unique across instances
    pub is_unique: bool,
    /// Name of the attribute on the other side of a relation
    pub reverse_attribute_name: Option<String>,
    /// Type that declared the attribute
    pub declaring_type: String,
    /// Whether the value (or each element) refers to class instances by id only
    pub(crate) reference_only: bool,
}

impl AttributeInfo {
    /// Two inherited occurrences can share a slot only if they agree on
    /// type, multiplicity and ownership.
    pub fn is_compatible(&self, other: &AttributeInfo) -> bool {
        self.type_name == other.type_name
            && self.multiplicity == other.multiplicity
            && self.is_composite == other.is_composite
    }

    /// Qualified name under which a hidden inherited attribute stays visible
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring_type, self.name)
    }

    /// Reduce class-shaped input to its identity when the attribute does not
    /// own the referenced instances.
    ///
    /// # Errors
    ///
    /// A loose struct has no identity to refer to and is rejected.
    pub(crate) fn strip_to_references(&self, value: Value) -> Result<Value> {
        if !self.reference_only {
            return Ok(value);
        }
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|v| self.to_reference(v))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            other => self.to_reference(other),
        }
    }

    fn to_reference(&self, value: Value) -> Result<Value> {
        match value {
            Value::Referenceable(r) => {
                let (id, _, _) = r.into_parts();
                Ok(Value::Id(id))
            }
            Value::TypedReferenceable(t) => Ok(Value::Id(t.id().clone())),
            Value::Struct(s) => Err(Error::conversion_because(
                &self.type_name,
                &s,
                "reference attribute requires an instance with identity",
            )),
            other => Ok(other),
        }
    }
}

impl fmt::Display for AttributeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({}{})",
            self.name,
            self.type_name,
            self.multiplicity,
            if self.is_composite { ", composite" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{Referenceable, Struct};
    use metatype_core::ErrorKind;

    fn info(type_name: &str, multiplicity: Multiplicity, composite: bool) -> AttributeInfo {
        AttributeInfo {
            name: "x".to_string(),
            type_name: type_name.to_string(),
            category: TypeCategory::Primitive,
            slot: SlotKind::String,
            multiplicity,
            is_composite: composite,
            is_unique: false,
            reverse_attribute_name: None,
            declaring_type: "A".to_string(),
            reference_only: false,
        }
    }

    #[test]
    fn test_definition_builders() {
        let def = AttributeDefinition::required("owner", "Person")
            .composite()
            .unique()
            .reverse("owns");
        assert_eq!(def.multiplicity, Multiplicity::REQUIRED);
        assert!(def.is_composite);
        assert!(def.is_unique);
        assert_eq!(def.reverse_attribute_name.as_deref(), Some("owns"));
    }

    #[test]
    fn test_compatibility_ignores_declaring_type() {
        let a = info("string", Multiplicity::REQUIRED, false);
        let mut b = a.clone();
        b.declaring_type = "B".to_string();
        assert!(a.is_compatible(&b));

        assert!(!a.is_compatible(&info("int", Multiplicity::REQUIRED, false)));
        assert!(!a.is_compatible(&info("string", Multiplicity::OPTIONAL, false)));
        assert!(!a.is_compatible(&info("string", Multiplicity::REQUIRED, true)));
    }

    #[test]
    fn test_strip_to_references() {
        let mut attr = info("Person", Multiplicity::OPTIONAL, false);
        attr.reference_only = true;
        let r = Referenceable::new("Person", &[]);
        let id = r.id().clone();

        assert_eq!(
            attr.strip_to_references(Value::from(r.clone())).unwrap(),
            Value::Id(id.clone())
        );
        assert_eq!(
            attr.strip_to_references(Value::Array(vec![Value::from(r)])).unwrap(),
            Value::Array(vec![Value::Id(id)])
        );
        assert_eq!(attr.strip_to_references(Value::Null).unwrap(), Value::Null);

        attr.reference_only = false;
        assert!(matches!(
            attr.strip_to_references(Value::from(Referenceable::new("Person", &[]))),
            Ok(Value::Referenceable(_))
        ));
    }

    #[test]
    fn test_reference_rejects_struct_without_identity() {
        let mut attr = info("Person", Multiplicity::OPTIONAL, false);
        attr.reference_only = true;
        let loose = Struct::new("Person").with("name", "Ada");

        let err = attr.strip_to_references(Value::from(loose.clone())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueConversion);

        let items = vec![Value::from(Referenceable::new("Person", &[])), Value::from(loose.clone())];
        let err = attr.strip_to_references(Value::Array(items)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueConversion);

        // owned attributes take the struct as is
        attr.reference_only = false;
        assert!(attr.strip_to_references(Value::from(loose)).is_ok());
    }

    #[test]
    fn test_qualified_name() {
        assert_eq!(info("string", Multiplicity::REQUIRED, false).qualified_name(), "A.x");
    }
}
