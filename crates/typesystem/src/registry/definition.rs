//! Type declarations as submitted to the registry
//!
//! Definitions are plain data. Registering a definition that is equal to
//! one already committed is a no-op; the registry compares them with `==`.

use crate::types::AttributeDefinition;
use crate::value::EnumValue;
use metatype_core::TypeCategory;

/// Enum declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDefinition {
    /// Type name
    pub name: String,
    /// Values in declaration order
    pub values: Vec<EnumValue>,
}

impl EnumDefinition {
    /// Enum without values
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    /// Add a value
    pub fn value(mut self, value: impl Into<String>, ordinal: i32) -> Self {
        self.values.push(EnumValue::new(value, ordinal));
        self
    }
}

/// Struct declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDefinition {
    /// Type name
    pub name: String,
    /// Attributes in declaration order
    pub attributes: Vec<AttributeDefinition>,
}

impl StructDefinition {
    /// Struct without attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Add an attribute
    pub fn attribute(mut self, attribute: AttributeDefinition) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// Trait declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitDefinition {
    /// Type name
    pub name: String,
    /// Direct supertraits, in precedence order
    pub super_types: Vec<String>,
    /// Own attributes in declaration order
    pub attributes: Vec<AttributeDefinition>,
}

impl TraitDefinition {
    /// Trait without supertypes or attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_types: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Add a direct supertrait
    pub fn super_type(mut self, name: impl Into<String>) -> Self {
        self.super_types.push(name.into());
        self
    }

    /// Add an attribute
    pub fn attribute(mut self, attribute: AttributeDefinition) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// Class declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDefinition {
    /// Type name
    pub name: String,
    /// Direct superclasses, in precedence order
    pub super_types: Vec<String>,
    /// Own attributes in declaration order
    pub attributes: Vec<AttributeDefinition>,
}

impl ClassDefinition {
    /// Class without supertypes or attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_types: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Add a direct superclass
    pub fn super_type(mut self, name: impl Into<String>) -> Self {
        self.super_types.push(name.into());
        self
    }

    /// Add an attribute
    pub fn attribute(mut self, attribute: AttributeDefinition) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// Any user-declarable type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDefinition {
    /// Enum
    Enum(EnumDefinition),
    /// Struct
    Struct(StructDefinition),
    /// Trait
    Trait(TraitDefinition),
    /// Class
    Class(ClassDefinition),
}

impl TypeDefinition {
    /// Declared type name
    pub fn name(&self) -> &str {
        match self {
            TypeDefinition::Enum(d) => &d.name,
            TypeDefinition::Struct(d) => &d.name,
            TypeDefinition::Trait(d) => &d.name,
            TypeDefinition::Class(d) => &d.name,
        }
    }

    /// Category the definition produces
    pub fn category(&self) -> TypeCategory {
        match self {
            TypeDefinition::Enum(_) => TypeCategory::Enum,
            TypeDefinition::Struct(_) => TypeCategory::Struct,
            TypeDefinition::Trait(_) => TypeCategory::Trait,
            TypeDefinition::Class(_) => TypeCategory::Class,
        }
    }

    /// Direct supertypes (empty for enums and structs)
    pub fn super_types(&self) -> &[String] {
        match self {
            TypeDefinition::Trait(d) => &d.super_types,
            TypeDefinition::Class(d) => &d.super_types,
            _ => &[],
        }
    }

    /// Own attributes (empty for enums)
    pub fn attributes(&self) -> &[AttributeDefinition] {
        match self {
            TypeDefinition::Struct(d) => &d.attributes,
            TypeDefinition::Trait(d) => &d.attributes,
            TypeDefinition::Class(d) => &d.attributes,
            TypeDefinition::Enum(_) => &[],
        }
    }
}

impl From<EnumDefinition> for TypeDefinition {
    fn from(d: EnumDefinition) -> Self {
        TypeDefinition::Enum(d)
    }
}

impl From<StructDefinition> for TypeDefinition {
    fn from(d: StructDefinition) -> Self {
        TypeDefinition::Struct(d)
    }
}

impl From<TraitDefinition> for TypeDefinition {
    fn from(d: TraitDefinition) -> Self {
        TypeDefinition::Trait(d)
    }
}

impl From<ClassDefinition> for TypeDefinition {
    fn from(d: ClassDefinition) -> Self {
        TypeDefinition::Class(d)
    }
}

/// Set of definitions registered together
///
/// Types in one batch may refer to each other in any order, including
/// mutually recursive attribute references. The batch commits as a whole
/// or not at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeBatch {
    definitions: Vec<TypeDefinition>,
}

impl TypeBatch {
    /// Empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition
    pub fn with(mut self, definition: impl Into<TypeDefinition>) -> Self {
        self.definitions.push(definition.into());
        self
    }

    /// Add a definition in place
    pub fn push(&mut self, definition: impl Into<TypeDefinition>) {
        self.definitions.push(definition.into());
    }

    /// Definitions in submission order
    pub fn definitions(&self) -> &[TypeDefinition] {
        &self.definitions
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl<D: Into<TypeDefinition>> FromIterator<D> for TypeBatch {
    fn from_iter<I: IntoIterator<Item = D>>(iter: I) -> Self {
        Self {
            definitions: iter.into_iter().map(Into::into).collect(),
        }
    }
}
