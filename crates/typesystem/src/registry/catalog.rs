//! Immutable catalog snapshots
//!
//! A [`TypeCatalog`] is one committed version of the registry. It is never
//! mutated after construction: schema changes build a new catalog and swap
//! it in, so any `Arc<TypeCatalog>` a reader holds stays internally
//! consistent for as long as it lives.

use crate::registry::definition::TypeDefinition;
use crate::types::{ClassType, DataType, EnumType, StructType, TraitType};
use metatype_core::{Error, PrimitiveType, Result, TypeCategory, TypeSystemConfig};
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// The eleven primitives, shared by every catalog
static PRIMITIVES: Lazy<Vec<Arc<DataType>>> = Lazy::new(|| {
    PrimitiveType::ALL
        .iter()
        .map(|p| Arc::new(DataType::Primitive(*p)))
        .collect()
});

/// One committed version of the type registry
#[derive(Debug)]
pub struct TypeCatalog {
    version: u64,
    types: FxHashMap<String, Arc<DataType>>,
    definitions: FxHashMap<String, TypeDefinition>,
    config: TypeSystemConfig,
}

impl TypeCatalog {
    /// Catalog holding only the primitives
    pub(crate) fn bootstrap(version: u64, config: TypeSystemConfig) -> Self {
        let types = PRIMITIVES
            .iter()
            .map(|t| (t.name().to_string(), Arc::clone(t)))
            .collect();
        Self {
            version,
            types,
            definitions: FxHashMap::default(),
            config,
        }
    }

    /// Next version: this catalog plus `types` and their definitions
    pub(crate) fn extend(
        &self,
        types: Vec<DataType>,
        definitions: Vec<TypeDefinition>,
    ) -> Self {
        let mut next_types = self.types.clone();
        for t in types {
            next_types.insert(t.name().to_string(), Arc::new(t));
        }
        let mut next_definitions = self.definitions.clone();
        for d in definitions {
            next_definitions.insert(d.name().to_string(), d);
        }
        Self {
            version: self.version + 1,
            types: next_types,
            definitions: next_definitions,
            config: self.config.clone(),
        }
    }

    /// Monotonic version, starting at 0 for the bootstrap catalog
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Settings the catalog was built with
    pub fn config(&self) -> &TypeSystemConfig {
        &self.config
    }

    /// Number of registered types, primitives included
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Always false: primitives are always present
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Type by name
    ///
    /// # Errors
    ///
    /// `UnknownType` if no such type is registered.
    pub fn get(&self, name: &str) -> Result<&DataType> {
        self.types
            .get(name)
            .map(|t| t.as_ref())
            .ok_or_else(|| Error::unknown_type(name))
    }

    pub(crate) fn get_arc(&self, name: &str) -> Option<&Arc<DataType>> {
        self.types.get(name)
    }

    /// Type by name, which must be of `category`
    ///
    /// # Errors
    ///
    /// `UnknownType` if absent or registered under another category.
    pub fn get_of(&self, name: &str, category: TypeCategory) -> Result<&DataType> {
        match self.types.get(name) {
            Some(t) if t.category() == category => Ok(t.as_ref()),
            _ => Err(Error::unknown_type_of(name, category)),
        }
    }

    /// Class type by name
    pub fn class_type(&self, name: &str) -> Result<&ClassType> {
        match self.get_of(name, TypeCategory::Class)? {
            DataType::Class(c) => Ok(c),
            _ => Err(Error::unknown_type_of(name, TypeCategory::Class)),
        }
    }

    /// Trait type by name
    pub fn trait_type(&self, name: &str) -> Result<&TraitType> {
        match self.get_of(name, TypeCategory::Trait)? {
            DataType::Trait(t) => Ok(t),
            _ => Err(Error::unknown_type_of(name, TypeCategory::Trait)),
        }
    }

    /// Struct type by name
    pub fn struct_type(&self, name: &str) -> Result<&StructType> {
        match self.get_of(name, TypeCategory::Struct)? {
            DataType::Struct(s) => Ok(s),
            _ => Err(Error::unknown_type_of(name, TypeCategory::Struct)),
        }
    }

    /// Enum type by name
    pub fn enum_type(&self, name: &str) -> Result<&EnumType> {
        match self.get_of(name, TypeCategory::Enum)? {
            DataType::Enum(e) => Ok(e),
            _ => Err(Error::unknown_type_of(name, TypeCategory::Enum)),
        }
    }

    /// Definition a user type was registered from
    pub fn definition(&self, name: &str) -> Option<&TypeDefinition> {
        self.definitions.get(name)
    }

    /// All type names, sorted
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Names of the types of one category, sorted
    pub fn type_names_of(&self, category: TypeCategory) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .types
            .values()
            .filter(|t| t.category() == category)
            .map(|t| t.name())
            .collect();
        names.sort_unstable();
        names
    }

    /// Proper subtypes of `name`, sorted
    pub fn subtypes_of(&self, name: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .types
            .values()
            .filter(|t| t.name() != name && t.is_subtype_of(name))
            .map(|t| t.name())
            .collect();
        names.sort_unstable();
        names
    }

    /// Whether `sub` is `sup` or a registered descendant of it
    pub fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        sub == sup
            || self
                .types
                .get(sub)
                .map_or(false, |t| t.is_subtype_of(sup))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_has_primitives() {
        let catalog = TypeCatalog::bootstrap(0, TypeSystemConfig::default());
        assert_eq!(catalog.len(), PrimitiveType::ALL.len());
        assert_eq!(catalog.version(), 0);
        for p in PrimitiveType::ALL {
            assert_eq!(catalog.get(p.name()).unwrap().category(), TypeCategory::Primitive);
        }
        assert_eq!(
            catalog.type_names_of(TypeCategory::Primitive).len(),
            PrimitiveType::ALL.len()
        );
    }

    #[test]
    fn test_lookup_errors() {
        let catalog = TypeCatalog::bootstrap(0, TypeSystemConfig::default());
        assert!(matches!(
            catalog.get("Nope"),
            Err(Error::UnknownType { expected: None, .. })
        ));
        assert!(matches!(
            catalog.get_of("string", TypeCategory::Class),
            Err(Error::UnknownType {
                expected: Some(TypeCategory::Class),
                ..
            })
        ));
        assert!(catalog.class_type("string").is_err());
    }

    #[test]
    fn test_primitives_are_shared() {
        let a = TypeCatalog::bootstrap(0, TypeSystemConfig::default());
        let b = TypeCatalog::bootstrap(1, TypeSystemConfig::default());
        assert!(Arc::ptr_eq(
            a.get_arc("int").unwrap(),
            b.get_arc("int").unwrap()
        ));
    }
}
