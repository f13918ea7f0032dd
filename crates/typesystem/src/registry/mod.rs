//! Type registry
//!
//! [`TypeSystem`] owns the current [`TypeCatalog`] and is the only place
//! types are added. It follows a single-writer, many-reader discipline:
//!
//! - Readers call [`TypeSystem::snapshot`] (or hold a [`TypeHandle`], which
//!   carries its snapshot) and never block writers while converting.
//! - Writers serialize on a build lock, resolve a whole batch against the
//!   current snapshot, and publish the result with one pointer swap.
//!
//! A conversion in flight therefore never observes a catalog in which a
//! referenced supertype exists but is not yet resolved.
//!
//! ## Example
//!
//! ```
//! use metatype_typesystem::registry::{ClassDefinition, TypeSystem};
//! use metatype_typesystem::types::AttributeDefinition;
//! use metatype_typesystem::{Referenceable, Value};
//! use metatype_core::Multiplicity;
//!
//! let ts = TypeSystem::new();
//! let person = ts
//!     .define_type(
//!         ClassDefinition::new("Person")
//!             .attribute(AttributeDefinition::required("name", "string")),
//!     )
//!     .unwrap();
//!
//! let loose = Referenceable::new("Person", &[]).with("name", "Ada");
//! let typed = person.convert(loose, Multiplicity::REQUIRED).unwrap();
//! assert_eq!(typed.as_typed_referenceable().unwrap().get("name").unwrap(), Value::from("Ada"));
//! ```

mod builder;
mod catalog;
mod definition;

pub use catalog::TypeCatalog;
pub use definition::{
    ClassDefinition, EnumDefinition, StructDefinition, TraitDefinition, TypeBatch, TypeDefinition,
};

use crate::instance::{Struct, TypedReferenceable, TypedStruct};
use crate::types::{array_type_name, map_type_name, DataType, FieldMapping};
use crate::value::Value;
use metatype_core::{Error, Id, Multiplicity, Result, TypeCategory, TypeSystemConfig};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Registry of user-defined types
pub struct TypeSystem {
    current: RwLock<Arc<TypeCatalog>>,
    build_lock: Mutex<()>,
    config: TypeSystemConfig,
}

impl TypeSystem {
    /// Registry with default settings, holding only the primitives
    pub fn new() -> Self {
        Self::from_valid_config(TypeSystemConfig::default())
    }

    /// Registry with explicit settings
    ///
    /// # Errors
    ///
    /// `Config` if the settings are invalid.
    pub fn with_config(config: TypeSystemConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    /// Registry configured from a `metatype.toml` file
    pub fn from_config_file(path: &Path) -> Result<Self> {
        Self::with_config(TypeSystemConfig::from_file(path)?)
    }

    fn from_valid_config(config: TypeSystemConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(TypeCatalog::bootstrap(0, config.clone()))),
            build_lock: Mutex::new(()),
            config,
        }
    }

    /// Settings in effect
    pub fn config(&self) -> &TypeSystemConfig {
        &self.config
    }

    /// Current catalog
    pub fn snapshot(&self) -> Arc<TypeCatalog> {
        Arc::clone(&self.current.read())
    }

    /// Register a batch of definitions atomically.
    ///
    /// Returns the catalog that includes the batch (the current one if every
    /// definition was already registered unchanged).
    ///
    /// # Errors
    ///
    /// - `TypeConflict` for incompatible redefinition or supertype cycles
    /// - `UnknownType` for references to undeclared types
    /// - `AmbiguousAttribute` for incompatible inherited attributes
    ///
    /// On error nothing from the batch becomes visible.
    pub fn define_types(&self, batch: TypeBatch) -> Result<Arc<TypeCatalog>> {
        let _guard = self.build_lock.lock();
        let current = self.snapshot();
        match builder::build(&current, &batch) {
            Ok(Some(next)) => {
                let next = Arc::new(next);
                *self.current.write() = Arc::clone(&next);
                info!(
                    target: "metatype::registry",
                    types = batch.len(),
                    version = next.version(),
                    "Committed type batch"
                );
                Ok(next)
            }
            Ok(None) => {
                debug!(
                    target: "metatype::registry",
                    version = current.version(),
                    "Type batch already registered"
                );
                Ok(current)
            }
            Err(e) => {
                warn!(
                    target: "metatype::registry",
                    types = batch.len(),
                    error = %e,
                    "Rejected type batch"
                );
                Err(e)
            }
        }
    }

    /// Register one definition and return a handle to it
    pub fn define_type(&self, definition: impl Into<TypeDefinition>) -> Result<TypeHandle> {
        let definition = definition.into();
        let name = definition.name().to_string();
        let catalog = self.define_types(TypeBatch::new().with(definition))?;
        TypeHandle::new(catalog, &name)
    }

    /// Register `array<element>`
    pub fn define_array_type(&self, element: &str) -> Result<TypeHandle> {
        self.define_collection(&array_type_name(element))
    }

    /// Register `map<key,value>`
    pub fn define_map_type(&self, key: &str, value: &str) -> Result<TypeHandle> {
        self.define_collection(&map_type_name(key, value))
    }

    fn define_collection(&self, name: &str) -> Result<TypeHandle> {
        let _guard = self.build_lock.lock();
        let current = self.snapshot();
        let (canonical, next) = builder::build_collection(&current, name)?;
        let catalog = match next {
            Some(next) => {
                let next = Arc::new(next);
                *self.current.write() = Arc::clone(&next);
                info!(
                    target: "metatype::registry",
                    name = %canonical,
                    version = next.version(),
                    "Committed collection type"
                );
                next
            }
            None => current,
        };
        TypeHandle::new(catalog, &canonical)
    }

    /// Type of any category
    pub fn get_data_type(&self, name: &str) -> Result<TypeHandle> {
        TypeHandle::new(self.snapshot(), name)
    }

    /// Type that must be of `category`
    ///
    /// # Errors
    ///
    /// `UnknownType` if absent or of another category.
    pub fn get_type(&self, name: &str, category: TypeCategory) -> Result<TypeHandle> {
        let catalog = self.snapshot();
        catalog.get_of(name, category)?;
        TypeHandle::new(catalog, name)
    }

    /// Class type by name
    pub fn get_class_type(&self, name: &str) -> Result<TypeHandle> {
        self.get_type(name, TypeCategory::Class)
    }

    /// Trait type by name
    pub fn get_trait_type(&self, name: &str) -> Result<TypeHandle> {
        self.get_type(name, TypeCategory::Trait)
    }

    /// Struct type by name
    pub fn get_struct_type(&self, name: &str) -> Result<TypeHandle> {
        self.get_type(name, TypeCategory::Struct)
    }

    /// Enum type by name
    pub fn get_enum_type(&self, name: &str) -> Result<TypeHandle> {
        self.get_type(name, TypeCategory::Enum)
    }

    /// Drop every user type, keeping the primitives
    pub fn reset(&self) {
        let _guard = self.build_lock.lock();
        let version = self.current.read().version() + 1;
        *self.current.write() = Arc::new(TypeCatalog::bootstrap(version, self.config.clone()));
        info!(target: "metatype::registry", version, "Registry reset");
    }
}

impl Default for TypeSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let catalog = self.snapshot();
        f.debug_struct("TypeSystem")
            .field("version", &catalog.version())
            .field("types", &catalog.len())
            .finish()
    }
}

/// A registered type together with the catalog it was resolved in
#[derive(Debug, Clone)]
pub struct TypeHandle {
    catalog: Arc<TypeCatalog>,
    data_type: Arc<DataType>,
}

impl TypeHandle {
    fn new(catalog: Arc<TypeCatalog>, name: &str) -> Result<Self> {
        let data_type = catalog
            .get_arc(name)
            .cloned()
            .ok_or_else(|| Error::unknown_type(name))?;
        Ok(Self { catalog, data_type })
    }

    /// Type name
    pub fn name(&self) -> &str {
        self.data_type.name()
    }

    /// Type category
    pub fn category(&self) -> TypeCategory {
        self.data_type.category()
    }

    /// The type itself
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// Catalog snapshot the handle reads from
    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    /// Attribute layout of struct, trait and class types
    pub fn field_mapping(&self) -> Option<&Arc<FieldMapping>> {
        self.data_type.field_mapping()
    }

    /// Whether this type is `name` or one of its descendants
    pub fn is_subtype_of(&self, name: &str) -> bool {
        self.data_type.is_subtype_of(name)
    }

    /// Convert `value` against this type and `multiplicity`
    pub fn convert(&self, value: impl Into<Value>, multiplicity: Multiplicity) -> Result<Value> {
        self.data_type.convert(&self.catalog, value.into(), multiplicity)
    }

    /// Render `value`, which must belong to this type
    pub fn output(&self, value: &Value, buf: &mut String, prefix: &str) -> Result<()> {
        self.data_type.output(value, buf, prefix)
    }

    /// Check an identity against this class
    pub fn validate_id(&self, id: &Id) -> Result<()> {
        match self.data_type.as_ref() {
            DataType::Class(c) => c.validate_id(&self.catalog, id),
            _ => Err(self.not_a("class")),
        }
    }

    /// New class instance with an unassigned id and the named traits
    pub fn create_instance(&self, trait_names: &[&str]) -> Result<TypedReferenceable> {
        self.create_instance_with_id(None, trait_names)
    }

    /// New class instance reusing `id` when given
    pub fn create_instance_with_id(
        &self,
        id: Option<Id>,
        trait_names: &[&str],
    ) -> Result<TypedReferenceable> {
        self.create_instance_with_traits(id, trait_names, &BTreeMap::new())
    }

    /// New class instance whose traits are converted from `supplied` where
    /// present
    pub fn create_instance_with_traits(
        &self,
        id: Option<Id>,
        trait_names: &[&str],
        supplied: &BTreeMap<String, Struct>,
    ) -> Result<TypedReferenceable> {
        match self.data_type.as_ref() {
            DataType::Class(c) => {
                c.create_instance_with_traits(&self.catalog, id, trait_names, supplied)
            }
            _ => Err(self.not_a("class")),
        }
    }

    /// New struct or trait instance with every attribute unset
    pub fn create_struct(&self) -> Result<TypedStruct> {
        match self.data_type.as_ref() {
            DataType::Struct(s) => Ok(s.create_instance(&self.catalog)),
            DataType::Trait(t) => Ok(t.create_instance(&self.catalog)),
            _ => Err(self.not_a("struct or trait")),
        }
    }

    fn not_a(&self, what: &str) -> Error {
        Error::invalid_operation(format!(
            "{} is a {} type, not a {} type",
            self.name(),
            self.category(),
            what
        ))
    }
}
