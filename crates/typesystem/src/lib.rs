//! Type system for the metatype engine
//!
//! This crate provides the registry and the conversion machinery:
//! - TypeSystem: single-writer registry publishing immutable catalogs
//! - DataType: primitives, enums, arrays, maps, structs, traits and classes
//! - FieldMapping / Hierarchy: flattened attribute layouts with multiple inheritance
//! - Struct / Referenceable: loose, name-keyed instances
//! - TypedStruct / TypedReferenceable: validated, slot-backed instances
//! - output: deterministic rendering of values
//!
//! ## Example
//!
//! ```
//! use metatype_typesystem::{
//!     AttributeDefinition, ClassDefinition, Multiplicity, Referenceable, TypeBatch,
//!     TypeSystem, TraitDefinition, Value,
//! };
//!
//! let ts = TypeSystem::new();
//! ts.define_types(
//!     TypeBatch::new()
//!         .with(TraitDefinition::new("Audited").attribute(AttributeDefinition::optional("by", "string")))
//!         .with(
//!             ClassDefinition::new("Person")
//!                 .attribute(AttributeDefinition::required("name", "string"))
//!                 .attribute(AttributeDefinition::optional("age", "int")),
//!         ),
//! )
//! .unwrap();
//!
//! let person = ts.get_class_type("Person").unwrap();
//! let typed = person
//!     .convert(
//!         Referenceable::new("Person", &["Audited"]).with("name", "Ada").with("age", "36"),
//!         Multiplicity::REQUIRED,
//!     )
//!     .unwrap();
//! let typed = typed.into_typed_referenceable().unwrap();
//! assert_eq!(typed.get("age").unwrap(), Value::Int(36));
//! assert!(typed.get_trait("Audited").is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod instance;
pub mod output;
pub mod registry;
pub mod types;
pub mod value;

pub use instance::{Referenceable, SlotCounts, SlotKind, Struct, TypedReferenceable, TypedStruct};
pub use registry::{
    ClassDefinition, EnumDefinition, StructDefinition, TraitDefinition, TypeBatch, TypeCatalog,
    TypeDefinition, TypeHandle, TypeSystem,
};
pub use types::{AttributeDefinition, AttributeInfo, DataType, FieldMapping, Hierarchy};
pub use value::{EnumValue, Value};

pub use metatype_core::{
    Error, ErrorKind, Id, IdState, Multiplicity, PrimitiveType, Result, TypeCategory,
    TypeSystemConfig,
};
