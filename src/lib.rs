//! Metatype - Metadata type engine
//!
//! Metatype lets a metadata catalog declare its own schema at runtime:
//! enums, structs, traits and classes with multiple inheritance, and then
//! validates and normalizes loose attribute bags into typed instances.
//!
//! # Quick Start
//!
//! ```
//! use metatype::{AttributeDefinition, ClassDefinition, Multiplicity, Referenceable, TypeSystem};
//!
//! let ts = TypeSystem::new();
//! let table = ts
//!     .define_type(
//!         ClassDefinition::new("Table")
//!             .attribute(AttributeDefinition::required("name", "string"))
//!             .attribute(AttributeDefinition::optional("rows", "long")),
//!     )
//!     .unwrap();
//!
//! let typed = table
//!     .convert(
//!         Referenceable::new("Table", &[]).with("name", "orders").with("rows", "42"),
//!         Multiplicity::REQUIRED,
//!     )
//!     .unwrap();
//! println!("{}", typed.as_typed_referenceable().unwrap());
//! ```
//!
//! # Architecture
//!
//! Contract types (errors, multiplicity, identity, configuration) live in
//! `metatype-core`; the registry, the data types and the instances live in
//! `metatype-typesystem`. This crate re-exports both.

pub use metatype_core::{CONFIG_FILE_NAME, UNBOUNDED};
pub use metatype_typesystem::*;
