//! Core contract types for the metatype engine
//!
//! This crate defines the leaf types shared by every layer:
//! - Error: Error taxonomy with field context frames
//! - Multiplicity: Cardinality and nullability of attributes
//! - Id: Typed identity of class instances
//! - TypeCategory / PrimitiveType: Type discriminators
//! - TypeSystemConfig: `metatype.toml` configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod category;
pub mod config;
pub mod error;
pub mod identity;
pub mod multiplicity;

pub use category::{PrimitiveType, TypeCategory};
pub use config::{TypeSystemConfig, CONFIG_FILE_NAME};
pub use error::{Error, ErrorKind, Result};
pub use identity::{Id, IdState};
pub use multiplicity::{Multiplicity, UNBOUNDED};
