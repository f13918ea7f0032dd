//! Error types for the metatype engine
//!
//! This module defines the error taxonomy shared by the registry and the
//! conversion engine. We use `thiserror` for automatic `Display` and `Error`
//! trait implementations.
//!
//! ## Field context frames
//!
//! Conversion of a nested attribute never swallows the inner failure. Each
//! enclosing type wraps it in an [`Error::FieldContext`] frame, so a failure
//! three levels deep reads as a chain:
//!
//! ```text
//! FieldContext(Person.address)
//!   -> FieldContext(Address.city)
//!     -> NullNotAllowed
//! ```
//!
//! [`Error::root_cause`] returns the leaf and [`Error::attribute_path`] the
//! frames outermost-first.

use crate::category::TypeCategory;
use crate::multiplicity::Multiplicity;
use std::fmt;
use thiserror::Error;

/// Result type alias for metatype operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the metatype engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Lookup of an undeclared type name, or a category mismatch
    #[error("Unknown type '{name}'{}", expected_suffix(.expected))]
    UnknownType {
        /// Requested type name
        name: String,
        /// Category the caller asked for, if any
        expected: Option<TypeCategory>,
    },

    /// Incompatible redefinition, or an unresolvable (cyclic) declaration
    #[error("Type conflict for '{name}': {reason}")]
    TypeConflict {
        /// Type being defined
        name: String,
        /// What went wrong
        reason: String,
    },

    /// Two supertype branches contribute the same attribute with different schemas
    #[error(
        "Ambiguous attribute '{attribute}' in type '{type_name}': inherited from '{first}' and '{second}' with incompatible definitions"
    )]
    AmbiguousAttribute {
        /// Type being built
        type_name: String,
        /// Attribute name
        attribute: String,
        /// Supertype contributing the first definition
        first: String,
        /// Supertype contributing the conflicting definition
        second: String,
    },

    /// Null value against a multiplicity that forbids it
    #[error("Null value not allowed for multiplicity {multiplicity}")]
    NullNotAllowed {
        /// The multiplicity that was violated
        multiplicity: Multiplicity,
    },

    /// Input shape or type incompatible with the target type
    #[error("Cannot convert value '{value}' to datatype {target}{}", reason_suffix(.reason))]
    ValueConversion {
        /// Target type name
        target: String,
        /// Rendering of the offending value
        value: String,
        /// Additional detail, if any
        reason: Option<String>,
    },

    /// Identity whose owner type is neither the target type nor one of its subtypes
    #[error("Id {id} is not valid for class {type_name}")]
    InvalidIdentity {
        /// Rendering of the identity
        id: String,
        /// Class the identity was presented to
        type_name: String,
    },

    /// Context frame wrapping a failure of one attribute of a composite value
    #[error("Cannot convert attribute '{attribute}' of type {type_name}: {source}")]
    FieldContext {
        /// Enclosing type
        type_name: String,
        /// Attribute that failed
        attribute: String,
        /// Underlying failure
        source: Box<Error>,
    },

    /// Access to an attribute the type does not declare
    #[error("Unknown attribute '{attribute}' for type {type_name}")]
    UnknownAttribute {
        /// Type that was accessed
        type_name: String,
        /// Requested attribute
        attribute: String,
    },

    /// Invalid operation or state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

fn expected_suffix(expected: &Option<TypeCategory>) -> String {
    match expected {
        Some(category) => format!(" of category {}", category),
        None => String::new(),
    }
}

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(r) => format!(": {}", r),
        None => String::new(),
    }
}

/// Coarse classification of an [`Error`]
///
/// Frames are transparent: the kind of a `FieldContext` chain is the kind of
/// its root cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::UnknownType`]
    UnknownType,
    /// See [`Error::TypeConflict`]
    TypeConflict,
    /// See [`Error::AmbiguousAttribute`]
    AmbiguousAttribute,
    /// See [`Error::NullNotAllowed`]
    NullNotAllowed,
    /// See [`Error::ValueConversion`]
    ValueConversion,
    /// See [`Error::InvalidIdentity`]
    InvalidIdentity,
    /// See [`Error::UnknownAttribute`]
    UnknownAttribute,
    /// See [`Error::InvalidOperation`]
    InvalidOperation,
    /// See [`Error::Config`]
    Config,
}

impl Error {
    /// Unknown type with no category expectation
    pub fn unknown_type(name: impl Into<String>) -> Self {
        Error::UnknownType {
            name: name.into(),
            expected: None,
        }
    }

    /// Unknown type, or present with a different category than `expected`
    pub fn unknown_type_of(name: impl Into<String>, expected: TypeCategory) -> Self {
        Error::UnknownType {
            name: name.into(),
            expected: Some(expected),
        }
    }

    /// Type conflict
    pub fn conflict(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::TypeConflict {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Conversion failure without additional detail
    pub fn conversion(target: impl Into<String>, value: impl fmt::Display) -> Self {
        Error::ValueConversion {
            target: target.into(),
            value: value.to_string(),
            reason: None,
        }
    }

    /// Conversion failure with a reason
    pub fn conversion_because(
        target: impl Into<String>,
        value: impl fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        Error::ValueConversion {
            target: target.into(),
            value: value.to_string(),
            reason: Some(reason.into()),
        }
    }

    /// Null not allowed for `multiplicity`
    pub fn null_not_allowed(multiplicity: Multiplicity) -> Self {
        Error::NullNotAllowed { multiplicity }
    }

    /// Unknown attribute
    pub fn unknown_attribute(type_name: impl Into<String>, attribute: impl Into<String>) -> Self {
        Error::UnknownAttribute {
            type_name: type_name.into(),
            attribute: attribute.into(),
        }
    }

    /// Invalid operation
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Error::InvalidOperation(msg.into())
    }

    /// Wrap this error in a field context frame
    pub fn in_field(self, type_name: impl Into<String>, attribute: impl Into<String>) -> Self {
        Error::FieldContext {
            type_name: type_name.into(),
            attribute: attribute.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error beneath all field context frames
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Error::FieldContext { source, .. } = current {
            current = source;
        }
        current
    }

    /// `(type, attribute)` frames, outermost first
    pub fn attribute_path(&self) -> Vec<(&str, &str)> {
        let mut path = Vec::new();
        let mut current = self;
        while let Error::FieldContext {
            type_name,
            attribute,
            source,
        } = current
        {
            path.push((type_name.as_str(), attribute.as_str()));
            current = source;
        }
        path
    }

    /// Classify the error by its root cause
    pub fn kind(&self) -> ErrorKind {
        match self.root_cause() {
            Error::UnknownType { .. } => ErrorKind::UnknownType,
            Error::TypeConflict { .. } => ErrorKind::TypeConflict,
            Error::AmbiguousAttribute { .. } => ErrorKind::AmbiguousAttribute,
            Error::NullNotAllowed { .. } => ErrorKind::NullNotAllowed,
            Error::ValueConversion { .. } => ErrorKind::ValueConversion,
            Error::InvalidIdentity { .. } => ErrorKind::InvalidIdentity,
            Error::UnknownAttribute { .. } => ErrorKind::UnknownAttribute,
            Error::InvalidOperation(_) => ErrorKind::InvalidOperation,
            Error::Config(_) => ErrorKind::Config,
            // root_cause never stops on a frame
            Error::FieldContext { .. } => ErrorKind::ValueConversion,
        }
    }

    /// Whether this failure was raised while converting a nested attribute
    pub fn is_field_failure(&self) -> bool {
        matches!(self, Error::FieldContext { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unknown_type() {
        let err = Error::unknown_type("Person");
        assert_eq!(err.to_string(), "Unknown type 'Person'");

        let err = Error::unknown_type_of("Person", TypeCategory::Trait);
        let msg = err.to_string();
        assert!(msg.contains("Person"));
        assert!(msg.contains("TRAIT"));
    }

    #[test]
    fn test_error_display_conversion() {
        let err = Error::conversion("int", "abc");
        assert_eq!(err.to_string(), "Cannot convert value 'abc' to datatype int");

        let err = Error::conversion_because("int", "abc", "not a number");
        assert!(err.to_string().ends_with(": not a number"));
    }

    #[test]
    fn test_error_display_null_not_allowed() {
        let err = Error::null_not_allowed(Multiplicity::REQUIRED);
        let msg = err.to_string();
        assert!(msg.contains("Null value not allowed"));
        assert!(msg.contains("REQUIRED"));
    }

    #[test]
    fn test_field_context_chain() {
        let err = Error::null_not_allowed(Multiplicity::REQUIRED)
            .in_field("Address", "city")
            .in_field("Person", "address");

        assert!(err.is_field_failure());
        assert_eq!(err.kind(), ErrorKind::NullNotAllowed);
        assert_eq!(
            err.attribute_path(),
            vec![("Person", "address"), ("Address", "city")]
        );
        assert!(matches!(err.root_cause(), Error::NullNotAllowed { .. }));

        let msg = err.to_string();
        assert!(msg.starts_with("Cannot convert attribute 'address' of type Person"));
        assert!(msg.contains("'city' of type Address"));
    }

    #[test]
    fn test_kind_without_frames() {
        assert_eq!(
            Error::conflict("A", "cycle").kind(),
            ErrorKind::TypeConflict
        );
        assert_eq!(
            Error::invalid_operation("nope").kind(),
            ErrorKind::InvalidOperation
        );
        assert!(Error::unknown_attribute("A", "x").attribute_path().is_empty());
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_error() -> Result<i32> {
            Err(Error::invalid_operation("test"))
        }

        assert!(returns_error().is_err());
    }
}
