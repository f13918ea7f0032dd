//! Instances
//!
//! | Kind | Type | Validation |
//! |------|------|------------|
//! | Loose struct | [`Struct`] | none, name-keyed bag |
//! | Loose class instance | [`Referenceable`] | none, carries id and traits |
//! | Typed struct / trait | [`TypedStruct`] | every write converted |
//! | Typed class instance | [`TypedReferenceable`] | every write converted |
//!
//! Loose values are what callers build by hand; `convert` turns them into
//! typed ones. Typed values store attributes in positional slots (see
//! [`SlotKind`]).

mod loose;
pub(crate) mod slots;
mod typed;

pub use loose::{Referenceable, Struct};
pub use slots::{SlotCounts, SlotKind};
pub use typed::{TypedReferenceable, TypedStruct};
