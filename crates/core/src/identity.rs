//! Typed reference handle for class instances
//!
//! An [`Id`] names one class instance: the owning type plus a guid. It is
//! created [`IdState::Unassigned`] when a new instance is built, and becomes
//! [`IdState::Assigned`] once the persistence collaborator has durably stored
//! the instance and hands back its permanent guid via [`Id::assign`].
//!
//! ## Usage
//!
//! ```
//! use metatype_core::Id;
//!
//! let id = Id::unassigned("Person");
//! assert!(!id.is_assigned());
//!
//! let stored = id.assign("c1d2e3");
//! assert!(stored.is_assigned());
//! assert_eq!(stored.type_name(), "Person");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle state of an [`Id`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdState {
    /// Not yet stored
    Unassigned,
    /// Durably stored under this guid
    Assigned,
}

/// Identity of a class instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Id {
    guid: String,
    type_name: String,
    version: u32,
    state: IdState,
}

impl Id {
    /// Fresh unassigned identity owned by `type_name`
    pub fn unassigned(type_name: impl Into<String>) -> Self {
        Self {
            guid: Uuid::new_v4().to_string(),
            type_name: type_name.into(),
            version: 0,
            state: IdState::Unassigned,
        }
    }

    /// Identity of an instance the persistence layer already stored
    pub fn assigned(guid: impl Into<String>, type_name: impl Into<String>, version: u32) -> Self {
        Self {
            guid: guid.into(),
            type_name: type_name.into(),
            version,
            state: IdState::Assigned,
        }
    }

    /// Guid (temporary while unassigned)
    pub fn guid(&self) -> &str {
        &self.guid
    }

    /// Name of the class that owns this identity
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Stored version
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Lifecycle state
    pub fn state(&self) -> IdState {
        self.state
    }

    /// Whether the instance has been durably stored
    pub fn is_assigned(&self) -> bool {
        self.state == IdState::Assigned
    }

    /// Assigned copy of this identity carrying the permanent guid
    pub fn assign(&self, guid: impl Into<String>) -> Id {
        Id {
            guid: guid.into(),
            type_name: self.type_name.clone(),
            version: self.version,
            state: IdState::Assigned,
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            IdState::Assigned => "assigned",
            IdState::Unassigned => "unassigned",
        };
        write!(
            f,
            "(type: {}, id: {}, version: {}, {})",
            self.type_name, self.guid, self.version, state
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unassigned_ids_are_unique() {
        let a = Id::unassigned("Person");
        let b = Id::unassigned("Person");
        assert_ne!(a, b);
        assert_eq!(a.state(), IdState::Unassigned);
        assert_eq!(a.version(), 0);
    }

    #[test]
    fn test_assign_keeps_owner() {
        let id = Id::unassigned("Employee");
        let stored = id.assign("guid-1");
        assert!(stored.is_assigned());
        assert_eq!(stored.guid(), "guid-1");
        assert_eq!(stored.type_name(), "Employee");
        assert!(!id.is_assigned());
    }

    #[test]
    fn test_display() {
        let id = Id::assigned("g", "Person", 3);
        assert_eq!(id.to_string(), "(type: Person, id: g, version: 3, assigned)");
    }
}
