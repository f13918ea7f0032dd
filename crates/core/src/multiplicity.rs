//! Cardinality and nullability contract for attributes
//!
//! A [`Multiplicity`] is a `(lower, upper, unique)` triple:
//!
//! | Constant | lower | upper | unique | null allowed | many |
//! |----------|-------|-------|--------|--------------|------|
//! | `REQUIRED` | 1 | 1 | no | no | no |
//! | `OPTIONAL` | 0 | 1 | no | yes | no |
//! | `COLLECTION` | 0 | unbounded | no | yes | yes |
//! | `SET` | 0 | unbounded | yes | yes | yes |
//!
//! Custom bounds are allowed (`Multiplicity::new(2, 5, false)`); the element
//! count of a multi-valued input must then fall in `lower..=upper`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound used for "unbounded" multiplicities
pub const UNBOUNDED: u32 = u32::MAX;

/// Cardinality and nullability of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Multiplicity {
    /// Minimum number of values
    pub lower: u32,
    /// Maximum number of values
    pub upper: u32,
    /// Whether elements must be distinct
    pub is_unique: bool,
}

impl Multiplicity {
    /// Exactly one value, never null
    pub const REQUIRED: Multiplicity = Multiplicity::new(1, 1, false);
    /// Zero or one value
    pub const OPTIONAL: Multiplicity = Multiplicity::new(0, 1, false);
    /// Zero or more values
    pub const COLLECTION: Multiplicity = Multiplicity::new(0, UNBOUNDED, false);
    /// Zero or more distinct values
    pub const SET: Multiplicity = Multiplicity::new(0, UNBOUNDED, true);

    /// Create a multiplicity with explicit bounds
    pub const fn new(lower: u32, upper: u32, is_unique: bool) -> Self {
        Self {
            lower,
            upper,
            is_unique,
        }
    }

    /// Whether a null value satisfies this multiplicity
    pub const fn null_allowed(&self) -> bool {
        self.lower == 0
    }

    /// Whether this multiplicity admits multi-valued containers
    pub const fn is_many(&self) -> bool {
        self.upper > 1
    }

    /// Whether `count` elements satisfy the bounds
    pub const fn admits_count(&self, count: usize) -> bool {
        // usize -> u64 keeps the comparison lossless on every target
        (count as u64) >= self.lower as u64 && (count as u64) <= self.upper as u64
    }

    /// Name of the matching constant, if any
    pub fn constant_name(&self) -> Option<&'static str> {
        match *self {
            Self::REQUIRED => Some("REQUIRED"),
            Self::OPTIONAL => Some("OPTIONAL"),
            Self::COLLECTION => Some("COLLECTION"),
            Self::SET => Some("SET"),
            _ => None,
        }
    }
}

impl Default for Multiplicity {
    fn default() -> Self {
        Self::OPTIONAL
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.constant_name() {
            return write!(f, "{}", name);
        }
        if self.upper == UNBOUNDED {
            write!(f, "{{lower={}, upper=*, unique={}}}", self.lower, self.is_unique)
        } else {
            write!(
                f,
                "{{lower={}, upper={}, unique={}}}",
                self.lower, self.upper, self.is_unique
            )
        }
    }
}
