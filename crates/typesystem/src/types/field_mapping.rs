//! Flattened, positionally indexed attribute layout
//!
//! A [`FieldMapping`] is computed once when a composite type is resolved and
//! never changes afterwards. It records:
//!
//! - the ordered list of visible attribute names and their [`AttributeInfo`]
//!   (inherited attributes first, in supertype linearization order, then the
//!   type's own declarations)
//! - for each attribute, its position within the slot array of its kind
//! - the number of slots of each kind ([`SlotCounts`])
//!
//! Typed instances use the positions for O(1) access.

use crate::instance::{SlotCounts, SlotKind};
use crate::types::attribute::AttributeInfo;
use metatype_core::{Error, Result};
use rustc_hash::FxHashMap;

/// Attribute layout of a struct, trait or class type
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    fields: Vec<(String, AttributeInfo)>,
    positions: Vec<usize>,
    index: FxHashMap<String, usize>,
    counts: SlotCounts,
}

impl FieldMapping {
    /// Build a mapping from visible names in layout order.
    ///
    /// # Errors
    ///
    /// Returns `TypeConflict` if a visible name appears twice.
    pub fn new(owner: &str, fields: Vec<(String, AttributeInfo)>) -> Result<Self> {
        let mut index = FxHashMap::default();
        let mut positions = Vec::with_capacity(fields.len());
        let mut counts = SlotCounts::default();

        for (i, (name, info)) in fields.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(Error::conflict(
                    owner,
                    format!("attribute '{}' is declared more than once", name),
                ));
            }
            positions.push(counts.allocate(info.slot));
        }

        Ok(Self {
            fields,
            positions,
            index,
            counts,
        })
    }

    /// Empty mapping
    pub fn empty() -> Self {
        Self {
            fields: Vec::new(),
            positions: Vec::new(),
            index: FxHashMap::default(),
            counts: SlotCounts::default(),
        }
    }

    /// Visible names and attribute schemas in layout order
    pub fn fields(&self) -> &[(String, AttributeInfo)] {
        &self.fields
    }

    /// Visible names in layout order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the mapping has no attributes
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Layout index of a visible name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Attribute schema by visible name
    pub fn get(&self, name: &str) -> Option<&AttributeInfo> {
        self.index_of(name).map(|i| &self.fields[i].1)
    }

    /// Whether `name` is a visible attribute
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Slot position of the attribute at layout index `i`
    pub fn position(&self, i: usize) -> usize {
        self.positions[i]
    }

    /// Storage kind and slot position of a visible name
    pub fn slot_of(&self, name: &str) -> Option<(SlotKind, usize)> {
        self.index_of(name)
            .map(|i| (self.fields[i].1.slot, self.positions[i]))
    }

    /// Slot counts per kind
    pub fn counts(&self) -> &SlotCounts {
        &self.counts
    }

    /// Name under which the attribute `attribute` declared by
    /// `declaring_type` is visible: the plain name, or the qualified
    /// `Type.attr` form when a subtype hides it.
    pub fn visible_name(&self, declaring_type: &str, attribute: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(_, info)| info.declaring_type == declaring_type && info.name == attribute)
            .map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metatype_core::{Multiplicity, TypeCategory};

    fn attr(name: &str, slot: SlotKind) -> (String, AttributeInfo) {
        (
            name.to_string(),
            AttributeInfo {
                name: name.to_string(),
                type_name: "t".to_string(),
                category: TypeCategory::Primitive,
                slot,
                multiplicity: Multiplicity::OPTIONAL,
                is_composite: false,
                is_unique: false,
                reverse_attribute_name: None,
                declaring_type: "T".to_string(),
                reference_only: false,
            },
        )
    }

    #[test]
    fn test_positions_are_per_kind() {
        let mapping = FieldMapping::new(
            "T",
            vec![
                attr("a", SlotKind::String),
                attr("b", SlotKind::Int),
                attr("c", SlotKind::String),
                attr("d", SlotKind::Id),
            ],
        )
        .unwrap();

        assert_eq!(mapping.slot_of("a"), Some((SlotKind::String, 0)));
        assert_eq!(mapping.slot_of("b"), Some((SlotKind::Int, 0)));
        assert_eq!(mapping.slot_of("c"), Some((SlotKind::String, 1)));
        assert_eq!(mapping.slot_of("d"), Some((SlotKind::Id, 0)));
        assert_eq!(mapping.counts().strings, 2);
        assert_eq!(mapping.counts().total(), 4);
        assert_eq!(mapping.names().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_duplicate_name_is_conflict() {
        let err = FieldMapping::new(
            "T",
            vec![attr("a", SlotKind::String), attr("a", SlotKind::Int)],
        )
        .unwrap_err();
        assert!(matches!(err, Error::TypeConflict { .. }));
    }

    #[test]
    fn test_visible_name() {
        let mut hidden = attr("a", SlotKind::String);
        hidden.0 = "T.a".to_string();
        let mut own = attr("a", SlotKind::String);
        own.1.declaring_type = "U".to_string();

        let mapping = FieldMapping::new("U", vec![hidden, own]).unwrap();
        assert_eq!(mapping.visible_name("T", "a"), Some("T.a"));
        assert_eq!(mapping.visible_name("U", "a"), Some("a"));
        assert_eq!(mapping.visible_name("V", "a"), None);
    }
}
