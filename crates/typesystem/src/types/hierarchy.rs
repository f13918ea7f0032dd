//! Supertype linearization and attribute flattening
//!
//! Shared by trait and class types. Resolution runs once per type, after all
//! of its supertypes are resolved:
//!
//! 1. Walk the declared supertypes in declaration order. For each supertype
//!    `S`, record the path `[self, S]`, then every ancestor of `S` that has
//!    not been seen yet, with `self` prepended to `S`'s own path. The first
//!    path found wins, so earlier-declared supertypes take precedence.
//! 2. Union each supertype's already-flattened attributes in the same order.
//!    A name arriving from two branches is merged into one slot when both
//!    occurrences agree on `(type, multiplicity, composite)`; otherwise
//!    resolution fails with `AmbiguousAttribute`.
//! 3. Append the type's own attributes. An own attribute that reuses an
//!    inherited name hides it; the inherited one stays visible as
//!    `DeclaringType.attr`.
//!
//! `is_subtype_of` is then a single map lookup.

use crate::types::attribute::AttributeInfo;
use crate::types::field_mapping::FieldMapping;
use metatype_core::{Error, Result};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Path of type names from a type to one of its ancestors, both inclusive
pub type SuperTypePath = SmallVec<[String; 4]>;

/// Resolved ancestry of a trait or class type
#[derive(Debug, Clone, PartialEq)]
pub struct Hierarchy {
    name: String,
    super_types: Vec<String>,
    super_type_paths: FxHashMap<String, SuperTypePath>,
    linearization: Vec<String>,
}

/// A resolved supertype as seen by resolution of one of its subtypes
pub(crate) struct ResolvedSuper<'a> {
    pub name: &'a str,
    pub hierarchy: &'a Hierarchy,
    pub mapping: &'a FieldMapping,
}

impl Hierarchy {
    /// Type the hierarchy belongs to
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared (direct) supertypes, in declaration order
    pub fn super_types(&self) -> &[String] {
        &self.super_types
    }

    /// All transitive ancestors in linearization order
    pub fn ancestors(&self) -> &[String] {
        &self.linearization
    }

    /// Path from this type to `ancestor`, both inclusive
    pub fn path_to(&self, ancestor: &str) -> Option<&[String]> {
        self.super_type_paths.get(ancestor).map(|p| p.as_slice())
    }

    /// All ancestor paths, keyed by ancestor name
    pub fn super_type_paths(&self) -> &FxHashMap<String, SuperTypePath> {
        &self.super_type_paths
    }

    /// Whether this type is `name` or has it as a transitive ancestor
    pub fn is_subtype_of(&self, name: &str) -> bool {
        self.name == name || self.super_type_paths.contains_key(name)
    }
}

/// Compute ancestry and the flattened attribute list of `name`.
pub(crate) fn resolve(
    name: &str,
    supers: &[ResolvedSuper<'_>],
    own: Vec<AttributeInfo>,
) -> Result<(Hierarchy, Vec<(String, AttributeInfo)>)> {
    let hierarchy = linearize(name, supers);
    let fields = flatten(name, supers, own)?;
    Ok((hierarchy, fields))
}

fn linearize(name: &str, supers: &[ResolvedSuper<'_>]) -> Hierarchy {
    let mut paths: FxHashMap<String, SuperTypePath> = FxHashMap::default();
    let mut linearization = Vec::new();

    for sup in supers {
        if !paths.contains_key(sup.name) {
            let mut path = SuperTypePath::new();
            path.push(name.to_string());
            path.push(sup.name.to_string());
            paths.insert(sup.name.to_string(), path);
            linearization.push(sup.name.to_string());
        }
        for ancestor in sup.hierarchy.ancestors() {
            if paths.contains_key(ancestor) {
                continue;
            }
            if let Some(inherited) = sup.hierarchy.path_to(ancestor) {
                let mut path = SuperTypePath::with_capacity(inherited.len() + 1);
                path.push(name.to_string());
                path.extend(inherited.iter().cloned());
                paths.insert(ancestor.clone(), path);
                linearization.push(ancestor.clone());
            }
        }
    }

    Hierarchy {
        name: name.to_string(),
        super_types: supers.iter().map(|s| s.name.to_string()).collect(),
        super_type_paths: paths,
        linearization,
    }
}

fn flatten(
    name: &str,
    supers: &[ResolvedSuper<'_>],
    own: Vec<AttributeInfo>,
) -> Result<Vec<(String, AttributeInfo)>> {
    let mut fields: Vec<(String, AttributeInfo)> = Vec::new();
    // visible name -> (index in fields, supertype that contributed it)
    let mut seen: FxHashMap<String, (usize, String)> = FxHashMap::default();

    for sup in supers {
        for (key, info) in sup.mapping.fields() {
            match seen.get(key) {
                None => {
                    seen.insert(key.clone(), (fields.len(), sup.name.to_string()));
                    fields.push((key.clone(), info.clone()));
                }
                Some((idx, from)) => {
                    if !fields[*idx].1.is_compatible(info) {
                        return Err(Error::AmbiguousAttribute {
                            type_name: name.to_string(),
                            attribute: key.clone(),
                            first: from.clone(),
                            second: sup.name.to_string(),
                        });
                    }
                }
            }
        }
    }

    let mut declared: FxHashMap<String, ()> = FxHashMap::default();
    for info in own {
        if declared.insert(info.name.clone(), ()).is_some() {
            return Err(Error::conflict(
                name,
                format!("attribute '{}' is declared more than once", info.name),
            ));
        }
        if let Some((idx, _)) = seen.remove(&info.name) {
            let qualified = fields[idx].1.qualified_name();
            if seen.contains_key(&qualified) {
                return Err(Error::conflict(
                    name,
                    format!("hidden attribute name '{}' is already in use", qualified),
                ));
            }
            fields[idx].0 = qualified.clone();
            seen.insert(qualified, (idx, String::new()));
        }
        seen.insert(info.name.clone(), (fields.len(), name.to_string()));
        fields.push((info.name.clone(), info));
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::SlotKind;
    use metatype_core::{Multiplicity, TypeCategory};

    fn attr(declaring: &str, name: &str, type_name: &str) -> AttributeInfo {
        AttributeInfo {
            name: name.to_string(),
            type_name: type_name.to_string(),
            category: TypeCategory::Primitive,
            slot: if type_name == "int" {
                SlotKind::Int
            } else {
                SlotKind::String
            },
            multiplicity: Multiplicity::OPTIONAL,
            is_composite: false,
            is_unique: false,
            reverse_attribute_name: None,
            declaring_type: declaring.to_string(),
            reference_only: false,
        }
    }

    struct Built {
        hierarchy: Hierarchy,
        mapping: FieldMapping,
    }

    fn build(name: &str, supers: &[(&str, &Built)], own: Vec<AttributeInfo>) -> Result<Built> {
        let resolved: Vec<ResolvedSuper<'_>> = supers
            .iter()
            .map(|(n, b)| ResolvedSuper {
                name: n,
                hierarchy: &b.hierarchy,
                mapping: &b.mapping,
            })
            .collect();
        let (hierarchy, fields) = resolve(name, &resolved, own)?;
        Ok(Built {
            hierarchy,
            mapping: FieldMapping::new(name, fields)?,
        })
    }

    #[test]
    fn test_paths_and_linearization() {
        let a = build("A", &[], vec![attr("A", "a", "string")]).unwrap();
        let b = build("B", &[("A", &a)], vec![]).unwrap();
        let c = build("C", &[("B", &b)], vec![]).unwrap();

        assert!(c.hierarchy.is_subtype_of("C"));
        assert!(c.hierarchy.is_subtype_of("B"));
        assert!(c.hierarchy.is_subtype_of("A"));
        assert!(!a.hierarchy.is_subtype_of("C"));
        assert_eq!(c.hierarchy.ancestors(), &["B".to_string(), "A".to_string()]);
        assert_eq!(
            c.hierarchy.path_to("A").unwrap(),
            &["C".to_string(), "B".to_string(), "A".to_string()]
        );
        assert_eq!(c.mapping.names().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_diamond_shares_one_slot() {
        let a = build("A", &[], vec![attr("A", "x", "string")]).unwrap();
        let b = build("B", &[("A", &a)], vec![attr("B", "b", "int")]).unwrap();
        let c = build("C", &[("A", &a)], vec![attr("C", "c", "int")]).unwrap();
        let d = build("D", &[("B", &b), ("C", &c)], vec![]).unwrap();

        assert_eq!(d.mapping.names().collect::<Vec<_>>(), vec!["x", "b", "c"]);
        assert_eq!(d.mapping.counts().strings, 1);
        // first declared branch wins the path
        assert_eq!(
            d.hierarchy.path_to("A").unwrap(),
            &["D".to_string(), "B".to_string(), "A".to_string()]
        );
    }

    #[test]
    fn test_identical_attributes_from_independent_branches_merge() {
        let b = build("B", &[], vec![attr("B", "x", "string")]).unwrap();
        let c = build("C", &[], vec![attr("C", "x", "string")]).unwrap();
        let d = build("D", &[("B", &b), ("C", &c)], vec![]).unwrap();
        assert_eq!(d.mapping.len(), 1);
    }

    #[test]
    fn test_conflicting_branches_are_ambiguous() {
        let b = build("B", &[], vec![attr("B", "x", "string")]).unwrap();
        let c = build("C", &[], vec![attr("C", "x", "int")]).unwrap();
        let err = build("D", &[("B", &b), ("C", &c)], vec![]).err().unwrap();
        match err {
            Error::AmbiguousAttribute {
                type_name,
                attribute,
                first,
                second,
            } => {
                assert_eq!(type_name, "D");
                assert_eq!(attribute, "x");
                assert_eq!(first, "B");
                assert_eq!(second, "C");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_own_attribute_hides_inherited() {
        let a = build("A", &[], vec![attr("A", "x", "string")]).unwrap();
        let b = build("B", &[("A", &a)], vec![attr("B", "x", "int")]).unwrap();

        assert_eq!(b.mapping.names().collect::<Vec<_>>(), vec!["A.x", "x"]);
        assert_eq!(b.mapping.get("x").unwrap().type_name, "int");
        assert_eq!(b.mapping.get("A.x").unwrap().type_name, "string");
        assert_eq!(b.mapping.visible_name("A", "x"), Some("A.x"));
    }

    #[test]
    fn test_duplicate_own_attribute_is_conflict() {
        let err = build(
            "A",
            &[],
            vec![attr("A", "x", "string"), attr("A", "x", "string")],
        )
        .err()
        .unwrap();
        assert!(matches!(err, Error::TypeConflict { .. }));
    }
}
