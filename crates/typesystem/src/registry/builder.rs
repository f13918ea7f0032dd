//! Two-phase batch resolution
//!
//! ## Phase 1: placeholders
//!
//! Every definition of the batch is entered into a name table with its
//! category only. Definitions equal to an already committed one are
//! dropped (idempotent re-registration); any other clash with a committed
//! or built-in name is a `TypeConflict`.
//!
//! ## Phase 2: resolution
//!
//! Attribute types are looked up against the placeholder table and the
//! current catalog, which is what makes mutually recursive attribute
//! references work. Trait and class types are resolved in topological
//! order of their supertype edges (Kahn's algorithm); definitions left over
//! once the queue drains sit on a cycle and fail the batch with
//! `TypeConflict`.
//!
//! Nothing is visible to readers until the caller publishes the returned
//! catalog. A failure anywhere discards every placeholder of the batch.

use crate::instance::SlotKind;
use crate::registry::catalog::TypeCatalog;
use crate::registry::definition::{TypeBatch, TypeDefinition};
use crate::types::collection::{parse_collection_name, CollectionName};
use crate::types::hierarchy::{self, ResolvedSuper};
use crate::types::{
    array_type_name, map_type_name, ArrayType, AttributeInfo, ClassType, DataType, EnumType,
    FieldMapping, Hierarchy, MapType, StructType, TraitType,
};
use metatype_core::{Error, PrimitiveType, Result, TypeCategory};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use tracing::debug;

/// Resolve `batch` against `current`.
///
/// Returns `None` when every definition is already registered unchanged.
pub(crate) fn build(current: &TypeCatalog, batch: &TypeBatch) -> Result<Option<TypeCatalog>> {
    let mut placeholders: FxHashMap<&str, &TypeDefinition> = FxHashMap::default();
    let mut order: Vec<&TypeDefinition> = Vec::new();

    for def in batch.definitions() {
        let name = def.name();
        check_name(name)?;
        if let Some(existing) = current.definition(name) {
            if existing == def {
                debug!(target: "metatype::registry", name, "Type already registered, skipping");
                continue;
            }
            return Err(Error::conflict(
                name,
                "already registered with a different definition",
            ));
        }
        if current.contains(name) {
            return Err(Error::conflict(name, "name is reserved by a built-in type"));
        }
        match placeholders.get(name) {
            Some(previous) if *previous == def => continue,
            Some(_) => {
                return Err(Error::conflict(
                    name,
                    "declared twice in one batch with different definitions",
                ))
            }
            None => {
                placeholders.insert(name, def);
                order.push(def);
            }
        }
    }

    if order.is_empty() {
        return Ok(None);
    }

    let mut resolver = Resolver::new(current, placeholders);
    for def in &order {
        resolver.check_super_types(def)?;
    }
    for def in topological_order(&order, &resolver.placeholders)? {
        resolver.resolve(def)?;
    }

    let mut types = resolver.collections;
    types.extend(order.iter().filter_map(|d| resolver.resolved.remove(d.name())));
    let definitions = order.into_iter().cloned().collect();
    Ok(Some(current.extend(types, definitions)))
}

/// Register the collection type `name` (and any collection it nests).
///
/// Returns the canonical name and the next catalog, or `None` if nothing
/// new had to be created.
pub(crate) fn build_collection(
    current: &TypeCatalog,
    name: &str,
) -> Result<(String, Option<TypeCatalog>)> {
    if parse_collection_name(name).is_none() {
        return Err(Error::invalid_operation(format!(
            "'{}' is not an array or map type name",
            name
        )));
    }
    let mut resolver = Resolver::new(current, FxHashMap::default());
    let canonical = resolver.canonical_type(name)?;
    if resolver.collections.is_empty() {
        return Ok((canonical, None));
    }
    Ok((canonical, Some(current.extend(resolver.collections, Vec::new()))))
}

fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::conflict(name, "type name must not be empty"));
    }
    if name.chars().any(|c| c.is_whitespace() || matches!(c, '<' | '>' | ',')) {
        return Err(Error::conflict(
            name,
            "type name must not contain whitespace, '<', '>' or ','",
        ));
    }
    Ok(())
}

/// Batch definitions ordered so that every supertype precedes its subtypes
fn topological_order<'a>(
    order: &[&'a TypeDefinition],
    placeholders: &FxHashMap<&str, &'a TypeDefinition>,
) -> Result<Vec<&'a TypeDefinition>> {
    let mut in_degree: FxHashMap<&str, usize> = FxHashMap::default();
    let mut dependents: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
    for def in order {
        let pending_supers: Vec<&str> = def
            .super_types()
            .iter()
            .map(String::as_str)
            .filter(|s| placeholders.contains_key(s))
            .collect();
        in_degree.insert(def.name(), pending_supers.len());
        for s in pending_supers {
            dependents.entry(s).or_default().push(def.name());
        }
    }

    let mut queue: VecDeque<&str> = order
        .iter()
        .map(|d| d.name())
        .filter(|n| in_degree.get(n) == Some(&0))
        .collect();
    let mut sorted = Vec::with_capacity(order.len());
    while let Some(name) = queue.pop_front() {
        if let Some(def) = placeholders.get(name) {
            sorted.push(*def);
        }
        for dependent in dependents.get(name).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(dependent) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(*dependent);
                }
            }
        }
    }

    if sorted.len() < order.len() {
        let stuck: Vec<&str> = order
            .iter()
            .map(|d| d.name())
            .filter(|n| in_degree.get(n).map_or(false, |d| *d > 0))
            .collect();
        let first = stuck.first().copied().unwrap_or_default();
        return Err(Error::conflict(
            first,
            format!("cyclic supertype declaration among {}", stuck.join(", ")),
        ));
    }
    Ok(sorted)
}

struct Resolver<'a> {
    current: &'a TypeCatalog,
    placeholders: FxHashMap<&'a str, &'a TypeDefinition>,
    resolved: FxHashMap<String, DataType>,
    collections: Vec<DataType>,
    collection_names: FxHashSet<String>,
}

impl<'a> Resolver<'a> {
    fn new(
        current: &'a TypeCatalog,
        placeholders: FxHashMap<&'a str, &'a TypeDefinition>,
    ) -> Self {
        Self {
            current,
            placeholders,
            resolved: FxHashMap::default(),
            collections: Vec::new(),
            collection_names: FxHashSet::default(),
        }
    }

    /// Category of a declared, committed or already created collection name
    fn category_of(&self, name: &str) -> Result<TypeCategory> {
        if let Some(def) = self.placeholders.get(name) {
            return Ok(def.category());
        }
        if let Ok(t) = self.current.get(name) {
            return Ok(t.category());
        }
        if self.collection_names.contains(name) {
            return match parse_collection_name(name) {
                Some(CollectionName::Map(..)) => Ok(TypeCategory::Map),
                _ => Ok(TypeCategory::Array),
            };
        }
        Err(Error::unknown_type(name))
    }

    /// Validate a type name, creating any collection types it spells out,
    /// and return its canonical form.
    fn canonical_type(&mut self, name: &str) -> Result<String> {
        match parse_collection_name(name) {
            None => {
                self.category_of(name)?;
                Ok(name.to_string())
            }
            Some(CollectionName::Array(element)) => {
                let element = self.canonical_type(element)?;
                let full = array_type_name(&element);
                self.add_collection(&full, || DataType::Array(ArrayType::new(element)));
                Ok(full)
            }
            Some(CollectionName::Map(key, value)) => {
                let key = self.canonical_type(key)?;
                let value = self.canonical_type(value)?;
                let full = map_type_name(&key, &value);
                self.add_collection(&full, || DataType::Map(MapType::new(key, value)));
                Ok(full)
            }
        }
    }

    fn add_collection(&mut self, full: &str, make: impl FnOnce() -> DataType) {
        if self.current.contains(full) || self.collection_names.contains(full) {
            return;
        }
        self.collection_names.insert(full.to_string());
        self.collections.push(make());
    }

    fn check_super_types(&self, def: &TypeDefinition) -> Result<()> {
        let mut seen = FxHashSet::default();
        for s in def.super_types() {
            if !seen.insert(s.as_str()) {
                return Err(Error::conflict(
                    def.name(),
                    format!("supertype '{}' listed more than once", s),
                ));
            }
            let category = self
                .placeholders
                .get(s.as_str())
                .map(|d| d.category())
                .or_else(|| self.current.get(s).ok().map(|t| t.category()));
            if category != Some(def.category()) {
                return Err(Error::unknown_type_of(s.clone(), def.category()));
            }
        }
        Ok(())
    }

    fn resolve(&mut self, def: &TypeDefinition) -> Result<()> {
        let name = def.name();
        let data_type = match def {
            TypeDefinition::Enum(e) => DataType::Enum(EnumType::new(name, e.values.clone())?),
            TypeDefinition::Struct(_) => {
                let own = self.resolve_attributes(def)?;
                let fields = own.into_iter().map(|a| (a.name.clone(), a)).collect();
                DataType::Struct(StructType::new(name, FieldMapping::new(name, fields)?))
            }
            TypeDefinition::Trait(_) => {
                let (hierarchy, mapping) = self.resolve_hierarchical(def)?;
                DataType::Trait(TraitType::new(hierarchy, mapping))
            }
            TypeDefinition::Class(_) => {
                let (hierarchy, mapping) = self.resolve_hierarchical(def)?;
                DataType::Class(ClassType::new(hierarchy, mapping))
            }
        };

        debug!(
            target: "metatype::registry",
            name,
            category = %data_type.category(),
            fields = data_type.field_mapping().map_or(0, |m| m.len()),
            ancestors = ?data_type.hierarchy().map(|h| h.ancestors().to_vec()),
            "Resolved type"
        );
        self.resolved.insert(name.to_string(), data_type);
        Ok(())
    }

    fn resolve_hierarchical(&mut self, def: &TypeDefinition) -> Result<(Hierarchy, FieldMapping)> {
        let name = def.name();
        let own = self.resolve_attributes(def)?;

        let mut supers = Vec::with_capacity(def.super_types().len());
        for s in def.super_types() {
            let dt = self
                .resolved
                .get(s)
                .or_else(|| self.current.get(s).ok())
                .ok_or_else(|| Error::unknown_type_of(s.clone(), def.category()))?;
            match (dt.hierarchy(), dt.field_mapping()) {
                (Some(hierarchy), Some(mapping)) => supers.push(ResolvedSuper {
                    name: s,
                    hierarchy,
                    mapping,
                }),
                _ => return Err(Error::unknown_type_of(s.clone(), def.category())),
            }
        }

        let (hierarchy, fields) = hierarchy::resolve(name, &supers, own)?;
        let mapping = FieldMapping::new(name, fields)?;
        Ok((hierarchy, mapping))
    }

    fn resolve_attributes(&mut self, def: &TypeDefinition) -> Result<Vec<AttributeInfo>> {
        let owner = def.name();
        let mut infos = Vec::with_capacity(def.attributes().len());
        for a in def.attributes() {
            let type_name = self.canonical_type(&a.type_name)?;
            let category = self.category_of(&type_name)?;

            let is_array = category == TypeCategory::Array;
            if is_array && !a.multiplicity.is_many() {
                return Err(Error::conflict(
                    owner,
                    format!(
                        "array attribute '{}' requires a multi-valued multiplicity, got {}",
                        a.name, a.multiplicity
                    ),
                ));
            }
            if !is_array && a.multiplicity.is_many() {
                return Err(Error::conflict(
                    owner,
                    format!(
                        "attribute '{}' has multiplicity {} but type {} is not an array",
                        a.name, a.multiplicity, type_name
                    ),
                ));
            }

            let reference_only = !a.is_composite
                && match category {
                    TypeCategory::Class => true,
                    TypeCategory::Array => self.element_category(&type_name)? == TypeCategory::Class,
                    _ => false,
                };

            infos.push(AttributeInfo {
                name: a.name.clone(),
                slot: slot_kind(category, &type_name, a.is_composite)?,
                type_name,
                category,
                multiplicity: a.multiplicity,
                is_composite: a.is_composite,
                is_unique: a.is_unique,
                reverse_attribute_name: a.reverse_attribute_name.clone(),
                declaring_type: owner.to_string(),
                reference_only,
            });
        }
        Ok(infos)
    }

    fn element_category(&self, array_name: &str) -> Result<TypeCategory> {
        match parse_collection_name(array_name) {
            Some(CollectionName::Array(element)) => self.category_of(element),
            _ => Err(Error::unknown_type_of(array_name, TypeCategory::Array)),
        }
    }
}

fn slot_kind(category: TypeCategory, type_name: &str, is_composite: bool) -> Result<SlotKind> {
    Ok(match category {
        TypeCategory::Primitive => PrimitiveType::from_name(type_name)
            .map(SlotKind::for_primitive)
            .ok_or_else(|| Error::unknown_type_of(type_name, TypeCategory::Primitive))?,
        TypeCategory::Enum => SlotKind::Enum,
        TypeCategory::Array => SlotKind::Array,
        TypeCategory::Map => SlotKind::Map,
        TypeCategory::Struct | TypeCategory::Trait => SlotKind::Struct,
        TypeCategory::Class if is_composite => SlotKind::Referenceable,
        TypeCategory::Class => SlotKind::Id,
    })
}
