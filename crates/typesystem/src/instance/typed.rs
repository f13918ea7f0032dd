//! Typed instances bound to a field mapping
//!
//! A [`TypedStruct`] stores its attribute values in the positional slots
//! computed by its type's [`FieldMapping`]. Every write goes through the
//! attribute's declared type and multiplicity, so a typed instance never
//! holds a value its schema would reject.
//!
//! A [`TypedReferenceable`] adds the class identity and the traits attached
//! to this particular instance. Traits are independently typed and are
//! never folded into the class's own field mapping.

use crate::instance::slots::Slots;
use crate::instance::{Referenceable, SlotKind, Struct};
use crate::output;
use crate::registry::TypeCatalog;
use crate::types::{ConvertCtx, FieldMapping};
use crate::value::Value;
use metatype_core::{Error, Id, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Struct or trait instance with schema-validated values
#[derive(Clone)]
pub struct TypedStruct {
    type_name: String,
    mapping: Arc<FieldMapping>,
    catalog: Arc<TypeCatalog>,
    null_flags: Vec<bool>,
    slots: Slots,
}

impl TypedStruct {
    pub(crate) fn new(
        type_name: impl Into<String>,
        mapping: Arc<FieldMapping>,
        catalog: Arc<TypeCatalog>,
    ) -> Self {
        let slots = Slots::new(mapping.counts());
        let null_flags = vec![true; mapping.len()];
        Self {
            type_name: type_name.into(),
            mapping,
            catalog,
            null_flags,
            slots,
        }
    }

    /// Type name
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Layout this instance is bound to
    pub fn field_mapping(&self) -> &Arc<FieldMapping> {
        &self.mapping
    }

    /// Catalog the type was resolved in
    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    /// Visible attribute names in layout order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.mapping.names()
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.mapping
            .index_of(name)
            .ok_or_else(|| Error::unknown_attribute(&self.type_name, name))
    }

    /// Whether the attribute holds a non-null value
    pub fn is_set(&self, name: &str) -> Result<bool> {
        let i = self.index_of(name)?;
        Ok(!self.null_flags[i])
    }

    /// Attribute value (`Value::Null` when unset)
    pub fn get(&self, name: &str) -> Result<Value> {
        let i = self.index_of(name)?;
        if self.null_flags[i] {
            return Ok(Value::Null);
        }
        let (_, info) = &self.mapping.fields()[i];
        Ok(self.slots.load(info.slot, self.mapping.position(i)))
    }

    /// Borrow a nested struct or trait value without cloning it
    pub fn get_struct(&self, name: &str) -> Result<Option<&TypedStruct>> {
        let i = self.index_of(name)?;
        match self.mapping.slot_of(name) {
            Some((SlotKind::Struct, pos)) if !self.null_flags[i] => {
                Ok(self.slots.struct_at(pos))
            }
            _ => Ok(None),
        }
    }

    /// Borrow an owned class instance without cloning it
    pub fn get_referenceable(&self, name: &str) -> Result<Option<&TypedReferenceable>> {
        let i = self.index_of(name)?;
        match self.mapping.slot_of(name) {
            Some((SlotKind::Referenceable, pos)) if !self.null_flags[i] => {
                Ok(self.slots.referenceable_at(pos))
            }
            _ => Ok(None),
        }
    }

    /// Set an attribute, converting `value` with the attribute's declared
    /// type and multiplicity.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let catalog = Arc::clone(&self.catalog);
        self.set_at(&ConvertCtx::new(&catalog), name, value.into())
    }

    pub(crate) fn set_at(&mut self, ctx: &ConvertCtx<'_>, name: &str, value: Value) -> Result<()> {
        let i = self.index_of(name)?;
        let mapping = Arc::clone(&self.mapping);
        let (_, info) = &mapping.fields()[i];

        let value = info.strip_to_references(value)?;
        let data_type = ctx.catalog.get(&info.type_name)?;
        let converted = data_type.convert_at(ctx, value, info.multiplicity)?;

        if info.slot == SlotKind::Referenceable && matches!(converted, Value::Id(_)) {
            return Err(Error::conversion_because(
                &info.type_name,
                &converted,
                "composite attribute requires the full instance",
            ));
        }

        let pos = mapping.position(i);
        if converted.is_null() {
            self.slots.clear(info.slot, pos);
            self.null_flags[i] = true;
        } else {
            self.slots.store(info.slot, pos, converted)?;
            self.null_flags[i] = false;
        }
        Ok(())
    }

    /// Convert every declared attribute from a loose bag. Failures are
    /// wrapped with this type and the attribute name.
    pub(crate) fn fill_from(
        &mut self,
        ctx: &ConvertCtx<'_>,
        mut values: BTreeMap<String, Value>,
    ) -> Result<()> {
        let mapping = Arc::clone(&self.mapping);
        let nested = ctx.nested();
        for name in mapping.names() {
            let value = values.remove(name).unwrap_or(Value::Null);
            self.set_at(&nested, name, value)
                .map_err(|e| e.in_field(&self.type_name, name))?;
        }
        if !values.is_empty() {
            trace!(
                target: "metatype::convert",
                type_name = %self.type_name,
                ignored = ?values.keys().collect::<Vec<_>>(),
                "Ignoring undeclared attributes"
            );
        }
        Ok(())
    }

    /// Loose copy of the set attributes, recursively
    pub fn to_loose(&self) -> Struct {
        let mut values = BTreeMap::new();
        for (i, (name, info)) in self.mapping.fields().iter().enumerate() {
            if self.null_flags[i] {
                continue;
            }
            let v = self.slots.load(info.slot, self.mapping.position(i));
            values.insert(name.clone(), v.into_loose());
        }
        Struct::with_values(self.type_name.clone(), values)
    }
}

impl PartialEq for TypedStruct {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
            && self.null_flags == other.null_flags
            && self.slots == other.slots
    }
}

impl fmt::Debug for TypedStruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("TypedStruct");
        s.field("type_name", &self.type_name);
        for (i, (name, info)) in self.mapping.fields().iter().enumerate() {
            if !self.null_flags[i] {
                s.field(name, &self.slots.load(info.slot, self.mapping.position(i)));
            }
        }
        s.finish()
    }
}

impl fmt::Display for TypedStruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = String::new();
        output::output_struct(self, &mut buf, "");
        f.write_str(&buf)
    }
}

/// Class instance with identity, validated values and attached traits
#[derive(Clone, PartialEq)]
pub struct TypedReferenceable {
    id: Id,
    inner: TypedStruct,
    traits: BTreeMap<String, TypedStruct>,
}

impl TypedReferenceable {
    pub(crate) fn new(id: Id, inner: TypedStruct, traits: BTreeMap<String, TypedStruct>) -> Self {
        Self { id, inner, traits }
    }

    /// Identity
    pub fn id(&self) -> &Id {
        &self.id
    }

    /// Class name
    pub fn type_name(&self) -> &str {
        self.inner.type_name()
    }

    /// Layout this instance is bound to
    pub fn field_mapping(&self) -> &Arc<FieldMapping> {
        self.inner.field_mapping()
    }

    /// Catalog the type was resolved in
    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        self.inner.catalog()
    }

    /// Visible attribute names in layout order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.inner.field_names()
    }

    /// Whether the attribute holds a non-null value
    pub fn is_set(&self, name: &str) -> Result<bool> {
        self.inner.is_set(name)
    }

    /// Attribute value (`Value::Null` when unset)
    pub fn get(&self, name: &str) -> Result<Value> {
        self.inner.get(name)
    }

    /// Borrow a nested struct or trait value
    pub fn get_struct(&self, name: &str) -> Result<Option<&TypedStruct>> {
        self.inner.get_struct(name)
    }

    /// Borrow an owned class instance
    pub fn get_referenceable(&self, name: &str) -> Result<Option<&TypedReferenceable>> {
        self.inner.get_referenceable(name)
    }

    /// Set an attribute with validation
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.inner.set(name, value)
    }

    /// Attribute values without identity or traits
    pub fn values(&self) -> &TypedStruct {
        &self.inner
    }

    pub(crate) fn inner_mut(&mut self) -> &mut TypedStruct {
        &mut self.inner
    }

    /// Names of attached traits
    pub fn trait_names(&self) -> impl Iterator<Item = &str> {
        self.traits.keys().map(String::as_str)
    }

    /// Attached trait instance
    pub fn get_trait(&self, name: &str) -> Option<&TypedStruct> {
        self.traits.get(name)
    }

    /// Mutable access to an attached trait instance
    pub fn get_trait_mut(&mut self, name: &str) -> Option<&mut TypedStruct> {
        self.traits.get_mut(name)
    }

    /// All attached traits
    pub fn traits(&self) -> &BTreeMap<String, TypedStruct> {
        &self.traits
    }

    /// Loose copy: same id, set attributes and trait values
    pub fn to_loose(&self) -> Referenceable {
        let (_, values) = self.inner.to_loose().into_parts();
        let mut r = Referenceable::with_id(self.id.clone(), self.type_name(), &[]);
        for (name, value) in values {
            r.set(name, value);
        }
        for t in self.traits.values() {
            r.add_trait(t.to_loose());
        }
        r
    }
}

impl fmt::Debug for TypedReferenceable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedReferenceable")
            .field("id", &self.id)
            .field("values", &self.inner)
            .field("traits", &self.traits)
            .finish()
    }
}

impl fmt::Display for TypedReferenceable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = String::new();
        output::output_referenceable(self, &mut buf, "");
        f.write_str(&buf)
    }
}
