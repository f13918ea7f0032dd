//! Trait types
//!
//! Traits share the hierarchical machinery of classes but carry no identity:
//! a trait instance lives inside the class instance it is attached to.

use crate::instance::{Struct, TypedStruct};
use crate::registry::TypeCatalog;
use crate::types::field_mapping::FieldMapping;
use crate::types::hierarchy::Hierarchy;
use crate::types::struct_type::same_layout;
use crate::types::ConvertCtx;
use crate::value::Value;
use metatype_core::{Error, Multiplicity, Result};
use std::sync::Arc;
use tracing::trace;

/// Mixin type attachable to class instances
#[derive(Debug, Clone, PartialEq)]
pub struct TraitType {
    name: String,
    hierarchy: Hierarchy,
    mapping: Arc<FieldMapping>,
}

impl TraitType {
    pub(crate) fn new(hierarchy: Hierarchy, mapping: FieldMapping) -> Self {
        Self {
            name: hierarchy.name().to_string(),
            hierarchy,
            mapping: Arc::new(mapping),
        }
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved ancestry
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Flattened attribute layout
    pub fn field_mapping(&self) -> &Arc<FieldMapping> {
        &self.mapping
    }

    /// Whether this trait is `name` or inherits from it
    pub fn is_subtype_of(&self, name: &str) -> bool {
        self.hierarchy.is_subtype_of(name)
    }

    /// Fresh trait instance with every attribute unset
    pub fn create_instance(&self, catalog: &Arc<TypeCatalog>) -> TypedStruct {
        TypedStruct::new(self.name.clone(), Arc::clone(&self.mapping), Arc::clone(catalog))
    }

    pub(crate) fn convert_present(
        &self,
        ctx: &ConvertCtx<'_>,
        value: Value,
        multiplicity: Multiplicity,
    ) -> Result<Value> {
        let declared = match &value {
            Value::TypedStruct(t) => t.type_name().to_string(),
            Value::Struct(s) => s.type_name().to_string(),
            other => return Err(Error::conversion(&self.name, other)),
        };

        if declared != self.name {
            if !ctx.catalog.is_subtype(&declared, &self.name) {
                return Err(Error::conversion(&self.name, &value));
            }
            trace!(
                target: "metatype::convert",
                from = %self.name,
                to = %declared,
                "Delegating trait conversion to subtype"
            );
            return ctx
                .catalog
                .trait_type(&declared)?
                .convert_present(ctx, value, multiplicity);
        }

        match value {
            Value::TypedStruct(t) if same_layout(&t, &self.mapping) => Ok(Value::TypedStruct(t)),
            Value::TypedStruct(t) => self.from_loose(ctx, t.to_loose()).map(Value::TypedStruct),
            Value::Struct(s) => self.from_loose(ctx, s).map(Value::TypedStruct),
            other => Err(Error::conversion(&self.name, other)),
        }
    }

    pub(crate) fn from_loose(&self, ctx: &ConvertCtx<'_>, s: Struct) -> Result<TypedStruct> {
        ctx.check_depth(&self.name, &s)?;
        let (_, values) = s.into_parts();
        let mut typed = self.create_instance(ctx.catalog);
        typed.fill_from(ctx, values)?;
        Ok(typed)
    }
}
