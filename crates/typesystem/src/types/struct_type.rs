//! Struct types

use crate::instance::{Struct, TypedStruct};
use crate::registry::TypeCatalog;
use crate::types::field_mapping::FieldMapping;
use crate::types::ConvertCtx;
use crate::value::Value;
use metatype_core::{Error, Multiplicity, Result};
use std::sync::Arc;

/// Non-hierarchical composite type
#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    name: String,
    mapping: Arc<FieldMapping>,
}

impl StructType {
    pub(crate) fn new(name: impl Into<String>, mapping: FieldMapping) -> Self {
        Self {
            name: name.into(),
            mapping: Arc::new(mapping),
        }
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute layout
    pub fn field_mapping(&self) -> &Arc<FieldMapping> {
        &self.mapping
    }

    /// Fresh instance with every attribute unset
    pub fn create_instance(&self, catalog: &Arc<TypeCatalog>) -> TypedStruct {
        TypedStruct::new(self.name.clone(), Arc::clone(&self.mapping), Arc::clone(catalog))
    }

    pub(crate) fn convert_present(
        &self,
        ctx: &ConvertCtx<'_>,
        value: Value,
        _multiplicity: Multiplicity,
    ) -> Result<Value> {
        match value {
            Value::TypedStruct(t) if t.type_name() == self.name => {
                if same_layout(&t, &self.mapping) {
                    Ok(Value::TypedStruct(t))
                } else {
                    self.from_loose(ctx, t.to_loose()).map(Value::TypedStruct)
                }
            }
            Value::Struct(s) if s.type_name() == self.name => {
                self.from_loose(ctx, s).map(Value::TypedStruct)
            }
            other => Err(Error::conversion(&self.name, other)),
        }
    }

    fn from_loose(&self, ctx: &ConvertCtx<'_>, s: Struct) -> Result<TypedStruct> {
        ctx.check_depth(&self.name, &s)?;
        let (_, values) = s.into_parts();
        let mut typed = self.create_instance(ctx.catalog);
        typed.fill_from(ctx, values)?;
        Ok(typed)
    }
}

/// Whether a typed value was built against this exact layout. Instances
/// from an older catalog are rebuilt rather than trusted.
pub(crate) fn same_layout(t: &TypedStruct, mapping: &Arc<FieldMapping>) -> bool {
    Arc::ptr_eq(t.field_mapping(), mapping) || **t.field_mapping() == **mapping
}
