//! Class types
//!
//! Classes are the only types whose instances carry an [`Id`]. Conversion
//! follows a decision table over the shape of the input:
//!
//! | Input | Result |
//! |-------|--------|
//! | `null` | handled by multiplicity enforcement before dispatch |
//! | typed instance of this class | returned unchanged |
//! | typed instance of a subclass | delegated to the subclass |
//! | `Id` | validated, returned as a reference |
//! | loose struct/referenceable of this class | new typed instance, field by field |
//! | loose struct/referenceable of a subclass | delegated to the subclass |
//! | anything else | `ValueConversion` |
//!
//! A loose referenceable whose id is already assigned is trusted: the typed
//! result carries its id and traits but no field is converted (see
//! `TypeSystemConfig::trust_assigned_ids`).

use crate::instance::{Referenceable, Struct, TypedReferenceable, TypedStruct};
use crate::registry::TypeCatalog;
use crate::types::field_mapping::FieldMapping;
use crate::types::hierarchy::Hierarchy;
use crate::types::ConvertCtx;
use crate::value::Value;
use metatype_core::{Error, Id, Multiplicity, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::trace;

/// Entity type with identity, inheritance and per-instance traits
#[derive(Debug, Clone, PartialEq)]
pub struct ClassType {
    name: String,
    hierarchy: Hierarchy,
    mapping: Arc<FieldMapping>,
}

impl ClassType {
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

    /// Whether this class is `name` or inherits from it
    pub fn is_subtype_of(&self, name: &str) -> bool {
        self.hierarchy.is_subtype_of(name)
    }

    /// Accept `id` only if it is owned by this class or one of its
    /// subclasses.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIdentity` otherwise, including when the owner type is
    /// not registered at all.
    pub fn validate_id(&self, catalog: &TypeCatalog, id: &Id) -> Result<()> {
        let owner = id.type_name();
        let valid = owner == self.name
            || catalog
                .class_type(owner)
                .map(|c| c.is_subtype_of(&self.name))
                .unwrap_or(false);
        if valid {
            Ok(())
        } else {
            Err(Error::InvalidIdentity {
                id: id.to_string(),
                type_name: self.name.clone(),
            })
        }
    }

    /// Fresh instance with a new unassigned id and default trait instances
    pub fn create_instance(
        &self,
        catalog: &Arc<TypeCatalog>,
        trait_names: &[&str],
    ) -> Result<TypedReferenceable> {
        self.create_instance_with_id(catalog, None, trait_names)
    }

    /// Fresh instance reusing `id` when given
    pub fn create_instance_with_id(
        &self,
        catalog: &Arc<TypeCatalog>,
        id: Option<Id>,
        trait_names: &[&str],
    ) -> Result<TypedReferenceable> {
        self.create_instance_with_traits(catalog, id, trait_names, &BTreeMap::new())
    }

    /// Fresh instance whose traits are converted from `supplied` where the
    /// caller provides a value, and created empty otherwise.
    ///
    /// # Errors
    ///
    /// Fails as a whole if any trait name does not resolve to a trait type,
    /// if a supplied trait value does not convert, or if `id` belongs to an
    /// unrelated class.
    pub fn create_instance_with_traits(
        &self,
        catalog: &Arc<TypeCatalog>,
        id: Option<Id>,
        trait_names: &[&str],
        supplied: &BTreeMap<String, Struct>,
    ) -> Result<TypedReferenceable> {
        let ctx = ConvertCtx::new(catalog);
        let names: Vec<String> = trait_names.iter().map(|n| n.to_string()).collect();
        self.instantiate(&ctx, id, &names, supplied)
    }

    fn instantiate(
        &self,
        ctx: &ConvertCtx<'_>,
        id: Option<Id>,
        trait_names: &[String],
        supplied: &BTreeMap<String, Struct>,
    ) -> Result<TypedReferenceable> {
        let id = match id {
            Some(id) => {
                self.validate_id(ctx.catalog, &id)?;
                id
            }
            None => Id::unassigned(self.name.clone()),
        };

        let mut traits = BTreeMap::new();
        for name in trait_names {
            let trait_type = ctx.catalog.trait_type(name)?;
            let instance = match supplied.get(name) {
                Some(s) if s.type_name() != name.as_str() => {
                    return Err(Error::conversion_because(
                        name.as_str(),
                        s,
                        format!("trait instance of type {} supplied", s.type_name()),
                    )
                    .in_field(&self.name, format!("trait {}", name)));
                }
                Some(s) => trait_type
                    .convert_present(ctx, Value::Struct(s.clone()), Multiplicity::REQUIRED)
                    .map_err(|e| e.in_field(&self.name, format!("trait {}", name)))?
                    .into_typed_struct()
                    .ok_or_else(|| Error::conversion(name.as_str(), s))?,
                None => trait_type.create_instance(ctx.catalog),
            };
            traits.insert(name.clone(), instance);
        }

        let inner = TypedStruct::new(
            self.name.clone(),
            Arc::clone(&self.mapping),
            Arc::clone(ctx.catalog),
        );
        Ok(TypedReferenceable::new(id, inner, traits))
    }

    pub(crate) fn convert_present(
        &self,
        ctx: &ConvertCtx<'_>,
        value: Value,
        multiplicity: Multiplicity,
    ) -> Result<Value> {
        let value = match value {
            Value::Id(id) => {
                self.validate_id(ctx.catalog, &id)?;
                return Ok(Value::Id(id));
            }
            other => other,
        };
        let declared = match &value {
            Value::TypedReferenceable(t) => t.type_name().to_string(),
            Value::Referenceable(r) => r.type_name().to_string(),
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
                "Delegating class conversion to subtype"
            );
            return ctx
                .catalog
                .class_type(&declared)?
                .convert_present(ctx, value, multiplicity);
        }

        match value {
            Value::TypedReferenceable(t) if same_layout_of(&t, &self.mapping) => {
                Ok(Value::TypedReferenceable(t))
            }
            Value::TypedReferenceable(t) => {
                // stored values must follow the instance into the new layout
                let loose = t.to_loose();
                self.from_loose(ctx, loose, false).map(Value::TypedReferenceable)
            }
            Value::Referenceable(r) => {
                let trust = ctx.catalog.config().trust_assigned_ids;
                self.from_loose(ctx, r, trust).map(Value::TypedReferenceable)
            }
            Value::Struct(s) => {
                ctx.check_depth(&self.name, &s)?;
                let (_, values) = s.into_parts();
                let mut typed = self.instantiate(ctx, None, &[], &BTreeMap::new())?;
                typed.inner_mut().fill_from(ctx, values)?;
                Ok(Value::TypedReferenceable(typed))
            }
            other => Err(Error::conversion(&self.name, other)),
        }
    }

    fn from_loose(
        &self,
        ctx: &ConvertCtx<'_>,
        r: Referenceable,
        trust_assigned: bool,
    ) -> Result<TypedReferenceable> {
        ctx.check_depth(&self.name, &r)?;
        let (id, inner, supplied) = r.into_parts();
        let trait_names: Vec<String> = supplied.keys().cloned().collect();
        let assigned = id.is_assigned();

        let mut typed = self.instantiate(ctx, Some(id), &trait_names, &supplied)?;
        if assigned && trust_assigned {
            trace!(
                target: "metatype::convert",
                type_name = %self.name,
                id = %typed.id(),
                "Trusting assigned id, attributes not converted"
            );
            return Ok(typed);
        }

        let (_, values) = inner.into_parts();
        typed.inner_mut().fill_from(ctx, values)?;
        Ok(typed)
    }
}

fn same_layout_of(t: &TypedReferenceable, mapping: &Arc<FieldMapping>) -> bool {
    Arc::ptr_eq(t.field_mapping(), mapping) || **t.field_mapping() == **mapping
}

#[cfg(test)]
mod tests {
    use crate::registry::{ClassDefinition, TraitDefinition, TypeBatch, TypeSystem};
    use crate::types::AttributeDefinition;
    use crate::{Referenceable, Struct, Value};
    use metatype_core::{Error, ErrorKind, Id, Multiplicity, TypeSystemConfig};
    use std::collections::BTreeMap;

    fn batch() -> TypeBatch {
        TypeBatch::new()
            .with(TraitDefinition::new("Audited").attribute(AttributeDefinition::optional("by", "string")))
            .with(
                ClassDefinition::new("Person")
                    .attribute(AttributeDefinition::required("name", "string"))
                    .attribute(AttributeDefinition::optional("age", "int")),
            )
            .with(
                ClassDefinition::new("Employee")
                    .super_type("Person")
                    .attribute(AttributeDefinition::optional("salary", "long")),
            )
            .with(ClassDefinition::new("Robot").attribute(AttributeDefinition::optional("model", "string")))
    }

    fn system() -> TypeSystem {
        let ts = TypeSystem::new();
        ts.define_types(batch()).unwrap();
        ts
    }

    #[test]
    fn test_validate_id() {
        let ts = system();
        let catalog = ts.snapshot();
        let person = catalog.class_type("Person").unwrap();

        assert!(person.validate_id(&catalog, &Id::unassigned("Person")).is_ok());
        assert!(person.validate_id(&catalog, &Id::unassigned("Employee")).is_ok());

        let err = person
            .validate_id(&catalog, &Id::unassigned("Robot"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidIdentity { .. }));
        let err = person
            .validate_id(&catalog, &Id::unassigned("Nobody"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidIdentity { .. }));
    }

    #[test]
    fn test_create_instance_with_traits() {
        let ts = system();
        let person = ts.get_class_type("Person").unwrap();
        let p = person.create_instance(&["Audited"]).unwrap();

        assert_eq!(p.type_name(), "Person");
        assert!(!p.id().is_assigned());
        assert_eq!(p.id().type_name(), "Person");
        assert_eq!(p.trait_names().collect::<Vec<_>>(), vec!["Audited"]);
        assert_eq!(p.get("name").unwrap(), Value::Null);
    }

    #[test]
    fn test_supplied_trait_is_converted() {
        let ts = system();
        let catalog = ts.snapshot();
        let person = catalog.class_type("Person").unwrap();
        let mut supplied = BTreeMap::new();
        supplied.insert("Audited".to_string(), Struct::new("Audited").with("by", "ops"));

        let p = person
            .create_instance_with_traits(&catalog, None, &["Audited"], &supplied)
            .unwrap();
        assert_eq!(
            p.get_trait("Audited").unwrap().get("by").unwrap(),
            Value::from("ops")
        );
    }

    #[test]
    fn test_unknown_trait_fails_whole_call() {
        let ts = system();
        let person = ts.get_class_type("Person").unwrap();
        let err = person.create_instance(&["Audited", "Missing"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownType);
    }

    #[test]
    fn test_explicit_id_of_unrelated_class_rejected() {
        let ts = system();
        let person = ts.get_class_type("Person").unwrap();
        let err = person
            .create_instance_with_id(Some(Id::unassigned("Robot")), &[])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidIdentity);
    }

    #[test]
    fn test_convert_referenceable_reuses_id() {
        let ts = system();
        let person = ts.get_class_type("Person").unwrap();
        let loose = Referenceable::new("Person", &[]).with("name", "Ada").with("age", 36i64);
        let id = loose.id().clone();

        let out = person.convert(Value::from(loose), Multiplicity::REQUIRED).unwrap();
        let typed = out.as_typed_referenceable().unwrap();
        assert_eq!(typed.id(), &id);
        assert_eq!(typed.get("age").unwrap(), Value::Int(36));
    }

    #[test]
    fn test_convert_subclass_delegates() {
        let ts = system();
        let person = ts.get_class_type("Person").unwrap();
        let loose = Referenceable::new("Employee", &[])
            .with("name", "Grace")
            .with("salary", 10i32);

        let out = person.convert(Value::from(loose), Multiplicity::REQUIRED).unwrap();
        let typed = out.as_typed_referenceable().unwrap();
        assert_eq!(typed.type_name(), "Employee");
        assert_eq!(typed.get("salary").unwrap(), Value::Long(10));
        assert!(ts.snapshot().is_subtype(typed.type_name(), "Person"));
    }

    #[test]
    fn test_convert_unrelated_class_fails() {
        let ts = system();
        let person = ts.get_class_type("Person").unwrap();
        let err = person
            .convert(Value::from(Referenceable::new("Robot", &[])), Multiplicity::REQUIRED)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueConversion);
    }

    #[test]
    fn test_assigned_id_short_circuits() {
        let ts = system();
        let person = ts.get_class_type("Person").unwrap();
        // name is REQUIRED but missing: only a trusted id lets this through
        let loose = Referenceable::with_id(Id::assigned("g-1", "Person", 3), "Person", &["Audited"]);

        let out = person.convert(Value::from(loose), Multiplicity::REQUIRED).unwrap();
        let typed = out.as_typed_referenceable().unwrap();
        assert!(typed.id().is_assigned());
        assert_eq!(typed.id().guid(), "g-1");
        assert_eq!(typed.trait_names().collect::<Vec<_>>(), vec!["Audited"]);
        assert!(!typed.is_set("name").unwrap());
    }

    #[test]
    fn test_assigned_id_validated_when_trust_disabled() {
        let config = TypeSystemConfig {
            trust_assigned_ids: false,
            ..TypeSystemConfig::default()
        };
        let ts = TypeSystem::with_config(config).unwrap();
        ts.define_types(batch()).unwrap();
        let person = ts.get_class_type("Person").unwrap();
        let loose = Referenceable::with_id(Id::assigned("g-1", "Person", 3), "Person", &[]);

        let err = person.convert(Value::from(loose), Multiplicity::REQUIRED).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NullNotAllowed);
    }

    #[test]
    fn test_convert_id_value() {
        let ts = system();
        let person = ts.get_class_type("Person").unwrap();
        let id = Id::assigned("g-2", "Employee", 1);
        assert_eq!(
            person.convert(Value::Id(id.clone()), Multiplicity::REQUIRED).unwrap(),
            Value::Id(id)
        );
        let err = person
            .convert(Value::Id(Id::unassigned("Robot")), Multiplicity::REQUIRED)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidIdentity);
    }

    #[test]
    fn test_typed_instance_returned_unchanged() {
        let ts = system();
        let person = ts.get_class_type("Person").unwrap();
        let mut p = person.create_instance(&[]).unwrap();
        p.set("name", "Ada").unwrap();
        let out = person
            .convert(Value::from(p.clone()), Multiplicity::REQUIRED)
            .unwrap();
        assert_eq!(out.as_typed_referenceable(), Some(&p));
    }

    #[test]
    fn test_relayout_keeps_values_of_assigned_instance() {
        let ts = system();
        let person = ts.get_class_type("Person").unwrap();
        let mut old = person
            .create_instance_with_id(Some(Id::assigned("g-1", "Person", 1)), &["Audited"])
            .unwrap();
        old.set("name", "Ada").unwrap();
        old.set("age", 36i32).unwrap();

        ts.reset();
        ts.define_types(
            TypeBatch::new()
                .with(TraitDefinition::new("Audited").attribute(AttributeDefinition::optional("by", "string")))
                .with(
                    ClassDefinition::new("Person")
                        .attribute(AttributeDefinition::required("name", "string"))
                        .attribute(AttributeDefinition::optional("age", "int"))
                        .attribute(AttributeDefinition::optional("nickname", "string")),
                ),
        )
        .unwrap();
        let person = ts.get_class_type("Person").unwrap();

        let out = person.convert(Value::from(old), Multiplicity::REQUIRED).unwrap();
        let typed = out.as_typed_referenceable().unwrap();
        assert_eq!(typed.id().guid(), "g-1");
        assert_eq!(typed.get("name").unwrap(), Value::from("Ada"));
        assert_eq!(typed.get("age").unwrap(), Value::Int(36));
        assert_eq!(typed.get("nickname").unwrap(), Value::Null);
        assert!(typed.get_trait("Audited").is_some());
    }

    #[test]
    fn test_relayout_still_checks_required_attributes() {
        let ts = system();
        let person = ts.get_class_type("Person").unwrap();
        let old = person
            .create_instance_with_id(Some(Id::assigned("g-1", "Person", 1)), &[])
            .unwrap();

        ts.reset();
        ts.define_type(
            ClassDefinition::new("Person")
                .attribute(AttributeDefinition::required("name", "string"))
                .attribute(AttributeDefinition::optional("nickname", "string")),
        )
        .unwrap();
        let person = ts.get_class_type("Person").unwrap();

        let err = person.convert(Value::from(old), Multiplicity::REQUIRED).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NullNotAllowed);
    }

    #[test]
    fn test_supplied_trait_must_match_its_key() {
        let ts = system();
        ts.define_type(TraitDefinition::new("Signed").super_type("Audited")).unwrap();
        let catalog = ts.snapshot();
        let person = catalog.class_type("Person").unwrap();
        let mut supplied = BTreeMap::new();
        supplied.insert("Audited".to_string(), Struct::new("Signed").with("by", "ops"));

        let err = person
            .create_instance_with_traits(&catalog, None, &["Audited"], &supplied)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueConversion);
        assert_eq!(
            err.attribute_path(),
            vec![("Person", "trait Audited")]
        );
    }
}
