//! Human-readable rendering of values
//!
//! Composite instances render one attribute per line, in field mapping
//! order, so the output of an instance is deterministic for a given type
//! declaration:
//!
//! ```text
//! {
//!   id : (type: Person, id: ..., version: 0, unassigned)
//!   name : Ada
//!   address : {
//!     city : Oslo
//!   }
//!   trait Audited : {
//!     by : <null>
//!   }
//! }
//! ```
//!
//! Nested instances are indented by the catalog's
//! `TypeSystemConfig::output_indent`.

use crate::instance::{SlotKind, TypedReferenceable, TypedStruct};
use crate::value::Value;
use std::fmt::Write as _;

/// Rendering of a null value
pub const NULL_MARKER: &str = "<null>";

/// Append the rendering of `value` to `buf`. `prefix` is the indentation of
/// the line the value starts on; it is applied to continuation lines.
pub fn output(value: &Value, buf: &mut String, prefix: &str) {
    match value {
        Value::Null => buf.push_str(NULL_MARKER),
        Value::TypedStruct(t) => output_struct(t, buf, prefix),
        Value::TypedReferenceable(r) => output_referenceable(r, buf, prefix),
        Value::Array(items) => {
            buf.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buf.push_str(", ");
                }
                output(item, buf, prefix);
            }
            buf.push(']');
        }
        Value::Map(pairs) => {
            buf.push('{');
            for (i, (k, v)) in pairs.iter().enumerate() {
                if i > 0 {
                    buf.push_str(", ");
                }
                output(k, buf, prefix);
                buf.push_str(": ");
                output(v, buf, prefix);
            }
            buf.push('}');
        }
        other => {
            let _ = write!(buf, "{}", other);
        }
    }
}

pub(crate) fn output_struct(t: &TypedStruct, buf: &mut String, prefix: &str) {
    let field_prefix = format!("{}{}", prefix, t.catalog().config().output_indent);
    buf.push_str("{\n");
    write_fields(t, buf, &field_prefix);
    buf.push_str(prefix);
    buf.push('}');
}

pub(crate) fn output_referenceable(r: &TypedReferenceable, buf: &mut String, prefix: &str) {
    let field_prefix = format!("{}{}", prefix, r.catalog().config().output_indent);
    buf.push_str("{\n");
    let _ = writeln!(buf, "{}id : {}", field_prefix, r.id());
    write_fields(r.values(), buf, &field_prefix);
    for (name, t) in r.traits() {
        let _ = write!(buf, "{}trait {} : ", field_prefix, name);
        output_struct(t, buf, &field_prefix);
        buf.push('\n');
    }
    buf.push_str(prefix);
    buf.push('}');
}

fn write_fields(t: &TypedStruct, buf: &mut String, field_prefix: &str) {
    for (name, info) in t.field_mapping().fields() {
        let _ = write!(buf, "{}{} : ", field_prefix, name);
        match info.slot {
            SlotKind::Struct => match t.get_struct(name) {
                Ok(Some(nested)) => output_struct(nested, buf, field_prefix),
                _ => buf.push_str(NULL_MARKER),
            },
            SlotKind::Referenceable => match t.get_referenceable(name) {
                Ok(Some(nested)) => output_referenceable(nested, buf, field_prefix),
                _ => buf.push_str(NULL_MARKER),
            },
            _ => match t.get(name) {
                Ok(v) => output(&v, buf, field_prefix),
                Err(_) => buf.push_str(NULL_MARKER),
            },
        }
        buf.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ClassDefinition, StructDefinition, TraitDefinition, TypeBatch, TypeSystem};
    use crate::types::AttributeDefinition;
    use metatype_core::{Id, Multiplicity};

    fn registry() -> TypeSystem {
        let ts = TypeSystem::new();
        ts.define_types(
            TypeBatch::new()
                .with(StructDefinition::new("Address").attribute(AttributeDefinition::optional("city", "string")))
                .with(TraitDefinition::new("Audited").attribute(AttributeDefinition::optional("by", "string")))
                .with(
                    ClassDefinition::new("Person")
                        .attribute(AttributeDefinition::required("name", "string"))
                        .attribute(AttributeDefinition::optional("age", "int"))
                        .attribute(AttributeDefinition::optional("address", "Address")),
                ),
        )
        .unwrap();
        ts
    }

    #[test]
    fn test_scalars_and_collections() {
        let mut buf = String::new();
        output(&Value::Null, &mut buf, "");
        assert_eq!(buf, NULL_MARKER);

        let mut buf = String::new();
        output(&Value::Array(vec![Value::Int(1), Value::Null]), &mut buf, "");
        assert_eq!(buf, "[1, <null>]");

        let mut buf = String::new();
        output(&Value::Map(vec![(Value::from("a"), Value::Long(2))]), &mut buf, "");
        assert_eq!(buf, "{a: 2}");
    }

    #[test]
    fn test_instance_rendering_is_deterministic() {
        let ts = registry();
        let person = ts.get_class_type("Person").unwrap();
        let id = Id::assigned("g1", "Person", 3);
        let mut r = person.create_instance_with_id(Some(id), &["Audited"]).unwrap();
        r.set("name", "Ada").unwrap();
        r.set(
            "address",
            crate::instance::Struct::new("Address").with("city", "Oslo"),
        )
        .unwrap();

        let expected = "{\n  id : (type: Person, id: g1, version: 3, assigned)\n  name : Ada\n  age : <null>\n  address : {\n    city : Oslo\n  }\n  trait Audited : {\n    by : <null>\n  }\n}";
        assert_eq!(r.to_string(), expected);

        let mut buf = String::new();
        person
            .output(&Value::TypedReferenceable(r.clone()), &mut buf, "")
            .unwrap();
        assert_eq!(buf, expected);
    }

    #[test]
    fn test_output_rejects_foreign_instance() {
        let ts = registry();
        let address = ts.get_struct_type("Address").unwrap();
        let person = ts.get_class_type("Person").unwrap();
        let typed = address
            .convert(crate::instance::Struct::new("Address"), Multiplicity::REQUIRED)
            .unwrap();
        let mut buf = String::new();
        assert!(person.output(&typed, &mut buf, "").is_err());
        assert!(address.output(&typed, &mut buf, "").is_ok());
    }
}
