//! Loose (unvalidated) instances
//!
//! [`Struct`] and [`Referenceable`] are plain attribute bags keyed by name.
//! They carry a declared type name but nothing checks their contents until
//! they are converted against a registered type.

use crate::value::Value;
use metatype_core::Id;
use std::collections::BTreeMap;
use std::fmt;

/// Loose attribute bag with a declared type name
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Struct {
    type_name: String,
    values: BTreeMap<String, Value>,
}

impl Struct {
    /// Empty struct declared as `type_name`
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            values: BTreeMap::new(),
        }
    }

    /// Struct with the given attribute values
    pub fn with_values(type_name: impl Into<String>, values: BTreeMap<String, Value>) -> Self {
        Self {
            type_name: type_name.into(),
            values,
        }
    }

    /// Builder-style setter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Declared type name
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Attribute value, if present
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Set an attribute, returning the previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    /// Remove an attribute
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    /// All attribute values in name order
    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    pub(crate) fn into_parts(self) -> (String, BTreeMap<String, Value>) {
        (self.type_name, self.values)
    }
}

impl fmt::Display for Struct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.type_name)?;
        for (i, (k, v)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        write!(f, "}}")
    }
}

/// Loose class instance: attribute bag plus identity and attached traits
#[derive(Debug, Clone, PartialEq)]
pub struct Referenceable {
    id: Id,
    inner: Struct,
    traits: BTreeMap<String, Struct>,
}

impl Referenceable {
    /// New instance with a fresh unassigned id and empty trait bags
    pub fn new(type_name: impl Into<String>, trait_names: &[&str]) -> Self {
        let type_name = type_name.into();
        Self::with_id(Id::unassigned(type_name.clone()), type_name, trait_names)
    }

    /// New instance reusing an existing id
    pub fn with_id(id: Id, type_name: impl Into<String>, trait_names: &[&str]) -> Self {
        let traits = trait_names
            .iter()
            .map(|t| (t.to_string(), Struct::new(*t)))
            .collect();
        Self {
            id,
            inner: Struct::new(type_name),
            traits,
        }
    }

    /// Builder-style setter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inner.set(name, value);
        self
    }

    /// Builder-style trait attachment
    pub fn with_trait(mut self, trait_struct: Struct) -> Self {
        self.add_trait(trait_struct);
        self
    }

    /// Identity
    pub fn id(&self) -> &Id {
        &self.id
    }

    /// Declared type name
    pub fn type_name(&self) -> &str {
        self.inner.type_name()
    }

    /// Attribute value, if present
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.inner.get(name)
    }

    /// Set an attribute, returning the previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.inner.set(name, value)
    }

    /// All attribute values in name order
    pub fn values(&self) -> &BTreeMap<String, Value> {
        self.inner.values()
    }

    /// Attach (or replace) a trait bag, keyed by its type name
    pub fn add_trait(&mut self, trait_struct: Struct) {
        self.traits
            .insert(trait_struct.type_name().to_string(), trait_struct);
    }

    /// Attached trait bag
    pub fn get_trait(&self, name: &str) -> Option<&Struct> {
        self.traits.get(name)
    }

    /// Mutable access to an attached trait bag
    pub fn get_trait_mut(&mut self, name: &str) -> Option<&mut Struct> {
        self.traits.get_mut(name)
    }

    /// Names of attached traits
    pub fn trait_names(&self) -> impl Iterator<Item = &str> {
        self.traits.keys().map(String::as_str)
    }

    pub(crate) fn into_parts(self) -> (Id, Struct, BTreeMap<String, Struct>) {
        (self.id, self.inner, self.traits)
    }
}

impl fmt::Display for Referenceable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)?;
        if !self.traits.is_empty() {
            let names: Vec<&str> = self.trait_names().collect();
            write!(f, " traits=[{}]", names.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_builder() {
        let s = Struct::new("Address")
            .with("city", "Oslo")
            .with("zip", 150);
        assert_eq!(s.type_name(), "Address");
        assert_eq!(s.get("city"), Some(&Value::from("Oslo")));
        assert_eq!(s.get("zip"), Some(&Value::Int(150)));
        assert_eq!(s.get("street"), None);
    }

    #[test]
    fn test_referenceable_allocates_unassigned_id() {
        let r = Referenceable::new("Person", &["Audited"]);
        assert!(!r.id().is_assigned());
        assert_eq!(r.id().type_name(), "Person");
        assert_eq!(r.trait_names().collect::<Vec<_>>(), vec!["Audited"]);
        assert_eq!(r.get_trait("Audited").map(Struct::type_name), Some("Audited"));
    }

    #[test]
    fn test_referenceable_trait_mutation() {
        let mut r = Referenceable::new("Person", &["Audited"]);
        r.get_trait_mut("Audited")
            .unwrap()
            .set("by", "admin");
        assert_eq!(
            r.get_trait("Audited").and_then(|t| t.get("by")),
            Some(&Value::from("admin"))
        );

        r.add_trait(Struct::new("Sensitive"));
        assert_eq!(r.trait_names().count(), 2);
    }
}
