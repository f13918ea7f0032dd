//! Array and map types
//!
//! Collection types are named structurally: `array<E>` and `map<K,V>`. They
//! come into existence when an attribute declares such a type name, or when
//! a caller asks for one explicitly.

use crate::types::enforce::enforce_unique;
use crate::types::ConvertCtx;
use crate::value::Value;
use metatype_core::{Error, Multiplicity, Result, TypeCategory, UNBOUNDED};

const ARRAY_PREFIX: &str = "array<";
const MAP_PREFIX: &str = "map<";

/// Name of the array type over `element`
pub fn array_type_name(element: &str) -> String {
    format!("{}{}>", ARRAY_PREFIX, element)
}

/// Name of the map type from `key` to `value`
pub fn map_type_name(key: &str, value: &str) -> String {
    format!("{}{},{}>", MAP_PREFIX, key, value)
}

/// Structural collection name, parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionName<'a> {
    /// `array<element>`
    Array(&'a str),
    /// `map<key,value>`
    Map(&'a str, &'a str),
}

/// Parse `array<..>` / `map<..,..>`, honouring nested angle brackets
pub fn parse_collection_name(name: &str) -> Option<CollectionName<'_>> {
    let name = name.trim();
    if let Some(inner) = name.strip_prefix(ARRAY_PREFIX).and_then(|s| s.strip_suffix('>')) {
        let inner = inner.trim();
        if inner.is_empty() || !balanced(inner) {
            return None;
        }
        return Some(CollectionName::Array(inner));
    }
    if let Some(inner) = name.strip_prefix(MAP_PREFIX).and_then(|s| s.strip_suffix('>')) {
        let split = top_level_comma(inner)?;
        let (key, value) = (inner[..split].trim(), inner[split + 1..].trim());
        if key.is_empty() || value.is_empty() || !balanced(key) || !balanced(value) {
            return None;
        }
        return Some(CollectionName::Map(key, value));
    }
    None
}

fn top_level_comma(s: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn balanced(s: &str) -> bool {
    let mut depth = 0i32;
    for c in s.chars() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Multiplicity used for one element of a collection: present, and
/// multi-valued only when the element type is itself an array.
fn element_multiplicity(category: TypeCategory) -> Multiplicity {
    if category == TypeCategory::Array {
        Multiplicity::new(1, UNBOUNDED, false)
    } else {
        Multiplicity::REQUIRED
    }
}

/// Homogeneous list type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayType {
    name: String,
    element_type: String,
}

impl ArrayType {
    /// Array over `element_type`
    pub fn new(element_type: impl Into<String>) -> Self {
        let element_type = element_type.into();
        Self {
            name: array_type_name(&element_type),
            element_type,
        }
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element type name
    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    pub(crate) fn convert(&self, ctx: &ConvertCtx<'_>, value: Value, m: Multiplicity) -> Result<Value> {
        let items = match value {
            Value::Array(items) => items,
            other => return Err(Error::conversion(&self.name, other)),
        };
        let element = ctx.catalog.get(&self.element_type)?;
        let element_m = element_multiplicity(element.category());

        let mut converted = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            let v = element
                .convert_at(ctx, item, element_m)
                .map_err(|e| e.in_field(&self.name, format!("[{}]", i)))?;
            converted.push(v);
        }
        enforce_unique(&self.name, &converted, m)?;
        Ok(Value::Array(converted))
    }
}

/// Key/value map type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapType {
    name: String,
    key_type: String,
    value_type: String,
}

impl MapType {
    /// Map from `key_type` to `value_type`
    pub fn new(key_type: impl Into<String>, value_type: impl Into<String>) -> Self {
        let key_type = key_type.into();
        let value_type = value_type.into();
        Self {
            name: map_type_name(&key_type, &value_type),
            key_type,
            value_type,
        }
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key type name
    pub fn key_type(&self) -> &str {
        &self.key_type
    }

    /// Value type name
    pub fn value_type(&self) -> &str {
        &self.value_type
    }

    pub(crate) fn convert(&self, ctx: &ConvertCtx<'_>, value: Value) -> Result<Value> {
        let pairs = match value {
            Value::Map(pairs) => pairs,
            other => return Err(Error::conversion(&self.name, other)),
        };
        let key_dt = ctx.catalog.get(&self.key_type)?;
        let value_dt = ctx.catalog.get(&self.value_type)?;
        let key_m = element_multiplicity(key_dt.category());
        let value_m = element_multiplicity(value_dt.category());

        let mut converted: Vec<(Value, Value)> = Vec::with_capacity(pairs.len());
        for (k, v) in pairs {
            let label = k.to_string();
            let k = key_dt
                .convert_at(ctx, k, key_m)
                .map_err(|e| e.in_field(&self.name, format!("key {}", label)))?;
            if converted.iter().any(|(existing, _)| *existing == k) {
                return Err(Error::conversion_because(&self.name, &k, "duplicate map key"));
            }
            let v = value_dt
                .convert_at(ctx, v, value_m)
                .map_err(|e| e.in_field(&self.name, format!("[{}]", label)))?;
            converted.push((k, v));
        }
        Ok(Value::Map(converted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(array_type_name("string"), "array<string>");
        assert_eq!(map_type_name("string", "int"), "map<string,int>");
        assert_eq!(ArrayType::new("int").name(), "array<int>");
        assert_eq!(MapType::new("string", "array<int>").name(), "map<string,array<int>>");
    }

    #[test]
    fn test_parse_simple() {
        assert_eq!(
            parse_collection_name("array<string>"),
            Some(CollectionName::Array("string"))
        );
        assert_eq!(
            parse_collection_name("map<string, int>"),
            Some(CollectionName::Map("string", "int"))
        );
        assert_eq!(parse_collection_name("Person"), None);
    }

    #[test]
    fn test_parse_nested() {
        assert_eq!(
            parse_collection_name("map<string,map<int,array<Person>>>"),
            Some(CollectionName::Map("string", "map<int,array<Person>>"))
        );
        assert_eq!(
            parse_collection_name("array<map<string,int>>"),
            Some(CollectionName::Array("map<string,int>"))
        );
    }

    #[test]
    fn test_parse_malformed() {
        assert_eq!(parse_collection_name("array<>"), None);
        assert_eq!(parse_collection_name("array<a>>"), None);
        assert_eq!(parse_collection_name("map<string>"), None);
        assert_eq!(parse_collection_name("map<,int>"), None);
    }
}
