//! JSON-schema lookups used to build forms.
//!
//! Handler input schemas are generated by a reflector that emits a root
//! `$ref` into a local `definitions` table, so every lookup here resolves
//! `$ref` pointers against the schema root first. Recursive schemas are
//! handled by bounding depth and short-circuiting `$ref`s already on the
//! active resolution path.

use serde_json::Value;
use std::collections::HashSet;

const MAX_DEPTH: usize = 64;
const FALLBACK_TYPE: &str = "string";
const ALTERNATIVES: [&str; 2] = ["anyOf", "oneOf"];

/// Recursive descent over a schema document that tracks the `$ref`s on the
/// current path.
struct Walk<'a> {
    root: &'a Value,
    active_refs: Vec<&'a str>,
    depth: usize,
}

impl<'a> Walk<'a> {
    fn new(root: &'a Value) -> Self {
        Self {
            root,
            active_refs: Vec::new(),
            depth: 0,
        }
    }

    /// Calls `visit` with `schema`, or with the end of its `$ref` chain.
    /// Yields `None` for dangling refs, cycles and overly deep documents.
    fn with_target<T>(&mut self, schema: &'a Value, visit: impl FnOnce(&mut Self, &'a Value) -> Option<T>) -> Option<T> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let result = match schema.get("$ref").and_then(Value::as_str) {
            None => visit(self, schema),
            Some(reference) if self.active_refs.contains(&reference) => None,
            Some(reference) => match self.root.pointer(reference.trim_start_matches('#')) {
                Some(target) => {
                    self.active_refs.push(reference);
                    let result = self.with_target(target, visit);
                    self.active_refs.pop();
                    result
                }
                None => None,
            },
        };
        self.depth -= 1;
        result
    }

    fn type_of(&mut self, schema: &'a Value) -> Option<String> {
        self.with_target(schema, |walk, schema| {
            match schema.get("type") {
                Some(Value::String(name)) => return Some(name.clone()),
                Some(Value::Array(names)) => {
                    let concrete: HashSet<&str> = names.iter().filter_map(Value::as_str).filter(|name| *name != "null").collect();
                    if let [only] = concrete.into_iter().collect::<Vec<_>>()[..] {
                        return Some(only.to_string());
                    }
                }
                _ => {}
            }
            if schema.get("properties").is_some() {
                return Some("object".to_string());
            }
            ALTERNATIVES.iter().find_map(|key| {
                let types: HashSet<String> = schema
                    .get(*key)?
                    .as_array()?
                    .iter()
                    .map(|alternative| walk.type_of(alternative).unwrap_or_else(|| FALLBACK_TYPE.to_string()))
                    .collect();
                match types.len() {
                    1 => types.into_iter().next(),
                    _ => None,
                }
            })
        })
    }

    fn description_of(&mut self, schema: &'a Value) -> Option<String> {
        self.with_target(schema, |walk, schema| {
            if let Some(text) = schema.get("description").and_then(Value::as_str) {
                return Some(text.to_string());
            }
            ALTERNATIVES.iter().find_map(|key| {
                let parts: Vec<String> = schema
                    .get(*key)?
                    .as_array()?
                    .iter()
                    .filter_map(|alternative| walk.description_of(alternative))
                    .collect();
                (!parts.is_empty()).then(|| parts.join(" or "))
            })
        })
    }
}

/// Follows `$ref` chains from `schema` until reaching a schema without one.
///
/// Returns `None` for dangling or cyclic references.
pub fn resolve_reference<'a>(schema: &'a Value, root: &'a Value) -> Option<&'a Value> {
    Walk::new(root).with_target(schema, |_, target| Some(target))
}

/// Resolves the effective type of a schema, handling `$ref`, `type` arrays
/// with `null`, and uniform `anyOf`/`oneOf`. Defaults to `"string"`.
pub fn get_type(schema: &Value, root: &Value) -> String {
    Walk::new(root).type_of(schema).unwrap_or_else(|| FALLBACK_TYPE.to_string())
}

/// Resolves a description, following `$ref` and joining `anyOf`/`oneOf`
/// alternatives with "or".
pub fn get_description(schema: &Value, root: &Value) -> Option<String> {
    Walk::new(root).description_of(schema)
}

/// Properties of an object schema, in document order, with the root `$ref`
/// resolved. Non-object schemas yield an empty list.
pub fn object_properties<'a>(schema: &'a Value, root: &'a Value) -> Vec<(&'a str, &'a Value)> {
    resolve_reference(schema, root)
        .and_then(|resolved| resolved.get("properties"))
        .and_then(Value::as_object)
        .map(|properties| properties.iter().map(|(key, value)| (key.as_str(), value)).collect())
        .unwrap_or_default()
}

/// Names listed in the resolved schema's `required` array.
pub fn required_properties(schema: &Value, root: &Value) -> HashSet<String> {
    resolve_reference(schema, root)
        .and_then(|resolved| resolved.get("required"))
        .and_then(Value::as_array)
        .map(|values| values.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Allowed values of an `enum` property.
pub fn enum_values(schema: &Value, root: &Value) -> Vec<Value> {
    resolve_reference(schema, root)
        .and_then(|resolved| resolved.get("enum"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Reads a string keyword (`title`, `format`, ...) from the resolved schema.
pub fn keyword<'a>(schema: &'a Value, root: &'a Value, name: &str) -> Option<&'a str> {
    resolve_reference(schema, root)
        .and_then(|resolved| resolved.get(name))
        .and_then(Value::as_str)
}

/// Reads the `default` of the resolved schema.
pub fn default_value<'a>(schema: &'a Value, root: &'a Value) -> Option<&'a Value> {
    resolve_reference(schema, root).and_then(|resolved| resolved.get("default"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pizza_schema() -> Value {
        json!({
            "$schema": "http://json-schema.org/draft-04/schema#",
            "$ref": "#/definitions/Pizza",
            "definitions": {
                "Pizza": {
                    "type": "object",
                    "required": ["Name", "Qty"],
                    "properties": {
                        "Name": { "type": "string", "description": "pizza name" },
                        "Qty": { "type": "integer" },
                        "Size": { "$ref": "#/definitions/Size" }
                    }
                },
                "Size": { "type": "string", "enum": ["S", "M", "L"] }
            }
        })
    }

    #[test]
    fn object_properties_follow_root_ref_in_document_order() {
        let schema = pizza_schema();
        let names: Vec<_> = object_properties(&schema, &schema).into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Name", "Qty", "Size"]);
        assert!(required_properties(&schema, &schema).contains("Qty"));
    }

    #[test]
    fn nested_refs_resolve_type_and_enum() {
        let schema = pizza_schema();
        let size = &schema["definitions"]["Pizza"]["properties"]["Size"];
        assert_eq!(get_type(size, &schema), "string");
        assert_eq!(enum_values(size, &schema), vec![json!("S"), json!("M"), json!("L")]);
    }

    #[test]
    fn description_resolves_through_refs() {
        let schema = pizza_schema();
        let name = &schema["definitions"]["Pizza"]["properties"]["Name"];
        assert_eq!(get_description(name, &schema).as_deref(), Some("pizza name"));
    }

    #[test]
    fn nullable_type_arrays_collapse() {
        let schema = json!({ "type": ["null", "integer"] });
        assert_eq!(get_type(&schema, &schema), "integer");
    }

    #[test]
    fn cyclic_refs_do_not_overflow() {
        let root = json!({ "definitions": { "Node": { "$ref": "#/definitions/Node" } } });
        let schema = json!({ "$ref": "#/definitions/Node" });
        assert_eq!(get_type(&schema, &root), "string");
        assert!(resolve_reference(&schema, &root).is_none());
        assert!(object_properties(&schema, &root).is_empty());
    }

    #[test]
    fn schemas_without_properties_have_no_fields() {
        let schema = json!({ "type": "object" });
        assert!(object_properties(&schema, &schema).is_empty());
        assert!(required_properties(&schema, &schema).is_empty());
    }
}
