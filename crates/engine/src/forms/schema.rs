use flowdeck_util::schema::{default_value, enum_values, get_description, get_type, keyword, object_properties, required_properties};
use serde_json::Value;

/// Editing mode of one form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Number,
    Boolean,
    /// One of the schema's `enum` values.
    Choice,
    /// Objects, arrays and anything else entered as raw JSON.
    Json,
}

impl FieldKind {
    fn from_schema_type(schema_type: &str) -> Self {
        match schema_type {
            "boolean" => Self::Boolean,
            "integer" => Self::Integer,
            "number" => Self::Number,
            "string" => Self::Text,
            _ => Self::Json,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Choice => "choice",
            Self::Json => "json",
        }
    }
}

/// A selectable literal of a choice field.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceOption {
    pub label: String,
    pub value: Value,
}

impl ChoiceOption {
    fn new(value: Value) -> Self {
        Self {
            label: render_scalar(&value),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    /// Property name, used as the JSON key on submit.
    pub key: String,
    /// Schema `title`, else the property name.
    pub label: String,
    pub description: Option<String>,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
    pub options: Vec<ChoiceOption>,
}

impl FormField {
    /// A field for a value the schema does not describe, typed after the value.
    pub(crate) fn extra(key: &str, value: &Value) -> Self {
        let kind = match value {
            Value::String(_) => FieldKind::Text,
            Value::Bool(_) => FieldKind::Boolean,
            Value::Number(number) if number.is_i64() || number.is_u64() => FieldKind::Integer,
            Value::Number(_) => FieldKind::Number,
            _ => FieldKind::Json,
        };
        Self {
            key: key.to_string(),
            label: key.to_string(),
            description: None,
            kind,
            required: false,
            default: None,
            options: Vec::new(),
        }
    }
}

/// Flat form layout derived from an object JSON schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormSchema {
    pub title: Option<String>,
    pub description: Option<String>,
    pub fields: Vec<FormField>,
}

impl FormSchema {
    /// Builds the layout from a schema, resolving its root `$ref` first.
    ///
    /// Properties keep document order. A schema without properties yields no
    /// fields, which renders as a bare submit action.
    pub fn from_json_schema(schema: &Value) -> Self {
        let root = schema;
        let required = required_properties(schema, root);
        let fields = object_properties(schema, root)
            .into_iter()
            .map(|(key, property)| {
                let options: Vec<ChoiceOption> = enum_values(property, root).into_iter().map(ChoiceOption::new).collect();
                let kind = if options.is_empty() {
                    FieldKind::from_schema_type(&get_type(property, root))
                } else {
                    FieldKind::Choice
                };
                FormField {
                    key: key.to_string(),
                    label: keyword(property, root, "title").unwrap_or(key).to_string(),
                    description: get_description(property, root),
                    kind,
                    required: required.contains(key),
                    default: default_value(property, root).cloned(),
                    options,
                }
            })
            .collect();

        Self {
            title: keyword(schema, root, "title").map(str::to_string),
            description: get_description(schema, root),
            fields,
        }
    }

    pub fn field(&self, key: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Renders a JSON value the way it appears inside an input box.
pub(crate) fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reflector_schema_with_root_ref() {
        let schema = json!({
            "$ref": "#/definitions/Order",
            "definitions": {
                "Order": {
                    "type": "object",
                    "required": ["Phone"],
                    "properties": {
                        "Phone": { "type": "string", "title": "Phone number" },
                        "Qty": { "type": "integer", "default": 1 },
                        "Price": { "type": "number" },
                        "Express": { "type": "boolean" },
                        "Size": { "type": "string", "enum": ["S", "M", "L"] },
                        "Toppings": { "type": "array", "items": { "type": "string" } }
                    }
                }
            }
        });

        let form = FormSchema::from_json_schema(&schema);
        let kinds: Vec<_> = form.fields.iter().map(|field| (field.key.as_str(), field.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("Phone", FieldKind::Text),
                ("Qty", FieldKind::Integer),
                ("Price", FieldKind::Number),
                ("Express", FieldKind::Boolean),
                ("Size", FieldKind::Choice),
                ("Toppings", FieldKind::Json),
            ]
        );
        let phone = form.field("Phone").expect("phone");
        assert!(phone.required);
        assert_eq!(phone.label, "Phone number");
        assert_eq!(form.field("Qty").and_then(|f| f.default.clone()), Some(json!(1)));
        assert_eq!(form.field("Size").map(|f| f.options.len()), Some(3));
    }

    #[test]
    fn empty_input_schema_has_no_fields() {
        assert!(FormSchema::from_json_schema(&json!({})).is_empty());
        assert!(FormSchema::from_json_schema(&Value::Null).is_empty());
    }
}
