use serde_json::{Map, Number, Value};
use thiserror::Error;

use super::schema::{FieldKind, FormField, FormSchema, render_scalar};
use super::text_input::TextInput;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingRequired(Vec<String>),
    #[error("{field}: '{value}' is not an integer")]
    InvalidInteger { field: String, value: String },
    #[error("{field}: '{value}' is not a number")]
    InvalidNumber { field: String, value: String },
    #[error("{field}: invalid JSON ({message})")]
    InvalidJson { field: String, message: String },
}

/// The mutable value behind one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(TextInput),
    Boolean(bool),
    /// Index into the field's options; `None` until something is picked.
    Choice(Option<usize>),
}

/// Editable values for a [`FormSchema`] plus a field cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    fields: Vec<FormField>,
    values: Vec<FieldValue>,
    selected: usize,
    read_only: bool,
}

impl FormState {
    /// Starts every field at its schema default.
    pub fn new(schema: &FormSchema) -> Self {
        let fields = schema.fields.clone();
        let values = fields.iter().map(|field| initial_value(field, field.default.as_ref())).collect();
        Self {
            fields,
            values,
            selected: 0,
            read_only: false,
        }
    }

    /// Fills fields from an object. Keys the schema does not name are
    /// appended, typed after their value, so nothing in `data` is hidden.
    pub fn with_data(mut self, data: &Value) -> Self {
        let Some(object) = data.as_object() else {
            return self;
        };
        for (key, value) in object {
            match self.fields.iter().position(|field| &field.key == key) {
                Some(index) => self.values[index] = initial_value(&self.fields[index], Some(value)),
                None => {
                    let field = FormField::extra(key, value);
                    self.values.push(initial_value(&field, Some(value)));
                    self.fields.push(field);
                }
            }
        }
        self
    }

    /// Marks the form as display-only; edits become no-ops.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn value(&self, index: usize) -> Option<&FieldValue> {
        self.values.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_field(&self) -> Option<&FormField> {
        self.fields.get(self.selected)
    }

    /// Text shown for a field's current value.
    pub fn display_value(&self, index: usize) -> String {
        match (self.fields.get(index), self.values.get(index)) {
            (_, Some(FieldValue::Text(input))) => input.input().to_string(),
            (_, Some(FieldValue::Boolean(flag))) => flag.to_string(),
            (Some(field), Some(FieldValue::Choice(Some(choice)))) => {
                field.options.get(*choice).map(|option| option.label.clone()).unwrap_or_default()
            }
            _ => String::new(),
        }
    }

    /// Cursor position of the selected text field, in bytes.
    pub fn cursor(&self) -> Option<usize> {
        match self.values.get(self.selected) {
            Some(FieldValue::Text(input)) => Some(input.cursor()),
            _ => None,
        }
    }

    pub fn select_next(&mut self) {
        if !self.fields.is_empty() {
            self.selected = (self.selected + 1) % self.fields.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.fields.is_empty() {
            self.selected = (self.selected + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn insert_char(&mut self, ch: char) {
        if let Some(input) = self.selected_text_mut() {
            input.insert_char(ch);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(input) = self.selected_text_mut() {
            input.backspace();
        }
    }

    /// Flips the selected boolean.
    pub fn toggle(&mut self) {
        if self.read_only {
            return;
        }
        if let Some(FieldValue::Boolean(flag)) = self.values.get_mut(self.selected) {
            *flag = !*flag;
        }
    }

    /// Moves a choice field to its next option, or the text cursor right.
    pub fn move_right(&mut self) {
        self.step(true);
    }

    /// Moves a choice field to its previous option, or the text cursor left.
    pub fn move_left(&mut self) {
        self.step(false);
    }

    fn step(&mut self, forward: bool) {
        if self.read_only {
            return;
        }
        let option_count = self.fields.get(self.selected).map_or(0, |field| field.options.len());
        match self.values.get_mut(self.selected) {
            Some(FieldValue::Choice(choice)) if option_count > 0 => {
                *choice = Some(match (*choice, forward) {
                    (None, true) => 0,
                    (None, false) => option_count - 1,
                    (Some(current), true) => (current + 1) % option_count,
                    (Some(current), false) => (current + option_count - 1) % option_count,
                });
            }
            Some(FieldValue::Text(input)) if forward => input.move_right(),
            Some(FieldValue::Text(input)) => input.move_left(),
            _ => {}
        }
    }

    fn selected_text_mut(&mut self) -> Option<&mut TextInput> {
        if self.read_only {
            return None;
        }
        match self.values.get_mut(self.selected) {
            Some(FieldValue::Text(input)) => Some(input),
            _ => None,
        }
    }

    /// Keys of required fields that have no value yet.
    pub fn missing_required(&self) -> Vec<String> {
        self.fields
            .iter()
            .zip(&self.values)
            .filter(|(field, value)| {
                field.required
                    && match value {
                        FieldValue::Text(input) => input.is_blank(),
                        FieldValue::Choice(choice) => choice.is_none(),
                        FieldValue::Boolean(_) => false,
                    }
            })
            .map(|(field, _)| field.key.clone())
            .collect()
    }

    /// Converts the entered values into the JSON object posted to the backend.
    ///
    /// Blank optional fields are omitted. Booleans are always present.
    pub fn to_json(&self) -> Result<Value, FormError> {
        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(FormError::MissingRequired(missing));
        }

        let mut object = Map::new();
        for (field, value) in self.fields.iter().zip(&self.values) {
            let converted = match value {
                FieldValue::Boolean(flag) => Some(Value::Bool(*flag)),
                FieldValue::Choice(choice) => choice.and_then(|index| field.options.get(index)).map(|option| option.value.clone()),
                FieldValue::Text(input) if input.is_blank() => None,
                FieldValue::Text(input) => Some(convert_text(field, input.input())?),
            };
            if let Some(converted) = converted {
                object.insert(field.key.clone(), converted);
            }
        }
        Ok(Value::Object(object))
    }
}

fn convert_text(field: &FormField, raw: &str) -> Result<Value, FormError> {
    let trimmed = raw.trim();
    match field.kind {
        FieldKind::Integer => trimmed
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| FormError::InvalidInteger {
                field: field.key.clone(),
                value: raw.to_string(),
            }),
        FieldKind::Number => trimmed
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| FormError::InvalidNumber {
                field: field.key.clone(),
                value: raw.to_string(),
            }),
        FieldKind::Json => serde_json::from_str(trimmed).map_err(|error| FormError::InvalidJson {
            field: field.key.clone(),
            message: error.to_string(),
        }),
        _ => Ok(Value::String(raw.to_string())),
    }
}

fn initial_value(field: &FormField, value: Option<&Value>) -> FieldValue {
    match field.kind {
        FieldKind::Boolean => FieldValue::Boolean(value.and_then(parse_boolean).unwrap_or(false)),
        FieldKind::Choice => FieldValue::Choice(value.and_then(|value| field.options.iter().position(|option| values_match(&option.value, value)))),
        FieldKind::Json => FieldValue::Text(TextInput::with_text(value.filter(|value| !value.is_null()).map(Value::to_string).unwrap_or_default())),
        FieldKind::Text | FieldKind::Integer | FieldKind::Number => FieldValue::Text(TextInput::with_text(value.map(render_scalar).unwrap_or_default())),
    }
}

fn parse_boolean(value: &Value) -> Option<bool> {
    value.as_bool().or_else(|| match value.as_str()?.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    })
}

fn values_match(expected: &Value, candidate: &Value) -> bool {
    if expected == candidate {
        return true;
    }
    match (expected, candidate) {
        (_, Value::String(text)) => &expected.to_string() == text,
        (Value::String(expected_text), other) => expected_text == &other.to_string(),
        _ => false,
    }
}
