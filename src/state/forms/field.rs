//! Form field value objects

use serde_json::Value;

use super::validators::{ValidationErrors, Validator};

/// Type-safe field values
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// No value at all (undefined / null)
    #[default]
    Empty,
    Text(String),
    Bool(bool),
    Number(f64),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// True for `Empty` and for the empty string
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Bool(_) | FieldValue::Number(_) => false,
        }
    }

    /// Get the text value (None for non-text values)
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric interpretation of the value. Text is parsed leniently
    /// (surrounding whitespace ignored); booleans are never numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
            FieldValue::Empty | FieldValue::Bool(_) => None,
        }
    }

    /// Convert a JSON scalar into a field value. Arrays and objects are not
    /// leaf values and yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(FieldValue::Empty),
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::Number(n) => n.as_f64().map(FieldValue::Number),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Empty => Value::Null,
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Bool(b) => Value::Bool(*b),
            // Whole numbers are emitted as integers so ratings read "3", not "3.0"
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 => {
                Value::from(*n as i64)
            }
            FieldValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

/// A single named leaf value holder with its validators and derived errors
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    value: FieldValue,
    initial: FieldValue,
    touched: bool,
    dirty: bool,
    validators: Vec<Validator>,
    errors: Option<ValidationErrors>,
}

impl FormField {
    /// Create a new field with an initial value and no validators
    pub fn new(name: &str, initial: FieldValue) -> Self {
        Self::with_validators(name, initial, Vec::new())
    }

    /// Create a new empty text field
    pub fn text(name: &str) -> Self {
        Self::new(name, FieldValue::text(""))
    }

    /// Create a new field carrying validators; errors are computed immediately
    pub fn with_validators(name: &str, initial: FieldValue, validators: Vec<Validator>) -> Self {
        let mut field = Self {
            name: name.to_string(),
            value: initial.clone(),
            initial,
            touched: false,
            dirty: false,
            validators,
            errors: None,
        };
        field.update_validity();
        field
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Replace the value and recompute this field's errors.
    /// Does not mark the field dirty; that is reserved for user input.
    pub fn set_value(&mut self, value: FieldValue) {
        self.value = value;
        self.update_validity();
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// A pristine field has never received a value change from the user
    pub fn is_pristine(&self) -> bool {
        !self.dirty
    }

    pub fn mark_touched(&mut self) {
        self.touched = true;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    /// Swap the validator set. Callers must follow with `update_validity`
    /// if they need the errors to reflect the new set.
    pub fn set_validators(&mut self, validators: Vec<Validator>) {
        self.validators = validators;
    }

    pub fn clear_validators(&mut self) {
        self.validators.clear();
    }

    /// Run every validator against the current value
    pub fn update_validity(&mut self) {
        let mut errors = ValidationErrors::default();
        for validator in &self.validators {
            if let Some(kind) = validator.validate(&self.value) {
                errors.insert(kind);
            }
        }
        self.errors = errors.into_option();
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        self.errors.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_none()
    }

    /// Restore the initial value and clear interaction flags
    pub fn reset(&mut self) {
        self.value = self.initial.clone();
        self.touched = false;
        self.dirty = false;
        self.update_validity();
    }
}
