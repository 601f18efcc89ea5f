//! Form schemas for editable content types
//!
//! Each editable content type supplies a [`ContentSchema`]: the shape of its
//! HTML form, how to prefill it from an existing item, and how to validate
//! submitted input into the JSON payload sent to the content service.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use super::{ContentType, Item};

/// Per-type form schema
pub trait ContentSchema: Send + Sync + 'static {
    /// Content type described by this schema
    const KIND: ContentType;

    /// Content type whose items populate the form's select inputs
    const OPTIONS: Option<ContentType> = None;

    /// Submitted form; every field decodes leniently and is checked by `validate`
    type Form: DeserializeOwned + Serialize + Default + Send + Sync + 'static;

    /// Form prefilled from an existing item
    fn form_from_item(item: &Item) -> Self::Form;

    /// Apply query-string presets to a blank form
    fn prefill(_form: &mut Self::Form, _query: &HashMap<String, String>, _options: &[Item]) {}

    /// Inputs to render for the given form state
    fn fields(form: &Self::Form, options: &[Item]) -> Vec<FormField>;

    /// Validate the form into the upstream payload
    fn validate(form: &Self::Form, scope: &Scope) -> Result<Map<String, Value>, FormErrors>;
}

/// Route context a nested form is submitted in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scope {
    /// Owning parent taken from the URL
    pub parent: Option<(ContentType, i64)>,
}

impl Scope {
    pub fn top_level() -> Self {
        Self { parent: None }
    }

    pub fn nested(kind: ContentType, id: i64) -> Self {
        Self {
            parent: Some((kind, id)),
        }
    }

    /// Parent id if the scope's parent is of the given type
    pub fn parent_id(&self, kind: ContentType) -> Option<i64> {
        match self.parent {
            Some((k, id)) if k == kind => Some(id),
            _ => None,
        }
    }
}

/// Input widget kinds understood by the form template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Password,
    Number,
    Textarea,
    Select,
    Checkbox,
}

/// Option of a select input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// A single rendered form input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub input: InputKind,
    pub value: String,
    pub checked: bool,
    pub required: bool,
    pub options: Vec<SelectOption>,
    pub error: Option<String>,
}

impl FormField {
    fn base(name: &'static str, label: &'static str, input: InputKind, value: &str) -> Self {
        Self {
            name,
            label,
            input,
            value: value.to_string(),
            checked: false,
            required: false,
            options: Vec::new(),
            error: None,
        }
    }

    pub fn text(name: &'static str, label: &'static str, value: &str) -> Self {
        Self::base(name, label, InputKind::Text, value)
    }

    pub fn password(name: &'static str, label: &'static str) -> Self {
        Self::base(name, label, InputKind::Password, "")
    }

    pub fn number(name: &'static str, label: &'static str, value: &str) -> Self {
        Self::base(name, label, InputKind::Number, value)
    }

    pub fn textarea(name: &'static str, label: &'static str, value: &str) -> Self {
        Self::base(name, label, InputKind::Textarea, value)
    }

    pub fn checkbox(name: &'static str, label: &'static str, checked: bool) -> Self {
        let mut field = Self::base(name, label, InputKind::Checkbox, "true");
        field.checked = checked;
        field
    }

    /// Select input; the option whose value equals `value` is marked selected
    pub fn select<I>(name: &'static str, label: &'static str, value: &str, options: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut field = Self::base(name, label, InputKind::Select, value);
        field.options = options
            .into_iter()
            .map(|(v, l)| SelectOption {
                selected: v == value,
                value: v,
                label: l,
            })
            .collect();
        field
    }

    /// Select over content items, keyed by id
    pub fn item_select(name: &'static str, label: &'static str, value: &str, items: &[Item]) -> Self {
        Self::select(
            name,
            label,
            value,
            items.iter().map(|i| (i.id.to_string(), i.label())),
        )
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Attach validation messages to the matching fields
pub fn apply_errors(fields: &mut [FormField], errors: &FormErrors) {
    for field in fields.iter_mut() {
        field.error = errors.get(field.name).map(str::to_string);
    }
}

/// Field validation messages keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors(BTreeMap<String, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `Ok(payload)` when no error was recorded
    pub fn finish(self, payload: Value) -> Result<Map<String, Value>, FormErrors> {
        if !self.is_empty() {
            return Err(self);
        }
        match payload {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    /// Non-empty trimmed text
    pub fn required_text(&mut self, field: &str, value: &str) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.add(field, "This field is required");
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Positive integer id
    pub fn required_id(&mut self, field: &str, value: &str) -> Option<i64> {
        match value.trim().parse::<i64>() {
            Ok(id) if id > 0 => Some(id),
            _ => {
                self.add(field, "Please choose a valid entry");
                None
            }
        }
    }

    /// Optional number; blank input is `None`, garbage is an error
    pub fn optional_number<T: FromStr>(&mut self, field: &str, value: &str) -> Option<T> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<T>() {
            Ok(n) => Some(n),
            Err(_) => {
                self.add(field, "Please enter a number");
                None
            }
        }
    }

    /// Value from a closed set
    pub fn one_of(&mut self, field: &str, value: &str, allowed: &[&str]) -> Option<String> {
        let trimmed = value.trim();
        if allowed.contains(&trimmed) {
            Some(trimmed.to_string())
        } else {
            self.add(field, format!("Must be one of: {}", allowed.join(", ")));
            None
        }
    }
}

/// Blank text becomes `None`
pub fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Render an optional value into a form input value
pub fn display_opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Numeric field of an item rendered as input text, preserving decimals
pub fn number_field(item: &Item, field: &str) -> String {
    match item.get(field) {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}
