//! Manufacturer schema

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::form::{ContentSchema, FormErrors, FormField, Scope};
use super::{ContentType, Item};

pub struct Manufacturer;

/// Submitted manufacturer form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManufacturerForm {
    #[serde(default)]
    pub name: String,
}

impl ContentSchema for Manufacturer {
    const KIND: ContentType = ContentType::Manufacturer;
    type Form = ManufacturerForm;

    fn form_from_item(item: &Item) -> ManufacturerForm {
        ManufacturerForm {
            name: item.get_str("name").unwrap_or_default().to_string(),
        }
    }

    fn fields(form: &ManufacturerForm, _options: &[Item]) -> Vec<FormField> {
        vec![FormField::text("name", "Name", &form.name).required()]
    }

    fn validate(form: &ManufacturerForm, _scope: &Scope) -> Result<Map<String, Value>, FormErrors> {
        let mut errors = FormErrors::new();
        let name = errors.required_text("name", &form.name);
        errors.finish(json!({ "name": name }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_trims_name() {
        let form = ManufacturerForm { name: "  Porsche ".into() };
        let payload = Manufacturer::validate(&form, &Scope::top_level()).unwrap();
        assert_eq!(payload.get("name"), Some(&json!("Porsche")));
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let errors = Manufacturer::validate(&ManufacturerForm::default(), &Scope::top_level()).unwrap_err();
        assert!(errors.get("name").is_some());
    }
}
