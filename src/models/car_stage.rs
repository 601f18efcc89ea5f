//! Car stage schema

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::form::{number_field, optional_text, ContentSchema, FormErrors, FormField, Scope};
use super::{ContentType, Item};

pub struct CarStage;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarStageForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Checkbox, present when ticked
    #[serde(default)]
    pub is_stock: Option<String>,
    #[serde(default)]
    pub ps: String,
    #[serde(default)]
    pub nm: String,
}

impl ContentSchema for CarStage {
    const KIND: ContentType = ContentType::Stage;
    type Form = CarStageForm;

    fn form_from_item(item: &Item) -> CarStageForm {
        CarStageForm {
            name: item.get_str("name").unwrap_or_default().to_string(),
            description: item.get_str("description").unwrap_or_default().to_string(),
            is_stock: item.get_bool("isStock").filter(|b| *b).map(|_| "true".to_string()),
            ps: number_field(item, "ps"),
            nm: number_field(item, "nm"),
        }
    }

    fn fields(form: &CarStageForm, _options: &[Item]) -> Vec<FormField> {
        vec![
            FormField::text("name", "Name", &form.name).required(),
            FormField::textarea("description", "Description", &form.description),
            FormField::checkbox("isStock", "Stock", form.is_stock.is_some()),
            FormField::number("ps", "PS", &form.ps),
            FormField::number("nm", "Nm", &form.nm),
        ]
    }

    fn validate(form: &CarStageForm, scope: &Scope) -> Result<Map<String, Value>, FormErrors> {
        let mut errors = FormErrors::new();
        let name = errors.required_text("name", &form.name);
        let ps = errors.optional_number::<f64>("ps", &form.ps);
        let nm = errors.optional_number::<f64>("nm", &form.nm);
        let model_id = scope.parent_id(ContentType::Model);
        if model_id.is_none() {
            errors.add("carModelID", "Stage must belong to a model");
        }
        errors.finish(json!({
            "carModelID": model_id,
            "name": name,
            "description": optional_text(&form.description),
            "isStock": form.is_stock.is_some(),
            "ps": ps,
            "nm": nm,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkbox_and_numbers() {
        let form = CarStageForm {
            name: "Stage 2".into(),
            description: String::new(),
            is_stock: Some("true".into()),
            ps: "510".into(),
            nm: "".into(),
        };
        let payload = CarStage::validate(&form, &Scope::nested(ContentType::Model, 2)).unwrap();
        assert_eq!(payload.get("isStock"), Some(&json!(true)));
        assert_eq!(payload.get("ps"), Some(&json!(510.0)));
        assert_eq!(payload.get("nm"), Some(&Value::Null));
    }

    #[test]
    fn test_unticked_checkbox_is_false() {
        let form = CarStageForm {
            name: "Stock".into(),
            ..Default::default()
        };
        let payload = CarStage::validate(&form, &Scope::nested(ContentType::Model, 2)).unwrap();
        assert_eq!(payload.get("isStock"), Some(&json!(false)));
    }

    #[test]
    fn test_form_from_item() {
        let item = Item::from_value(1, json!({"name": "S1", "isStock": true, "ps": 300.5}));
        let form = CarStage::form_from_item(&item);
        assert!(form.is_stock.is_some());
        assert_eq!(form.ps, "300.5");
        assert_eq!(form.nm, "");
    }
}
