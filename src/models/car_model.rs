//! Car model schema

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

use super::form::{display_opt, ContentSchema, FormErrors, FormField, Scope};
use super::{ContentType, Item};

pub struct CarModel;

pub const TRANSMISSION_TYPES: &[&str] = &["manual", "automatic"];
pub const AXLE_TYPES: &[&str] = &["front", "rear", "all"];

/// Submitted model form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarModelForm {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "manufacturerID")]
    pub manufacturer_id: String,
    #[serde(default)]
    pub transmission_type: String,
    #[serde(default)]
    pub axle_type: String,
    #[serde(default, rename = "mainImageID")]
    pub main_image_id: String,
}

fn closed_options(values: &[&str]) -> Vec<(String, String)> {
    values.iter().map(|v| (v.to_string(), v.to_string())).collect()
}

impl ContentSchema for CarModel {
    const KIND: ContentType = ContentType::Model;
    const OPTIONS: Option<ContentType> = Some(ContentType::Manufacturer);
    type Form = CarModelForm;

    fn form_from_item(item: &Item) -> CarModelForm {
        CarModelForm {
            name: item.get_str("name").unwrap_or_default().to_string(),
            manufacturer_id: display_opt(item.get_i64("manufacturerID")),
            transmission_type: item.get_str("transmissionType").unwrap_or_default().to_string(),
            axle_type: item.get_str("axleType").unwrap_or_default().to_string(),
            main_image_id: display_opt(item.get_i64("mainImageID")),
        }
    }

    /// `?manufacturer_id=N` preselects an existing manufacturer
    fn prefill(form: &mut CarModelForm, query: &HashMap<String, String>, options: &[Item]) {
        if let Some(id) = query.get("manufacturer_id").and_then(|v| v.parse::<i64>().ok()) {
            if options.iter().any(|m| m.id == id) {
                form.manufacturer_id = id.to_string();
            }
        }
    }

    fn fields(form: &CarModelForm, manufacturers: &[Item]) -> Vec<FormField> {
        vec![
            FormField::text("name", "Name", &form.name).required(),
            FormField::item_select("manufacturerID", "Manufacturer", &form.manufacturer_id, manufacturers)
                .required(),
            FormField::select(
                "transmissionType",
                "Transmission",
                &form.transmission_type,
                closed_options(TRANSMISSION_TYPES),
            )
            .required(),
            FormField::select("axleType", "Axle", &form.axle_type, closed_options(AXLE_TYPES)).required(),
            FormField::number("mainImageID", "Main image ID", &form.main_image_id),
        ]
    }

    fn validate(form: &CarModelForm, _scope: &Scope) -> Result<Map<String, Value>, FormErrors> {
        let mut errors = FormErrors::new();
        let name = errors.required_text("name", &form.name);
        let manufacturer_id = errors.required_id("manufacturerID", &form.manufacturer_id);
        let transmission = errors.one_of("transmissionType", &form.transmission_type, TRANSMISSION_TYPES);
        let axle = errors.one_of("axleType", &form.axle_type, AXLE_TYPES);
        let main_image_id = errors.optional_number::<i64>("mainImageID", &form.main_image_id);
        errors.finish(json!({
            "name": name,
            "manufacturerID": manufacturer_id,
            "transmissionType": transmission,
            "axleType": axle,
            "mainImageID": main_image_id,
        }))
    }
}
