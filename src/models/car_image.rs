//! Car image schema
//!
//! Images are uploaded and converted by the content service; the admin tool
//! only edits their metadata.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::form::{optional_text, ContentSchema, FormErrors, FormField, Scope};
use super::{ContentType, Item};

pub struct CarImage;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarImageForm {
    #[serde(default)]
    pub copyright_information: String,
    #[serde(default)]
    pub description: String,
}

impl ContentSchema for CarImage {
    const KIND: ContentType = ContentType::Image;
    type Form = CarImageForm;

    fn form_from_item(item: &Item) -> CarImageForm {
        CarImageForm {
            copyright_information: item.get_str("copyrightInformation").unwrap_or_default().to_string(),
            description: item.get_str("description").unwrap_or_default().to_string(),
        }
    }

    fn fields(form: &CarImageForm, _options: &[Item]) -> Vec<FormField> {
        vec![
            FormField::text("copyrightInformation", "Copyright", &form.copyright_information).required(),
            FormField::textarea("description", "Description", &form.description),
        ]
    }

    fn validate(form: &CarImageForm, scope: &Scope) -> Result<Map<String, Value>, FormErrors> {
        let mut errors = FormErrors::new();
        let copyright = errors.required_text("copyrightInformation", &form.copyright_information);
        let model_id = scope.parent_id(ContentType::Model);
        if model_id.is_none() {
            errors.add("carModelID", "Image must belong to a model");
        }
        errors.finish(json!({
            "carModelID": model_id,
            "copyrightInformation": copyright,
            "description": optional_text(&form.description),
        }))
    }
}
